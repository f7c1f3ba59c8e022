use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Seek};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::error::{GeocodeError, Result};

/// Open a geonames dump for reading.
///
/// Files ending in `.zip` are treated as the archives geonames publishes (`AU.zip` holding
/// `AU.txt` and a readme); see [`open_zip`]. Anything else is read as plain text.
pub fn open_source(path: impl AsRef<Path>) -> Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let zipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if zipped {
        let stem = path.file_stem().and_then(|stem| stem.to_str());
        Ok(Box::new(open_zip(BufReader::new(file), stem)?))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Extract the data file of a zipped geonames dump into memory.
///
/// The entry named `<stem>.txt` is used when present; otherwise the alphabetically first `.txt`
/// entry that is not the readme.
pub fn open_zip<R: Read + Seek>(reader: R, stem: Option<&str>) -> Result<Cursor<Vec<u8>>> {
    let mut archive = ZipArchive::new(reader)?;
    let name = data_entry_name(&archive, stem).ok_or_else(|| {
        GeocodeError::General("Zip archive holds no geonames .txt file.".to_string())
    })?;

    let mut entry = archive.by_name(&name)?;
    let mut data = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
    entry.read_to_end(&mut data)?;
    debug!(entry = %name, bytes = data.len(), "extracted zipped geonames dump");

    Ok(Cursor::new(data))
}

fn data_entry_name<R: Read + Seek>(archive: &ZipArchive<R>, stem: Option<&str>) -> Option<String> {
    let names: Vec<&str> = archive.file_names().collect();

    if let Some(stem) = stem {
        let wanted = format!("{stem}.txt");
        if names.contains(&wanted.as_str()) {
            return Some(wanted);
        }
    }

    names
        .into_iter()
        .filter(|name| name.ends_with(".txt") && !name.eq_ignore_ascii_case("readme.txt"))
        .min()
        .map(str::to_string)
}
