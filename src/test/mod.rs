
mod concurrency;
