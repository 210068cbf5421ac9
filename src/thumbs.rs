pub mod download;
pub mod file;
pub mod scraper;
pub mod unit;
