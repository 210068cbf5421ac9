use std::path::PathBuf;
use std::time::Duration;

/// What the user asked for: the phrase to search and how many images to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub phrase: String,
    pub result_count: usize,
}

impl SearchQuery {
    pub fn new(phrase: &str, result_count: usize) -> Self {
        SearchQuery {
            phrase: String::from(phrase),
            result_count,
        }
    }
}

/// Struct for holding information about a single thumbnail that needs downloading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub index: usize,
    pub file_name: String,
    pub url: String,
}

/// Struct for holding config information so it can be easly passed around
#[derive(Debug, Clone)]
pub struct Config {
    pub verbose: bool,
    pub directory: Option<String>,
    pub workers: usize,
    pub timeout: Duration,
    pub api_base: String,
}

impl Config {
    pub fn new(
        verbose: bool,
        directory: Option<String>,
        workers: usize,
        timeout: Duration,
        api_base: String,
    ) -> Self {
        Config {
            verbose,
            directory,
            workers,
            timeout,
            api_base,
        }
    }

    /// Directory the timestamped output directory is created in.
    /// An empty path means the working directory.
    pub fn output_root(&self) -> PathBuf {
        match &self.directory {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::new(),
        }
    }
}
