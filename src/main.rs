//! # Thumbgrab
//! Thumbgrab searches an image search API for a phrase and downloads the
//! matching thumbnails concurrently.
//!
//! ## Usage
//! `thumbgrab -s "grumpy cat" -n 12` writes `grumpy_cat0.jpg` through
//! `grumpy_cat11.jpg` into a new directory such as `grumpy_cat_Jan2_06_3:04`.
mod error;
mod thumbs;

use error::{Error, Result};
use thumbs::download;
use thumbs::file;
use thumbs::scraper;
use thumbs::unit;

extern crate clap;
use clap::{App, Arg, ArgMatches};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, Level};

pub const APP_USER_AGENT: &str = "Thumbgrab/0.1.0";
pub const DEFAULT_API_BASE: &str = "http://ajax.googleapis.com/ajax/services/search/images";

fn cli() -> App<'static, 'static> {
    App::new("Thumbgrab")
        .version("0.1")
        .about("Downloads image search thumbnails concurrently")
        .arg(
            Arg::with_name("search")
                .short("s")
                .long("search")
                .value_name("PHRASE")
                .help("The keywords to search for")
                .default_value("")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("count")
                .short("n")
                .long("count")
                .value_name("COUNT")
                .help("The number of results to download")
                .default_value("4")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("workers")
                .short("w")
                .long("workers")
                .value_name("WORKERS")
                .help("The amount of concurrent requests and download threads")
                .default_value("8")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("timeout")
                .short("t")
                .long("timeout")
                .value_name("SECONDS")
                .help("Per request timeout")
                .default_value("30")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("directory")
                .short("d")
                .long("directory")
                .value_name("DIRECTORY")
                .help("The directory to create the output directory in")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("api-base")
                .long("api-base")
                .value_name("URL")
                .help("The image search endpoint")
                .default_value(DEFAULT_API_BASE)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Output more detail during the search and download process")
                .takes_value(false),
        )
}

fn parse_number(matches: &ArgMatches, name: &str, min: usize, max: usize) -> Result<usize> {
    let raw = matches.value_of(name).unwrap_or_default();
    let value = raw
        .parse::<usize>()
        .map_err(|_| Error::Config(format!("invalid value for {}: '{}'", name, raw)))?;

    if value < min {
        return Err(Error::Config(format!(
            "{} must be at least {}, got {}",
            name, min, value
        )));
    }

    if value > max {
        return Err(Error::Config(format!(
            "{} must be at most {}, got {}",
            name, max, value
        )));
    }

    Ok(value)
}

/// Builds the query and the config struct we will pass to other functions
fn parse_args(matches: &ArgMatches) -> Result<(unit::SearchQuery, unit::Config)> {
    let query = unit::SearchQuery::new(
        matches.value_of("search").unwrap_or_default(),
        parse_number(matches, "count", 0, scraper::MAX_RESULTS)?,
    );

    let config = unit::Config::new(
        matches.is_present("verbose"),
        matches.value_of("directory").map(String::from),
        parse_number(matches, "workers", 1, usize::MAX)?,
        Duration::from_secs(parse_number(matches, "timeout", 1, usize::MAX)? as u64),
        String::from(matches.value_of("api-base").unwrap_or(DEFAULT_API_BASE)),
    );

    Ok((query, config))
}

/// Resolves every thumbnail first, then creates the output directory and downloads.
/// Returns the directory the images were written to.
async fn run(query: unit::SearchQuery, config: unit::Config) -> Result<PathBuf> {
    let urls = scraper::resolve_thumbnails(&query, &config).await?;

    let slug = file::slugify(&query.phrase);
    let dir = file::create_output_dir(
        &config.output_root(),
        &slug,
        chrono::Local::now().naive_local(),
    )?;

    info!("Downloading thumbnails to '{}'", dir.display());

    let mut queue = file::build_jobs(&slug, urls);
    let down = download::Downloader::new(config.workers, config.timeout, &mut queue);
    let target = dir.clone();
    tokio::task::spawn_blocking(move || down.download(&target))
        .await
        .map_err(|_| Error::WorkerPanic)??;

    Ok(dir)
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();
    let parsed = parse_args(&matches);

    let verbose = parsed.as_ref().map(|(_, c)| c.verbose).unwrap_or(false);
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let outcome = match parsed {
        Ok((query, config)) => run(query, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = outcome {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Done");
}
