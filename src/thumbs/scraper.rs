use crate::error::{Error, Result};
use crate::unit;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

/// Number of results the search API returns per request
pub const PAGE_SIZE: usize = 4;

/// Largest result count a single run accepts
pub const MAX_RESULTS: usize = 10_000;

/// Struct used for deserializing a single page of search results
#[derive(Deserialize, Debug)]
struct SearchPayload {
    #[serde(rename = "responseData")]
    response_data: Option<ResponseData>,
    #[serde(rename = "responseDetails")]
    response_details: Option<String>,
    #[serde(rename = "responseStatus")]
    response_status: Option<u16>,
}

#[derive(Deserialize, Debug)]
struct ResponseData {
    results: Vec<Thumbnail>,
}

/// Struct that represents a single search result
#[derive(Deserialize, Debug)]
struct Thumbnail {
    #[serde(rename = "tbUrl")]
    url: String,
}

/// Number of API requests needed to cover `result_count` results
pub fn page_count(result_count: usize) -> usize {
    result_count / PAGE_SIZE + usize::from(result_count % PAGE_SIZE != 0)
}

/// Builds the request url for one page. `start` is the offset of the page's first result.
pub fn page_url(api_base: &str, phrase: &str, page: usize) -> Result<Url> {
    let start = (page * PAGE_SIZE).to_string();
    let url = Url::parse_with_params(
        api_base,
        &[("v", "1.0"), ("q", phrase), ("start", start.as_str())],
    )?;
    Ok(url)
}

/// Resolves the thumbnail urls for a query, in search result order.
///
/// Pages are requested concurrently, at most `config.workers` at a time. The
/// first failing page aborts the whole resolution and drops the requests
/// still in flight.
pub async fn resolve_thumbnails(
    query: &unit::SearchQuery,
    config: &unit::Config,
) -> Result<Vec<String>> {
    if query.result_count > MAX_RESULTS {
        return Err(Error::Config(format!(
            "count must be at most {}, got {}",
            MAX_RESULTS, query.result_count
        )));
    }

    let pages = page_count(query.result_count);

    // Create the client used for searching
    let app_client = reqwest::Client::builder()
        .user_agent(crate::APP_USER_AGENT)
        .timeout(config.timeout)
        .build()
        .map_err(Error::Client)?;

    info!(pages, "Searching Google Images for '{}'", query.phrase);

    let urls = (0..pages)
        .map(|page| page_url(&config.api_base, &query.phrase, page))
        .collect::<Result<Vec<_>>>()?;

    let client = &app_client;
    let fetched: Vec<(usize, Vec<Thumbnail>)> = stream::iter(urls.into_iter().enumerate())
        .map(|(page, url)| async move {
            let results = get_page_json(&url, client).await?;
            debug!(page, results = results.len(), "Fetched result page");
            Ok::<_, Error>((page, results))
        })
        .buffer_unordered(config.workers.max(1))
        .try_collect()
        .await?;

    assemble(query.result_count, pages, fetched)
}

/// Places every record at its absolute result position and truncates to `result_count`.
///
/// Arrival order of the pages does not matter. A slot below `result_count`
/// that no page filled is reported as a partial page.
fn assemble(
    result_count: usize,
    pages: usize,
    fetched: Vec<(usize, Vec<Thumbnail>)>,
) -> Result<Vec<String>> {
    let mut slots: Vec<Option<String>> = vec![None; pages * PAGE_SIZE];
    let mut received = vec![0; pages];

    for (page, results) in fetched {
        if results.len() > PAGE_SIZE {
            warn!(
                page,
                results = results.len(),
                "Page returned more results than expected, ignoring the extra"
            );
        }

        received[page] = results.len().min(PAGE_SIZE);
        for (slot, thumb) in results.into_iter().take(PAGE_SIZE).enumerate() {
            slots[page * PAGE_SIZE + slot] = Some(thumb.url);
        }
    }

    slots.truncate(result_count);

    slots
        .into_iter()
        .enumerate()
        .map(|(position, url)| {
            url.ok_or_else(|| {
                let page = position / PAGE_SIZE;
                Error::PartialPage {
                    page,
                    received: received[page],
                    expected: PAGE_SIZE,
                }
            })
        })
        .collect()
}

async fn get_page_json(url: &Url, client: &reqwest::Client) -> Result<Vec<Thumbnail>> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| Error::Network {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.bytes().await.map_err(|source| Error::Network {
        url: url.to_string(),
        source,
    })?;

    let payload: SearchPayload = serde_json::from_slice(&body).map_err(|source| Error::Decode {
        url: url.to_string(),
        source,
    })?;

    match payload.response_data {
        Some(data) => Ok(data.results),
        None => Err(Error::Api {
            url: url.to_string(),
            details: format!(
                "{} (status {})",
                payload
                    .response_details
                    .unwrap_or_else(|| String::from("no response data")),
                payload
                    .response_status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| String::from("unknown")),
            ),
        }),
    }
}
