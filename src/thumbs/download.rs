use crate::error::{Error, Result};
use crate::unit;

use crossbeam_channel as channel;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A struct used for storing information needed to download files
pub struct Downloader {
    channel_rx: channel::Receiver<unit::DownloadJob>,
    jobs: usize,
    len: usize,
    timeout: Duration,
}

impl Downloader {
    /// Drains `queue` into the job channel. The sending side is dropped here,
    /// so workers see a disconnected channel once every job is taken.
    pub fn new(
        jobs: usize,
        timeout: Duration,
        queue: &mut VecDeque<unit::DownloadJob>,
    ) -> Downloader {
        let queue_len = queue.len();
        let (tx, rx) = channel::unbounded::<unit::DownloadJob>();

        for job in queue.drain(..) {
            // `rx` is still held, so sending cannot fail
            let _ = tx.send(job);
        }

        Downloader {
            channel_rx: rx,
            jobs: jobs.max(1),
            len: queue_len,
            timeout,
        }
    }

    /// Downloads every queued job into `dir` and returns the number of files written.
    ///
    /// Blocks until all workers have joined. The first failure stops the other
    /// workers from taking new jobs; files already written are left in place.
    pub fn download(&self, dir: &Path) -> Result<usize> {
        let abort = AtomicBool::new(false);
        let workers = self.jobs.min(self.len);

        let outcome = crossbeam::thread::scope(|thread_scope| {
            let mut handles = Vec::new();

            for x in 0..workers {
                let cl_chan = self.channel_rx.clone();
                let abort = &abort;

                debug!(worker = x, "Thread spawned");

                // Workers start executing here
                let handle = thread_scope.spawn(move |_| -> Result<usize> {
                    let down_client = reqwest::blocking::ClientBuilder::new()
                        .user_agent(crate::APP_USER_AGENT)
                        .timeout(self.timeout)
                        .build()
                        .map_err(|e| {
                            abort.store(true, Ordering::SeqCst);
                            Error::Client(e)
                        })?;

                    let mut written = 0;
                    for job in cl_chan.iter() {
                        if abort.load(Ordering::SeqCst) {
                            break;
                        }

                        if let Err(e) = fetch_and_write(&down_client, &job, dir) {
                            abort.store(true, Ordering::SeqCst);
                            warn!(worker = x, url = %job.url, "Download failed");
                            return Err(e);
                        }

                        debug!(
                            worker = x,
                            index = job.index,
                            file = %job.file_name,
                            "Saved thumbnail"
                        );
                        written += 1;
                    }

                    Ok(written)
                });
                handles.push(handle);
            }

            // Wait until all threads are complete
            let mut written = 0;
            let mut first_error = None;
            for h in handles {
                let result = match h.join() {
                    Ok(result) => result,
                    Err(_) => Err(Error::WorkerPanic),
                };
                match result {
                    Ok(n) => written += n,
                    Err(e) => {
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                    }
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(written),
            }
        })
        .map_err(|_| Error::WorkerPanic)?;

        let written = outcome?;
        info!(written, "Finished downloading thumbnails");
        Ok(written)
    }
}

fn fetch_and_write(
    client: &reqwest::blocking::Client,
    job: &unit::DownloadJob,
    dir: &Path,
) -> Result<()> {
    let response = client.get(&job.url).send().map_err(|source| Error::Network {
        url: job.url.clone(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            url: job.url.clone(),
            status,
        });
    }

    let resp = response.bytes().map_err(|source| Error::Network {
        url: job.url.clone(),
        source,
    })?;

    // Write the file to disk
    let cur_file = dir.join(&job.file_name);
    let write_err = |source| Error::Filesystem {
        path: cur_file.clone(),
        source,
    };
    let mut cur = io::Cursor::new(resp);
    let mut o_file = fs::File::create(&cur_file).map_err(write_err)?;
    io::copy(&mut cur, &mut o_file).map_err(write_err)?;

    Ok(())
}
