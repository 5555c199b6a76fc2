//! Progress reporter - live run status, printed locally and optionally POSTed
//!
//! Updates are printed on the runner thread. POSTs happen on a background
//! sender thread so a slow endpoint never delays spec execution; when it
//! falls behind only the newest snapshot is sent.

use crate::reporters::ReportSink;
use crate::testing::{SpecState, SpecSummary, SuiteSummary};
use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POST_TIMEOUT: Duration = Duration::from_secs(10);

/// Snapshot sent after every update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub msg: String,
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: Vec<String>,
    pub failures: Vec<String>,
}

/// Background thread owning the HTTP client
struct Poster {
    updates: Sender<String>,
    done: Receiver<()>,
    handle: JoinHandle<()>,
}

impl Poster {
    fn spawn(url: String, client: reqwest::blocking::Client) -> Result<Self> {
        let (updates, inbox) = mpsc::channel::<String>();
        let (finished, done) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("progress-poster".to_string())
            .spawn(move || {
                while let Ok(mut body) = inbox.recv() {
                    // Snapshots are cumulative, so skip to the newest one
                    while let Ok(next) = inbox.try_recv() {
                        body = next;
                    }
                    post(&client, &url, body);
                }
                let _ = finished.send(());
            })
            .context("Failed to start progress poster")?;

        Ok(Self {
            updates,
            done,
            handle,
        })
    }

    /// Stop accepting updates and wait up to `grace` for pending posts
    fn finish(self, grace: Duration) {
        drop(self.updates);
        match self.done.recv_timeout(grace) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = self.handle.join();
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("progress endpoint did not respond, abandoning pending updates");
            }
        }
    }
}

fn post(client: &reqwest::blocking::Client, url: &str, body: String) {
    let sent = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .and_then(|response| response.error_for_status());
    if let Err(e) = sent {
        tracing::warn!(url = %url, "failed to post progress update: {}", e);
    }
}

pub struct ProgressReporter {
    poster: Option<Poster>,
    grace: Duration,
    out: Box<dyn Write + Send>,
    progress: ProgressUpdate,
}

impl ProgressReporter {
    /// Create a reporter; without a URL updates are only printed to stdout
    pub fn new(url: Option<String>) -> Result<Self> {
        Self::with_writer(url, Box::new(io::stdout()))
    }

    pub fn with_writer(url: Option<String>, out: Box<dyn Write + Send>) -> Result<Self> {
        let poster = match url {
            Some(url) => {
                let client = reqwest::blocking::Client::builder()
                    .timeout(POST_TIMEOUT)
                    .build()
                    .context("Failed to create progress report client")?;
                Some(Poster::spawn(url, client)?)
            }
            None => None,
        };

        Ok(Self {
            poster,
            grace: POST_TIMEOUT,
            out,
            progress: ProgressUpdate::default(),
        })
    }

    /// How long the end of the suite waits for pending posts
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    fn emit(&mut self) -> Result<()> {
        let body = serde_json::to_string(&self.progress)?;
        writeln!(self.out, "{}", body)?;
        self.out.flush()?;

        if let Some(poster) = &self.poster {
            if poster.updates.send(body).is_err() {
                tracing::warn!("progress poster stopped, update not sent");
            }
        }
        Ok(())
    }
}

impl ReportSink for ProgressReporter {
    fn name(&self) -> &'static str {
        "progress"
    }

    fn suite_will_begin(&mut self, summary: &SuiteSummary) -> Result<()> {
        self.progress = ProgressUpdate {
            msg: "Test Suite starting".to_string(),
            total: summary.specs_to_run,
            ..Default::default()
        };
        self.emit()
    }

    fn spec_did_complete(&mut self, spec: &SpecSummary) -> Result<()> {
        self.progress.msg = spec.text.clone();
        self.progress.completed += 1;
        if matches!(spec.state, SpecState::Skipped { .. }) {
            self.progress.skipped += 1;
        }
        if let Some(failure) = spec.state.failure() {
            self.progress.failed.push(spec.text.clone());
            self.progress.failures.push(failure.to_string());
        }
        self.emit()
    }

    fn suite_did_end(&mut self, _summary: &SuiteSummary) -> Result<()> {
        self.progress.msg = "Test Suite completed".to_string();
        self.emit()?;
        if let Some(poster) = self.poster.take() {
            poster.finish(self.grace);
        }
        Ok(())
    }
}
