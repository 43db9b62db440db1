//! Paginated, retrying retrieval and the category run loop.
//!
//! Everything here is strictly sequential: one category at a time, one page
//! at a time, one request in flight.

use std::time::Duration;

use rmscope_core::{Category, CategoryReport, FetchConfig, RunSnapshot};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::aggregate::{affiliation_summary, degree_summary};
use crate::error::{FetchError, Result};
use crate::extract::Extractor;
use crate::http::PageSource;

/// Wait policy between attempts of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub cap: Duration,
    pub retry_after_cap: Duration,
}

impl Backoff {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            initial: config.backoff_initial(),
            cap: config.backoff_cap(),
            retry_after_cap: config.retry_after_cap(),
        }
    }

    /// `min(cap, initial × 2^attempt)`, `attempt` counting from 0.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial
            .checked_mul(factor)
            .unwrap_or(self.cap)
            .min(self.cap)
    }

    /// Wait before the next attempt after `err` on attempt number `attempt`.
    ///
    /// A 429 with an all-digit `Retry-After` waits that many seconds (capped);
    /// everything else uses [`delay`](Self::delay).
    pub fn wait_for(&self, err: &FetchError, attempt: u32) -> Duration {
        if let FetchError::RateLimited {
            retry_after: Some(raw),
        } = err
            && !raw.is_empty()
            && raw.bytes().all(|b| b.is_ascii_digit())
        {
            return raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .unwrap_or(self.retry_after_cap)
                .min(self.retry_after_cap);
        }
        self.delay(attempt)
    }
}

/// Receives the accumulated snapshot after each category finishes.
pub trait RunObserver {
    fn category_finished(&mut self, snapshot: &RunSnapshot);
}

impl<F: FnMut(&RunSnapshot)> RunObserver for F {
    fn category_finished(&mut self, snapshot: &RunSnapshot) {
        self(snapshot)
    }
}

pub struct FetchController<S> {
    source: S,
    config: FetchConfig,
    backoff: Backoff,
}

impl<S: PageSource> FetchController<S> {
    pub fn new(source: S, config: FetchConfig) -> Self {
        let backoff = Backoff::from_config(&config);
        Self {
            source,
            config,
            backoff,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// One page, retried up to `max_retries` times after the first attempt.
    pub async fn fetch_page_with_retry(&self, category: Category, start: usize) -> Result<Vec<Value>> {
        let max_attempts = self.config.max_retries.saturating_add(1);
        let mut attempt = 0u32;
        loop {
            match self
                .source
                .fetch_page(category, start, self.config.page_size)
                .await
            {
                Ok(items) => return Ok(items),
                Err(err) => {
                    attempt += 1;
                    if attempt >= max_attempts {
                        return Err(FetchError::Exhausted {
                            attempts: attempt,
                            last: Box::new(err),
                        });
                    }
                    let wait = self.backoff.wait_for(&err, attempt - 1);
                    warn!(
                        category = category.key(),
                        start,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "page fetch failed: {err}"
                    );
                    sleep(wait).await;
                }
            }
        }
    }

    /// Every record of a category, in page order.
    ///
    /// A page shorter than the page size ends the category; otherwise `start`
    /// advances by the number of items returned.
    pub async fn fetch_category(&self, category: Category) -> Result<Vec<Value>> {
        let limit = self.config.page_size;
        let mut start = 1usize;
        let mut records = Vec::new();
        loop {
            let page = self.fetch_page_with_retry(category, start).await?;
            let count = page.len();
            records.extend(page);
            debug!(category = category.key(), start, count, "page fetched");
            if count < limit {
                break;
            }
            start += count;
            sleep(self.config.page_delay()).await;
        }
        Ok(records)
    }

    /// Fetch and extract `categories` in order.
    ///
    /// A category that exhausts its retries is reported as failed and the run
    /// moves on. The affiliation summary is computed right after research
    /// experience, the degree summary right after education. `observer` sees
    /// the snapshot after every category.
    pub async fn run<O>(&self, categories: &[Category], extractor: &Extractor, observer: &mut O) -> RunSnapshot
    where
        O: RunObserver + ?Sized,
    {
        let mut snapshot = RunSnapshot::default();
        for (i, &category) in categories.iter().enumerate() {
            let report = match self.fetch_category(category).await {
                Ok(records) => {
                    match category {
                        Category::ResearchExperience => {
                            snapshot.summary.affiliation = affiliation_summary(extractor, &records);
                        }
                        Category::Education => {
                            snapshot.summary.degree = degree_summary(extractor, &records);
                        }
                        _ => {}
                    }
                    let results = records
                        .iter()
                        .map(|record| extractor.extract(category, record))
                        .collect::<Vec<_>>();
                    info!(category = category.key(), count = results.len(), "category loaded");
                    CategoryReport::success(category, results)
                }
                Err(err) => {
                    error!(category = category.key(), attempts = err.attempts(), "category failed: {err}");
                    CategoryReport::failure(category, format!("Failed to load {}: {err}", category.key()))
                }
            };
            snapshot.categories.push(report);
            observer.category_finished(&snapshot);

            if i + 1 < categories.len() {
                sleep(self.config.category_delay()).await;
            }
        }
        snapshot
    }
}
