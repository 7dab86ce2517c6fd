use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::Semaphore;

use crate::app::{QuireError, Result};
use crate::domain::{Heading, Item};
use crate::fetcher::Fetcher;
use crate::resolver::ItemResolver;

pub const DEFAULT_WORKERS: usize = 10;

/// Outcome of one polling cycle, one entry per catalog heading, in catalog order.
#[derive(Debug)]
pub struct CycleReport {
    pub outcomes: Vec<(String, Result<Item>)>,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn resolved(&self) -> impl Iterator<Item = &Item> {
        self.outcomes.iter().filter_map(|(_, r)| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &QuireError)> {
        self.outcomes
            .iter()
            .filter_map(|(id, r)| r.as_ref().err().map(|e| (id.as_str(), e)))
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved().count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.resolved_count()
    }
}

/// Runs one catalog pass: list headings, then resolve them all concurrently.
pub struct CycleRunner {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    resolver: Arc<ItemResolver>,
    semaphore: Arc<Semaphore>,
}

impl CycleRunner {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, resolver: Arc<ItemResolver>) -> Self {
        Self::with_workers(fetcher, resolver, DEFAULT_WORKERS)
    }

    pub fn with_workers(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        resolver: Arc<ItemResolver>,
        workers: usize,
    ) -> Self {
        Self {
            fetcher,
            resolver,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub fn resolver(&self) -> &ItemResolver {
        &self.resolver
    }

    /// Fetch the catalog and resolve every heading in it.
    ///
    /// Only a catalog failure is an error; per-item failures are reported
    /// in the returned [`CycleReport`].
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let start = Instant::now();
        let headings = self.fetch_catalog().await?;
        tracing::info!(items = headings.len(), "Catalog fetched");

        let outcomes = self.resolve_all(headings).await;
        Ok(CycleReport {
            outcomes,
            elapsed: start.elapsed(),
        })
    }

    pub async fn fetch_catalog(&self) -> Result<Vec<Heading>> {
        let url = self.resolver.endpoints().catalog();
        let entries = match self.fetcher.fetch_json(&url).await? {
            Value::Array(entries) => entries,
            _ => {
                return Err(QuireError::Payload {
                    url,
                    expected: "a JSON array of headings",
                })
            }
        };

        let mut seen = HashSet::with_capacity(entries.len());
        let mut headings = Vec::with_capacity(entries.len());
        for (position, entry) in entries.into_iter().enumerate() {
            let heading = match serde_json::from_value::<Heading>(entry) {
                Ok(heading) => heading,
                Err(e) => {
                    tracing::warn!(position, error = %e, "Skipping malformed heading");
                    continue;
                }
            };
            // Ids are unique within a cycle; the first occurrence wins.
            if !seen.insert(heading.id.clone()) {
                tracing::warn!(position, item_id = %heading.id, "Skipping duplicate heading");
                continue;
            }
            headings.push(heading);
        }

        Ok(headings)
    }

    /// Resolve each heading in its own task. A failing or panicking task
    /// only affects its own outcome.
    pub async fn resolve_all(&self, headings: Vec<Heading>) -> Vec<(String, Result<Item>)> {
        let mut handles = Vec::with_capacity(headings.len());

        for heading in headings {
            let resolver = self.resolver.clone();
            let semaphore = self.semaphore.clone();
            let id = heading.id.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| QuireError::Other(e.to_string()))?;
                resolver.resolve(&heading).await
            });

            handles.push((id, handle));
        }

        let ids: Vec<String> = handles.iter().map(|(id, _)| id.clone()).collect();
        let joined = futures::future::join_all(handles.into_iter().map(|(_, h)| h)).await;

        ids.into_iter()
            .zip(joined)
            .map(|(id, joined)| {
                let result = joined.unwrap_or_else(|e| {
                    tracing::error!(item_id = %id, "Task join error: {}", e);
                    Err(QuireError::Other(format!("resolution task failed: {}", e)))
                });
                (id, result)
            })
            .collect()
    }
}
