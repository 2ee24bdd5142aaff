//! Replace-load of datasets into collections

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde_json::Value;

use crate::common::{Error, Result};
use crate::ops::dataset::{Dataset, DatasetSource};

/// Destination for replace-loads.
///
/// `replace` drops whatever `collection` holds under `uri`, then inserts
/// `records` as one batch, returning the number inserted.
#[async_trait]
pub trait DatasetSink: Send + Sync {
    async fn replace(&self, uri: &str, collection: &str, records: &[Value]) -> Result<u64>;
}

/// Replace the target collection with `dataset`.
///
/// Records are validated before anything is dropped, so a malformed file
/// leaves the previous contents in place.
pub async fn load<S: DatasetSink + ?Sized>(dataset: &Dataset, uri: &str, sink: &S) -> Result<u64> {
    let attempted = dataset.len();
    let fail = |e: Error| Error::Load {
        dataset: dataset.name().to_string(),
        attempted,
        reason: e.to_string(),
    };

    dataset.validate().map_err(fail)?;

    let inserted = sink
        .replace(uri, dataset.name(), dataset.records())
        .await
        .map_err(fail)?;

    tracing::info!("✓ Loaded {} records into '{}'", inserted, dataset.name());
    Ok(inserted)
}

#[derive(Debug, Clone)]
pub struct DatasetOutcome {
    pub name: String,
    /// Records read from the source (0 when it could not be read)
    pub attempted: usize,
    pub result: std::result::Result<u64, String>,
}

impl DatasetOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub datasets: Vec<DatasetOutcome>,
}

impl LoadReport {
    pub fn total_inserted(&self) -> u64 {
        self.datasets
            .iter()
            .filter_map(|d| d.result.as_ref().ok())
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DatasetOutcome> {
        self.datasets.iter().filter(|d| !d.is_ok())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn get(&self, name: &str) -> Option<&DatasetOutcome> {
        self.datasets.iter().find(|d| d.name == name)
    }
}

/// Read and load one source, never failing: errors land in the outcome
async fn load_source<S: DatasetSink + ?Sized>(
    source: &DatasetSource,
    uri: &str,
    sink: &S,
) -> DatasetOutcome {
    let (attempted, result) = match source.read().await {
        Ok(dataset) => (dataset.len(), load(&dataset, uri, sink).await),
        Err(e) => (
            0,
            Err(Error::Load {
                dataset: source.name.clone(),
                attempted: 0,
                reason: format!("cannot read {}: {}", source.path.display(), e),
            }),
        ),
    };

    if let Err(e) = &result {
        tracing::warn!(
            dataset = %source.name,
            attempted,
            "Dataset load failed, continuing with the rest: {}",
            e
        );
    }

    DatasetOutcome {
        name: source.name.clone(),
        attempted,
        result: result.map_err(|e| e.to_string()),
    }
}

/// Load every source independently.
///
/// A failure on one dataset never stops the others; there is no
/// transaction across datasets. With `concurrent`, loads run at the same
/// time since they target disjoint collections.
pub async fn load_all<S: DatasetSink + ?Sized>(
    sources: &[DatasetSource],
    uri: &str,
    sink: &S,
    concurrent: bool,
) -> LoadReport {
    let started_at = Utc::now();
    tracing::info!("Loading {} datasets", sources.len());

    let datasets = if concurrent {
        join_all(sources.iter().map(|s| load_source(s, uri, sink))).await
    } else {
        let mut outcomes = Vec::with_capacity(sources.len());
        for source in sources {
            outcomes.push(load_source(source, uri, sink).await);
        }
        outcomes
    };

    let report = LoadReport {
        started_at,
        finished_at: Utc::now(),
        datasets,
    };
    tracing::info!(
        "Load finished: {} inserted, {} failed",
        report.total_inserted(),
        report.failures().count()
    );
    report
}
