use thiserror::Error;

/// Failures that abort an ingestion run. Row-level anomalies never surface here.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("attendance document is empty")]
    EmptyDocument,

    #[error("failed to read attendance document from {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch attendance document from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
