use std::fmt;
use std::path::PathBuf;

use chrono::Utc;
use once_cell::sync::Lazy;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::IngestError;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Where the attendance export is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Stdin,
    /// Published spreadsheet CSV, fetched fresh on every read.
    Url(String),
}

impl Source {
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Source::Stdin
        } else if arg.starts_with("http://") || arg.starts_with("https://") {
            Source::Url(arg.to_string())
        } else {
            Source::Path(PathBuf::from(arg))
        }
    }

    pub async fn read(&self) -> Result<String, IngestError> {
        let read_error = |source| IngestError::Read {
            source_name: self.to_string(),
            source,
        };

        match self {
            Source::Path(path) => tokio::fs::read_to_string(path).await.map_err(read_error),
            Source::Stdin => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .map_err(read_error)?;
                Ok(text)
            }
            Source::Url(url) => fetch(&HTTP_CLIENT, url).await,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Stdin => f.write_str("stdin"),
            Source::Url(url) => f.write_str(url),
        }
    }
}

/// Appends a `t=<millis>` parameter so the spreadsheet service cannot answer
/// from its cache.
pub fn cache_busted(url: &str, millis: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}t={millis}")
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<String, IngestError> {
    let fetch_error = |source| IngestError::Fetch {
        url: url.to_string(),
        source,
    };

    let request_url = cache_busted(url, Utc::now().timestamp_millis());
    debug!(url = %request_url, "fetching attendance document");

    let response = client
        .get(&request_url)
        .send()
        .await
        .map_err(fetch_error)?
        .error_for_status()
        .map_err(fetch_error)?;
    response.text().await.map_err(fetch_error)
}
