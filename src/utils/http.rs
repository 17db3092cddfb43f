//! Subscription download helper.

use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode};
use thiserror::Error;

/// User agent sent with every subscription request
const USER_AGENT: &str = concat!("subconvert/", env!("CARGO_PKG_VERSION"));

/// Transport failure while downloading a subscription.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(StatusCode),

    #[error("Response exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
}

/// Limits applied to a single download.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub max_size: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            timeout: Duration::from_secs(15),
            max_size: 8 * 1024 * 1024,
        }
    }
}

/// Download `url` and return the body as text.
///
/// Non-2xx responses and bodies larger than `options.max_size` are errors.
pub async fn web_get_async(url: &str, options: &FetchOptions) -> Result<String, FetchError> {
    let client = Client::builder()
        .timeout(options.timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(FetchError::Client)?;

    debug!("Fetching subscription from {}", url);
    let mut response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    if response
        .content_length()
        .is_some_and(|len| len > options.max_size as u64)
    {
        return Err(FetchError::TooLarge {
            limit: options.max_size,
        });
    }

    // Content-Length can be missing or wrong, so count while reading
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > options.max_size {
            return Err(FetchError::TooLarge {
                limit: options.max_size,
            });
        }
        body.extend_from_slice(&chunk);
    }

    debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(String::from_utf8_lossy(&body).into_owned())
}
