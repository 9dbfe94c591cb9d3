//! HttpDateClock - HTTP `Date` ヘッダを基準とした時刻

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::ClockError;
use crate::ports::Clock;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads the time from the `Date` header of a HEAD request.
///
/// Local clocks on cheap hosts drift; what matters for the start gate is the
/// service's idea of "today". Any failure falls back to the local clock.
pub struct HttpDateClock {
    client: reqwest::Client,
    url: String,
}

impl HttpDateClock {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn fetch(&self) -> Result<DateTime<Utc>, ClockError> {
        let response = self
            .client
            .head(&self.url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        let value = response
            .headers()
            .get(reqwest::header::DATE)
            .ok_or(ClockError::MissingDate)?;
        let value = value.to_str().map_err(|e| ClockError::InvalidDate {
            value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            reason: e.to_string(),
        })?;
        parse_http_date(value)
    }
}

#[async_trait]
impl Clock for HttpDateClock {
    async fn now(&self) -> DateTime<Utc> {
        match self.fetch().await {
            Ok(now) => {
                debug!(url = %self.url, %now, "remote clock");
                now
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "remote clock unavailable, using local time");
                Utc::now()
            }
        }
    }
}

/// Parses an RFC 1123 HTTP date such as `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn parse_http_date(value: &str) -> Result<DateTime<Utc>, ClockError> {
    DateTime::parse_from_rfc2822(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ClockError::InvalidDate {
            value: value.to_string(),
            reason: e.to_string(),
        })
}
