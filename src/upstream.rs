use std::time::Duration;

use reqwest::{Client, Response, StatusCode, header::RETRY_AFTER};

use crate::error::{Error, Result};

/// Retry hint used when a 429 comes without a usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// HTTP client shared by the Spotify, YouTube and OAuth calls.
pub fn http_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(format!(
            "{}/{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ))
        .build()?;
    Ok(client)
}

/// Turns non-success responses into errors.
///
/// 429 becomes [`Error::RateLimited`] carrying the `Retry-After` seconds,
/// every other non-2xx status becomes [`Error::Upstream`] with the raw body.
pub async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Err(Error::RateLimited { retry_after_secs });
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::Upstream {
        status: status.as_u16(),
        body,
    })
}
