//! Shared HTTP plumbing for the external data sources

use crate::types::SourceError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use treefinder_common::config::SourcesConfig;

pub fn build_http_client(sources: &SourcesConfig) -> Result<reqwest::Client, SourceError> {
    let client = reqwest::Client::builder()
        .user_agent(sources.user_agent.as_str())
        .timeout(Duration::from_secs(sources.timeout_secs))
        .build()?;
    Ok(client)
}

/// GET `url` with `query` and decode a JSON body
///
/// Non-success statuses map through `SourceError::from_status`; `what`
/// names the resource in NotFound errors.
pub async fn get_json<T, Q>(
    client: &reqwest::Client,
    url: &str,
    query: &Q,
    what: &str,
) -> Result<T, SourceError>
where
    T: DeserializeOwned,
    Q: serde::Serialize + ?Sized,
{
    tracing::debug!(url = %url, "GET");

    let response = client
        .get(url)
        .query(query)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::from_status(status.as_u16(), body, what));
    }

    Ok(response.json::<T>().await?)
}
