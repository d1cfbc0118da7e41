//! Shared HTTP plumbing for the upstream service clients

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Result, TripPlannerError};

/// Client with the crate's user agent and a request timeout
pub fn client(timeout: Duration, user_agent: &str) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?)
}

/// Default user agent, `tripplanner/<version>`
#[must_use]
pub fn default_user_agent() -> String {
    format!("tripplanner/{}", crate::VERSION)
}

/// Send `request` and decode a JSON body. Non-2xx responses become
/// `Status` errors and undecodable bodies `Decode` errors, both naming `service`.
pub async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder, service: &str) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();
    debug!("{} responded with {}", service, status);

    if !status.is_success() {
        return Err(TripPlannerError::status(service, status));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| TripPlannerError::decode(service, e))
}
