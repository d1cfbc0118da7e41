//! Errors raised by the trip planner
//!
//! Upstream failures are split by where they happened: the service answered
//! with a non-2xx status, answered with a body that does not decode, or never
//! answered usefully at all. Planning itself only fails on bad input or bad
//! configuration; every upstream failure is absorbed by a fallback.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TripPlannerError {
    /// Missing or out-of-range configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An upstream service answered with a non-2xx status
    #[error("{service} returned {status}")]
    Status { service: String, status: StatusCode },

    /// An upstream body could not be decoded into the expected shape
    #[error("Failed to parse {service} response: {message}")]
    Decode { service: String, message: String },

    /// Transport failures and responses missing the requested data
    #[error("API error: {message}")]
    Api { message: String },

    /// Trip request rejected before any upstream call
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl TripPlannerError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn status<S: Into<String>>(service: S, status: StatusCode) -> Self {
        Self::Status {
            service: service.into(),
            status,
        }
    }

    pub fn decode<S: Into<String>, M: std::fmt::Display>(service: S, message: M) -> Self {
        Self::Decode {
            service: service.into(),
            message: message.to_string(),
        }
    }

    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Message shown by the CLI
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and API keys.")
            }
            Self::Status { service, status } if *status == StatusCode::TOO_MANY_REQUESTS => {
                format!("{service} is rate limiting requests. Try again in a minute.")
            }
            Self::Status { service, .. } | Self::Decode { service, .. } => {
                format!("{service} is not answering correctly right now.")
            }
            Self::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            Self::Validation { message } => format!("Invalid input: {message}"),
        }
    }
}

impl From<reqwest::Error> for TripPlannerError {
    fn from(err: reqwest::Error) -> Self {
        let service = err
            .url()
            .and_then(|url| url.host_str())
            .unwrap_or("upstream service")
            .to_string();
        if err.is_decode() {
            Self::decode(service, err)
        } else if let Some(status) = err.status() {
            Self::status(service, status)
        } else {
            Self::api(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_names_service() {
        let err = TripPlannerError::status("Currency API", StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "Currency API returned 503 Service Unavailable");
    }

    #[test]
    fn test_decode_display_names_service() {
        let err = TripPlannerError::decode("Open-Meteo", "missing field `daily`");
        assert_eq!(
            err.to_string(),
            "Failed to parse Open-Meteo response: missing field `daily`"
        );
    }

    #[test]
    fn test_user_messages() {
        let config_err = TripPlannerError::config("missing Google Places key");
        assert!(config_err.user_message().contains("missing Google Places key"));

        let limited = TripPlannerError::status("Overpass", StatusCode::TOO_MANY_REQUESTS);
        assert!(limited.user_message().contains("rate limiting"));

        let broken = TripPlannerError::decode("Overpass", "eof");
        assert!(broken.user_message().starts_with("Overpass is not answering"));

        let api_err = TripPlannerError::api("timed out");
        assert!(api_err.user_message().contains("Unable to connect"));

        let validation_err = TripPlannerError::validation("bad currency XX");
        assert_eq!(validation_err.user_message(), "Invalid input: bad currency XX");
    }
}
