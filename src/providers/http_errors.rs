use serde::Deserialize;
use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::error::GencliError;

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::ConnectionRefused
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::TimedOut
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("timed out")
        {
            return true;
        }

        current = source.source();
    }

    false
}

pub(crate) fn model_api_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> GencliError {
    let api_url = api_url.to_string();

    if err.is_timeout() || error_chain_has_timeout(&err) {
        return GencliError::Timeout {
            api_url,
            timeout_secs,
        };
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return GencliError::ConnectionRefused { api_url };
        }
        return GencliError::Connect { api_url };
    }

    GencliError::Transport {
        api_url,
        message: err.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ServiceErrorEnvelope {
    error: ServiceErrorBody,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: String,
}

/// Maps a non-success reply to a service error, preferring the JSON
/// `error.message` field over the raw body.
pub(crate) fn model_api_status_error(status: u16, body: &str) -> GencliError {
    let message = serde_json::from_str::<ServiceErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    GencliError::Service { status, message }
}
