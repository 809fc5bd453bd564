use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GencliError {
    #[error("Please set the {var} environment variable. Check the README for more information.")]
    MissingCredential { var: String },

    #[error("Invalid number of words: '{0}'")]
    InvalidWordBudget(String),

    #[error("Unable to get user home directory to create config file")]
    HomeDirUnavailable,

    #[error("Error reading config file '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error parsing config file '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Error writing config file '{}': {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error serializing config: {0}")]
    ConfigSerialize(#[source] serde_yaml::Error),

    #[error("Failed to initialize HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("open {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write output to '{}': {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "Model request timed out after {timeout_secs}s while calling '{api_url}'. \
         Increase GENCLI_TIMEOUT_SECS or try again later."
    )]
    Timeout { api_url: String, timeout_secs: u64 },

    #[error(
        "Connection refused by model API at '{api_url}'. \
         Check GENCLI_BASE_URL and network connectivity."
    )]
    ConnectionRefused { api_url: String },

    #[error(
        "Failed to connect to model API at '{api_url}'. \
         Check GENCLI_BASE_URL and network connectivity."
    )]
    Connect { api_url: String },

    #[error("Failed to call model API at '{api_url}': {message}")]
    Transport { api_url: String, message: String },

    #[error("Model request failed with status {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Failed to parse model response: {0}")]
    Decode(String),

    #[error("Model returned no text candidates")]
    EmptyResponse,
}

impl GencliError {
    /// Errors the command layer renders as ordinary output instead of failing
    /// the process.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ImageRead { .. }
                | Self::Timeout { .. }
                | Self::ConnectionRefused { .. }
                | Self::Connect { .. }
                | Self::Transport { .. }
                | Self::Service { .. }
                | Self::Decode(_)
                | Self::EmptyResponse
        )
    }
}

pub type Result<T> = std::result::Result<T, GencliError>;
