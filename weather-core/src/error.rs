use thiserror::Error;

/// Input rejected before any fetch is started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a city")]
    EmptyCity,
}

/// A provider call that did not produce a reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Unable to retrieve weather data: {0}")]
    Failure(String),

    #[error("Weather request was cancelled")]
    Cancelled,
}

impl FetchError {
    /// Text kept on screen until the next successful fetch.
    pub fn inline_message(&self) -> &'static str {
        match self {
            FetchError::Failure(_) => "Error retrieving data",
            FetchError::Cancelled => "Request cancelled",
        }
    }
}
