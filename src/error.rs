use thiserror::Error;

/// A trait vector could not be built from the supplied values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraitError {
    /// One or more of the five traits is absent, not a number, or not finite.
    #[error("Invalid trait vector: missing [{}], invalid [{}]", .missing.join(", "), .invalid.join(", "))]
    InvalidTraitVector {
        missing: Vec<String>,
        invalid: Vec<String>,
    },

    /// The input was not a JSON object at all.
    #[error("Invalid trait vector: expected a JSON object")]
    NotAnObject,
}

/// The profiler reply could not be turned into a trait vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileParseError {
    #[error("No JSON object found in profiler reply")]
    NoJsonObject,

    #[error("Malformed JSON in profiler reply: {0}")]
    MalformedJson(String),

    #[error(transparent)]
    InvalidTraits(#[from] TraitError),
}

/// Failure talking to the chat-completion API.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid API key")]
    Unauthorized,

    #[error("Rate limited - too many requests")]
    RateLimited,
}

/// Session store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored traits are invalid: {0}")]
    InvalidTraits(#[from] TraitError),
}

/// Startup configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("{name} must be within [0, 2], got {value}")]
    TemperatureOutOfRange { name: &'static str, value: String },

    #[error("profiler window must be at least 1")]
    EmptyProfilerWindow,
}
