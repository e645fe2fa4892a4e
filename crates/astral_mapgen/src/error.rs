//! Configuration error types.

/// Errors that can occur when loading, saving, or parsing a map configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read map config: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write map config: {0}")]
    Write(#[source] std::io::Error),

    /// Failed to parse JSON content.
    #[error("failed to parse map config: {0}")]
    Parse(#[source] serde_json::Error),

    /// Failed to serialize the config to JSON.
    #[error("failed to serialize map config: {0}")]
    Serialize(#[source] serde_json::Error),
}
