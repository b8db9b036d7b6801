use thiserror::Error;

/// Errors surfaced by NetPulse.
#[derive(Error, Debug)]
pub enum NetpulseError {
    /// Fetch failed or the payload was unusable
    #[error("Feed unavailable: {0}")]
    FeedUnavailable(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Drawing a frame failed
    #[error("UI rendering error: {0}")]
    Render(String),

    /// Terminal setup or input failed
    #[error("Terminal UI error: {0}")]
    Terminal(String),

    /// Binding or serving the API failed
    #[error("Network error: {0}")]
    Network(String),

    /// Webhook answered with a non-success status
    #[error("Webhook delivery failed with HTTP {status}")]
    Webhook {
        /// HTTP status code
        status: u16,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A spawned task panicked or was cancelled
    #[error("Async task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type alias for NetPulse operations
pub type Result<T> = std::result::Result<T, NetpulseError>;

impl NetpulseError {
    /// Creates a new feed-unavailable error
    pub fn feed<S: Into<String>>(msg: S) -> Self {
        Self::FeedUnavailable(msg.into())
    }

    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Creates a new render error
    pub fn render<S: Into<String>>(msg: S) -> Self {
        Self::Render(msg.into())
    }

    /// Creates a new terminal error
    pub fn terminal<S: Into<String>>(msg: S) -> Self {
        Self::Terminal(msg.into())
    }

    /// Returns true if the next refresh cycle may succeed without intervention
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::FeedUnavailable(_) | Self::Network(_) | Self::Webhook { .. } => true,
            Self::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            _ => false,
        }
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::FeedUnavailable(_) => "feed",
            Self::Config(_) => "config",
            Self::Render(_) | Self::Terminal(_) => "ui",
            Self::Network(_) | Self::Http(_) => "network",
            Self::Webhook { .. } => "notify",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Join(_) => "async",
        }
    }
}
