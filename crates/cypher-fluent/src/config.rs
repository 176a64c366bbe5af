use crate::render::PlaceholderStyle;
use std::time::Duration;

/// Default path of the Cypher endpoint, relative to the service root.
pub const DEFAULT_CYPHER_PATH: &str = "/cypher";

/// Configuration for `GraphClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Path the rendered query is posted to.
    pub cypher_path: String,
    /// Path of the service root read by `GraphClient::connect`.
    pub root_path: String,
    /// Placeholder syntax used when rendering for execution.
    pub placeholder_style: PlaceholderStyle,
    /// Whether to log queries.
    pub logging_enabled: bool,
    /// Truncate logged query text (in bytes). `None` means no truncation.
    pub max_logged_query_length: Option<usize>,
    /// Slow query threshold for alerting.
    pub slow_query_threshold: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cypher_path: DEFAULT_CYPHER_PATH.to_string(),
            root_path: String::new(),
            placeholder_style: PlaceholderStyle::Braces,
            logging_enabled: true,
            max_logged_query_length: Some(200),
            slow_query_threshold: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Cypher endpoint path.
    pub fn cypher_path(mut self, path: impl Into<String>) -> Self {
        self.cypher_path = path.into();
        self
    }

    /// Set the service root path.
    pub fn root_path(mut self, path: impl Into<String>) -> Self {
        self.root_path = path.into();
        self
    }

    /// Set the placeholder syntax.
    pub fn placeholder_style(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder_style = style;
        self
    }

    /// Enable query logging.
    pub fn enable_logging(mut self) -> Self {
        self.logging_enabled = true;
        self
    }

    /// Disable query logging.
    pub fn disable_logging(mut self) -> Self {
        self.logging_enabled = false;
        self
    }

    /// Set maximum logged query length.
    pub fn max_logged_query_length(mut self, len: usize) -> Self {
        self.max_logged_query_length = Some(len);
        self
    }

    /// Log full query text.
    pub fn no_truncate(mut self) -> Self {
        self.max_logged_query_length = None;
        self
    }

    /// Set slow query threshold.
    pub fn slow_query_threshold(mut self, duration: Duration) -> Self {
        self.slow_query_threshold = Some(duration);
        self
    }
}
