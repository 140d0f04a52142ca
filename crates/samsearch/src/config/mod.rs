use crate::error::SamSearchError;

/// Default cap on the number of records a search returns.
pub const DEFAULT_RESULT_LIMIT: usize = 50;

/// Configuration for entity search.
///
/// Use [`SearchConfigBuilder`] for an ergonomic way to create one.
///
/// ```rust
/// use samsearch::SearchConfig;
///
/// let config = SearchConfig::builder().limit(10).partial_match(false).build();
/// assert_eq!(config.limit, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum number of records to return
    pub limit: usize,
    /// Fall back to substring matching against indexed name tokens when
    /// exact token lookup and filters leave no candidates
    pub partial_match: bool,
}

impl SearchConfig {
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RESULT_LIMIT,
            partial_match: true,
        }
    }
}

/// Builder for creating search configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Create a new builder with the default limit and partial matching on
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact token matches only
    pub fn strict() -> Self {
        Self::new().partial_match(false)
    }

    /// Set the maximum number of results to return
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = limit;
        self
    }

    /// Enable or disable the substring fallback
    pub fn partial_match(mut self, enabled: bool) -> Self {
        self.config.partial_match = enabled;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> SearchConfig {
        self.config
    }

    /// Build, rejecting configurations that could never return anything.
    pub fn try_build(self) -> Result<SearchConfig, SamSearchError> {
        if self.config.limit == 0 {
            return Err(SamSearchError::ConfigError(
                "Result limit must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}
