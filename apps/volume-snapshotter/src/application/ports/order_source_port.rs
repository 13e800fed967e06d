//! Order Source Port (Driven Port)
//!
//! Interface for fetching the current list of active orders.

use async_trait::async_trait;

use crate::domain::order::OrderRecord;

/// Failure to obtain a usable order list. Aborts the current cycle only.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The data source could not be reached or answered with an error.
    #[error("network error: {0}")]
    Network(String),

    /// The payload did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Stage label used in logs and metrics.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Network(_) => "fetch",
            Self::Decode(_) => "decode",
        }
    }
}

/// Port for fetching active orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderSourcePort: Send + Sync {
    /// Fetch every active order. One outbound request, no retries.
    async fn fetch_orders(&self) -> Result<Vec<OrderRecord>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels() {
        assert_eq!(FetchError::Network("refused".into()).stage(), "fetch");
        assert_eq!(FetchError::Decode("eof".into()).stage(), "decode");
    }

    #[test]
    fn display_includes_cause() {
        let err = FetchError::Decode("expected value at line 1".into());
        assert_eq!(err.to_string(), "decode error: expected value at line 1");
    }
}
