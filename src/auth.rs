//! Authentication seam.
//!
//! The client never hardcodes how bearer tokens are minted. Anything that can
//! produce a token string — a fixed personal access token, an OAuth token
//! cache with refresh, a secrets manager — plugs in through [`TokenProvider`].

use async_trait::async_trait;

use crate::error::Result;

/// Supplies the bearer token attached to every request.
///
/// Implementations may rotate tokens between calls; the client asks for a
/// fresh value on each request rather than caching one at build time.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return the current bearer token.
    async fn token(&self) -> Result<String>;
}

/// A fixed token, e.g. a personal access token.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    /// Wrap a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let provider = StaticToken::new("pat_abc123");
        assert_eq!(provider.token().await.unwrap(), "pat_abc123");
    }
}
