//! One-time secret loading for the hosting boundary.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Secret '{0}' is not set")]
    Missing(String),

    #[error("Secret source error: {0}")]
    Generic(String),
}

pub trait SecretSource: Send + Sync + 'static {
    fn fetch(&self, name: &str) -> impl Future<Output = Result<String, SecretError>> + Send;
}

/// Reads secrets from process environment variables.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvSecretSource;

impl SecretSource for EnvSecretSource {
    async fn fetch(&self, name: &str) -> Result<String, SecretError> {
        std::env::var(name)
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| SecretError::Missing(name.to_string()))
    }
}

/// A secret fetched at most once per process. Failed fetches are not cached.
pub struct CachedSecret<S: SecretSource> {
    name: String,
    source: Arc<S>,
    cell: Arc<OnceCell<String>>,
}

impl<S: SecretSource> Clone for CachedSecret<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            source: self.source.clone(),
            cell: self.cell.clone(),
        }
    }
}

impl<S: SecretSource> CachedSecret<S> {
    pub fn new(source: S, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: Arc::new(source),
            cell: Arc::new(OnceCell::new()),
        }
    }

    pub async fn get(&self) -> Result<&str, SecretError> {
        let value = self
            .cell
            .get_or_try_init(|| async {
                let value = self.source.fetch(&self.name).await?;
                debug!(secret = %self.name, "Secret loaded");
                Ok::<_, SecretError>(value)
            })
            .await?;
        Ok(value.as_str())
    }
}
