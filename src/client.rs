use std::{future::Future, time::Duration};

use crate::error::{Error, TileError};

/// User agent sent with every tile request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetches raw tile bodies over HTTP.
///
/// Implementations return the response body of a successful GET and an
/// error for transport failures and non-success statuses alike.
pub trait TileClient: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, TileError>> + Send;
}

/// [`TileClient`] backed by a shared `reqwest` connection pool.
#[derive(Clone, Debug)]
pub struct HttpTileClient {
    client: reqwest::Client,
}

impl HttpTileClient {
    /// Builds a client whose requests time out after `timeout`.
    ///
    /// Pass the zero duration to disable the timeout.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl TileClient for HttpTileClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, TileError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TileError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TileError::Status(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map(|body| body.to_vec())
            .map_err(|e| TileError::Http(e.to_string()))
    }
}
