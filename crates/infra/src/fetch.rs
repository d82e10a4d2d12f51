use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Request, StatusCode};
use thiserror::Error;
use tokio::time::{Instant, timeout};
use tracing::warn;

/// Default deadline for both channels.
pub const READ_DEADLINE: Duration = Duration::from_secs(8);

#[derive(Debug, Error)]
pub enum FetchError<E> {
    #[error("deadline of {0:?} exceeded")]
    Timeout(Duration),
    #[error("{0}")]
    Failed(E),
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Races a request against a fixed deadline. The request future is dropped
/// when the deadline wins, which aborts the underlying connection; the timer
/// is owned by the call and is gone once the call returns.
#[derive(Debug, Clone, Copy)]
pub struct TimeBoundedFetcher {
    deadline: Duration,
}

impl TimeBoundedFetcher {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub async fn run<F, T, E>(&self, request: F) -> Result<T, FetchError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        let started = Instant::now();
        match timeout(self.deadline, request).await {
            Ok(result) => result.map_err(FetchError::Failed),
            Err(_) => {
                warn!(
                    deadline_ms = self.deadline.as_millis() as u64,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "request cancelled at deadline"
                );
                Err(FetchError::Timeout(self.deadline))
            }
        }
    }

    /// Sends the request and reads the whole body inside the same deadline.
    pub async fn execute(
        &self,
        http: &Client,
        request: Request,
    ) -> Result<RawResponse, FetchError<reqwest::Error>> {
        self.run(async {
            let response = http.execute(request).await?;
            let status = response.status();
            let body = response.text().await?;
            Ok(RawResponse { status, body })
        })
        .await
    }
}
