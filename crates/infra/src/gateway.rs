use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fetch::{FetchError, TimeBoundedFetcher};
use crate::github::DiscussionQuery;
use crate::github::graphql;
use crate::proxy::{self, Ack};
use discrail_core::domain::discussion::Discussion;
use discrail_core::types::discussion_number::DiscussionNumber;

pub const GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

/// Failure taxonomy shared by both channels. Cloneable so one outcome can be
/// handed to every caller waiting on the same request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscussionError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("service error: {0}")]
    Service(String),
    #[error("discussion not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    TransportFailure,
    ServiceError,
    NotFound,
}

impl DiscussionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiscussionError::Timeout(_) => ErrorKind::Timeout,
            DiscussionError::Transport(_) => ErrorKind::TransportFailure,
            DiscussionError::Service(_) => ErrorKind::ServiceError,
            DiscussionError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

impl From<FetchError<reqwest::Error>> for DiscussionError {
    fn from(err: FetchError<reqwest::Error>) -> Self {
        match err {
            FetchError::Timeout(deadline) => DiscussionError::Timeout(deadline),
            FetchError::Failed(err) if err.is_decode() || err.is_status() => {
                DiscussionError::Service(err.to_string())
            }
            FetchError::Failed(err) => DiscussionError::Transport(err.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub graphql_endpoint: String,
    pub token: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub proxy_base: String,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

/// Typed boundary to the read channel (GraphQL) and the write channel
/// (comment proxy).
#[derive(Debug, Clone)]
pub struct DiscussionGateway {
    http: Client,
    graphql_endpoint: String,
    token: String,
    query: DiscussionQuery,
    proxy_base: String,
    read: TimeBoundedFetcher,
    write: TimeBoundedFetcher,
}

impl DiscussionGateway {
    pub fn new(http: Client, options: GatewayOptions) -> Self {
        Self {
            http,
            graphql_endpoint: options.graphql_endpoint,
            token: options.token,
            query: DiscussionQuery::new(options.repo_owner, options.repo_name),
            proxy_base: options.proxy_base,
            read: TimeBoundedFetcher::new(options.read_timeout),
            write: TimeBoundedFetcher::new(options.write_timeout),
        }
    }

    pub async fn fetch_discussion(
        &self,
        number: DiscussionNumber,
    ) -> Result<Discussion, DiscussionError> {
        let result = self.read_discussion(number).await;
        match &result {
            Ok(discussion) => debug!(
                discussion = %number,
                comments = discussion.comments.len(),
                replies = discussion.reply_count(),
                "discussion fetched"
            ),
            Err(err) => warn!(
                discussion = %number,
                kind = ?err.kind(),
                error = %err,
                "discussion fetch failed"
            ),
        }
        result
    }

    pub async fn submit_comment(
        &self,
        discussion_id: &str,
        body: &str,
    ) -> Result<Ack, DiscussionError> {
        let result = self.write_comment(discussion_id, body).await;
        match &result {
            Ok(ack) => info!(discussion_id, status = %ack.status, "comment submitted"),
            Err(err) => warn!(
                discussion_id,
                kind = ?err.kind(),
                error = %err,
                "comment submission failed"
            ),
        }
        result
    }

    async fn read_discussion(
        &self,
        number: DiscussionNumber,
    ) -> Result<Discussion, DiscussionError> {
        let document = self.query.build(number);
        let request =
            graphql::build_request(&self.http, &self.graphql_endpoint, &self.token, &document)
                .map_err(|err| DiscussionError::Transport(err.to_string()))?;
        debug!(
            discussion = %number,
            endpoint = %self.graphql_endpoint,
            deadline_ms = self.read.deadline().as_millis() as u64,
            "querying discussion"
        );
        let raw = self.read.execute(&self.http, request).await?;
        graphql::decode_discussion(raw.status, &raw.body)
    }

    async fn write_comment(&self, discussion_id: &str, body: &str) -> Result<Ack, DiscussionError> {
        let request = proxy::build_request(&self.http, &self.proxy_base, discussion_id, body)
            .map_err(|err| DiscussionError::Transport(err.to_string()))?;
        debug!(
            discussion_id,
            deadline_ms = self.write.deadline().as_millis() as u64,
            "posting comment"
        );
        let raw = self.write.execute(&self.http, request).await?;
        proxy::decode_ack(raw.status, &raw.body)
    }
}
