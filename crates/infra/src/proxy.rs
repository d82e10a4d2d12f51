use reqwest::{Client, Request, StatusCode};
use serde::Serialize;

use crate::gateway::DiscussionError;

pub const COMMENT_PATH: &str = "/api/comment";

/// Acknowledgement from the comment proxy. Only the status is checked; the
/// body is not interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub status: StatusCode,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentSubmission<'a> {
    discussion_id: &'a str,
    body: &'a str,
}

pub fn comment_url(proxy_base: &str) -> String {
    format!("{}{COMMENT_PATH}", proxy_base.trim_end_matches('/'))
}

pub(crate) fn build_request(
    http: &Client,
    proxy_base: &str,
    discussion_id: &str,
    body: &str,
) -> reqwest::Result<Request> {
    http.post(comment_url(proxy_base))
        .json(&CommentSubmission {
            discussion_id,
            body,
        })
        .build()
}

pub(crate) fn decode_ack(status: StatusCode, body: &str) -> Result<Ack, DiscussionError> {
    if !status.is_success() {
        let trimmed = body.trim();
        return Err(DiscussionError::Service(if trimmed.is_empty() {
            format!("proxy returned {status}")
        } else {
            format!("proxy returned {status}: {}", trimmed.chars().take(200).collect::<String>())
        }));
    }
    Ok(Ack { status })
}
