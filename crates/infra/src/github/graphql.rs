use chrono::{DateTime, Utc};
use reqwest::{Client, Request, StatusCode};
use serde::{Deserialize, Serialize};

use crate::gateway::DiscussionError;
use discrail_core::domain::discussion::{Author, Comment, Discussion, Reply};

const USER_AGENT: &str = "discrail";
const GHOST_LOGIN: &str = "ghost";
const ERROR_BODY_PREVIEW: usize = 200;

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlErrorItem>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorItem {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryData {
    repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
struct RepositoryNode {
    discussion: Option<DiscussionNode>,
}

#[derive(Debug, Deserialize)]
struct DiscussionNode {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    comments: Connection<CommentNode>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
struct CommentNode {
    id: String,
    #[serde(default)]
    body: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    author: Option<AuthorNode>,
    #[serde(default)]
    replies: Connection<ReplyNode>,
}

#[derive(Debug, Deserialize)]
struct ReplyNode {
    id: String,
    #[serde(default)]
    body: String,
    author: Option<AuthorNode>,
}

#[derive(Debug, Deserialize)]
struct AuthorNode {
    login: Option<String>,
    #[serde(rename = "avatarUrl")]
    avatar_url: Option<String>,
}

pub(crate) fn build_request(
    http: &Client,
    endpoint: &str,
    token: &str,
    document: &str,
) -> reqwest::Result<Request> {
    http.post(endpoint)
        .bearer_auth(token)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/vnd.github+json")
        .json(&GraphqlRequest { query: document })
        .build()
}

/// Decodes the `{data: {repository: {discussion}}}` envelope. A missing
/// discussion anywhere along that path is `NotFound`, never a hard error.
pub fn decode_discussion(status: StatusCode, body: &str) -> Result<Discussion, DiscussionError> {
    if !status.is_success() {
        return Err(DiscussionError::Service(format!(
            "status {status}: {}",
            preview(body)
        )));
    }
    let payload: GraphqlResponse<RepositoryData> = serde_json::from_str(body)
        .map_err(|err| DiscussionError::Service(format!("malformed response: {err}")))?;
    let discussion = payload
        .data
        .and_then(|data| data.repository)
        .and_then(|repository| repository.discussion);
    match discussion {
        Some(node) => node.into_discussion(),
        None => {
            let reason = payload
                .errors
                .map(|errors| {
                    errors
                        .into_iter()
                        .map(|err| err.message)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| "no discussion payload".to_string());
            Err(DiscussionError::NotFound(reason))
        }
    }
}

impl DiscussionNode {
    fn into_discussion(self) -> Result<Discussion, DiscussionError> {
        let mut comments = Vec::with_capacity(self.comments.nodes.len());
        for node in self.comments.nodes.into_iter().flatten() {
            comments.push(map_comment(node)?);
        }
        Ok(Discussion {
            id: self.id,
            title: self.title,
            body: self.body,
            comments,
        })
    }
}

fn map_comment(node: CommentNode) -> Result<Comment, DiscussionError> {
    let created_at = parse_datetime(&node.created_at)?;
    let replies = node
        .replies
        .nodes
        .into_iter()
        .flatten()
        .map(|reply| Reply {
            id: reply.id,
            body: reply.body,
            author: map_author(reply.author),
        })
        .collect();
    Ok(Comment {
        id: node.id,
        body: node.body,
        created_at,
        author: map_author(node.author),
        replies,
    })
}

// Deleted accounts come back as a null author.
fn map_author(node: Option<AuthorNode>) -> Author {
    let (login, avatar_url) = match node {
        Some(author) => (author.login, author.avatar_url),
        None => (None, None),
    };
    Author {
        login: login.unwrap_or_else(|| GHOST_LOGIN.to_string()),
        avatar_url: avatar_url.unwrap_or_default(),
    }
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DiscussionError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DiscussionError::Service(format!("invalid timestamp: {value}")))
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
