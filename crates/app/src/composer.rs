use thiserror::Error;
use tracing::debug;

use crate::dom::Element;
use discrail_infra::{Ack, DiscussionError, DiscussionGateway};

#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("comment body is empty")]
    EmptyBody,
    #[error("comment already submitted")]
    AlreadySubmitted,
    #[error("submission failed: {0}")]
    Gateway(#[from] DiscussionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    Idle,
    Submitting,
    Done,
}

/// Draft form bound to one discussion. One composer performs at most one
/// write; the page is reloaded afterwards and a fresh composer is mounted.
#[derive(Debug, Clone)]
pub struct Composer {
    discussion_id: String,
    state: ComposerState,
}

impl Composer {
    pub fn new(discussion_id: impl Into<String>) -> Self {
        Self {
            discussion_id: discussion_id.into(),
            state: ComposerState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ComposerState {
        self.state
    }

    pub fn form(&self, action: &str) -> Element {
        Element::new("form")
            .class("composer")
            .attr("method", "post")
            .attr("action", action)
            .attr("data-discussion-id", self.discussion_id.as_str())
            .child(
                Element::new("input")
                    .attr("type", "hidden")
                    .attr("name", "discussion_id")
                    .attr("value", self.discussion_id.as_str()),
            )
            .child(
                Element::new("textarea")
                    .attr("name", "body")
                    .attr("rows", "4")
                    .attr("placeholder", "Leave a comment")
                    .attr("required", ""),
            )
            .child(
                Element::new("button")
                    .attr("type", "submit")
                    .text("Comment"),
            )
    }

    /// Whitespace-only drafts are rejected before any request is made.
    pub async fn submit(
        &mut self,
        gateway: &DiscussionGateway,
        draft: &str,
    ) -> Result<Ack, ComposerError> {
        if self.state != ComposerState::Idle {
            return Err(ComposerError::AlreadySubmitted);
        }
        if draft.trim().is_empty() {
            return Err(ComposerError::EmptyBody);
        }
        self.state = ComposerState::Submitting;
        debug!(discussion_id = %self.discussion_id, "submitting comment");
        let result = gateway.submit_comment(&self.discussion_id, draft).await;
        self.state = ComposerState::Done;
        Ok(result?)
    }
}
