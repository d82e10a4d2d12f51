use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::composer::{Composer, ComposerError};
use crate::config::WidgetConfig;
use crate::dom::{Document, DomError};
use crate::render::{render_failure, render_thread};
use discrail_core::domain::discussion::Discussion;
use discrail_infra::{Ack, DiscussionError, DiscussionGateway, InflightFetches};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mounted {
    Thread { comments: usize, replies: usize },
    Fallback,
    Nothing,
}

#[derive(Debug)]
pub struct RenderedPage {
    pub document: Document,
    pub mounted: Mounted,
    pub discussion_id: Option<String>,
}

/// fetch -> render -> mount composer, and submit -> reload.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<WidgetConfig>,
    gateway: DiscussionGateway,
    inflight: Arc<InflightFetches>,
}

impl Pipeline {
    pub fn new(
        config: Arc<WidgetConfig>,
        gateway: DiscussionGateway,
        inflight: Arc<InflightFetches>,
    ) -> Self {
        Self {
            config,
            gateway,
            inflight,
        }
    }

    pub async fn render_page(&self, document: Document) -> Result<RenderedPage, DomError> {
        let outcome = self
            .inflight
            .fetch(&self.gateway, self.config.discussion_number)
            .await;
        self.mount_outcome(document, &outcome, Utc::now())
    }

    /// Rendering only starts once the fetch has settled; failures never
    /// mount a composer.
    pub fn mount_outcome(
        &self,
        mut document: Document,
        outcome: &Result<Discussion, DiscussionError>,
        now: DateTime<Utc>,
    ) -> Result<RenderedPage, DomError> {
        let mount = &self.config.mount_selector;
        match outcome {
            Ok(discussion) => {
                let composer = Composer::new(discussion.id.clone());
                render_thread(
                    &mut document,
                    mount,
                    discussion,
                    &composer,
                    &self.config.compose_action,
                    now,
                )?;
                let mounted = Mounted::Thread {
                    comments: discussion.comments.len(),
                    replies: discussion.reply_count(),
                };
                info!(discussion = %self.config.discussion_number, ?mounted, "thread mounted");
                Ok(RenderedPage {
                    document,
                    mounted,
                    discussion_id: Some(discussion.id.clone()),
                })
            }
            Err(err) => {
                let shown = render_failure(&mut document, mount, err, self.config.show_fallback)?;
                let mounted = if shown { Mounted::Fallback } else { Mounted::Nothing };
                warn!(
                    discussion = %self.config.discussion_number,
                    kind = ?err.kind(),
                    ?mounted,
                    "thread not mounted"
                );
                Ok(RenderedPage {
                    document,
                    mounted,
                    discussion_id: None,
                })
            }
        }
    }

    /// One submit event, one write. Overlapping submissions are independent.
    pub async fn submit(&self, discussion_id: &str, draft: &str) -> Result<Ack, ComposerError> {
        let mut composer = Composer::new(discussion_id);
        composer.submit(&self.gateway, draft).await
    }

    /// Submits, then reloads regardless of the write outcome.
    pub async fn submit_and_reload(
        &self,
        discussion_id: &str,
        draft: &str,
        document: Document,
    ) -> Result<(Result<Ack, ComposerError>, RenderedPage), DomError> {
        let submitted = self.submit(discussion_id, draft).await;
        if let Err(err) = &submitted {
            warn!(discussion_id, error = %err, "comment not submitted; reloading anyway");
        }
        let page = self.render_page(document).await?;
        Ok((submitted, page))
    }
}
