use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::debug;

use crate::gateway::{DiscussionError, DiscussionGateway};
use discrail_core::domain::discussion::Discussion;
use discrail_core::types::discussion_number::DiscussionNumber;

type Slot = Arc<OnceCell<Result<Discussion, DiscussionError>>>;

/// Collapses concurrent reads of the same discussion into one request. A slot
/// lives only while its request is in flight; later reads fetch fresh data.
#[derive(Debug, Default)]
pub struct InflightFetches {
    slots: Mutex<HashMap<DiscussionNumber, Slot>>,
}

impl InflightFetches {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fetch(
        &self,
        gateway: &DiscussionGateway,
        number: DiscussionNumber,
    ) -> Result<Discussion, DiscussionError> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            match slots.get(&number) {
                Some(slot) => {
                    debug!(discussion = %number, "joining in-flight fetch");
                    slot.clone()
                }
                None => {
                    let slot = Slot::default();
                    slots.insert(number, slot.clone());
                    slot
                }
            }
        };
        let result = slot
            .get_or_init(|| gateway.fetch_discussion(number))
            .await
            .clone();
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots
            .get(&number)
            .is_some_and(|current| Arc::ptr_eq(current, &slot))
        {
            slots.remove(&number);
        }
        result
    }

    pub fn in_flight(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::Router;
    use axum::extract::State;
    use axum::routing::post;
    use reqwest::Client;

    use super::*;
    use crate::gateway::GatewayOptions;
    use crate::testing::{THREAD_FIXTURE, serve};

    async fn slow_thread(State(hits): State<Arc<AtomicUsize>>) -> &'static str {
        hits.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(200)).await;
        THREAD_FIXTURE
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route("/graphql", post(slow_thread))
            .with_state(hits.clone());
        let base = serve(router).await;
        let gateway = DiscussionGateway::new(
            Client::new(),
            GatewayOptions {
                graphql_endpoint: format!("{base}/graphql"),
                token: "t".to_string(),
                repo_owner: "o".to_string(),
                repo_name: "r".to_string(),
                proxy_base: base.clone(),
                read_timeout: Duration::from_secs(5),
                write_timeout: Duration::from_secs(5),
            },
        );
        let inflight = InflightFetches::new();
        let number = DiscussionNumber::new(1).unwrap();

        let (first, second) = tokio::join!(
            inflight.fetch(&gateway, number),
            inflight.fetch(&gateway, number)
        );
        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(inflight.in_flight(), 0);

        inflight.fetch(&gateway, number).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
