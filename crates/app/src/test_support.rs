use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use reqwest::Client;
use serde_json::Value;

use crate::config::WidgetConfig;
use discrail_core::types::discussion_number::DiscussionNumber;
use discrail_infra::DiscussionGateway;
use discrail_infra::testing::THREAD_FIXTURE;

pub(crate) use discrail_infra::testing::{closed_base_url, serve};

#[derive(Clone, Default)]
struct UpstreamState {
    reads: Arc<AtomicUsize>,
    submissions: Arc<Mutex<Vec<Value>>>,
}

/// Local stand-in for both the GraphQL service and the comment proxy.
pub(crate) struct Upstream {
    pub base: String,
    state: UpstreamState,
}

impl Upstream {
    pub fn read_count(&self) -> usize {
        self.state.reads.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<Value> {
        self.state.submissions.lock().unwrap().clone()
    }
}

async fn graphql(State(state): State<UpstreamState>) -> &'static str {
    state.reads.fetch_add(1, Ordering::SeqCst);
    THREAD_FIXTURE
}

async fn comment(State(state): State<UpstreamState>, Json(payload): Json<Value>) -> Json<Value> {
    state.submissions.lock().unwrap().push(payload);
    Json(serde_json::json!({ "ok": true }))
}

pub(crate) async fn spawn_upstream() -> Upstream {
    let state = UpstreamState::default();
    let router = Router::new()
        .route("/graphql", post(graphql))
        .route("/api/comment", post(comment))
        .with_state(state.clone());
    let base = serve(router).await;
    Upstream { base, state }
}

pub(crate) fn test_config(base: &str) -> WidgetConfig {
    WidgetConfig {
        discussion_number: DiscussionNumber::new(1).unwrap(),
        auth_token: "read-token".to_string(),
        mount_selector: ".rail".parse().unwrap(),
        api_base: base.to_string(),
        graphql_endpoint: format!("{base}/graphql"),
        repo_owner: "octo-org".to_string(),
        repo_name: "blog".to_string(),
        read_timeout: Duration::from_secs(2),
        write_timeout: Duration::from_secs(2),
        show_fallback: false,
        compose_action: "/compose".to_string(),
        http_addr: "127.0.0.1:0".parse().unwrap(),
    }
}

pub(crate) fn test_gateway(base: &str) -> DiscussionGateway {
    crate::wiring::build_gateway(Client::new(), &test_config(base))
}
