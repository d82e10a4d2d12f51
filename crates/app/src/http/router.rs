use axum::Router;
use axum::routing::{get, post};

use crate::http::routes::{compose, health, page};
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    let compose_action = state.config.compose_action.clone();
    Router::new()
        .route("/", get(page::get_page))
        .route(&compose_action, post(compose::post_compose))
        .route("/health", get(health::health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;
    use reqwest::redirect::Policy;
    use scraper::{Html, Selector};

    use super::build;
    use crate::pipeline::Pipeline;
    use crate::state::AppState;
    use crate::test_support::{serve, spawn_upstream, test_config, test_gateway};
    use discrail_infra::InflightFetches;

    async fn widget(upstream_base: &str, host_page: Option<&str>) -> String {
        let config = Arc::new(test_config(upstream_base));
        let state = AppState {
            config: config.clone(),
            pipeline: Pipeline::new(
                config,
                test_gateway(upstream_base),
                Arc::new(InflightFetches::new()),
            ),
            host_page: host_page.map(|html| Arc::new(html.to_string())),
        };
        serve(build(state)).await
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn page_mounts_thread_into_host_page() {
        let upstream = spawn_upstream().await;
        let base = widget(
            &upstream.base,
            Some(r#"<html><body><article>Post</article><aside class="rail"></aside></body></html>"#),
        )
        .await;
        let response = client().get(format!("{base}/")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.text().await.unwrap();
        let html = Html::parse_document(&body);
        let articles = Selector::parse("aside.rail article.comment").expect("selector");
        assert_eq!(html.select(&articles).count(), 2);
        assert!(body.contains("<article>Post</article>"));
    }

    #[tokio::test]
    async fn compose_submits_and_redirects_to_page() {
        let upstream = spawn_upstream().await;
        let base = widget(&upstream.base, None).await;
        let response = client()
            .post(format!("{base}/compose"))
            .header("content-type", "application/x-www-form-urlencoded")
            .body("discussion_id=D_kwDOfixture&body=Hello+from+the+form")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");
        let submissions = upstream.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0]["body"], "Hello from the form");
    }

    #[tokio::test]
    async fn empty_compose_redirects_without_write() {
        let upstream = spawn_upstream().await;
        let base = widget(&upstream.base, None).await;
        let response = client()
            .post(format!("{base}/compose"))
            .header("content-type", "application/x-www-form-urlencoded")
            .body("discussion_id=D_kwDOfixture&body=+++")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(upstream.submissions().is_empty());
    }

    #[tokio::test]
    async fn malformed_compose_still_redirects() {
        let upstream = spawn_upstream().await;
        let base = widget(&upstream.base, None).await;
        for (content_type, body) in [
            ("application/x-www-form-urlencoded", "body=no+discussion+id"),
            ("application/json", r#"{"discussion_id":"D_1","body":"hi"}"#),
        ] {
            let response = client()
                .post(format!("{base}/compose"))
                .header("content-type", content_type)
                .body(body)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(response.headers()["location"], "/");
        }
        assert!(upstream.submissions().is_empty());
    }

    #[tokio::test]
    async fn health_reports_discussion() {
        let upstream = spawn_upstream().await;
        let base = widget(&upstream.base, None).await;
        let body: serde_json::Value = client()
            .get(format!("{base}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["discussion"], 1);
    }
}
