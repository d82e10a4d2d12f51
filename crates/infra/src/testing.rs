//! Local stand-ins for the GraphQL service and comment proxy, shared with
//! downstream crates through the `testing` feature.

use axum::Router;
use tokio::net::TcpListener;

pub const THREAD_FIXTURE: &str = r#"{
  "data": {
    "repository": {
      "discussion": {
        "id": "D_kwDOfixture",
        "title": "/posts/hello-world",
        "body": "Comments for hello world",
        "comments": {
          "nodes": [
            {
              "id": "DC_a",
              "body": "Nice post",
              "createdAt": "2024-05-01T08:00:00Z",
              "author": { "login": "alice", "avatarUrl": "https://avatars.example/alice" },
              "replies": {
                "nodes": [
                  {
                    "id": "DR_x",
                    "body": "Agreed",
                    "author": { "login": "bob", "avatarUrl": "https://avatars.example/bob" }
                  }
                ]
              }
            },
            {
              "id": "DC_b",
              "body": "Typo in the second paragraph",
              "createdAt": "2024-05-02T09:30:00Z",
              "author": { "login": "carol", "avatarUrl": "https://avatars.example/carol" },
              "replies": { "nodes": [] }
            }
          ]
        }
      }
    }
  }
}"#;

pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing listens on.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
