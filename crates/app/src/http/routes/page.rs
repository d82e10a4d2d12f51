use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use thiserror::Error;
use tracing::error;

use crate::dom::DomError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("render error: {0}")]
    Dom(#[from] DomError),
}

pub async fn get_page(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let page = state.pipeline.render_page(state.host_document()).await?;
    Ok(Html(page.document.to_html()))
}

impl IntoResponse for PageError {
    fn into_response(self) -> axum::response::Response {
        error!(error = %self, "page render failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
