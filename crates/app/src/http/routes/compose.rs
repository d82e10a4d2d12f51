use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::response::Redirect;
use serde::Deserialize;
use tracing::warn;

use crate::state::AppState;

const MAX_BODY_LEN: usize = 65_536;

#[derive(Debug, Deserialize)]
pub struct ComposeForm {
    pub discussion_id: String,
    #[serde(default)]
    pub body: String,
}

/// Always answers with a redirect back to the page, which refetches the
/// thread; a failed write is only visible in the logs.
pub async fn post_compose(
    State(state): State<AppState>,
    form: Result<Form<ComposeForm>, FormRejection>,
) -> Redirect {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!(error = %rejection, "compose form could not be decoded");
            return Redirect::to("/");
        }
    };
    let discussion_id = form.discussion_id.trim();
    if discussion_id.is_empty() || form.body.len() > MAX_BODY_LEN {
        warn!(
            body_len = form.body.len(),
            "compose form rejected before submission"
        );
        return Redirect::to("/");
    }
    if let Err(err) = state.pipeline.submit(discussion_id, &form.body).await {
        warn!(discussion_id, error = %err, "compose submission failed");
    }
    Redirect::to("/")
}
