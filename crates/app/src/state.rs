use std::sync::Arc;

use crate::config::WidgetConfig;
use crate::dom::Document;
use crate::pipeline::Pipeline;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<WidgetConfig>,
    pub pipeline: Pipeline,
    pub host_page: Option<Arc<String>>,
}

impl AppState {
    /// A fresh copy of the host page for every render.
    pub fn host_document(&self) -> Document {
        match self.host_page.as_deref() {
            Some(html) => Document::parse(html),
            None => Document::shell(&format!("Discussion #{}", self.config.discussion_number)),
        }
    }
}
