use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;

use crate::config::WidgetConfig;
use crate::pipeline::Pipeline;
use crate::state::AppState;
use discrail_infra::{DiscussionGateway, GatewayOptions, InflightFetches};

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub fn build_state(config: WidgetConfig, host_page: Option<String>) -> Result<AppState, WiringError> {
    let client = Client::builder().build()?;
    let config = Arc::new(config);
    let gateway = build_gateway(client, &config);
    let pipeline = Pipeline::new(config.clone(), gateway, Arc::new(InflightFetches::new()));
    Ok(AppState {
        config,
        pipeline,
        host_page: host_page.map(Arc::new),
    })
}

pub fn build_gateway(client: Client, config: &WidgetConfig) -> DiscussionGateway {
    DiscussionGateway::new(
        client,
        GatewayOptions {
            graphql_endpoint: config.graphql_endpoint.clone(),
            token: config.auth_token.clone(),
            repo_owner: config.repo_owner.clone(),
            repo_name: config.repo_name.clone(),
            proxy_base: config.api_base.clone(),
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
        },
    )
}
