pub mod fetch;
pub mod gateway;
pub mod github;
pub mod inflight;
pub mod proxy;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use fetch::{FetchError, RawResponse, TimeBoundedFetcher};
pub use gateway::{DiscussionError, DiscussionGateway, ErrorKind, GatewayOptions};
pub use inflight::InflightFetches;
pub use proxy::Ack;
