pub mod graphql;
pub mod query;

pub use query::{DiscussionQuery, PAGE_SIZE};
