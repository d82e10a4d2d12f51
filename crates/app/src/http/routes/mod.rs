pub mod compose;
pub mod health;
pub mod page;
