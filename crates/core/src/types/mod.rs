pub mod discussion_number;
pub mod relative_time;
