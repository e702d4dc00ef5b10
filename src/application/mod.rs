//! Application services layer.

pub mod blogs;
pub mod error;
pub mod pagination;
pub mod repos;
pub mod sessions;
pub mod users;
