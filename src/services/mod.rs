pub mod auth;
pub mod posts;
pub mod upload;
pub mod user;
