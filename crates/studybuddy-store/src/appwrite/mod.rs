pub mod api;
pub mod auth;
pub mod client;

pub use auth::AppwriteCredentials;
pub use client::AppwriteStore;
