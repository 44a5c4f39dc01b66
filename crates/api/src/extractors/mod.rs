//! Custom Axum extractors.

pub mod admin_auth;
pub mod client_info;
pub mod json;

pub use admin_auth::AdminAuth;
pub use client_info::ClientInfo;
pub use json::ApiJson;
