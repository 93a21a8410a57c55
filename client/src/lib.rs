pub mod api;
pub mod models;
pub mod sse;
pub mod transcript;
