// src/config/mod.rs
pub mod feeds;

pub use feeds::FeedConfig;
