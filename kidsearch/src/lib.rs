pub mod api;
pub mod config;
pub mod elastic;
pub mod embeddings;
pub mod error;
pub mod models;
pub mod render;
pub mod services;
