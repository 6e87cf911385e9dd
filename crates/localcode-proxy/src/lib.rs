#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod catalog;
pub mod client;
pub mod models;
pub mod server;

pub use catalog::{is_zen_backend, normalize_model_ids, select_free_model};
pub use client::{ClientConfig, DEFAULT_BACKEND_URL, OpenAiClient};
pub use server::{AppState, create_router, serve};
