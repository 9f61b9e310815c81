pub mod client;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod models;

pub use client::{ApiError, HttpShortenerClient, ShortenerApi};
pub use controller::Controller;
