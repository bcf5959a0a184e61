//! HTTP client module for gateway testing

mod client;

pub use client::{HttpClient, HttpError};
