//! TransNative - natural English translations of Chinese text
//!
//! This crate provides the HTTP service binary and the reusable pieces behind
//! it: configuration, prompt construction, and the completion-backed translator.

pub mod config;
pub mod error;
pub mod server;
pub mod services;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use services::TranslatorService;
