//! Translation services

pub mod prompt;
pub mod translator;

pub use translator::TranslatorService;
