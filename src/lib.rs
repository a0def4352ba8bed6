#![deny(missing_docs)]

//! Core library for the Confluence question-answering pipeline.

/// Chat-completion client abstraction and the OpenAI-compatible backend.
pub mod completion;
/// Environment-driven configuration management.
pub mod config;
/// Confluence content API client.
pub mod confluence;
/// Structured logging and tracing setup.
pub mod logging;
/// Sequential search, suggest, fetch, answer orchestration.
pub mod pipeline;
/// Markup stripping and length budgeting.
pub mod sanitize;
/// Heuristic question suggestions derived from page titles.
pub mod suggest;
