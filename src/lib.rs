//! BlueQuery - a natural-language query backend for ARGO ocean float data.
//!
//! This library exposes the core modules for use in integration tests.

pub mod answer;
pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod heuristic;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod server;
