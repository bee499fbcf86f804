// SPDX-License-Identifier: MIT

//! Daylog: Local AI Daily Notes & Report Generator
//!
//! Turns brief daily notes and images into Markdown and PDF reports using a
//! local language model, degrading to deterministic templates when no model
//! or runtime is available.

pub mod config;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod runtime;
pub mod web;

pub use config::AppConfig;
pub use error::{DaylogError, Result};
