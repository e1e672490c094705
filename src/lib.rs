//! Prism - Terminal front end for an AI data analytics backend.
//!
//! Loads a CSV or JSON file, shows a bounded preview with per-column type
//! labels, and drives a tabbed panel that talks to the analytics backend.
//!
//! ## Layout
//!
//! - **Preview** (`preview`, `classify`) - Parse the first rows of a file and
//!   label each column numeric, datetime or categorical.
//! - **Upload** (`upload`, `clean`, `export`) - File selection lifecycle,
//!   cleaning operations and local exports of the preview.
//! - **Backend** (`api`, `panel`, `commands`) - HTTP client for chat,
//!   visualization and reporting, plus the request-token bookkeeping that
//!   keeps late responses from overwriting newer ones.

pub mod api;
pub mod app;
pub mod classify;
pub mod clean;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod panel;
pub mod preview;
pub mod sections;
pub mod tui;
pub mod ui;
pub mod upload;

#[cfg(test)]
mod testing;
