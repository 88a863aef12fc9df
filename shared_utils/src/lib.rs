//! Shared utilities for the respimg tool
//!
//! This crate provides the infrastructure the variant generator sits on:
//! - External toolchain resolution and invocation (structured argv, no shell)
//! - Image width probing via `identify`
//! - Result ledger and summary reporting
//! - Common logging setup
//! - Unified error type

pub mod errors;
pub mod logging;
pub mod probe;
pub mod report;
pub mod toolchain;

pub use errors::{RespImgError, Result};
pub use probe::image_width;
pub use report::{format_size, print_summary, LedgerEntry, Summary};
pub use toolchain::{default_tool_dirs, locate, Toolchain, DEFAULT_TOOL_PATH, TOOL_NAMES};
