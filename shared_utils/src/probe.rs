//! Image probe module
//!
//! `identify` wrapper used to read the source image's pixel width before
//! any derivative is generated.

use crate::errors::{RespImgError, Result};
use crate::toolchain::Toolchain;
use std::path::Path;
use std::process::Command;
use tracing::error;

/// Query the pixel width of `path` via `identify -format %w`.
///
/// A width that does not parse as a positive integer is an
/// `InvalidWidth` error.
pub fn image_width(tools: &Toolchain, path: &Path) -> Result<u32> {
    if !path.exists() {
        return Err(RespImgError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    if !path.is_file() {
        return Err(RespImgError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Not a file (is it a directory?): {}", path.display()),
        )));
    }

    let mut cmd = Command::new(&tools.identify);
    cmd.args(["-format", "%w"]).arg(path);

    // An identify failure means the width could not be determined, so it
    // surfaces as an invalid width rather than a generic tool failure.
    let output = match tools.run_capture("identify", cmd) {
        Ok(output) => output,
        Err(e) => {
            error!("width probe failed for {}: {}", path.display(), e);
            return Err(RespImgError::InvalidWidth(format!(
                "could not read width of {}: {}",
                path.display(),
                e
            )));
        }
    };

    let raw = String::from_utf8_lossy(&output.stdout);
    parse_width(&raw)
}

pub fn parse_width(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    match trimmed.parse::<u32>() {
        Ok(w) if w > 0 => Ok(w),
        _ => Err(RespImgError::InvalidWidth(format!(
            "identify reported '{}'",
            trimmed
        ))),
    }
}
