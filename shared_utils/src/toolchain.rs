//! External Toolchain Module
//!
//! Resolves the image-processing binaries once at startup and wraps each
//! invocation behind an explicit argument list (no shell in between, so
//! filenames with spaces or metacharacters cannot break a command).
//! Subprocesses run with `PATH` set to exactly the configured search path.
//!
//! Tools wrapped here:
//! - `jpegoptim`: lossy JPEG optimization, in place
//! - `pngquant`: PNG quantization, in place
//! - `cwebp` / `dwebp`: WebP encode/decode
//! - `convert` / `identify`: ImageMagick resize, format conversion, probing

use crate::errors::{RespImgError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::info;

/// Default tool search path: common system and package-manager binary
/// directories. Overridable via the `toolPath` setting.
pub const DEFAULT_TOOL_PATH: &[&str] = &[
    "/opt/homebrew/bin",
    "/opt/homebrew/sbin",
    "/usr/local/bin",
    "/usr/bin",
    "/bin",
    "/usr/sbin",
    "/sbin",
];

/// Binaries the generator depends on.
pub const TOOL_NAMES: &[&str] = &[
    "jpegoptim",
    "pngquant",
    "cwebp",
    "dwebp",
    "convert",
    "identify",
];

pub fn default_tool_dirs() -> Vec<PathBuf> {
    DEFAULT_TOOL_PATH.iter().map(PathBuf::from).collect()
}

/// Locate a single binary in the given directories.
pub fn locate(name: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    let search_path = std::env::join_paths(search_dirs).ok()?;
    let cwd = std::env::current_dir().ok()?;
    which::which_in(name, Some(search_path), cwd).ok()
}

/// Resolved locations of every external tool, plus the `PATH` value the
/// subprocesses run under.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub jpegoptim: PathBuf,
    pub pngquant: PathBuf,
    pub cwebp: PathBuf,
    pub dwebp: PathBuf,
    pub convert: PathBuf,
    pub identify: PathBuf,
    search_path: OsString,
}

impl Toolchain {
    /// Resolve every tool against `search_dirs`, failing with the name of
    /// the first binary that cannot be found.
    pub fn resolve(search_dirs: &[PathBuf]) -> Result<Self> {
        let search_path = std::env::join_paths(search_dirs)
            .map_err(|e| RespImgError::Config(format!("invalid tool search path: {}", e)))?;

        let find = |name: &str| -> Result<PathBuf> {
            let cwd = std::env::current_dir()?;
            which::which_in(name, Some(&search_path), cwd).map_err(|_| {
                RespImgError::ToolNotFound(format!(
                    "{} not found in tool search path ({})",
                    name,
                    search_path.to_string_lossy()
                ))
            })
        };

        let jpegoptim = find("jpegoptim")?;
        let pngquant = find("pngquant")?;
        let cwebp = find("cwebp")?;
        let dwebp = find("dwebp")?;
        let convert = find("convert")?;
        let identify = find("identify")?;

        Ok(Self {
            jpegoptim,
            pngquant,
            cwebp,
            dwebp,
            convert,
            identify,
            search_path,
        })
    }

    /// jpegoptim in place: cap quality, strip all metadata, progressive.
    pub fn optimize_jpg(&self, path: &Path, quality: u8) -> Result<()> {
        let mut cmd = Command::new(&self.jpegoptim);
        cmd.arg(format!("-m{}", quality))
            .arg("--strip-all")
            .arg("--all-progressive")
            .arg(path);
        self.run("jpegoptim", cmd)
    }

    /// pngquant in place: overwrite, keep original if the result is larger,
    /// strip metadata.
    pub fn optimize_png(&self, path: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.pngquant);
        cmd.args(["--force", "--skip-if-larger", "--strip"])
            .arg(path)
            .arg("--output")
            .arg(path);
        self.run("pngquant", cmd)
    }

    /// cwebp with the slowest compression method and maximum analysis
    /// passes. `width` requests a proportional resize (height auto).
    pub fn encode_webp(
        &self,
        input: &Path,
        output: &Path,
        quality: u8,
        width: Option<u32>,
    ) -> Result<()> {
        let mut cmd = Command::new(&self.cwebp);
        cmd.args(["-m", "6", "-pass", "10", "-mt", "-q"])
            .arg(quality.to_string());
        if let Some(w) = width {
            cmd.arg("-resize").arg(w.to_string()).arg("0");
        }
        cmd.arg(input).arg("-o").arg(output);
        self.run("cwebp", cmd)
    }

    /// WebP → JPEG through a temporary PNG (dwebp cannot write JPEG itself,
    /// and a structured argv leaves no room for a shell pipe).
    pub fn decode_webp(&self, input: &Path, output: &Path) -> Result<()> {
        let tmp = tempfile::Builder::new()
            .prefix("respimg-")
            .suffix(".png")
            .tempfile()?;

        let mut cmd = Command::new(&self.dwebp);
        cmd.arg(input).arg("-o").arg(tmp.path());
        self.run("dwebp", cmd)?;

        let mut cmd = Command::new(&self.convert);
        cmd.arg(tmp.path()).arg(output);
        self.run("convert", cmd)
    }

    /// ImageMagick format conversion to AVIF, with an optional target width.
    pub fn convert_avif(&self, input: &Path, output: &Path, width: Option<u32>) -> Result<()> {
        let mut cmd = Command::new(&self.convert);
        if let Some(w) = width {
            cmd.arg("-resize").arg(format!("{}x", w));
        }
        cmd.arg(input).arg(output);
        self.run("convert", cmd)
    }

    /// Proportional resize to the given width.
    pub fn resize(&self, input: &Path, output: &Path, width: u32) -> Result<()> {
        let mut cmd = Command::new(&self.convert);
        cmd.arg(input)
            .arg("-resize")
            .arg(format!("{}x", width))
            .arg(output);
        self.run("convert", cmd)
    }

    /// Low-quality placeholder: small adaptive resize with aggressive WebP
    /// encoding parameters (1kB target).
    pub fn lqip(&self, input: &Path, output: &Path, size: u32) -> Result<()> {
        let mut cmd = Command::new(&self.convert);
        cmd.arg(input)
            .arg("-adaptive-resize")
            .arg(format!("{}x", size))
            .args([
                "-define",
                "webp:target-size=1024",
                "-define",
                "webp:mode=6",
                "-define",
                "webp:preprocessing=2",
            ])
            .arg(output);
        self.run("convert", cmd)
    }

    /// Run a command to completion, capturing output. Non-zero exit maps to
    /// `ToolFailed` with the tool's trimmed stderr.
    pub fn run_capture(&self, tool: &str, mut cmd: Command) -> Result<Output> {
        cmd.env_clear().env("PATH", &self.search_path);
        info!("{}", render_command(&cmd));

        let output = cmd.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                format!("exit code {:?}", output.status.code())
            } else {
                stderr
            };
            return Err(RespImgError::ToolFailed {
                tool: tool.to_string(),
                stderr,
            });
        }
        Ok(output)
    }

    fn run(&self, tool: &str, cmd: Command) -> Result<()> {
        self.run_capture(tool, cmd).map(|_| ())
    }
}

fn render_command(cmd: &Command) -> String {
    let mut line = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_command() {
        let mut cmd = Command::new("cwebp");
        cmd.args(["-m", "6", "-q", "85"]).arg("in.jpg");
        assert_eq!(render_command(&cmd), "cwebp -m 6 -q 85 in.jpg");
    }

    #[test]
    fn test_resolve_names_missing_binary() {
        let empty = tempfile::tempdir().unwrap();
        let err = Toolchain::resolve(&[empty.path().to_path_buf()]).unwrap_err();
        match err {
            RespImgError::ToolNotFound(msg) => assert!(msg.contains("jpegoptim")),
            other => panic!("expected ToolNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_missing_binary() {
        let empty = tempfile::tempdir().unwrap();
        assert!(locate("jpegoptim", &[empty.path().to_path_buf()]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_finds_executables() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        for name in TOOL_NAMES {
            let path = dir.path().join(name);
            std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let tools = Toolchain::resolve(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(tools.identify, dir.path().join("identify"));
        assert_eq!(tools.cwebp, dir.path().join("cwebp"));
    }

    #[test]
    fn test_default_tool_path_covers_system_dirs() {
        assert!(DEFAULT_TOOL_PATH.contains(&"/usr/bin"));
        assert!(DEFAULT_TOOL_PATH.contains(&"/usr/local/bin"));
        assert_eq!(default_tool_dirs().len(), DEFAULT_TOOL_PATH.len());
    }
}
