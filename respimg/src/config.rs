//! Configuration resolution
//!
//! Settings come from three layers: CLI flags, an optional JSON settings
//! file, and interactive prompts for whatever is still missing. The prompt
//! flow is an explicit state machine (`NeedQuality → NeedFormat → Ready`)
//! so every presence/absence combination takes the same path.

use clap::ValueEnum;
use console::Term;
use serde::{Deserialize, Serialize};
use shared_utils::errors::{RespImgError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_QUALITY: i64 = 90;
pub const DEFAULT_LQIP_SIZE: u32 = 64;

/// Placeholder output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LqipFormat {
    Jpg,
    Webp,
    Avif,
}

impl LqipFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            LqipFormat::Jpg => "jpg",
            LqipFormat::Webp => "webp",
            LqipFormat::Avif => "avif",
        }
    }
}

impl fmt::Display for LqipFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Stored settings; every field optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub quality: Option<i64>,
    pub lqip_type: Option<LqipFormat>,
    pub lqip_size: Option<u32>,
    pub avif_support: Option<bool>,
    pub tool_path: Option<Vec<PathBuf>>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            RespImgError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load from `path` when it exists. A missing file is just defaults; a
    /// malformed one is a `Config` error, never silently dropped settings.
    pub fn load_optional(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// `~/.config/respimg.json` when present, defaults otherwise.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_optional(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(PathBuf::from(home).join(".config").join("respimg.json"))
    }
}

/// CLI AVIF flags beat the stored setting; `--no-avif` wins over a stored
/// `avifSupport: true`.
pub fn resolve_avif(avif: bool, no_avif: bool, stored: Option<bool>) -> bool {
    if avif {
        true
    } else if no_avif {
        false
    } else {
        stored.unwrap_or(false)
    }
}

/// Fully resolved per-invocation configuration. Quality is validated later,
/// in the generation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateConfig {
    pub quality: i64,
    pub lqip_format: LqipFormat,
    pub lqip_size: u32,
    pub avif: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    NeedQuality,
    NeedFormat,
    Ready,
}

/// Source of answers for missing settings. Implemented by the terminal
/// prompter and, in tests, by scripted prompters.
pub trait Prompter {
    fn ask_quality(&mut self, default: i64) -> Result<i64>;
    fn ask_format(&mut self) -> Result<LqipFormat>;
}

/// Configuration with possibly-missing prompted fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingConfig {
    pub quality: Option<i64>,
    pub lqip_format: Option<LqipFormat>,
    pub lqip_size: u32,
    pub avif: bool,
}

impl PendingConfig {
    pub fn state(&self) -> PromptState {
        match (self.quality, self.lqip_format) {
            (None, _) => PromptState::NeedQuality,
            (Some(_), None) => PromptState::NeedFormat,
            (Some(_), Some(_)) => PromptState::Ready,
        }
    }

    /// Drive the state machine to `Ready`, prompting for each missing field
    /// in order (quality first, then format).
    pub fn resolve(mut self, prompter: &mut dyn Prompter) -> Result<GenerateConfig> {
        loop {
            match self.state() {
                PromptState::NeedQuality => {
                    self.quality = Some(prompter.ask_quality(DEFAULT_QUALITY)?);
                }
                PromptState::NeedFormat => {
                    self.lqip_format = Some(prompter.ask_format()?);
                }
                PromptState::Ready => {
                    return Ok(GenerateConfig {
                        quality: self.quality.unwrap_or(DEFAULT_QUALITY),
                        lqip_format: self.lqip_format.unwrap_or(LqipFormat::Jpg),
                        lqip_size: self.lqip_size,
                        avif: self.avif,
                    });
                }
            }
        }
    }
}

/// Interactive prompts on the user's terminal.
pub struct TermPrompter {
    term: Term,
}

impl TermPrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Default for TermPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TermPrompter {
    fn ask_quality(&mut self, default: i64) -> Result<i64> {
        self.term.write_str(&format!("Quality [{}]: ", default))?;
        let line = self.term.read_line()?;
        parse_quality_reply(&line, default)
    }

    fn ask_format(&mut self) -> Result<LqipFormat> {
        self.term
            .write_str("Select lqip format (jpg/webp/avif) [jpg]: ")?;
        let line = self.term.read_line()?;
        parse_format_reply(&line)
    }
}

/// Prompter for non-interactive runs: any missing setting is an error.
pub struct NoPrompter;

impl Prompter for NoPrompter {
    fn ask_quality(&mut self, _default: i64) -> Result<i64> {
        Err(RespImgError::Config(
            "quality not set and prompting is disabled (pass --quality)".to_string(),
        ))
    }

    fn ask_format(&mut self) -> Result<LqipFormat> {
        Err(RespImgError::Config(
            "lqip format not set and prompting is disabled (pass --lqip-format)".to_string(),
        ))
    }
}

pub fn parse_quality_reply(reply: &str, default: i64) -> Result<i64> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| RespImgError::InvalidQuality(trimmed.to_string()))
}

pub fn parse_format_reply(reply: &str) -> Result<LqipFormat> {
    match reply.trim().to_lowercase().as_str() {
        "" | "jpg" => Ok(LqipFormat::Jpg),
        "webp" => Ok(LqipFormat::Webp),
        "avif" => Ok(LqipFormat::Avif),
        other => Err(RespImgError::Config(format!(
            "unknown lqip format '{}' (expected jpg, webp or avif)",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted {
        quality: Option<i64>,
        format: Option<LqipFormat>,
        quality_asked: usize,
        format_asked: usize,
    }

    impl Scripted {
        fn new(quality: Option<i64>, format: Option<LqipFormat>) -> Self {
            Self {
                quality,
                format,
                quality_asked: 0,
                format_asked: 0,
            }
        }
    }

    impl Prompter for Scripted {
        fn ask_quality(&mut self, default: i64) -> Result<i64> {
            self.quality_asked += 1;
            Ok(self.quality.unwrap_or(default))
        }

        fn ask_format(&mut self) -> Result<LqipFormat> {
            self.format_asked += 1;
            Ok(self.format.unwrap_or(LqipFormat::Jpg))
        }
    }

    fn pending(quality: Option<i64>, format: Option<LqipFormat>) -> PendingConfig {
        PendingConfig {
            quality,
            lqip_format: format,
            lqip_size: DEFAULT_LQIP_SIZE,
            avif: false,
        }
    }

    #[test]
    fn test_state_machine_transitions() {
        assert_eq!(pending(None, None).state(), PromptState::NeedQuality);
        assert_eq!(
            pending(None, Some(LqipFormat::Webp)).state(),
            PromptState::NeedQuality
        );
        assert_eq!(pending(Some(85), None).state(), PromptState::NeedFormat);
        assert_eq!(
            pending(Some(85), Some(LqipFormat::Webp)).state(),
            PromptState::Ready
        );
    }

    #[test]
    fn test_resolve_both_present_never_prompts() {
        let mut prompter = Scripted::new(None, None);
        let config = pending(Some(80), Some(LqipFormat::Avif))
            .resolve(&mut prompter)
            .unwrap();
        assert_eq!(config.quality, 80);
        assert_eq!(config.lqip_format, LqipFormat::Avif);
        assert_eq!(prompter.quality_asked, 0);
        assert_eq!(prompter.format_asked, 0);
    }

    #[test]
    fn test_resolve_both_missing_prompts_quality_then_format() {
        let mut prompter = Scripted::new(Some(70), Some(LqipFormat::Webp));
        let config = pending(None, None).resolve(&mut prompter).unwrap();
        assert_eq!(config.quality, 70);
        assert_eq!(config.lqip_format, LqipFormat::Webp);
        assert_eq!(prompter.quality_asked, 1);
        assert_eq!(prompter.format_asked, 1);
    }

    #[test]
    fn test_resolve_quality_missing_only() {
        let mut prompter = Scripted::new(None, None);
        let config = pending(None, Some(LqipFormat::Jpg))
            .resolve(&mut prompter)
            .unwrap();
        assert_eq!(config.quality, DEFAULT_QUALITY);
        assert_eq!(prompter.quality_asked, 1);
        assert_eq!(prompter.format_asked, 0);
    }

    #[test]
    fn test_resolve_format_missing_only() {
        let mut prompter = Scripted::new(None, Some(LqipFormat::Avif));
        let config = pending(Some(95), None).resolve(&mut prompter).unwrap();
        assert_eq!(config.quality, 95);
        assert_eq!(config.lqip_format, LqipFormat::Avif);
        assert_eq!(prompter.quality_asked, 0);
        assert_eq!(prompter.format_asked, 1);
    }

    #[test]
    fn test_no_prompter_errors_on_missing_quality() {
        let err = pending(None, None).resolve(&mut NoPrompter).unwrap_err();
        assert!(err.to_string().contains("quality not set"));
    }

    #[test]
    fn test_parse_quality_reply() {
        assert_eq!(parse_quality_reply("", 90).unwrap(), 90);
        assert_eq!(parse_quality_reply("  \n", 90).unwrap(), 90);
        assert_eq!(parse_quality_reply("85", 90).unwrap(), 85);
        assert_eq!(parse_quality_reply("-5", 90).unwrap(), -5);

        let err = parse_quality_reply("high", 90).unwrap_err();
        assert!(err.to_string().contains("Invalid quality value"));
    }

    #[test]
    fn test_parse_format_reply() {
        assert_eq!(parse_format_reply("").unwrap(), LqipFormat::Jpg);
        assert_eq!(parse_format_reply("jpg").unwrap(), LqipFormat::Jpg);
        assert_eq!(parse_format_reply("WEBP\n").unwrap(), LqipFormat::Webp);
        assert_eq!(parse_format_reply("avif").unwrap(), LqipFormat::Avif);
        assert!(parse_format_reply("gif").is_err());
    }

    #[test]
    fn test_settings_parse_camel_case() {
        let json = r#"{
            "quality": 85,
            "lqipType": "webp",
            "lqipSize": 32,
            "avifSupport": true,
            "toolPath": ["/usr/local/bin"]
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.quality, Some(85));
        assert_eq!(settings.lqip_type, Some(LqipFormat::Webp));
        assert_eq!(settings.lqip_size, Some(32));
        assert_eq!(settings.avif_support, Some(true));
        assert_eq!(
            settings.tool_path,
            Some(vec![PathBuf::from("/usr/local/bin")])
        );
    }

    #[test]
    fn test_settings_all_fields_optional() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert!(settings.quality.is_none());
        assert!(settings.lqip_type.is_none());
    }

    #[test]
    fn test_settings_load_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("respimg.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn test_load_optional_missing_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_optional(&dir.path().join("respimg.json")).unwrap();
        assert!(settings.quality.is_none());
        assert!(settings.avif_support.is_none());
    }

    #[test]
    fn test_load_optional_propagates_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("respimg.json");
        std::fs::write(&path, r#"{ "quality": "oops""#).unwrap();

        let err = Settings::load_optional(&path).unwrap_err();
        assert!(
            matches!(err, RespImgError::Config(_)),
            "malformed settings must not fall back to defaults, got {:?}",
            err
        );
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_load_optional_reads_stored_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("respimg.json");
        std::fs::write(&path, r#"{ "quality": 75, "avifSupport": true }"#).unwrap();

        let settings = Settings::load_optional(&path).unwrap();
        assert_eq!(settings.quality, Some(75));
        assert_eq!(settings.avif_support, Some(true));
    }

    #[test]
    fn test_resolve_avif_precedence() {
        // explicit flag beats everything
        assert!(resolve_avif(true, false, Some(false)));
        assert!(resolve_avif(true, false, None));
        // --no-avif overrides a stored avifSupport: true
        assert!(!resolve_avif(false, true, Some(true)));
        // otherwise the stored setting decides, defaulting to off
        assert!(resolve_avif(false, false, Some(true)));
        assert!(!resolve_avif(false, false, Some(false)));
        assert!(!resolve_avif(false, false, None));
    }
}
