//! Filename derivation
//!
//! Pure suffix-substitution from the "@2x" source path to every derivative
//! path its extension family needs. No I/O happens here; the same input
//! always yields the same plan.

use crate::config::LqipFormat;
use shared_utils::errors::{RespImgError, Result};
use std::path::{Path, PathBuf};

/// Extension families the generator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFamily {
    Jpg,
    Png,
    Webp,
}

impl SourceFamily {
    /// Classify a source by its extension. Anything other than `jpg`,
    /// `png` or `webp` is an unsupported format.
    pub fn classify(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jpg") => Ok(SourceFamily::Jpg),
            Some("png") => Ok(SourceFamily::Png),
            Some("webp") => Ok(SourceFamily::Webp),
            other => Err(RespImgError::UnsupportedFormat(format!(
                "'{}' is not a supported source (expected .jpg, .png or .webp): {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SourceFamily::Jpg => "jpg",
            SourceFamily::Png => "png",
            SourceFamily::Webp => "webp",
        }
    }
}

/// What a derivative is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeRole {
    /// Half-width raster (`name.jpg` / `name.png`)
    Raster1x,
    /// Full-width raster decoded from a webp source (`name@2x.jpg`)
    Raster2x,
    /// Half-width WebP (`name.webp`)
    Webp1x,
    /// Full-width WebP (`name@2x.webp`)
    Webp2x,
    /// Half-width AVIF (`name.avif`)
    Avif1x,
    /// Full-width AVIF (`name@2x.avif`)
    Avif2x,
    /// Low-quality placeholder (`name@lqip.<ext>`)
    Lqip,
}

impl DerivativeRole {
    pub fn label(&self) -> &'static str {
        match self {
            DerivativeRole::Raster1x => "1x raster",
            DerivativeRole::Raster2x => "2x raster",
            DerivativeRole::Webp1x => "1x webp",
            DerivativeRole::Webp2x => "2x webp",
            DerivativeRole::Avif1x => "1x avif",
            DerivativeRole::Avif2x => "2x avif",
            DerivativeRole::Lqip => "placeholder",
        }
    }
}

/// Ordered role → output path mapping for one source.
#[derive(Debug, Clone, Default)]
pub struct DerivativePlan {
    entries: Vec<(DerivativeRole, PathBuf)>,
}

impl DerivativePlan {
    fn insert(&mut self, role: DerivativeRole, path: PathBuf) {
        self.entries.push((role, path));
    }

    pub fn path(&self, role: DerivativeRole) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, p)| p.as_path())
    }

    pub fn roles(&self) -> impl Iterator<Item = DerivativeRole> + '_ {
        self.entries.iter().map(|(r, _)| *r)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|(_, p)| p.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Literal suffix replacement; a non-matching suffix leaves the path as is.
fn replace_suffix(path: &Path, suffix: &str, replacement: &str) -> PathBuf {
    let s = path.to_string_lossy();
    match s.strip_suffix(suffix) {
        Some(stem) => PathBuf::from(format!("{}{}", stem, replacement)),
        None => path.to_path_buf(),
    }
}

/// Compute every derivative path for `source`.
///
/// The jpg family always uses a `.jpg` placeholder; png and webp honor the
/// configured placeholder format. AVIF paths appear only when enabled.
pub fn derive_plan(
    source: &Path,
    family: SourceFamily,
    lqip_format: LqipFormat,
    avif: bool,
) -> DerivativePlan {
    let mut plan = DerivativePlan::default();
    let ext = family.extension();
    let at2x = format!("@2x.{}", ext);
    let plain = format!(".{}", ext);

    match family {
        SourceFamily::Jpg | SourceFamily::Png => {
            plan.insert(
                DerivativeRole::Webp2x,
                replace_suffix(source, &plain, ".webp"),
            );
            if avif {
                plan.insert(
                    DerivativeRole::Avif1x,
                    replace_suffix(source, &at2x, ".avif"),
                );
                plan.insert(
                    DerivativeRole::Avif2x,
                    replace_suffix(source, &plain, ".avif"),
                );
            }
            plan.insert(
                DerivativeRole::Raster1x,
                replace_suffix(source, &at2x, &plain),
            );
            plan.insert(
                DerivativeRole::Webp1x,
                replace_suffix(source, &at2x, ".webp"),
            );
            let lqip_ext = match family {
                SourceFamily::Jpg => "jpg",
                _ => lqip_format.extension(),
            };
            plan.insert(
                DerivativeRole::Lqip,
                replace_suffix(source, &at2x, &format!("@lqip.{}", lqip_ext)),
            );
        }
        SourceFamily::Webp => {
            plan.insert(
                DerivativeRole::Raster2x,
                replace_suffix(source, &plain, ".jpg"),
            );
            if avif {
                plan.insert(
                    DerivativeRole::Avif1x,
                    replace_suffix(source, &at2x, ".avif"),
                );
                plan.insert(
                    DerivativeRole::Avif2x,
                    replace_suffix(source, &plain, ".avif"),
                );
            }
            plan.insert(
                DerivativeRole::Raster1x,
                replace_suffix(source, &at2x, ".jpg"),
            );
            plan.insert(
                DerivativeRole::Webp1x,
                replace_suffix(source, &at2x, ".webp"),
            );
            plan.insert(
                DerivativeRole::Lqip,
                replace_suffix(
                    source,
                    &at2x,
                    &format!("@lqip.{}", lqip_format.extension()),
                ),
            );
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(plan: &DerivativePlan) -> Vec<String> {
        plan.paths()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            SourceFamily::classify(Path::new("a@2x.jpg")).unwrap(),
            SourceFamily::Jpg
        );
        assert_eq!(
            SourceFamily::classify(Path::new("a@2x.png")).unwrap(),
            SourceFamily::Png
        );
        assert_eq!(
            SourceFamily::classify(Path::new("a@2x.webp")).unwrap(),
            SourceFamily::Webp
        );
    }

    #[test]
    fn test_classify_rejects_unknown_extensions() {
        for name in ["a.gif", "a.tiff", "a.JPG", "noext", "a."] {
            let err = SourceFamily::classify(Path::new(name)).unwrap_err();
            assert!(
                err.to_string().contains("Unsupported source format"),
                "{} should be unsupported",
                name
            );
        }
    }

    #[test]
    fn test_jpg_plan_exact_set_without_avif() {
        let plan = derive_plan(
            Path::new("name@2x.jpg"),
            SourceFamily::Jpg,
            LqipFormat::Jpg,
            false,
        );
        let mut got = paths(&plan);
        got.sort();
        assert_eq!(
            got,
            vec!["name.jpg", "name.webp", "name@2x.webp", "name@lqip.jpg"]
        );
    }

    #[test]
    fn test_png_plan_placeholder_follows_configured_format() {
        let plan = derive_plan(
            Path::new("name@2x.png"),
            SourceFamily::Png,
            LqipFormat::Webp,
            false,
        );
        assert_eq!(
            plan.path(DerivativeRole::Lqip).unwrap(),
            Path::new("name@lqip.webp")
        );
    }

    #[test]
    fn test_jpg_placeholder_ignores_configured_format() {
        let plan = derive_plan(
            Path::new("name@2x.jpg"),
            SourceFamily::Jpg,
            LqipFormat::Avif,
            false,
        );
        assert_eq!(
            plan.path(DerivativeRole::Lqip).unwrap(),
            Path::new("name@lqip.jpg")
        );
    }

    #[test]
    fn test_avif_paths_only_when_enabled() {
        let off = derive_plan(
            Path::new("name@2x.jpg"),
            SourceFamily::Jpg,
            LqipFormat::Jpg,
            false,
        );
        assert!(off.path(DerivativeRole::Avif1x).is_none());
        assert!(off.path(DerivativeRole::Avif2x).is_none());

        let on = derive_plan(
            Path::new("name@2x.jpg"),
            SourceFamily::Jpg,
            LqipFormat::Jpg,
            true,
        );
        assert_eq!(
            on.path(DerivativeRole::Avif1x).unwrap(),
            Path::new("name.avif")
        );
        assert_eq!(
            on.path(DerivativeRole::Avif2x).unwrap(),
            Path::new("name@2x.avif")
        );
        assert_eq!(on.len(), off.len() + 2);
    }

    #[test]
    fn test_webp_plan() {
        let plan = derive_plan(
            Path::new("pic@2x.webp"),
            SourceFamily::Webp,
            LqipFormat::Webp,
            false,
        );
        assert_eq!(
            plan.path(DerivativeRole::Raster2x).unwrap(),
            Path::new("pic@2x.jpg")
        );
        assert_eq!(
            plan.path(DerivativeRole::Raster1x).unwrap(),
            Path::new("pic.jpg")
        );
        assert_eq!(
            plan.path(DerivativeRole::Webp1x).unwrap(),
            Path::new("pic.webp")
        );
        assert_eq!(
            plan.path(DerivativeRole::Lqip).unwrap(),
            Path::new("pic@lqip.webp")
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let a = derive_plan(
            Path::new("/img/name@2x.png"),
            SourceFamily::Png,
            LqipFormat::Avif,
            true,
        );
        let b = derive_plan(
            Path::new("/img/name@2x.png"),
            SourceFamily::Png,
            LqipFormat::Avif,
            true,
        );
        assert_eq!(paths(&a), paths(&b));
        assert_eq!(
            a.roles().collect::<Vec<_>>(),
            b.roles().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_replace_suffix_no_match_leaves_path() {
        assert_eq!(
            replace_suffix(Path::new("plain.jpg"), "@2x.jpg", ".jpg"),
            PathBuf::from("plain.jpg")
        );
    }

    #[test]
    fn test_plan_keeps_directory_component() {
        let plan = derive_plan(
            Path::new("/assets/img/hero@2x.jpg"),
            SourceFamily::Jpg,
            LqipFormat::Jpg,
            false,
        );
        assert_eq!(
            plan.path(DerivativeRole::Raster1x).unwrap(),
            Path::new("/assets/img/hero.jpg")
        );
        assert_eq!(
            plan.path(DerivativeRole::Webp2x).unwrap(),
            Path::new("/assets/img/hero@2x.webp")
        );
    }
}
