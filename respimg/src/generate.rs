//! Generation orchestrator
//!
//! Validates the run, probes the source width, then walks the family's step
//! table in order. A failed step is logged and recorded, never fatal: the
//! remaining steps still run, and the invocation reports the failures at
//! the end.

use crate::config::GenerateConfig;
use crate::naming::{derive_plan, DerivativePlan, SourceFamily};
use crate::plan::{build_steps, Step, StepAction, StepInput, StepTarget};
use shared_utils::errors::{RespImgError, Result};
use shared_utils::probe;
use shared_utils::report::Summary;
use shared_utils::toolchain::Toolchain;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

/// Quality must be an integer in (0, 100].
pub fn validate_quality(quality: i64) -> Result<u8> {
    if quality > 0 && quality <= 100 {
        Ok(quality as u8)
    } else {
        Err(RespImgError::InvalidQuality(quality.to_string()))
    }
}

/// Run the whole pipeline for one source file.
///
/// Aborts before any tool runs on an invalid quality or unsupported
/// extension, and after only the width probe on a non-positive width.
pub fn generate(source: &Path, config: &GenerateConfig, tools: &Toolchain) -> Result<Summary> {
    let quality = validate_quality(config.quality)?;
    let family = SourceFamily::classify(source)?;

    let original_size = fs::metadata(source)?.len();
    let filename = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());

    let width = probe::image_width(tools, source)?;
    info!("{}: 2x width {}px, quality {}%", filename, width, quality);

    let plan = derive_plan(source, family, config.lqip_format, config.avif);
    let steps = build_steps(family, config.avif);

    let mut summary = Summary::new(filename, original_size, quality, width);
    summary.record(source.to_path_buf(), original_size);

    for step in &steps {
        run_step(step, source, &plan, width, quality, config, tools, &mut summary);
    }

    Ok(summary)
}

fn resolve_path<'a>(
    target: &StepTarget,
    source: &'a Path,
    plan: &'a DerivativePlan,
) -> Option<&'a Path> {
    match target {
        StepTarget::Original => Some(source),
        StepTarget::Role(role) => plan.path(*role),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_step(
    step: &Step,
    source: &Path,
    plan: &DerivativePlan,
    width: u32,
    quality: u8,
    config: &GenerateConfig,
    tools: &Toolchain,
    summary: &mut Summary,
) {
    // Step tables and derivative plans are built from the same flags, so
    // every referenced role resolves; skip defensively if one ever doesn't.
    let Some(target) = resolve_path(&step.target, source, plan) else {
        return;
    };
    let input = match step.input {
        StepInput::Source => source,
        StepInput::Output(role) => match plan.path(role) {
            Some(p) => p,
            None => return,
        },
    };

    if let StepTarget::Role(role) = step.target {
        debug!("{} → {}", role.label(), target.display());
    }

    let result = match step.action {
        StepAction::EncodeWebp { width: w } => {
            tools.encode_webp(input, target, quality, w.map(|s| s.resolve(width)))
        }
        StepAction::ConvertAvif { width: w } => {
            tools.convert_avif(input, target, w.map(|s| s.resolve(width)))
        }
        StepAction::Resize(w) => tools.resize(input, target, w.resolve(width)),
        StepAction::DecodeToJpg => tools.decode_webp(input, target),
        StepAction::Lqip => tools.lqip(input, target, config.lqip_size),
        StepAction::OptimizeJpg => tools.optimize_jpg(target, quality),
        StepAction::OptimizePng => tools.optimize_png(target),
    };

    match result {
        Ok(()) => match fs::metadata(target) {
            Ok(meta) => summary.record(target.to_path_buf(), meta.len()),
            Err(e) => {
                error!("{} produced no output: {}", target.display(), e);
                summary.record_failure(
                    target.to_path_buf(),
                    format!("output missing: {}", e),
                );
            }
        },
        Err(e) => {
            error!("step failed for {}: {}", target.display(), e);
            // In-place tools leave the file behind on failure; keep its
            // size in the ledger, as a plain stat would have.
            match fs::metadata(target) {
                Ok(meta) => summary.record_error_with_size(
                    target.to_path_buf(),
                    meta.len(),
                    e.to_string(),
                ),
                Err(_) => summary.record_failure(target.to_path_buf(), e.to_string()),
            }
        }
    }
}
