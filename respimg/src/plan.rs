//! Generation step tables
//!
//! The per-family operation sequence is data: one ordered list of steps per
//! extension family, each naming its target, its input and the tool action
//! to run. The orchestrator walks the list; nothing branches on the family
//! after this point.

use crate::naming::{DerivativeRole, SourceFamily};

/// Width passed to a tool, resolved against the probed 2x width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthSpec {
    Full,
    Half,
}

impl WidthSpec {
    pub fn resolve(&self, full_width: u32) -> u32 {
        match self {
            WidthSpec::Full => full_width,
            WidthSpec::Half => full_width / 2,
        }
    }
}

/// Where a step writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTarget {
    /// The source file itself (in-place re-optimization).
    Original,
    Role(DerivativeRole),
}

/// Where a step reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepInput {
    Source,
    Output(DerivativeRole),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// cwebp at the target quality, optionally resized.
    EncodeWebp { width: Option<WidthSpec> },
    /// ImageMagick conversion to AVIF, optionally resized.
    ConvertAvif { width: Option<WidthSpec> },
    /// ImageMagick proportional resize.
    Resize(WidthSpec),
    /// dwebp + convert, WebP → JPEG.
    DecodeToJpg,
    /// Placeholder generation (adaptive resize, 1kB WebP target).
    Lqip,
    /// jpegoptim in place on the target.
    OptimizeJpg,
    /// pngquant in place on the target.
    OptimizePng,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub target: StepTarget,
    pub input: StepInput,
    pub action: StepAction,
}

impl Step {
    const fn new(target: StepTarget, input: StepInput, action: StepAction) -> Self {
        Self {
            target,
            input,
            action,
        }
    }
}

/// The fixed ordered sequence for one family. AVIF steps appear only when
/// enabled. Every `Role` target here is present in the derivative plan
/// built with the same `avif` flag.
pub fn build_steps(family: SourceFamily, avif: bool) -> Vec<Step> {
    use DerivativeRole::*;
    use StepInput::{Output, Source};
    use StepTarget::{Original, Role};

    let mut steps = Vec::new();

    // The 2x non-raster variant comes first, straight from the source.
    match family {
        SourceFamily::Jpg | SourceFamily::Png => {
            steps.push(Step::new(
                Role(Webp2x),
                Source,
                StepAction::EncodeWebp { width: None },
            ));
        }
        SourceFamily::Webp => {
            steps.push(Step::new(Role(Raster2x), Source, StepAction::DecodeToJpg));
            steps.push(Step::new(
                Role(Raster2x),
                Output(Raster2x),
                StepAction::OptimizeJpg,
            ));
        }
    }

    if avif {
        steps.push(Step::new(
            Role(Avif1x),
            Source,
            StepAction::ConvertAvif {
                width: Some(WidthSpec::Half),
            },
        ));
        steps.push(Step::new(
            Role(Avif2x),
            Source,
            StepAction::ConvertAvif { width: None },
        ));
    }

    // 1x raster: resize then optimize in place.
    let (raster_input, raster_optimizer) = match family {
        SourceFamily::Jpg => (Source, StepAction::OptimizeJpg),
        SourceFamily::Png => (Source, StepAction::OptimizePng),
        SourceFamily::Webp => (Output(Raster2x), StepAction::OptimizeJpg),
    };
    steps.push(Step::new(
        Role(Raster1x),
        raster_input,
        StepAction::Resize(WidthSpec::Half),
    ));
    steps.push(Step::new(Role(Raster1x), Output(Raster1x), raster_optimizer));

    // 1x webp always encodes from the source.
    steps.push(Step::new(
        Role(Webp1x),
        Source,
        StepAction::EncodeWebp {
            width: Some(WidthSpec::Half),
        },
    ));

    // Placeholder; the webp family generates it from the decoded 2x jpg.
    let lqip_input = match family {
        SourceFamily::Webp => Output(Raster2x),
        _ => Source,
    };
    steps.push(Step::new(Role(Lqip), lqip_input, StepAction::Lqip));

    // Finally the original itself, re-saved lossily in place.
    let original_action = match family {
        SourceFamily::Jpg => StepAction::OptimizeJpg,
        SourceFamily::Png => StepAction::OptimizePng,
        SourceFamily::Webp => StepAction::EncodeWebp { width: None },
    };
    steps.push(Step::new(Original, Source, original_action));

    steps
}
