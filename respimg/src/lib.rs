//! respimg — responsive web image variant generator
//!
//! Turns a single `@2x` source image into its responsive derivatives
//! (1x/2x raster, WebP, optional AVIF, low-quality placeholder) by driving
//! the external codec tools, then reports every produced file's size.

pub mod config;
pub mod generate;
pub mod naming;
pub mod plan;

pub use config::{GenerateConfig, LqipFormat, PendingConfig, Settings};
pub use generate::{generate, validate_quality};
pub use naming::{derive_plan, DerivativePlan, DerivativeRole, SourceFamily};
pub use plan::{build_steps, Step, StepAction, StepInput, StepTarget, WidthSpec};
