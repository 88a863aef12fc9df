use clap::{Parser, Subcommand};
use console::style;
use respimg::config::{
    resolve_avif, LqipFormat, NoPrompter, PendingConfig, Settings, TermPrompter,
    DEFAULT_LQIP_SIZE,
};
use respimg::generate::generate;
use shared_utils::report::print_summary;
use shared_utils::toolchain::{default_tool_dirs, locate, Toolchain, TOOL_NAMES};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "respimg")]
#[command(version, about = "Responsive web image variant generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate 1x/2x raster, WebP, AVIF and placeholder variants from an @2x source
    Generate {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Target quality (1-100); prompted for when absent
        #[arg(short, long)]
        quality: Option<i64>,

        /// Placeholder format; prompted for when absent
        #[arg(short = 'f', long, value_enum)]
        lqip_format: Option<LqipFormat>,

        /// Placeholder target dimension in pixels
        #[arg(long)]
        lqip_size: Option<u32>,

        /// Also generate 1x/2x AVIF variants
        #[arg(long)]
        avif: bool,

        /// Skip AVIF variants even when the settings file enables them
        #[arg(long, conflicts_with = "avif")]
        no_avif: bool,

        /// Settings file (default: ~/.config/respimg.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Fail on missing settings instead of prompting
        #[arg(long)]
        no_prompt: bool,
    },

    /// Report which external tools are resolvable
    Tools {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let _ = shared_utils::logging::init_logging(
        "respimg",
        shared_utils::logging::LogConfig::default(),
    );

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            quality,
            lqip_format,
            lqip_size,
            avif,
            no_avif,
            config,
            no_prompt,
        } => {
            let settings = load_settings(config)?;

            let pending = PendingConfig {
                quality: quality.or(settings.quality),
                lqip_format: lqip_format.or(settings.lqip_type),
                lqip_size: lqip_size
                    .or(settings.lqip_size)
                    .unwrap_or(DEFAULT_LQIP_SIZE),
                avif: resolve_avif(avif, no_avif, settings.avif_support),
            };

            let config = if no_prompt || !console::user_attended() {
                pending.resolve(&mut NoPrompter)?
            } else {
                pending.resolve(&mut TermPrompter::new())?
            };

            let tool_dirs = settings.tool_path.unwrap_or_else(default_tool_dirs);
            let tools = Toolchain::resolve(&tool_dirs)?;

            let summary = generate(&input, &config, &tools)?;
            print_summary(&summary);

            if summary.has_failures() {
                anyhow::bail!("{} generation step(s) failed", summary.errors().len());
            }
            Ok(())
        }

        Commands::Tools { config } => {
            let settings = load_settings(config)?;
            let tool_dirs = settings.tool_path.unwrap_or_else(default_tool_dirs);

            let mut missing = 0usize;
            for name in TOOL_NAMES {
                match locate(name, &tool_dirs) {
                    Some(path) => {
                        println!("✅ {:<10} {}", name, style(path.display()).dim())
                    }
                    None => {
                        missing += 1;
                        println!("❌ {:<10} {}", name, style("not found").red())
                    }
                }
            }

            if missing > 0 {
                anyhow::bail!("{} tool(s) missing from the search path", missing);
            }
            Ok(())
        }
    }
}

fn load_settings(config: Option<PathBuf>) -> anyhow::Result<Settings> {
    match config {
        Some(path) => Ok(Settings::load(&path)?),
        None => Ok(Settings::load_default()?),
    }
}
