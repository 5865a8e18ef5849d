use clap::{Args, Parser, Subcommand};
use photostage::extract::{CommandExtractor, ExtractError, PrecutExtractor};
use photostage::{Pipeline, PipelineConfig, SubjectExtractor, batch};
use std::path::PathBuf;

/// Shared flags for commands that run the pipeline.
#[derive(Args, Clone)]
struct PipelineArgs {
    /// Finishing preset: "classic" (no vignette) or "studio" (vignette)
    #[arg(long, default_value = "classic")]
    preset: String,

    /// Config file with preset + overrides (takes precedence over --preset)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subject photo already has an alpha cutout - skip extraction
    #[arg(long)]
    precut: bool,

    /// External background-removal command (photo on stdin, cutout on stdout)
    #[arg(long, default_value = "rembg i")]
    extractor: String,
}

#[derive(Parser)]
#[command(name = "photostage")]
#[command(about = "Composite a subject onto a new background with shadow and tone finishing")]
#[command(long_about = "\
Composite a subject onto a new background with shadow and tone finishing

The subject is cut out by an external background-removal tool (rembg by
default), scaled to 60% of the background height, centered with its feet on
the bottom edge, and grounded with a soft synthesized shadow. The flattened
image then gets a fixed finishing chain: gamma, contrast, brightness,
saturation, sharpness, and optionally a vignette.

Two finishing presets ship:

  classic   no vignette, gentle lift
  studio    vignette on, deeper midtones

Run 'photostage gen-config' for a documented photostage.toml with every
tunable value.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Composite one subject photo onto one background
    Composite {
        /// Subject photo (JPEG/PNG)
        #[arg(long)]
        subject: PathBuf,
        /// Background image (JPEG/PNG)
        #[arg(long)]
        background: PathBuf,
        /// Output file (.jpg or .png)
        #[arg(long)]
        output: PathBuf,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Composite one subject onto every background in a directory
    Batch {
        /// Subject photo (JPEG/PNG)
        #[arg(long)]
        subject: PathBuf,
        /// Directory scanned recursively for background images
        #[arg(long)]
        background_dir: PathBuf,
        /// Directory for the rendered composites
        #[arg(long, default_value = "composites")]
        output_dir: PathBuf,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Validate inputs and show the computed placement without rendering
    Check {
        #[arg(long)]
        subject: PathBuf,
        #[arg(long)]
        background: PathBuf,
    },
    /// Print a stock photostage.toml with all options documented
    GenConfig,
}

/// The extractor picked by CLI flags.
enum CliExtractor {
    Command(CommandExtractor),
    Precut(PrecutExtractor),
}

impl SubjectExtractor for CliExtractor {
    fn extract(&self, encoded: &[u8]) -> Result<Vec<u8>, ExtractError> {
        match self {
            CliExtractor::Command(e) => e.extract(encoded),
            CliExtractor::Precut(e) => e.extract(encoded),
        }
    }
}

fn build_pipeline(args: &PipelineArgs) -> Result<Pipeline<CliExtractor>, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::preset(&args.preset)?,
    };
    let extractor = if args.precut {
        CliExtractor::Precut(PrecutExtractor)
    } else {
        let command = CommandExtractor::from_command_line(&args.extractor)
            .ok_or("extractor command is empty")?;
        CliExtractor::Command(command)
    };
    Ok(Pipeline::new(extractor, config))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Composite {
            subject,
            background,
            output,
            pipeline,
        } => {
            let pipeline = build_pipeline(&pipeline)?;
            let subject_bytes = std::fs::read(&subject)?;
            let background_bytes = std::fs::read(&background)?;
            pipeline.render_to_file(&subject_bytes, &background_bytes, &output)?;
            println!("{} + {} → {}", subject.display(), background.display(), output.display());
        }
        Command::Batch {
            subject,
            background_dir,
            output_dir,
            pipeline,
        } => {
            let pipeline = build_pipeline(&pipeline)?;
            let summary = batch::run(&pipeline, &subject, &background_dir, &output_dir)?;
            for path in &summary.written {
                println!("{}", path.display());
            }
            if !summary.failed.is_empty() {
                eprintln!();
                for (path, reason) in &summary.failed {
                    eprintln!("failed: {}: {reason}", path.display());
                }
                return Err(format!(
                    "{} of {} backgrounds failed",
                    summary.failed.len(),
                    summary.failed.len() + summary.written.len()
                )
                .into());
            }
            println!("Rendered {} composites", summary.written.len());
        }
        Command::Check {
            subject,
            background,
        } => {
            use photostage::compose::geometry;

            let subject_img = image::open(&subject)?;
            let background_img = image::open(&background)?;
            let subject_dims = (subject_img.width(), subject_img.height());
            let bg_dims = (background_img.width(), background_img.height());
            if subject_dims.0 == 0 || subject_dims.1 == 0 {
                return Err("subject image has a zero dimension".into());
            }
            if bg_dims.0 == 0 || bg_dims.1 == 0 {
                return Err("background image has a zero dimension".into());
            }

            let scaled = geometry::scaled_subject_size(subject_dims, bg_dims.1);
            let placement = geometry::subject_placement(bg_dims, scaled);
            println!("Subject     {}x{}", subject_dims.0, subject_dims.1);
            println!("Background  {}x{}", bg_dims.0, bg_dims.1);
            println!("Scaled      {}x{}", scaled.0, scaled.1);
            println!("Placement   ({}, {})", placement.0, placement.1);
            if placement.0 < 0 || placement.1 < 0 {
                println!("Note: subject exceeds the canvas and will be clipped");
            }
        }
        Command::GenConfig => {
            print!("{}", photostage::config::stock_config_toml());
        }
    }

    Ok(())
}
