use clap::{Parser, Subcommand};
use cutout_studio::imaging::{
    ColorAdjustments, calculations::{center_transform, fit_to_display},
    compose::{compose_to_png, solid_background},
    params::ViewportTransform,
    scan_content_bounds,
};
use cutout_studio::{cache, config, output, pipeline, session, task, templates};
use image::Rgba;
use std::path::PathBuf;

/// Shared flags for commands that fetch result images.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the download cache — always fetch results from the service
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "cutout-studio")]
#[command(about = "Trim, recolor, and compose background-removal cutouts")]
#[command(long_about = "\
Trim, recolor, and compose background-removal cutouts

An external task service performs the background removal; cutout-studio
uploads your image, waits for the result, and post-processes it locally.

Workflow:

  cutout-studio run photo.jpg
      Upload → poll the task → trim the returned cutout to its content
      bounds → compose it, centered, over the stock white background →
      write composed-image.png

  cutout-studio trim cutout.png        Trim a local cutout, no service
  cutout-studio bounds cutout.png      Print the content bounding box
  cutout-studio compose cutout.png --background beach.jpg --x 120 --y 40
                                       Compose with explicit placement,
                                       size, and color adjustments
  cutout-studio templates              List selectable backgrounds

The service endpoint, polling bounds, canvas geometry, and template
directory come from config.toml ('cutout-studio gen-config' prints a
documented stock file).")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./config.toml if present, else stock defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for cached result downloads
    #[arg(long, default_value = ".cutout-studio-cache", global = true)]
    cache_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: upload → poll → trim → compose
    Run {
        /// Image to process
        image: PathBuf,
        /// Background image (default: stock white)
        #[arg(long)]
        background: Option<PathBuf>,
        /// Output file for the composite
        #[arg(short, long, default_value = "composed-image.png")]
        output: PathBuf,
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Trim a local cutout to its content bounds
    Trim {
        /// Cutout image to trim
        image: PathBuf,
        /// Output file for the trimmed cutout
        #[arg(short, long, default_value = "trimmed.png")]
        output: PathBuf,
    },
    /// Print the content bounding box of a local cutout
    Bounds {
        /// Cutout image to scan
        image: PathBuf,
        /// Extra margin kept around the content (overrides config)
        #[arg(long)]
        padding: Option<u32>,
    },
    /// Compose a cutout over a background with explicit placement
    Compose {
        /// Foreground cutout image
        image: PathBuf,
        /// Background image (default: stock white)
        #[arg(long)]
        background: Option<PathBuf>,
        /// Foreground position on the canvas (default: centered)
        #[arg(long)]
        x: Option<f64>,
        #[arg(long)]
        y: Option<f64>,
        /// Foreground size on the canvas (default: display fit)
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        /// Brightness percentage (100 = neutral)
        #[arg(long, default_value_t = 100)]
        brightness: u32,
        /// Contrast percentage (100 = neutral)
        #[arg(long, default_value_t = 100)]
        contrast: u32,
        /// Saturation percentage (100 = neutral)
        #[arg(long, default_value_t = 100)]
        saturation: u32,
        /// Output file for the composite
        #[arg(short, long, default_value = "composed-image.png")]
        output: PathBuf,
    },
    /// List selectable background templates
    Templates {
        /// Template directory (overrides config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let studio = config::StudioConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Run {
            image,
            background,
            output,
            cache: cache_args,
        } => {
            init_thread_pool(&studio.processing);
            let api = task::RestApi::new(&studio.api.base_url, studio.api.token.clone())?;
            let mut download_cache = if cache_args.no_cache {
                cache::DownloadCache::disabled()
            } else {
                cache::DownloadCache::open(&cli.cache_dir)?
            };

            let canvas = studio.canvas_size();
            let mut session =
                session::EditSession::new(canvas, studio.canvas.max_display_size);
            let (width, height) = image::image_dimensions(&image)?;
            session.begin_upload(width, height)?;

            let cancel = task::CancelToken::new();
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_pipeline_event(&event);
                }
            });
            let processed = match pipeline::process_upload(
                &api,
                &image,
                &studio.pipeline_config(),
                &mut download_cache,
                &cancel,
                Some(tx),
            ) {
                Ok(processed) => processed,
                Err(err) => {
                    session.fail(err.to_string())?;
                    return Err(err.into());
                }
            };
            printer.join().unwrap();

            session.task_created(processed.task_id)?;
            session.begin_scan()?;
            session.cutout_ready(processed.asset)?;
            if let Some(path) = background {
                session.select_background(Some(templates::load_background(&path)?))?;
            }

            let png = session.compose()?;
            std::fs::write(&output, png)?;
            output::print_compose_summary(&output, canvas);
        }
        Command::Trim { image, output } => {
            let asset = pipeline::process_local(&image, &studio.pipeline_config())?;
            asset.image.save(&output)?;
            output::print_trim_summary(&image, &asset);
            println!("    Output: {}", output.display());
        }
        Command::Bounds { image, padding } => {
            let cutout = image::open(&image)?.to_rgba8();
            let padding = padding.unwrap_or(studio.canvas.padding);
            let bounds = scan_content_bounds(&cutout, padding)?;
            output::print_bounds(&image, &bounds);
        }
        Command::Compose {
            image,
            background,
            x,
            y,
            width,
            height,
            brightness,
            contrast,
            saturation,
            output,
        } => {
            let canvas = studio.canvas_size();
            let foreground = image::open(&image)?.to_rgba8();
            let background_image = match background {
                Some(path) => templates::load_background(&path)?,
                None => solid_background(Rgba([255, 255, 255, 255]), canvas),
            };

            let fit = fit_to_display(
                foreground.width(),
                foreground.height(),
                studio.canvas.max_display_size,
            );
            let centered = center_transform(fit, canvas);
            let transform = ViewportTransform {
                x: x.unwrap_or(centered.x),
                y: y.unwrap_or(centered.y),
                width: width.unwrap_or(centered.width),
                height: height.unwrap_or(centered.height),
            };
            let adjustments = ColorAdjustments::new(brightness, contrast, saturation);

            let png = compose_to_png(
                &background_image,
                &foreground,
                &transform,
                &adjustments,
                canvas,
            )?;
            std::fs::write(&output, png)?;
            output::print_compose_summary(&output, canvas);
        }
        Command::Templates { dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from(&studio.templates.dir));
            let found = templates::scan_templates(&dir)?;
            output::print_template_list(&dir, &found);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
