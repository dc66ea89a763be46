use clap::{Parser, Subcommand};
use image_legend::config::{self, LegendConfig};
use image_legend::driver::{self, CaptionOptions};
use image_legend::html::Html5Engine;
use image_legend::{manifest, output, template};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "image-legend")]
#[command(about = "Turn image titles into visible captions in generated HTML")]
#[command(long_about = "\
Turn image titles into visible captions in generated HTML

Every <img> carrying a non-blank title attribute is replaced, in place, by a
caption block built from a template:

  <img src=\"dusk.png\" title=\"A sunset\">
    becomes
  <figure class=\"image-legend\">
    <img src=\"dusk.png\" title=\"A sunset\">
    <figcaption>A sunset</figcaption>
  </figure>

Images with id=\"logo\" are never captioned. Files without captions are not
rewritten. Captions are marked, so running twice over the same output is safe.

Run 'image-legend gen-config' to generate a documented image-legend.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./image-legend.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every caption to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process the HTML outputs listed in a build manifest
    Manifest {
        /// Path to manifest.json
        manifest: PathBuf,
        /// Output folder the manifest paths are relative to
        /// (default: the manifest's directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Process every .html/.htm file under a directory
    Dir {
        /// Directory to walk
        dir: PathBuf,
    },
    /// Process the given files
    Files {
        /// HTML files to rewrite in place
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print a stock image-legend.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new("."))?,
    };

    // Loaded before any input is read: without a template nothing runs.
    let template = match template::load(config.template.as_deref()) {
        Ok(template) => template,
        Err(e) => {
            for line in output::format_template_error(&e) {
                eprintln!("{}", line);
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    let (paths, base) = match cli.command {
        Command::GenConfig => unreachable!("handled above"),
        Command::Manifest {
            manifest: manifest_path,
            output: output_dir,
        } => {
            let base = output_dir.unwrap_or_else(|| parent_dir(&manifest_path));
            let build = manifest::load_manifest(&manifest_path)?;
            (build.html_outputs(&base, &config.document_types), base)
        }
        Command::Dir { dir } => (manifest::discover_html_files(&dir)?, dir),
        Command::Files { paths } => (paths, PathBuf::from(".")),
    };

    init_thread_pool(&config);
    println!("==> Captioning {} files", paths.len());
    let summary = driver::process_files(
        &Html5Engine,
        &template,
        &paths,
        CaptionOptions::from(&config),
    );
    output::print_run_output(&summary, &base);

    if summary.all_failed() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "image_legend=debug"
    } else {
        "image_legend=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The config can lower the count, not raise it.
fn init_thread_pool(config: &LegendConfig) {
    let threads = config::effective_threads(&config.processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
