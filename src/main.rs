use clap::{Parser, Subcommand};
use quire::config::{self, ConfigError, SiteConfig};
use quire::output;
use quire::pipeline::{self, BuildEvent};
use quire::render::HtmlRenderer;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Incremental static site generator for a directory of posts")]
#[command(long_about = "\
Incremental static site generator for a directory of posts

Every subdirectory of the content root holding an index.md is a post. Only
posts whose index.md changed since the last build are rendered again.

Content structure:

  content/
  ├── first-light/
  │   └── index.md        # %title: First Light
  │                       # %date: 2023-03-14
  │                       # Markdown body...
  └── on-rust/
      └── index.md

Output:

  docs/
  ├── index.html          # Listing, newest first
  ├── first-light/index.html
  └── on-rust/index.html

Header lines start with '%' and hold 'key: value' pairs. 'date' sets the
publish date (YYYY-MM-DD); without it the file's modification time is used.

Run 'quire gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults apply when it does not exist)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Content directory (overrides content_root)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output directory (overrides output_root)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Manifest file (overrides manifest_path)
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Render new and changed posts, delete removed ones, rebuild the listing
    Build,
    /// Show what a build would do without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn Error>> {
    match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            let config = resolve_config(cli)?;
            let renderer = HtmlRenderer::new(&config)?;
            println!(
                "==> Building {} \u{2192} {}",
                config.content_root.display(),
                config.output_root.display()
            );
            let mut rendered = 0;
            let report = pipeline::build_at(
                &config,
                &renderer,
                chrono::Local::now().naive_local(),
                &mut |event| {
                    if let BuildEvent::Rendered { .. } = event {
                        rendered += 1;
                    }
                    for line in output::format_build_event(event, rendered) {
                        println!("{}", line);
                    }
                },
            )?;
            output::print_build_summary(&report);

            if report.has_failures() {
                eprintln!("error: {} post(s) failed to render", report.failed.len());
                return Ok(ExitCode::FAILURE);
            }
            println!("==> Build complete: {}", config.output_root.display());
        }
        Command::Check => {
            let config = resolve_config(cli)?;
            println!("==> Checking {}", config.content_root.display());
            let plan = pipeline::plan(&config)?;
            output::print_plan(&plan);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Load `--config`, apply path overrides, and validate the result.
fn resolve_config(cli: &Cli) -> Result<SiteConfig, ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(source) = &cli.source {
        config.content_root = source.clone();
    }
    if let Some(output) = &cli.output {
        config.output_root = output.clone();
    }
    if let Some(manifest) = &cli.manifest {
        config.manifest_path = manifest.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
