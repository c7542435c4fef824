use clap::{Parser, Subcommand};
use smart_rev::config::{self, BuildConfig};
use smart_rev::emit::EmitOptions;
use smart_rev::qr::QrcodeEncoder;
use smart_rev::{logger, output, pipeline};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_INPUT: &str = "2_enter_location_details_here.txt";

#[derive(Parser)]
#[command(name = "smart-rev")]
#[command(about = "Generate a review page, review links and QR codes for your locations")]
#[command(long_about = "\
Generate a review page, review links and QR codes for your locations

Input file format:

  Domain:https://reviews.example.com          # where the page will be hosted
  whatsapp:https://wa.me/15551234567          # chat link for complaints
  Main Street Cafe|https://g.page/r/.../review
  Harbour Kiosk|https://g.page/r/.../review   # one name|review-url per line

Output:

  smart_rev.html                  # upload to the domain above
  generated_review_links.txt      # one link per location
  qrcodes/main_street_cafe.png    # one QR code per location

Run 'smart-rev gen-config' to generate a documented smart-rev.toml.")]
#[command(version)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the page, the link list and the QR codes
    Build {
        /// Location file
        #[arg(long, default_value = DEFAULT_INPUT)]
        input: PathBuf,
        /// Output directory
        #[arg(long, default_value = ".")]
        output: PathBuf,
        /// Settings file (default: smart-rev.toml next to the input)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Skip QR code generation
        #[arg(long)]
        no_qr: bool,
    },
    /// Validate the location file and list the links without writing anything
    Check {
        /// Location file
        #[arg(long, default_value = DEFAULT_INPUT)]
        input: PathBuf,
        /// Settings file (default: smart-rev.toml next to the input)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print a stock smart-rev.toml with all options documented
    GenConfig,
}

fn main() {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);
    if let Err(err) = run(cli) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Build {
            input,
            output: output_dir,
            config,
            no_qr,
        } => {
            let settings = resolve_settings(&input, config.as_deref())?;
            init_thread_pool(&settings.processing);

            println!("==> Building from {}", input.display());
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_emit_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = pipeline::run(
                &input,
                &output_dir,
                &settings,
                Arc::new(QrcodeEncoder::new()),
                EmitOptions {
                    generate_qr: !no_qr,
                },
                Some(tx),
            );
            printer.join().ok();
            let report = result?;

            println!();
            output::print_build_report(&report, &output_dir);
            println!("==> Build complete: {}", output_dir.display());
        }
        Command::Check { input, config } => {
            let settings = resolve_settings(&input, config.as_deref())?;
            println!("==> Checking {}", input.display());
            let report = pipeline::check(&input)?;
            output::print_check_output(&report, &settings.output.page);
            println!("==> Location file is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load settings from `--config`, or from `smart-rev.toml` beside the input.
fn resolve_settings(
    input: &Path,
    explicit: Option<&Path>,
) -> Result<BuildConfig, config::ConfigError> {
    match explicit {
        Some(path) => config::load_config_file(path),
        None => {
            let dir = input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            config::load_config(dir)
        }
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
