//! Upload harness CLI

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pressure_watcher::io::ReqwestHttpClient;
use tracing::Level;
use upload_harness::panel::{ConsoleDisplay, HtmlFileDisplay, MultiDisplay};
use upload_harness::{Harness, DEFAULT_API_URL};

#[derive(Parser)]
#[command(name = "upload-harness")]
#[command(about = "Send test images to the pressure-watcher upload endpoint")]
#[command(version)]
struct Args {
    /// Base URL of the upload API
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Also write the final result panel to this HTML file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a synthesized 640x480 test image
    Dummy,
    /// Upload an image file
    File {
        path: PathBuf,

        /// Declared media type (guessed from the extension by default)
        #[arg(long)]
        media_type: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut display = MultiDisplay::new().with(ConsoleDisplay);
    if let Some(output) = &args.output {
        tracing::debug!("Writing result panel to {:?}", output);
        display = display.with(HtmlFileDisplay::new(output));
    }

    let harness = Harness::new(
        args.api_url,
        Arc::new(ReqwestHttpClient::new()),
        Arc::new(display),
    );
    tracing::debug!("Using upload API at {}", harness.api_url());

    // Failures are already shown as panels
    let succeeded = match args.command {
        Command::Dummy => harness.test_with_dummy_image().await.is_ok(),
        Command::File { path, media_type } => {
            harness.test_with_path(&path, media_type).await.is_ok()
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
