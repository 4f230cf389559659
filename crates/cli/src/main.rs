// ABOUTME: Command-line front end for the scrape relay.
// ABOUTME: Takes a URL from --url or the clipboard, extracts it, and writes the result to a file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use scrape_relay::{
    init_logging, load_secrets, FileFormat, FileSink, LogConfig, LogFormat, Relay, Sink,
    DEFAULT_OUTPUT_FILE, DEFAULT_SECRETS_FILE,
};

mod clipboard;

use clipboard::Paste;

/// Scrape the URL on the clipboard (or given with --url) into a text file.
#[derive(Parser, Debug)]
#[command(name = "scrape-relay-cli")]
#[command(about = "Extract an article, Reddit thread, or YouTube transcript into a file", long_about = None)]
struct Args {
    /// URL to scrape instead of reading the clipboard.
    #[arg(long)]
    url: Option<String>,

    /// Output file path.
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Secrets file with the [REDDIT] credentials.
    #[arg(short = 'c', long = "config", default_value = DEFAULT_SECRETS_FILE)]
    config: PathBuf,

    /// Write the result as JSON instead of the text layout.
    #[arg(long = "json")]
    json_output: bool,

    /// Allow fetching from private/local networks.
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// Log format on stderr: text or json.
    #[arg(long = "log-format", default_value = "text")]
    log_format: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(LogConfig {
        format: LogFormat::from(args.log_format.as_str()),
        default_filter: "warn",
    }) {
        eprintln!("Error: {}", e);
        return ExitCode::from(1);
    }

    let secrets = match load_secrets(&args.config) {
        Ok(secrets) => secrets,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    let url = match args.url {
        Some(url) => url,
        None => match Paste::new().read() {
            Ok(url) => {
                println!("Fetched URL from clipboard: {}", url);
                url
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
        },
    };

    let relay = Relay::builder()
        .allow_private_networks(args.allow_private_networks)
        .build(secrets.reddit);
    let result = relay.handle(Some(&url)).await;

    let format = if args.json_output {
        FileFormat::Json
    } else {
        FileFormat::Text
    };
    match FileSink::new(&args.output).with_format(format).emit(&result) {
        Ok(path) => println!("Content saved to {}", path.display()),
        Err(e) => {
            eprintln!("Error: failed to write {}: {}", args.output.display(), e);
            return ExitCode::from(1);
        }
    }

    if let Some(error) = result.error() {
        eprintln!("Error: {}", error);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
