// ABOUTME: Small utility binary that prints where a URL ends up after redirects.
// ABOUTME: Takes the URL as an argument or reads it from stdin; never fails on network errors.

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use scrape_relay::resource::{resolve_redirects, FetchOptions};
use scrape_relay::{build_http_client, init_logging, LogConfig, RelayBuilder};

#[derive(Parser, Debug)]
#[command(name = "relay-resolve")]
#[command(about = "Follow redirects and print the final URL")]
struct Args {
    /// URL to resolve (default: first line of stdin)
    #[arg()]
    url: Option<String>,

    /// Timeout in seconds
    #[arg(long = "timeout", default_value_t = 10)]
    timeout: u64,

    /// Allow resolving through private/local networks
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,
}

fn read_stdin_url() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(LogConfig {
        default_filter: "warn",
        ..Default::default()
    }) {
        eprintln!("Error: {}", e);
        return ExitCode::from(1);
    }

    let url = match args.url {
        Some(url) => url.trim().to_string(),
        None => match read_stdin_url() {
            Ok(url) => url,
            Err(e) => {
                eprintln!("Error: failed to read stdin: {}", e);
                return ExitCode::from(1);
            }
        },
    };
    if url.is_empty() {
        eprintln!("Error: URL is required");
        return ExitCode::from(1);
    }

    let builder = RelayBuilder::new()
        .resolve_timeout(Duration::from_secs(args.timeout))
        .allow_private_networks(args.allow_private_networks);
    let opts = builder.options();
    let client = build_http_client(opts);
    let fetch_opts = FetchOptions {
        headers: opts.headers.clone(),
        allow_private_networks: opts.allow_private_networks,
        parse_non_200: false,
        timeout: Some(opts.resolve_timeout),
    };

    let resolved = resolve_redirects(&client, &url, &fetch_opts).await;
    println!("Redirected URL: {}", resolved);
    ExitCode::SUCCESS
}
