use std::fs;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use subconvert::merge_and_convert;
use subconvert::parser::merge_subscriptions;
use subconvert::settings::{update_settings_from_file, Settings};
use subconvert::utils::http::{web_get_async, FetchOptions};
use subconvert::web_handlers::interfaces;

/// Convert proxy subscriptions between link lists and client configurations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML or TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address (e.g., 127.0.0.1 or 0.0.0.0)
    #[arg(short, long, value_name = "ADDRESS")]
    address: Option<String>,

    /// Listen port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Subscription files to convert instead of starting the server
    #[arg(short, long, value_name = "FILE", num_args = 1.., conflicts_with = "url")]
    input: Vec<String>,

    /// Subscription URL to convert instead of starting the server ('|' separates several)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Target format, the configured default when absent
    #[arg(short, long, value_name = "TARGET")]
    target: Option<String>,

    /// Write the result here instead of stdout
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    output: Option<String>,

    /// Render clash output as JSON
    #[arg(long)]
    json: bool,

    /// Print the parsed records as JSON instead of converting them
    #[arg(long)]
    parse_only: bool,
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();

    if let Some(path) = args.config.as_deref() {
        update_settings_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?;
    }
    let mut settings = (*Settings::current()).clone();

    let sources = if !args.input.is_empty() {
        read_inputs(&args.input)?
    } else if let Some(url) = args.url.as_deref() {
        fetch_inputs(url, &settings).await?
    } else {
        if let Some(address) = args.address {
            settings.listen_address = address;
        }
        if let Some(port) = args.port {
            settings.listen_port = port;
        }
        return serve(settings).await;
    };

    let output = if args.parse_only {
        let nodes = merge_subscriptions(sources.as_slice())?;
        serde_json::to_string_pretty(&nodes)?
    } else {
        let target = args.target.as_deref().unwrap_or(settings.default_target.as_str());
        let output_json = args.json || settings.overrides.output_json;
        let overrides = settings.overrides.clone().with_output_json(output_json);
        merge_and_convert(sources.as_slice(), target, &overrides)?
    };

    match args.output.as_deref() {
        Some(path) => {
            fs::write(path, &output).with_context(|| format!("Failed to write {}", path))?;
            info!("Successfully wrote subscription to {}", path);
        }
        None => println!("{}", output),
    }
    Ok(())
}

fn read_inputs(paths: &[String]) -> Result<Vec<String>> {
    paths
        .iter()
        .map(|path| fs::read_to_string(path).with_context(|| format!("Failed to read {}", path)))
        .collect()
}

async fn fetch_inputs(urls: &str, settings: &Settings) -> Result<Vec<String>> {
    let options = FetchOptions {
        timeout: Duration::from_secs(settings.fetch_timeout_secs),
        max_size: settings.max_download_size,
    };
    let mut bodies = Vec::new();
    for url in urls.split('|').map(str::trim).filter(|url| !url.is_empty()) {
        info!("Processing subscription from URL: {}", url);
        let body = web_get_async(url, &options)
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;
        bodies.push(body);
    }
    if bodies.is_empty() {
        bail!("No subscription URL given");
    }
    Ok(bodies)
}

async fn serve(settings: Settings) -> Result<()> {
    let listen_address = if settings.listen_address.contains(':') {
        // Already has a port
        settings.listen_address.clone()
    } else {
        format!("{}:{}", settings.listen_address, settings.listen_port)
    };
    let workers = settings.max_concur_threads.max(1);
    let data = web::Data::new(settings);

    info!("subconvert starting on {}", listen_address);
    HttpServer::new(move || App::new().app_data(data.clone()).configure(interfaces::config))
        .bind(&listen_address)
        .with_context(|| format!("Failed to bind {}", listen_address))?
        .workers(workers)
        .run()
        .await?;
    Ok(())
}
