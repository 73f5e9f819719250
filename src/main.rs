use std::io::Read;
use casa_match::config::Settings;
use casa_match::{BatchRequest, Engine, EngineError};
use tracing::{error, info};

/// Reads a batch from the file given as first argument (stdin when absent
/// or `-`) and prints the deduplicated properties and matches as JSON
fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration before logging so its logging section can apply
    let settings = Settings::load();

    let (log_level, log_format) = match &settings {
        Ok(s) => (s.logging.level.clone(), s.logging.format.clone()),
        Err(_) => ("info".to_string(), "json".to_string()),
    };
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(log_level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(log_format);

    // Logs go to stderr; stdout carries the result
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };

    info!("Configuration loaded successfully");

    if let Err(e) = run(&settings) {
        error!("Batch failed: {}", e);
        std::process::exit(1);
    }
}

fn run(settings: &Settings) -> Result<(), EngineError> {
    let engine = Engine::from_settings(settings)?;

    let input = match std::env::args().nth(1) {
        Some(path) if path != "-" => {
            info!("Reading batch from {}", path);
            std::fs::read_to_string(path)?
        }
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let request: BatchRequest = serde_json::from_str(&input)?;
    let response = engine.run(&request)?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
