//! Parking Lot — interactive front end
//!
//! ```sh
//! # Run with default config (~/.config/parking-lot/config.toml)
//! parking-cli
//!
//! # Custom config path, debug logging
//! parking-cli --config ./lot.toml --log-level debug
//!
//! # Validate config without starting
//! parking-cli --check
//!
//! # Print the effective configuration as TOML
//! parking-cli --print-config
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info};

use parking_service::config::AppConfig;
use parking_service::domain::VehicleType;
use parking_service::{create_event_bus, default_config_path, init_tracing, ParkingService};

/// Park vehicles, issue tickets and settle fees from the terminal.
#[derive(Parser, Debug)]
#[command(name = "parking-cli", version, about)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PARKING_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,

    /// Echo every parking event to stderr as a JSON line.
    #[arg(long)]
    events: bool,
}

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let loaded = AppConfig::load(&config_path);
    let mut config = loaded.as_ref().cloned().unwrap_or_default();

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging);

    match &loaded {
        Ok(_) => info!("Configuration loaded from {}", config_path.display()),
        Err(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        if let Err(e) = loaded {
            return Err(e.into());
        }
        let issues = config.fees.validate();
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Currency    : {}", config.lot.currency);
        for vehicle_type in VehicleType::ALL {
            println!(
                "   {:<12}: {} spots",
                vehicle_type.as_str(),
                config.lot.capacity.get(&vehicle_type).copied().unwrap_or(0)
            );
        }
        let locations: Vec<_> = config.fees.locations().map(|l| l.as_str()).collect();
        println!("   Locations   : {}", locations.join(", "));
        for (location, vehicle_type, issue) in &issues {
            println!("   warning: {} / {}: {}", location, vehicle_type, issue);
        }
        return Ok(());
    }

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    // ── Start the lot ──────────────────────────────────────────
    let event_bus = create_event_bus();
    let service = Arc::new(ParkingService::from_config(&config).with_event_bus(event_bus.clone()));

    if cli.events {
        let mut subscriber = event_bus.subscribe();
        tokio::spawn(async move {
            while let Some(message) = subscriber.recv().await {
                match serde_json::to_string(&message) {
                    Ok(line) => eprintln!("{}", line),
                    Err(e) => error!("Failed to serialize event: {}", e),
                }
            }
        });
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    run_menu(&service, &mut input).await?;

    println!("Exiting the application...");
    Ok(())
}

async fn run_menu(service: &ParkingService, input: &mut Input) -> std::io::Result<()> {
    loop {
        display_menu();
        let Some(option) = prompt(input, "").await? else {
            return Ok(());
        };

        match option.as_str() {
            "1" => {
                let Some(vehicle_type) = prompt(input, "Enter vehicle type (Motorcycle, Car, Bus): ").await? else {
                    return Ok(());
                };
                let Some(location) = prompt(input, "Enter location (Airport, Stadium, Mall): ").await? else {
                    return Ok(());
                };
                match service.park(&vehicle_type, &location) {
                    Ok(ticket) => println!("Vehicle parked. {}", ticket),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "2" => {
                let Some(ticket_number) = prompt(input, "Enter ticket number: ").await? else {
                    return Ok(());
                };
                match service.unpark(&ticket_number) {
                    Ok(receipt) => println!("Vehicle unparked. {}", receipt),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "3" => {
                let Some(location) = prompt(input, "Enter location (Airport, Stadium, Mall): ").await? else {
                    return Ok(());
                };
                println!("Available spots at {}:", location);
                for (vehicle_type, count) in service.available_spots(&location) {
                    println!("   {:<12}: {}", vehicle_type.as_str(), count);
                }
            }
            "4" => return Ok(()),
            _ => println!("Invalid option. Please try again."),
        }
    }
}

fn display_menu() {
    println!();
    println!("Menu:");
    println!("1. Park Vehicle");
    println!("2. Unpark Vehicle");
    println!("3. Check Available Spots");
    println!("4. Exit");
    println!("----------------------");
}

/// Print `message` and read one trimmed line. `None` on end of input or Ctrl+C.
async fn prompt(input: &mut Input, message: &str) -> std::io::Result<Option<String>> {
    if !message.is_empty() {
        print!("{}", message);
        std::io::stdout().flush()?;
    }

    tokio::select! {
        line = input.next_line() => Ok(line?.map(|l| l.trim().to_string())),
        _ = tokio::signal::ctrl_c() => {
            println!();
            info!("Interrupted");
            Ok(None)
        }
    }
}
