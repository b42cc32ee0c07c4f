//! `donorreg` - CLI for the donor registry
//!
//! This binary runs the HTTP service and offers the same registry operations
//! directly against the data file.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use donor_registry::cli::{
    Cli, Command, ConfigCommand, OutputFormat, SearchCommand, ServeCommand, SetStatusCommand,
};
use donor_registry::registry::{RegistrationRequest, StatusUpdateRequest};
use donor_registry::{http, init_logging, Config, Donor, Registry, SearchQuery};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, serve_cmd).await,
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Search(search_cmd) => handle_search(&config, &search_cmd),
        Command::Register(register_cmd) => {
            handle_register(&config, RegistrationRequest::from(register_cmd))
        }
        Command::SetStatus(set_cmd) => handle_set_status(&config, set_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;

    http::serve(&config).await.context("running HTTP service")
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let registry = Registry::open(config.data_file());
    let stats = registry.store().stats();

    if json {
        let status = serde_json::json!({
            "app_version": env!("CARGO_PKG_VERSION"),
            "donor_count": stats.total_donors,
            "available_count": stats.available_donors,
            "data_file": registry.store().path(),
            "data_file_bytes": stats.data_file_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("donorreg status");
        println!("---------------");
        println!("Version:       {}", env!("CARGO_PKG_VERSION"));
        println!("Data file:     {}", registry.store().path().display());
        println!("File size:     {} bytes", stats.data_file_bytes);
        println!("Donors:        {}", stats.total_donors);
        println!("Available:     {}", stats.available_donors);
    }
    Ok(())
}

fn handle_search(config: &Config, cmd: &SearchCommand) -> anyhow::Result<()> {
    let registry = Registry::open(config.data_file());
    let results = registry.search(&SearchQuery::from(cmd));

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Plain => {
            for donor in &results {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    donor.id,
                    donor.name,
                    donor.blood_group,
                    donor.availability_status,
                    donor.phone_number,
                    donor.address
                );
            }
        }
        OutputFormat::Table => print_table(&results),
    }
    Ok(())
}

fn print_table(donors: &[&Donor]) {
    if donors.is_empty() {
        println!("No donors found.");
        return;
    }

    let name_width = donors
        .iter()
        .map(|d| d.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let phone_width = donors
        .iter()
        .map(|d| d.phone_number.chars().count())
        .max()
        .unwrap_or(0)
        .max(5);

    println!(
        "{:>4}  {:<name_width$}  {:<5}  {:<12}  {:<phone_width$}  Address",
        "ID", "Name", "Group", "Status", "Phone"
    );
    for donor in donors {
        println!(
            "{:>4}  {:<name_width$}  {:<5}  {:<12}  {:<phone_width$}  {}",
            donor.id,
            donor.name,
            donor.blood_group,
            donor.availability_status,
            donor.phone_number,
            donor.address
        );
    }
    println!();
    println!("{} donor(s)", donors.len());
}

fn handle_register(config: &Config, request: RegistrationRequest) -> anyhow::Result<()> {
    let mut registry = Registry::open(config.data_file());
    let donor = registry.register(request)?;
    println!("{}", serde_json::to_string_pretty(&donor)?);
    Ok(())
}

fn handle_set_status(config: &Config, cmd: SetStatusCommand) -> anyhow::Result<()> {
    let mut registry = Registry::open(config.data_file());
    let donor = registry.update_status(StatusUpdateRequest::from(cmd))?;
    println!(
        "Donor {} ({}) is now {}",
        donor.id, donor.name, donor.availability_status
    );
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!(
                    "  Static pages:       {}",
                    config.server.static_dir.display()
                );
                println!("  CORS:               {}", config.server.cors_enabled);
                println!();
                println!("[Storage]");
                println!("  Data file:          {}", config.data_file().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
