//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use serde_json::Value;

use crate::registry::{RegistrationRequest, SearchQuery, StatusUpdateRequest};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides configuration)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides configuration and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Search command arguments.
///
/// With no filters every donor is listed.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Blood group; only available donors are shown
    #[arg(short, long)]
    pub blood_group: Option<String>,

    /// Part of the donor's name (case-insensitive)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl From<&SearchCommand> for SearchQuery {
    fn from(cmd: &SearchCommand) -> Self {
        Self {
            blood_group: cmd.blood_group.clone(),
            name: cmd.name.clone(),
        }
    }
}

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Donor's full name
    #[arg(long)]
    pub name: String,

    /// Contact phone number
    #[arg(long)]
    pub phone: String,

    /// Blood group (e.g. "O+", "ab-")
    #[arg(short, long)]
    pub blood_group: String,

    /// Street address
    #[arg(long, conflicts_with = "city")]
    pub address: Option<String>,

    /// City, stored as the address
    #[arg(long)]
    pub city: Option<String>,

    /// Initial availability status (default "Available")
    #[arg(short, long)]
    pub status: Option<String>,
}

impl From<RegisterCommand> for RegistrationRequest {
    fn from(cmd: RegisterCommand) -> Self {
        Self {
            name: Some(cmd.name),
            phone_number: Some(cmd.phone),
            blood_group: Some(cmd.blood_group),
            address: cmd.address,
            city: cmd.city,
            availability_status: cmd.status,
        }
    }
}

/// Set-status command arguments.
#[derive(Debug, Args)]
pub struct SetStatusCommand {
    /// Donor id
    pub id: String,

    /// New availability status (any text, stored capitalized)
    pub status: String,
}

impl From<SetStatusCommand> for StatusUpdateRequest {
    fn from(cmd: SetStatusCommand) -> Self {
        Self {
            id: Some(Value::String(cmd.id)),
            new_status: Some(cmd.status),
        }
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donor::DonorId;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_search_command_to_query() {
        let cmd = SearchCommand {
            blood_group: Some("O+".to_string()),
            name: None,
            format: OutputFormat::Table,
        };
        let query = SearchQuery::from(&cmd);
        assert_eq!(query, SearchQuery::blood_group("O+"));
    }

    #[test]
    fn test_register_command_to_request() {
        let cmd = RegisterCommand {
            name: "Anna".to_string(),
            phone: "12345".to_string(),
            blood_group: "a+".to_string(),
            address: None,
            city: Some("Pune".to_string()),
            status: None,
        };
        let donor = RegistrationRequest::from(cmd)
            .validate()
            .unwrap()
            .into_donor(DonorId::new(1));
        assert_eq!(donor.blood_group, "A+");
        assert_eq!(donor.address, "Pune");
    }

    #[test]
    fn test_set_status_command_to_request() {
        let cmd = SetStatusCommand {
            id: "4".to_string(),
            status: "unavailable".to_string(),
        };
        let update = StatusUpdateRequest::from(cmd).validate().unwrap();
        assert_eq!(update.target.id(), Some(DonorId::new(4)));
        assert_eq!(update.new_status, "Unavailable");
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
