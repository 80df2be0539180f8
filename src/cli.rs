// Command-line interface: the API server and its client commands
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::infrastructure::client_settings::DEFAULT_SETTINGS_FILE;

/// Equipment Insights - CSV ingestion, summaries and reports for
/// chemical-equipment readings
///
/// Examples:
///   equipment-insights serve --config config/server.toml
///   equipment-insights configure --base-url http://127.0.0.1:8000 --token abc
///   equipment-insights upload readings.csv
///   equipment-insights history
///   equipment-insights report 3 --output dataset_3_report.pdf
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Path to the server configuration file
        ///
        /// If not specified, config/server.toml is used when present
        #[arg(short, long, value_name = "FILE")]
        config: Option<String>,
    },

    /// Save the connection settings used by the client commands
    Configure {
        #[command(flatten)]
        client: ClientArgs,
    },

    /// Upload a CSV file and print its summary
    Upload {
        #[command(flatten)]
        client: ClientArgs,

        /// CSV file with flowrate, pressure, temperature and type columns
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the most recent uploads
    History {
        #[command(flatten)]
        client: ClientArgs,
    },

    /// Show the summary and charts of one upload
    Summary {
        #[command(flatten)]
        client: ClientArgs,

        /// Dataset identifier
        id: u64,
    },

    /// Download the PDF report of one upload
    Report {
        #[command(flatten)]
        client: ClientArgs,

        /// Dataset identifier
        id: u64,

        /// Output file path (defaults to dataset_<id>_report.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Connection options shared by the client commands
#[derive(ClapArgs, Debug, Clone)]
pub struct ClientArgs {
    /// Settings file holding the saved base URL and token
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE, value_name = "FILE", env = "EQUIPMENT_CLIENT_SETTINGS")]
    pub settings: PathBuf,

    /// API base URL, overriding the saved one
    #[arg(long, value_name = "URL", env = "EQUIPMENT_API_BASE")]
    pub base_url: Option<String>,

    /// API token, overriding the saved one
    #[arg(long, value_name = "TOKEN", env = "EQUIPMENT_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_report_arguments() {
        let args = Args::try_parse_from([
            "equipment-insights",
            "report",
            "4",
            "--output",
            "out.pdf",
            "--base-url",
            "http://plant:8000",
        ])
        .unwrap();

        match args.command {
            Command::Report { client, id, output } => {
                assert_eq!(id, 4);
                assert_eq!(output, Some(PathBuf::from("out.pdf")));
                assert_eq!(client.base_url.as_deref(), Some("http://plant:8000"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_serve_without_config() {
        let args = Args::try_parse_from(["equipment-insights", "serve"]).unwrap();
        assert!(matches!(args.command, Command::Serve { config: None }));
    }
}
