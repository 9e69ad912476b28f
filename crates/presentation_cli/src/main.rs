//! Nominatim CLI
//!
//! Geocoding lookups from the command line. Every invocation prints one JSON
//! document to stdout; logs go to stderr.

#![allow(clippy::print_stdout)]

mod coordinates;
mod output;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use integration_nominatim::{
    GeocodingClient, NominatimClient, Params, ServiceStatus, StatusFormat, params,
};
use serde_json::{Value, json};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::output::{ErrorOutput, LocationResult, MatchedBy, Metadata};

/// Nominatim CLI
#[derive(Debug, Parser)]
#[command(name = "nominatim-cli")]
#[command(author, version, about = "Geocoding lookups via Nominatim (OpenStreetMap)", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: ./nominatim.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Nominatim base URL
    #[arg(long, env = "NOMINATIM_BASE_URL", global = true)]
    base_url: Option<String>,

    /// User-Agent sent with every request
    #[arg(long, global = true)]
    user_agent: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reverse geocode a coordinate pair
    ///
    /// Example: nominatim-cli reverse 50.3122 28.4314
    /// Example: nominatim-cli reverse --coords "50°18′44″ пн. ш. 28°25′53″ сх. д."
    Reverse {
        /// Latitude in decimal degrees
        #[arg(allow_negative_numbers = true, required_unless_present = "coords")]
        lat: Option<f64>,

        /// Longitude in decimal degrees
        #[arg(allow_negative_numbers = true, required_unless_present = "coords")]
        lon: Option<f64>,

        /// Coordinates as text (decimal or degrees/minutes/seconds)
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        coords: Option<String>,
    },

    /// Search for a place by name or address
    Search {
        /// Free-text query
        query: String,
    },

    /// Look up places by OSM id (e.g. R146656 W104393803)
    Lookup {
        /// OSM ids prefixed with N, W or R
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show details of a single object
    Details {
        /// Nominatim place id
        #[arg(long, conflicts_with_all = ["osm_type", "osm_id"], required_unless_present = "osm_id")]
        place_id: Option<u64>,

        /// OSM type (N, W or R)
        #[arg(long, requires = "osm_id")]
        osm_type: Option<String>,

        /// OSM id
        #[arg(long, requires = "osm_type")]
        osm_id: Option<u64>,

        /// Include the address hierarchy
        #[arg(long)]
        addressdetails: bool,
    },

    /// Check the service status
    Status {
        /// Output format: json or text
        #[arg(short, long, default_value = "json")]
        format: String,
    },
}

impl Commands {
    /// Name reported as `search_mode` in the output metadata
    const fn mode(&self) -> &'static str {
        match self {
            Self::Reverse { .. } => "reverse",
            Self::Search { .. } => "search",
            Self::Lookup { .. } => "lookup",
            Self::Details { .. } => "details",
            Self::Status { .. } => "status",
        }
    }
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the client from file, environment and flags
fn build_client(cli: &Cli) -> anyhow::Result<NominatimClient> {
    let config = settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = settings::apply_overrides(config, cli.base_url.clone(), cli.user_agent.clone());
    debug!(base_url = %config.base_url, "Using Nominatim");
    Ok(NominatimClient::new(&config)?)
}

/// Run a command and produce its result document (without metadata)
async fn run(client: &impl GeocodingClient, command: Commands) -> anyhow::Result<Value> {
    match command {
        Commands::Reverse { lat, lon, coords } => {
            let (lat, lon) = match (coords, lat, lon) {
                (Some(text), _, _) => {
                    let location = coordinates::parse_coordinates(&text)?;
                    (location.latitude(), location.longitude())
                },
                (None, Some(lat), Some(lon)) => (lat, lon),
                _ => bail!("Reverse mode requires lat and lon parameters"),
            };

            let place = client
                .reverse(lat, lon, params([("addressdetails", "1")]))
                .await?
                .context("Location not found for coordinates")?;

            Ok(serde_json::to_value(LocationResult::from_place(
                &place,
                MatchedBy::ReverseGeocoding,
            ))?)
        },

        Commands::Search { query } => {
            let places = client
                .search(
                    query.as_str().into(),
                    params([
                        ("addressdetails", "1"),
                        ("limit", "1"),
                        ("extratags", "1"),
                        ("namedetails", "1"),
                    ]),
                )
                .await?;

            let place = places
                .first()
                .with_context(|| format!("No results found for query: {query}"))?;

            Ok(serde_json::to_value(LocationResult::from_place(
                place,
                MatchedBy::TextSearch,
            ))?)
        },

        Commands::Lookup { ids } => {
            let places = client.lookup(&ids, params([("addressdetails", "1")])).await?;
            let results: Vec<LocationResult> = places
                .iter()
                .map(|place| LocationResult::from_place(place, MatchedBy::Lookup))
                .collect();
            Ok(json!({ "results": results }))
        },

        Commands::Details {
            place_id,
            osm_type,
            osm_id,
            addressdetails,
        } => {
            let mut request = Params::new();
            if let Some(place_id) = place_id {
                request.insert("place_id".to_string(), place_id.to_string());
            }
            if let (Some(osm_type), Some(osm_id)) = (osm_type, osm_id) {
                request.insert("osmtype".to_string(), osm_type);
                request.insert("osmid".to_string(), osm_id.to_string());
            }
            if addressdetails {
                request.insert("addressdetails".to_string(), "1".to_string());
            }

            let place = client.details(request).await?;
            Ok(json!({ "place": place }))
        },

        Commands::Status { format } => {
            let format: StatusFormat = format.parse()?;
            let status = match client.status(format).await? {
                ServiceStatus::Json(map) => Value::Object(map),
                ServiceStatus::Text(text) => Value::String(text),
            };
            Ok(json!({ "status": status }))
        },
    }
}

/// Subcommand named on the command line, or `unknown`
fn mode_from_args(args: &[String]) -> String {
    let command = Cli::command();
    args.iter()
        .skip(1)
        .find(|arg| command.find_subcommand(arg.as_str()).is_some())
        .map_or_else(|| "unknown".to_string(), Clone::clone)
}

/// Error document for arguments clap rejected
fn usage_error(error: &clap::Error, args: &[String]) -> ErrorOutput {
    let message = match error.kind() {
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand | ErrorKind::MissingSubcommand => {
            "Missing command: expected one of reverse, search, lookup, details, status".to_string()
        },
        _ => error
            .render()
            .to_string()
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .trim()
            .to_string(),
    };

    ErrorOutput {
        error: message,
        metadata: Metadata::now(&mode_from_args(args)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        },
        Err(e) => {
            println!("{}", output::render(&usage_error(&e, &args)));
            return ExitCode::FAILURE;
        },
    };

    // Logs go to stderr so stdout carries only the JSON document
    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let metadata = Metadata::now(cli.command.mode());

    let result = match build_client(&cli) {
        Ok(client) => run(&client, cli.command).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(body) => {
            println!("{}", output::render(&output::with_metadata(body, &metadata)));
            ExitCode::SUCCESS
        },
        Err(e) => {
            let document = ErrorOutput {
                error: format!("{e:#}"),
                metadata,
            };
            println!("{}", output::render(&document));
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use domain::Place;
    use integration_nominatim::{NominatimError, SearchQuery};

    use super::*;

    fn parse_args(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    /// Returns canned answers and remembers the last parameters it saw
    #[derive(Debug, Default)]
    struct StubClient {
        places: Vec<Place>,
        last_params: parking_lot::Mutex<Option<Params>>,
    }

    impl StubClient {
        fn with_place(value: &Value) -> Self {
            Self {
                places: vec![Place::from_map(value.as_object().unwrap())],
                ..Self::default()
            }
        }

        fn remember(&self, params: Params) {
            *self.last_params.lock() = Some(params);
        }
    }

    #[async_trait]
    impl GeocodingClient for StubClient {
        async fn search(
            &self,
            _query: SearchQuery,
            params: Params,
        ) -> Result<Vec<Place>, NominatimError> {
            self.remember(params);
            Ok(self.places.clone())
        }

        async fn reverse(
            &self,
            lat: f64,
            lon: f64,
            params: Params,
        ) -> Result<Option<Place>, NominatimError> {
            domain::GeoLocation::new(lat, lon)
                .map_err(|e| NominatimError::InvalidInput(e.to_string()))?;
            self.remember(params);
            Ok(self.places.first().cloned())
        }

        async fn lookup(
            &self,
            _ids: &[String],
            params: Params,
        ) -> Result<Vec<Place>, NominatimError> {
            self.remember(params);
            Ok(self.places.clone())
        }

        async fn details(&self, params: Params) -> Result<Place, NominatimError> {
            self.remember(params);
            Ok(self.places.first().cloned().unwrap_or_default())
        }

        async fn status(&self, format: StatusFormat) -> Result<ServiceStatus, NominatimError> {
            Ok(match format {
                StatusFormat::Text => ServiceStatus::Text("OK".to_string()),
                StatusFormat::Json => {
                    ServiceStatus::Json(json!({"status": 0}).as_object().cloned().unwrap())
                },
            })
        }
    }

    #[test]
    fn log_filter_verbosity_levels() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
        assert_eq!(log_filter_from_verbosity(1), "info");
        assert_eq!(log_filter_from_verbosity(2), "debug");
        assert_eq!(log_filter_from_verbosity(3), "trace");
        assert_eq!(log_filter_from_verbosity(10), "trace");
    }

    #[test]
    fn cli_parses_reverse_with_negative_numbers() {
        let cli = parse_args(&["nominatim-cli", "reverse", "-33.8688", "151.2093"]).unwrap();
        let Commands::Reverse { lat, lon, coords } = cli.command else {
            panic!("Expected Reverse command");
        };
        assert_eq!(lat, Some(-33.8688));
        assert_eq!(lon, Some(151.2093));
        assert!(coords.is_none());
    }

    #[test]
    fn cli_parses_reverse_with_coords_text() {
        let cli = parse_args(&["nominatim-cli", "reverse", "--coords", "50°18′44″ 28°25′53″"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Reverse { coords: Some(_), .. }));
    }

    #[test]
    fn cli_rejects_reverse_without_coordinates() {
        assert!(parse_args(&["nominatim-cli", "reverse"]).is_err());
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = parse_args(&[
            "nominatim-cli",
            "search",
            "Kyiv",
            "-vv",
            "--base-url",
            "http://localhost:8080",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(cli.command.mode(), "search");
    }

    #[test]
    fn cli_details_requires_an_identifier() {
        assert!(parse_args(&["nominatim-cli", "details"]).is_err());
        assert!(parse_args(&["nominatim-cli", "details", "--osm-type", "W"]).is_err());
        assert!(
            parse_args(&["nominatim-cli", "details", "--osm-type", "W", "--osm-id", "1"]).is_ok()
        );
        assert!(parse_args(&["nominatim-cli", "details", "--place-id", "5"]).is_ok());
    }

    #[test]
    fn cli_lookup_requires_ids() {
        assert!(parse_args(&["nominatim-cli", "lookup"]).is_err());
        let cli = parse_args(&["nominatim-cli", "lookup", "R1", "W2"]).unwrap();
        let Commands::Lookup { ids } = cli.command else {
            panic!("Expected Lookup command");
        };
        assert_eq!(ids, vec!["R1", "W2"]);
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn invalid_arguments_render_error_document() {
        let args = args(&["nominatim-cli", "-v", "reverse", "abc", "1"]);
        let err = Cli::try_parse_from(&args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let rendered = output::render(&usage_error(&err, &args));
        let document: Value = serde_json::from_str(&rendered).unwrap();
        let message = document["error"].as_str().unwrap();
        assert!(message.contains("invalid value 'abc'"));
        assert!(!message.starts_with("error:"));
        assert_eq!(document["metadata"]["search_mode"], "reverse");
        assert_eq!(document["metadata"]["api_version"], output::API_VERSION);
    }

    #[test]
    fn missing_subcommand_reports_unknown_mode() {
        let args = args(&["nominatim-cli"]);
        let err = Cli::try_parse_from(&args).unwrap_err();
        assert!(!matches!(
            err.kind(),
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
        ));
        let document = usage_error(&err, &args);
        assert!(document.error.starts_with("Missing command"));
        assert_eq!(document.metadata.search_mode, "unknown");
    }

    #[test]
    fn help_is_not_an_error_document() {
        let err = Cli::try_parse_from(["nominatim-cli", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[tokio::test]
    async fn reverse_produces_location_result() {
        let client = StubClient::with_place(&json!({
            "osm_type": "relation",
            "osm_id": 5,
            "display_name": "Somewhere",
            "address": {"city": "Zhytomyr"}
        }));

        let body = run(
            &client,
            Commands::Reverse {
                lat: Some(50.25),
                lon: Some(28.66),
                coords: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(body["uid"], "relation5");
        assert_eq!(body["city_name"], "Zhytomyr");
        assert_eq!(body["matched_by"], "nominatim_reverse_geocoding");
        assert_eq!(body["similarity"], 1.0);
        let sent = client.last_params.lock().clone().unwrap();
        assert_eq!(sent["addressdetails"], "1");
    }

    #[tokio::test]
    async fn reverse_from_dms_text() {
        let client = StubClient::with_place(&json!({"osm_id": 1}));
        let body = run(
            &client,
            Commands::Reverse {
                lat: None,
                lon: None,
                coords: Some("50°18′44″ пн. ш. 28°25′53″ сх. д.".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(body["osm_id"], 1);
    }

    #[tokio::test]
    async fn reverse_not_found_is_an_error() {
        let client = StubClient::default();
        let err = run(
            &client,
            Commands::Reverse {
                lat: Some(0.0),
                lon: Some(0.0),
                coords: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Location not found for coordinates");
    }

    #[tokio::test]
    async fn search_sends_fixed_parameters() {
        let client = StubClient::with_place(&json!({"osm_id": 9, "osm_type": "node"}));
        let body = run(
            &client,
            Commands::Search {
                query: "Kyiv".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(body["matched_by"], "nominatim_text_search");
        assert!(body["similarity"].is_null());
        let sent = client.last_params.lock().clone().unwrap();
        assert_eq!(sent["limit"], "1");
        assert_eq!(sent["extratags"], "1");
        assert_eq!(sent["namedetails"], "1");
    }

    #[tokio::test]
    async fn search_without_results_is_an_error() {
        let err = run(
            &StubClient::default(),
            Commands::Search {
                query: "Atlantis".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "No results found for query: Atlantis");
    }

    #[tokio::test]
    async fn details_builds_osm_parameters() {
        let client = StubClient::with_place(&json!({"place_id": 42}));
        let body = run(
            &client,
            Commands::Details {
                place_id: None,
                osm_type: Some("W".to_string()),
                osm_id: Some(38_210_407),
                addressdetails: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(body["place"]["place_id"], 42);
        let sent = client.last_params.lock().clone().unwrap();
        assert_eq!(sent["osmtype"], "W");
        assert_eq!(sent["osmid"], "38210407");
        assert_eq!(sent["addressdetails"], "1");
    }

    #[tokio::test]
    async fn status_rejects_unknown_format() {
        let err = run(
            &StubClient::default(),
            Commands::Status {
                format: "xml".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("xml"));

        let body = run(
            &StubClient::default(),
            Commands::Status {
                format: "text".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(body["status"], "OK");
    }

    #[tokio::test]
    async fn lookup_lists_results() {
        let client = StubClient::with_place(&json!({"osm_id": 146_656, "osm_type": "relation"}));
        let body = run(
            &client,
            Commands::Lookup {
                ids: vec!["R146656".to_string()],
            },
        )
        .await
        .unwrap();
        assert_eq!(body["results"][0]["uid"], "relation146656");
        assert_eq!(body["results"][0]["matched_by"], "nominatim_lookup");
    }
}
