// json-converter-server: demo HTTP server whose JSON bodies go through a
// logging, redacting JsonConverter.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use chrono::{Local, NaiveDate};
use json_converter::config::ConverterSettings;
use json_converter::logger::{self, TracingLoggerFactory};
use json_converter::server::{self, Json, RouterExt, ServerConfig};
use json_converter::JsonConverter;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::Level;
use uuid::Uuid;

fn create_command() -> clap::Command {
    clap::Command::new("json-converter-server")
        .about("Echo server for the JSON converter")
        .arg(
            clap::Arg::new("host")
                .long("host")
                .default_value("0.0.0.0")
                .help("Bind address"),
        )
        .arg(
            clap::Arg::new("port")
                .short('p')
                .long("port")
                .value_parser(clap::value_parser!(u16))
                .default_value("8080")
                .help("TCP port (0 picks a free one)"),
        )
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Converter settings file (YAML or JSON)"),
        )
        .arg(
            clap::Arg::new("log-level")
                .long("log-level")
                .value_parser(clap::value_parser!(Level))
                .help("Level JSON documents are logged at"),
        )
        .arg(
            clap::Arg::new("log-name")
                .long("log-name")
                .help("Logger name for converted documents"),
        )
        .arg(
            clap::Arg::new("log-exclude")
                .long("log-exclude")
                .value_delimiter(',')
                .help("Comma-separated member names masked in logs"),
        )
        .arg(
            clap::Arg::new("debug")
                .short('d')
                .long("debug")
                .action(clap::ArgAction::SetTrue)
                .help("Enable debug output"),
        )
}

/// Settings file first, then command-line overrides.
fn converter_from_matches(matches: &clap::ArgMatches) -> anyhow::Result<JsonConverter> {
    let mut builder = JsonConverter::builder().logger_factory(Arc::new(TracingLoggerFactory));

    if let Some(path) = matches.get_one::<PathBuf>("config") {
        let settings = ConverterSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?;
        builder = builder.settings(&settings)?;
    }
    if let Some(name) = matches.get_one::<String>("log-name") {
        builder = builder.logger_name(name.clone());
    }
    if let Some(level) = matches.get_one::<Level>("log-level") {
        builder = builder.log_level(*level);
    }
    if let Some(names) = matches.get_many::<String>("log-exclude") {
        builder = builder.log_exclude(names.cloned());
    }

    Ok(builder.build())
}

#[derive(Debug, Serialize, Deserialize)]
struct EchoRequest {
    #[serde(rename = "ID")]
    id: Uuid,
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct EchoResponse {
    #[serde(rename = "DATE")]
    date: NaiveDate,
    extra: String,
}

async fn health() -> &'static str {
    "ok"
}

async fn echo_get() -> Json<EchoResponse> {
    Json(EchoResponse {
        date: Local::now().date_naive(),
        extra: "Hello!".into(),
    })
}

async fn echo_post(Json(request): Json<EchoRequest>) -> Json<EchoResponse> {
    Json(EchoResponse {
        date: Local::now().date_naive(),
        extra: format!("{} ({})", request.name, request.id),
    })
}

fn router(converter: Arc<JsonConverter>) -> Router {
    Router::new()
        .route("/echo", get(echo_get).post(echo_post))
        .layer(TraceLayer::new_for_http())
        .with_json_converter(converter)
        .route("/health", get(health))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = create_command().get_matches();
    logger::init(matches.get_flag("debug"));

    let converter = Arc::new(converter_from_matches(&matches)?);
    let config = ServerConfig {
        host: matches
            .get_one::<String>("host")
            .cloned()
            .unwrap_or_default(),
        port: matches.get_one::<u16>("port").copied().unwrap_or_default(),
    };

    let handle = server::start_server(config, router(converter)).await?;
    tracing::info!(addr = %handle.local_addr(), "Ready");

    tokio::signal::ctrl_c().await?;
    handle.shutdown()?;
    Ok(())
}
