//! chatmacro-cli: stdio front end
//!
//! Stands in for the chat transport: one JSON request per stdin line, one
//! JSON response per stdout line. Logs go to stderr.
//!
//! Methods:
//! - render: Render a template with per-request macros
//! - parse: Show the parse tree and normalized source of a template
//! - help: Get metadata for one plugin
//! - list_plugins: List available plugins
//!
//! Configuration (environment):
//! - RUST_LOG: log filter (default `info`)
//! - CHATMACRO_FALLBACK: reply used when a render fails
//! - CHATMACRO_TIMEOUT_MS: per-render timeout
//! - CHATMACRO_MACROS_FILE: JSON file with the base macro table

mod config;

use chatmacro::{build_tree, Engine, ErrorReport, MacroTable};
use config::Config;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
enum Request {
    Render {
        #[serde(default)]
        id: Option<JsonValue>,
        template: String,
        #[serde(default)]
        macros: MacroTable,
    },
    Parse {
        #[serde(default)]
        id: Option<JsonValue>,
        template: String,
    },
    Help {
        #[serde(default)]
        id: Option<JsonValue>,
        name: String,
    },
    ListPlugins {
        #[serde(default)]
        id: Option<JsonValue>,
        #[serde(default)]
        category: Option<String>,
    },
}

impl Request {
    fn id(&self) -> Option<JsonValue> {
        match self {
            Request::Render { id, .. }
            | Request::Parse { id, .. }
            | Request::Help { id, .. }
            | Request::ListPlugins { id, .. } => id.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport>,
    /// User-visible reply to send instead of `output`
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<String>,
}

impl Response {
    fn output(id: Option<JsonValue>, output: String) -> Self {
        Self { id, output: Some(output), ..Self::default() }
    }

    fn result(id: Option<JsonValue>, result: JsonValue) -> Self {
        Self { id, result: Some(result), ..Self::default() }
    }

    fn error(id: Option<JsonValue>, error: ErrorReport) -> Self {
        Self { id, error: Some(error), ..Self::default() }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    let config = Config::from_env();
    let base_macros = match config.load_macros() {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(error = %e, "cannot load base macro table");
            std::process::exit(1);
        }
    };
    let engine = Engine::with_standard_library().with_macros(base_macros);

    tracing::info!(version = SERVER_VERSION, "chatmacro started");
    tracing::info!(plugins = ?engine.registry().names(), timeout_ms = config.timeout.as_millis() as u64, "engine ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!("client disconnected (EOF)");
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "error reading input");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        tracing::debug!(bytes = line.len(), "request received");

        let response = handle_line(&engine, &config, line).await;
        let mut response_json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "cannot serialize response");
                continue;
            }
        };
        response_json.push('\n');

        if let Err(e) = stdout.write_all(response_json.as_bytes()).await {
            tracing::error!(error = %e, "error writing response");
            break;
        }
        if let Err(e) = stdout.flush().await {
            tracing::error!(error = %e, "error flushing stdout");
            break;
        }
    }

    tracing::info!("shutting down");
}

async fn handle_line(engine: &Engine, config: &Config, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "malformed request");
            return Response::error(
                None,
                ErrorReport::new("BAD_REQUEST", format!("Malformed request: {}", e))
                    .with_suggestion("Send one JSON object per line with a \"method\" field"),
            );
        }
    };
    handle_request(engine, config, request).await
}

async fn handle_request(engine: &Engine, config: &Config, request: Request) -> Response {
    let id = request.id();
    match request {
        Request::Render { template, macros, .. } => {
            let render = engine.render_with(&template, macros);
            match tokio::time::timeout(config.timeout, render).await {
                Ok(Ok(output)) => Response::output(id, output),
                Ok(Err(err)) => {
                    tracing::warn!(code = err.code(), error = %err, template = %template, "render failed");
                    Response {
                        fallback: Some(config.fallback.clone()),
                        ..Response::error(id, err.report())
                    }
                }
                Err(_) => {
                    tracing::warn!(timeout_ms = config.timeout.as_millis() as u64, template = %template, "render timed out");
                    Response {
                        fallback: Some(config.fallback.clone()),
                        ..Response::error(
                            id,
                            ErrorReport::new(
                                "TIMEOUT",
                                format!("Render did not finish within {} ms", config.timeout.as_millis()),
                            ),
                        )
                    }
                }
            }
        }

        Request::Parse { template, .. } => match build_tree(&template) {
            Ok(tree) => Response::result(
                id,
                json!({
                    "tree": tree,
                    "normalized": tree.to_string(),
                    "plugins": tree.plugin_names(),
                }),
            ),
            Err(err) => Response::error(id, err.report()),
        },

        Request::Help { name, .. } => match engine.help(&name) {
            Some(meta) => Response::result(id, json!(meta)),
            None => {
                let similar = engine.registry().find_similar(&name);
                let mut report = ErrorReport::new("NOT_FOUND", format!("No plugin named '{}'", name));
                if !similar.is_empty() {
                    report = report.with_suggestion(format!("Similar: {}", similar.join(", ")));
                }
                Response::error(id, report)
            }
        },

        Request::ListPlugins { category, .. } => {
            Response::result(id, json!({ "plugins": engine.list_plugins(category.as_deref()) }))
        }
    }
}
