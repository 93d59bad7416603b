use std::path::PathBuf;
use std::process::ExitCode;

use axum::http::Method;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use api_gateway::config::{load_config, ConfigurationError, GatewayConfig, ObservabilityConfig};
use api_gateway::observability::logging;
use api_gateway::routing::{RouteAction, RouteRule, RouteTable};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Inspect and test the API gateway route table", long_about = None)]
struct Cli {
    /// Gateway configuration file. The built-in route table is used when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the configuration
    Validate,
    /// Print the compiled route table in evaluation order
    Routes,
    /// Show which route governs a request and what it resolves to
    Match {
        /// Request path, e.g. /api/auth/login
        path: String,
        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(&ObservabilityConfig {
        log_level: "warn".to_string(),
        ..ObservabilityConfig::default()
    });

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => return report(e),
        },
        None => GatewayConfig::default(),
    };

    let table = match RouteTable::from_config(&config.routes) {
        Ok(table) => table,
        Err(e) => return report(e),
    };

    let output = match cli.command {
        Commands::Validate => validate_summary(&config, &table),
        Commands::Routes => Value::Array(table.rules().iter().map(describe_rule).collect()),
        Commands::Match { path, method } => {
            let method = match Method::from_bytes(method.to_uppercase().as_bytes()) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Error: invalid method {method:?}: {e}");
                    return ExitCode::FAILURE;
                }
            };
            match match_summary(&table, &path, &method) {
                Ok(value) => value,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    match serde_json::to_string_pretty(&output) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn report(error: ConfigurationError) -> ExitCode {
    match error {
        ConfigurationError::Invalid(errors) => {
            eprintln!("Configuration is invalid:");
            for e in errors {
                eprintln!("  - {e}");
            }
        }
        other => eprintln!("Error: {other}"),
    }
    ExitCode::FAILURE
}

fn validate_summary(config: &GatewayConfig, table: &RouteTable) -> Value {
    let shadowed: Vec<Value> = table
        .shadowed_routes()
        .into_iter()
        .map(|(route, by)| json!({ "route": route, "shadowed_by": by }))
        .collect();

    let mut services: Vec<&str> = config.services.iter().map(|s| s.service.as_str()).collect();
    services.sort_unstable();
    services.dedup();

    json!({
        "valid": true,
        "routes": table.len(),
        "services": services,
        "shadowed": shadowed,
    })
}

fn match_summary(table: &RouteTable, path: &str, method: &Method) -> Result<Value, Box<dyn std::error::Error>> {
    let outcome = table.match_route(path, method)?;
    let captures = table.rewrite_captures(path);

    Ok(json!({
        "method": method.as_str(),
        "path": path,
        "result": serde_json::to_value(&outcome)?,
        "captures": captures,
    }))
}

fn describe_rule(rule: &RouteRule) -> Value {
    let patterns: Vec<&str> = rule.patterns().iter().map(|p| p.as_str()).collect();
    let action = match rule.action() {
        RouteAction::Forward { upstream } => json!({ "forward": upstream }),
        RouteAction::Terminate { status, body } => {
            json!({ "terminate": status.as_u16(), "body": body })
        }
    };
    let rewrite = rule
        .rewrite()
        .map(|r| json!({ "regex": r.regex(), "replacement": r.replacement() }));

    json!({
        "id": rule.id(),
        "paths": patterns,
        "action": action,
        "rewrite": rewrite,
    })
}
