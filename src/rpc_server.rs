//! IR Hub RPC Server: JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"vote.cast", "params":{"caller_id":"...","bookmark_id":"...","vote_type":"Like"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":{"kind":"...","message":"...","banner":"..."}}
//!
//! Logs go to stderr; stdout carries only protocol lines.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Mutex;

use irhub::app::App;
use irhub::rpc_handler::handle_method;
use irhub::services::logging;

use serde_json::{json, Value};
use tracing::{error, info, warn};

fn respond(out: &mut impl Write, response: &Value) -> io::Result<()> {
    writeln!(out, "{}", response)?;
    out.flush()
}

fn main() -> ExitCode {
    logging::init("irhub-rpc");

    let config_path = std::env::args().nth(1);
    let app = match App::load(config_path) {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            error!(error = %e, "failed to initialize");
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if respond(&mut out, &json!({"event":"ready","version":env!("CARGO_PKG_VERSION")})).is_err() {
        return ExitCode::FAILURE;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                let params = req.get("params").cloned().unwrap_or(json!({}));

                match handle_method(&app, method, &params) {
                    Ok(val) => json!({"id": id, "result": val}),
                    Err(err) => {
                        info!(method, kind = %err.kind, "request failed");
                        json!({"id": id, "error": err.to_json()})
                    }
                }
            }
            Err(e) => json!({"id": null, "error": {"kind": "parse_error", "message": format!("parse error: {}", e), "banner": "alert-danger"}}),
        };

        if respond(&mut out, &response).is_err() {
            break;
        }
    }

    info!("shutting down");
    ExitCode::SUCCESS
}
