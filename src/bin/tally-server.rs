//! Development stand-in for the spreadsheet-backed catalog service. Speaks
//! the same single-endpoint JSON RPC as the production deployment: a POST
//! body carrying an `action` discriminator, answered with an `ok`/`error`
//! envelope.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::RwLock;

use tally::catalog::dia_eq;
use tally::model::{Location, Variant};

#[derive(Parser)]
#[command(name = "tally-server")]
#[command(about = "Development stand-in for the catalog service", long_about = None)]
struct Args {
    /// Listen address (port 0 picks a free port)
    #[arg(long, default_value = "127.0.0.1:7171")]
    addr: SocketAddr,

    /// Write the bound address to this file after startup
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Persist the master list and movement log under this directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Refuse all submissions with an error envelope (maintenance mode)
    #[arg(long)]
    reject_submits: bool,
}

#[derive(Clone)]
struct AppState {
    master: Arc<RwLock<Vec<Variant>>>,
    movements: Arc<RwLock<Vec<MovementRow>>>,
    data_dir: Option<PathBuf>,
    reject_submits: bool,
}

/// One recorded stock movement, in the shape the production sheet appends.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct MovementRow {
    at: String,
    code: String,
    maker: String,
    model: String,
    dia: Option<f64>,
    location: String,
    qty: f64,
    hon: String,
    note: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum Rpc {
    Master,
    Submit {
        #[serde(default)]
        code: String,

        #[serde(default)]
        maker: String,

        #[serde(default)]
        model: String,

        #[serde(default)]
        dia: DiaField,

        location: String,
        qty: f64,

        #[serde(default)]
        hon: String,

        #[serde(default)]
        note: String,
    },
}

// The client sends `dia` as a number, or as "" for code-only entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DiaField {
    Number(f64),
    Text(String),
}

impl Default for DiaField {
    fn default() -> Self {
        DiaField::Text(String::new())
    }
}

impl DiaField {
    fn value(&self) -> Option<f64> {
        match self {
            DiaField::Number(n) => n.is_finite().then_some(*n),
            DiaField::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

fn ok_envelope() -> serde_json::Value {
    serde_json::json!({ "ok": true })
}

fn error_envelope(msg: impl Into<String>) -> serde_json::Value {
    serde_json::json!({ "ok": false, "error": msg.into() })
}

async fn rpc(State(state): State<AppState>, Json(req): Json<Rpc>) -> Json<serde_json::Value> {
    match req {
        Rpc::Master => {
            let master = state.master.read().await;
            Json(serde_json::json!({ "ok": true, "master": &*master }))
        }

        Rpc::Submit {
            code,
            maker,
            model,
            dia,
            location,
            qty,
            hon,
            note,
        } => {
            if state.reject_submits {
                return Json(error_envelope("submissions are disabled"));
            }
            if Location::parse(&location).is_none() {
                return Json(error_envelope(format!("unknown location: {}", location)));
            }
            if !qty.is_finite() {
                return Json(error_envelope("qty must be a finite number"));
            }
            let dia = dia.value();
            if code.trim().is_empty() && (maker.trim().is_empty() || model.trim().is_empty()) {
                return Json(error_envelope("code, or maker and model, required"));
            }

            let mut master = state.master.write().await;
            let code = register_variant(&mut master, &code, &maker, &model, dia);

            let row = MovementRow {
                at: OffsetDateTime::now_utc()
                    .format(&Rfc3339)
                    .unwrap_or_default(),
                code,
                maker,
                model,
                dia,
                location,
                qty,
                hon,
                note,
            };
            let mut movements = state.movements.write().await;
            movements.push(row);

            if let Some(dir) = &state.data_dir {
                if let Err(err) = save_state(dir, &master, &movements) {
                    eprintln!("persist failed: {:#}", err);
                }
            }

            Json(ok_envelope())
        }
    }
}

/// Append an unseen variant to the master. Returns the code the movement is
/// recorded under: the one supplied, the one resolved from the triple, or a
/// freshly allocated one for a new variant.
fn register_variant(
    master: &mut Vec<Variant>,
    code: &str,
    maker: &str,
    model: &str,
    dia: Option<f64>,
) -> String {
    let code = code.trim();

    if !code.is_empty() {
        if master.iter().any(|v| v.code == code) {
            return code.to_string();
        }
        master.push(Variant {
            code: code.to_string(),
            maker: maker.trim().to_string(),
            model: model.trim().to_string(),
            dia: dia.unwrap_or(0.0),
        });
        return code.to_string();
    }

    if let Some(dia) = dia
        && let Some(v) = master
            .iter()
            .find(|v| v.maker == maker.trim() && v.model == model.trim() && dia_eq(v.dia, dia))
    {
        return v.code.clone();
    }

    let next = master
        .iter()
        .filter_map(|v| v.code.parse::<u64>().ok())
        .max()
        .map(|n| n + 1)
        .unwrap_or(1001);
    let code = next.to_string();
    master.push(Variant {
        code: code.clone(),
        maker: maker.trim().to_string(),
        model: model.trim().to_string(),
        dia: dia.unwrap_or(0.0),
    });
    code
}

fn master_path(dir: &Path) -> PathBuf {
    dir.join("master.json")
}

fn movements_path(dir: &Path) -> PathBuf {
    dir.join("movements.json")
}

fn load_state(dir: &Path) -> Result<(Vec<Variant>, Vec<MovementRow>)> {
    let master = match fs::read(master_path(dir)) {
        Ok(bytes) => serde_json::from_slice(&bytes).context("parse master.json")?,
        Err(_) => seed_master(),
    };
    let movements = match fs::read(movements_path(dir)) {
        Ok(bytes) => serde_json::from_slice(&bytes).context("parse movements.json")?,
        Err(_) => Vec::new(),
    };
    Ok((master, movements))
}

fn save_state(dir: &Path, master: &[Variant], movements: &[MovementRow]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let bytes = serde_json::to_vec_pretty(master).context("serialize master")?;
    fs::write(master_path(dir), bytes).context("write master.json")?;
    let bytes = serde_json::to_vec_pretty(movements).context("serialize movements")?;
    fs::write(movements_path(dir), bytes).context("write movements.json")?;
    Ok(())
}

fn seed_master() -> Vec<Variant> {
    let row = |code: &str, maker: &str, model: &str, dia: f64| Variant {
        code: code.to_string(),
        maker: maker.to_string(),
        model: model.to_string(),
        dia,
    };
    vec![
        row("1001", "Aiko Wire", "SWP-A", 0.5),
        row("1002", "Aiko Wire", "SWP-A", 0.8),
        row("1003", "Aiko Wire", "SWP-B", 0.5),
        row("2001", "Banshu Spring", "HDW", 1.2),
        row("2002", "Banshu Spring", "HDW", 1.6),
        row("3001", "Chubu Steel", "PIANO", 0.3),
    ]
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let (master, movements) = match &args.data_dir {
        Some(dir) => load_state(dir)?,
        None => (seed_master(), Vec::new()),
    };

    let state = AppState {
        master: Arc::new(RwLock::new(master)),
        movements: Arc::new(RwLock::new(movements)),
        data_dir: args.data_dir.clone(),
        reject_submits: args.reject_submits,
    };

    let app = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/", post(rpc))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;
    let local = listener.local_addr().context("local addr")?;

    if let Some(path) = &args.addr_file {
        fs::write(path, local.to_string())
            .with_context(|| format!("write {}", path.display()))?;
    }
    println!("tally-server listening on {}", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
