//! Client for the catalog service: a single POST endpoint speaking JSON with
//! an `action` discriminator and `ok`/`error` envelopes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, Serializer};

use crate::model::{EndpointConfig, Selection, Variant};
use crate::validate::{parse_dia, parse_quantity, round_quantity};

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("no endpoint configured (run `tally endpoint set --url ...`)")]
    Unconfigured,
    #[error("endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service refused the request: {0}")]
    Service(String),
}

#[derive(Debug, Serialize)]
struct MasterRequest {
    action: &'static str,
}

#[derive(Debug, Deserialize)]
struct MasterResponse {
    ok: bool,

    #[serde(default)]
    master: Vec<Variant>,

    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    ok: bool,

    #[serde(default)]
    error: Option<String>,
}

/// Wire form of one stock movement. `dia` goes out as a number, or as `""`
/// when the entry is identified by code alone; optional fields are sent as
/// empty strings.
#[derive(Clone, Debug, Serialize)]
pub struct SubmissionRecord {
    action: &'static str,
    pub code: String,
    pub maker: String,
    pub model: String,

    #[serde(serialize_with = "dia_or_empty")]
    pub dia: Option<f64>,

    pub location: String,
    pub qty: f64,
    pub hon: String,
    pub note: String,
}

impl SubmissionRecord {
    /// Snapshot of a selection at submit time. Callers run
    /// `validate::validate` first; anything still missing falls back to the
    /// empty wire value rather than panicking.
    pub fn from_selection(sel: &Selection) -> Self {
        Self {
            action: "submit",
            code: sel.code.trim().to_string(),
            maker: sel.maker.trim().to_string(),
            model: sel.model.trim().to_string(),
            dia: parse_dia(&sel.dia),
            location: sel
                .location
                .map(|l| l.as_str().to_string())
                .unwrap_or_default(),
            qty: parse_quantity(&sel.quantity)
                .map(round_quantity)
                .unwrap_or(0.0),
            hon: sel.piece_count.trim().to_string(),
            note: sel.note.trim().to_string(),
        }
    }
}

fn dia_or_empty<S>(dia: &Option<f64>, ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dia {
        Some(n) => ser.serialize_f64(*n),
        None => ser.serialize_str(""),
    }
}

pub struct EndpointClient {
    endpoint: EndpointConfig,
    client: reqwest::blocking::Client,
}

impl EndpointClient {
    pub fn new(endpoint: EndpointConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("tally")
            .build()
            .context("build reqwest client")?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Fetch the full master catalog.
    pub fn fetch_master(&self) -> Result<Vec<Variant>, RemoteError> {
        let resp: MasterResponse = self
            .client
            .post(self.endpoint.url.as_str())
            .json(&MasterRequest { action: "master" })
            .send()?
            .error_for_status()?
            .json()?;
        if !resp.ok {
            return Err(RemoteError::Service(
                resp.error
                    .unwrap_or_else(|| "master fetch refused".to_string()),
            ));
        }
        Ok(resp.master)
    }

    pub fn submit(&self, record: &SubmissionRecord) -> Result<(), RemoteError> {
        let resp: SubmitResponse = self
            .client
            .post(self.endpoint.url.as_str())
            .json(record)
            .send()?
            .error_for_status()?
            .json()?;
        if !resp.ok {
            return Err(RemoteError::Service(
                resp.error
                    .unwrap_or_else(|| "submission refused".to_string()),
            ));
        }
        Ok(())
    }
}
