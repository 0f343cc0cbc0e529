//! Wire-level checks of the RPC contract, independent of the client types.

mod common;

use anyhow::Result;
use serde_json::json;

use common::spawn_server;
use tally::model::{Location, Selection};
use tally::remote::SubmissionRecord;

#[test]
fn master_action_returns_variant_rows() -> Result<()> {
    let server = spawn_server()?;
    let client = reqwest::blocking::Client::new();

    let resp: serde_json::Value = client
        .post(server.base_url.as_str())
        .json(&json!({ "action": "master" }))
        .send()?
        .error_for_status()?
        .json()?;

    assert_eq!(resp["ok"], json!(true));
    let master = resp["master"].as_array().expect("master array");
    assert!(!master.is_empty());
    for row in master {
        assert!(row["code"].is_string());
        assert!(row["maker"].is_string());
        assert!(row["model"].is_string());
        assert!(row["dia"].is_number());
    }
    Ok(())
}

#[test]
fn code_only_submission_sends_empty_dia() -> Result<()> {
    let server = spawn_server()?;
    let client = reqwest::blocking::Client::new();

    let resp: serde_json::Value = client
        .post(server.base_url.as_str())
        .json(&json!({
            "action": "submit",
            "code": "1001",
            "maker": "",
            "model": "",
            "dia": "",
            "location": "site_stock",
            "qty": 2.5,
            "hon": "",
            "note": "",
        }))
        .send()?
        .error_for_status()?
        .json()?;

    assert_eq!(resp["ok"], json!(true));
    Ok(())
}

#[test]
fn unknown_location_is_refused_with_an_envelope() -> Result<()> {
    let server = spawn_server()?;
    let client = reqwest::blocking::Client::new();

    let resp: serde_json::Value = client
        .post(server.base_url.as_str())
        .json(&json!({
            "action": "submit",
            "code": "1001",
            "location": "basement",
            "qty": 1,
        }))
        .send()?
        .error_for_status()?
        .json()?;

    assert_eq!(resp["ok"], json!(false));
    assert!(resp["error"].as_str().unwrap_or_default().contains("location"));
    Ok(())
}

#[test]
fn submission_record_coerces_wire_fields() -> Result<()> {
    let sel = Selection {
        code: " 1001 ".to_string(),
        maker: "Aiko Wire".to_string(),
        model: "SWP-A".to_string(),
        dia: "".to_string(),
        new_mode: false,
        location: Some(Location::WarehouseStock),
        quantity: "12.345".to_string(),
        piece_count: "".to_string(),
        note: "checked".to_string(),
    };

    let value = serde_json::to_value(SubmissionRecord::from_selection(&sel))?;
    assert_eq!(value["action"], json!("submit"));
    assert_eq!(value["code"], json!("1001"));
    // Code-only identity: dia goes out as the empty string.
    assert_eq!(value["dia"], json!(""));
    assert_eq!(value["location"], json!("warehouse_stock"));
    assert_eq!(value["qty"], json!(12.35));
    assert_eq!(value["hon"], json!(""));
    assert_eq!(value["note"], json!("checked"));
    Ok(())
}

#[test]
fn numeric_dia_rides_along_when_present() -> Result<()> {
    let sel = Selection {
        code: String::new(),
        maker: "Aiko Wire".to_string(),
        model: "SWP-A".to_string(),
        dia: "0.8".to_string(),
        new_mode: true,
        location: Some(Location::SiteStock),
        quantity: "4".to_string(),
        piece_count: "1".to_string(),
        note: String::new(),
    };

    let value = serde_json::to_value(SubmissionRecord::from_selection(&sel))?;
    assert_eq!(value["dia"], json!(0.8));
    assert_eq!(value["qty"], json!(4.0));
    Ok(())
}
