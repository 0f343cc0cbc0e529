mod common;

use anyhow::Result;

use common::{spawn_server, spawn_server_with};
use tally::model::{EndpointConfig, Location, Selection};
use tally::remote::{EndpointClient, RemoteError};
use tally::resolve::CodeOutcome;
use tally::session::{Session, SubmitError};
use tally::validate::ValidationError;

fn session_for(base_url: &str) -> Result<Session> {
    let client = EndpointClient::new(EndpointConfig {
        url: base_url.to_string(),
    })?;
    Ok(Session::new(Some(client)))
}

#[test]
fn submit_refreshes_catalog_and_resets_selection() -> Result<()> {
    let server = spawn_server()?;
    let mut session = session_for(&server.base_url)?;

    let count = session.refresh_catalog()?;
    assert!(count > 0);

    let code = session.catalog().variants()[0].code.clone();
    assert_eq!(session.enter_code(&code), CodeOutcome::Resolved);
    session.set_location(Location::SiteStock);
    session.set_quantity("12.345");

    session.submit()?;
    assert_eq!(session.selection(), &Selection::default());
    assert!(!session.is_sending());
    Ok(())
}

#[test]
fn new_mode_submission_grows_the_master() -> Result<()> {
    let server = spawn_server()?;
    let mut session = session_for(&server.base_url)?;
    let before = session.refresh_catalog()?;

    session.set_new_mode(true);
    session.set_maker_text("Daido Metal");
    session.set_model_text("ORN");
    session.set_dia_text("2.5");
    session.set_location(Location::WarehouseStock);
    session.set_quantity("3");
    session.set_piece_count("2");
    session.submit()?;

    // The post-submit refresh picked up the server-side registration.
    assert_eq!(session.catalog().len(), before + 1);
    let added = session
        .catalog()
        .variants()
        .iter()
        .find(|v| v.maker == "Daido Metal" && v.model == "ORN")
        .expect("new variant in refreshed catalog");
    assert!(!added.code.is_empty());

    // And the new variant resolves like any other.
    let code = added.code.clone();
    assert_eq!(session.enter_code(&code), CodeOutcome::Resolved);
    assert_eq!(session.selection().maker, "Daido Metal");
    Ok(())
}

#[test]
fn rejected_submission_keeps_the_selection() -> Result<()> {
    let server = spawn_server_with(&["--reject-submits"])?;
    let mut session = session_for(&server.base_url)?;
    session.refresh_catalog()?;

    session.set_new_mode(true);
    session.set_maker_text("Daido Metal");
    session.set_model_text("ORN");
    session.set_dia_text("2.5");
    session.set_location(Location::SiteStock);
    session.set_quantity("5");

    let err = session.submit().unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Remote(RemoteError::Service(_))
    ));

    // Nothing was reset; the user can retry without re-entering anything.
    assert_eq!(session.selection().maker, "Daido Metal");
    assert_eq!(session.selection().quantity, "5");
    assert!(!session.is_sending());
    Ok(())
}

#[test]
fn dead_endpoint_is_a_transport_error_and_keeps_state() -> Result<()> {
    let server = spawn_server()?;
    let mut session = session_for(&server.base_url)?;
    let count = session.refresh_catalog()?;
    drop(server);

    // Refresh failure keeps the last-known snapshot.
    let err = session.refresh_catalog().unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)));
    assert_eq!(session.catalog().len(), count);

    let code = session.catalog().variants()[0].code.clone();
    session.enter_code(&code);
    session.set_location(Location::SiteStock);
    session.set_quantity("1");

    let err = session.submit().unwrap_err();
    assert!(matches!(err, SubmitError::Remote(RemoteError::Transport(_))));
    assert_eq!(session.selection().code, code);
    assert!(!session.is_sending());
    Ok(())
}

#[test]
fn unconfigured_endpoint_is_its_own_error_kind() {
    let mut session = Session::new(None);
    let err = session.refresh_catalog().unwrap_err();
    assert!(matches!(err, RemoteError::Unconfigured));
}

#[test]
fn validation_runs_before_any_transport() {
    // No endpoint at all: an invalid selection still fails with a
    // validation kind, never an unconfigured-endpoint one.
    let mut session = Session::new(None);
    let err = session.submit().unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Invalid(ValidationError::MissingLocation)
    ));
}
