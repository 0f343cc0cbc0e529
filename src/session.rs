//! Owner of the catalog snapshot and the live selection, plus the refresh
//! and submit flows around them. UI layers hold a `Session` and stay free of
//! transport and ordering concerns, which also lets integration tests drive
//! the full entry flow headlessly.

use crate::catalog::Catalog;
use crate::model::{Location, Selection};
use crate::remote::{EndpointClient, RemoteError, SubmissionRecord};
use crate::resolve::{self, CodeOutcome};
use crate::validate::{self, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("a submission is already in flight")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

pub struct Session {
    client: Option<EndpointClient>,
    catalog: Catalog,
    selection: Selection,
    sending: bool,
}

impl Session {
    pub fn new(client: Option<EndpointClient>) -> Self {
        Self {
            client,
            catalog: Catalog::default(),
            selection: Selection::default(),
            sending: false,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn has_endpoint(&self) -> bool {
        self.client.is_some()
    }

    /// True while a submission is in flight; backs the disabled submit
    /// affordance.
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    fn client(&self) -> Result<&EndpointClient, RemoteError> {
        self.client.as_ref().ok_or(RemoteError::Unconfigured)
    }

    /// Replace the catalog snapshot from the service. On failure the
    /// previous snapshot stays in place.
    pub fn refresh_catalog(&mut self) -> Result<usize, RemoteError> {
        let variants = self.client()?.fetch_master()?;
        self.catalog.replace(variants);
        Ok(self.catalog.len())
    }

    // Edits. Each runs at most its own resolution direction.

    pub fn enter_code(&mut self, input: &str) -> CodeOutcome {
        resolve::enter_code(&self.catalog, &mut self.selection, input)
    }

    pub fn pick_maker(&mut self, maker: &str) {
        resolve::pick_maker(&self.catalog, &mut self.selection, maker);
    }

    pub fn pick_model(&mut self, model: &str) {
        resolve::pick_model(&self.catalog, &mut self.selection, model);
    }

    pub fn pick_dia(&mut self, dia: &str) {
        resolve::pick_dia(&self.catalog, &mut self.selection, dia);
    }

    pub fn set_new_mode(&mut self, on: bool) {
        resolve::set_new_mode(&mut self.selection, on);
    }

    /// One fields-to-code pass, for callers that filled the triple without
    /// going through the pickers (the scripted CLI path).
    pub fn sync_code(&mut self) {
        resolve::sync_code(&self.catalog, &mut self.selection);
    }

    // Free-text edits. Used in new-entry mode for the triple; nothing is
    // derived from these.

    pub fn set_maker_text(&mut self, maker: &str) {
        self.selection.maker = maker.to_string();
    }

    pub fn set_model_text(&mut self, model: &str) {
        self.selection.model = model.to_string();
    }

    pub fn set_dia_text(&mut self, dia: &str) {
        self.selection.dia = dia.to_string();
    }

    pub fn set_location(&mut self, location: Location) {
        self.selection.location = Some(location);
    }

    pub fn set_quantity(&mut self, quantity: &str) {
        self.selection.quantity = quantity.to_string();
    }

    pub fn set_piece_count(&mut self, piece_count: &str) {
        self.selection.piece_count = piece_count.to_string();
    }

    pub fn set_note(&mut self, note: &str) {
        self.selection.note = note.to_string();
    }

    /// Validate, send, refresh, reset. The sending flag guards against
    /// re-entry and is cleared on every path out. On transport or service
    /// failure the selection is left untouched so the user can retry without
    /// re-entering anything.
    pub fn submit(&mut self) -> Result<(), SubmitError> {
        if self.sending {
            return Err(SubmitError::Busy);
        }
        if let Some(err) = validate::validate(&self.selection) {
            return Err(err.into());
        }
        let record = SubmissionRecord::from_selection(&self.selection);

        self.sending = true;
        let result = self.submit_inner(&record);
        self.sending = false;
        result
    }

    fn submit_inner(&mut self, record: &SubmissionRecord) -> Result<(), SubmitError> {
        self.client()?.submit(record)?;
        // The submission may have added a variant server-side; the form is
        // cleared only once the refreshed catalog is in.
        self.refresh_catalog()?;
        self.selection = Selection::default();
        Ok(())
    }
}
