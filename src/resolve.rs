//! Reconciliation between the code box and the (maker, model, diameter)
//! triple. Each direction reacts only to its own trigger and the two are
//! never chained within one call, so an edit cannot ping-pong between them.
//! Every function here is idempotent: re-applying it with no intervening
//! change is a no-op.

use crate::catalog::{Catalog, TripleMatch};
use crate::model::Selection;

/// Outcome of a code edit, so callers know whether to clear a pending error
/// message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeOutcome {
    Resolved,
    NoMatch,
}

/// Code to fields. A hit overwrites the triple and leaves new-entry mode; a
/// miss changes nothing, since the user may be typing a code that does not
/// exist yet. Absence of a match is not an error before submit time.
pub fn enter_code(catalog: &Catalog, sel: &mut Selection, input: &str) -> CodeOutcome {
    sel.code = input.to_string();
    let Some(v) = catalog.find_by_code(input) else {
        return CodeOutcome::NoMatch;
    };
    sel.maker = v.maker.clone();
    sel.model = v.model.clone();
    sel.dia = format_dia(v.dia);
    sel.new_mode = false;
    CodeOutcome::Resolved
}

/// Fields to code. Suspended in new-entry mode. With all three fields filled
/// and the diameter well-formed, a unique triple match overwrites the code;
/// zero or several matches leave it alone (ambiguity withholds auto-fill, it
/// is not an error).
pub fn sync_code(catalog: &Catalog, sel: &mut Selection) {
    if sel.new_mode {
        return;
    }
    if sel.maker.is_empty() || sel.model.is_empty() {
        return;
    }
    let Ok(dia) = sel.dia.trim().parse::<f64>() else {
        return;
    };
    if !dia.is_finite() {
        return;
    }
    if let TripleMatch::Unique(v) = catalog.match_triple(&sel.maker, &sel.model, dia) {
        sel.code = v.code.clone();
    }
}

/// Picking a maker invalidates everything downstream of it.
pub fn pick_maker(catalog: &Catalog, sel: &mut Selection, maker: &str) {
    if sel.maker == maker {
        return;
    }
    sel.maker = maker.to_string();
    sel.model.clear();
    sel.dia.clear();
    sel.code.clear();
    sync_code(catalog, sel);
}

pub fn pick_model(catalog: &Catalog, sel: &mut Selection, model: &str) {
    if sel.model == model {
        return;
    }
    sel.model = model.to_string();
    sel.dia.clear();
    sel.code.clear();
    sync_code(catalog, sel);
}

pub fn pick_dia(catalog: &Catalog, sel: &mut Selection, dia: &str) {
    if sel.dia == dia {
        return;
    }
    sel.dia = dia.to_string();
    sel.code.clear();
    sync_code(catalog, sel);
}

/// Entering new-entry mode keeps the current values (a near-match is a
/// useful starting point) and suspends fields-to-code until toggled off.
/// Leaving does not retroactively re-run resolution.
pub fn set_new_mode(sel: &mut Selection, on: bool) {
    sel.new_mode = on;
}

pub fn format_dia(dia: f64) -> String {
    format!("{}", dia)
}
