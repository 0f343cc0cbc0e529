//! Candidate sets for the cascading maker / model / diameter pickers. Pure
//! functions over the current catalog snapshot.

use crate::catalog::{Catalog, dia_eq};

/// Distinct non-empty makers, ordered case-insensitively (byte order breaks
/// ties).
pub fn maker_options(catalog: &Catalog) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in catalog.variants() {
        if v.maker.is_empty() {
            continue;
        }
        if !out.iter().any(|m| m == &v.maker) {
            out.push(v.maker.clone());
        }
    }
    out.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    out
}

/// Distinct models for the maker, in catalog order. Empty until a maker is
/// chosen.
pub fn model_options(catalog: &Catalog, maker: &str) -> Vec<String> {
    if maker.is_empty() {
        return Vec::new();
    }
    let mut out: Vec<String> = Vec::new();
    for v in catalog.variants() {
        if v.maker != maker || v.model.is_empty() {
            continue;
        }
        if !out.iter().any(|m| m == &v.model) {
            out.push(v.model.clone());
        }
    }
    out
}

/// Distinct diameters for the (maker, model) pair, ascending. Values within
/// tolerance of one another collapse to a single option.
pub fn dia_options(catalog: &Catalog, maker: &str, model: &str) -> Vec<f64> {
    if maker.is_empty() || model.is_empty() {
        return Vec::new();
    }
    let mut out: Vec<f64> = Vec::new();
    for v in catalog.variants() {
        if v.maker != maker || v.model != model || !v.dia.is_finite() {
            continue;
        }
        if !out.iter().any(|d| dia_eq(*d, v.dia)) {
            out.push(v.dia);
        }
    }
    out.sort_by(|a, b| a.total_cmp(b));
    out
}
