use crate::model::Selection;

/// Why a submission was refused. The kinds are stable; the messages are for
/// people.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("storage location is required")]
    MissingLocation,
    #[error("quantity must be a number")]
    InvalidQuantity,
    #[error("maker is required (or enter a code)")]
    MissingMaker,
    #[error("model is required (or enter a code)")]
    MissingModel,
    #[error("diameter must be a number (or enter a code)")]
    InvalidDiameter,
}

/// Ordered submission rules; the first failure wins. A non-empty code is a
/// complete identity on its own, so the triple rules are skipped.
pub fn validate(sel: &Selection) -> Option<ValidationError> {
    if sel.location.is_none() {
        return Some(ValidationError::MissingLocation);
    }
    if parse_quantity(&sel.quantity).is_none() {
        return Some(ValidationError::InvalidQuantity);
    }
    if !sel.code.trim().is_empty() {
        return None;
    }
    if sel.maker.trim().is_empty() {
        return Some(ValidationError::MissingMaker);
    }
    if sel.model.trim().is_empty() {
        return Some(ValidationError::MissingModel);
    }
    if parse_dia(&sel.dia).is_none() {
        return Some(ValidationError::InvalidDiameter);
    }
    None
}

pub fn parse_quantity(input: &str) -> Option<f64> {
    let n = input.trim().parse::<f64>().ok()?;
    n.is_finite().then_some(n)
}

pub fn parse_dia(input: &str) -> Option<f64> {
    let n = input.trim().parse::<f64>().ok()?;
    n.is_finite().then_some(n)
}

/// Half-up rounding at the hundredths place. The nudge keeps decimal inputs
/// like 12.345 from landing just below the tie after the float multiply.
pub fn round_quantity(v: f64) -> f64 {
    ((v * 100.0) + 1e-9).round() / 100.0
}

pub fn format_quantity(v: f64) -> String {
    format!("{:.2}", v)
}
