use crate::model::Variant;

/// Absolute tolerance for diameter equality. Diameters round-trip through
/// text and floats, so exact comparison would split identical sizes.
pub const DIA_TOLERANCE: f64 = 1e-9;

pub fn dia_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= DIA_TOLERANCE
}

/// The in-memory master catalog. Replaced wholesale on every refresh, never
/// mutated in place.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    variants: Vec<Variant>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TripleMatch<'a> {
    None,
    Unique(&'a Variant),
    Ambiguous,
}

impl Catalog {
    pub fn new(variants: Vec<Variant>) -> Self {
        Self { variants }
    }

    pub fn replace(&mut self, variants: Vec<Variant>) {
        self.variants = variants;
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Exact match on the trimmed input. Codes are unique across a snapshot.
    pub fn find_by_code(&self, code: &str) -> Option<&Variant> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        self.variants.iter().find(|v| v.code == code)
    }

    /// Look up by (maker, model, dia). Maker and model match exactly; the
    /// diameter within tolerance. Triples are not required to be unique, so
    /// the caller must handle the ambiguous case.
    pub fn match_triple(&self, maker: &str, model: &str, dia: f64) -> TripleMatch<'_> {
        let mut hit: Option<&Variant> = None;
        for v in &self.variants {
            if v.maker != maker || v.model != model || !dia_eq(v.dia, dia) {
                continue;
            }
            if hit.is_some() {
                return TripleMatch::Ambiguous;
            }
            hit = Some(v);
        }
        match hit {
            Some(v) => TripleMatch::Unique(v),
            None => TripleMatch::None,
        }
    }
}
