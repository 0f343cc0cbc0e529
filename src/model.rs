use serde::{Deserialize, Serialize};

/// One row of the master catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(deserialize_with = "code_string")]
    pub code: String,
    pub maker: String,
    pub model: String,
    pub dia: f64,
}

// Spreadsheet columns serialize codes as numbers or strings depending on the
// cell format; accept both and keep the string form.
fn code_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(de)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    SiteStock,
    WarehouseStock,
}

impl Location {
    pub const ALL: [Location; 2] = [Location::SiteStock, Location::WarehouseStock];

    pub fn as_str(self) -> &'static str {
        match self {
            Location::SiteStock => "site_stock",
            Location::WarehouseStock => "warehouse_stock",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Location::SiteStock => "site stock",
            Location::WarehouseStock => "warehouse stock",
        }
    }

    pub fn parse(s: &str) -> Option<Location> {
        match s.trim() {
            "site_stock" | "site" => Some(Location::SiteStock),
            "warehouse_stock" | "warehouse" => Some(Location::WarehouseStock),
            _ => None,
        }
    }
}

/// Current form state. Values are kept exactly as entered; numeric coercion
/// happens at validation and submit time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub code: String,
    pub maker: String,
    pub model: String,
    pub dia: String,
    pub new_mode: bool,
    pub location: Option<Location>,
    pub quantity: String,
    pub piece_count: String,
    pub note: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub endpoint: Option<EndpointConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
}
