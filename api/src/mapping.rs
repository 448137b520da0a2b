//! Defines the mapping record served by the `/configurations` endpoints.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

/// Opaque identifier of a mapping.
///
/// The admin server may send ids as any JSON number or as a string. The value
/// is kept exactly as received so that it serializes back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingId {
    Number(Number),
    Text(String),
}

/// Renders the id the way it appears in the write URL.
///
/// Floats with no fractional part drop the trailing `.0` (`1.0` becomes `1`),
/// integers of any size print every digit.
impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => match n.as_f64() {
                Some(x) if n.is_f64() && x == 0.0 => f.write_str("0"),
                Some(x) if n.is_f64() && x.fract() == 0.0 && x.abs() < 1e21 => {
                    write!(f, "{:.0}", x)
                }
                _ => write!(f, "{}", n),
            },
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// JSON number literals become `Number`, everything else `Text`.
impl FromStr for MappingId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match serde_json::from_str::<Number>(s) {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(s.to_string()),
        })
    }
}

impl From<i64> for MappingId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for MappingId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A single proxy mapping as returned by the admin server.
///
/// Only the fields the client acts on are typed. Everything else the server
/// sends (targets, headers, ...) is kept in `extra` and written back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    #[serde(rename = "mappingID")]
    pub mapping_id: MappingId,
    pub origin: String,
    pub active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Mapping {
    /// Creates a mapping with no extra fields.
    pub fn new(mapping_id: impl Into<MappingId>, origin: impl Into<String>, active: bool) -> Self {
        Self {
            mapping_id: mapping_id.into(),
            origin: origin.into(),
            active,
            extra: Map::new(),
        }
    }

    /// Returns an untyped field by name, if the server sent one.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}
