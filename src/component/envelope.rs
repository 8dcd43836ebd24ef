//! Component envelope and wire codec.
//!
//! One envelope is one frame on the wire:
//! `$$${"type":"<Kind>","id":"<id>","data":{...}}$$$` — compact JSON, no
//! whitespace between tokens, framed by the three-byte delimiter on both
//! sides. Bytes outside delimiter pairs are plain prose the client renders
//! as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Three-byte frame delimiter. Chosen to be distinctive and absent from
/// ordinary prose.
pub const COMPONENT_DELIMITER: &str = "$$$";

/// The closed set of component kinds understood by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    SimpleComponent,
    TableA,
    ChartComponent,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::SimpleComponent => "SimpleComponent",
            ComponentKind::TableA => "TableA",
            ComponentKind::ChartComponent => "ChartComponent",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One frame's payload: kind, stable component id, and a partial or full
/// data snapshot for that id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub id: String,
    pub data: Map<String, Value>,
}

impl Envelope {
    pub fn new(kind: ComponentKind, id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            kind,
            id: id.into(),
            data,
        }
    }

    /// Serialize to the delimited wire form.
    ///
    /// Stateless and infallible: the payload is a string-keyed JSON map by
    /// construction, which always serializes.
    pub fn encode(&self) -> String {
        let json = serde_json::to_string(self).expect("envelope is always serializable");
        format!("{COMPONENT_DELIMITER}{json}{COMPONENT_DELIMITER}")
    }
}
