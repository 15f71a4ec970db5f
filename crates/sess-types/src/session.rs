use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::SessionId;
use crate::scope::{Scope, SessionType, Source};

/// Session payload: an arbitrary JSON object, possibly empty.
pub type SessionData = Map<String, Value>;

/// A stored session document.
///
/// Serializes as exactly `{"id", "data", "source", "type"}`. Field paths in
/// queries are resolved against this shape, so `data.portal-session.title`
/// addresses a key inside the payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub data: SessionData,
    pub source: Source,
    #[serde(rename = "type")]
    pub kind: SessionType,
}

impl Session {
    pub fn new(id: SessionId, scope: Scope, data: SessionData) -> Self {
        Self {
            id,
            data,
            source: scope.source,
            kind: scope.kind,
        }
    }

    /// The `(source, type)` namespace this session lives in.
    pub fn scope(&self) -> Scope {
        Scope::new(self.source.clone(), self.kind)
    }

    /// Returns `true` if this session belongs to `scope`.
    pub fn in_scope(&self, scope: &Scope) -> bool {
        self.source == scope.source && self.kind == scope.kind
    }

    /// The session as a JSON document, the shape field paths resolve against.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::with_capacity(4);
        doc.insert("id".into(), Value::String(self.id.to_hex()));
        doc.insert("data".into(), Value::Object(self.data.clone()));
        doc.insert("source".into(), Value::String(self.source.to_string()));
        doc.insert("type".into(), Value::String(self.kind.as_str().into()));
        Value::Object(doc)
    }
}
