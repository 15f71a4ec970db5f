use serde_json::Value;
use sess_query::{Condition, FieldPath};
use sess_types::{Scope, Session, SessionId};

/// Primary key of a stored session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentKey {
    pub scope: Scope,
    pub id: SessionId,
}

impl DocumentKey {
    pub fn new(scope: Scope, id: SessionId) -> Self {
        Self { scope, id }
    }

    pub fn of(session: &Session) -> Self {
        Self::new(session.scope(), session.id)
    }
}

/// Structured store filter.
///
/// A filter always names a scope; optionally an id; and any number of
/// equality conditions on screened field paths, all of which must hold.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    scope: Scope,
    id: Option<SessionId>,
    conditions: Vec<Condition>,
}

impl Filter {
    /// Everything in `scope`.
    pub fn scoped(scope: Scope) -> Self {
        Self {
            scope,
            id: None,
            conditions: Vec::new(),
        }
    }

    /// The single document at `key`.
    pub fn by_key(key: DocumentKey) -> Self {
        Self::scoped(key.scope).with_id(key.id)
    }

    pub fn with_id(mut self, id: SessionId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_field(self, path: FieldPath, value: Value) -> Self {
        self.with_condition(Condition::new(path, value))
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_conditions(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn id(&self) -> Option<&SessionId> {
        self.id.as_ref()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The primary key this filter pins, if it names an id.
    pub fn key(&self) -> Option<DocumentKey> {
        self.id.map(|id| DocumentKey::new(self.scope.clone(), id))
    }

    /// Returns `true` if `session` satisfies every part of the filter.
    pub fn matches(&self, session: &Session) -> bool {
        if !session.in_scope(&self.scope) {
            return false;
        }
        if self.id.is_some_and(|id| id != session.id) {
            return false;
        }
        if self.conditions.is_empty() {
            return true;
        }
        let doc = session.to_document();
        self.conditions.iter().all(|c| condition_holds(&doc, c))
    }
}

/// A condition holds if any value reached by its path equals the literal,
/// or is an array containing it. Arrays met mid-path are searched element
/// by element; numeric segments also index into them.
fn condition_holds(doc: &Value, condition: &Condition) -> bool {
    let segments: Vec<&str> = condition.path.segments().collect();
    let mut reached = Vec::new();
    collect(doc, &segments, &mut reached);
    reached.into_iter().any(|v| {
        v == &condition.value
            || matches!(v, Value::Array(items) if items.contains(&condition.value))
    })
}

fn collect<'a>(value: &'a Value, segments: &[&str], out: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        out.push(value);
        return;
    };
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(*head) {
                collect(child, rest, out);
            }
        }
        Value::Array(items) => {
            if let Some(child) = head.parse::<usize>().ok().and_then(|i| items.get(i)) {
                collect(child, rest, out);
            }
            for item in items.iter().filter(|item| item.is_object()) {
                collect(item, segments, out);
            }
        }
        _ => {}
    }
}
