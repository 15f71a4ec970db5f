use std::sync::Arc;

use serde_json::Value;
use sess_crypto::SessionIdGenerator;
use sess_query::{parse_filter, screen_filter, validate_path, Condition};
use sess_store::{DocumentKey, DocumentStore, Filter, InMemoryDocumentStore, InsertOutcome};
use sess_types::{Scope, Session, SessionData, SessionId};
use tracing::debug;

use crate::error::{SessionError, SessionResult};
use crate::payload::parse_payload;

/// Location label for the path of a single-field query.
const FIELD_LOCATION: &str = "<field>";

/// Scoped session repository.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn DocumentStore>,
    ids: SessionIdGenerator,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            ids: SessionIdGenerator::new(),
        }
    }

    /// A repository over a fresh [`InMemoryDocumentStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDocumentStore::new()))
    }

    // ---- Writes ----

    /// Create a session from a raw request body, or return the existing one
    /// with identical content.
    pub fn create(&self, scope: &Scope, body: Option<&str>) -> SessionResult<Session> {
        let data = parse_payload(body)?;
        self.create_data(scope, data)
    }

    /// Create a session from parsed data, or return the existing one.
    ///
    /// The id is derived from `(source, type, data)` before the store is
    /// touched; the store's insert-if-absent makes concurrent identical
    /// creates converge on one document.
    pub fn create_data(&self, scope: &Scope, data: SessionData) -> SessionResult<Session> {
        let id = self.ids.generate(scope, &data);
        let session = Session::new(id, scope.clone(), data);
        match self.store.insert_if_absent(&session)? {
            InsertOutcome::Inserted => {
                debug!(%scope, id = %id.short_hex(), "session created");
                Ok(session)
            }
            InsertOutcome::Existing(existing) => {
                debug!(%scope, id = %id.short_hex(), "session already present");
                Ok(existing)
            }
        }
    }

    /// Replace the data of an existing session, keeping its id.
    ///
    /// The payload is validated before the id is looked up, so a malformed
    /// body never reaches the store.
    pub fn replace(&self, scope: &Scope, id: &str, body: Option<&str>) -> SessionResult<Session> {
        let data = parse_payload(body)?;
        self.replace_data(scope, id, data)
    }

    /// Replace with already-parsed data.
    pub fn replace_data(
        &self,
        scope: &Scope,
        id: &str,
        data: SessionData,
    ) -> SessionResult<Session> {
        let key = resolve_key(scope, id)?;
        let updated = self
            .store
            .replace_one(&Filter::by_key(key), data)?
            .ok_or_else(|| SessionError::not_found(scope, id))?;
        debug!(%scope, id = %updated.id.short_hex(), "session replaced");
        Ok(updated)
    }

    /// Delete a session.
    pub fn delete(&self, scope: &Scope, id: &str) -> SessionResult<()> {
        let key = resolve_key(scope, id)?;
        if !self.store.delete_one(&Filter::by_key(key))? {
            return Err(SessionError::not_found(scope, id));
        }
        debug!(%scope, id, "session deleted");
        Ok(())
    }

    // ---- Reads ----

    /// Every session in `scope`, in insertion order.
    pub fn list_all(&self, scope: &Scope) -> SessionResult<Vec<Session>> {
        Ok(self.store.find(&Filter::scoped(scope.clone()))?)
    }

    pub fn get_by_id(&self, scope: &Scope, id: &str) -> SessionResult<Session> {
        let key = resolve_key(scope, id)?;
        self.store
            .find_one(&Filter::by_key(key))?
            .ok_or_else(|| SessionError::not_found(scope, id))
    }

    /// Sessions whose value at `field` equals the string `value`.
    pub fn get_by_field(
        &self,
        scope: &Scope,
        field: &str,
        value: &str,
    ) -> SessionResult<Vec<Session>> {
        self.get_by_field_value(scope, field, Value::String(value.to_string()))
    }

    /// Sessions whose value at `field` equals `value`.
    pub fn get_by_field_value(
        &self,
        scope: &Scope,
        field: &str,
        value: Value,
    ) -> SessionResult<Vec<Session>> {
        let path = validate_path(field).into_result(field, FIELD_LOCATION)?;
        self.run_query(scope, vec![Condition::new(path, value)])
    }

    /// Sessions matching a raw JSON filter document.
    pub fn fetch_by_query(&self, scope: &Scope, filter: &str) -> SessionResult<Vec<Session>> {
        let conditions = parse_filter(filter)?;
        self.run_query(scope, conditions)
    }

    /// Sessions matching an already-parsed filter document.
    pub fn fetch_by_filter(&self, scope: &Scope, filter: &Value) -> SessionResult<Vec<Session>> {
        let conditions = screen_filter(filter)?;
        self.run_query(scope, conditions)
    }

    fn run_query(&self, scope: &Scope, conditions: Vec<Condition>) -> SessionResult<Vec<Session>> {
        let filter = Filter::scoped(scope.clone()).with_conditions(conditions);
        let found = self.store.find(&filter)?;
        debug!(%scope, conditions = filter.conditions().len(), matched = found.len(), "session query");
        Ok(found)
    }
}

impl std::fmt::Debug for SessionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRepository").finish_non_exhaustive()
    }
}

/// Map a raw id to a store key. Text that cannot be an id cannot name a
/// stored session, so it is reported as not found.
fn resolve_key(scope: &Scope, raw: &str) -> SessionResult<DocumentKey> {
    let id: SessionId = raw
        .parse()
        .map_err(|_| SessionError::not_found(scope, raw))?;
    Ok(DocumentKey::new(scope.clone(), id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidPayload;
    use sess_query::{PathRejection, QueryError};
    use serde_json::json;

    fn scope(source: &str) -> Scope {
        Scope::parse(source, "main_session").unwrap()
    }

    const DATA: &str = r#"{"portal-session":{"title":"my portal session"}}"#;

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    #[test]
    fn create_assigns_content_id() {
        let repo = SessionRepository::in_memory();
        let session = repo.create(&scope("msk_portal"), Some(DATA)).unwrap();
        assert_eq!(session.id.to_hex().len(), SessionId::HEX_LEN);
        assert_eq!(session.data["portal-session"]["title"], "my portal session");
    }

    #[test]
    fn create_is_idempotent() {
        let repo = SessionRepository::in_memory();
        let a = repo.create(&scope("msk_portal"), Some(DATA)).unwrap();
        let b = repo.create(&scope("msk_portal"), Some(DATA)).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(repo.list_all(&scope("msk_portal")).unwrap().len(), 1);
    }

    #[test]
    fn create_empty_object() {
        let repo = SessionRepository::in_memory();
        let session = repo.create(&scope("msk_portal"), Some("{}")).unwrap();
        assert!(session.data.is_empty());
    }

    #[test]
    fn create_rejects_missing_and_malformed() {
        let repo = SessionRepository::in_memory();
        assert!(matches!(
            repo.create(&scope("msk_portal"), None),
            Err(SessionError::Invalid(InvalidPayload::Missing))
        ));
        assert!(matches!(
            repo.create(&scope("msk_portal"), Some(r#"{"portal-session":blah blah blah}"#)),
            Err(SessionError::Invalid(InvalidPayload::Malformed(_)))
        ));
        assert!(repo.list_all(&scope("msk_portal")).unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    #[test]
    fn get_by_id_is_scoped() {
        let repo = SessionRepository::in_memory();
        let created = repo.create(&scope("msk_portal"), Some(DATA)).unwrap();
        let id = created.id.to_hex();

        assert_eq!(repo.get_by_id(&scope("msk_portal"), &id).unwrap(), created);
        assert!(matches!(
            repo.get_by_id(&scope("other_portal"), &id),
            Err(SessionError::NotFound { .. })
        ));
    }

    #[test]
    fn unparseable_id_is_not_found() {
        let repo = SessionRepository::in_memory();
        assert!(matches!(
            repo.get_by_id(&scope("msk_portal"), "id"),
            Err(SessionError::NotFound { .. })
        ));
    }

    #[test]
    fn uppercase_id_is_not_found() {
        let repo = SessionRepository::in_memory();
        let created = repo.create(&scope("msk_portal"), Some(DATA)).unwrap();
        let upper = created.id.to_hex().to_uppercase();

        assert!(matches!(
            repo.get_by_id(&scope("msk_portal"), &upper),
            Err(SessionError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete(&scope("msk_portal"), &upper),
            Err(SessionError::NotFound { .. })
        ));
        assert_eq!(repo.list_all(&scope("msk_portal")).unwrap(), vec![created]);
    }

    #[test]
    fn field_query_matches() {
        let repo = SessionRepository::in_memory();
        let created = repo.create(&scope("msk_portal"), Some(DATA)).unwrap();
        repo.create(&scope("msk_portal"), Some(r#"{"portal-session":{"title":"other"}}"#))
            .unwrap();

        let found = repo
            .get_by_field(&scope("msk_portal"), "data.portal-session.title", "my portal session")
            .unwrap();
        assert_eq!(found, vec![created]);
    }

    #[test]
    fn field_query_with_no_match_is_empty() {
        let repo = SessionRepository::in_memory();
        repo.create(&scope("msk_portal"), Some(DATA)).unwrap();
        assert!(repo
            .get_by_field(&scope("msk_portal"), "data.portal-session.title", "nope")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn field_query_rejects_bad_paths() {
        let repo = SessionRepository::in_memory();
        let err = repo
            .get_by_field(&scope("msk_portal"), "data.p\0ortal-session.title", "x")
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::QueryInvalid(QueryError::InvalidPath {
                reason: PathRejection::NulCharacter { .. },
                ..
            })
        ));
        let err = repo
            .get_by_field(&scope("msk_portal"), "$data.portal-session.title", "x")
            .unwrap_err();
        assert_eq!(err.kind(), "SessionQueryInvalid");
    }

    #[test]
    fn field_query_with_non_string_value() {
        let repo = SessionRepository::in_memory();
        let created = repo
            .create(&scope("msk_portal"), Some(r#"{"count": 3}"#))
            .unwrap();
        let found = repo
            .get_by_field_value(&scope("msk_portal"), "data.count", json!(3))
            .unwrap();
        assert_eq!(found, vec![created]);
    }

    #[test]
    fn fetch_query_matches_and_screens() {
        let repo = SessionRepository::in_memory();
        let created = repo.create(&scope("msk_portal"), Some(DATA)).unwrap();

        let found = repo
            .fetch_by_query(
                &scope("msk_portal"),
                r#"{"data.portal-session.title":"my portal session"}"#,
            )
            .unwrap();
        assert_eq!(found, vec![created]);

        let err = repo
            .fetch_by_query(
                &scope("msk_portal"),
                r#"{"data.portal-session":{"title":{"$ne":"x"}}}"#,
            )
            .unwrap_err();
        assert_eq!(err.kind(), "SessionQueryInvalid");

        let err = repo.fetch_by_filter(&scope("msk_portal"), &json!([1])).unwrap_err();
        assert!(matches!(
            err,
            SessionError::QueryInvalid(QueryError::NotAnObject("array"))
        ));
    }

    #[test]
    fn fetch_matches_sub_documents_with_literal_keys() {
        let repo = SessionRepository::in_memory();
        let empty_key = repo.create(&scope("msk_portal"), Some(r#"{"p":{"":1}}"#)).unwrap();
        let dotted_key = repo.create(&scope("msk_portal"), Some(r#"{"q":{"v1.":1}}"#)).unwrap();

        let found = repo
            .fetch_by_query(&scope("msk_portal"), r#"{"data.p":{"":1}}"#)
            .unwrap();
        assert_eq!(found, vec![empty_key]);
        let found = repo
            .fetch_by_query(&scope("msk_portal"), r#"{"data.q":{"v1.":1}}"#)
            .unwrap();
        assert_eq!(found, vec![dotted_key]);
    }

    #[test]
    fn queries_never_leave_scope() {
        let repo = SessionRepository::in_memory();
        repo.create(&scope("other_portal"), Some(DATA)).unwrap();
        let found = repo
            .fetch_by_query(&scope("msk_portal"), r#"{"source":"other_portal"}"#)
            .unwrap();
        assert!(found.is_empty());
    }

    // -----------------------------------------------------------------------
    // Replace / Delete
    // -----------------------------------------------------------------------

    #[test]
    fn replace_keeps_id() {
        let repo = SessionRepository::in_memory();
        let created = repo.create(&scope("msk_portal"), Some(DATA)).unwrap();
        let id = created.id.to_hex();

        let updated = repo
            .replace(
                &scope("msk_portal"),
                &id,
                Some(r#"{"portal-session":"my session UPDATED information"}"#),
            )
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(
            repo.get_by_id(&scope("msk_portal"), &id).unwrap().data["portal-session"],
            "my session UPDATED information"
        );
    }

    #[test]
    fn replace_validates_payload_first() {
        let repo = SessionRepository::in_memory();
        let created = repo.create(&scope("msk_portal"), Some(DATA)).unwrap();
        let id = created.id.to_hex();

        let err = repo
            .replace(&scope("msk_portal"), &id, Some("{\"portal-session\":blah"))
            .unwrap_err();
        assert_eq!(err.kind(), "SessionInvalid");
        let err = repo.replace(&scope("msk_portal"), &id, None).unwrap_err();
        assert!(matches!(err, SessionError::Invalid(InvalidPayload::Missing)));
        assert_eq!(repo.get_by_id(&scope("msk_portal"), &id).unwrap(), created);
    }

    #[test]
    fn replace_unknown_id_is_not_found() {
        let repo = SessionRepository::in_memory();
        let err = repo
            .replace(&scope("msk_portal"), "id", Some(DATA))
            .unwrap_err();
        assert_eq!(err.kind(), "SessionNotFound");
    }

    #[test]
    fn delete_is_scoped() {
        let repo = SessionRepository::in_memory();
        let created = repo.create(&scope("msk_portal"), Some(DATA)).unwrap();
        let id = created.id.to_hex();

        assert!(matches!(
            repo.delete(&scope("other_portal"), &id),
            Err(SessionError::NotFound { .. })
        ));
        repo.delete(&scope("msk_portal"), &id).unwrap();
        assert!(matches!(
            repo.get_by_id(&scope("msk_portal"), &id),
            Err(SessionError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete(&scope("msk_portal"), &id),
            Err(SessionError::NotFound { .. })
        ));
    }

    #[test]
    fn recreate_after_delete_gets_same_id() {
        let repo = SessionRepository::in_memory();
        let first = repo.create(&scope("msk_portal"), Some(DATA)).unwrap();
        repo.delete(&scope("msk_portal"), &first.id.to_hex()).unwrap();
        let second = repo.create(&scope("msk_portal"), Some(DATA)).unwrap();
        assert_eq!(first.id, second.id);
    }
}
