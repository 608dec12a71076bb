use tracing::warn;

use crate::api::ResourceId;
use crate::auth::AuthHeaders;
use crate::session::{Field, Value};

/// The long-lived record kept by a [`CacheStore`].
///
/// Unlike a session, every field is always present. Logout resets the record
/// to its defaults instead of removing it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheRecord {
    pub logged_in: bool,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub store_id: Option<ResourceId>,
    pub store_name: Option<String>,
    pub headers: Option<AuthHeaders>,
}

impl CacheRecord {
    /// Returns the value of `field` in the shape a session stores it.
    pub fn value(&self, field: Field) -> Value {
        match field {
            Field::LoggedIn => Value::Bool(self.logged_in),
            Field::AccessToken => self.access_token.clone().into(),
            Field::RefreshToken => self.refresh_token.clone().into(),
            Field::StoreId => self.store_id.clone().into(),
            Field::StoreName => self.store_name.clone().into(),
            Field::Headers => self.headers.clone().into(),
        }
    }

    /// Overwrites `field` with `value`. A null value resets the field to its
    /// default. A value of the wrong kind is ignored.
    pub fn assign(&mut self, field: Field, value: Value) {
        match (field, value) {
            (Field::LoggedIn, Value::Bool(b)) => self.logged_in = b,
            (Field::LoggedIn, Value::Null) => self.logged_in = false,
            (Field::AccessToken, Value::Text(t)) => self.access_token = Some(t),
            (Field::AccessToken, Value::Null) => self.access_token = None,
            (Field::RefreshToken, Value::Text(t)) => self.refresh_token = Some(t),
            (Field::RefreshToken, Value::Null) => self.refresh_token = None,
            (Field::StoreId, Value::Id(id)) => self.store_id = Some(id),
            (Field::StoreId, Value::Null) => self.store_id = None,
            (Field::StoreName, Value::Text(t)) => self.store_name = Some(t),
            (Field::StoreName, Value::Null) => self.store_name = None,
            (Field::Headers, Value::Headers(h)) => self.headers = Some(h),
            (Field::Headers, Value::Null) => self.headers = None,
            (field, value) => {
                warn!(%field, ?value, "ignoring value of the wrong kind for cache field");
            }
        }
    }

    /// Resets every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A process-wide store holding a single [`CacheRecord`].
///
/// Implementations create the record lazily on first access and never drop it
/// while the store is alive.
pub trait CacheStore: Send + Sync + 'static {
    /// Runs `f` with exclusive access to the record, creating it on first use.
    fn with_record<R>(&self, f: impl FnOnce(&mut CacheRecord) -> R) -> R;

    /// Returns a copy of the current record.
    fn snapshot(&self) -> CacheRecord {
        self.with_record(|record| record.clone())
    }

    /// Resets every field of the record to its default.
    fn reset(&self) {
        self.with_record(CacheRecord::reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_empty() {
        let record = CacheRecord::default();
        assert_eq!(record.value(Field::LoggedIn), Value::Bool(false));
        for field in &Field::ALL[1..] {
            assert!(record.value(*field).is_null(), "{field} not null");
        }
    }

    #[test]
    fn assign_then_read_back() {
        let mut record = CacheRecord::default();
        record.assign(Field::AccessToken, Value::Text("abc".into()));
        record.assign(Field::StoreId, Value::Id(ResourceId::Int(3)));
        record.assign(Field::LoggedIn, Value::Bool(true));

        assert_eq!(record.access_token.as_deref(), Some("abc"));
        assert_eq!(record.store_id, Some(ResourceId::Int(3)));
        assert!(record.logged_in);

        record.assign(Field::AccessToken, Value::Null);
        assert!(record.access_token.is_none());
    }

    #[test]
    fn mismatched_kind_is_ignored() {
        let mut record = CacheRecord::default();
        record.assign(Field::StoreName, Value::Text("Cafe".into()));
        record.assign(Field::StoreName, Value::Bool(true));
        assert_eq!(record.store_name.as_deref(), Some("Cafe"));
    }
}
