//! Request-scoped session state.
//!
//! A [`Session`] lives for exactly one interaction cycle. It starts empty and is
//! filled by [`rehydrate`](crate::rehydrate) or by an explicit login. Every field
//! can be in one of three states: absent, present with a null value, or present
//! with a concrete value.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

mod field;
mod id;

pub use field::{Field, Value};
pub use id::CycleId;

use crate::api::ResourceId;
use crate::auth::AuthHeaders;

/// Field-value pairs held by a session.
pub type SessionMap = BTreeMap<Field, Value>;

/// Handle to the session of the current interaction cycle.
///
/// Cloning the handle is cheap; all clones observe the same fields.
#[derive(Clone, Debug, Default)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Creates a new `Session` instance.
    pub fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Returns the id of the cycle this session belongs to.
    pub fn id(&self) -> CycleId {
        self.inner.id
    }

    /// Returns the value stored for `field`, or `None` if the field is absent.
    pub fn get(&self, field: Field) -> Option<Value> {
        self.inner.fields.read().get(&field).cloned()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.inner.fields.read().contains_key(&field)
    }

    /// Sets `field` to `value`, replacing any previous value.
    pub fn insert(&self, field: Field, value: impl Into<Value>) {
        self.inner.fields.write().insert(field, value.into());
        self.changed();
    }

    /// Removes `field`, returning its previous value.
    pub fn remove(&self, field: Field) -> Option<Value> {
        let removed = self.inner.fields.write().remove(&field);
        if removed.is_some() {
            self.changed();
        }
        removed
    }

    /// Removes all six fields.
    pub fn clear(&self) {
        let mut fields = self.inner.fields.write();
        if !fields.is_empty() {
            fields.clear();
            self.changed();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.fields.read().is_empty()
    }

    /// Returns a copy of every field currently present.
    pub fn snapshot(&self) -> SessionMap {
        self.inner.fields.read().clone()
    }

    /// `true` only when `logged_in` is present and set.
    pub fn logged_in(&self) -> bool {
        self.get(Field::LoggedIn)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Returns the access token, treating an empty string as no token.
    pub fn access_token(&self) -> Option<String> {
        self.text(Field::AccessToken).filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.text(Field::RefreshToken)
    }

    pub fn store_id(&self) -> Option<ResourceId> {
        self.get(Field::StoreId).and_then(|v| v.as_id().cloned())
    }

    pub fn store_name(&self) -> Option<String> {
        self.text(Field::StoreName)
    }

    pub fn headers(&self) -> Option<AuthHeaders> {
        self.get(Field::Headers)
            .and_then(|v| v.as_headers().cloned())
    }

    pub fn set_logged_in(&self, logged_in: bool) {
        self.insert(Field::LoggedIn, logged_in);
    }

    pub fn set_tokens(&self, access_token: Option<String>, refresh_token: Option<String>) {
        let mut fields = self.inner.fields.write();
        fields.insert(Field::AccessToken, access_token.into());
        fields.insert(Field::RefreshToken, refresh_token.into());
        drop(fields);
        self.changed();
    }

    pub fn set_store(&self, store_id: Option<ResourceId>, store_name: Option<String>) {
        let mut fields = self.inner.fields.write();
        fields.insert(Field::StoreId, store_id.into());
        fields.insert(Field::StoreName, store_name.into());
        drop(fields);
        self.changed();
    }

    pub fn set_headers(&self, headers: AuthHeaders) {
        self.insert(Field::Headers, Some(headers));
    }

    /// Whether the session was mutated since it was last persisted.
    pub fn is_changed(&self) -> bool {
        self.inner.changed.load(Ordering::Relaxed)
    }

    pub(crate) fn persisted(&self) {
        self.inner.changed.store(false, Ordering::Relaxed);
    }

    pub(crate) fn with_fields_mut<R>(&self, f: impl FnOnce(&mut SessionMap) -> R) -> R {
        let mut fields = self.inner.fields.write();
        f(&mut fields)
    }

    fn text(&self, field: Field) -> Option<String> {
        self.get(field).and_then(|v| v.as_text().map(str::to_owned))
    }

    fn changed(&self) {
        self.inner.changed.store(true, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
pub struct Inner {
    pub id: CycleId,
    fields: RwLock<SessionMap>,
    // set when a field is inserted or removed, cleared by persist
    changed: AtomicBool,
}

impl Inner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: CycleId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}
