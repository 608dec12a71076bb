//! Two-way synchronization between a [`Session`] and a [`CacheStore`].

use crate::session::{Field, Session, Value};
use crate::store::{CacheRecord, CacheStore};

/// Fills the session from the cache (cache → session).
///
/// A field is copied when the session does not have it or holds a null value.
/// The cache value is copied even when it is itself the empty default, so after
/// this call the session has all six fields. Values already present in the
/// session are never overwritten, which makes the call idempotent.
#[tracing::instrument(name = "rehydrating session from cache", skip_all, fields(cycle = %session.id()))]
pub fn rehydrate<C: CacheStore>(session: &Session, cache: &C) {
    cache.with_record(|record| fill_from(session, record));
}

/// Writes the session into the cache (session → cache).
///
/// Every field present in the session overwrites the cache field
/// unconditionally. Absent fields leave the cache untouched.
#[tracing::instrument(name = "persisting session to cache", skip_all, fields(cycle = %session.id()))]
pub fn persist<C: CacheStore>(session: &Session, cache: &C) {
    let fields = session.snapshot();
    cache.with_record(|record| {
        for (field, value) in fields {
            record.assign(field, value);
        }
    });
    session.persisted();
}

/// Rehydrates only when the cache holds an access token.
///
/// The cached token replaces whatever token the session holds, including an
/// empty one; every other field is filled as in [`rehydrate`]. Returns `true`
/// when the session was filled. The check and the copy happen under the same
/// lock.
pub(crate) fn recover_credentials<C: CacheStore>(session: &Session, cache: &C) -> bool {
    cache.with_record(|record| {
        let Some(token) = record.access_token.clone().filter(|t| !t.is_empty()) else {
            return false;
        };
        session.insert(Field::AccessToken, Value::Text(token));
        fill_from(session, record);
        true
    })
}

fn fill_from(session: &Session, record: &CacheRecord) {
    let filled = session.with_fields_mut(|fields| {
        let mut filled = 0;
        for field in Field::ALL {
            let missing = fields.get(&field).is_none_or(|v| v.is_null());
            if missing {
                fields.insert(field, record.value(field));
                filled += 1;
            }
        }
        filled
    });
    tracing::debug!(filled, "filled session fields from cache");
}
