use std::fmt;

use crate::api::ResourceId;
use crate::auth::AuthHeaders;

/// The six keys shared by the session record and the cache record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    LoggedIn,
    AccessToken,
    RefreshToken,
    StoreId,
    StoreName,
    Headers,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::LoggedIn,
        Field::AccessToken,
        Field::RefreshToken,
        Field::StoreId,
        Field::StoreName,
        Field::Headers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::LoggedIn => "logged_in",
            Field::AccessToken => "access_token",
            Field::RefreshToken => "refresh_token",
            Field::StoreId => "store_id",
            Field::StoreName => "store_name",
            Field::Headers => "headers",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field value. `Null` is the empty default of every optional field.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Text(String),
    Id(ResourceId),
    Headers(AuthHeaders),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<&ResourceId> {
        match self {
            Value::Id(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_headers(&self) -> Option<&AuthHeaders> {
        match self {
            Value::Headers(headers) => Some(headers),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map_or(Value::Null, Value::Text)
    }
}

impl From<Option<ResourceId>> for Value {
    fn from(value: Option<ResourceId>) -> Self {
        value.map_or(Value::Null, Value::Id)
    }
}

impl From<Option<AuthHeaders>> for Value {
    fn from(value: Option<AuthHeaders>) -> Self {
        value.map_or(Value::Null, Value::Headers)
    }
}
