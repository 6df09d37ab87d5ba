use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::de::Error;

type InnerObjectId = bson::oid::ObjectId;

/// A document identifier, rendered as 24 lowercase hex characters.
///
/// Wraps [`bson::oid::ObjectId`] so that it (de)serializes as a plain hex
/// string instead of extended JSON (`{"$oid": ...}`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(InnerObjectId);

impl ObjectId {
    /// Generate a fresh id.
    pub fn new() -> ObjectId {
        ObjectId(InnerObjectId::new())
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId::new()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid object id: {0:?}")]
pub struct ParseError(String);

impl FromStr for ObjectId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        if s.len() != 24 {
            return Err(ParseError(s.to_string()));
        }
        InnerObjectId::parse_str(s)
            .map(ObjectId)
            .map_err(|_| ParseError(s.to_string()))
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl serde::Serialize for ObjectId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_hex().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for ObjectId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        ObjectId::from_str(&hex).map_err(D::Error::custom)
    }
}
