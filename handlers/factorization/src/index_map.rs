// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::error::ErrorKind;
use anyhow::Error;
use handler::{Frame, Value};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    convert::TryFrom,
    fmt::{self, Display},
};

/// Raw user or item identifier as found in the input data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Str(String),
}

impl TryFrom<&Value> for EntityId {
    type Error = ErrorKind;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int64(v) => Ok(EntityId::Int(*v)),
            Value::String(v) => Ok(EntityId::Str(v.clone())),
            Value::Null => Err(ErrorKind::InvalidId("null".into())),
            other => Err(ErrorKind::InvalidId(other.to_string())),
        }
    }
}

impl From<&EntityId> for Value {
    fn from(id: &EntityId) -> Self {
        match id {
            EntityId::Int(v) => Value::Int64(*v),
            EntityId::Str(v) => Value::String(v.clone()),
        }
    }
}

impl From<i64> for EntityId {
    fn from(v: i64) -> Self {
        EntityId::Int(v)
    }
}

impl From<&str> for EntityId {
    fn from(v: &str) -> Self {
        EntityId::Str(v.into())
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(v) => write!(f, "{}", v),
            EntityId::Str(v) => write!(f, "{}", v),
        }
    }
}

/// Ids of `column`, in the order they appear.
pub fn column_ids(df: &Frame, column: &str) -> Result<Vec<EntityId>, Error> {
    df.column(column)?
        .iter()
        .map(|value| EntityId::try_from(value).map_err(Into::into))
        .collect()
}

/// Distinct ids of `column`, in the order they first appear.
pub fn unique_ids(df: &Frame, column: &str) -> Result<Vec<EntityId>, Error> {
    Ok(IndexMap::from_ids(column_ids(df, column)?).into())
}

/// Bijection between raw ids and the dense indices `0..len`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<EntityId>", into = "Vec<EntityId>")]
pub struct IndexMap {
    ids: Vec<EntityId>,
    positions: HashMap<EntityId, usize>,
}

impl IndexMap {
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = EntityId>,
    {
        let mut map = Self::default();
        for id in ids {
            if !map.positions.contains_key(&id) {
                map.positions.insert(id.clone(), map.ids.len());
                map.ids.push(id);
            }
        }

        map
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn idx(&self, id: &EntityId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn id(&self, idx: usize) -> Option<&EntityId> {
        self.ids.get(idx)
    }

    /// Indices of `ids`, fails on the first id that was never seen.
    pub fn idxs(&self, ids: &[EntityId], column: &str) -> Result<Vec<usize>, Error> {
        ids.iter()
            .map(|id| {
                self.idx(id)
                    .ok_or_else(|| ErrorKind::UnknownId(column.into(), id.to_string()).into())
            })
            .collect()
    }
}

impl From<Vec<EntityId>> for IndexMap {
    fn from(ids: Vec<EntityId>) -> Self {
        Self::from_ids(ids)
    }
}

impl From<IndexMap> for Vec<EntityId> {
    fn from(map: IndexMap) -> Self {
        map.ids
    }
}
