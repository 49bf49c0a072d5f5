// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::{
    index_map::{EntityId, IndexMap},
    metadata::ModelMetadata,
};
use anyhow::Error;
use engine::{error::ErrorKind as EngineError, Recommender};
use handler::{Frame, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct UserItemRow {
    pub user_id: EntityId,
    pub item_id: EntityId,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemItemRow {
    pub item_id: EntityId,
    pub similar_item_id: EntityId,
    pub score: f32,
}

fn resolve(map: &IndexMap, ids: Option<&[EntityId]>, column: &str) -> Result<Vec<usize>, Error> {
    match ids {
        Some(ids) => map.idxs(ids, column),
        None => Ok((0..map.len()).collect()),
    }
}

fn id_of(map: &IndexMap, idx: usize) -> Result<EntityId, Error> {
    map.id(idx)
        .cloned()
        .ok_or_else(|| EngineError::IndexOutOfBound.into())
}

/// Best `n` items for every requested user, users in the order given (all
/// trained users when `None`), items best first.
pub fn user_item_recommendations<R: Recommender>(
    model: &R,
    meta: &ModelMetadata,
    n: usize,
    user_ids: Option<&[EntityId]>,
    item_ids: Option<&[EntityId]>,
) -> Result<Vec<UserItemRow>, Error> {
    let users = &meta.idx_to_user_id_map;
    let items = &meta.idx_to_item_id_map;

    let user_idxs = resolve(users, user_ids, &meta.user_id)?;
    let item_idxs = resolve(items, item_ids, &meta.item_id)?;

    log::debug!(
        "Ranking {} items for {} users",
        item_idxs.len(),
        user_idxs.len()
    );

    let mut rows = Vec::with_capacity(user_idxs.len() * n.min(item_idxs.len()));
    for user_idx in user_idxs {
        let user_id = id_of(users, user_idx)?;

        for scored in model.recommend(user_idx, &item_idxs, n)? {
            rows.push(UserItemRow {
                user_id: user_id.clone(),
                item_id: id_of(items, scored.idx())?,
                score: scored.score(),
            });
        }
    }

    Ok(rows)
}

/// The `n` most similar trained items for every requested item.
pub fn item_item_recommendations<R: Recommender>(
    model: &R,
    meta: &ModelMetadata,
    n: usize,
    item_ids: Option<&[EntityId]>,
) -> Result<Vec<ItemItemRow>, Error> {
    let items = &meta.idx_to_item_id_map;
    let item_idxs = resolve(items, item_ids, &meta.item_id)?;

    let mut rows = Vec::new();
    for item_idx in item_idxs {
        let item_id = id_of(items, item_idx)?;

        for scored in model.similar_items(item_idx, n)? {
            rows.push(ItemItemRow {
                item_id: item_id.clone(),
                similar_item_id: id_of(items, scored.idx())?,
                score: scored.score(),
            });
        }
    }

    Ok(rows)
}

pub fn user_item_frame(meta: &ModelMetadata, rows: &[UserItemRow]) -> Result<Frame, Error> {
    let mut df = Frame::with_columns(vec![meta.user_id.as_str(), meta.item_id.as_str(), "score"]);
    for row in rows {
        df.push_row(vec![
            Value::from(&row.user_id),
            Value::from(&row.item_id),
            Value::from(f64::from(row.score)),
        ])?;
    }

    Ok(df)
}

pub fn item_item_frame(meta: &ModelMetadata, rows: &[ItemItemRow]) -> Result<Frame, Error> {
    let similar = meta.similar_item_column();

    let mut df = Frame::with_columns(vec![meta.item_id.as_str(), similar.as_str(), "score"]);
    for row in rows {
        df.push_row(vec![
            Value::from(&row.item_id),
            Value::from(&row.similar_item_id),
            Value::from(f64::from(row.score)),
        ])?;
    }

    Ok(df)
}
