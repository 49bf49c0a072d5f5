// Copyright (C) 2020 Kevin Del Castillo Ramírez
//
// This file is part of engine.
//
// engine is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// engine is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with engine.  If not, see <http://www.gnu.org/licenses/>.

use crate::error::ErrorKind;
use anyhow::Error;

/// A single entry of the interaction matrix, positive weights are
/// interactions the user liked, negative ones are explicit dislikes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub user_idx: usize,
    pub item_idx: usize,
    pub weight: f32,
}

impl Interaction {
    pub fn new(user_idx: usize, item_idx: usize, weight: f32) -> Self {
        Self {
            user_idx,
            item_idx,
            weight,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.weight > 0.0
    }
}

/// Sparse user x item matrix stored as triplets.
#[derive(Debug, Clone, PartialEq)]
pub struct Interactions {
    num_users: usize,
    num_items: usize,
    data: Vec<Interaction>,
}

impl Interactions {
    pub fn new(num_users: usize, num_items: usize) -> Self {
        Self {
            num_users,
            num_items,
            data: Vec::new(),
        }
    }

    pub fn push(&mut self, user_idx: usize, item_idx: usize, weight: f32) -> Result<(), Error> {
        if user_idx >= self.num_users || item_idx >= self.num_items {
            return Err(ErrorKind::IndexOutOfBound.into());
        }

        self.data.push(Interaction::new(user_idx, item_idx, weight));
        Ok(())
    }

    pub fn data(&self) -> &[Interaction] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn num_positives(&self) -> usize {
        self.data.iter().filter(|x| x.is_positive()).count()
    }

    pub fn num_users(&self) -> usize {
        self.num_users
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_users, self.num_items)
    }

    pub fn to_positives(&self) -> UserPositives {
        UserPositives::from(self)
    }
}

/// Compressed view with the positive items of every user, sorted so that
/// membership can be checked with a binary search.
#[derive(Debug, Clone)]
pub struct UserPositives {
    user_pointers: Vec<usize>,
    item_idxs: Vec<usize>,
}

impl UserPositives {
    pub fn get(&self, user_idx: usize) -> &[usize] {
        match (
            self.user_pointers.get(user_idx),
            self.user_pointers.get(user_idx + 1),
        ) {
            (Some(&start), Some(&stop)) => &self.item_idxs[start..stop],
            _ => &[],
        }
    }

    pub fn contains(&self, user_idx: usize, item_idx: usize) -> bool {
        self.get(user_idx).binary_search(&item_idx).is_ok()
    }
}

impl<'a> From<&'a Interactions> for UserPositives {
    fn from(interactions: &'a Interactions) -> Self {
        let mut positives: Vec<_> = interactions
            .data()
            .iter()
            .filter(|x| x.is_positive())
            .map(|x| (x.user_idx, x.item_idx))
            .collect();

        positives.sort_unstable();
        positives.dedup();

        let mut user_pointers = vec![0; interactions.num_users() + 1];
        let mut item_idxs = Vec::with_capacity(positives.len());

        for (user_idx, item_idx) in positives {
            item_idxs.push(item_idx);
            user_pointers[user_idx + 1] += 1;
        }

        for idx in 1..user_pointers.len() {
            user_pointers[idx] += user_pointers[idx - 1];
        }

        Self {
            user_pointers,
            item_idxs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;

    #[test]
    fn push_out_of_bounds_fails() {
        let mut interactions = Interactions::new(2, 2);

        assert!(interactions.push(0, 1, 1.0).is_ok());
        let err = interactions.push(2, 0, 1.0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ErrorKind>(),
            Some(&ErrorKind::IndexOutOfBound)
        );
        assert_eq!(interactions.len(), 1);
    }

    #[test]
    fn positives_are_grouped_by_user() -> Result<(), Error> {
        let mut interactions = Interactions::new(3, 4);
        interactions.push(2, 3, 1.0)?;
        interactions.push(0, 2, 1.0)?;
        interactions.push(0, 0, 1.0)?;
        interactions.push(0, 2, 1.0)?;
        interactions.push(2, 1, -1.0)?;

        let positives = interactions.to_positives();

        assert_eq!(interactions.num_positives(), 4);
        assert_eq!(positives.get(0), &[0, 2]);
        assert!(positives.get(1).is_empty());
        assert_eq!(positives.get(2), &[3]);
        assert!(positives.contains(0, 2));
        assert!(!positives.contains(2, 1));
        assert!(positives.get(7).is_empty());

        Ok(())
    }
}
