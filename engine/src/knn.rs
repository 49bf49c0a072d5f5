use std::{cmp::Ordering, cmp::Reverse, collections::BinaryHeap};

type MinHeap<T> = BinaryHeap<Reverse<T>>;

/// An index paired with its score. Higher scores rank first, equal scores
/// rank the lower index first.
#[derive(Debug, Clone, Copy)]
pub struct Scored(pub usize, pub f32);

impl Scored {
    pub fn idx(&self) -> usize {
        self.0
    }

    pub fn score(&self) -> f32 {
        self.1
    }
}

impl PartialEq for Scored {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scored {}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scored {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score()
            .partial_cmp(&other.score())
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.idx().cmp(&self.idx()))
    }
}

/// Keeps the `k` best scored indices seen so far.
pub struct TopK {
    k: usize,
    min_heap: MinHeap<Scored>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            min_heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    pub fn push(&mut self, idx: usize, score: f32) {
        if self.k == 0 || score.is_nan() {
            return;
        }

        let scored = Scored(idx, score);
        if self.min_heap.len() < self.k {
            self.min_heap.push(Reverse(scored));
        } else if let Some(minimum) = self.min_heap.peek() {
            if scored > minimum.0 {
                self.min_heap.pop();
                self.min_heap.push(Reverse(scored));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.min_heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.min_heap.is_empty()
    }

    /// Best first.
    pub fn into_vec(self) -> Vec<Scored> {
        self.min_heap
            .into_sorted_vec()
            .into_iter()
            .map(|r| r.0)
            .collect()
    }
}

impl Extend<(usize, f32)> for TopK {
    fn extend<T: IntoIterator<Item = (usize, f32)>>(&mut self, iter: T) {
        for (idx, score) in iter {
            self.push(idx, score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idxs(scored: &[Scored]) -> Vec<usize> {
        scored.iter().map(Scored::idx).collect()
    }

    #[test]
    fn keeps_best_k_in_descending_order() {
        let mut top = TopK::new(3);
        top.extend(vec![(0, 0.1), (1, 0.9), (2, -0.3), (3, 0.5), (4, 0.7)]);

        let best = top.into_vec();
        assert_eq!(idxs(&best), vec![1, 4, 3]);
        assert!(best.windows(2).all(|w| w[0].score() >= w[1].score()));
    }

    #[test]
    fn ties_prefer_lower_index() {
        let mut top = TopK::new(2);
        top.extend(vec![(3, 1.0), (1, 1.0), (2, 1.0)]);

        assert_eq!(idxs(&top.into_vec()), vec![1, 2]);
    }

    #[test]
    fn fewer_candidates_than_k() {
        let mut top = TopK::new(10);
        top.extend(vec![(0, 0.5), (1, f32::NAN), (2, 0.6)]);

        assert_eq!(top.len(), 2);
        assert_eq!(idxs(&top.into_vec()), vec![2, 0]);
    }

    #[test]
    fn zero_k_is_always_empty() {
        let mut top = TopK::new(0);
        top.push(0, 1.0);

        assert!(top.is_empty());
    }
}
