use num_traits::float::Float;
use std::ops::{AddAssign, Mul};

pub fn dot<V>(a: &[V], b: &[V]) -> V
where
    V: Float + AddAssign + Mul,
{
    let mut acc = V::zero();
    for (x, y) in a.iter().zip(b) {
        acc += (*x) * (*y);
    }

    acc
}

pub fn cosine_similarity<V>(a: &[V], b: &[V]) -> Option<V>
where
    V: Float + AddAssign + Mul,
{
    if a.len() != b.len() {
        return None;
    }

    let mut a_norm = None;
    let mut b_norm = None;
    let mut dot_prod = None;

    for (x, y) in a.iter().zip(b) {
        *a_norm.get_or_insert_with(V::zero) += x.powi(2);
        *b_norm.get_or_insert_with(V::zero) += y.powi(2);
        *dot_prod.get_or_insert_with(V::zero) += (*x) * (*y);
    }

    let dot_prod = dot_prod?;
    let a_norm = a_norm?;
    let b_norm = b_norm?;

    let cos_sim = dot_prod / (a_norm.sqrt() * b_norm.sqrt());
    if cos_sim.is_nan() || cos_sim.is_infinite() {
        None
    } else {
        Some(cos_sim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::*;

    #[test]
    fn dot_product_ok() {
        let a = [1., 2., 3.];
        let b = [4., -5., 6.];

        assert_approx_eq!(12., dot(&a, &b));
    }

    #[test]
    fn cosine_similarity_ok() {
        let a = [1., 0., 1.];
        let b = [1., 1., 0.];

        assert_approx_eq!(0.5, cosine_similarity(&a, &b).unwrap());
        assert_approx_eq!(1.0, cosine_similarity(&a, &a).unwrap());
    }

    #[test]
    fn cosine_similarity_all_zeros_should_be_none() {
        let a = [0., 0., 0.];
        let b = [1., 1., 1.];

        assert!(cosine_similarity(&a, &b).is_none());
        assert!(cosine_similarity::<f64>(&[], &[]).is_none());
        assert!(cosine_similarity(&[1.], &[1., 2.]).is_none());
    }
}
