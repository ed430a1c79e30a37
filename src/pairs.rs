//! Pair construction over a label set.
//!
//! Two sampling modes feed the twin encoder:
//!
//! * [`balanced_pairs`] — training-time construction with a guaranteed 1:1
//!   positive:negative ratio per epoch, regardless of label-frequency skew.
//! * [`random_pairs`] — ad-hoc evaluation draws with replacement. **No
//!   balance guarantee**: with N distinct labels roughly 1/N of draws come
//!   out positive, so callers needing usable positive counts must draw
//!   accordingly.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::{Error, Result};

/// One labelled comparison: two labels and the ground-truth match flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub a: String,
    pub b: String,
    /// True iff `a` and `b` name the same word.
    pub matched: bool,
}

impl Pair {
    fn positive(label: &str) -> Self {
        Self {
            a: label.to_string(),
            b: label.to_string(),
            matched: true,
        }
    }

    fn negative(label: &str, other: &str) -> Self {
        Self {
            a: label.to_string(),
            b: other.to_string(),
            matched: false,
        }
    }
}

/// Balanced training pairs: for every label L in the input, one positive
/// (L, L) and one negative (L, D) with D drawn uniformly from the label
/// multiset excluding L. Output length is exactly `2 * labels.len()`.
///
/// Fails fast with [`Error::InsufficientLabels`] when fewer than two
/// distinct labels exist, since no negative pair can be formed.
pub fn balanced_pairs<R: Rng + ?Sized>(labels: &[String], rng: &mut R) -> Result<Vec<Pair>> {
    ensure_distinct(labels)?;

    let mut pairs = Vec::with_capacity(labels.len() * 2);
    for label in labels {
        pairs.push(Pair::positive(label));

        let others: Vec<&String> = labels.iter().filter(|c| *c != label).collect();
        // Non-empty for every label once the distinct check passed.
        let other = others
            .choose(rng)
            .ok_or(Error::InsufficientLabels(1))?;
        pairs.push(Pair::negative(label, other.as_str()));
    }
    Ok(pairs)
}

/// `draws` independent evaluation pairs, both sides uniform with
/// replacement over `labels`. Match flag is plain string equality.
pub fn random_pairs<R: Rng + ?Sized>(labels: &[String], draws: usize, rng: &mut R) -> Vec<Pair> {
    (0..draws)
        .filter_map(|_| {
            let a = labels.choose(rng)?;
            let b = labels.choose(rng)?;
            Some(Pair {
                a: a.clone(),
                b: b.clone(),
                matched: a == b,
            })
        })
        .collect()
}

fn ensure_distinct(labels: &[String]) -> Result<()> {
    let mut distinct: Vec<&String> = labels.iter().collect();
    distinct.sort();
    distinct.dedup();
    if distinct.len() < 2 {
        return Err(Error::InsufficientLabels(distinct.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn balanced_mode_emits_2n_with_even_split() -> Result<()> {
        let labels = labels(&["cat", "dog", "bird", "cat"]);
        let mut rng = StdRng::seed_from_u64(7);
        let pairs = balanced_pairs(&labels, &mut rng)?;

        assert_eq!(pairs.len(), 8);
        assert_eq!(pairs.iter().filter(|p| p.matched).count(), 4);
        for pair in &pairs {
            if pair.matched {
                assert_eq!(pair.a, pair.b);
            } else {
                assert_ne!(pair.a, pair.b);
            }
        }
        Ok(())
    }

    #[test]
    fn single_distinct_label_fails_fast() {
        let labels = labels(&["cat", "cat", "cat"]);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            balanced_pairs(&labels, &mut rng),
            Err(Error::InsufficientLabels(1))
        ));
    }

    #[test]
    fn empty_label_set_fails_fast() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            balanced_pairs(&[], &mut rng),
            Err(Error::InsufficientLabels(0))
        ));
    }

    #[test]
    fn balanced_mode_is_seed_reproducible() -> Result<()> {
        let labels = labels(&["cat", "dog", "bird"]);
        let a = balanced_pairs(&labels, &mut StdRng::seed_from_u64(42))?;
        let b = balanced_pairs(&labels, &mut StdRng::seed_from_u64(42))?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn random_mode_flags_by_equality() {
        let labels = labels(&["cat", "dog"]);
        let mut rng = StdRng::seed_from_u64(3);
        let pairs = random_pairs(&labels, 64, &mut rng);

        assert_eq!(pairs.len(), 64);
        for pair in &pairs {
            assert_eq!(pair.matched, pair.a == pair.b);
        }
    }
}
