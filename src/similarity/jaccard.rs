// Jaccard similarity between two term sets.
//
//   score = 1 - |A ∆ B| / |A ∪ B|
//
// which equals |A ∩ B| / |A ∪ B|. Counts are integers, so the result is
// exactly symmetric. Two empty sets score 1.0; one empty set against a
// non-empty one scores 0.0.

use std::collections::HashSet;
use std::hash::{BuildHasher, Hash};

/// Compute 1 minus the Jaccard distance between two sets.
///
/// Returns a score from 0.0 (disjoint) to 1.0 (identical).
pub fn jaccard_similarity<T, S>(set_a: &HashSet<T, S>, set_b: &HashSet<T, S>) -> f64
where
    T: Eq + Hash,
    S: BuildHasher,
{
    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }

    // Iterate the smaller set for the intersection count.
    let (small, large) = if set_a.len() <= set_b.len() {
        (set_a, set_b)
    } else {
        (set_b, set_a)
    };
    let intersection = small.iter().filter(|item| large.contains(item)).count();
    let union = set_a.len() + set_b.len() - intersection;
    let symmetric_difference = union - intersection;

    1.0 - symmetric_difference as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_partial_overlap() {
        let a = set(&["cat", "feline", "pet"]);
        let b = set(&["cat", "dog", "pet"]);
        // union 4, symmetric difference {feline, dog} = 2
        assert_eq!(jaccard_similarity(&a, &b), 0.5);
    }

    #[test]
    fn test_identical_sets() {
        let a = set(&["fat", "queer", "dei"]);
        assert_eq!(jaccard_similarity(&a, &a), 1.0);
    }

    #[test]
    fn test_disjoint_sets() {
        let a = set(&["sports", "gaming"]);
        let b = set(&["cooking", "baking"]);
        assert_eq!(jaccard_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_both_empty_is_one() {
        let empty: HashSet<String> = HashSet::new();
        assert_eq!(jaccard_similarity(&empty, &empty), 1.0);
    }

    #[test]
    fn test_one_empty_is_zero() {
        let empty: HashSet<String> = HashSet::new();
        let x = set(&["x"]);
        assert_eq!(jaccard_similarity(&empty, &x), 0.0);
        assert_eq!(jaccard_similarity(&x, &empty), 0.0);
    }

    #[test]
    fn test_subset() {
        let a = set(&["apple", "banana"]);
        let b = set(&["apple", "banana", "fruit", "tropical"]);
        assert_eq!(jaccard_similarity(&a, &b), 0.5);
    }

    #[test]
    fn test_exactly_symmetric() {
        let a = set(&["a", "b", "c", "d", "e", "f", "g"]);
        let b = set(&["e", "f", "g", "h", "i"]);
        assert_eq!(jaccard_similarity(&a, &b), jaccard_similarity(&b, &a));
    }
}
