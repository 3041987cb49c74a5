//! Regret matching and small helpers over probability vectors.
//!
//! Strategies are plain `Vec<f64>` aligned with an information set's action
//! order. They are never stored: the current strategy is always recomputed
//! from the regret sums.

use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;

/// Regret matching: strategy proportional to positive regret.
///
/// ```text
/// strategy(a) = max(0, R(a)) / sum(max(0, R(a')))
/// ```
///
/// Falls back to the uniform strategy when no action has positive regret.
///
/// # Example
/// ```
/// use cfr_engine::cfr::strategy::regret_matching;
///
/// assert_eq!(regret_matching(&[3.0, -1.0, 1.0]), vec![0.75, 0.0, 0.25]);
/// assert_eq!(regret_matching(&[-2.0, 0.0]), vec![0.5, 0.5]);
/// ```
pub fn regret_matching(regrets: &[f64]) -> Vec<f64> {
    let positive: Vec<f64> = regrets.iter().map(|&r| r.max(0.0)).collect();
    let sum: f64 = positive.iter().sum();

    if sum > 0.0 {
        positive.iter().map(|&r| r / sum).collect()
    } else {
        uniform(regrets.len())
    }
}

/// Normalize non-negative weights into a distribution, or uniform if they
/// are all zero.
pub fn normalize_or_uniform(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        weights.iter().map(|&w| w / total).collect()
    } else {
        uniform(weights.len())
    }
}

/// Uniform distribution over `n` actions (empty for `n == 0`).
pub fn uniform(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Mix a strategy with the uniform distribution:
/// `epsilon / n + (1 - epsilon) * strategy(a)`.
pub fn epsilon_blend(strategy: &[f64], epsilon: f64) -> Vec<f64> {
    let n = strategy.len() as f64;
    strategy
        .iter()
        .map(|&p| epsilon / n + (1.0 - epsilon) * p)
        .collect()
}

/// Sample an index according to `probabilities`.
pub fn sample_index<R: Rng + ?Sized>(
    probabilities: &[f64],
    rng: &mut R,
) -> Result<usize, WeightedError> {
    let dist = WeightedIndex::<f64>::new(probabilities)?;
    Ok(dist.sample(rng))
}

/// Index of the first maximal probability.
pub fn argmax(probabilities: &[f64]) -> Option<usize> {
    probabilities
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &p)| match best {
            Some((_, q)) if q >= p => best,
            _ => Some((i, p)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_distribution(p: &[f64]) {
        assert!(p.iter().all(|&x| x >= 0.0), "negative probability in {:?}", p);
        let sum: f64 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum {} for {:?}", sum, p);
    }

    #[test]
    fn test_regret_matching_proportional() {
        let s = regret_matching(&[2.0, 6.0, -4.0, 0.0]);
        assert_eq!(s, vec![0.25, 0.75, 0.0, 0.0]);
    }

    #[test]
    fn test_regret_matching_uniform_fallback() {
        assert_eq!(regret_matching(&[0.0, 0.0, 0.0, 0.0]), vec![0.25; 4]);
        assert_eq!(regret_matching(&[-1.0, -3.0]), vec![0.5, 0.5]);
        assert!(regret_matching(&[]).is_empty());
    }

    #[test]
    fn test_single_action_has_probability_one() {
        for regret in [-10.0, 0.0, 0.5, 1e9] {
            assert_eq!(regret_matching(&[regret]), vec![1.0]);
        }
        assert_eq!(normalize_or_uniform(&[0.0]), vec![1.0]);
        assert_eq!(normalize_or_uniform(&[3.7]), vec![1.0]);
    }

    #[test]
    fn test_distributions_are_valid() {
        let regrets = [
            vec![1e-12, 5.0, -7.0],
            vec![-1.0, -1.0, -1.0, 0.0, 0.0],
            vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9],
        ];
        for r in &regrets {
            let s = regret_matching(r);
            assert_distribution(&s);
            assert_distribution(&epsilon_blend(&s, 0.6));
        }
        assert_distribution(&normalize_or_uniform(&[1.0, 0.0, 3.0]));
    }

    #[test]
    fn test_epsilon_blend_keeps_every_action_reachable() {
        let blended = epsilon_blend(&[1.0, 0.0, 0.0, 0.0], 0.4);
        assert!(blended.iter().all(|&p| p > 0.0));
        assert!((blended[0] - 0.7).abs() < 1e-12);
        assert!((blended[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[1.0]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_sample_index() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(sample_index(&[0.0, 1.0, 0.0], &mut rng).unwrap(), 1);
        }
        assert!(sample_index(&[0.0, 0.0], &mut rng).is_err());
        assert!(sample_index(&[], &mut rng).is_err());
    }
}
