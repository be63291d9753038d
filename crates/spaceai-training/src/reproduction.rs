//! Genetic operators used to refill the population.
//!
//! These functions are used by [`Population::evolve`](crate::population::Population::evolve)
//! to produce one child per non-survivor slot.
//!
//! # Operations
//!
//! - **Crossover**: [`crossover`] blends two parents with a single random weight
//! - **Mutation**: [`mutate`] applies the configured [`MutationPolicy`] to a child
//! - **Breeding**: [`breed`] picks two parents from the survivors and runs both steps
//!
//! # Crossover
//!
//! One weight `w` is drawn uniformly from `[0, 1)` per child and shared by every matrix
//! and bias vector:
//!
//! ```text
//! child = w * parent_1 + (1 - w) * parent_2
//! ```
//!
//! Because `w` is shared, each child parameter lies between the corresponding parameters
//! of its parents.
//!
//! # Mutation
//!
//! With probability `mutation_prob` the child is mutated as a whole:
//!
//! - [`MutationPolicy::Reinitialize`] throws the crossed-over parameters away and samples a
//!   fresh genotype from the initialization distribution
//! - [`MutationPolicy::ScaleWeights`] multiplies every parameter by one factor drawn from
//!   `[1 - scale, 1 + scale]`

use rand::{Rng, seq::IndexedRandom as _};
use spaceai_pilot::genotype::Genotype;

use crate::config::MutationPolicy;

/// Blends two parents with one uniformly drawn weight.
pub fn crossover<R>(parent_1: &Genotype, parent_2: &Genotype, rng: &mut R) -> Genotype
where
    R: Rng + ?Sized,
{
    let w = rng.random::<f32>();
    Genotype::blend(parent_1, parent_2, w)
}

/// Mutates `child` in place with probability `mutation_prob`.
///
/// Returns whether the child was mutated.
pub fn mutate<R>(
    child: &mut Genotype,
    policy: MutationPolicy,
    mutation_prob: f64,
    rng: &mut R,
) -> bool
where
    R: Rng + ?Sized,
{
    if !rng.random_bool(mutation_prob) {
        return false;
    }
    match policy {
        MutationPolicy::Reinitialize => *child = Genotype::random(rng, child.neurons()),
        MutationPolicy::ScaleWeights { scale } => {
            let factor = rng.random_range((1.0 - scale)..=(1.0 + scale));
            child.scale(factor);
        }
    }
    true
}

/// Produces one child from two parents drawn uniformly, with replacement, from `parents`.
///
/// # Panics
///
/// Panics if `parents` is empty.
pub fn breed<R>(
    parents: &[&Genotype],
    policy: MutationPolicy,
    mutation_prob: f64,
    rng: &mut R,
) -> Genotype
where
    R: Rng + ?Sized,
{
    let parent_1 = parents.choose(rng).expect("at least one parent");
    let parent_2 = parents.choose(rng).expect("at least one parent");
    let mut child = crossover(parent_1, parent_2, rng);
    let mutated = mutate(&mut child, policy, mutation_prob, rng);
    tracing::trace!(mutated, "bred child genotype");
    child
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn between(value: f32, a: f32, b: f32) -> bool {
        let eps = 1e-5;
        value >= a.min(b) - eps && value <= a.max(b) + eps
    }

    fn is_blend_of(child: &Genotype, a: &Genotype, b: &Genotype) -> bool {
        child
            .parameters()
            .zip(a.parameters())
            .zip(b.parameters())
            .all(|((c, x), y)| between(c, x, y))
    }

    #[test]
    fn test_crossover_stays_between_parents() {
        let mut rng = Pcg32::seed_from_u64(10);
        let a = Genotype::random(&mut rng, 8);
        let b = Genotype::random(&mut rng, 8);
        for _ in 0..20 {
            let child = crossover(&a, &b, &mut rng);
            assert!(is_blend_of(&child, &a, &b));
        }
    }

    #[test]
    fn test_crossover_uses_one_weight_for_all_parameters() {
        let mut rng = Pcg32::seed_from_u64(11);
        let a = Genotype::random(&mut rng, 4);
        let b = Genotype::random(&mut rng, 4);
        let child = crossover(&a, &b, &mut rng);

        let weights = child
            .parameters()
            .zip(a.parameters())
            .zip(b.parameters())
            .filter(|((_, x), y)| (x - y).abs() > 0.1)
            .map(|((c, x), y)| (c - y) / (x - y))
            .collect::<Vec<_>>();
        assert!(!weights.is_empty());
        for w in &weights {
            assert!((w - weights[0]).abs() < 1e-3, "{weights:?}");
        }
    }

    #[test]
    fn test_mutate_never_with_zero_probability() {
        let mut rng = Pcg32::seed_from_u64(12);
        let original = Genotype::random(&mut rng, 8);
        for policy in [
            MutationPolicy::Reinitialize,
            MutationPolicy::ScaleWeights { scale: 0.2 },
        ] {
            let mut child = original.clone();
            for _ in 0..50 {
                assert!(!mutate(&mut child, policy, 0.0, &mut rng));
            }
            assert_eq!(child, original);
        }
    }

    #[test]
    fn test_mutate_reinitialize_replaces_genotype() {
        let mut rng = Pcg32::seed_from_u64(13);
        let original = Genotype::random(&mut rng, 8);
        let mut child = original.clone();
        assert!(mutate(&mut child, MutationPolicy::Reinitialize, 1.0, &mut rng));
        assert_eq!(child.neurons(), 8);
        assert!(
            child
                .parameters()
                .zip(original.parameters())
                .all(|(c, o)| c != o)
        );
    }

    #[test]
    fn test_mutate_scale_weights_uses_single_factor() {
        let mut rng = Pcg32::seed_from_u64(14);
        let original = Genotype::random(&mut rng, 8);
        let mut child = original.clone();
        let policy = MutationPolicy::ScaleWeights { scale: 0.2 };
        assert!(mutate(&mut child, policy, 1.0, &mut rng));

        let (c0, o0) = child
            .parameters()
            .zip(original.parameters())
            .find(|(_, o)| o.abs() > 0.1)
            .unwrap();
        let factor = c0 / o0;
        assert!((0.8..=1.2).contains(&factor), "factor {factor}");
        for (c, o) in child.parameters().zip(original.parameters()) {
            assert!((c - o * factor).abs() < 1e-4);
        }
    }

    #[test]
    fn test_breed_draws_only_from_given_parents() {
        let mut rng = Pcg32::seed_from_u64(15);
        let a = Genotype::random(&mut rng, 8);
        let b = Genotype::random(&mut rng, 8);
        let outsider = Genotype::random(&mut rng, 8);
        let parents = [&a, &b];
        for _ in 0..30 {
            let child = breed(&parents, MutationPolicy::Reinitialize, 0.0, &mut rng);
            assert!(is_blend_of(&child, &a, &b));
            assert!(!is_blend_of(&child, &outsider, &outsider));
        }
    }

    #[test]
    fn test_breed_with_single_parent_clones_it() {
        let mut rng = Pcg32::seed_from_u64(16);
        let only = Genotype::random(&mut rng, 8);
        let child = breed(&[&only], MutationPolicy::Reinitialize, 0.0, &mut rng);
        for (c, o) in child.parameters().zip(only.parameters()) {
            assert!((c - o).abs() < 1e-6);
        }
    }
}
