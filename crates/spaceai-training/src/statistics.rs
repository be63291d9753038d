use serde::{Deserialize, Serialize};
use spaceai_pilot::pilot::Pilot;

/// Fitness summary of one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u64,
    pub population: usize,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    pub worst_fitness: f32,
    pub best_score: u32,
}

impl GenerationStats {
    /// Summarizes the pilots of a generation, `None` if there are none.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_pilots<'a, I>(generation: u64, pilots: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Pilot>,
    {
        let mut count = 0;
        let mut sum = 0.0;
        let mut best_fitness = f32::NEG_INFINITY;
        let mut worst_fitness = f32::INFINITY;
        let mut best_score = 0;
        for pilot in pilots {
            let fitness = pilot.fitness();
            count += 1;
            sum += fitness;
            best_fitness = best_fitness.max(fitness);
            worst_fitness = worst_fitness.min(fitness);
            best_score = best_score.max(pilot.episode_score());
        }
        if count == 0 {
            return None;
        }
        Some(Self {
            generation,
            population: count,
            best_fitness,
            mean_fitness: sum / count as f32,
            worst_fitness,
            best_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;
    use spaceai_pilot::pilot::PilotConfig;

    use super::*;

    #[test]
    fn test_empty_has_no_stats() {
        assert_eq!(GenerationStats::from_pilots(0, []), None);
    }

    #[test]
    fn test_summarizes_fitness_and_score() {
        let mut rng = Pcg32::seed_from_u64(0);
        let pilots = [2, 0, 1]
            .map(|score| {
                let mut pilot = Pilot::random(PilotConfig::default(), &mut rng);
                pilot.commit_death(score);
                pilot
            });
        let stats = GenerationStats::from_pilots(4, &pilots).unwrap();
        assert_eq!(stats.generation, 4);
        assert_eq!(stats.population, 3);
        assert_eq!(stats.best_fitness, 2.0);
        assert_eq!(stats.worst_fitness, 0.0);
        assert_eq!(stats.mean_fitness, 1.0);
        assert_eq!(stats.best_score, 2);
    }
}
