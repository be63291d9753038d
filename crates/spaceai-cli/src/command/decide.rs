use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use spaceai_engine::{Action, Observation};
use spaceai_pilot::{
    genome_store::{DirectoryBackend, GenomeBackend, GenomeStore, GenomeStoreError},
    pilot::{Pilot, PilotConfig},
};

use crate::{model::simulation_config::SimulationConfig, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DecideArg {
    /// Genome store directory
    #[arg(long)]
    pub(crate) store: PathBuf,
    /// Horizontal center of the ship
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) ship_x: f32,
    /// Left edge of the next obstacle gap
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) gap_left: f32,
    /// Right edge of the next obstacle gap
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) gap_right: f32,
    /// Simulation config file (JSON)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum PilotSource {
    /// Best genome from the store.
    TopPilot,
    /// No stored genome; a freshly randomized pilot.
    RandomAutopilot,
}

#[derive(Debug, Clone, Serialize)]
struct Decision {
    pilot: PilotSource,
    observation: Observation,
    action: Action,
    probabilities: Vec<f32>,
}

pub(crate) fn run(arg: &DecideArg) -> anyhow::Result<()> {
    let DecideArg {
        store,
        ship_x,
        gap_left,
        gap_right,
        config,
        output,
    } = arg;
    let config = SimulationConfig::open_or_default(config.as_ref())?;

    let genome_store = GenomeStore::new(DirectoryBackend::new(store));
    let (pilot, source) = load_pilot(&genome_store, config.pilot_config(), &mut rand::rng())
        .with_context(|| format!("Failed to load top pilot from {}", store.display()))?;

    let decision = decide(&pilot, source, Observation::new(*ship_x, *gap_left, *gap_right));
    eprintln!("{:?} chose {}", decision.pilot, decision.action);
    Output::save_json(&decision, output.clone())
}

/// Loads the best stored pilot, falling back to a random one if the store is empty.
fn load_pilot<B, R>(
    store: &GenomeStore<B>,
    config: PilotConfig,
    rng: &mut R,
) -> Result<(Pilot, PilotSource), GenomeStoreError>
where
    B: GenomeBackend,
    R: rand::Rng + ?Sized,
{
    let mut pilot = Pilot::random(config, rng);
    match pilot.load_genome(store) {
        Ok(()) => Ok((pilot, PilotSource::TopPilot)),
        Err(GenomeStoreError::NotFound { key }) => {
            tracing::warn!(%key, "no stored genome, using a random autopilot");
            Ok((pilot, PilotSource::RandomAutopilot))
        }
        Err(e) => Err(e),
    }
}

fn decide(pilot: &Pilot, source: PilotSource, observation: Observation) -> Decision {
    Decision {
        pilot: source,
        observation,
        action: pilot.choose(&observation),
        probabilities: pilot.action_probabilities(&observation),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;
    use spaceai_pilot::{genome_store::MemoryBackend, genotype::Genotype};

    use super::*;

    #[test]
    fn test_empty_store_falls_back_to_random_pilot() {
        let store = GenomeStore::new(MemoryBackend::default());
        let mut rng = Pcg32::seed_from_u64(0);
        let (_, source) = load_pilot(&store, PilotConfig::default(), &mut rng).unwrap();
        assert_eq!(source, PilotSource::RandomAutopilot);
    }

    #[test]
    fn test_stored_genome_is_used() {
        let mut rng = Pcg32::seed_from_u64(1);
        let genotype = Genotype::random(&mut rng, 8);
        let mut store = GenomeStore::new(MemoryBackend::default());
        store.save(&genotype, None).unwrap();

        let (pilot, source) = load_pilot(&store, PilotConfig::default(), &mut rng).unwrap();
        assert_eq!(source, PilotSource::TopPilot);
        assert_eq!(pilot.genotype(), &genotype);
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut store = GenomeStore::new(MemoryBackend::default());
        store.save(&Genotype::random(&mut rng, 4), None).unwrap();

        let err = load_pilot(&store, PilotConfig::default(), &mut rng).unwrap_err();
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn test_decision_probabilities_sum_to_one() {
        let mut rng = Pcg32::seed_from_u64(3);
        let pilot = Pilot::random(PilotConfig::default(), &mut rng);
        let decision = decide(
            &pilot,
            PilotSource::TopPilot,
            Observation::new(320.0, 100.0, 250.0),
        );
        let sum = decision.probabilities.iter().sum::<f32>();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(decision.probabilities.len(), Action::LEN);
    }
}
