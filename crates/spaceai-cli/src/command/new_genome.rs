use std::path::PathBuf;

use anyhow::Context;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use spaceai_pilot::{
    genome_store::{DirectoryBackend, GenomeStore},
    pilot::Pilot,
};

use crate::model::simulation_config::SimulationConfig;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct NewGenomeArg {
    /// Genome store directory
    #[arg(long)]
    store: PathBuf,
    /// Simulation config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Random seed; drawn from the thread RNG if omitted
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &NewGenomeArg) -> anyhow::Result<()> {
    let NewGenomeArg {
        store,
        config,
        seed,
    } = arg;
    let config = SimulationConfig::open_or_default(config.as_ref())?;

    let mut rng = match seed {
        Some(seed) => Pcg32::seed_from_u64(*seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };
    let pilot = Pilot::random(config.pilot_config(), &mut rng);

    let mut genome_store = GenomeStore::new(DirectoryBackend::new(store));
    pilot
        .save_genome(&mut genome_store, None)
        .with_context(|| format!("Failed to save genome to {}", store.display()))?;

    eprintln!(
        "Saved random genome with {} hidden neurons to {}",
        pilot.genotype().neurons(),
        store.display()
    );
    Ok(())
}
