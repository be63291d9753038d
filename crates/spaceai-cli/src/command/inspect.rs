use std::path::PathBuf;

use anyhow::Context;
use spaceai_pilot::{
    genome_store::{DirectoryBackend, GenomeStore},
    genotype::Layer,
};

use crate::model::simulation_config::SimulationConfig;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    /// Genome store directory
    #[arg(long)]
    store: PathBuf,
    /// Simulation config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ValueStats {
    min: f32,
    max: f32,
    mean: f32,
}

impl ValueStats {
    #[expect(clippy::cast_precision_loss)]
    fn from_values(values: &[f32]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        Some(Self { min, max, mean })
    }
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let InspectArg { store, config } = arg;
    let config = SimulationConfig::open_or_default(config.as_ref())?;
    let neurons = config.evolution.neurons;

    let genome_store = GenomeStore::new(DirectoryBackend::new(store));
    let genotype = genome_store
        .load(neurons)
        .with_context(|| format!("Failed to load best genome from {}", store.display()))?;

    eprintln!("Best genome in {}:", store.display());
    print_layer("hidden", genotype.hidden());
    print_layer("output", genotype.output());
    Ok(())
}

fn print_layer(name: &str, layer: &Layer) {
    eprintln!(
        "  {name} layer: {} -> {}",
        layer.inputs(),
        layer.outputs()
    );
    for (part, values) in [
        ("weights", layer.weights().as_slice()),
        ("bias", layer.bias()),
    ] {
        if let Some(ValueStats { min, max, mean }) = ValueStats::from_values(values) {
            eprintln!("    {part:<7} min={min:>8.4} max={max:>8.4} mean={mean:>8.4}");
        }
    }
}
