use std::path::PathBuf;

use crate::{model::simulation_config::SimulationConfig, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PrintConfigArg {
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PrintConfigArg) -> anyhow::Result<()> {
    let PrintConfigArg { output } = arg;
    Output::save_json(&SimulationConfig::default(), output.clone())
}
