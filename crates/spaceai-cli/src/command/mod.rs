use clap::{Parser, Subcommand};

use self::{
    decide::DecideArg, inspect::InspectArg, new_genome::NewGenomeArg,
    print_config::PrintConfigArg,
};

mod decide;
mod inspect;
mod new_genome;
mod print_config;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Print the default simulation config as JSON
    PrintConfig(#[clap(flatten)] PrintConfigArg),
    /// Write a freshly randomized genome as the best genome
    NewGenome(#[clap(flatten)] NewGenomeArg),
    /// Show shapes and weight statistics of the best genome
    Inspect(#[clap(flatten)] InspectArg),
    /// Ask the top pilot which way to steer
    Decide(#[clap(flatten)] DecideArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::PrintConfig(arg) => print_config::run(&arg)?,
        Mode::NewGenome(arg) => new_genome::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
        Mode::Decide(arg) => decide::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_decide() {
        let args = CommandArgs::try_parse_from([
            "spaceai",
            "decide",
            "--store",
            "genomes",
            "--ship-x",
            "320",
            "--gap-left",
            "100",
            "--gap-right",
            "250",
        ])
        .unwrap();
        let arg = match args.mode {
            Mode::Decide(arg) => arg,
            other => panic!("expected decide, got {other:?}"),
        };
        assert_eq!(arg.ship_x, 320.0);
        assert_eq!(arg.gap_right, 250.0);
    }
}
