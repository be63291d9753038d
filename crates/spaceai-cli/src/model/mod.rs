pub mod simulation_config;
