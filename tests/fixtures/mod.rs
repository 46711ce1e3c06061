//! Test fixtures shared by the integration suites

#![allow(dead_code)]

use bot_population::config::AppConfig;
use bot_population::engine::{LocalServer, StaticModelSource};
use bot_population::types::{ClientNum, Team};
use bot_population::PopulationManager;

/// Model listing resembling a stock installation
pub fn stock_models() -> StaticModelSource {
    StaticModelSource::new([
        "/allied_airborne.tik",
        "/allied_manon.tik",
        "/allied_pilot.tik",
        "/american_army.tik",
        "/american_ranger.tik",
        "/allied_airborne_fps.tik",
        "/german_afrika_officer.tik",
        "/german_elite_sentry.tik",
        "/german_wehrmacht_soldier.tik",
        "/german_panzer_grenadier_fps.tik",
        "/IT_italian_soldier.tik",
        "/SC_scientist.tik",
        "/actor_civilian.tik",
    ])
}

/// Configuration with a small client table and a fixed seed
pub fn test_config(human_slots: usize, max_bots: usize, min_players: usize, num_bots: usize) -> AppConfig {
    let mut config = AppConfig::default();
    config.server.human_slots = human_slots;
    config.bots.max_bots = max_bots;
    config.bots.min_players = min_players;
    config.bots.num_bots = num_bots;
    config.bots.rng_seed = Some(42);
    config
}

/// Manager and matching empty server for a configuration
pub fn create_test_system(config: AppConfig) -> (PopulationManager, LocalServer) {
    let server = LocalServer::from_config(&config);
    let manager = PopulationManager::new(config).expect("valid test config");
    (manager, server)
}

/// Connect humans into the first human slots on the given teams
pub fn connect_humans(server: &mut LocalServer, teams: &[Team]) -> Vec<ClientNum> {
    teams
        .iter()
        .enumerate()
        .map(|(client, team)| {
            server.connect_human(client, &format!("human{}", client + 1), *team);
            client
        })
        .collect()
}

/// Add bots and pin each one to a team, in slot order
pub fn add_bots_on_teams(
    manager: &mut PopulationManager,
    server: &mut LocalServer,
    teams: &[Team],
) -> Vec<ClientNum> {
    let batch = manager.add_bots(server, teams.len(), None);
    for (client, team) in batch.added.iter().zip(teams) {
        server.set_team(*client, *team);
    }
    batch.added
}
