//! Performance benchmarks for population checks

use bot_population::config::AppConfig;
use bot_population::engine::{GameServer, LocalServer, StaticModelSource};
use bot_population::types::Team;
use bot_population::PopulationManager;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_config(min_players: usize, num_bots: usize) -> AppConfig {
    let mut config = AppConfig::default();
    config.server.human_slots = 32;
    config.bots.max_bots = 32;
    config.bots.min_players = min_players;
    config.bots.num_bots = num_bots;
    config.bots.rng_seed = Some(7);
    config
}

fn bench_models() -> StaticModelSource {
    let mut files = Vec::new();
    for i in 0..40 {
        files.push(format!("/allied_model{}.tik", i));
        files.push(format!("/german_model{}.tik", i));
        files.push(format!("/allied_model{}_fps.tik", i));
    }
    StaticModelSource::new(files)
}

fn create_bench_system(config: &AppConfig) -> (PopulationManager, LocalServer) {
    let server = LocalServer::from_config(config);
    let manager = PopulationManager::new(config.clone()).unwrap();
    (manager, server)
}

fn bench_fill_empty_server(c: &mut Criterion) {
    let config = bench_config(24, 8);
    let models = bench_models();

    c.bench_function("reconcile_fill_32_bots", |b| {
        b.iter(|| {
            let (mut manager, mut server) = create_bench_system(&config);
            black_box(manager.reconcile(&mut server, &models))
        })
    });
}

fn bench_balanced_removal(c: &mut Criterion) {
    let config = bench_config(0, 0);

    c.bench_function("remove_24_of_32_bots", |b| {
        b.iter(|| {
            let (mut manager, mut server) = create_bench_system(&config);
            for client in 0..8 {
                server.connect_human(client, "human", Team::Axis);
            }
            let batch = manager.add_bots(&mut server, 32, None);
            for (i, client) in batch.added.iter().enumerate() {
                let team = if i % 3 == 0 { Team::Axis } else { Team::Allies };
                server.set_team(*client, team);
            }
            black_box(manager.remove_bots(&mut server, 24))
        })
    });
}

fn bench_level_change(c: &mut Criterion) {
    let config = bench_config(0, 16);
    let models = bench_models();

    c.bench_function("level_change_16_bots", |b| {
        b.iter(|| {
            let (mut manager, mut server) = create_bench_system(&config);
            manager.reconcile(&mut server, &models);
            manager.reset(&server);
            server.teardown_level();
            black_box(manager.reconcile(&mut server, &models));
            black_box(server.team_counts())
        })
    });
}

criterion_group!(
    benches,
    bench_fill_empty_server,
    bench_balanced_removal,
    bench_level_change
);
criterion_main!(benches);
