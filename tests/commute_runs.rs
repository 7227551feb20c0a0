use std::fs;

use commute_sim::city::{load_map, CityGrid};
use commute_sim::simulation::{
    build_report, export_report, run_simulation, ConfigError, SimulationConfig, SimulationError,
    WorkplacePolicy,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const CONFIG: &str = r#"{
    "simulation": { "day_length": 24, "max_ticks": 120, "num_agents": 12, "seed": 5 },
    "houses": { "a": [0, 0], "b": [7, 0], "c": [0, 7] },
    "workplace_locations": { "hq": [7, 7], "lab": [3, 4], "shop": [6, 2] },
    "policy": { "hq": "fixed", "lab": "free", "shop": "flex" }
}"#;

const MAP: &str = "type octile
height 8
width 8
map
........
........
...@@...
........
........
..@.....
........
........
";

fn write_fixture(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let config_path = dir.join("commute.json");
    let map_path = dir.join("town.map");
    fs::write(&config_path, CONFIG).unwrap();
    fs::write(&map_path, MAP).unwrap();
    (config_path, map_path)
}

#[test]
fn test_config_and_map_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (config_path, map_path) = write_fixture(dir.path());

    let config = SimulationConfig::load(&config_path).unwrap();
    assert_eq!(config.simulation.num_agents, 12);
    assert_eq!(config.policies_in_use(), WorkplacePolicy::ALL.to_vec());

    let grid = load_map(&map_path).unwrap();
    assert_eq!((grid.width(), grid.height()), (8, 8));
    assert_eq!(grid.cell_counts(), (61, 3));
}

#[test]
fn test_missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = SimulationConfig::load(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_every_policy_runs_deterministically_on_a_map() {
    let dir = tempfile::tempdir().unwrap();
    let (config_path, map_path) = write_fixture(dir.path());
    let config = SimulationConfig::load(&config_path).unwrap();
    let grid = load_map(&map_path).unwrap();

    for policy in WorkplacePolicy::ALL {
        let first = run_simulation(&config, policy, Some(&grid), 5).unwrap();
        let second = run_simulation(&config, policy, Some(&grid), 5).unwrap();

        assert_eq!(first.stats, second.stats);
        assert_eq!(first.activity_log.stats, second.activity_log.stats);
        for (a, b) in first.employees.iter().zip(&second.employees) {
            assert_eq!(a.wealth, b.wealth);
            assert_eq!(a.needs, b.needs);
            assert_eq!(a.state, b.state);
            assert_eq!(a.workplace, b.workplace);
        }
        // The map prices every walk, so only bus crowding is ever drawn
        assert!(first
            .activity_log
            .recent_entries(usize::MAX)
            .iter()
            .all(|e| !e.message.contains("walk length")));
    }
}

#[test]
fn test_seed_changes_the_run() {
    let config = SimulationConfig::from_json_str(CONFIG).unwrap();
    let a = run_simulation(&config, WorkplacePolicy::Free, None, 1).unwrap();
    let b = run_simulation(&config, WorkplacePolicy::Free, None, 2).unwrap();
    let tolerances = |s: &commute_sim::simulation::SimulationState| {
        s.employees.iter().map(|e| e.social_tolerance).collect::<Vec<_>>()
    };
    assert_ne!(tolerances(&a), tolerances(&b));
}

#[test]
fn test_policy_without_workplace_is_fatal() {
    let config = SimulationConfig::from_json_str(
        &CONFIG.replace(r#""shop": "flex""#, r#""shop": "free""#),
    )
    .unwrap();
    let result = run_simulation(&config, WorkplacePolicy::Flex, None, 5);
    assert!(matches!(
        result,
        Err(SimulationError::Config(ConfigError::NoWorkplaceForPolicy(WorkplacePolicy::Flex)))
    ));
}

#[test]
fn test_reports_export_per_policy() {
    let dir = tempfile::tempdir().unwrap();
    let config = SimulationConfig::from_json_str(CONFIG).unwrap();
    let grid = CityGrid::new(8, 8);
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    for policy in WorkplacePolicy::ALL {
        let state = run_simulation(&config, policy, Some(&grid), 5).unwrap();
        let report = build_report(&state, &mut rng);
        assert_eq!(report.agents.len(), 12);
        assert!(report.gini >= 0.0 && report.gini <= 1.0);
        let tolerance_total: usize = report.by_tolerance.iter().map(|g| g.wealth.count).sum();
        assert_eq!(tolerance_total, 12);

        let path = export_report(&report, dir.path()).unwrap();
        assert!(path.ends_with(format!("{}/report.json", policy)));
    }
}
