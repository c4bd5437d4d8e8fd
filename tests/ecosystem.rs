use ecosim::{
    Agent, AgentKind, BoundaryPolicy, CellState, DeathPolicy, Population, Position, Predator,
    Prey, Terrain, TerrainError, Viewport,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(2024)
}

fn single_food_cell() -> Terrain {
    let mut terrain = Terrain::new(1, 1).expect("1x1 terrain");
    terrain.set_state(0, 0, CellState::Food).unwrap();
    terrain
}

fn all_food(rows: usize, cols: usize) -> Terrain {
    let mut terrain = Terrain::new(rows, cols).unwrap();
    for y in 0..rows {
        for x in 0..cols {
            terrain.set_state(x, y, CellState::Food).unwrap();
        }
    }
    terrain
}

#[test]
fn random_terrain_only_holds_known_states() {
    let mut terrain = Terrain::new(30, 40).unwrap();
    terrain.init_random(&mut rng());
    let total: usize = CellState::ALL.iter().map(|s| terrain.count(*s)).sum();
    assert_eq!(total, 30 * 40);
    assert_eq!(terrain.cells().len(), 30 * 40);
}

#[test]
fn toggling_four_times_is_identity() {
    let mut terrain = Terrain::new(3, 3).unwrap();
    terrain.init_random(&mut rng());
    let viewport = Viewport::new(300.0, 300.0);
    for y in 0..3 {
        for x in 0..3 {
            let original = terrain.state(x, y).unwrap();
            let (px, py) = (x as i32 * 100 + 50, y as i32 * 100 + 50);
            for _ in 0..4 {
                assert!(terrain.toggle_state(px, py, &viewport).is_some());
            }
            assert_eq!(terrain.state(x, y).unwrap(), original);
        }
    }
}

#[test]
fn toggle_follows_cycle() {
    let mut terrain = Terrain::new(1, 1).unwrap();
    let visited: Vec<_> = (0..4).map(|_| terrain.toggle_cell(0, 0).unwrap()).collect();
    assert_eq!(
        visited,
        vec![
            CellState::Fertile,
            CellState::Obstacle,
            CellState::Food,
            CellState::Empty
        ]
    );
}

#[test]
fn toggle_outside_viewport_is_ignored() {
    let mut terrain = Terrain::new(2, 2).unwrap();
    let viewport = Viewport::new(100.0, 100.0);
    assert_eq!(terrain.toggle_state(150, 10, &viewport), None);
    assert_eq!(terrain.toggle_state(10, -3, &viewport), None);
    assert_eq!(terrain.count(CellState::Empty), 4);
}

#[test]
fn out_of_range_access_fails_fast() {
    let mut terrain = Terrain::new(2, 3).unwrap();
    let expected = TerrainError::OutOfBounds {
        x: 3,
        y: 0,
        cols: 3,
        rows: 2,
    };
    assert_eq!(terrain.state(3, 0).unwrap_err(), expected);
    assert!(terrain.set_state(0, 2, CellState::Food).is_err());
    assert!(terrain.has_prey_at(5, 5).is_err());
    assert!(terrain.remove_prey(3, 1).is_err());
    assert!(terrain.toggle_cell(0, 2).is_err());
}

#[test]
fn has_prey_at_reports_food_cells() {
    let mut terrain = Terrain::new(1, 4).unwrap();
    for (x, state) in CellState::ALL.into_iter().enumerate() {
        terrain.set_state(x, 0, state).unwrap();
    }
    let hits: Vec<bool> = (0..4).map(|x| terrain.has_prey_at(x, 0).unwrap()).collect();
    assert_eq!(hits, vec![false, false, false, true]);
}

#[test]
fn remove_prey_only_consumes_food() {
    for state in [CellState::Empty, CellState::Fertile, CellState::Obstacle] {
        let mut terrain = Terrain::new(1, 1).unwrap();
        terrain.set_state(0, 0, state).unwrap();
        terrain.remove_prey(0, 0).unwrap();
        assert_eq!(terrain.state(0, 0).unwrap(), state);
    }
    let mut terrain = single_food_cell();
    terrain.remove_prey(0, 0).unwrap();
    assert_eq!(terrain.state(0, 0).unwrap(), CellState::Fertile);
}

#[test]
fn terrain_update_without_regrowth_changes_nothing() {
    let mut terrain = Terrain::new(8, 8).unwrap();
    terrain.init_random(&mut rng());
    let before = terrain.cells().to_vec();
    assert_eq!(terrain.update(&mut rng()), 0);
    assert_eq!(terrain.cells(), before.as_slice());
}

#[test]
fn prey_eats_food_on_single_cell() {
    let mut terrain = single_food_cell();
    let mut prey = Prey::new(Position::new(0.5, 0.5)).with_energy(10.0);

    prey.update(1.0, &mut terrain, &mut rng());

    assert_eq!(prey.energy(), 28.0);
    assert_eq!(terrain.state(0, 0).unwrap(), CellState::Fertile);
}

#[test]
fn predator_hunts_on_single_cell() {
    let mut terrain = single_food_cell();
    let mut predator = Predator::new(Position::new(0.5, 0.5)).with_energy(10.0);

    predator.update(1.0, &mut terrain, &mut rng());

    assert_eq!(predator.energy(), 57.0);
    assert_eq!(terrain.state(0, 0).unwrap(), CellState::Fertile);
}

#[test]
fn feeding_gain_is_net_of_decay() {
    let dt = 0.5;
    let mut terrain = all_food(3, 3);
    let mut prey = Prey::new(Position::new(1.5, 1.5));
    prey.update(dt, &mut terrain, &mut rng());
    assert_eq!(prey.energy(), 100.0 + 20.0 - dt * 2.0);
    assert_eq!(terrain.count(CellState::Fertile), 1);

    let mut terrain = all_food(3, 3);
    let mut predator = Predator::new(Position::new(1.5, 1.5));
    predator.update(dt, &mut terrain, &mut rng());
    assert_eq!(predator.energy(), 100.0 + 50.0 - dt * 3.0);
    assert_eq!(terrain.count(CellState::Food), 8);
}

#[test]
fn agents_without_food_only_lose_energy() {
    let mut terrain = Terrain::new(4, 4).unwrap();
    let mut prey = Prey::new(Position::new(2.0, 2.0));
    let mut predator = Predator::new(Position::new(2.0, 2.0));
    let mut rng = rng();
    prey.update(2.0, &mut terrain, &mut rng);
    predator.update(2.0, &mut terrain, &mut rng);
    assert_eq!(prey.energy(), 96.0);
    assert_eq!(predator.energy(), 94.0);
}

#[test]
fn zero_dt_still_moves() {
    let mut terrain = Terrain::new(10, 10)
        .unwrap()
        .with_boundary(BoundaryPolicy::Unbounded);
    let start = Position::new(5.0, 5.0);
    let mut prey = Prey::new(start);
    prey.update(0.0, &mut terrain, &mut rng());
    let moved = prey.position();
    let distance = ((moved.x - start.x).powi(2) + (moved.y - start.y).powi(2)).sqrt();
    assert!((distance - 0.5).abs() < 1e-4, "moved {distance}");
    assert_eq!(prey.energy(), 100.0);
}

#[test]
fn off_grid_agents_leave_terrain_alone() {
    let mut terrain = single_food_cell().with_boundary(BoundaryPolicy::Unbounded);
    let mut predator = Predator::new(Position::new(-10.0, -10.0));
    predator.update(1.0, &mut terrain, &mut rng());
    assert_eq!(predator.energy(), 97.0);
    assert_eq!(terrain.state(0, 0).unwrap(), CellState::Food);
}

#[test]
fn clamped_agents_never_leave_the_grid() {
    let mut terrain = Terrain::new(2, 2).unwrap();
    let mut predator = Predator::new(Position::new(0.1, 1.9));
    let mut rng = rng();
    for _ in 0..500 {
        predator.update(0.0, &mut terrain, &mut rng);
        assert!(terrain.cell_under(predator.position()).is_some());
    }
}

#[test]
fn wrapped_agents_never_leave_the_grid() {
    let mut terrain = Terrain::new(3, 2)
        .unwrap()
        .with_boundary(BoundaryPolicy::Wrap);
    let mut prey = Prey::new(Position::new(1.0, 1.0));
    let mut rng = rng();
    for _ in 0..500 {
        prey.update(0.0, &mut terrain, &mut rng);
        assert!(terrain.cell_under(prey.position()).is_some());
    }
}

#[test]
fn is_alive_tracks_energy_sign() {
    assert!(Prey::new(Position::default()).is_alive());
    assert!(Prey::new(Position::default()).with_energy(0.001).is_alive());
    assert!(!Prey::new(Position::default()).with_energy(0.0).is_alive());
    assert!(!Predator::new(Position::default()).with_energy(-4.0).is_alive());

    let mut terrain = Terrain::new(2, 2).unwrap();
    let mut prey = Prey::new(Position::new(1.0, 1.0)).with_energy(3.0);
    let mut rng = rng();
    prey.update(1.0, &mut terrain, &mut rng);
    assert!(prey.is_alive());
    prey.update(1.0, &mut terrain, &mut rng);
    assert_eq!(prey.energy(), -1.0);
    assert!(!prey.is_alive());
}

#[test]
fn first_agent_on_a_cell_gets_the_food() {
    let mut terrain = single_food_cell();
    let mut population = Population::new().with_death_policy(DeathPolicy::Keep);
    population.add_predator(0.5, 0.5);
    population.add_predator(0.5, 0.5);

    let report = population.update(1.0, &mut terrain, &mut rng()).unwrap();

    let energies: Vec<f32> = population.iter().map(|a| a.energy()).collect();
    assert_eq!(energies, vec![147.0, 97.0]);
    assert_eq!(report.food_eaten, 1);
    assert_eq!(terrain.state(0, 0).unwrap(), CellState::Fertile);
}

#[test]
fn add_prey_appends_one_agent_at_position() {
    let mut population = Population::new();
    population.add_prey(3.0, 4.0);

    assert_eq!(population.len(), 1);
    let agent = population.iter().next().unwrap();
    assert_eq!(agent.kind(), AgentKind::Prey);
    assert_eq!(agent.energy(), 100.0);
    let position = agent.position();
    assert_eq!((position.x as usize, position.y as usize), (3, 4));
}

#[test]
fn random_seeding_counts_each_species() {
    let terrain = Terrain::new(50, 50).unwrap();
    let mut population = Population::new();
    population.init_random(20, 10, &terrain, &mut rng());

    assert_eq!(population.len(), 30);
    assert_eq!(population.count(AgentKind::Prey), 20);
    assert_eq!(population.count(AgentKind::Predator), 10);
    for agent in population.iter() {
        assert_eq!(agent.energy(), 100.0);
        assert!(terrain.cell_under(agent.position()).is_some());
    }
}

#[test]
fn population_updates_every_agent_in_order() {
    let mut terrain = Terrain::new(20, 20).unwrap();
    let mut population = Population::new();
    population.init_random(5, 5, &terrain, &mut rng());

    let report = population.update(0.25, &mut terrain, &mut rng()).unwrap();

    assert_eq!(report.updated, 10);
    assert_eq!(report.pruned, 0);
    for agent in population.iter() {
        let expected = match agent.kind() {
            AgentKind::Prey => 99.5,
            AgentKind::Predator => 99.25,
        };
        assert_eq!(agent.energy(), expected);
    }
}
