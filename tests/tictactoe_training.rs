//! End-to-end training runs on tic-tac-toe.

use cfr_engine::cfr::evaluation::{
    evaluate_against, exploitability, outcome_distribution, AveragePolicy, GreedyPolicy, Policy,
    RandomPolicy,
};
use cfr_engine::cfr::strategy::argmax;
use cfr_engine::cfr::{CfrConfig, CfrSolver, Checkpoint, Game, TrainingConfig};
use cfr_engine::games::tictactoe::TicTacToe;

const EMPTY_BOARD: &str = "---------";

fn trained(config: CfrConfig, iterations: u64) -> CfrSolver<TicTacToe> {
    let mut solver = CfrSolver::new(TicTacToe::default(), config).unwrap();
    solver.train(iterations).unwrap();
    solver
}

#[test]
fn test_vanilla_strategies_are_distributions() {
    let solver = trained(CfrConfig::vanilla(), 6);
    assert_eq!(solver.average_strategy(EMPTY_BOARD).unwrap().len(), 9);

    // Forced moves have probability one.
    for key in solver.info_set_keys() {
        for strategy in [
            solver.current_strategy(&key).unwrap(),
            solver.average_strategy(&key).unwrap(),
        ] {
            assert!(strategy.iter().all(|&p| p >= 0.0), "{}: {:?}", key, strategy);
            assert!((strategy.iter().sum::<f64>() - 1.0).abs() < 1e-9, "{}", key);
            if strategy.len() == 1 {
                assert_eq!(strategy, vec![1.0]);
            }
        }
    }
}

#[test]
fn test_vanilla_converges_to_a_draw() {
    let solver = trained(CfrConfig::vanilla(), 400);
    let game = solver.game();
    let store = solver.store();

    let gap = exploitability(game, store).unwrap();
    assert!(gap < 0.05, "exploitability {}", gap);

    let strategy = solver.average_strategy(EMPTY_BOARD).unwrap();
    let best = argmax(&strategy).unwrap();
    assert!(
        [0, 2, 4, 6, 8].contains(&best),
        "opening {} from {:?}",
        best,
        strategy
    );

    let average = AveragePolicy::new(store);
    let profile: [&dyn Policy<TicTacToe>; 2] = [&average, &average];
    let outcome = outcome_distribution(game, &profile).unwrap();
    assert!(outcome.draw > 0.9, "{:?}", outcome);
}

#[test]
fn test_pruning_does_not_change_vanilla_training() {
    let pruned = trained(CfrConfig::vanilla(), 30);
    let full = trained(CfrConfig::vanilla().with_pruning(false), 30);

    // The full walk also creates entries nobody can reach; those stay empty.
    for (key, node) in full.store().iter() {
        match pruned.store().get(key) {
            Some(kept) => {
                assert_eq!(kept.regret_sum(), node.regret_sum(), "{}", key);
                assert_eq!(kept.strategy_sum(), node.strategy_sum(), "{}", key);
            }
            None => {
                assert!(node.regret_sum().iter().all(|&r| r == 0.0), "{}", key);
                assert!(node.strategy_sum().iter().all(|&w| w == 0.0), "{}", key);
            }
        }
    }
    assert!(pruned.num_info_sets() <= full.num_info_sets());
}

#[test]
fn test_cfr_plus_self_play_draws() {
    let solver = trained(CfrConfig::fast(), 100);
    let game = solver.game();
    let store = solver.store();

    let greedy = GreedyPolicy::new(AveragePolicy::new(store));
    let greedy_profile: [&dyn Policy<TicTacToe>; 2] = [&greedy, &greedy];
    let outcome = outcome_distribution(game, &greedy_profile).unwrap();
    assert_eq!(outcome.draw, 1.0, "{:?}", outcome);

    let average = AveragePolicy::new(store);
    let profile: [&dyn Policy<TicTacToe>; 2] = [&average, &average];
    let outcome = outcome_distribution(game, &profile).unwrap();
    assert!(outcome.draw > 0.8, "{:?}", outcome);

    let gap = exploitability(game, store).unwrap();
    assert!(gap < 0.1, "exploitability {}", gap);

    let report = evaluate_against(game, &greedy, &RandomPolicy, 400, 7).unwrap();
    assert!(report.wins > report.losses, "{:?}", report);
    assert!(report.losses <= report.games / 20, "{:?}", report);
}

#[test]
fn test_outcome_sampling_is_reproducible() {
    let config = CfrConfig::outcome_sampling().with_seed(2024);
    let a = trained(config.clone(), 2_000);
    let b = trained(config, 2_000);

    let a_json = serde_json::to_string(&a.store().export()).unwrap();
    let b_json = serde_json::to_string(&b.store().export()).unwrap();
    assert_eq!(a_json, b_json);
    assert_eq!(a.stats().cumulative_utility, b.stats().cumulative_utility);

    let c = trained(CfrConfig::outcome_sampling().with_seed(2025), 2_000);
    assert_ne!(a.store().export(), c.store().export());
}

#[test]
fn test_outcome_sampling_beats_random() {
    let solver = trained(CfrConfig::outcome_sampling().with_seed(3), 20_000);
    let report = solver.evaluate(400, 11).unwrap();
    assert!(report.wins > report.losses, "{:?}", report);
}

#[test]
fn test_two_by_two_is_a_first_player_win() {
    // Any two cells of a 2x2 board form a line, so X always wins.
    let mut solver = CfrSolver::new(TicTacToe::new(2), CfrConfig::vanilla()).unwrap();
    solver.train(20).unwrap();
    // Empty board, four openings, twelve replies.
    assert_eq!(solver.num_info_sets(), 1 + 4 + 12);
    assert!((solver.stats().average_utility(0) - 1.0).abs() < 1e-9);
    assert!((solver.stats().average_utility(1) + 1.0).abs() < 1e-9);
    assert!(solver.exploitability().unwrap().abs() < 1e-9);
}

#[test]
fn test_checkpoint_round_trip_and_resume() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ttt.json");

    let config = CfrConfig::outcome_sampling().with_seed(5);
    let solver = trained(config, 500);
    solver.checkpoint().save_json(&path).unwrap();

    let loaded = Checkpoint::load_json(&path).unwrap();
    assert_eq!(loaded.game, "tictactoe-3x3");
    assert_eq!(loaded.iteration, 500);
    assert_eq!(loaded.to_store(), *solver.store());

    let mut a = CfrSolver::from_checkpoint(TicTacToe::default(), loaded.clone()).unwrap();
    let mut b = CfrSolver::from_checkpoint(TicTacToe::default(), loaded.clone()).unwrap();
    a.train(100).unwrap();
    b.train(100).unwrap();
    assert_eq!(a.iteration(), 600);
    assert_eq!(a.store().export(), b.store().export());

    let other_board = CfrSolver::from_checkpoint(TicTacToe::new(4), loaded);
    assert!(other_board.is_err());
}

#[test]
fn test_schedule_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.json");
    let json = format!(
        r#"{{
            "iterations": 300,
            "report_interval": 100,
            "evaluation_interval": 150,
            "evaluation_games": 50,
            "checkpoint_interval": 300,
            "checkpoint_path": {:?},
            "cfr": {{ "variant": "outcome_sampling", "seed": 1 }}
        }}"#,
        path.to_str().unwrap()
    );
    let schedule = TrainingConfig::from_json_str(&json).unwrap();

    let game = TicTacToe::new(schedule.board_dim);
    let mut solver = CfrSolver::new(game, schedule.cfr.clone()).unwrap();
    let stats = solver.train_with_schedule(&schedule).unwrap();
    assert_eq!(stats.iterations, 300);
    assert_eq!(stats.evaluations.len(), 2);
    assert_eq!(stats.evaluations[0].report.games, 50);

    let saved = Checkpoint::load_json(&path).unwrap();
    assert_eq!(saved.iteration, 300);
    assert_eq!(saved.game, solver.game().name());
}
