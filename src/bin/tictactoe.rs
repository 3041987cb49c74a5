//! Tic-tac-toe CFR trainer.
//!
//! Usage:
//!   cargo run --release --bin tictactoe -- train --iterations 200 --cfr-plus --linear --checkpoint ttt.json
//!   cargo run --release --bin tictactoe -- evaluate --checkpoint ttt.json
//!   cargo run --release --bin tictactoe -- play --checkpoint ttt.json --human-seat 1
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` for more detail.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use cfr_engine::cfr::evaluation::{self, AveragePolicy, GreedyPolicy, Policy, RandomPolicy};
use cfr_engine::cfr::{CfrSolver, CfrVariant, Checkpoint, Game, TrainingConfig};
use cfr_engine::games::tictactoe::{Placement, TicTacToe};

#[derive(Parser)]
#[command(name = "tictactoe")]
#[command(version, about = "Train and play tic-tac-toe strategies with CFR", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a strategy
    Train(TrainArgs),

    /// Evaluate a trained strategy
    Evaluate(EvaluateArgs),

    /// Play against a trained strategy
    Play(PlayArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantArg {
    Vanilla,
    OutcomeSampling,
}

impl From<VariantArg> for CfrVariant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Vanilla => CfrVariant::Vanilla,
            VariantArg::OutcomeSampling => CfrVariant::OutcomeSampling,
        }
    }
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Training configuration JSON file (flags override it)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// CFR variant
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Number of iterations
    #[arg(long, short = 'i')]
    iterations: Option<u64>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Board side length
    #[arg(long)]
    board_dim: Option<usize>,

    /// Exploration probability for outcome sampling
    #[arg(long)]
    exploration: Option<f64>,

    /// Floor regrets at zero (CFR+)
    #[arg(long)]
    cfr_plus: bool,

    /// Weight strategy sums by iteration
    #[arg(long)]
    linear: bool,

    /// Where to write checkpoints (also written once training ends)
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Write a checkpoint every N iterations
    #[arg(long)]
    checkpoint_interval: Option<u64>,

    /// Continue from a checkpoint
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Evaluate against random play every N iterations
    #[arg(long)]
    eval_interval: Option<u64>,

    /// Games per evaluation
    #[arg(long)]
    eval_games: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Checkpoint to evaluate
    #[arg(long)]
    checkpoint: PathBuf,

    /// Board side length the checkpoint was trained on
    #[arg(long, default_value_t = 3)]
    board_dim: usize,

    /// Games against the random baseline
    #[arg(long, short = 'g', default_value_t = 1000)]
    games: usize,

    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Checkpoint to play against
    #[arg(long)]
    checkpoint: PathBuf,

    /// Board side length the checkpoint was trained on
    #[arg(long, default_value_t = 3)]
    board_dim: usize,

    /// Your seat: 0 plays X and moves first, 1 plays O
    #[arg(long, default_value_t = 0)]
    human_seat: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Train(args) => train(args),
        Commands::Evaluate(args) => evaluate(args),
        Commands::Play(args) => play(args),
    }
}

fn train(args: TrainArgs) -> Result<()> {
    let mut schedule = match &args.config {
        Some(path) => TrainingConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TrainingConfig::default(),
    };

    if let Some(variant) = args.variant {
        schedule.cfr.variant = variant.into();
    }
    if let Some(iterations) = args.iterations {
        schedule.iterations = iterations;
    }
    if let Some(seed) = args.seed {
        schedule.cfr.seed = Some(seed);
    }
    if let Some(dim) = args.board_dim {
        schedule.board_dim = dim;
    }
    if let Some(exploration) = args.exploration {
        schedule.cfr.exploration = exploration;
    }
    schedule.cfr.use_cfr_plus |= args.cfr_plus;
    schedule.cfr.use_linear_averaging |= args.linear;
    if args.checkpoint.is_some() {
        schedule.checkpoint_path = args.checkpoint.clone();
    }
    if args.checkpoint_interval.is_some() {
        schedule.checkpoint_interval = args.checkpoint_interval;
    }
    if args.eval_interval.is_some() {
        schedule.evaluation_interval = args.eval_interval;
    }
    if let Some(games) = args.eval_games {
        schedule.evaluation_games = games;
    }
    schedule.validate()?;

    let game = board(schedule.board_dim)?;
    let mut solver = CfrSolver::new(game, schedule.cfr.clone())?;
    if let Some(path) = &args.resume {
        solver.resume(Checkpoint::load_json(path)?)?;
    }

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(schedule.iterations);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} iterations ({per_sec})")?
                .progress_chars("=>-"),
        );
        pb
    };
    solver.train_with_progress(&schedule, |_| progress.inc(1))?;
    progress.finish_and_clear();

    if let Some(path) = &schedule.checkpoint_path {
        solver.checkpoint().save_json(path)?;
    }

    let stats = solver.stats();
    println!("Variant:        {}", solver.config().variant);
    println!("Iterations:     {}", stats.iterations);
    println!("Info sets:      {}", stats.info_sets);
    println!("Elapsed:        {:.2}s ({:.1} it/s)", stats.elapsed_seconds, stats.iterations_per_second);
    println!("Mean value (X): {:+.4}", stats.average_utility(0));

    let root = solver.game().initial_state();
    let key = solver.game().information_set_key(&root, 0);
    if let Some(strategy) = solver.store().average_strategy_by_action(&key) {
        println!("\nOpening strategy:");
        for (cell, prob) in strategy {
            println!("  cell {:>2}: {:.4}", cell, prob);
        }
    }

    if schedule.board_dim <= 3 {
        println!("\nExploitability: {:.6}", solver.exploitability()?);
    }

    let report = solver.evaluate(schedule.evaluation_games, schedule.cfr.seed.unwrap_or(0))?;
    println!(
        "Vs random ({} games): {:.1}% won, {:.1}% drawn, {:.1}% lost",
        report.games,
        100.0 * report.win_rate(),
        100.0 * report.draw_rate(),
        100.0 * report.loss_rate()
    );
    Ok(())
}

/// Largest board the binary will build.
const MAX_BOARD_DIM: usize = 4;

fn board(dim: usize) -> Result<TicTacToe> {
    if !(1..=MAX_BOARD_DIM).contains(&dim) {
        bail!("board dimension {} is not supported (expected 1..={})", dim, MAX_BOARD_DIM);
    }
    Ok(TicTacToe::new(dim))
}

fn load(path: &Path, game: &TicTacToe) -> Result<Checkpoint> {
    let checkpoint = Checkpoint::load_json(path)?;
    checkpoint.ensure_game(&game.name())?;
    Ok(checkpoint)
}

fn evaluate(args: EvaluateArgs) -> Result<()> {
    let game = board(args.board_dim)?;
    let checkpoint = load(&args.checkpoint, &game)?;
    let store = checkpoint.to_store();
    info!(
        "Evaluating {} checkpoint at iteration {}",
        checkpoint.variant, checkpoint.iteration
    );

    let average = AveragePolicy::new(&store);
    let report = evaluation::evaluate_against(&game, &average, &RandomPolicy, args.games, args.seed)?;
    println!(
        "Vs random ({} games): {} won, {} drawn, {} lost (mean {:+.4})",
        report.games, report.wins, report.draws, report.losses, report.mean_utility
    );

    let greedy = GreedyPolicy::new(AveragePolicy::new(&store));
    let greedy_profile: [&dyn Policy<TicTacToe>; 2] = [&greedy, &greedy];
    let outcome = evaluation::outcome_distribution(&game, &greedy_profile)?;
    println!(
        "Greedy self-play: X wins {:.0}%, O wins {:.0}%, draw {:.0}%",
        100.0 * outcome.wins[0],
        100.0 * outcome.wins[1],
        100.0 * outcome.draw
    );

    let profile: [&dyn Policy<TicTacToe>; 2] = [&average, &average];
    let outcome = evaluation::outcome_distribution(&game, &profile)?;
    println!(
        "Average self-play: X wins {:.4}, O wins {:.4}, draw {:.4}",
        outcome.wins[0], outcome.wins[1], outcome.draw
    );

    if args.board_dim <= 3 {
        println!("Exploitability: {:.6}", evaluation::exploitability(&game, &store)?);
    }
    Ok(())
}

fn play(args: PlayArgs) -> Result<()> {
    if args.human_seat > 1 {
        bail!("--human-seat must be 0 or 1, got {}", args.human_seat);
    }
    let game = board(args.board_dim)?;
    let store = load(&args.checkpoint, &game)?.to_store();
    let opponent = GreedyPolicy::new(AveragePolicy::new(&store));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut state = game.initial_state();

    while let Some(player) = game.acting_player(&state) {
        println!("\n{}", state);
        let actions = game.legal_actions(&state);

        let action = if player == args.human_seat {
            print!("Your move (cell index): ");
            io::stdout().flush()?;
            let line = match lines.next() {
                Some(line) => line?,
                None => bail!("input closed"),
            };
            match line.trim().parse::<usize>() {
                Ok(cell) if actions.contains(&Placement(cell)) => Placement(cell),
                _ => {
                    println!("'{}' is not an empty cell", line.trim());
                    continue;
                }
            }
        } else {
            let probabilities = opponent.action_probabilities(&game, &state, &actions)?;
            let best = probabilities
                .iter()
                .position(|&p| p == 1.0)
                .context("greedy policy chose no action")?;
            println!("Engine plays {}", actions[best]);
            actions[best]
        };

        state = game.apply(&state, &action)?;
    }

    println!("\n{}", state);
    match game.utility(&state, args.human_seat)? {
        u if u > 0.0 => println!("You win!"),
        u if u < 0.0 => println!("You lose."),
        _ => println!("Draw."),
    }
    Ok(())
}
