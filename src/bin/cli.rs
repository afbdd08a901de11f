use clap::{Parser, Subcommand};
use coregambit::board::Position;
use coregambit::engine::Engine;
use coregambit::moves::perft::{perft, perft_divide};
use coregambit::status::game_status;
use indicatif::{ProgressBar, ProgressStyle};
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "coregambit", about = "A mailbox-based chess engine core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count leaf nodes at a fixed depth from a FEN position.
    Perft { fen: String, depth: u32 },
    /// Like `perft`, but prints the node count contributed by each root move.
    Divide { fen: String, depth: u32 },
    /// Run the search on a small fixed suite of positions and report timing.
    Bench,
    /// Search a position and print the chosen move.
    Play {
        fen: String,
        /// Either a ply depth (e.g. "6") or a time budget in milliseconds
        /// suffixed with "ms" (e.g. "2000ms").
        depth_or_time: String,
    },
}

fn main() {
    #[cfg(feature = "cli")]
    coregambit::logger::init_logging("logs/coregambit.log", "info");

    let cli = Cli::parse();
    match cli.command {
        Command::Perft { fen, depth } => cmd_perft(&fen, depth),
        Command::Divide { fen, depth } => cmd_divide(&fen, depth),
        Command::Bench => cmd_bench(),
        Command::Play { fen, depth_or_time } => cmd_play(&fen, &depth_or_time),
    }
}

fn load_position(fen: &str) -> Position {
    match Position::from_str(fen) {
        Ok(pos) => pos,
        Err(err) => {
            eprintln!("invalid FEN '{fen}': {err}");
            std::process::exit(1);
        }
    }
}

fn cmd_perft(fen: &str, depth: u32) {
    let mut pos = load_position(fen);
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} perft depth {msg} running...")
            .expect("valid progress template"),
    );
    spinner.set_message(depth.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let start = Instant::now();
    let nodes = perft(&mut pos, depth);
    let elapsed = start.elapsed();

    spinner.finish_and_clear();
    println!("nodes: {nodes}");
    println!("time: {:.3}s", elapsed.as_secs_f64());
}

fn cmd_divide(fen: &str, depth: u32) {
    let mut pos = load_position(fen);
    perft_divide(&mut pos, depth);
}

const BENCH_POSITIONS: [(&str, i32); 3] = [
    ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 6),
    ("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", 5),
    ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 6),
];

fn cmd_bench() {
    let mut engine = Engine::new();
    let start = Instant::now();
    let bar = ProgressBar::new(BENCH_POSITIONS.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} positions")
            .expect("valid progress template"),
    );

    for (fen, depth) in BENCH_POSITIONS {
        let mut pos = load_position(fen);
        let mv = engine.find_best_move(&mut pos, depth, Some(10_000));
        bar.inc(1);
        println!(
            "{fen}: depth {depth} -> {}",
            mv.map(|m| m.to_uci()).unwrap_or_else(|| "none".to_string())
        );
    }
    bar.finish_and_clear();
    println!("bench completed in {:.3}s", start.elapsed().as_secs_f64());
}

fn cmd_play(fen: &str, depth_or_time: &str) {
    let mut pos = load_position(fen);
    let mut engine = Engine::new();

    let status = game_status(&mut pos);
    if status != coregambit::status::GameStatus::InPlay {
        println!("game over: {status:?}");
        return;
    }

    let best = if let Some(ms) = depth_or_time.strip_suffix("ms") {
        let ms: u64 = ms.parse().unwrap_or_else(|_| {
            eprintln!("invalid time budget '{depth_or_time}'");
            std::process::exit(1);
        });
        engine.find_best_move(&mut pos, 64, Some(ms))
    } else {
        let depth: i32 = depth_or_time.parse().unwrap_or_else(|_| {
            eprintln!("invalid depth '{depth_or_time}'");
            std::process::exit(1);
        });
        engine.find_best_move(&mut pos, depth, None)
    };

    match best {
        Some(mv) => println!("bestmove {}", mv.to_uci()),
        None => println!("bestmove 0000"),
    }
}
