use std::time::{SystemTime, UNIX_EPOCH};

use sudoku_core::{Board, Difficulty, Pos};
use sudoku_gen::{GenEvent, GenEventKind, GenObserver, GenerateConfig, generate_ex};

#[cfg(feature = "telemetry-subscriber")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sudoku_solver=info,sudoku_gen=info,sudoku_cli=info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(not(feature = "telemetry-subscriber"))]
fn init_tracing() {}

fn usage() -> &'static str {
    "sudoku-cli\n\
\n\
USAGE:\n\
  sudoku-cli generate [--k <2|3|4|5>] [--difficulty <easy|medium|hard|expert>]\n\
                      [--seed <N>] [--stats] [--progress]\n\
\n\
EXAMPLES:\n\
  sudoku-cli generate --k 3 --difficulty medium --seed 42\n\
  sudoku-cli generate --k 2 --difficulty easy --stats\n"
}

fn parse_difficulty(s: &str) -> Option<Difficulty> {
    match s {
        "easy" => Some(Difficulty::Easy),
        "medium" => Some(Difficulty::Medium),
        "hard" => Some(Difficulty::Hard),
        "expert" => Some(Difficulty::Expert),
        _ => None,
    }
}

fn parse_arg_value(args: &[String], i: &mut usize) -> Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| "missing value".to_string())
}

struct ProgressPrinter;

impl GenObserver for ProgressPrinter {
    fn on_event(&mut self, event: &GenEvent<'_>) {
        match event.kind {
            GenEventKind::Phase1Complete
            | GenEventKind::Phase2Complete
            | GenEventKind::Phase3Complete => {
                println!(
                    "phase {} complete: {} cells removed so far",
                    event.phase, event.cells_removed
                );
            }
            _ => {}
        }
    }
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err}\n\n{}", usage());
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        return Err("missing command".to_string());
    }

    let cmd = args[1].as_str();
    let mut k: u8 = 3;
    let mut difficulty = Difficulty::Medium;
    let mut seed: Option<u64> = None;
    let mut stats = false;
    let mut progress = false;

    let mut i = 2usize;
    while i < args.len() {
        match args[i].as_str() {
            "--k" | "-k" => {
                let v = parse_arg_value(&args, &mut i)?;
                k = v.parse::<u8>().map_err(|_| "invalid --k".to_string())?;
            }
            "--difficulty" | "-d" => {
                let v = parse_arg_value(&args, &mut i)?;
                difficulty =
                    parse_difficulty(&v).ok_or_else(|| "invalid --difficulty".to_string())?;
            }
            "--seed" | "-s" => {
                let v = parse_arg_value(&args, &mut i)?;
                seed = Some(v.parse::<u64>().map_err(|_| "invalid --seed".to_string())?);
            }
            "--stats" => {
                stats = true;
            }
            "--progress" => {
                progress = true;
            }
            "--help" | "-h" => {
                println!("{}", usage());
                return Ok(());
            }
            other => {
                return Err(format!("unknown arg: {other}"));
            }
        }
        i += 1;
    }

    match cmd {
        "generate" => {
            let seed = seed.unwrap_or_else(|| {
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or(0)
            });

            let mut board = Board::new(k).map_err(|e| e.to_string())?;
            let config = GenerateConfig::new(difficulty, seed);

            let report = if progress {
                let mut printer = ProgressPrinter;
                generate_ex(&mut board, &config, Some(&mut printer))
            } else {
                generate_ex(&mut board, &config, None)
            }
            .map_err(|e| e.to_string())?;

            print_board(&board).map_err(|e| e.to_string())?;
            println!(
                "difficulty={difficulty} seed={seed} clues={} removed={}",
                report.clues, report.removed
            );
            if stats {
                let s = report.stats;
                println!(
                    "attempts={} ac3_calls={} values_eliminated={} cells_assigned={} \
                     backtracks={} max_depth={} time_ms={}",
                    report.attempts,
                    s.ac3_calls,
                    s.values_eliminated,
                    s.cells_assigned,
                    s.total_backtracks,
                    s.max_depth,
                    s.time_ms
                );
            }
        }
        _ => {
            return Err(format!("unknown command: {cmd}"));
        }
    }

    Ok(())
}

fn print_board(board: &Board) -> Result<(), sudoku_core::CoreError> {
    let n = board.size();
    let width: usize = if n > 9 { 2 } else { 1 };
    for r in 0..n {
        let mut line = String::new();
        for c in 0..n {
            if c > 0 {
                line.push(' ');
            }
            let v = board.get(Pos::new(r, c))?;
            if v == 0 {
                line.push_str(&format!("{:>width$}", ".", width = width));
            } else {
                line.push_str(&format!("{v:>width$}"));
            }
        }
        println!("{line}");
    }
    Ok(())
}
