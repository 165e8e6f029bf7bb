use blackjack::env_config;
use blackjack::solve::solve_all;
use blackjack::storage::{BinaryStore, SolverStore};
use blackjack::types::{Card, SolveConfig};

struct Args {
    num_decks: u32,
    missing: Vec<Card>,
    out_dir: String,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        num_decks: env_config::num_decks_from_env(),
        missing: Vec::new(),
        out_dir: "data/strategy_tables".to_string(),
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--decks" => {
                i += 1;
                if i < args.len() {
                    parsed.num_decks = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --decks value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--missing" => {
                i += 1;
                if i < args.len() {
                    for part in args[i].split(',') {
                        let card: Card = part.trim().parse().unwrap_or_else(|_| {
                            eprintln!("Invalid --missing card: {}", part);
                            std::process::exit(1);
                        });
                        parsed.missing.push(card);
                    }
                }
            }
            "--out" => {
                i += 1;
                if i < args.len() {
                    parsed.out_dir = args[i].clone();
                }
            }
            "--help" | "-h" => {
                println!("Usage: blackjack-solve [--decks N] [--missing C,C,...] [--out DIR]");
                println!();
                println!("Options:");
                println!("  --decks N          Number of decks in the shoe (default: 1, or BLACKJACK_DECKS)");
                println!("  --missing C,C,...  Card values known to be out of play (1=Ace, 10=ten/face)");
                println!("  --out DIR          Output directory (default: data/strategy_tables)");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }
    if parsed.num_decks == 0 {
        eprintln!("--decks must be at least 1");
        std::process::exit(1);
    }
    parsed
}

fn main() {
    env_config::init_base_path();
    let args = parse_args();
    env_config::init_rayon_threads();

    println!("Blackjack exact solver");

    let mut config = SolveConfig::new(args.num_decks);
    config.missing_cards = args.missing;

    let store = BinaryStore::new(&args.out_dir);
    let report = match solve_all(&config, &store) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Solve failed: {}", e);
            std::process::exit(1);
        }
    };

    let entries = match store.fetch_strategy_table() {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Failed to read back strategy table: {}", e);
            std::process::exit(1);
        }
    };
    match store.export_strategy_json(&entries) {
        Ok(path) => println!("Exported JSON table to {}", path.display()),
        Err(e) => {
            eprintln!("JSON export failed: {}", e);
            std::process::exit(1);
        }
    }

    println!(
        "Done: {} dealer rows, {} player records, {} strategy rows in {:.2}s",
        report.dealer_rows, report.player_records, report.strategy_entries, report.elapsed_secs
    );
}
