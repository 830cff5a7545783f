/// Preview: play through a scenario set in the terminal.
///
/// Usage: preview [--data <dir>] [--lexicon <file.ron>] [--seed <n>] [--top <n>]
///
/// Commands:
///   a / b      take the first or second choice
///   metrics    show the current metric values
///   bias       show the largest cumulative shifts so far
///   reset      start over
///   help       list commands
///   quit       exit

use mandala_engine::core::session::{Debrief, Progress, Session, DEFAULT_BIAS_TOP_N};
use mandala_engine::core::visual::ParticleStyle;
use mandala_engine::schema::metric::MetricVector;
use std::io::{self, BufRead, Write};
use std::process;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = "mandala_engine=warn".parse() {
        filter = filter.add_directive(d);
    }
    fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let mut data_dir = "data".to_string();
    let mut lexicon = None;
    let mut seed: u64 = 42;
    let mut top = DEFAULT_BIAS_TOP_N;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data" if i + 1 < args.len() => {
                i += 1;
                data_dir = args[i].clone();
            }
            "--lexicon" if i + 1 < args.len() => {
                i += 1;
                lexicon = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--top" if i + 1 < args.len() => {
                i += 1;
                top = args[i].parse().unwrap_or(DEFAULT_BIAS_TOP_N);
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut builder = Session::builder().seed(seed).data_dir(&data_dir).bias_top_n(top);
    if let Some(ref path) = lexicon {
        builder = builder.lexicon_path(path);
    }
    let mut session = builder.build().unwrap_or_else(|e| {
        eprintln!("Error: could not start session: {}", e);
        process::exit(1);
    });

    println!("Loaded {} scenarios from '{}'", session.scenarios().len(), data_dir);
    println!("Type 'help' for commands.\n");
    print_scenario(&session);
    println!("\n{}\n", session.oracle_line());

    let stdin = io::stdin();
    loop {
        print!("mandala> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }

        match line.trim().to_lowercase().as_str() {
            "" => {}
            "quit" | "exit" | "q" => break,
            "help" => print_commands(),
            "metrics" => print_metrics(session.metrics()),
            "bias" => {
                for shift in session.summarize_bias(top) {
                    println!("  {:<15} {:+.2}", shift.key.label(), shift.total);
                }
            }
            "reset" => {
                session.reset();
                println!("\n{}\n", session.oracle_line());
                print_scenario(&session);
            }
            cmd @ ("a" | "b") => {
                if session.is_finished() {
                    println!("The session is over. Type 'reset' to play again.");
                    continue;
                }
                let index = if cmd == "a" { 0 } else { 1 };
                if let Err(e) = session.apply_choice(index) {
                    println!("Error: {}", e);
                    continue;
                }
                println!("\n{}\n", session.oracle_line());
                match session.advance() {
                    Progress::Next(_) => print_scenario(&session),
                    Progress::Finished => print_debrief(&session.debrief()),
                }
            }
            other => println!("Unknown command '{}'. Type 'help'.", other),
        }
    }
}

fn print_scenario(session: &Session) {
    let Some(scenario) = session.current_scenario() else {
        return;
    };
    println!(
        "[{}/{}] {}",
        session.scenario_index() + 1,
        session.scenarios().len(),
        scenario.title
    );
    println!("{}", scenario.description);
    println!("  A. {}", scenario.choices[0].label);
    println!("  B. {}", scenario.choices[1].label);
}

fn print_metrics(metrics: &MetricVector) {
    for (key, value) in metrics.iter() {
        let filled = (value * 20.0).round() as usize;
        println!(
            "  {:<15} {:>3}% {}{}",
            key.label(),
            (value * 100.0).round() as u32,
            "#".repeat(filled),
            ".".repeat(20 - filled)
        );
    }
    let style = ParticleStyle::from_metrics(metrics);
    println!("  particle colour {}", style.css_color());
}

fn print_debrief(debrief: &Debrief) {
    println!("=== Debrief ===");
    println!("You made {} decisions.\n", debrief.turns);
    println!("Where things stand:");
    print_metrics(&debrief.metrics);
    println!("\nLargest shifts:");
    for shift in &debrief.top_shifts {
        println!("  {:<15} {:+}", shift.key.label(), (shift.total * 100.0) as i32);
    }
    println!("\nWhich values did you protect, and which did you give up?");
    println!("Type 'reset' to play again or 'quit' to leave.");
}

fn print_usage() {
    println!("Usage: preview [--data <dir>] [--lexicon <file.ron>] [--seed <n>] [--top <n>]");
}

fn print_commands() {
    println!("Commands:");
    println!("  a / b      take the first or second choice");
    println!("  metrics    show the current metric values");
    println!("  bias       show the largest cumulative shifts so far");
    println!("  reset      start over");
    println!("  help       list commands");
    println!("  quit       exit");
}
