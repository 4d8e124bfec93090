//! settle-engine CLI
//!
//! Compute group balances and suggested transfers from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Balances and transfers for a group snapshot
//! settle-engine balances --input group.json
//!
//! # As JSON, spreading any residual proportionally
//! settle-engine balances --input group.json --format json --residual proportional
//!
//! # One member's view
//! settle-engine member --input group.json --member alice
//!
//! # Generate a random group for testing
//! settle-engine generate --members 8 --expenses 40
//! ```

use settle_engine::balance::GroupSnapshot;
use settle_engine::config::{EngineConfig, ResidualPolicy};
use settle_engine::core::ids::MemberId;
use settle_engine::service::{BalanceService, GetOptions};
use settle_engine::simulation::stress_test::{generate_random_group, GroupConfig};
use settle_engine::store::InMemoryStore;
use std::fmt::Display;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"settle-engine — balances and settlement suggestions for shared expenses

USAGE:
    settle-engine <COMMAND> [OPTIONS]

COMMANDS:
    balances    Compute member balances and suggested transfers
    member      Show one member's balance and transfers
    generate    Generate a random group snapshot (for testing)
    help        Show this message

OPTIONS (balances, member):
    --input <FILE>        Path to a JSON group snapshot
    --format <FORMAT>     Output format: text (default) or json
    --residual <POLICY>   Residual policy: first (default) or proportional

OPTIONS (member):
    --member <ID>         Member to report on

OPTIONS (generate):
    --members <N>         Number of members (default: 6)
    --expenses <N>        Number of expenses (default: 20)
    --settlements <N>     Number of settlements (default: 5)
    --output <FILE>       Write to file instead of stdout

The input snapshot may carry a "config" object, e.g.
    {{ "config": {{ "residual_policy": "proportional" }}, "group": ..., ... }}
Command-line flags take precedence over it.

EXAMPLES:
    settle-engine balances --input group.json
    settle-engine balances --input group.json --format json
    settle-engine member --input group.json --member alice
    settle-engine generate --members 10 --expenses 50 --output group.json"#
    );
}

fn fail(message: impl Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// The value following a flag, or exit.
fn flag_value(args: &[String], i: &mut usize, hint: &str) -> String {
    *i += 1;
    args.get(*i).cloned().unwrap_or_else(|| {
        fail(format!("{} requires {}", args[*i - 1], hint))
    })
}

fn flag_number(args: &[String], i: &mut usize) -> usize {
    let raw = flag_value(args, i, "a number");
    raw.parse()
        .unwrap_or_else(|_| fail(format!("{} requires a number, got '{}'", args[*i - 1], raw)))
}

/// Input file schema: a group snapshot plus optional engine settings.
#[derive(serde::Deserialize)]
struct InputFile {
    #[serde(default)]
    config: Option<EngineConfig>,
    #[serde(flatten)]
    snapshot: GroupSnapshot,
}

fn load_input(path: &str) -> InputFile {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("cannot read '{}': {}", path, e)));

    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format (see `settle-engine generate` for a full sample):");
        eprintln!(
            r#"{{
  "group": {{ "id": "trip", "currency": "USD" }},
  "members": [{{ "id": "alice", "group_id": "trip", "display_name": "Alice" }}],
  "expenses": [], "items": [], "payers": [], "splits": [], "settlements": []
}}"#
        );
        process::exit(1);
    })
}

#[derive(Default)]
struct ReportArgs {
    input: Option<String>,
    format: Option<String>,
    residual: Option<ResidualPolicy>,
    member: Option<String>,
}

fn parse_report_args(args: &[String], allow_member: bool) -> ReportArgs {
    let mut parsed = ReportArgs::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => parsed.input = Some(flag_value(args, &mut i, "a file path")),
            "--format" => {
                let format = flag_value(args, &mut i, "'text' or 'json'");
                if format != "text" && format != "json" {
                    fail(format!("unknown format '{}'", format));
                }
                parsed.format = Some(format);
            }
            "--residual" => {
                let raw = flag_value(args, &mut i, "'first' or 'proportional'");
                parsed.residual = Some(raw.parse().unwrap_or_else(|e: String| fail(e)));
            }
            "--member" if allow_member => {
                parsed.member = Some(flag_value(args, &mut i, "a member id"))
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }
    parsed
}

/// Load the snapshot into a store and build a service over it.
fn service_for(args: &ReportArgs) -> (BalanceService<InMemoryStore>, GroupSnapshot) {
    let path = args
        .input
        .as_deref()
        .unwrap_or_else(|| fail("--input <FILE> is required"));
    let input = load_input(path);

    let mut config = input.config.unwrap_or_default();
    if let Some(policy) = args.residual {
        config.residual_policy = policy;
    }
    log::debug!("engine config: {:?}", config);

    let store = InMemoryStore::new();
    store
        .put_group(input.snapshot.clone())
        .unwrap_or_else(|e| fail(e));
    (BalanceService::without_cache(store, config), input.snapshot)
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e))
}

fn cmd_balances(args: &[String]) {
    let args = parse_report_args(args, false);
    let (service, snapshot) = service_for(&args);

    let balances = service
        .get_group_balances(snapshot.group_id(), GetOptions::default())
        .unwrap_or_else(|e| fail(e))
        .unwrap_or_else(|| fail(format!("group {} not found", snapshot.group_id())));

    if args.format.as_deref() == Some("json") {
        println!("{}", to_json(&balances));
    } else {
        println!("{}", balances);
    }
}

fn cmd_member(args: &[String]) {
    let args = parse_report_args(args, true);
    let member_id = MemberId::new(
        args.member
            .as_deref()
            .unwrap_or_else(|| fail("--member <ID> is required")),
    );
    let (service, snapshot) = service_for(&args);

    let view = service
        .get_individual_balance(snapshot.group_id(), &member_id)
        .unwrap_or_else(|e| fail(e))
        .unwrap_or_else(|| {
            fail(format!(
                "member {} not found in group {}",
                member_id,
                snapshot.group_id()
            ))
        });

    if args.format.as_deref() == Some("json") {
        println!("{}", to_json(&view));
        return;
    }

    println!("=== {} in {} ===", view.member_id, snapshot.group_id());
    println!("Paid:   {}", view.total_paid);
    println!("Owed:   {}", view.total_owed);
    println!("Net:    {}", view.net_balance);
    if view.owes_to.is_empty() && view.owed_by.is_empty() {
        println!("\nNothing to settle.");
    }
    for edge in &view.owes_to {
        println!("  pays     {:<20} {}", edge.member_id, edge.amount);
    }
    for edge in &view.owed_by {
        println!("  receives {:<20} {}", edge.member_id, edge.amount);
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = GroupConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--members" => config.member_count = flag_number(args, &mut i),
            "--expenses" => config.expense_count = flag_number(args, &mut i),
            "--settlements" => config.settlement_count = flag_number(args, &mut i),
            "--output" => output_path = Some(flag_value(args, &mut i, "a file path")),
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let snapshot = generate_random_group(&config).unwrap_or_else(|e| fail(e));
    let json = to_json(&snapshot);

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| fail(format!("cannot write '{}': {}", path, e)));
        eprintln!(
            "Generated {} expenses and {} settlements across {} members → {}",
            snapshot.expenses.len(),
            snapshot.settlements.len(),
            snapshot.members.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest),
        "member" => cmd_member(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
