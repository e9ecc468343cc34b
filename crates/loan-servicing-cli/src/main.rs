mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::origination::{EligibilityArgs, SimulateArgs};
use commands::schedule::{AllocateArgs, ScheduleArgs};
use commands::servicing::{DisburseArgs, RepayArgs, StatementArgs};

/// Loan schedules, eligibility checks and repayment processing
#[derive(Parser)]
#[command(
    name = "loans",
    version,
    about = "Loan schedules, eligibility checks and repayment processing",
    long_about = "A CLI for the loan servicing core with decimal precision. Generates \
                  amortization schedules, simulates and checks eligibility for new loans, \
                  and disburses or applies repayments against a JSON loan book."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Lending policy file (JSON or YAML) overriding the built-in defaults
    #[arg(long, global = true)]
    policy: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an amortization schedule
    Schedule(ScheduleArgs),
    /// Simulate a reducing-balance loan
    Simulate(SimulateArgs),
    /// Check an applicant's eligibility for a product
    Eligibility(EligibilityArgs),
    /// Preview how a payment would be allocated across installments
    Allocate(AllocateArgs),
    /// Apply a repayment to a loan in a loan book
    Repay(RepayArgs),
    /// Disburse an approved loan in a loan book
    Disburse(DisburseArgs),
    /// Show a loan's installments, transactions and next due installment
    Statement(StatementArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let policy = match commands::load_policy(cli.policy.as_deref()) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args, policy),
        Commands::Simulate(args) => commands::origination::run_simulate(args, policy),
        Commands::Eligibility(args) => commands::origination::run_eligibility(args, policy),
        Commands::Allocate(args) => commands::schedule::run_allocate(args, policy),
        Commands::Repay(args) => commands::servicing::run_repay(args, policy),
        Commands::Disburse(args) => commands::servicing::run_disburse(args, policy),
        Commands::Statement(args) => commands::servicing::run_statement(args, policy),
        Commands::Version => {
            println!("loans {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
