//! FlowBank CLI - Main entry point

use anyhow::Context;
use clap::{Parser, Subcommand};
use flowbank_core::Address;
use flowbank_events::EventStore;
use flowbank_bank::{parse_script, Outcome, Simulation};
use flowbank_ledger::BankConfig;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flowbank")]
#[command(about = "FlowBank - Stream-rate lending bank", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a bank configuration file and print it
    CheckConfig {
        /// TOML configuration file
        config: PathBuf,
    },

    /// Replay a JSONL command script against in-memory collaborators
    Simulate {
        /// TOML configuration file
        config: PathBuf,
        /// JSONL script, one command per line
        script: PathBuf,
        /// Journal committed events to this directory
        #[arg(long)]
        journal: Option<PathBuf>,
        /// The bank's own address
        #[arg(long, default_value = "bank")]
        bank_address: String,
        /// Initial owner (admin)
        #[arg(long, default_value = "owner")]
        owner: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::CheckConfig { config } => {
            let config = BankConfig::load_file(&config)
                .with_context(|| format!("loading {}", config.display()))?;

            println!("Configuration OK");
            println!("  name:                    {}", config.name);
            println!("  interest rate:           {} bps", config.interest_rate);
            println!("  collateralization ratio: {}%", config.collateralization_ratio);
            println!("  liquidation penalty:     {}%", config.liquidation_penalty);
            match config.max_price_age_secs {
                Some(secs) => println!("  max price age:           {}s", secs),
                None => println!("  max price age:           unlimited"),
            }
        }

        Commands::Simulate {
            config,
            script,
            journal,
            bank_address,
            owner,
        } => {
            let config = BankConfig::load_file(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            let file = File::open(&script)
                .with_context(|| format!("opening {}", script.display()))?;
            let commands = parse_script(BufReader::new(file))?;

            let mut sim = Simulation::new(config, Address::new(&bank_address)?, Address::new(&owner)?)?;
            if let Some(dir) = journal {
                sim = sim.with_journal(EventStore::new(&dir)?);
            }

            for (step, command) in commands.into_iter().enumerate() {
                let outcome = sim.run(command).await;
                let marker = match outcome {
                    Outcome::Failed(_) => "✗",
                    Outcome::Stream(ref delivery) if delivery.is_rejected() => "✗",
                    _ => "✓",
                };
                println!("{marker} step {:>3}: {}", step + 1, outcome);
            }

            let bank = &sim.bank;
            println!();
            println!("📊 {}", bank.name());
            println!("  reserve balance:            {}", bank.reserve_balance());
            println!("  reserve collateral balance: {}", bank.reserve_collateral_balance());
            println!("  revenue rate:               {}", bank.revenue_rate());
            for (user, vault) in bank.state().vaults.iter() {
                let ratio = bank
                    .vault_collateralization_ratio(user)
                    .ok()
                    .flatten()
                    .map_or_else(|| "-".to_string(), |r| format!("{r}%"));
                println!(
                    "  {user}: collateral {} debt {} ratio {ratio}",
                    vault.collateral, vault.debt
                );
            }

            let faults = bank.faults();
            if !faults.is_empty() {
                println!("⚠️  {} reconciliation fault(s)", faults.len());
                for record in faults {
                    println!("  {}", serde_json::to_string(&record.event)?);
                }
            }
        }
    }

    Ok(())
}
