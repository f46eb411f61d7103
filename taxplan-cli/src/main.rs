use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use taxplan_core::TaxPlanningService;
use tracing::{debug, info};

use taxplan_cli::app;
use taxplan_cli::config::AppConfig;
use taxplan_cli::logging;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Indian income-tax planning: liability, recommendations and chart payloads.
///
/// Results are printed to stdout as JSON; logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "taxplan", version, about)]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive; overrides the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Database connection string; overrides the config file.
    /// For SQLite this is a file path (e.g. `taxplan.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Tax liability for an income figure.
    Liability {
        /// Gross annual income.
        #[arg(long)]
        income: Decimal,

        /// Year of birth; selects the senior and super-senior slabs.
        #[arg(long)]
        birth_year: Option<i32>,

        /// Total deductions already within their caps.
        #[arg(long, default_value = "0")]
        deductions: Decimal,

        /// Evaluation date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Runs the full pipeline for a profile JSON document.
    Analyze {
        /// Client profile JSON.
        #[arg(long)]
        profile: PathBuf,

        /// Saved recommendation response; the fallback set is used without it.
        #[arg(long)]
        ai_response: Option<PathBuf>,

        /// Client id the plan is stored under.
        #[arg(long)]
        client: Option<String>,

        /// Store the plan.
        #[arg(long, requires = "client")]
        save: bool,

        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Batch-loads client profiles from CSV.
    Load {
        /// CSV file with one client per row.
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Rebuilds the visualization payload of a stored plan.
    Show {
        #[arg(long)]
        client: String,

        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Lists stored plans.
    List,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{json}");
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database.connection_string = db;
    }
    logging::init_logging(&config.logging, cli.log_level.as_deref())?;
    debug!(?config, "loaded configuration");

    match cli.command {
        Command::Liability {
            income,
            birth_year,
            deductions,
            as_of,
        } => {
            let report =
                app::liability_report(income, birth_year, deductions, as_of.unwrap_or_else(today));
            print_json(&report)
        }

        Command::Analyze {
            profile,
            ai_response,
            client,
            save,
            as_of,
        } => {
            let as_of = as_of.unwrap_or_else(today);
            let profile = app::read_profile(&profile)?;
            let advisor = app::build_advisor(&config.advisor, ai_response.as_deref());
            let repo = app::open_repository(&config.database).await?;
            let service = TaxPlanningService::new(advisor, repo);

            match client.filter(|_| save) {
                Some(client_id) => {
                    let outcome = service
                        .generate(&client_id, profile, as_of)
                        .await
                        .with_context(|| format!("Failed to store plan for {client_id}"))?;
                    info!(client_id = %client_id, "plan saved");
                    print_json(&outcome)
                }
                None => print_json(&service.analyze(&profile, as_of).await),
            }
        }

        Command::Load { file, as_of } => {
            let repo = app::open_repository(&config.database).await?;
            let loaded =
                app::load_profiles_file(repo.as_ref(), &file, as_of.unwrap_or_else(today)).await?;
            info!(loaded, file = %file.display(), "loaded client profiles");
            print_json(&serde_json::json!({ "loaded": loaded }))
        }

        Command::Show { client, as_of } => {
            let repo = app::open_repository(&config.database).await?;
            let service =
                TaxPlanningService::new(app::build_advisor(&config.advisor, None), repo);
            let payload = service
                .visualize(&client, as_of.unwrap_or_else(today))
                .await
                .with_context(|| format!("No plan for client {client}"))?;
            print_json(&payload)
        }

        Command::List => {
            let repo = app::open_repository(&config.database).await?;
            print_json(&app::plan_summaries(repo.as_ref()).await?)
        }
    }
}
