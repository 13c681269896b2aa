//! CLI de beakerflow: expone el ciclo show/seeds/seed/run/clear sobre el
//! pipeline de demostración.

mod demo;

use std::process::ExitCode;

use beaker_core::RunMode;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "beaker-cli", about = "Inspecciona y corre un grafo de beakers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lista los beakers declarados y cuántos registros contiene cada uno.
    Show,
    /// Lista los seeds registrados y su historial de ejecuciones.
    Seeds,
    /// Corre el productor de un seed.
    Seed {
        name: String,
        #[arg(long)]
        reset: bool,
        #[arg(long)]
        num_items: Option<usize>,
    },
    /// Corre el grafo completo.
    Run {
        #[arg(long, value_enum, default_value = "waterfall")]
        mode: RunModeArg,
        #[arg(long)]
        start: Option<String>,
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },
    /// Vacía un beaker.
    Clear { beaker: String },
    /// No implementado: fuera del alcance de este motor.
    Graph,
    /// No implementado: fuera del alcance de este motor.
    Peek { beaker: String, id: String },
    /// No implementado: fuera del alcance de este motor.
    Export { beaker: String },
}

#[derive(Clone, clap::ValueEnum)]
enum RunModeArg {
    Waterfall,
    River,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let log_format = std::env::var("BEAKERFLOW_LOG_FORMAT").unwrap_or_default();
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().filter_or("BEAKERFLOW_LOG", "info"));
    if log_format == "json" {
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                r#"{{"level":"{}","target":"{}","message":"{}"}}"#,
                record.level(),
                record.target(),
                record.args()
            )
        });
    }
    builder.init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), beaker_core::BeakerError> {
    if matches!(command, Command::Graph | Command::Peek { .. } | Command::Export { .. }) {
        eprintln!("this subcommand is not part of the core engine");
        return Ok(());
    }

    let config = beaker_store::StoreConfig::from_env();
    let pool = beaker_store::build_pool(&config).await?;
    let pipeline = demo::build(pool).await?;

    match command {
        Command::Show => {
            for name in pipeline.graph().beaker_names() {
                let beaker = pipeline.beaker(name)?;
                println!("{:<20} {:>6} record(s)", name, beaker.len().await?);
            }
        }
        Command::Seeds => {
            let grouped = pipeline.seeds.list_seeds().await?;
            for (beaker, by_seed) in grouped {
                println!("{beaker}:");
                for (seed_name, runs) in by_seed {
                    println!("  {seed_name}: {} run(s)", runs.len());
                }
            }
        }
        Command::Seed { name, reset, num_items } => {
            let to_beaker = demo::RAW_BEAKER;
            let run = pipeline
                .seeds
                .run_seed(&name, reset, pipeline.beaker(to_beaker)?.as_ref(), num_items)
                .await?;
            println!("seed '{}' produced {} item(s)", run.seed_name, run.num_items);
        }
        Command::Run { mode, start, only } => {
            let mode = match mode {
                RunModeArg::Waterfall => RunMode::Waterfall,
                RunModeArg::River => RunMode::River,
            };
            let only = if only.is_empty() { None } else { Some(only.as_slice()) };
            let report = beaker_core::runner::run(&pipeline, mode, start.as_deref(), only).await?;
            for (from, to_counts) in report.counts() {
                for (to, n) in to_counts {
                    println!("{from} -> {to}: {n}");
                }
            }
        }
        Command::Clear { beaker } => {
            pipeline.clear_beaker(&beaker).await?;
            println!("cleared '{beaker}'");
        }
        Command::Graph | Command::Peek { .. } | Command::Export { .. } => unreachable!(),
    }

    Ok(())
}
