use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{ApiClient, ExperimentApi, ExperimentStore, DEFAULT_BASE_URL};
use shared::{
    domain::{ExperimentId, VariationId},
    protocol::NewExperiment,
};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all experiments with their variation counters.
    List,
    /// Create an experiment with at least two variations.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, required = true, num_args = 2..)]
        variations: Vec<String>,
    },
    /// Ask the backend to assign a variation for an experiment.
    Assign { experiment_id: i64 },
    /// Record a conversion against a variation.
    Convert { variation_id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let api = Arc::new(ApiClient::new(args.base_url));

    match args.command {
        Command::List => {
            let store = ExperimentStore::new(api);
            store.fetch_experiments().await;
            let state = store.snapshot().await;
            if let Some(error) = state.error {
                anyhow::bail!(error);
            }
            for experiment in state.experiments {
                println!("{} {}", experiment.id.0, experiment.name);
                for variation in experiment.variations {
                    println!(
                        "  {} {} participants={} conversions={}",
                        variation.id.0, variation.name, variation.participants, variation.conversions
                    );
                }
            }
        }
        Command::Create { name, variations } => {
            let store = ExperimentStore::new(api);
            let created = store
                .add_experiment(NewExperiment { name, variations })
                .await?;
            println!("Created experiment {} ({})", created.name, created.id.0);
        }
        Command::Assign { experiment_id } => {
            let assigned = api.assign_to_variation(ExperimentId(experiment_id)).await?;
            println!(
                "Assigned to variation {} ({})",
                assigned.variation_name, assigned.variation_id.0
            );
        }
        Command::Convert { variation_id } => {
            let receipt = api.record_conversion(VariationId(variation_id)).await?;
            println!("{}", receipt.message);
        }
    }

    Ok(())
}
