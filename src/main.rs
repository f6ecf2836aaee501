//! Pinecone demo CLI
//!
//! Walks a serverless Pinecone index through create → upsert → fetch →
//! update → delete → query → stats → teardown.
//!
//! # Usage
//!
//! ```bash
//! # Full walkthrough (default subcommand)
//! PINECONE_API_KEY=... pinecone-demo run
//!
//! # Inspect or tidy up an existing project
//! PINECONE_API_KEY=... pinecone-demo list
//! PINECONE_API_KEY=... pinecone-demo stats --index docs-quickstart-index
//! PINECONE_API_KEY=... pinecone-demo delete --index docs-quickstart-index
//! ```

use std::time::Duration;

use anyhow::Context;
use clap::{Args, FromArgMatches, Parser, Subcommand};
use pinecone_client::{Cloud, Metric, DEFAULT_CONTROLLER_URL};
use tracing_subscriber::EnvFilter;

use pinecone_demo::config::{
    ClientSettings, DemoConfig, ReadinessWait, CONTROLLER_URL_ENV, DEFAULT_DIMENSION,
    DEFAULT_INDEX_NAME, DEFAULT_REGION, DEFAULT_SAMPLES,
};
use pinecone_demo::demo::{print_index_list, print_stats};
use pinecone_demo::ClientSession;

#[derive(Parser)]
#[command(name = "pinecone-demo")]
#[command(about = "Exercise a managed Pinecone serverless index end to end")]
#[command(version)]
struct Cli {
    /// Control-plane base URL
    #[arg(long, global = true, env = CONTROLLER_URL_ENV, default_value = DEFAULT_CONTROLLER_URL)]
    controller_url: String,

    /// Per-request timeout in seconds (none unless set)
    #[arg(long, global = true)]
    request_timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full walkthrough and delete the index afterwards
    Run(RunArgs),

    /// List indexes in the project
    List,

    /// Show statistics for an existing index
    Stats {
        #[arg(short, long)]
        index: String,
    },

    /// Delete an index
    Delete {
        #[arg(short, long)]
        index: String,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Name of the index to create
    #[arg(long, default_value = DEFAULT_INDEX_NAME)]
    index_name: String,

    #[arg(long, default_value_t = DEFAULT_DIMENSION)]
    dimension: usize,

    /// cosine, euclidean or dotproduct
    #[arg(long, default_value_t = Metric::Cosine)]
    metric: Metric,

    /// aws, gcp or azure
    #[arg(long, default_value_t = Cloud::Aws)]
    cloud: Cloud,

    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,

    /// Sample vectors to upsert, split across ns1/ns2
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,

    /// Give up waiting for readiness after this many seconds
    #[arg(long, default_value = "120")]
    ready_timeout_secs: u64,

    /// Delay between readiness polls
    #[arg(long, default_value = "2000")]
    poll_interval_ms: u64,

    /// Sleep this long instead of polling for readiness
    #[arg(long)]
    fixed_wait_secs: Option<u64>,

    /// Leave the index in place after the run
    #[arg(long)]
    keep_index: bool,
}

impl RunArgs {
    /// `run` with every flag at its clap default, for a bare `pinecone-demo`.
    fn defaults() -> Result<Self, clap::Error> {
        let matches =
            Self::augment_args(clap::Command::new("run")).try_get_matches_from(["run"])?;
        Self::from_arg_matches(&matches)
    }

    fn into_config(self) -> DemoConfig {
        let readiness = match self.fixed_wait_secs {
            Some(secs) => ReadinessWait::Fixed(Duration::from_secs(secs)),
            None => ReadinessWait::Poll {
                timeout: Duration::from_secs(self.ready_timeout_secs),
                interval: Duration::from_millis(self.poll_interval_ms),
            },
        };
        DemoConfig {
            index_name: self.index_name,
            metric: self.metric,
            dimension: self.dimension,
            cloud: self.cloud,
            region: self.region,
            samples: self.samples,
            readiness,
            keep_index: self.keep_index,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let session = ClientSession::from_env(ClientSettings {
        controller_url: cli.controller_url,
        request_timeout: cli.request_timeout_secs.map(Duration::from_secs),
    });

    let command = match cli.command {
        Some(command) => command,
        None => Commands::Run(RunArgs::defaults()?),
    };
    match command {
        Commands::Run(args) => {
            let config = args.into_config();
            let report = pinecone_demo::run(&session, &config).await?;
            match &report.failure {
                Some(failure) => tracing::warn!(
                    step = failure.step,
                    cleaned_up = report.cleaned_up,
                    "Walkthrough stopped early"
                ),
                None => tracing::info!(
                    upserted = report.vectors.upserted,
                    matches = report.matches.len(),
                    cleaned_up = report.cleaned_up,
                    "Walkthrough finished"
                ),
            }
        }

        Commands::List => {
            let pc = session.client()?;
            let list = pc.list_indexes().await?;
            println!("Indexes:");
            print_index_list(&list);
        }

        Commands::Stats { index } => {
            let pc = session.client()?;
            let connection = pc
                .index(&index)
                .await
                .with_context(|| format!("resolving index {index}"))?;
            let stats = connection.describe_index_stats(None).await?;
            print_stats(&stats);
        }

        Commands::Delete { index } => {
            let pc = session.client()?;
            pc.delete_index(&index)
                .await
                .with_context(|| format!("deleting index {index}"))?;
            println!("Deleted index {index}");
        }
    }

    Ok(())
}
