//! The walkthrough: index management → vector operations → query → stats → cleanup.
//!
//! Steps run strictly in order. A failing step stops the remaining steps and
//! is logged and recorded in the [`DemoReport`]; cleanup still deletes the
//! demo index. Only a cleanup failure is returned as an error.

use anyhow::{Context, Result};
use pinecone_client::{
    IndexList, IndexModel, IndexStats, Metadata, PineconeClient, PineconeError, QueryResponse,
    ScoredVector,
};

use crate::config::{DemoConfig, ReadinessWait, NAMESPACE_1};
use crate::sample::{constant_vector, sample_id, sample_records};
use crate::session::ClientSession;

pub const UPDATED_VALUE: f32 = 0.9;
pub const QUERY_VALUE: f32 = 0.5;
pub const QUERY_TOP_K: u32 = 3;

/// What the walkthrough observed, step by step.
#[derive(Debug, Default)]
pub struct DemoReport {
    pub existing_indexes: Vec<String>,
    pub index: Option<IndexModel>,
    pub vectors: VectorOpsSummary,
    pub matches: Vec<ScoredVector>,
    pub stats: Option<IndexStats>,
    /// The step that stopped the walkthrough, if any.
    pub failure: Option<StepFailure>,
    pub cleaned_up: bool,
}

impl DemoReport {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorOpsSummary {
    pub upserted: u32,
    pub fetched: usize,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
}

/// A step error caught by [`run`].
#[derive(Debug)]
pub struct StepFailure {
    pub step: &'static str,
    pub error: anyhow::Error,
}

impl StepFailure {
    fn at(step: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |error| Self { step, error }
    }
}

/// Run the whole walkthrough against the session's client.
///
/// A missing API key or invalid config fails here, before any request is
/// sent. Step errors are caught and recorded in the report; the returned
/// error is reserved for a failed cleanup.
pub async fn run(session: &ClientSession, config: &DemoConfig) -> Result<DemoReport> {
    config.validate()?;
    let pc = session.client()?;
    tracing::info!(index = %config.index_name, "Starting Pinecone demo");

    let mut report = DemoReport::default();
    if let Err(failure) = run_steps(&pc, config, &mut report).await {
        tracing::error!(
            step = failure.step,
            error = %format!("{:#}", failure.error),
            "Error in demo"
        );
        report.failure = Some(failure);
    }

    if config.keep_index {
        tracing::info!(index = %config.index_name, "Keeping index, skipping cleanup");
    } else {
        tracing::info!("Cleaning up...");
        if let Err(e) = cleanup(&pc, &config.index_name).await {
            tracing::error!(index = %config.index_name, error = %e, "Cleanup failed");
            return Err(e).with_context(|| format!("deleting index {}", config.index_name));
        }
        report.cleaned_up = true;
    }
    tracing::info!("Demo completed");
    Ok(report)
}

async fn run_steps(
    pc: &PineconeClient,
    config: &DemoConfig,
    report: &mut DemoReport,
) -> std::result::Result<(), StepFailure> {
    let (existing, model) = demo_index_management(pc, config)
        .await
        .map_err(StepFailure::at("index management"))?;
    report.existing_indexes = existing.names().into_iter().map(str::to_string).collect();
    report.index = Some(model);

    report.vectors = demo_vector_operations(pc, config)
        .await
        .map_err(StepFailure::at("vector operations"))?;

    report.matches = demo_querying(pc, config)
        .await
        .map_err(StepFailure::at("querying"))?
        .matches;

    report.stats = Some(
        demo_index_stats(pc, config)
            .await
            .map_err(StepFailure::at("index statistics"))?,
    );
    Ok(())
}

/// List existing indexes, create the demo index, wait for it and describe it.
pub async fn demo_index_management(
    pc: &PineconeClient,
    config: &DemoConfig,
) -> Result<(IndexList, IndexModel)> {
    tracing::info!("=== Index Management ===");

    let existing = pc.list_indexes().await?;
    tracing::info!(count = existing.indexes.len(), "Listed existing indexes");
    println!("Current indexes: {}", serde_json::to_string(&existing)?);

    tracing::info!(
        index = %config.index_name,
        metric = %config.metric,
        dimension = config.dimension,
        cloud = %config.cloud,
        region = %config.region,
        "Creating serverless index"
    );
    pc.create_serverless_index(
        &config.index_name,
        config.metric,
        config.dimension,
        config.cloud,
        &config.region,
    )
    .await?;

    let model = wait_for_index(pc, &config.index_name, config.readiness).await?;
    println!("Index description: {}", serde_json::to_string_pretty(&model)?);
    Ok((existing, model))
}

/// Wait according to `readiness`, then return the latest description.
pub async fn wait_for_index(
    pc: &PineconeClient,
    name: &str,
    readiness: ReadinessWait,
) -> Result<IndexModel, PineconeError> {
    match readiness {
        ReadinessWait::Poll { timeout, interval } => {
            tracing::info!(index = %name, timeout_secs = timeout.as_secs(), "Waiting for index to be ready");
            pc.wait_until_ready(name, timeout, interval).await
        }
        ReadinessWait::Fixed(delay) => {
            tracing::info!(index = %name, delay_secs = delay.as_secs(), "Sleeping before describing index");
            tokio::time::sleep(delay).await;
            let model = pc.describe_index(name).await?;
            if !model.status.ready {
                tracing::warn!(
                    index = %name,
                    state = %model.status.state,
                    "Index still not ready after fixed wait"
                );
            }
            Ok(model)
        }
    }
}

/// Upsert the samples, then fetch, update and delete `vec1`/`vec2` in `ns1`.
pub async fn demo_vector_operations(
    pc: &PineconeClient,
    config: &DemoConfig,
) -> Result<VectorOpsSummary> {
    tracing::info!("=== Vector Operations ===");
    let index = pc.index(&config.index_name).await?;
    let mut summary = VectorOpsSummary::default();

    for (namespace, vector) in sample_records(config.samples, config.dimension) {
        let id = vector.id.clone();
        let upserted = index.upsert(vec![vector], namespace).await?;
        tracing::info!(id = %id, namespace = %namespace, upserted, "Upserted vector");
        summary.upserted += upserted;
    }

    let ids = vec![sample_id(1), sample_id(2)];
    let fetched = index.fetch(&ids, NAMESPACE_1).await?;
    summary.fetched = fetched.vectors.len();
    tracing::info!(namespace = NAMESPACE_1, fetched = summary.fetched, "Fetched vectors");

    index
        .update(
            &ids[0],
            constant_vector(config.dimension, UPDATED_VALUE),
            None,
            NAMESPACE_1,
        )
        .await?;
    tracing::info!(id = %ids[0], namespace = NAMESPACE_1, "Updated vector");
    summary.updated.push(ids[0].clone());

    index.delete(&ids, NAMESPACE_1).await?;
    tracing::info!(ids = ?ids, namespace = NAMESPACE_1, "Deleted vectors");
    summary.deleted = ids;

    Ok(summary)
}

/// Top-3 query in `ns1` with the constant vector 0.5, metadata included.
pub async fn demo_querying(pc: &PineconeClient, config: &DemoConfig) -> Result<QueryResponse> {
    tracing::info!("=== Querying ===");
    let index = pc.index(&config.index_name).await?;
    let query = constant_vector(config.dimension, QUERY_VALUE);

    let response = index
        .query(query, NAMESPACE_1, QUERY_TOP_K, true, None)
        .await?;
    tracing::info!(matches = response.matches.len(), "Query finished");

    println!("Query results:");
    for m in &response.matches {
        println!(
            "  ID: {}, Score: {:.4}, Metadata: {}",
            m.id,
            m.score,
            format_metadata(m.metadata.as_ref())
        );
    }
    Ok(response)
}

pub async fn demo_index_stats(pc: &PineconeClient, config: &DemoConfig) -> Result<IndexStats> {
    tracing::info!("=== Index Statistics ===");
    let index = pc.index(&config.index_name).await?;
    let stats = index.describe_index_stats(None).await?;
    print_stats(&stats);
    Ok(stats)
}

pub async fn cleanup(pc: &PineconeClient, index_name: &str) -> Result<(), PineconeError> {
    pc.delete_index(index_name).await?;
    tracing::info!(index = %index_name, "Deleted index");
    Ok(())
}

/// Upsert one vector through the session's shared client.
pub async fn upsert_vector_in_index(
    session: &ClientSession,
    index_name: &str,
    id: &str,
    values: Vec<f32>,
    namespace: &str,
) -> Result<u32, PineconeError> {
    let pc = session.client()?;
    let index = pc.index(index_name).await?;
    index.upsert_one(id, values, None, namespace).await
}

pub fn print_index_list(list: &IndexList) {
    if list.indexes.is_empty() {
        println!("No indexes");
        return;
    }
    for index in &list.indexes {
        println!(
            "  {} (dimension={}, metric={}, state={}, host={})",
            index.name, index.dimension, index.metric, index.status.state, index.host
        );
    }
}

pub fn print_stats(stats: &IndexStats) {
    println!("Index statistics:");
    println!("  Dimension: {}", stats.dimension);
    println!("  Total vector count: {}", stats.total_vector_count);
    println!("  Namespaces:");
    for (name, summary) in &stats.namespaces {
        println!("    {}: {} vectors", name, summary.vector_count);
    }
}

pub fn format_metadata(metadata: Option<&Metadata>) -> String {
    match metadata {
        Some(m) if !m.is_empty() => m
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "-".to_string(),
    }
}
