//! In-process stand-in for the Pinecone REST API.
//!
//! Speaks the same JSON as the real control and data planes closely enough
//! for the client to be driven end to end over HTTP. Each index's data plane
//! is served under `/data/<index>` on the same listener.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use pinecone_client::model::{
    CreateIndexRequest, DeleteRequest, DescribeIndexStatsRequest, FetchResponse, IndexList,
    IndexModel, IndexStats, IndexStatus, Metadata, NamespaceSummary, QueryRequest, QueryResponse,
    ScoredVector, UpdateRequest, UpsertRequest, UpsertResponse, Vector,
};
use pinecone_client::{API_KEY_HEADER, API_VERSION_HEADER};
use pinecone_demo::{ClientSession, ClientSettings, DemoConfig, ReadinessWait};
use serde_json::json;

pub const TEST_API_KEY: &str = "test-api-key";

struct FakeIndex {
    model: IndexModel,
    describes_until_ready: usize,
    namespaces: BTreeMap<String, BTreeMap<String, Vector>>,
}

pub struct FakeState {
    base_url: String,
    api_key: String,
    ready_after_describes: usize,
    indexes: Mutex<BTreeMap<String, FakeIndex>>,
    requests: AtomicUsize,
    log: Mutex<Vec<String>>,
    fail_queries: AtomicBool,
    fail_deletes: AtomicBool,
}

type Shared = Arc<FakeState>;
type ApiResult<T> = Result<Json<T>, Response>;

pub struct FakePinecone {
    pub base_url: String,
    state: Shared,
    server: tokio::task::JoinHandle<()>,
}

impl Drop for FakePinecone {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl FakePinecone {
    /// Indexes become ready on their second describe.
    pub async fn start() -> Self {
        Self::start_with(1).await
    }

    pub async fn start_with(ready_after_describes: usize) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind localhost");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{addr}");

        let state = Arc::new(FakeState {
            base_url: base_url.clone(),
            api_key: TEST_API_KEY.to_string(),
            ready_after_describes,
            indexes: Mutex::new(BTreeMap::new()),
            requests: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
            fail_queries: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        });

        let router = router(state.clone());
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            base_url,
            state,
            server,
        }
    }

    pub fn session(&self) -> ClientSession {
        self.session_with_key(Some(TEST_API_KEY))
    }

    pub fn session_with_key(&self, api_key: Option<&str>) -> ClientSession {
        ClientSession::new(
            api_key.map(str::to_string),
            ClientSettings {
                controller_url: self.base_url.clone(),
                request_timeout: Some(Duration::from_secs(5)),
            },
        )
    }

    /// Demo config tuned for fast polling against the stand-in.
    pub fn demo_config(&self, index_name: &str) -> DemoConfig {
        DemoConfig {
            index_name: index_name.to_string(),
            readiness: ReadinessWait::Poll {
                timeout: Duration::from_secs(5),
                interval: Duration::from_millis(10),
            },
            ..Default::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// `METHOD /path` of every request received, in order.
    pub fn request_log(&self) -> Vec<String> {
        self.state.log.lock().clone()
    }

    pub fn index_names(&self) -> Vec<String> {
        self.state.indexes.lock().keys().cloned().collect()
    }

    pub fn vector(&self, index: &str, namespace: &str, id: &str) -> Option<Vector> {
        let indexes = self.state.indexes.lock();
        indexes
            .get(index)?
            .namespaces
            .get(namespace)?
            .get(id)
            .cloned()
    }

    pub fn fail_queries(&self, fail: bool) {
        self.state.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Make `DELETE /indexes/:name` answer 500 and keep the index.
    pub fn fail_deletes(&self, fail: bool) {
        self.state.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/indexes", get(list_indexes).post(create_index))
        .route("/indexes/:name", get(describe_index).delete(delete_index))
        .route("/data/:name/vectors/upsert", post(upsert))
        .route("/data/:name/vectors/fetch", get(fetch))
        .route("/data/:name/vectors/update", post(update))
        .route("/data/:name/vectors/delete", post(delete_vectors))
        .route("/data/:name/query", post(query))
        .route("/data/:name/describe_index_stats", post(describe_index_stats))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

async fn authenticate(State(state): State<Shared>, request: Request, next: Next) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    state
        .log
        .lock()
        .push(format!("{} {}", request.method(), request.uri().path()));

    let key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    if key != Some(state.api_key.as_str()) {
        return control_error(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Invalid API Key");
    }
    if !request.headers().contains_key(API_VERSION_HEADER) {
        return control_error(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", "Missing API version");
    }
    next.run(request).await
}

fn control_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": { "code": code, "message": message },
            "status": status.as_u16()
        })),
    )
        .into_response()
}

fn data_error(status: StatusCode, code: u32, message: String) -> Response {
    (
        status,
        Json(json!({ "code": code, "message": message, "details": [] })),
    )
        .into_response()
}

fn not_found(name: &str) -> Response {
    control_error(
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        &format!("Resource {name} not found"),
    )
}

fn check_dimension(index: &FakeIndex, len: usize) -> Result<(), Response> {
    if len != index.model.dimension {
        return Err(data_error(
            StatusCode::BAD_REQUEST,
            3,
            format!(
                "Vector dimension {} does not match the dimension of the index {}",
                len, index.model.dimension
            ),
        ));
    }
    Ok(())
}

// ── Control plane ─────────────────────────────────

async fn list_indexes(State(state): State<Shared>) -> Json<IndexList> {
    let indexes = state.indexes.lock();
    Json(IndexList {
        indexes: indexes.values().map(|i| i.model.clone()).collect(),
    })
}

async fn create_index(
    State(state): State<Shared>,
    Json(body): Json<CreateIndexRequest>,
) -> Response {
    let mut indexes = state.indexes.lock();
    if indexes.contains_key(&body.name) {
        return control_error(
            StatusCode::CONFLICT,
            "ALREADY_EXISTS",
            "Resource already exists",
        );
    }
    let model = IndexModel {
        name: body.name.clone(),
        dimension: body.dimension,
        metric: body.metric,
        host: format!("{}/data/{}", state.base_url, body.name),
        spec: body.spec,
        status: IndexStatus {
            ready: false,
            state: "Initializing".to_string(),
        },
        deletion_protection: Some(body.deletion_protection),
    };
    indexes.insert(
        body.name,
        FakeIndex {
            model: model.clone(),
            describes_until_ready: state.ready_after_describes,
            namespaces: BTreeMap::new(),
        },
    );
    (StatusCode::CREATED, Json(model)).into_response()
}

async fn describe_index(State(state): State<Shared>, Path(name): Path<String>) -> ApiResult<IndexModel> {
    let mut indexes = state.indexes.lock();
    let index = indexes.get_mut(&name).ok_or_else(|| not_found(&name))?;
    if index.describes_until_ready == 0 {
        index.model.status = IndexStatus {
            ready: true,
            state: "Ready".to_string(),
        };
    } else {
        index.describes_until_ready -= 1;
    }
    Ok(Json(index.model.clone()))
}

async fn delete_index(State(state): State<Shared>, Path(name): Path<String>) -> Response {
    if state.fail_deletes.load(Ordering::SeqCst) {
        return control_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "Index deletion failed",
        );
    }
    match state.indexes.lock().remove(&name) {
        Some(_) => StatusCode::ACCEPTED.into_response(),
        None => not_found(&name),
    }
}

// ── Data plane ────────────────────────────────────

async fn upsert(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Json(body): Json<UpsertRequest>,
) -> ApiResult<UpsertResponse> {
    let mut indexes = state.indexes.lock();
    let index = indexes.get_mut(&name).ok_or_else(|| not_found(&name))?;
    for vector in &body.vectors {
        check_dimension(index, vector.values.len())?;
    }
    let namespace = index.namespaces.entry(body.namespace).or_default();
    let upserted_count = body.vectors.len() as u32;
    for vector in body.vectors {
        namespace.insert(vector.id.clone(), vector);
    }
    Ok(Json(UpsertResponse { upserted_count }))
}

async fn fetch(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<FetchResponse> {
    let indexes = state.indexes.lock();
    let index = indexes.get(&name).ok_or_else(|| not_found(&name))?;

    let namespace = params
        .iter()
        .find(|(k, _)| k == "namespace")
        .map(|(_, v)| v.clone())
        .unwrap_or_default();
    let stored = index.namespaces.get(&namespace);
    let vectors = params
        .iter()
        .filter(|(k, _)| k == "ids")
        .filter_map(|(_, id)| stored.and_then(|ns| ns.get(id)).cloned())
        .map(|v| (v.id.clone(), v))
        .collect();
    Ok(Json(FetchResponse { vectors, namespace }))
}

async fn update(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Json(body): Json<UpdateRequest>,
) -> ApiResult<serde_json::Value> {
    let mut indexes = state.indexes.lock();
    let index = indexes.get_mut(&name).ok_or_else(|| not_found(&name))?;
    if let Some(values) = &body.values {
        check_dimension(index, values.len())?;
    }
    let existing = index
        .namespaces
        .get_mut(&body.namespace)
        .and_then(|ns| ns.get_mut(&body.id))
        .ok_or_else(|| {
            data_error(
                StatusCode::NOT_FOUND,
                5,
                format!("Vector {} not found", body.id),
            )
        })?;
    if let Some(values) = body.values {
        existing.values = values;
    }
    if let Some(set) = body.set_metadata {
        existing.metadata.get_or_insert_with(Default::default).extend(set);
    }
    Ok(Json(json!({})))
}

async fn delete_vectors(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Json(body): Json<DeleteRequest>,
) -> ApiResult<serde_json::Value> {
    let mut indexes = state.indexes.lock();
    let index = indexes.get_mut(&name).ok_or_else(|| not_found(&name))?;
    if let Some(ns) = index.namespaces.get_mut(&body.namespace) {
        for id in &body.ids {
            ns.remove(id);
        }
    }
    Ok(Json(json!({})))
}

/// Top-level keys are ANDed; each is `"value"`, `{"$eq": "value"}` or `{"$ne": "value"}`.
fn matches_filter(metadata: Option<&Metadata>, filter: Option<&serde_json::Value>) -> bool {
    let Some(conditions) = filter.and_then(|f| f.as_object()) else {
        return true;
    };
    conditions.iter().all(|(field, condition)| {
        let actual = metadata.and_then(|m| m.get(field)).map(String::as_str);
        match condition {
            serde_json::Value::Object(ops) => ops.iter().all(|(op, expected)| match op.as_str() {
                "$eq" => actual == expected.as_str(),
                "$ne" => actual != expected.as_str(),
                _ => false,
            }),
            literal => actual == literal.as_str(),
        }
    })
}

fn score(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm = |v: &[f32]| v.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm(a) * norm(b);
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

async fn query(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Json(body): Json<QueryRequest>,
) -> ApiResult<QueryResponse> {
    if state.fail_queries.load(Ordering::SeqCst) {
        return Err(data_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            13,
            "Internal error".to_string(),
        ));
    }
    let indexes = state.indexes.lock();
    let index = indexes.get(&name).ok_or_else(|| not_found(&name))?;
    check_dimension(index, body.vector.len())?;

    let mut matches: Vec<ScoredVector> = index
        .namespaces
        .get(&body.namespace)
        .map(|ns| {
            ns.values()
                .filter(|v| matches_filter(v.metadata.as_ref(), body.filter.as_ref()))
                .map(|v| ScoredVector {
                    id: v.id.clone(),
                    score: score(&body.vector, &v.values),
                    values: if body.include_values {
                        v.values.clone()
                    } else {
                        Vec::new()
                    },
                    metadata: if body.include_metadata {
                        v.metadata.clone()
                    } else {
                        None
                    },
                })
                .collect()
        })
        .unwrap_or_default();
    matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    matches.truncate(body.top_k as usize);

    Ok(Json(QueryResponse {
        matches,
        namespace: body.namespace,
    }))
}

async fn describe_index_stats(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Json(body): Json<DescribeIndexStatsRequest>,
) -> ApiResult<IndexStats> {
    let indexes = state.indexes.lock();
    let index = indexes.get(&name).ok_or_else(|| not_found(&name))?;
    let namespaces: BTreeMap<String, NamespaceSummary> = index
        .namespaces
        .iter()
        .map(|(ns, vectors)| {
            let vector_count = vectors
                .values()
                .filter(|v| matches_filter(v.metadata.as_ref(), body.filter.as_ref()))
                .count() as u64;
            (ns.clone(), NamespaceSummary { vector_count })
        })
        .filter(|(_, summary)| summary.vector_count > 0)
        .collect();
    Ok(Json(IndexStats {
        dimension: index.model.dimension,
        total_vector_count: namespaces.values().map(|n| n.vector_count).sum(),
        index_fullness: 0.0,
        namespaces,
    }))
}
