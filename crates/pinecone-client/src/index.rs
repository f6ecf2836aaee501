//! Data-plane client bound to one index host.

use std::fmt;

use crate::error::{PineconeError, Result};
use crate::http::{normalize_base_url, send_empty, send_json};
use crate::model::{
    DeleteRequest, DescribeIndexStatsRequest, FetchResponse, IndexStats, Metadata,
    QueryRequest, QueryResponse, UpdateRequest, UpsertRequest, UpsertResponse, Vector,
};

/// Connection to a single index's data plane.
///
/// Obtained from [`crate::PineconeClient::index`]; shares the control plane's
/// connection pool and credentials.
#[derive(Clone)]
pub struct IndexConnection {
    http: reqwest::Client,
    name: String,
    base_url: String,
}

impl fmt::Debug for IndexConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexConnection")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl IndexConnection {
    pub(crate) fn new(http: reqwest::Client, name: String, host: &str) -> Self {
        Self {
            http,
            name,
            base_url: normalize_base_url(host),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Insert or replace vectors in `namespace`. Returns the upserted count.
    pub async fn upsert(&self, vectors: Vec<Vector>, namespace: &str) -> Result<u32> {
        if vectors.is_empty() {
            return Ok(0);
        }
        if let Some(bad) = vectors.iter().find(|v| v.values.is_empty()) {
            return Err(PineconeError::InvalidArgument(format!(
                "vector {} has no values",
                bad.id
            )));
        }
        let request = UpsertRequest {
            vectors,
            namespace: namespace.to_string(),
        };
        tracing::debug!(
            method = "POST",
            path = "/vectors/upsert",
            namespace = %namespace,
            count = request.vectors.len()
        );
        let response: UpsertResponse =
            send_json(self.http.post(self.url("/vectors/upsert")).json(&request)).await?;
        Ok(response.upserted_count)
    }

    /// Upsert a single vector with optional metadata.
    pub async fn upsert_one(
        &self,
        id: &str,
        values: Vec<f32>,
        metadata: Option<Metadata>,
        namespace: &str,
    ) -> Result<u32> {
        let vector = Vector {
            id: id.to_string(),
            values,
            metadata,
        };
        self.upsert(vec![vector], namespace).await
    }

    /// Fetch vectors by id. Ids the service does not know are absent from the result.
    pub async fn fetch<S: AsRef<str>>(&self, ids: &[S], namespace: &str) -> Result<FetchResponse> {
        if ids.is_empty() {
            return Err(PineconeError::InvalidArgument("fetch needs at least one id".into()));
        }
        let mut query: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", id.as_ref())).collect();
        query.push(("namespace", namespace));
        tracing::debug!(method = "GET", path = "/vectors/fetch", namespace = %namespace, count = ids.len());
        send_json(self.http.get(self.url("/vectors/fetch")).query(&query)).await
    }

    /// Replace a vector's values. Metadata is left alone unless `set_metadata` is given.
    pub async fn update(
        &self,
        id: &str,
        values: Vec<f32>,
        set_metadata: Option<Metadata>,
        namespace: &str,
    ) -> Result<()> {
        if values.is_empty() && set_metadata.is_none() {
            return Err(PineconeError::InvalidArgument(format!(
                "update of {id} changes nothing"
            )));
        }
        let request = UpdateRequest {
            id: id.to_string(),
            values: (!values.is_empty()).then_some(values),
            set_metadata,
            namespace: namespace.to_string(),
        };
        tracing::debug!(method = "POST", path = "/vectors/update", namespace = %namespace, id = %id);
        send_empty(self.http.post(self.url("/vectors/update")).json(&request)).await
    }

    /// Delete vectors by id. Unknown ids are ignored by the service.
    pub async fn delete<S: AsRef<str>>(&self, ids: &[S], namespace: &str) -> Result<()> {
        if ids.is_empty() {
            return Err(PineconeError::InvalidArgument("delete needs at least one id".into()));
        }
        let request = DeleteRequest {
            ids: ids.iter().map(|id| id.as_ref().to_string()).collect(),
            namespace: namespace.to_string(),
        };
        tracing::debug!(method = "POST", path = "/vectors/delete", namespace = %namespace, count = ids.len());
        send_empty(self.http.post(self.url("/vectors/delete")).json(&request)).await
    }

    /// Top-k similarity query. Match order and scores come from the service.
    pub async fn query(
        &self,
        vector: Vec<f32>,
        namespace: &str,
        top_k: u32,
        include_metadata: bool,
        filter: Option<serde_json::Value>,
    ) -> Result<QueryResponse> {
        self.query_with(QueryRequest {
            vector,
            top_k,
            namespace: namespace.to_string(),
            include_values: false,
            include_metadata,
            filter,
        })
        .await
    }

    pub async fn query_with(&self, request: QueryRequest) -> Result<QueryResponse> {
        if request.top_k == 0 {
            return Err(PineconeError::InvalidArgument("top_k must be > 0".into()));
        }
        if request.vector.is_empty() {
            return Err(PineconeError::InvalidArgument("query vector is empty".into()));
        }
        tracing::debug!(
            method = "POST",
            path = "/query",
            namespace = %request.namespace,
            top_k = request.top_k
        );
        send_json(self.http.post(self.url("/query")).json(&request)).await
    }

    pub async fn describe_index_stats(
        &self,
        filter: Option<serde_json::Value>,
    ) -> Result<IndexStats> {
        let request = DescribeIndexStatsRequest { filter };
        tracing::debug!(method = "POST", path = "/describe_index_stats");
        send_json(self.http.post(self.url("/describe_index_stats")).json(&request)).await
    }
}
