//! Pinecone Client – typed async access to a managed Pinecone project
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐   GET/POST/DELETE /indexes    ┌────────────────────┐
//! │      PineconeClient      │ ────────────────────────────▶ │   control plane    │
//! │  (api key, http pool)    │                               │  api.pinecone.io   │
//! └────────────┬─────────────┘                               └────────────────────┘
//!              │ index(name) → host
//!              ▼
//! ┌──────────────────────────┐   /vectors/*, /query,         ┌────────────────────┐
//! │     IndexConnection      │   /describe_index_stats       │     data plane     │
//! │ upsert·fetch·update·...  │ ────────────────────────────▶ │ <index host>       │
//! └──────────────────────────┘                               └────────────────────┘
//! ```
//!
//! All similarity search, storage and consistency live in the service; this
//! crate only shapes requests, attaches credentials and decodes responses.

pub mod control;
pub mod error;
mod http;
pub mod index;
pub mod model;

pub use control::{PineconeClient, PineconeClientBuilder, DEFAULT_CONTROLLER_URL};
pub use error::{PineconeError, Result};
pub use http::{API_KEY_HEADER, API_VERSION, API_VERSION_HEADER};
pub use index::IndexConnection;
pub use model::{
    Cloud, IndexList, IndexModel, IndexStats, Metadata, Metric, NamespaceSummary,
    QueryResponse, ScoredVector, Vector,
};
