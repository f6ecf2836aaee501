//! Pinecone demo: a guided tour of a managed vector index
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 CLI (clap) · tracing · anyhow               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │   demo::run   management → vectors → query → stats → cleanup│
//! └─────────────────────────────────────────────────────────────┘
//!                              │ ClientSession (lazy, shared)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │        pinecone-client: PineconeClient / IndexConnection    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ HTTPS + JSON
//!                              ▼
//!                     Pinecone control / data plane
//! ```

pub mod config;
pub mod demo;
pub mod sample;
pub mod session;

pub use config::{ClientSettings, DemoConfig, ReadinessWait};
pub use demo::{run, upsert_vector_in_index, DemoReport, StepFailure, VectorOpsSummary};
pub use session::ClientSession;
