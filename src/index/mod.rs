// file: src/index/mod.rs
// description: precomputed LanceDB dataset index module exports
// reference: internal module structure

pub mod client;
pub mod embeddings;
pub mod schema;

pub use client::IndexClient;
pub use embeddings::EmbeddingClient;
pub use schema::SchemaManager;
