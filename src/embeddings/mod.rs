// Embeddings module
// OpenAI-compatible embedding generation for corpus texts and queries

pub mod openai;

pub use openai::EmbeddingClient;
