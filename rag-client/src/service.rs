use async_trait::async_trait;
use common::error::AppError;

use crate::types::{
    ChunkingConfig, GenerateContentResponse, RagCorpus, RagFile, RetrievalConfig,
    RetrievalResponse,
};

/// Seam over the remote RAG service.
///
/// The workflow only ever talks to this trait, so tests can substitute a
/// scripted double for the HTTP client.
#[async_trait]
pub trait RagService: Send + Sync {
    /// Creates a corpus bound to the given embedding model and returns the
    /// created resource, including its server-assigned name.
    async fn create_corpus(
        &self,
        display_name: &str,
        embedding_model: &str,
    ) -> Result<RagCorpus, AppError>;

    /// Enumerates every corpus under the configured project and location.
    async fn list_corpora(&self) -> Result<Vec<RagCorpus>, AppError>;

    /// Submits source URIs for remote ingestion and waits for the import to
    /// complete.
    async fn import_files(
        &self,
        corpus_name: &str,
        uris: &[String],
        chunking: ChunkingConfig,
        max_requests_per_minute: u32,
    ) -> Result<(), AppError>;

    /// Enumerates the files ingested into a corpus.
    async fn list_files(&self, corpus_name: &str) -> Result<Vec<RagFile>, AppError>;

    /// Runs a retrieval query against a corpus. Zero returned chunks is a
    /// valid outcome, not an error.
    async fn retrieval_query(
        &self,
        corpus_name: &str,
        query: &str,
        config: RetrievalConfig,
    ) -> Result<RetrievalResponse, AppError>;

    /// Generates an answer with a retrieval tool bound to the corpus.
    async fn generate_content(
        &self,
        model: &str,
        corpus_name: &str,
        query: &str,
        config: RetrievalConfig,
    ) -> Result<GenerateContentResponse, AppError>;

    /// Deletes a corpus and everything imported into it.
    async fn delete_corpus(&self, corpus_name: &str) -> Result<(), AppError>;
}
