//! Wire types for the managed RAG service.
//!
//! The service frequently returns sparse objects, so everything that can be
//! absent on the wire is an `Option` or carries a serde default. Callers are
//! expected to fall back to placeholder values rather than fail a run over a
//! missing display name or timestamp.

use serde::{Deserialize, Serialize};

/// Protobuf-style timestamp as the service serializes it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timestamp {
    #[serde(default)]
    pub seconds: i64,
    #[serde(default)]
    pub nanos: i32,
}

/// Embedding model bound to a corpus at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingModelConfig {
    pub publisher_model: String,
}

/// Vector backend configuration; currently only carries the embedding model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VectorDbConfig {
    pub rag_embedding_model_config: EmbeddingModelConfig,
}

/// A named remote collection of ingested documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagCorpus {
    /// Full resource name, e.g.
    /// `projects/{project}/locations/{location}/ragCorpora/{id}`.
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub create_time: Option<Timestamp>,
    #[serde(default)]
    pub backend_config: Option<VectorDbConfig>,
}

/// Source bucket URIs a file was imported from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsSource {
    #[serde(default)]
    pub uris: Vec<String>,
}

/// Ingestion status of a file within a corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub state: String,
}

/// A document ingested into a corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagFile {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub create_time: Option<Timestamp>,
    #[serde(default)]
    pub gcs_source: Option<GcsSource>,
    #[serde(default)]
    pub file_status: Option<FileStatus>,
}

impl RagFile {
    /// First source URI, if the file carries one.
    pub fn source_uri(&self) -> Option<&str> {
        self.gcs_source
            .as_ref()
            .and_then(|source| source.uris.first())
            .map(String::as_str)
    }
}

/// Ingestion-time splitting parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkingConfig {
    pub chunk_size: u32,
    pub chunk_overlap: u32,
}

/// Retrieval parameters: result cap and similarity cutoff.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub top_k: u32,
    pub vector_distance_threshold: f64,
}

/// Where a retrieved chunk came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSource {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

/// A ranked text span returned by a retrieval query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextChunk {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub source: Option<ChunkSource>,
}

/// Ranked chunks for one retrieval query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalResponse {
    #[serde(default)]
    pub chunks: Vec<ContextChunk>,
}

/// One text fragment of a generated candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
}

/// Token accounting attached to a generation response.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(default)]
    pub candidates_token_count: Option<u32>,
    #[serde(default)]
    pub total_token_count: Option<u32>,
}

/// Synthesized answer plus usage counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<TokenUsage>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, concatenating its parts. `None` when the
    /// service returned no candidates or only empty parts.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let joined: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

/// Long-running operation envelope returned by corpus creation and import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationStatus>,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// Error envelope the service wraps non-2xx responses in.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i32>,
    pub message: String,
}

// Request bodies.

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCorpusRequest {
    pub display_name: String,
    pub backend_config: VectorDbConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationConfig {
    pub chunking_config: ChunkingConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRagFilesConfig {
    pub gcs_source: GcsSource,
    pub transformation_config: TransformationConfig,
    pub max_embedding_requests_per_min: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFilesRequest {
    pub import_rag_files_config: ImportRagFilesConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RagResource {
    pub rag_corpus: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalFilter {
    pub vector_distance_threshold: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RagRetrievalConfig {
    pub top_k: u32,
    pub filter: RetrievalFilter,
}

impl From<RetrievalConfig> for RagRetrievalConfig {
    fn from(config: RetrievalConfig) -> Self {
        RagRetrievalConfig {
            top_k: config.top_k,
            filter: RetrievalFilter {
                vector_distance_threshold: config.vector_distance_threshold,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexRagStore {
    pub rag_resources: Vec<RagResource>,
    pub rag_retrieval_config: RagRetrievalConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalQueryBody {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveContextsRequest {
    pub vertex_rag_store: VertexRagStore,
    pub query: RetrievalQueryBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPart {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContent {
    pub role: String,
    pub parts: Vec<GenerationPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalTool {
    pub retrieval: RetrievalToolSource,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalToolSource {
    pub vertex_rag_store: VertexRagStore,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<GenerationContent>,
    pub tools: Vec<RetrievalTool>,
}

// List responses.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCorporaResponse {
    #[serde(default)]
    pub rag_corpora: Vec<RagCorpus>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    #[serde(default)]
    pub rag_files: Vec<RagFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_corpus_decodes_with_defaults() {
        let corpus: RagCorpus = serde_json::from_str(
            r#"{"name": "projects/p/locations/l/ragCorpora/1"}"#,
        )
        .expect("sparse corpus should decode");

        assert_eq!(corpus.name, "projects/p/locations/l/ragCorpora/1");
        assert!(corpus.display_name.is_none());
        assert!(corpus.create_time.is_none());
        assert!(corpus.backend_config.is_none());
    }

    #[test]
    fn file_source_uri_picks_first_uri() {
        let file: RagFile = serde_json::from_str(
            r#"{
                "name": "projects/p/locations/l/ragCorpora/1/ragFiles/9",
                "displayName": "doc.pdf",
                "createTime": {"seconds": 1700000000},
                "gcsSource": {"uris": ["gs://bucket/doc.pdf", "gs://bucket/other.pdf"]},
                "fileStatus": {"state": "ACTIVE"}
            }"#,
        )
        .expect("file should decode");

        assert_eq!(file.source_uri(), Some("gs://bucket/doc.pdf"));
        assert_eq!(file.create_time.map(|t| t.seconds), Some(1_700_000_000));
    }

    #[test]
    fn file_without_source_has_no_uri() {
        let file: RagFile =
            serde_json::from_str(r#"{"name": "corpora/1/files/2"}"#).expect("file should decode");
        assert!(file.source_uri().is_none());
        assert!(file.file_status.is_none());
    }

    #[test]
    fn retrieval_response_defaults_to_empty_chunks() {
        let response: RetrievalResponse =
            serde_json::from_str("{}").expect("empty response should decode");
        assert!(response.chunks.is_empty());
    }

    #[test]
    fn generation_text_joins_multi_part_candidates() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {"content": {"parts": [{"text": "RAG stands for "}, {"text": "Retrieval-Augmented Generation."}]}}
                ],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 40, "totalTokenCount": 52}
            }"#,
        )
        .expect("generation response should decode");

        assert_eq!(
            response.text().as_deref(),
            Some("RAG stands for Retrieval-Augmented Generation.")
        );
        let usage = response.usage_metadata.expect("usage should be present");
        assert_eq!(usage.prompt_token_count, Some(12));
        assert_eq!(usage.candidates_token_count, Some(40));
        assert_eq!(usage.total_token_count, Some(52));
    }

    #[test]
    fn generation_without_candidates_has_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_str("{}").expect("empty generation should decode");
        assert!(response.text().is_none());
        assert!(response.usage_metadata.is_none());
    }

    #[test]
    fn operation_error_decodes() {
        let operation: Operation = serde_json::from_str(
            r#"{
                "name": "projects/p/locations/l/operations/7",
                "done": true,
                "error": {"code": 13, "message": "internal failure"}
            }"#,
        )
        .expect("operation should decode");

        assert!(operation.done);
        let error = operation.error.expect("error should be present");
        assert_eq!(error.code, 13);
        assert_eq!(error.message, "internal failure");
    }

    #[test]
    fn error_envelope_decodes() {
        let envelope: ApiErrorEnvelope = serde_json::from_str(
            r#"{"error": {"code": 404, "message": "corpus not found", "status": "NOT_FOUND"}}"#,
        )
        .expect("envelope should decode");
        assert_eq!(envelope.error.message, "corpus not found");
        assert_eq!(envelope.error.code, Some(404));
    }

    #[test]
    fn retrieval_request_serializes_camel_case() {
        let request = RetrieveContextsRequest {
            vertex_rag_store: VertexRagStore {
                rag_resources: vec![RagResource {
                    rag_corpus: "projects/p/locations/l/ragCorpora/1".to_string(),
                }],
                rag_retrieval_config: RetrievalConfig {
                    top_k: 3,
                    vector_distance_threshold: 0.5,
                }
                .into(),
            },
            query: RetrievalQueryBody {
                text: "What is RAG?".to_string(),
            },
        };

        let value = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(
            value["vertexRagStore"]["ragResources"][0]["ragCorpus"],
            "projects/p/locations/l/ragCorpora/1"
        );
        assert_eq!(value["vertexRagStore"]["ragRetrievalConfig"]["topK"], 3);
        assert_eq!(
            value["vertexRagStore"]["ragRetrievalConfig"]["filter"]["vectorDistanceThreshold"],
            0.5
        );
        assert_eq!(value["query"]["text"], "What is RAG?");
    }
}
