//! Scripted stand-in for the remote RAG service.
//!
//! Records every call in order, together with the corpus name the caller
//! passed, and can inject a failure at any single step. Canned responses
//! include both fully-populated and sparse resources so callers exercise
//! their fallback paths.

use std::sync::Mutex;

use async_trait::async_trait;
use common::error::AppError;

use crate::service::RagService;
use crate::types::{
    Candidate, ChunkSource, ChunkingConfig, Content, ContextChunk, FileStatus, GcsSource,
    GenerateContentResponse, Part, RagCorpus, RagFile, RetrievalConfig, RetrievalResponse,
    Timestamp, TokenUsage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowCall {
    CreateCorpus,
    ListCorpora,
    ImportFiles,
    ListFiles,
    RetrievalQuery,
    GenerateContent,
    DeleteCorpus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub call: WorkflowCall,
    /// Corpus resource name the caller passed, for calls that take one.
    pub corpus_name: Option<String>,
}

pub struct ScriptedRagService {
    corpus_name: String,
    chunks: Vec<ContextChunk>,
    fail_on: Option<WorkflowCall>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRagService {
    pub fn new() -> Self {
        ScriptedRagService {
            corpus_name: "projects/demo-project/locations/us-central1/ragCorpora/42".to_string(),
            chunks: vec![sample_chunk()],
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails the given step with a canned service error; every step before
    /// it succeeds normally.
    pub fn with_failure(mut self, call: WorkflowCall) -> Self {
        self.fail_on = Some(call);
        self
    }

    pub fn with_chunks(mut self, chunks: Vec<ContextChunk>) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn corpus_name(&self) -> &str {
        &self.corpus_name
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub fn call_order(&self) -> Vec<WorkflowCall> {
        self.calls().into_iter().map(|entry| entry.call).collect()
    }

    fn record(&self, call: WorkflowCall, corpus_name: Option<&str>) -> Result<(), AppError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(RecordedCall {
                call,
                corpus_name: corpus_name.map(str::to_string),
            });

        if self.fail_on == Some(call) {
            return Err(AppError::Api {
                status: 500,
                message: format!("injected failure for {call:?}"),
            });
        }
        Ok(())
    }
}

impl Default for ScriptedRagService {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_chunk() -> ContextChunk {
    ContextChunk {
        text: Some(
            "Retrieval-augmented generation grounds model answers in corpus text.".to_string(),
        ),
        relevance_score: Some(0.8731),
        source: Some(ChunkSource {
            display_name: Some("doc.pdf".to_string()),
            uri: Some("gs://bucket/doc.pdf".to_string()),
        }),
    }
}

#[async_trait]
impl RagService for ScriptedRagService {
    async fn create_corpus(
        &self,
        display_name: &str,
        _embedding_model: &str,
    ) -> Result<RagCorpus, AppError> {
        self.record(WorkflowCall::CreateCorpus, None)?;
        Ok(RagCorpus {
            name: self.corpus_name.clone(),
            display_name: Some(display_name.to_string()),
            create_time: Some(Timestamp {
                seconds: 1_705_321_845,
                nanos: 0,
            }),
            backend_config: None,
        })
    }

    async fn list_corpora(&self) -> Result<Vec<RagCorpus>, AppError> {
        self.record(WorkflowCall::ListCorpora, None)?;
        Ok(vec![RagCorpus {
            name: self.corpus_name.clone(),
            display_name: Some("demo_corpus".to_string()),
            create_time: None,
            backend_config: None,
        }])
    }

    async fn import_files(
        &self,
        corpus_name: &str,
        _uris: &[String],
        _chunking: ChunkingConfig,
        _max_requests_per_minute: u32,
    ) -> Result<(), AppError> {
        self.record(WorkflowCall::ImportFiles, Some(corpus_name))
    }

    async fn list_files(&self, corpus_name: &str) -> Result<Vec<RagFile>, AppError> {
        self.record(WorkflowCall::ListFiles, Some(corpus_name))?;
        Ok(vec![
            RagFile {
                name: format!("{corpus_name}/ragFiles/1"),
                display_name: Some("doc.pdf".to_string()),
                create_time: Some(Timestamp {
                    seconds: 1_705_321_845,
                    nanos: 0,
                }),
                gcs_source: Some(GcsSource {
                    uris: vec!["gs://bucket/doc.pdf".to_string()],
                }),
                file_status: Some(FileStatus {
                    state: "ACTIVE".to_string(),
                }),
            },
            // Sparse file: listing must fall back to "Unknown" everywhere.
            RagFile {
                name: format!("{corpus_name}/ragFiles/2"),
                display_name: None,
                create_time: None,
                gcs_source: None,
                file_status: None,
            },
        ])
    }

    async fn retrieval_query(
        &self,
        corpus_name: &str,
        _query: &str,
        _config: RetrievalConfig,
    ) -> Result<RetrievalResponse, AppError> {
        self.record(WorkflowCall::RetrievalQuery, Some(corpus_name))?;
        Ok(RetrievalResponse {
            chunks: self.chunks.clone(),
        })
    }

    async fn generate_content(
        &self,
        _model: &str,
        corpus_name: &str,
        _query: &str,
        _config: RetrievalConfig,
    ) -> Result<GenerateContentResponse, AppError> {
        self.record(WorkflowCall::GenerateContent, Some(corpus_name))?;
        Ok(GenerateContentResponse {
            candidates: vec![Candidate {
                content: Content {
                    parts: vec![Part {
                        text: Some(
                            "RAG stands for Retrieval-Augmented Generation.".to_string(),
                        ),
                    }],
                },
            }],
            usage_metadata: Some(TokenUsage {
                prompt_token_count: Some(12),
                candidates_token_count: Some(40),
                total_token_count: Some(52),
            }),
        })
    }

    async fn delete_corpus(&self, corpus_name: &str) -> Result<(), AppError> {
        self.record(WorkflowCall::DeleteCorpus, Some(corpus_name))
    }
}
