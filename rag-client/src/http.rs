use std::time::Duration;

use common::{error::AppError, utils::config::AppConfig};
use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use url::Url;

use crate::service::RagService;
use crate::types::{
    ApiErrorEnvelope, ChunkingConfig, CreateCorpusRequest, EmbeddingModelConfig, GcsSource,
    GenerateContentRequest, GenerateContentResponse, GenerationContent, GenerationPart,
    ImportFilesRequest, ImportRagFilesConfig, ListCorporaResponse, ListFilesResponse, Operation,
    RagCorpus, RagFile, RagResource, RetrievalConfig, RetrievalQueryBody, RetrievalResponse,
    RetrievalTool, RetrievalToolSource, RetrieveContextsRequest, TransformationConfig,
    VectorDbConfig, VertexRagStore,
};

/// How often a pending long-running operation is polled.
const OPERATION_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Poll cap; corpus creation and small imports finish well within this.
const OPERATION_MAX_POLLS: u32 = 150;

/// HTTP client for the managed RAG service.
///
/// Talks to the regional REST endpoint with a pre-issued bearer token.
/// Corpus creation and file import come back as long-running operations,
/// which this client polls to completion before returning.
pub struct HttpRagClient {
    http: reqwest::Client,
    base_url: String,
    parent: String,
    access_token: String,
}

impl HttpRagClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let base_url = config.service_endpoint();
        // Fail at startup on a malformed endpoint rather than on the first call.
        Url::parse(&base_url)?;

        Ok(HttpRagClient {
            http: reqwest::Client::builder().build()?,
            base_url,
            parent: config.parent(),
            access_token: config.access_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        page_token: Option<&str>,
    ) -> Result<T, AppError> {
        let mut request = self.http.get(url).bearer_auth(&self.access_token);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }
        decode(request.send().await?).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    /// Polls a long-running operation until the service marks it done.
    ///
    /// A failed operation or an exhausted poll budget both abort the run;
    /// individual poll requests are never retried.
    async fn wait_operation(&self, mut operation: Operation) -> Result<Operation, AppError> {
        let mut polls = 0u32;
        loop {
            if let Some(status) = &operation.error {
                return Err(AppError::Operation(format!(
                    "{} (code {})",
                    status.message, status.code
                )));
            }
            if operation.done {
                return Ok(operation);
            }
            if polls >= OPERATION_MAX_POLLS {
                return Err(AppError::Operation(format!(
                    "operation {} did not complete after {} polls",
                    operation.name, OPERATION_MAX_POLLS
                )));
            }
            polls = polls.saturating_add(1);

            tokio::time::sleep(OPERATION_POLL_INTERVAL).await;
            debug!(operation = %operation.name, poll = polls, "Polling operation");
            operation = self.get_json(&self.url(&operation.name), None).await?;
        }
    }
}

#[async_trait::async_trait]
impl RagService for HttpRagClient {
    async fn create_corpus(
        &self,
        display_name: &str,
        embedding_model: &str,
    ) -> Result<RagCorpus, AppError> {
        let body = CreateCorpusRequest {
            display_name: display_name.to_string(),
            backend_config: VectorDbConfig {
                rag_embedding_model_config: EmbeddingModelConfig {
                    publisher_model: embedding_model.to_string(),
                },
            },
        };

        let url = self.url(&format!("{}/ragCorpora", self.parent));
        let operation: Operation = self.post_json(&url, &body).await?;
        let operation = self.wait_operation(operation).await?;

        let response = operation.response.ok_or_else(|| {
            AppError::Operation("corpus creation completed without a response payload".to_string())
        })?;
        Ok(serde_json::from_value(response)?)
    }

    async fn list_corpora(&self) -> Result<Vec<RagCorpus>, AppError> {
        let url = self.url(&format!("{}/ragCorpora", self.parent));
        let mut corpora = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page: ListCorporaResponse = self.get_json(&url, page_token.as_deref()).await?;
            corpora.extend(page.rag_corpora);
            page_token = page.next_page_token.filter(|token| !token.is_empty());
            if page_token.is_none() {
                return Ok(corpora);
            }
        }
    }

    async fn import_files(
        &self,
        corpus_name: &str,
        uris: &[String],
        chunking: ChunkingConfig,
        max_requests_per_minute: u32,
    ) -> Result<(), AppError> {
        let body = ImportFilesRequest {
            import_rag_files_config: ImportRagFilesConfig {
                gcs_source: GcsSource {
                    uris: uris.to_vec(),
                },
                transformation_config: TransformationConfig {
                    chunking_config: chunking,
                },
                max_embedding_requests_per_min: max_requests_per_minute,
            },
        };

        let url = self.url(&format!("{corpus_name}/ragFiles:import"));
        let operation: Operation = self.post_json(&url, &body).await?;
        self.wait_operation(operation).await?;
        Ok(())
    }

    async fn list_files(&self, corpus_name: &str) -> Result<Vec<RagFile>, AppError> {
        let url = self.url(&format!("{corpus_name}/ragFiles"));
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page: ListFilesResponse = self.get_json(&url, page_token.as_deref()).await?;
            files.extend(page.rag_files);
            page_token = page.next_page_token.filter(|token| !token.is_empty());
            if page_token.is_none() {
                return Ok(files);
            }
        }
    }

    async fn retrieval_query(
        &self,
        corpus_name: &str,
        query: &str,
        config: RetrievalConfig,
    ) -> Result<RetrievalResponse, AppError> {
        let body = RetrieveContextsRequest {
            vertex_rag_store: rag_store(corpus_name, config),
            query: RetrievalQueryBody {
                text: query.to_string(),
            },
        };

        let url = self.url(&format!("{}:retrieveContexts", self.parent));
        self.post_json(&url, &body).await
    }

    async fn generate_content(
        &self,
        model: &str,
        corpus_name: &str,
        query: &str,
        config: RetrievalConfig,
    ) -> Result<GenerateContentResponse, AppError> {
        let body = GenerateContentRequest {
            contents: vec![GenerationContent {
                role: "user".to_string(),
                parts: vec![GenerationPart {
                    text: query.to_string(),
                }],
            }],
            tools: vec![RetrievalTool {
                retrieval: RetrievalToolSource {
                    vertex_rag_store: rag_store(corpus_name, config),
                },
            }],
        };

        let url = self.url(&format!(
            "{}/publishers/google/models/{model}:generateContent",
            self.parent
        ));
        self.post_json(&url, &body).await
    }

    async fn delete_corpus(&self, corpus_name: &str) -> Result<(), AppError> {
        let response = self
            .http
            .delete(self.url(corpus_name))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(api_error(status, &body))
        }
    }
}

fn rag_store(corpus_name: &str, config: RetrievalConfig) -> VertexRagStore {
    VertexRagStore {
        rag_resources: vec![RagResource {
            rag_corpus: corpus_name.to_string(),
        }],
        rag_retrieval_config: config.into(),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body))
    }
}

/// Maps a non-2xx body to [`AppError::Api`], preferring the service's error
/// envelope and falling back to the raw body text.
fn api_error(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string());

    AppError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            project_id: "demo-project".to_string(),
            access_token: "token".to_string(),
            corpus_display_name: "demo_corpus".to_string(),
            source_uris: vec!["gs://bucket/doc.pdf".to_string()],
            location: "us-central1".to_string(),
            api_base: None,
            embedding_model: "publishers/google/models/text-embedding-005".to_string(),
            generation_model: "gemini-2.0-flash-001".to_string(),
            query: "What is RAG?".to_string(),
            chunk_size: 512,
            chunk_overlap: 100,
            max_embedding_requests_per_minute: 1000,
            top_k: 3,
            vector_distance_threshold: 0.5,
            log_file: "rag_workflow.log".to_string(),
        }
    }

    #[test]
    fn client_builds_urls_under_regional_endpoint() {
        let client = HttpRagClient::new(&test_config()).expect("client should build");
        assert_eq!(
            client.url("projects/demo-project/locations/us-central1/ragCorpora"),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/demo-project/locations/us-central1/ragCorpora"
        );
    }

    #[test]
    fn client_rejects_malformed_api_base() {
        let mut config = test_config();
        config.api_base = Some("not a url".to_string());
        assert!(HttpRagClient::new(&config).is_err());
    }

    #[test]
    fn api_error_prefers_envelope_message() {
        let error = api_error(
            StatusCode::NOT_FOUND,
            r#"{"error": {"code": 404, "message": "corpus not found"}}"#,
        );
        match error {
            AppError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "corpus not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        let error = api_error(StatusCode::BAD_GATEWAY, "upstream unavailable");
        match error {
            AppError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
