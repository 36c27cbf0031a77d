use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub project_id: String,
    pub access_token: String,
    pub corpus_display_name: String,
    pub source_uris: Vec<String>,
    #[serde(default = "default_location")]
    pub location: String,
    /// Overrides the regional service endpoint, mainly for tests and
    /// private endpoints.
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_generation_model")]
    pub generation_model: String,
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: u32,
    #[serde(default = "default_max_embedding_requests_per_minute")]
    pub max_embedding_requests_per_minute: u32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_vector_distance_threshold")]
    pub vector_distance_threshold: f64,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_location() -> String {
    "us-central1".to_string()
}

fn default_embedding_model() -> String {
    "publishers/google/models/text-embedding-005".to_string()
}

fn default_generation_model() -> String {
    "gemini-2.0-flash-001".to_string()
}

fn default_query() -> String {
    "What is RAG and why it is helpful?".to_string()
}

fn default_chunk_size() -> u32 {
    512
}

fn default_chunk_overlap() -> u32 {
    100
}

fn default_max_embedding_requests_per_minute() -> u32 {
    1000
}

fn default_top_k() -> u32 {
    3
}

fn default_vector_distance_threshold() -> f64 {
    0.5
}

fn default_log_file() -> String {
    "rag_workflow.log".to_string()
}

impl AppConfig {
    /// Regional endpoint the client talks to, unless `api_base` overrides it.
    pub fn service_endpoint(&self) -> String {
        match &self.api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com/v1", self.location),
        }
    }

    /// Resource parent under which corpora live.
    pub fn parent(&self) -> String {
        format!("projects/{}/locations/{}", self.project_id, self.location)
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> AppConfig {
        let source = serde_json::json!({
            "project_id": "demo-project",
            "access_token": "token",
            "corpus_display_name": "demo_corpus",
            "source_uris": ["gs://bucket/doc.pdf"],
        });
        serde_json::from_value(source).expect("minimal config should deserialize")
    }

    #[test]
    fn defaults_are_applied_for_omitted_keys() {
        let config = minimal_config();

        assert_eq!(config.location, "us-central1");
        assert_eq!(
            config.embedding_model,
            "publishers/google/models/text-embedding-005"
        );
        assert_eq!(config.generation_model, "gemini-2.0-flash-001");
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.max_embedding_requests_per_minute, 1000);
        assert_eq!(config.top_k, 3);
        assert!((config.vector_distance_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.log_file, "rag_workflow.log");
        assert!(config.api_base.is_none());
    }

    #[test]
    fn service_endpoint_derives_from_location() {
        let config = minimal_config();
        assert_eq!(
            config.service_endpoint(),
            "https://us-central1-aiplatform.googleapis.com/v1"
        );
    }

    #[test]
    fn api_base_override_wins_and_is_normalized() {
        let mut config = minimal_config();
        config.api_base = Some("http://localhost:8080/v1/".to_string());
        assert_eq!(config.service_endpoint(), "http://localhost:8080/v1");
    }

    #[test]
    fn parent_combines_project_and_location() {
        let config = minimal_config();
        assert_eq!(
            config.parent(),
            "projects/demo-project/locations/us-central1"
        );
    }
}
