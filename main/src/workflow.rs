//! The sequential corpus workflow: create, populate, query, generate, then
//! clean up. Every step makes exactly one service call, logs one success or
//! one failure line, and a failure aborts the run — except cleanup, which
//! reports failure as a `bool` and never propagates.

use common::{
    error::AppError,
    utils::{config::AppConfig, time::format_timestamp},
};
use rag_client::{
    service::RagService,
    types::{ChunkingConfig, RagCorpus, RetrievalConfig},
};
use tracing::{error, info};

/// Longest chunk preview the log carries; full texts go to stdout.
const PREVIEW_LENGTH: usize = 100;

pub async fn run(service: &dyn RagService, config: &AppConfig) -> Result<(), AppError> {
    let corpus = create_corpus(service, config).await?;
    list_corpora(service).await?;
    import_files(service, config, &corpus.name).await?;
    list_files(service, &corpus.name).await?;
    retrieval_query(service, config, &corpus.name).await?;
    generate_answer(service, config, &corpus.name).await?;
    cleanup(service, &corpus.name).await;
    Ok(())
}

async fn create_corpus(
    service: &dyn RagService,
    config: &AppConfig,
) -> Result<RagCorpus, AppError> {
    info!("STEP 2: Creating RAG corpus");
    info!(
        "Embedding model: {}, Corpus name: {}",
        config.embedding_model, config.corpus_display_name
    );

    match service
        .create_corpus(&config.corpus_display_name, &config.embedding_model)
        .await
    {
        Ok(corpus) => {
            info!("RAG corpus created: {}", corpus.name);
            Ok(corpus)
        }
        Err(e) => {
            error!("RAG corpus creation failed: {e}");
            Err(e)
        }
    }
}

async fn list_corpora(service: &dyn RagService) -> Result<(), AppError> {
    info!("STEP 3: Listing RAG corpora");

    match service.list_corpora().await {
        Ok(corpora) => {
            info!("Found {} corpora", corpora.len());
            for (index, corpus) in corpora.iter().enumerate() {
                info!("Corpus {}: {}", index + 1, corpus.name);
            }
            Ok(())
        }
        Err(e) => {
            error!("Listing corpora failed: {e}");
            Err(e)
        }
    }
}

async fn import_files(
    service: &dyn RagService,
    config: &AppConfig,
    corpus_name: &str,
) -> Result<(), AppError> {
    info!("STEP 4: Importing files to RAG corpus");
    info!("Target corpus: {corpus_name}");
    info!("Files to import: {:?}", config.source_uris);
    info!(
        "Chunk size: {}, Overlap: {}",
        config.chunk_size, config.chunk_overlap
    );

    let chunking = ChunkingConfig {
        chunk_size: config.chunk_size,
        chunk_overlap: config.chunk_overlap,
    };
    match service
        .import_files(
            corpus_name,
            &config.source_uris,
            chunking,
            config.max_embedding_requests_per_minute,
        )
        .await
    {
        Ok(()) => {
            info!("Files imported successfully");
            Ok(())
        }
        Err(e) => {
            error!("File import failed: {e}");
            Err(e)
        }
    }
}

async fn list_files(service: &dyn RagService, corpus_name: &str) -> Result<(), AppError> {
    info!("STEP 5: Listing files in RAG corpus");

    let files = match service.list_files(corpus_name).await {
        Ok(files) => files,
        Err(e) => {
            error!("Listing files failed: {e}");
            return Err(e);
        }
    };

    info!("Found {} files in corpus", files.len());
    for (index, file) in files.iter().enumerate() {
        let created = format_timestamp(file.create_time.map(|t| t.seconds));
        let status = file
            .file_status
            .as_ref()
            .map_or("Unknown", |status| status.state.as_str());
        info!(
            "File {}: {} (Created: {}, Status: {})",
            index + 1,
            file.display_name.as_deref().unwrap_or("Unknown"),
            created,
            status
        );
        info!("Source: {}", file.source_uri().unwrap_or("Unknown"));
    }
    Ok(())
}

async fn retrieval_query(
    service: &dyn RagService,
    config: &AppConfig,
    corpus_name: &str,
) -> Result<(), AppError> {
    info!("STEP 6: Performing direct context retrieval");
    info!("Query: '{}'", config.query);
    info!(
        "Retrieval config: top_k={}, distance_threshold={}",
        config.top_k, config.vector_distance_threshold
    );

    let retrieval = RetrievalConfig {
        top_k: config.top_k,
        vector_distance_threshold: config.vector_distance_threshold,
    };
    let response = match service
        .retrieval_query(corpus_name, &config.query, retrieval)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            error!("Context retrieval failed: {e}");
            return Err(e);
        }
    };

    info!("Retrieved {} chunks of context", response.chunks.len());
    for (index, chunk) in response.chunks.iter().enumerate() {
        let source = chunk
            .source
            .as_ref()
            .and_then(|source| source.display_name.as_deref())
            .unwrap_or("Unknown");
        let score = chunk
            .relevance_score
            .map_or_else(|| "Unknown".to_string(), |score| format!("{score:.4}"));
        info!("Chunk {}: From '{}' (Relevance: {})", index + 1, source, score);
        info!(
            "Preview: {}",
            preview(chunk.text.as_deref().unwrap_or("No text"))
        );
        if let Some(text) = &chunk.text {
            println!("{text}");
        }
    }
    Ok(())
}

async fn generate_answer(
    service: &dyn RagService,
    config: &AppConfig,
    corpus_name: &str,
) -> Result<(), AppError> {
    info!("STEP 7: Generating content with RAG");
    info!("Query: '{}'", config.query);
    info!("Model: {}", config.generation_model);

    let retrieval = RetrievalConfig {
        top_k: config.top_k,
        vector_distance_threshold: config.vector_distance_threshold,
    };
    let response = match service
        .generate_content(&config.generation_model, corpus_name, &config.query, retrieval)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            error!("Content generation failed: {e}");
            return Err(e);
        }
    };

    info!("Response generated successfully");
    let answer = response
        .text()
        .unwrap_or_else(|| "No text available".to_string());
    info!("Response text: {answer}");

    if let Some(usage) = response.usage_metadata {
        let mut counters = Vec::new();
        if let Some(prompt) = usage.prompt_token_count {
            counters.push(format!("Prompt: {prompt}"));
        }
        if let Some(candidates) = usage.candidates_token_count {
            counters.push(format!("Response: {candidates}"));
        }
        if let Some(total) = usage.total_token_count {
            counters.push(format!("Total: {total}"));
        }
        if !counters.is_empty() {
            info!("Token usage: {}", counters.join(", "));
        }
    }

    println!("{answer}");
    Ok(())
}

async fn cleanup(service: &dyn RagService, corpus_name: &str) {
    info!("STEP 8: Cleaning up RAG resources");
    if delete_corpus(service, corpus_name).await {
        info!("Created corpus deleted successfully");
    } else {
        error!("Failed to delete corpus {corpus_name}");
    }
}

/// Deletes a corpus by its full resource name. Cleanup is best-effort:
/// failure is reported as `false`, never propagated.
pub async fn delete_corpus(service: &dyn RagService, corpus_name: &str) -> bool {
    info!("Deleting RAG corpus: {corpus_name}");
    match service.delete_corpus(corpus_name).await {
        Ok(()) => {
            info!("Successfully deleted corpus: {corpus_name}");
            true
        }
        Err(e) => {
            error!("Failed to delete corpus: {e}");
            false
        }
    }
}

/// Single-line log preview of a chunk, capped at [`PREVIEW_LENGTH`] chars.
fn preview(text: &str) -> String {
    let flattened = text.replace('\n', " ");
    if flattened.chars().count() <= PREVIEW_LENGTH {
        return flattened;
    }
    let mut shortened: String = flattened.chars().take(PREVIEW_LENGTH).collect();
    shortened.push_str("...");
    shortened
}
