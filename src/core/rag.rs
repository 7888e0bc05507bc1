use crate::errors::Error;
use crate::llm::{Embedder, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Failure of a retrieval lookup. Callers treat it as non-fatal.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] LlmError),
    #[error("corpus error: {0}")]
    Corpus(String),
}

/// Best-effort semantic lookup over a fixed corpus.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Returns up to `k` matching chunks formatted as one reference block.
    async fn retrieve(&self, query: &str, k: usize) -> Result<String, RetrievalError>;
}

/// Metadata attached to an indexed chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMetadata {
    /// Title of the topic the chunk was cut from
    pub topic: String,
}

/// A document with its embedding vector representation
#[derive(Clone, Debug)]
pub struct DocumentEmbedding {
    /// Unique identifier for the document
    pub id: String,
    /// Vector embedding of the document content
    pub embedding: Vec<f32>,
    /// Original text content of the document
    pub content: String,
    /// Metadata about the document
    pub metadata: ChunkMetadata,
}

/// In-memory implementation of a vector store
#[derive(Debug)]
pub struct InMemoryVectorStore<E: Embedder> {
    /// Stored documents with their embeddings
    documents: Vec<DocumentEmbedding>,
    /// Embedder used to convert text to vectors
    embedder: E,
}

impl<E: Embedder> InMemoryVectorStore<E> {
    /// Creates a new empty vector store with the given embedder
    pub fn new(embedder: E) -> Self {
        Self {
            documents: Vec::new(),
            embedder,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Calculates cosine similarity between two vectors
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot / (norm_a * norm_b)
        }
    }

    /// Upserts a document with the given ID and content
    pub async fn upsert_document(
        &mut self,
        doc_id: &str,
        content: &str,
        metadata: ChunkMetadata,
    ) -> Result<(), RetrievalError> {
        let embedding = self.embedder.embed_text(content).await?;

        if let Some(pos) = self.documents.iter().position(|d| d.id == doc_id) {
            self.documents[pos].content = content.to_string();
            self.documents[pos].embedding = embedding;
            self.documents[pos].metadata = metadata;
        } else {
            self.documents.push(DocumentEmbedding {
                id: doc_id.to_string(),
                embedding,
                content: content.to_string(),
                metadata,
            });
        }
        Ok(())
    }

    /// Searches for the `top_k` most similar documents
    pub async fn search_documents(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<&DocumentEmbedding>, RetrievalError> {
        debug!("Searching for documents with query: {} (top_k: {})", query, top_k);
        let query_embedding = self.embedder.embed_text(query).await?;
        let mut scored: Vec<(f32, &DocumentEmbedding)> = self
            .documents
            .iter()
            .map(|doc| (Self::cosine_similarity(&query_embedding, &doc.embedding), doc))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored.into_iter().take(top_k).map(|(_, doc)| doc).collect())
    }
}

/// One topic of the course corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicEntry {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Course corpus: language → topic id → topic
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    languages: BTreeMap<String, BTreeMap<String, TopicEntry>>,
}

impl Corpus {
    /// Loads a YAML corpus file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let corpus: Corpus = serde_yaml::from_str(&raw)?;
        info!(
            "Loaded corpus with {} topics from {}",
            corpus.languages.values().map(|t| t.len()).sum::<usize>(),
            path.as_ref().display()
        );
        Ok(corpus)
    }

    /// Looks a topic up by id, then by title. Language matching ignores case.
    pub fn topic(&self, language: &str, topic: &str) -> Option<&TopicEntry> {
        let topics = self.languages.get(&language.to_lowercase())?;
        topics
            .get(topic)
            .or_else(|| topics.values().find(|t| t.title.eq_ignore_ascii_case(topic)))
    }

    /// Splits every topic into one concept chunk plus one chunk per example.
    pub fn chunks(&self) -> Vec<(String, String, ChunkMetadata)> {
        let mut chunks = Vec::new();
        for (language, topics) in &self.languages {
            for (topic_id, entry) in topics {
                let meta = || ChunkMetadata {
                    topic: entry.title.clone(),
                };
                chunks.push((
                    format!("{}_{}_content", language, topic_id),
                    entry.content.clone(),
                    meta(),
                ));
                for (i, example) in entry.examples.iter().enumerate() {
                    chunks.push((
                        format!("{}_{}_example_{}", language, topic_id, i),
                        format!("Example for {}:\n{}", entry.title, example),
                        meta(),
                    ));
                }
            }
        }
        chunks
    }
}

/// Retriever backed by an in-memory vector store over a [`Corpus`].
///
/// The corpus is embedded once at construction; lookups only read.
#[derive(Debug)]
pub struct CorpusRetriever<E: Embedder> {
    store: InMemoryVectorStore<E>,
}

impl<E: Embedder> CorpusRetriever<E> {
    pub async fn ingest(corpus: &Corpus, embedder: E) -> Result<Self, RetrievalError> {
        let mut store = InMemoryVectorStore::new(embedder);
        for (id, content, metadata) in corpus.chunks() {
            store.upsert_document(&id, &content, metadata).await?;
        }
        info!("RAG: ingested {} chunks", store.len());
        Ok(Self { store })
    }
}

#[async_trait]
impl<E: Embedder> Retriever for CorpusRetriever<E> {
    async fn retrieve(&self, query: &str, k: usize) -> Result<String, RetrievalError> {
        if self.store.is_empty() {
            return Err(RetrievalError::Corpus("corpus is empty".to_string()));
        }
        let docs = self.store.search_documents(query, k).await?;
        let parts: Vec<String> = docs
            .iter()
            .map(|doc| format!("--- Context (Topic: {}) ---\n{}\n", doc.metadata.topic, doc.content))
            .collect();
        Ok(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Bag-of-words embedder over a fixed vocabulary.
    #[derive(Debug)]
    struct KeywordEmbedder;

    const VOCAB: [&str; 4] = ["loop", "variable", "function", "class"];

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed_text(&self, text: &str) -> Result<Vec<f32>, LlmError> {
            let lower = text.to_lowercase();
            Ok(VOCAB.iter().map(|w| lower.matches(w).count() as f32).collect())
        }
    }

    #[derive(Debug)]
    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed_text(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
            Err(LlmError::Request("offline".into()))
        }
    }

    const CORPUS: &str = r#"
python:
  "1":
    title: Variables & Data Types
    content: A variable is a label. Every variable points to an object.
    examples:
      - "x = 10"
  "2":
    title: Loops
    content: A loop repeats work. The for loop walks a sequence.
"#;

    fn corpus() -> Corpus {
        serde_yaml::from_str(CORPUS).unwrap()
    }

    #[test]
    fn chunks_concepts_and_examples() {
        let chunks = corpus().chunks();
        assert_eq!(chunks.len(), 3);
        let example = chunks
            .iter()
            .find(|(id, _, _)| id == "python_1_example_0")
            .unwrap();
        assert_eq!(example.1, "Example for Variables & Data Types:\nx = 10");
        assert_eq!(example.2.topic, "Variables & Data Types");
    }

    #[test]
    fn topic_lookup_by_id_or_title() {
        let corpus = corpus();
        assert_eq!(corpus.topic("Python", "2").unwrap().title, "Loops");
        assert_eq!(corpus.topic("python", "loops").unwrap().title, "Loops");
        assert!(corpus.topic("java", "1").is_none());
    }

    #[test]
    fn loads_corpus_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", CORPUS).unwrap();
        let corpus = Corpus::load(file.path()).unwrap();
        assert!(corpus.topic("python", "1").is_some());
    }

    #[tokio::test]
    async fn retrieves_most_similar_chunk_formatted() {
        let retriever = CorpusRetriever::ingest(&corpus(), KeywordEmbedder).await.unwrap();
        let context = retriever.retrieve("loops in Python", 1).await.unwrap();
        assert!(context.starts_with("--- Context (Topic: Loops) ---\n"));
        assert!(context.contains("The for loop walks a sequence."));
    }

    #[tokio::test]
    async fn respects_k() {
        let retriever = CorpusRetriever::ingest(&corpus(), KeywordEmbedder).await.unwrap();
        let context = retriever.retrieve("variable", 2).await.unwrap();
        assert_eq!(context.matches("--- Context").count(), 2);
    }

    #[tokio::test]
    async fn embedding_failure_is_reported() {
        let err = CorpusRetriever::ingest(&corpus(), BrokenEmbedder).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Embedding(_)));
    }

    #[tokio::test]
    async fn empty_corpus_is_an_error() {
        let retriever = CorpusRetriever::ingest(&Corpus::default(), KeywordEmbedder)
            .await
            .unwrap();
        assert!(retriever.retrieve("anything", 3).await.is_err());
    }
}
