use crate::llm::{ChatMessage, LanguageModel, LlmError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted language model for tests and dry runs.
///
/// Every call returns the same scripted outcome. Prompts and chat turns are
/// recorded so callers can assert on what was sent.
#[derive(Debug)]
pub struct MockLanguageModel {
    outcome: Result<String, LlmError>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    turns: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockLanguageModel {
    pub fn replying(response: &str) -> Self {
        Self::with_outcome(Ok(response.to_string()))
    }

    pub fn failing(error: LlmError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<String, LlmError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            turns: Mutex::new(Vec::new()),
        }
    }

    /// Number of `complete` and `chat` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts passed to `complete`, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Turn lists passed to `chat`, in call order.
    pub fn chats(&self) -> Vec<Vec<ChatMessage>> {
        self.turns.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.outcome.clone()
    }

    async fn chat(&self, turns: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut recorded) = self.turns.lock() {
            recorded.push(turns.to_vec());
        }
        self.outcome.clone()
    }
}
