use crate::agents::*;
use crate::config::{default_top_k, EngineConfig, RetrievalConfig};
use crate::core::rag::{Corpus, CorpusRetriever, Retriever};
use crate::core::router::Supervisor;
use crate::core::{AgentState, RoutingDecision};
use crate::errors::Error;
use crate::llm::{LanguageModel, LlmClient, OpenAIEmbedder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, warn, Instrument};

/// Wires the router to the units: entry → router → at most one unit → end.
///
/// Holds only shared, read-only handles, so one instance can serve many
/// concurrent invocations.
pub struct Workflow {
    supervisor: Supervisor,
    chat: ChatAgent,
    skill: SkillAgent,
    content: ContentAgent,
    evaluator: EvaluatorAgent,
    interview: InterviewAgent,
}

impl Workflow {
    /// Builds the graph around injected capabilities.
    ///
    /// # Arguments
    /// * `llm` - Generative backend shared by the router and the units
    /// * `retriever` - Optional reference lookup for content generation
    /// * `config` - Prompt overrides and retrieval depth
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        retriever: Option<Arc<dyn Retriever>>,
        config: &EngineConfig,
    ) -> Self {
        let top_k = config
            .retrieval
            .as_ref()
            .map(|r| r.top_k)
            .unwrap_or_else(default_top_k);

        Self {
            supervisor: Supervisor::new(llm.clone()),
            chat: ChatAgent::new(llm.clone(), &config.agents.chat),
            skill: SkillAgent::new(llm.clone()),
            content: ContentAgent::new(llm.clone(), retriever, top_k)
                .with_retrieval_timeout(Duration::from_secs(config.llm.timeout_secs)),
            evaluator: EvaluatorAgent,
            interview: InterviewAgent::new(llm, &config.agents.interview),
        }
    }

    /// Builds the provider-backed client and, when configured, embeds the
    /// retrieval corpus.
    ///
    /// Only the client is required. A corpus that cannot be loaded or embedded
    /// leaves content generation running without reference material.
    pub async fn from_config(config: &EngineConfig) -> Result<Self, Error> {
        let llm: Arc<dyn LanguageModel> = Arc::new(LlmClient::new(&config.llm)?);

        let retriever = match &config.retrieval {
            Some(retrieval) => match build_retriever(retrieval, config.llm.timeout_secs).await {
                Ok(retriever) => Some(retriever),
                Err(e) => {
                    warn!("Retrieval disabled, corpus setup failed: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(Self::new(llm, retriever, config))
    }

    /// The unit behind a routing decision; `None` for `End`.
    fn worker(&self, decision: RoutingDecision) -> Option<&dyn AgentBehavior> {
        match decision {
            RoutingDecision::Chat => Some(&self.chat),
            RoutingDecision::Skill => Some(&self.skill),
            RoutingDecision::Content => Some(&self.content),
            RoutingDecision::Evaluate => Some(&self.evaluator),
            RoutingDecision::Interview => Some(&self.interview),
            RoutingDecision::End => None,
        }
    }

    /// Runs one invocation over a caller-owned state.
    ///
    /// The only error is a quota condition raised by content generation.
    pub async fn run(&self, mut state: AgentState) -> Result<AgentState, WorkerError> {
        async move {
            state.next_node = self.supervisor.route(&state).await;

            let Some(worker) = self.worker(state.next_node) else {
                info!("Graph routing: supervisor -> end");
                return Ok(state);
            };

            info!("Graph routing: supervisor -> {}", worker.name());
            let update = worker.execute_step(&state).await?;
            state.apply(update);
            Ok(state)
        }
        .instrument(info_span!("workflow"))
        .await
    }
}

async fn build_retriever(
    retrieval: &RetrievalConfig,
    timeout_secs: u64,
) -> Result<Arc<dyn Retriever>, Error> {
    let corpus = Corpus::load(&retrieval.corpus_path)?;
    let embedder = OpenAIEmbedder::new(&retrieval.embedder_model, timeout_secs)?;
    Ok(Arc::new(CorpusRetriever::ingest(&corpus, embedder).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use crate::core::{Payload, UserProfile};
    use crate::llm::{ChatMessage, LlmError, MockLanguageModel};
    use serde_json::json;

    fn workflow(mock: &Arc<MockLanguageModel>) -> Workflow {
        Workflow::new(mock.clone(), None, &EngineConfig::default())
    }

    fn state(messages: Vec<ChatMessage>, payload: serde_json::Value) -> AgentState {
        AgentState::new(messages, UserProfile::new(), payload.as_object().cloned().unwrap())
    }

    #[tokio::test]
    async fn unusable_corpus_leaves_engine_working() {
        let config = EngineConfig {
            llm: LlmConfig {
                provider: "ollama".to_string(),
                ..LlmConfig::default()
            },
            retrieval: Some(RetrievalConfig {
                corpus_path: "/nonexistent/corpus.yaml".to_string(),
                embedder_model: "text-embedding-3-small".to_string(),
                top_k: 3,
            }),
            ..EngineConfig::default()
        };
        let flow = Workflow::from_config(&config).await.unwrap();

        let payload = json!({"submission": [{"isCorrect": true}], "total_questions": 1});
        let out = flow.run(state(vec![], payload)).await.unwrap();
        assert_eq!(out.payload["status"], json!("MASTERED"));
    }

    #[tokio::test]
    async fn empty_request_ends_untouched() {
        let mock = Arc::new(MockLanguageModel::replying("unused"));
        let out = workflow(&mock).run(AgentState::default()).await.unwrap();
        assert_eq!(out, AgentState::default());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn chat_turn_classifies_then_answers() {
        let mock = Arc::new(MockLanguageModel::replying(r#"{"next_node": "chat"}"#));
        let history = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello!"),
            ChatMessage::user("what is a tuple?"),
        ];
        let out = workflow(&mock).run(state(history.clone(), json!({}))).await.unwrap();

        // one classification call plus one chat call
        assert_eq!(mock.calls(), 2);
        assert_eq!(out.messages.len(), 4);
        assert_eq!(&out.messages[..3], &history[..]);
        assert_eq!(out.messages[3], ChatMessage::assistant(r#"{"next_node": "chat"}"#));
        assert_eq!(out.next_node, RoutingDecision::End);
    }

    #[tokio::test]
    async fn evaluation_makes_no_backend_call() {
        let mock = Arc::new(MockLanguageModel::replying("unused"));
        let payload = json!({
            "submission": [{"isCorrect": true}, {"isCorrect": false}],
            "total_questions": 2
        });
        let out = workflow(&mock).run(state(vec![], payload)).await.unwrap();
        assert_eq!(mock.calls(), 0);
        assert_eq!(out.payload["status"], json!("WEAK"));
        assert_eq!(out.payload["score"], json!(50.0));
        assert!(out.payload.get("submission").is_none());
    }

    #[tokio::test]
    async fn content_request_populates_payload() {
        let mock = Arc::new(MockLanguageModel::replying("```markdown\n## Concept Simplified\nLoops.\n```"));
        let out = workflow(&mock)
            .run(state(vec![], json!({"topic_id": "loops"})))
            .await
            .unwrap();
        assert_eq!(mock.calls(), 1);
        assert_eq!(out.payload["content"], json!("## Concept Simplified\nLoops."));
        assert!(out.messages.is_empty());
    }

    #[tokio::test]
    async fn content_quota_aborts_the_invocation() {
        let mock = Arc::new(MockLanguageModel::failing(LlmError::QuotaExceeded("429".into())));
        let err = workflow(&mock)
            .run(state(vec![], json!({"topic_id": "loops"})))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::QuotaExceeded(_)));
    }

    #[tokio::test]
    async fn quota_elsewhere_degrades() {
        let mock = Arc::new(MockLanguageModel::failing(LlmError::QuotaExceeded("429".into())));
        let out = workflow(&mock)
            .run(state(vec![ChatMessage::user("hello")], json!({})))
            .await
            .unwrap();
        // classification fell back to chat, chat fell back to the apology
        assert_eq!(mock.calls(), 2);
        assert_eq!(
            out.messages.last().unwrap().content,
            crate::constants::CHAT_FALLBACK_RESPONSE
        );
    }

    #[tokio::test]
    async fn interview_keyword_runs_interview_with_single_call() {
        let mock = Arc::new(MockLanguageModel::replying("VERDICT: NONE\nWelcome. What is a lifetime?"));
        let out = workflow(&mock)
            .run(state(vec![ChatMessage::user("let's start the interview now")], json!({})))
            .await
            .unwrap();
        assert_eq!(mock.calls(), 1);
        assert_eq!(out.messages.len(), 2);
        assert_eq!(out.messages[1].content, "Welcome. What is a lifetime?");
        assert_eq!(out.payload["consecutive_misses"], json!(0));
    }

    #[tokio::test]
    async fn skill_request_orders_topics() {
        let mock = Arc::new(MockLanguageModel::replying("not a list"));
        let payload = json!({"quiz_results": [], "available_topics": ["A", "B", "C"]});
        let out = workflow(&mock).run(state(vec![], payload)).await.unwrap();
        assert_eq!(out.payload["ordered_titles"], json!(["C", "B", "A"]));
        assert_eq!(out.payload.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_invocations_share_one_workflow() {
        let mock = Arc::new(MockLanguageModel::replying("fine"));
        let flow = Arc::new(workflow(&mock));
        let mut handles = Vec::new();
        for i in 0..8u64 {
            let flow = flow.clone();
            handles.push(tokio::spawn(async move {
                let mut payload = Payload::new();
                payload.insert("submission".into(), json!([{"isCorrect": true}]));
                payload.insert("total_questions".into(), json!(i + 1));
                flow.run(AgentState::new(vec![], UserProfile::new(), payload)).await
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            let out = handle.await.unwrap().unwrap();
            assert_eq!(out.payload["total_questions"], json!(i + 1));
        }
    }
}
