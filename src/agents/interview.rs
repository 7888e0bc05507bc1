use super::{AgentBehavior, WorkerError};
use crate::config::AgentConfig;
use crate::constants::*;
use crate::core::{AgentState, StateUpdate};
use crate::llm::{ChatMessage, LanguageModel};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// The interviewer's judgement of the candidate's latest answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// Nothing to judge yet (opening turn, small talk)
    NoAnswer,
}

impl Verdict {
    /// What the candidate sees when the reply carried nothing but the verdict.
    fn spoken(&self) -> &'static str {
        match self {
            Verdict::Correct => "That's correct.",
            Verdict::Incorrect => "That's not quite right.",
            Verdict::NoAnswer => "Let's continue.",
        }
    }
}

/// Splits the leading `VERDICT: ...` line off a reply.
///
/// Returns `None` for the verdict when the first line is not a recognizable
/// verdict; the reply is then returned whole. The verdict line itself is
/// never part of the returned reply.
pub fn split_verdict(raw: &str) -> (Option<Verdict>, String) {
    let trimmed = raw.trim();
    let (first, rest) = trimmed.split_once('\n').unwrap_or((trimmed, ""));
    let label = first.trim().trim_matches(|c| c == '*' || c == '_' || c == '`').trim();

    let verdict = label
        .get(..8)
        .filter(|prefix| prefix.eq_ignore_ascii_case("verdict:"))
        .and_then(|_| match label[8..].trim().to_ascii_uppercase().as_str() {
            "CORRECT" => Some(Verdict::Correct),
            "INCORRECT" => Some(Verdict::Incorrect),
            "NONE" => Some(Verdict::NoAnswer),
            _ => None,
        });

    match verdict {
        Some(v) if !rest.trim().is_empty() => (Some(v), rest.trim().to_string()),
        Some(v) => (Some(v), v.spoken().to_string()),
        None => (None, trimmed.to_string()),
    }
}

/// Miss counter after a verdict, and whether the answer was revealed.
///
/// A correct answer resets the counter. An incorrect one increments it; on
/// reaching [`REVEAL_AFTER_MISSES`] the answer is revealed and the counter
/// resets for the next question. No verdict leaves it unchanged.
pub fn next_misses(prior: u64, verdict: Option<Verdict>) -> (u64, bool) {
    match verdict {
        Some(Verdict::Correct) => (0, false),
        Some(Verdict::Incorrect) if prior + 1 >= REVEAL_AFTER_MISSES => (0, true),
        Some(Verdict::Incorrect) => (prior + 1, false),
        Some(Verdict::NoAnswer) | None => (prior, false),
    }
}

/// Conducts a mock technical interview one turn at a time.
pub struct InterviewAgent {
    llm: Arc<dyn LanguageModel>,
    persona: String,
}

impl InterviewAgent {
    pub fn new(llm: Arc<dyn LanguageModel>, config: &AgentConfig) -> Self {
        Self {
            llm,
            persona: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| INTERVIEW_SYSTEM_PROMPT.to_string()),
        }
    }

    fn system_prompt(&self, topic: &str, difficulty: &str, misses: u64) -> String {
        let miss_rule = if misses + 1 >= REVEAL_AFTER_MISSES {
            "- If the latest answer is also incorrect, reveal the full answer, explain it briefly, \
             and move on to a new question."
        } else {
            "- If the latest answer is incorrect, give a guiding hint. Do not reveal the answer."
        };
        format!(
            "{}\n\nYou are conducting a realistic mock interview about {} ({}).\n\n\
             Answer protocol:\n\
             - Begin your reply with exactly one line: 'VERDICT: CORRECT', 'VERDICT: INCORRECT' \
             or 'VERDICT: NONE' (when there is no answer to judge yet), then your spoken response.\n\
             - The candidate has missed the current question {} time(s) in a row.\n\
             {}\n\n\
             Output Format:\nRaw string as spoken response.",
            self.persona, topic, difficulty, misses, miss_rule
        )
    }
}

#[async_trait]
impl AgentBehavior for InterviewAgent {
    fn name(&self) -> &'static str {
        "interview"
    }

    async fn execute_step(&self, state: &AgentState) -> Result<StateUpdate, WorkerError> {
        let topic = state.payload_text("interview_topic", DEFAULT_INTERVIEW_TOPIC);
        let difficulty = state.payload_text("difficulty", DEFAULT_INTERVIEW_DIFFICULTY);
        let misses = state
            .payload
            .get("consecutive_misses")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        debug!("InterviewAgent: {} ({}), misses so far: {}", topic, difficulty, misses);

        let mut turns = Vec::with_capacity(state.messages.len() + 2);
        turns.push(ChatMessage::system(&self.system_prompt(&topic, &difficulty, misses)));
        turns.extend(state.messages.iter().cloned());
        if state.messages.is_empty() {
            turns.push(ChatMessage::user(&format!("I am ready for my {} interview.", topic)));
        }

        let (reply, misses, revealed) = match self.llm.chat(&turns).await {
            Ok(raw) => {
                let (verdict, reply) = split_verdict(&raw);
                if verdict.is_none() {
                    warn!("InterviewAgent: reply carried no verdict, keeping miss count");
                }
                let (misses, revealed) = next_misses(misses, verdict);
                (reply, misses, revealed)
            }
            Err(e) => {
                error!("InterviewAgent error: {}", e);
                (INTERVIEW_FALLBACK_RESPONSE.to_string(), misses, false)
            }
        };

        let mut payload = state.payload.clone();
        payload.insert("consecutive_misses".to_string(), json!(misses));
        payload.insert("answer_revealed".to_string(), json!(revealed));
        Ok(StateUpdate::reply(&reply).with_payload(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Payload, UserProfile};
    use crate::llm::{LlmError, MockLanguageModel, Role};

    fn interview_state(messages: Vec<ChatMessage>, misses: Option<u64>) -> AgentState {
        let mut payload = Payload::new();
        payload.insert("interview_topic".into(), json!("Rust"));
        if let Some(m) = misses {
            payload.insert("consecutive_misses".into(), json!(m));
        }
        AgentState::new(messages, UserProfile::new(), payload)
    }

    async fn turn(reply: &str, misses: Option<u64>) -> (StateUpdate, Arc<MockLanguageModel>) {
        let mock = Arc::new(MockLanguageModel::replying(reply));
        let agent = InterviewAgent::new(mock.clone(), &AgentConfig::default());
        let state = interview_state(vec![ChatMessage::user("It moves the value.")], misses);
        (agent.execute_step(&state).await.unwrap(), mock)
    }

    #[test]
    fn verdict_line_is_parsed_and_removed() {
        let (v, reply) = split_verdict("VERDICT: INCORRECT\nNot quite. Think about ownership.");
        assert_eq!(v, Some(Verdict::Incorrect));
        assert_eq!(reply, "Not quite. Think about ownership.");

        let (v, _) = split_verdict("**Verdict: correct**\nGreat.");
        assert_eq!(v, Some(Verdict::Correct));

        let (v, reply) = split_verdict("Welcome! First question: what is a trait?");
        assert_eq!(v, None);
        assert_eq!(reply, "Welcome! First question: what is a trait?");
    }

    #[test]
    fn bare_verdict_is_not_spoken() {
        let (v, reply) = split_verdict("VERDICT: CORRECT");
        assert_eq!(v, Some(Verdict::Correct));
        assert_eq!(reply, "That's correct.");

        let (v, reply) = split_verdict("**VERDICT: INCORRECT**\n\n");
        assert_eq!(v, Some(Verdict::Incorrect));
        assert!(!reply.to_ascii_uppercase().contains("VERDICT"));
    }

    #[test]
    fn counter_transitions() {
        assert_eq!(next_misses(1, Some(Verdict::Correct)), (0, false));
        assert_eq!(next_misses(0, Some(Verdict::Incorrect)), (1, false));
        assert_eq!(next_misses(1, Some(Verdict::Incorrect)), (0, true));
        assert_eq!(next_misses(1, Some(Verdict::NoAnswer)), (1, false));
        assert_eq!(next_misses(1, None), (1, false));
    }

    #[tokio::test]
    async fn empty_conversation_gets_opening_turn() {
        let mock = Arc::new(MockLanguageModel::replying("VERDICT: NONE\nWelcome! What is a trait?"));
        let agent = InterviewAgent::new(mock.clone(), &AgentConfig::default());
        let update = agent.execute_step(&interview_state(vec![], None)).await.unwrap();

        let turns = &mock.chats()[0];
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1], ChatMessage::user("I am ready for my Rust interview."));
        assert!(turns[0].content.contains("mock interview about Rust (Medium)"));
        assert_eq!(update.messages, vec![ChatMessage::assistant("Welcome! What is a trait?")]);
        assert_eq!(update.payload.unwrap()["consecutive_misses"], json!(0));
    }

    #[tokio::test]
    async fn first_miss_gets_a_hint_rule() {
        let (update, mock) = turn("VERDICT: INCORRECT\nHint: think about Drop.", None).await;
        let payload = update.payload.unwrap();
        assert_eq!(payload["consecutive_misses"], json!(1));
        assert_eq!(payload["answer_revealed"], json!(false));
        assert_eq!(payload["interview_topic"], json!("Rust"));
        let system = &mock.chats()[0][0].content;
        assert!(system.contains("Do not reveal the answer."));
        assert!(system.contains("missed the current question 0 time(s)"));
    }

    #[tokio::test]
    async fn second_miss_reveals_and_resets() {
        let (update, mock) = turn("VERDICT: INCORRECT\nThe answer is: ...", Some(1)).await;
        let payload = update.payload.unwrap();
        assert_eq!(payload["consecutive_misses"], json!(0));
        assert_eq!(payload["answer_revealed"], json!(true));
        assert!(mock.chats()[0][0].content.contains("reveal the full answer"));
    }

    #[tokio::test]
    async fn correct_answer_resets() {
        let (update, _) = turn("VERDICT: CORRECT\nExactly. Now, why...", Some(1)).await;
        assert_eq!(update.payload.unwrap()["consecutive_misses"], json!(0));
    }

    #[tokio::test]
    async fn missing_verdict_keeps_counter() {
        let (update, _) = turn("Interesting, tell me more.", Some(1)).await;
        assert_eq!(update.messages[0].content, "Interesting, tell me more.");
        assert_eq!(update.payload.unwrap()["consecutive_misses"], json!(1));
    }

    #[tokio::test]
    async fn failure_becomes_apology() {
        let mock = Arc::new(MockLanguageModel::failing(LlmError::QuotaExceeded("429".into())));
        let agent = InterviewAgent::new(mock, &AgentConfig::default());
        let state = interview_state(vec![ChatMessage::user("answer")], Some(1));
        let update = agent.execute_step(&state).await.unwrap();

        assert_eq!(update.messages.len(), 1);
        assert_eq!(update.messages[0].role, Role::Assistant);
        assert_eq!(update.messages[0].content, INTERVIEW_FALLBACK_RESPONSE);
        assert_eq!(update.payload.unwrap()["consecutive_misses"], json!(1));
    }
}
