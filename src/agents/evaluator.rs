use super::{AgentBehavior, WorkerError};
use crate::constants::MASTERY_THRESHOLD;
use crate::core::{AgentState, Payload, StateUpdate};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Mastery verdict for a topic quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MasteryStatus {
    Mastered,
    Weak,
}

impl MasteryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MasteryStatus::Mastered => "MASTERED",
            MasteryStatus::Weak => "WEAK",
        }
    }
}

/// Result of scoring a quiz submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub score: f64,
    pub correct_count: u64,
    pub total_questions: u64,
    pub status: MasteryStatus,
    pub feedback: String,
}

/// Whether an answer record is flagged correct (`isCorrect` or `is_correct`).
fn is_correct(record: &Value) -> bool {
    record
        .get("isCorrect")
        .or_else(|| record.get("is_correct"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Question count from the request. Integral floats such as `10.0` are
/// accepted; anything else counts as zero.
fn question_count(value: Option<&Value>) -> u64 {
    let Some(value) = value else {
        return 0;
    };
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => f as u64,
        _ => {
            warn!("EvaluatorAgent: unusable total_questions {}, scoring against zero", value);
            0
        }
    }
}

/// Scores a submission using the correctness flags it carries.
pub fn evaluate(submission: &[Value], total_questions: u64) -> Evaluation {
    let correct_count = submission.iter().filter(|r| is_correct(r)).count() as u64;
    let score = if total_questions > 0 {
        correct_count as f64 * 100.0 / total_questions as f64
    } else {
        0.0
    };
    let status = if score >= MASTERY_THRESHOLD {
        MasteryStatus::Mastered
    } else {
        MasteryStatus::Weak
    };

    Evaluation {
        score,
        correct_count,
        total_questions,
        status,
        feedback: format!("You scored {:.1}%. Status: {}", score, status.as_str()),
    }
}

/// Scores quiz submissions. Makes no backend call.
#[derive(Debug, Default)]
pub struct EvaluatorAgent;

#[async_trait]
impl AgentBehavior for EvaluatorAgent {
    fn name(&self) -> &'static str {
        "evaluate"
    }

    async fn execute_step(&self, state: &AgentState) -> Result<StateUpdate, WorkerError> {
        let submission: &[Value] = match state.payload.get("submission") {
            Some(Value::Array(records)) => records.as_slice(),
            Some(_) => {
                warn!("EvaluatorAgent: submission is not a list, scoring it as empty");
                &[]
            }
            None => &[],
        };
        let total_questions = question_count(state.payload.get("total_questions"));

        let evaluation = evaluate(submission, total_questions);
        debug!("EvaluatorAgent: {}", evaluation.feedback);

        let payload = match serde_json::to_value(&evaluation) {
            Ok(Value::Object(map)) => map,
            _ => Payload::new(),
        };
        Ok(StateUpdate::payload(payload))
    }
}
