/// Instruction for the router's classification call; the last user message is appended
pub const ROUTER_SYSTEM_PROMPT: &str = "You are the Supervisor of an AI Learning Platform.
Analyze the user's message and select the best worker node to handle it.

Worker Nodes:
- 'chat': General coding questions, greetings, help, chit-chat.
- 'skill': Requests to generate a syllabus, learning path, or identify skills (e.g., \"Create a Python path\").
- 'content': Requests to explain a specific topic in depth or generate a lesson (e.g., \"Explain recursion\").
- 'interview': Requests to start a mock interview.

Return ONLY a JSON object: {\"next_node\": \"...\"}";

/// Schema the router's classification answer must satisfy
pub const ROUTER_RESPONSE_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "next_node": { "enum": ["chat", "skill", "content", "interview"] }
  },
  "required": ["next_node"]
}"#;

/// Schema the skill unit's reordered topic list must satisfy
pub const SKILL_RESPONSE_SCHEMA: &str = r#"{
  "type": "array",
  "items": { "type": "string" }
}"#;

/// Tutor persona used by the chat unit unless overridden
pub const CHAT_SYSTEM_PROMPT: &str = "You are an AI Tutor on an educational platform.
Answer the student's questions clearly and helpfully.
If they ask for code, provide it.
If they are stuck, give hints.";

/// Interviewer persona used by the interview unit unless overridden
pub const INTERVIEW_SYSTEM_PROMPT: &str = "You are an expert Technical Interviewer for a top-tier tech company.
Always make your response concise and short.

Personality:
- Professional, polite, but rigorous.
- Ask \"why\" and \"how\" follow-up questions.

Process:
1. If this is the start, welcome the candidate and ask the first question.
2. Evaluate their answer.
3. After a correct answer, make the next question harder.
4. After an incorrect answer, give a guiding hint instead of the answer.
5. Keep the conversation going.";

pub const CHAT_FALLBACK_RESPONSE: &str = "I'm having trouble thinking right now. Please try again.";

pub const INTERVIEW_FALLBACK_RESPONSE: &str =
    "I'm having trouble connecting to the interview server. Please try again.";

/// Misses on one question after which the interviewer reveals the answer
pub const REVEAL_AFTER_MISSES: u64 = 2;

/// Score percentage at or above which a topic counts as mastered
pub const MASTERY_THRESHOLD: f64 = 70.0;

pub const DEFAULT_LEARNING_PREFERENCE: &str = "Practical";
pub const DEFAULT_LEARNING_SPEED: &str = "Moderate";
pub const DEFAULT_DIFFICULTY_COMFORT: &str = "Medium";
pub const DEFAULT_FEEDBACK_STYLE: &str = "Hints";
pub const DEFAULT_GOAL_ORIENTATION: &str = "Projects";

pub const DEFAULT_TOPIC: &str = "Unknown Topic";
pub const DEFAULT_LANGUAGE: &str = "Python";
pub const DEFAULT_LEVEL: &str = "Intermediate";

pub const DEFAULT_INTERVIEW_TOPIC: &str = "General Coding";
pub const DEFAULT_INTERVIEW_DIFFICULTY: &str = "Medium";

/// Default bound on one retrieval lookup during content generation
pub const RETRIEVAL_TIMEOUT_SECS: u64 = 30;

/// Banner the CLI puts above static content when generation hit the quota
pub const QUOTA_BANNER: &str = "# Daily AI Quota Exceeded

**You have reached your daily AI usage limit.**
We cannot generate a personalized lesson for you right now. Below is the standard lesson content.

---

";
