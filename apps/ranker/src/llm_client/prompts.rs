// Cross-cutting prompt fragments shared by every LLM caller.
// Each caller that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps scores grounded in the documents rather than in who the candidate is.
pub const EVIDENCE_ONLY_INSTRUCTION: &str = "\
    Base every judgement strictly on evidence present in the resume text. \
    Do NOT infer details the resume does not state. \
    Ignore the candidate's name, gender, age and nationality when scoring.";
