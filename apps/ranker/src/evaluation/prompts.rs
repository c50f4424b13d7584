// Prompt constants for the LLM-backed evaluators.
// Reuses cross-cutting fragments from llm_client::prompts.

use super::{EvaluationRequest, EvaluatorKind};
use crate::llm_client::prompts::{EVIDENCE_ONLY_INSTRUCTION, JSON_ONLY_SYSTEM};

pub const SKILLS_SYSTEM: &str = r#"You are a technical skills evaluator. Analyze the job requirements and candidate resume to evaluate skills match.

Return a JSON object with this EXACT schema:
{
  "score": <0-100>,
  "matched": [<skills the candidate has that match job requirements>],
  "missing": [<required skills the candidate lacks>],
  "partial": [<similar skills that partially match>],
  "reasoning": "<brief explanation of skills match>"
}"#;

pub const EXPERIENCE_SYSTEM: &str = r#"You are an experience evaluator. Analyze job requirements and candidate background to assess experience match.

Return a JSON object with this EXACT schema:
{
  "score": <0-100>,
  "yearsOfExperience": <number>,
  "seniority": "<junior|mid|senior|lead>",
  "hasLeadership": <boolean>,
  "relevantRoles": [<candidate roles relevant to the job>],
  "reasoning": "<brief explanation of experience match>"
}"#;

pub const EDUCATION_SYSTEM: &str = r#"You are an education evaluator. Analyze job requirements and candidate education to assess educational match.

Return a JSON object with this EXACT schema:
{
  "score": <0-100>,
  "degree": "<candidate's degree or 'Self-taught'>",
  "degreeMatch": <boolean>,
  "certifications": [<all certifications the candidate has>],
  "relevantCertifications": [<certifications relevant to the job>],
  "reasoning": "<brief explanation of education match>"
}"#;

pub const CULTURE_SYSTEM: &str = r#"You are a culture fit evaluator. Analyze job requirements and candidate background to assess cultural fit and soft skills.

Return a JSON object with this EXACT schema:
{
  "score": <0-100>,
  "traits": [<cultural traits evident from the resume>],
  "indicators": [<specific resume indicators of these traits>],
  "softSkills": [<soft skills demonstrated>],
  "reasoning": "<brief explanation of culture fit score>"
}"#;

pub fn system_prompt(kind: EvaluatorKind) -> String {
    let role = match kind {
        EvaluatorKind::Skills => SKILLS_SYSTEM,
        EvaluatorKind::Experience => EXPERIENCE_SYSTEM,
        EvaluatorKind::Education => EDUCATION_SYSTEM,
        EvaluatorKind::Culture => CULTURE_SYSTEM,
    };
    format!("{role}\n\n{EVIDENCE_ONLY_INSTRUCTION}\n{JSON_ONLY_SYSTEM}")
}

fn focus(kind: EvaluatorKind) -> &'static str {
    match kind {
        EvaluatorKind::Skills => "technical skills match",
        EvaluatorKind::Experience => "professional experience match",
        EvaluatorKind::Education => "educational background match",
        EvaluatorKind::Culture => "cultural fit and soft skills",
    }
}

/// User prompt for one evaluation. Inputs are interpolated in a single pass,
/// so braces inside a resume, name or job description are left as written.
pub fn build_evaluation_prompt(kind: EvaluatorKind, request: &EvaluationRequest) -> String {
    format!(
        "Job Description:\n{job_description}\n\n\
         Candidate: {candidate_name}\n\n\
         Resume:\n{resume_text}\n\n\
         Evaluate the {focus}. Return JSON only.",
        job_description = request.job_description,
        candidate_name = request.candidate_name,
        resume_text = request.candidate_text,
        focus = focus(kind),
    )
}
