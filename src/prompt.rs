//! Instruction prompt sent to the model.

use std::ops::RangeInclusive;

/// Number of questions the model is asked to produce.
pub const QUESTION_COUNT: RangeInclusive<usize> = 5..=10;

/// System instruction for chat-style providers that accept one.
pub const SYSTEM_PROMPT: &str = "You are a teacher who writes multiple-choice quizzes. \
Reply with a JSON array of questions and nothing else.";

/// Build the fixed quiz instruction around the user's context.
pub fn build_quiz_prompt(context: &str) -> String {
    format!(
        "Based on the following text, generate a multiple-choice quiz with {min} to {max} questions. \
For each question, provide exactly 4 options. The questions should test understanding of the key concepts in the text.

Context:
---
{context}
---

Provide the output in the JSON format defined by the schema.",
        min = QUESTION_COUNT.start(),
        max = QUESTION_COUNT.end(),
        context = context,
    )
}

/// Append schema guidance for providers without native structured output.
pub fn with_schema_guidance(prompt: &str, schema: &serde_json::Value) -> String {
    let schema_json = serde_json::to_string_pretty(schema)
        .unwrap_or_else(|_| "Schema serialization failed".to_string());

    format!(
        "{}\n\n## Response Format\nRespond with only a JSON array matching this schema, without any commentary:\n```json\n{}\n```",
        prompt, schema_json
    )
}
