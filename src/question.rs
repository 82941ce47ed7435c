//! Quiz question model shared by the backend, the client and the lifecycle controller.

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::error::SchemaViolation;

/// Every question carries exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// One multiple-choice item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(title = "Question", description = "A multiple-choice quiz question")]
pub struct Question {
    /// The text of the quiz question.
    pub question_text: String,
    /// An array of 4 possible answers for the question.
    #[schemars(length(min = 4, max = 4))]
    pub options: Vec<String>,
    /// The 0-based index of the correct answer in the 'options' array.
    #[schemars(range(min = 0, max = 3))]
    pub correct_answer_index: usize,
    /// A brief explanation of why the correct answer is correct.
    pub explanation: String,
}

impl Question {
    /// Check the invariants serde cannot express: option count, answer index bounds
    /// and a non-blank question.
    pub fn validate(&self) -> Result<(), String> {
        if self.question_text.trim().is_empty() {
            return Err("questionText is empty".to_string());
        }
        if self.options.len() != OPTION_COUNT {
            return Err(format!(
                "expected {} options, got {}",
                OPTION_COUNT,
                self.options.len()
            ));
        }
        if self.correct_answer_index >= self.options.len() {
            return Err(format!(
                "correctAnswerIndex {} is out of range",
                self.correct_answer_index
            ));
        }
        Ok(())
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer_index]
    }

    pub fn is_correct(&self, selected: Option<usize>) -> bool {
        selected == Some(self.correct_answer_index)
    }
}

/// JSON schema of the full response: an array of questions.
pub fn quiz_response_schema() -> serde_json::Value {
    serde_json::to_value(schema_for!(Vec<Question>)).unwrap_or(serde_json::Value::Null)
}

/// Turn untrusted JSON elements into questions, failing on the first element that
/// does not satisfy the contract.
pub fn questions_from_values(
    values: Vec<serde_json::Value>,
) -> Result<Vec<Question>, SchemaViolation> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let question: Question = serde_json::from_value(value).map_err(|e| SchemaViolation {
                index,
                reason: e.to_string(),
            })?;
            question
                .validate()
                .map_err(|reason| SchemaViolation { index, reason })?;
            Ok(question)
        })
        .collect()
}
