//! Generation core: wraps a low-level model client with the quiz prompt, the response
//! schema and validation of whatever the model sends back.

use crate::error::{AIError, QuizGeneratorError};
use crate::interceptors::Interceptor;
use crate::json_utils::first_json_value;
use crate::prompt::{build_quiz_prompt, with_schema_guidance, QUESTION_COUNT};
use crate::question::{questions_from_values, quiz_response_schema, Question};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Longest slice of a raw model response quoted back inside an error.
const RAW_EXCERPT_CHARS: usize = 200;

/// Low-level model client abstraction.
///
/// Implementors provide `ask_raw`, which executes a prompt and returns the raw
/// model text. Providers with native structured output override `ask_structured`;
/// the default appends the schema to the prompt as guidance.
#[async_trait]
pub trait LowLevelClient: Send + Sync + Debug {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError>;

    async fn ask_structured(
        &self,
        prompt: String,
        schema: &serde_json::Value,
    ) -> Result<String, AIError> {
        self.ask_raw(with_schema_guidance(&prompt, schema)).await
    }

    /// Clone this client into a boxed trait object
    fn clone_box(&self) -> Box<dyn LowLevelClient>;
}

impl Clone for Box<dyn LowLevelClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl LowLevelClient for Box<dyn LowLevelClient> {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.as_ref().ask_raw(prompt).await
    }

    async fn ask_structured(
        &self,
        prompt: String,
        schema: &serde_json::Value,
    ) -> Result<String, AIError> {
        self.as_ref().ask_structured(prompt, schema).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        self.as_ref().clone_box()
    }
}

/// Turns a context into a validated question set using any [`LowLevelClient`].
#[derive(Clone, Debug)]
pub struct QuizGenerator<C: LowLevelClient> {
    client: C,
    schema: serde_json::Value,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl<C: LowLevelClient> QuizGenerator<C> {
    pub fn new(client: C) -> Self {
        info!("Creating new QuizGenerator");
        Self {
            client,
            schema: quiz_response_schema(),
            interceptor: None,
        }
    }

    /// Record every prompt/response pair with the given interceptor.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn schema(&self) -> &serde_json::Value {
        &self.schema
    }

    /// Ask the model for a quiz about `context` and validate the answer.
    ///
    /// Context length is the caller's concern; the HTTP layer enforces it before
    /// anything reaches the generator.
    #[instrument(target = "quiz_forge::generator", skip(self, context), fields(context_len = context.len()))]
    pub async fn generate(&self, context: &str) -> Result<Vec<Question>, QuizGeneratorError> {
        let prompt = build_quiz_prompt(context);
        debug!(prompt_len = prompt.len(), "Sending quiz prompt");

        let raw = self.client.ask_structured(prompt.clone(), &self.schema).await?;

        if let Some(interceptor) = &self.interceptor {
            if let Err(e) = interceptor.save(&prompt, &raw).await {
                warn!(error = %e, "Failed to save transcript");
            }
        }

        let questions = parse_quiz_response(&raw)?;
        if !QUESTION_COUNT.contains(&questions.len()) {
            warn!(count = questions.len(), "Model returned a question count outside the requested range");
        }
        info!(count = questions.len(), "Quiz generated");
        Ok(questions)
    }
}

/// Validate raw model text as a question array.
pub fn parse_quiz_response(raw: &str) -> Result<Vec<Question>, QuizGeneratorError> {
    if raw.trim().is_empty() {
        return Err(QuizGeneratorError::EmptyResponse);
    }

    let value = first_json_value(raw).map_err(|e| {
        let excerpt: String = raw.chars().take(RAW_EXCERPT_CHARS).collect();
        QuizGeneratorError::JsonDeserialization(e, excerpt)
    })?;

    let serde_json::Value::Array(items) = value else {
        return Err(QuizGeneratorError::NotAnArray);
    };

    Ok(questions_from_values(items)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::{MockClient, MockResponse};

    const QUIZ: &str = r#"[{"questionText":"Q?","options":["a","b","c","d"],"correctAnswerIndex":2,"explanation":"because"}]"#;

    #[test]
    fn parses_plain_array() {
        let questions = parse_quiz_response(QUIZ).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer_index, 2);
    }

    #[test]
    fn parses_array_wrapped_in_fences() {
        let raw = format!("Here is your quiz:\n```json\n{}\n```\nGood luck!", QUIZ);
        assert_eq!(parse_quiz_response(&raw).unwrap().len(), 1);
    }

    #[test]
    fn blank_response_is_empty_error() {
        assert!(matches!(
            parse_quiz_response("  \n"),
            Err(QuizGeneratorError::EmptyResponse)
        ));
    }

    #[test]
    fn object_response_is_not_an_array() {
        let err = parse_quiz_response(r#"{"questions": []}"#).unwrap_err();
        assert!(matches!(err, QuizGeneratorError::NotAnArray));
        assert_eq!(err.to_string(), "AI returned data in an unexpected format.");
    }

    #[test]
    fn garbage_is_deserialization_error() {
        assert!(matches!(
            parse_quiz_response("no json here"),
            Err(QuizGeneratorError::JsonDeserialization(_, _))
        ));
    }

    #[tokio::test]
    async fn generate_sends_context_and_schema_guidance() {
        let (client, handle) = MockClient::with_responses(vec![MockResponse::Text(QUIZ.to_string())]);
        let generator = QuizGenerator::new(client);

        let questions = generator.generate("The mitochondria is the powerhouse of the cell.").await.unwrap();
        assert_eq!(questions.len(), 1);

        let prompts = handle.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("The mitochondria is the powerhouse of the cell."));
        assert!(prompts[0].contains("## Response Format"));
    }

    #[tokio::test]
    async fn generate_surfaces_provider_errors() {
        let (client, _handle) = MockClient::with_responses(vec![MockResponse::Error("boom".into())]);
        let generator = QuizGenerator::new(client);
        let err = generator.generate("context").await.unwrap_err();
        assert!(matches!(err, QuizGeneratorError::Ai(AIError::Mock(_))));
    }
}
