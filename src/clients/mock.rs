use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::{core::LowLevelClient, error::AIError};

/// A scripted reply from [`MockClient`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    Text(String),
    Error(String),
}

/// Shared control surface for a [`MockClient`]: queue replies, inspect prompts.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    fallback: Mutex<Option<MockResponse>>,
    prompts: Mutex<Vec<String>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockHandle {
    pub fn push(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    /// Reply used once the queue is exhausted.
    pub fn set_fallback(&self, response: MockResponse) {
        *lock(&self.fallback) = Some(response);
    }

    /// Every prompt received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    fn next(&self, prompt: String) -> Option<MockResponse> {
        lock(&self.prompts).push(prompt);
        lock(&self.responses)
            .pop_front()
            .or_else(|| lock(&self.fallback).clone())
    }
}

/// Mock client for tests and keyless demos.
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (Self { handle: handle.clone() }, handle)
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        for response in responses {
            handle.push(response);
        }
        (client, handle)
    }

    /// A mock that answers every prompt with [`DEMO_QUIZ`].
    pub fn demo() -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        handle.set_fallback(MockResponse::Text(DEMO_QUIZ.to_string()));
        (client, handle)
    }
}

#[async_trait]
impl LowLevelClient for MockClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        debug!(prompt_len = prompt.len(), "Mock client received prompt");
        match self.handle.next(prompt) {
            Some(MockResponse::Text(text)) => Ok(text),
            Some(MockResponse::Error(message)) => Err(AIError::Mock(message)),
            None => Err(AIError::Mock("no mock responses queued".to_string())),
        }
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

/// Canned quiz served by [`MockClient::demo`].
pub const DEMO_QUIZ: &str = r#"[
  {
    "questionText": "What does the generator need before it can build a quiz?",
    "options": ["A PDF only", "At least 50 characters of context", "An account", "A question count"],
    "correctAnswerIndex": 1,
    "explanation": "Any pasted or extracted text with at least 50 non-blank characters can be turned into a quiz."
  },
  {
    "questionText": "How many options does every question have?",
    "options": ["2", "3", "4", "5"],
    "correctAnswerIndex": 2,
    "explanation": "Each question is generated with exactly four options."
  },
  {
    "questionText": "Which state follows a successful generation?",
    "options": ["idle", "generating", "taking", "results"],
    "correctAnswerIndex": 2,
    "explanation": "Once questions arrive the session moves to taking the quiz."
  },
  {
    "questionText": "What happens to answers on reset?",
    "options": ["They are saved", "They are cleared", "They are scored again", "They are sent to the server"],
    "correctAnswerIndex": 1,
    "explanation": "Reset discards questions, answers and any error."
  },
  {
    "questionText": "How is the score computed?",
    "options": ["Answered questions", "Correct answers", "Time taken", "Options viewed"],
    "correctAnswerIndex": 1,
    "explanation": "The score counts answers matching each question's correct index."
  }
]"#;
