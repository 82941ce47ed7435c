//! One user's quiz session: draft input, extraction, generation and the
//! lifecycle controller wired together.

use tracing::{debug, info, instrument, warn};

use crate::client::QuizSource;
use crate::controller::{QuizController, QuizState, Score};
use crate::error::{InputError, QuizError, MAX_TEXT_CHARS, MIN_CONTEXT_CHARS};
use crate::extract::TextExtractor;

/// What the user has provided so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizInput {
    Text(String),
    Pdf { name: String, bytes: Vec<u8> },
}

pub struct QuizSession<S, E> {
    source: S,
    extractor: E,
    controller: QuizController,
    input: Option<QuizInput>,
}

impl<S: QuizSource, E: TextExtractor> QuizSession<S, E> {
    pub fn new(source: S, extractor: E) -> Self {
        Self {
            source,
            extractor,
            controller: QuizController::new(),
            input: None,
        }
    }

    pub fn controller(&self) -> &QuizController {
        &self.controller
    }

    pub fn state(&self) -> QuizState {
        self.controller.state()
    }

    pub fn input(&self) -> Option<&QuizInput> {
        self.input.as_ref()
    }

    /// Replace the draft with typed text. Over-long text is refused and the
    /// previous draft is kept.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), InputError> {
        let text = text.into();
        let len = text.chars().count();
        if len > MAX_TEXT_CHARS {
            return Err(InputError::TooLong(len));
        }
        self.input = Some(QuizInput::Text(text));
        Ok(())
    }

    pub fn set_pdf(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.input = Some(QuizInput::Pdf {
            name: name.into(),
            bytes,
        });
    }

    /// Resolve the draft into a context string, or the message to show instead.
    fn prepare_context(&self) -> Result<String, String> {
        match &self.input {
            None => Err(InputError::Missing.to_string()),
            Some(QuizInput::Text(text)) => {
                if text.trim().chars().count() < MIN_CONTEXT_CHARS {
                    return Err(InputError::TextTooShort.to_string());
                }
                Ok(text.clone())
            }
            Some(QuizInput::Pdf { name, bytes }) => {
                debug!(file = %name, size = bytes.len(), "Extracting text from PDF");
                let text = self.extractor.extract(bytes).map_err(|e| {
                    warn!(file = %name, error = %e, "PDF extraction failed");
                    e.to_string()
                })?;
                if text.trim().chars().count() < MIN_CONTEXT_CHARS {
                    return Err(InputError::PdfTooShort.to_string());
                }
                Ok(text)
            }
        }
    }

    /// Validate the draft, extract text if needed and request a quiz.
    ///
    /// Input and extraction problems do not reach the quiz source; they leave the
    /// session in `Idle` with [`QuizController::error`] set, as do generation
    /// failures. `Err` is returned only when the session is not `Idle`.
    #[instrument(skip(self))]
    pub async fn generate(&mut self) -> Result<(), QuizError> {
        if self.controller.state() != QuizState::Idle {
            return Err(QuizError::InvalidTransition {
                action: "generate a quiz",
                state: self.controller.state().as_str(),
            });
        }

        let context = match self.prepare_context() {
            Ok(context) => context,
            Err(message) => {
                return self.controller.fail(message);
            }
        };

        self.controller.begin_generation(&context)?;
        let outcome = self.source.generate(&context).await;
        self.controller.complete_generation(outcome)?;
        if self.controller.state() == QuizState::Taking {
            info!(questions = self.controller.questions().len(), "Quiz ready");
        }
        Ok(())
    }

    pub fn select_answer(&mut self, index: usize, option: usize) -> Result<(), QuizError> {
        self.controller.select_answer(index, option)
    }

    pub fn submit(&mut self) -> Result<Score, QuizError> {
        self.controller.submit()
    }

    /// Start over: back to `Idle` with no draft input.
    pub fn reset(&mut self) {
        self.input = None;
        self.controller.reset();
    }
}
