//! Quiz lifecycle controller.
//!
//! A pure state machine over `Idle → Generating → Taking → Results`. It owns the
//! question set and the answer slots for one session and performs no I/O; the
//! generation call itself happens elsewhere and reports back through
//! [`QuizController::complete_generation`].

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{GenerationError, QuizError};
use crate::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizState {
    #[default]
    Idle,
    Generating,
    Taking,
    Results,
}

impl QuizState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::Taking => "taking",
            Self::Results => "results",
        }
    }
}

impl std::fmt::Display for QuizState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Results colour band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Strong,
    Fair,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    /// Whole-number percentage, rounded half up. An empty quiz scores 0.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as u32
    }

    pub fn grade(&self) -> Grade {
        match self.percentage() {
            80.. => Grade::Strong,
            50.. => Grade::Fair,
            _ => Grade::Weak,
        }
    }
}

/// One row of the results view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionReview<'a> {
    pub question: &'a Question,
    pub selected: Option<usize>,
    pub is_correct: bool,
}

fn answers_as_indices<S: Serializer>(answers: &[Option<usize>], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(answers.iter().map(|a| a.map_or(-1, |i| i as i64)))
}

/// Serialisable view of the controller for front ends; unanswered slots are `-1`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: QuizState,
    pub questions: Vec<Question>,
    #[serde(serialize_with = "answers_as_indices")]
    pub user_answers: Vec<Option<usize>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct QuizController {
    state: QuizState,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    error: Option<String>,
}

impl QuizController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn transition(&mut self, to: QuizState) {
        debug!(from = %self.state, to = %to, "Quiz state transition");
        self.state = to;
    }

    fn expect_state(&self, expected: QuizState, action: &'static str) -> Result<(), QuizError> {
        if self.state != expected {
            return Err(QuizError::InvalidTransition {
                action,
                state: self.state.as_str(),
            });
        }
        Ok(())
    }

    /// `Idle → Generating`. Clears any previous error.
    pub fn begin_generation(&mut self, context: &str) -> Result<(), QuizError> {
        self.expect_state(QuizState::Idle, "start generating")?;
        if context.trim().is_empty() {
            return Err(QuizError::EmptyContext);
        }
        self.error = None;
        self.transition(QuizState::Generating);
        Ok(())
    }

    /// Leave `Generating`: to `Taking` with all slots unanswered when questions arrived,
    /// otherwise back to `Idle` with a message for display.
    pub fn complete_generation(
        &mut self,
        outcome: Result<Vec<Question>, GenerationError>,
    ) -> Result<(), QuizError> {
        self.expect_state(QuizState::Generating, "finish generating")?;
        match outcome {
            Ok(questions) if !questions.is_empty() => {
                self.answers = vec![None; questions.len()];
                self.questions = questions;
                self.transition(QuizState::Taking);
            }
            Ok(_) => self.fail(GenerationError::EmptyQuiz.user_message())?,
            Err(e) => self.fail(e.user_message())?,
        }
        Ok(())
    }

    /// Return to `Idle` from `Generating` with `message`. Also used while `Idle` when
    /// input validation fails before any request is made. A quiz in progress or its
    /// results are never discarded this way.
    pub(crate) fn fail(&mut self, message: impl Into<String>) -> Result<(), QuizError> {
        if !matches!(self.state, QuizState::Idle | QuizState::Generating) {
            return Err(QuizError::InvalidTransition {
                action: "fail generation",
                state: self.state.as_str(),
            });
        }
        let message = message.into();
        debug!(error = %message, "Quiz generation failed");
        self.questions.clear();
        self.answers.clear();
        self.error = Some(message);
        self.transition(QuizState::Idle);
        Ok(())
    }

    /// Record `option` as the answer to question `index`. Other slots are untouched.
    pub fn select_answer(&mut self, index: usize, option: usize) -> Result<(), QuizError> {
        self.expect_state(QuizState::Taking, "answer")?;
        let question = self.questions.get(index).ok_or(QuizError::QuestionOutOfRange {
            index,
            len: self.questions.len(),
        })?;
        if option >= question.options.len() {
            return Err(QuizError::OptionOutOfRange { index, option });
        }
        self.answers[index] = Some(option);
        Ok(())
    }

    pub fn unanswered(&self) -> usize {
        self.answers.iter().filter(|a| a.is_none()).count()
    }

    pub fn all_answered(&self) -> bool {
        self.unanswered() == 0
    }

    /// `Taking → Results`, only once every question has an answer.
    pub fn submit(&mut self) -> Result<Score, QuizError> {
        self.expect_state(QuizState::Taking, "submit")?;
        let unanswered = self.unanswered();
        if unanswered > 0 {
            return Err(QuizError::Incomplete { unanswered });
        }
        self.transition(QuizState::Results);
        Ok(self.score())
    }

    /// Back to `Idle` from anywhere, discarding questions, answers and error.
    pub fn reset(&mut self) {
        self.questions.clear();
        self.answers.clear();
        self.error = None;
        self.transition(QuizState::Idle);
    }

    /// Count of answers matching each question's correct index.
    pub fn score(&self) -> Score {
        let correct = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| q.is_correct(**a))
            .count();
        Score {
            correct,
            total: self.questions.len(),
        }
    }

    pub fn review(&self) -> Vec<QuestionReview<'_>> {
        self.questions
            .iter()
            .zip(&self.answers)
            .map(|(question, &selected)| QuestionReview {
                question,
                selected,
                is_correct: question.is_correct(selected),
            })
            .collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            questions: self.questions.clone(),
            user_answers: self.answers.clone(),
            error: self.error.clone(),
        }
    }
}
