pub mod client;
pub mod clients;
pub mod config;
pub mod controller;
pub mod core;
pub mod error;
pub mod extract;
pub mod interceptors;
pub mod json_utils;
pub mod prompt;
pub mod question;
pub mod server;
pub mod session;

// Convenient re-exports
pub use client::{QuizApiClient, QuizSource};
pub use controller::{Grade, QuizController, QuizState, Score};
pub use crate::core::{LowLevelClient, QuizGenerator};
pub use error::{GenerationError, QuizError, QuizGeneratorError};
pub use extract::{PdfTextExtractor, TextExtractor};
pub use question::Question;
pub use session::{QuizInput, QuizSession};
