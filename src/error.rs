use thiserror::Error;

/// Minimum number of trimmed characters a context needs before a quiz can be generated.
pub const MIN_CONTEXT_CHARS: usize = 50;

/// Maximum number of characters accepted for typed text input.
pub const MAX_TEXT_CHARS: usize = 10_000;

#[derive(Error, Debug)]
pub enum QuizGeneratorError {
    #[error("AI error: {0}")]
    Ai(#[from] AIError),
    #[error("The AI returned an empty or invalid response. Please try again.")]
    EmptyResponse,
    #[error("AI returned data in an unexpected format.")]
    NotAnArray,
    #[error("JSON deserialization error: {0}. Raw response: {1}")]
    JsonDeserialization(#[source] serde_json::Error, String),
    #[error(transparent)]
    Schema(#[from] SchemaViolation),
}

/// A response element that does not satisfy the question contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Question {index} does not match the expected shape: {reason}")]
pub struct SchemaViolation {
    pub index: usize,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum AIError {
    #[error("Claude API error: {0}")]
    Claude(#[from] ClaudeError),
    #[error("DeepSeek API error: {0}")]
    DeepSeek(#[from] DeepSeekError),
    #[error("Gemini API error: {0}")]
    Gemini(#[from] GeminiError),
    #[error("Mock error: {0}")]
    Mock(String),
}

#[derive(Error, Debug)]
pub enum ClaudeError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum DeepSeekError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
    #[error("Response blocked: {0}")]
    Blocked(String),
}

/// Failures of the quiz generation client, as seen from the front end.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Please provide at least 50 characters of text to generate a meaningful quiz.")]
    ContextTooShort,
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("{0}")]
    MalformedResponse(String),
    #[error("The AI couldn't generate a quiz from the provided text. Please try with a different text or file.")]
    EmptyQuiz,
    #[error(transparent)]
    Schema(#[from] SchemaViolation),
}

impl GenerationError {
    /// Message shown to the user. Everything except client-side validation is
    /// wrapped so the origin of the failure is obvious.
    pub fn user_message(&self) -> String {
        match self {
            Self::ContextTooShort | Self::EmptyQuiz => self.to_string(),
            other => format!("Failed to generate quiz. {}", other),
        }
    }
}

/// Failures turning a user-supplied file into text.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("The PDF file is empty. Please select a file with content.")]
    EmptyFile,
    #[error("The PDF file is encrypted and cannot be read.")]
    Encrypted,
    #[error("Could not process PDF file. It might be corrupted or in an unsupported format.")]
    Unreadable(String),
    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),
}

/// Problems with the draft input, detected before anything leaves the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Please provide input text or a PDF file.")]
    Missing,
    #[error("Please provide at least 50 characters of text to generate a meaningful quiz.")]
    TextTooShort,
    #[error("The PDF does not contain enough text to generate a meaningful quiz.")]
    PdfTooShort,
    #[error("Text is limited to 10000 characters (got {0}).")]
    TooLong(usize),
}

/// Precondition violations reported by the quiz lifecycle controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: &'static str },
    #[error("a quiz needs a non-empty context")]
    EmptyContext,
    #[error("question {index} does not exist (quiz has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },
    #[error("option {option} does not exist for question {index}")]
    OptionOutOfRange { index: usize, option: usize },
    #[error("{unanswered} question(s) still unanswered")]
    Incomplete { unanswered: usize },
}
