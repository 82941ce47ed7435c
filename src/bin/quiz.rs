use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};
use quiz_forge::client::{QuizApiClient, DEFAULT_ENDPOINT};
use quiz_forge::controller::{Grade, QuizState};
use quiz_forge::error::QuizError;
use quiz_forge::extract::PdfTextExtractor;
use quiz_forge::session::QuizSession;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about = "Take an AI-generated quiz in the terminal", long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["text", "text_file", "pdf"])))]
struct Args {
    /// Text to build the quiz from (50 to 10000 characters)
    #[arg(long)]
    text: Option<String>,

    /// Read the quiz text from a file
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Build the quiz from the text of a PDF
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Quiz generation endpoint
    #[arg(long, env = "QUIZ_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
}

type Session = QuizSession<QuizApiClient, PdfTextExtractor>;

async fn load_input(session: &mut Session, args: &Args) -> anyhow::Result<()> {
    if let Some(text) = &args.text {
        session.set_text(text.clone())?;
    } else if let Some(path) = &args.text_file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        session.set_text(text)?;
    } else if let Some(path) = &args.pdf {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        session.set_pdf(name, bytes);
    }
    Ok(())
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, text: &str) -> anyhow::Result<String> {
    print!("{}", text);
    std::io::stdout().flush()?;
    match lines.next_line().await? {
        Some(line) => Ok(line.trim().to_string()),
        None => bail!("Input closed before the quiz was finished"),
    }
}

/// Ask one question until a valid choice (or an empty skip) is entered.
async fn ask(
    session: &mut Session,
    lines: &mut Lines<BufReader<Stdin>>,
    index: usize,
) -> anyhow::Result<()> {
    let question = session.controller().questions()[index].clone();
    let total = session.controller().questions().len();

    println!("\nQuestion {} of {}", index + 1, total);
    println!("{}", question.question_text);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {}", i + 1, option);
    }

    loop {
        let answer = prompt(lines, "Your answer (1-4, Enter to skip): ").await?;
        if answer.is_empty() {
            return Ok(());
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=question.options.len()).contains(&n) => {
                session.select_answer(index, n - 1)?;
                return Ok(());
            }
            _ => println!("Please enter a number between 1 and {}.", question.options.len()),
        }
    }
}

fn print_results(session: &Session) {
    let score = session.controller().score();
    let band = match score.grade() {
        Grade::Strong => "Great work!",
        Grade::Fair => "Not bad.",
        Grade::Weak => "Keep practising.",
    };
    println!("\n=== Quiz Results ===");
    println!(
        "You scored {} out of {} ({}%). {}",
        score.correct,
        score.total,
        score.percentage(),
        band
    );

    for (i, review) in session.controller().review().iter().enumerate() {
        let mark = if review.is_correct { "✓" } else { "✗" };
        println!("\n{} {}. {}", mark, i + 1, review.question.question_text);
        if let Some(selected) = review.selected {
            println!("   Your answer: {}", review.question.options[selected]);
        }
        if !review.is_correct {
            println!("   Correct answer: {}", review.question.correct_option());
        }
        println!("   {}", review.question.explanation);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quiz_forge=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let mut session = QuizSession::new(QuizApiClient::new(args.endpoint.clone()), PdfTextExtractor);
    load_input(&mut session, &args).await?;

    println!("Generating your quiz...");
    session.generate().await?;
    if session.state() != QuizState::Taking {
        bail!(session
            .controller()
            .error()
            .unwrap_or("An unknown error occurred.")
            .to_string());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    for index in 0..session.controller().questions().len() {
        ask(&mut session, &mut lines, index).await?;
    }

    loop {
        match session.submit() {
            Ok(_) => break,
            Err(QuizError::Incomplete { unanswered }) => {
                println!("\n{} question(s) still unanswered.", unanswered);
                let pending: Vec<usize> = session
                    .controller()
                    .answers()
                    .iter()
                    .enumerate()
                    .filter_map(|(i, a)| a.is_none().then_some(i))
                    .collect();
                for index in pending {
                    ask(&mut session, &mut lines, index).await?;
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    print_results(&session);
    Ok(())
}
