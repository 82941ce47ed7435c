use quiz_forge::controller::{Grade, QuizController, QuizState};
use quiz_forge::error::{GenerationError, QuizError};
use quiz_forge::question::Question;

fn questions(correct: &[usize]) -> Vec<Question> {
    correct
        .iter()
        .enumerate()
        .map(|(i, &c)| Question {
            question_text: format!("Q{}", i),
            options: vec!["w".into(), "x".into(), "y".into(), "z".into()],
            correct_answer_index: c,
            explanation: format!("Answer is option {}", c),
        })
        .collect()
}

fn taking(correct: &[usize]) -> QuizController {
    let mut c = QuizController::new();
    c.begin_generation("context").unwrap();
    c.complete_generation(Ok(questions(correct))).unwrap();
    assert_eq!(c.state(), QuizState::Taking);
    c
}

#[test]
fn answering_only_touches_one_slot() {
    let mut c = taking(&[0, 1, 2]);
    c.select_answer(1, 3).unwrap();
    assert_eq!(c.answers(), &[None, Some(3usize), None][..]);

    c.select_answer(1, 1).unwrap();
    assert_eq!(c.answers(), &[None, Some(1usize), None][..]);
}

#[test]
fn out_of_range_selections_are_rejected() {
    let mut c = taking(&[0, 1]);
    assert_eq!(
        c.select_answer(2, 0),
        Err(QuizError::QuestionOutOfRange { index: 2, len: 2 })
    );
    assert_eq!(
        c.select_answer(0, 4),
        Err(QuizError::OptionOutOfRange { index: 0, option: 4 })
    );
    assert!(c.answers().iter().all(Option::is_none));
}

#[test]
fn submit_requires_every_answer() {
    let mut c = taking(&[0, 1, 2]);
    c.select_answer(0, 0).unwrap();
    assert_eq!(c.submit(), Err(QuizError::Incomplete { unanswered: 2 }));
    assert_eq!(c.state(), QuizState::Taking);
}

#[test]
fn perfect_and_partial_scores() {
    let mut c = taking(&[0, 1, 2, 3, 0]);
    for (i, option) in [0, 1, 2, 3, 0].into_iter().enumerate() {
        c.select_answer(i, option).unwrap();
    }
    let score = c.submit().unwrap();
    assert_eq!((score.correct, score.total, score.percentage()), (5, 5, 100));
    assert_eq!(score.grade(), Grade::Strong);
    assert_eq!(c.state(), QuizState::Results);

    let mut c = taking(&[0, 1, 2]);
    for i in 0..3 {
        c.select_answer(i, 1).unwrap();
    }
    let score = c.submit().unwrap();
    assert_eq!((score.correct, score.percentage()), (1, 33));
    assert_eq!(score.grade(), Grade::Weak);
}

#[test]
fn all_wrong_scores_zero() {
    let mut c = taking(&[0, 1, 2, 3]);
    for i in 0..4 {
        c.select_answer(i, (i + 1) % 4).unwrap();
    }
    let score = c.submit().unwrap();
    assert_eq!((score.correct, score.total, score.percentage()), (0, 4, 0));
    assert_eq!(score.grade(), Grade::Weak);
    assert!(c.review().iter().all(|r| !r.is_correct));
}

#[test]
fn answers_are_frozen_after_submit() {
    let mut c = taking(&[0]);
    c.select_answer(0, 0).unwrap();
    c.submit().unwrap();
    assert!(matches!(
        c.select_answer(0, 1),
        Err(QuizError::InvalidTransition { state: "results", .. })
    ));
    assert!(c.submit().is_err());
}

#[test]
fn empty_question_list_returns_to_idle_with_message() {
    let mut c = QuizController::new();
    c.begin_generation("context").unwrap();
    c.complete_generation(Ok(vec![])).unwrap();

    assert_eq!(c.state(), QuizState::Idle);
    assert_eq!(
        c.error(),
        Some("The AI couldn't generate a quiz from the provided text. Please try with a different text or file.")
    );
    assert!(c.questions().is_empty());
}

#[test]
fn generation_error_is_wrapped() {
    let mut c = QuizController::new();
    c.begin_generation("context").unwrap();
    c.complete_generation(Err(GenerationError::Backend {
        status: 500,
        message: "Failed to generate quiz from AI: timeout".into(),
    }))
    .unwrap();

    assert_eq!(c.state(), QuizState::Idle);
    assert_eq!(
        c.error(),
        Some("Failed to generate quiz. Failed to generate quiz from AI: timeout")
    );
}

#[test]
fn completing_outside_generating_is_rejected() {
    let mut c = QuizController::new();
    assert!(matches!(
        c.complete_generation(Ok(questions(&[0]))),
        Err(QuizError::InvalidTransition { state: "idle", .. })
    ));
}

#[test]
fn reset_works_from_every_state() {
    let mut c = QuizController::new();
    c.reset();
    assert_eq!(c.state(), QuizState::Idle);

    c.begin_generation("context").unwrap();
    c.reset();
    assert_eq!(c.state(), QuizState::Idle);

    let mut c = taking(&[0, 1]);
    c.select_answer(0, 0).unwrap();
    c.reset();
    assert_eq!(c.state(), QuizState::Idle);
    assert!(c.questions().is_empty());
    assert!(c.answers().is_empty());

    let mut c = taking(&[0]);
    c.select_answer(0, 0).unwrap();
    c.submit().unwrap();
    c.reset();
    assert_eq!(c.state(), QuizState::Idle);
    assert_eq!(c.error(), None);
}

#[test]
fn review_lists_every_question_in_order() {
    let mut c = taking(&[2, 3]);
    c.select_answer(0, 2).unwrap();
    c.select_answer(1, 0).unwrap();
    c.submit().unwrap();

    let review = c.review();
    assert_eq!(review.len(), 2);
    assert_eq!(review[0].question.question_text, "Q0");
    assert!(review[0].is_correct);
    assert!(!review[1].is_correct);
    assert_eq!(review[1].question.correct_option(), "z");
}
