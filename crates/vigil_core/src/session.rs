//! The per-user application session state machine.
//!
//! One session exists per (user, guild) pair while an application is in
//! progress. A session moves through `Answering(0..=6)` into `Reviewing`;
//! submit and cancel are terminal and handled by the engine, which destroys
//! the entry.

use crate::position::QUESTION_COUNT;
use derive_getters::Getters;
use vigil_error::{WorkflowError, WorkflowErrorKind, WorkflowResult};

/// Maximum characters of an answer shown in the review preview.
const PREVIEW_LIMIT: usize = 100;

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SessionState {
    /// Waiting for the answer to the given zero-based question index.
    #[display("answering question {}", _0 + 1)]
    Answering(usize),
    /// All seven slots filled; waiting for submit or cancel.
    #[display("reviewing")]
    Reviewing,
}

/// An in-progress application for one (user, guild) pair.
///
/// Invariants: `answers` always holds exactly [`QUESTION_COUNT`] slots and
/// `index` stays within `0..=QUESTION_COUNT`. Slots at positions below
/// `index` are filled; the rest are empty strings.
#[derive(Debug, Clone, Getters)]
pub struct ApplicationSession {
    /// Name of the position applied for.
    position: String,
    /// Answer slots, one per question, empty until answered.
    answers: Vec<String>,
    /// Index of the next unanswered question.
    index: usize,
}

impl ApplicationSession {
    /// Open a fresh session for `position` with all answer slots empty.
    pub fn new(position: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            answers: vec![String::new(); QUESTION_COUNT],
            index: 0,
        }
    }

    /// Current state, derived from the answer index.
    pub fn state(&self) -> SessionState {
        if self.index < QUESTION_COUNT {
            SessionState::Answering(self.index)
        } else {
            SessionState::Reviewing
        }
    }

    /// Record `text` as the answer to `question_index` and advance.
    ///
    /// Returns the index of the next question, or `None` once all questions
    /// are answered and the session has moved to review.
    ///
    /// # Errors
    ///
    /// Rejects indices outside the form without touching any slot.
    pub fn record_answer(
        &mut self,
        question_index: usize,
        text: impl Into<String>,
    ) -> WorkflowResult<Option<usize>> {
        if question_index >= QUESTION_COUNT {
            return Err(WorkflowError::new(WorkflowErrorKind::QuestionOutOfRange(
                question_index,
            )));
        }
        self.answers[question_index] = text.into();
        self.index = question_index + 1;
        if self.index < QUESTION_COUNT {
            Ok(Some(self.index))
        } else {
            Ok(None)
        }
    }

    /// Index of the first empty-after-trim answer slot, if any.
    ///
    /// Submission is allowed only when this returns `None`.
    pub fn first_unanswered(&self) -> Option<usize> {
        self.answers.iter().position(|a| a.trim().is_empty())
    }

    /// Truncated copies of the first `count` answers for the review screen.
    pub fn preview(&self, count: usize) -> Vec<String> {
        self.answers.iter().take(count).map(|a| preview_answer(a)).collect()
    }

    /// Finalized answers: trimmed copies of all slots.
    ///
    /// Deep-copies so the submitted record never aliases session storage.
    pub fn finalized_answers(&self) -> Vec<String> {
        self.answers.iter().map(|a| a.trim().to_string()).collect()
    }
}

/// Truncate an answer for the review preview, marking elision with `...`.
pub fn preview_answer(answer: &str) -> String {
    if answer.chars().count() <= PREVIEW_LIMIT {
        answer.to_string()
    } else {
        let mut truncated: String = answer.chars().take(PREVIEW_LIMIT).collect();
        truncated.push_str("...");
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_has_seven_empty_slots() {
        let session = ApplicationSession::new("Manager");
        assert_eq!(session.answers().len(), QUESTION_COUNT);
        assert!(session.answers().iter().all(String::is_empty));
        assert_eq!(*session.index(), 0);
        assert_eq!(session.state(), SessionState::Answering(0));
    }

    #[test]
    fn test_each_answer_fills_one_slot_and_advances() {
        let mut session = ApplicationSession::new("Manager");
        for i in 0..QUESTION_COUNT {
            let filled_before = session
                .answers()
                .iter()
                .filter(|a| !a.is_empty())
                .count();
            let next = session.record_answer(i, format!("answer {i}")).unwrap();
            let filled_after = session
                .answers()
                .iter()
                .filter(|a| !a.is_empty())
                .count();

            assert_eq!(filled_after, filled_before + 1);
            assert_eq!(*session.index(), i + 1);
            if i + 1 < QUESTION_COUNT {
                assert_eq!(next, Some(i + 1));
            } else {
                assert_eq!(next, None);
            }
        }
        assert_eq!(session.state(), SessionState::Reviewing);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut session = ApplicationSession::new("Manager");
        assert!(session.record_answer(QUESTION_COUNT, "late").is_err());
        assert!(session.answers().iter().all(String::is_empty));
    }

    #[test]
    fn test_first_unanswered_sees_whitespace_as_empty() {
        let mut session = ApplicationSession::new("Manager");
        for i in 0..QUESTION_COUNT {
            session.record_answer(i, "ok").unwrap();
        }
        assert_eq!(session.first_unanswered(), None);

        session.answers[3] = "   \n".to_string();
        assert_eq!(session.first_unanswered(), Some(3));
    }

    #[test]
    fn test_finalized_answers_are_trimmed_copies() {
        let mut session = ApplicationSession::new("Manager");
        for i in 0..QUESTION_COUNT {
            session.record_answer(i, format!("  answer {i}  ")).unwrap();
        }
        let finalized = session.finalized_answers();
        assert_eq!(finalized[0], "answer 0");
        // Session storage keeps the raw text; the copy is independent.
        assert_eq!(session.answers()[0], "  answer 0  ");
    }

    #[test]
    fn test_preview_truncates_at_limit_with_ellipsis() {
        let long = "x".repeat(150);
        let short = "short answer";

        assert_eq!(preview_answer(short), short);
        let truncated = preview_answer(&long);
        assert_eq!(truncated.chars().count(), PREVIEW_LIMIT + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_preview_at_exact_limit_is_untouched() {
        let exact = "y".repeat(PREVIEW_LIMIT);
        assert_eq!(preview_answer(&exact), exact);
    }

    #[test]
    fn test_preview_counts_chars_not_bytes() {
        let long = "ü".repeat(120);
        let truncated = preview_answer(&long);
        assert_eq!(truncated.chars().count(), PREVIEW_LIMIT + 3);
    }
}
