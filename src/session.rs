//! 学習セッションの状態機械
//!
//! Drives the shuffle → present → answer → advance loop over one word
//! list. The session is ephemeral: it owns a shuffled copy of its input,
//! never mutates the words themselves, and tracks classification by
//! membership in side lists. Stopping or dropping it loses nothing that
//! matters; reconciliation only runs on completion.

use std::time::Duration;

use rand::seq::SliceRandom;

use crate::error::{AppError, AppResult};
use crate::models::{BookId, QuestionDirection, Word};

/// Visible pause before the next card is shown. A presentation hint only;
/// the state transition itself is synchronous.
pub const ADVANCE_DELAY: Duration = Duration::from_millis(250);

/// 回答の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// 分からない — goes to the review list.
    Unknown,
    /// 分かったがストック — keep it around.
    Stock,
    /// 分かった
    Known,
}

/// What the presentation layer needs to draw the current card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub front: String,
    pub back: String,
    /// "i / n" position text.
    pub progress: String,
    /// Pronunciation playback is offered only when the front is English.
    pub pronunciation_enabled: bool,
}

/// Final classification emitted on completion.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub known: Vec<Word>,
    pub stock: Vec<Word>,
    pub unknown: Vec<Word>,
    pub review_mode: bool,
    pub book_id: Option<BookId>,
}

/// Result of answering one card.
#[derive(Debug, Clone)]
pub enum Advance {
    /// More cards remain; wait `delay` before showing the next one.
    Next { delay: Duration },
    Finished(SessionOutcome),
}

#[derive(Debug)]
pub struct LearningSession {
    words: Vec<Word>,
    current_index: usize,
    direction: QuestionDirection,
    unknown_words: Vec<Word>,
    stock_words: Vec<Word>,
    review_mode: bool,
    book_id: Option<BookId>,
}

impl LearningSession {
    /// Starts a session over a shuffled copy of `words`. The direction
    /// setting is latched here and does not change mid-session.
    pub fn start(
        words: &[Word],
        direction: QuestionDirection,
        review_mode: bool,
        book_id: Option<BookId>,
    ) -> AppResult<Self> {
        if words.is_empty() {
            return Err(AppError::validation("学習する単語がありません。"));
        }

        let mut shuffled = words.to_vec();
        shuffled.shuffle(&mut rand::rng());

        Ok(Self {
            words: shuffled,
            current_index: 0,
            direction,
            unknown_words: Vec::new(),
            stock_words: Vec::new(),
            review_mode,
            book_id,
        })
    }

    /// View of the current card, or `None` once the cursor has run off the
    /// end (completion is then reported by `answer`).
    pub fn current_card(&self) -> Option<CardView> {
        let word = self.words.get(self.current_index)?;
        let (front, back) = match self.direction {
            QuestionDirection::EnToJp => (word.en.clone(), word.jp.clone()),
            QuestionDirection::JpToEn => (word.jp.clone(), word.en.clone()),
        };
        Some(CardView {
            front,
            back,
            progress: format!("{} / {}", self.current_index + 1, self.words.len()),
            pronunciation_enabled: self.direction == QuestionDirection::EnToJp,
        })
    }

    /// Classifies the current word and advances the cursor. The only
    /// mutator besides `start`. Answering past the end just reports
    /// completion again.
    pub fn answer(&mut self, kind: Answer) -> Advance {
        if let Some(word) = self.words.get(self.current_index).cloned() {
            match kind {
                Answer::Unknown => self.unknown_words.push(word),
                Answer::Stock => self.stock_words.push(word),
                Answer::Known => {}
            }
            self.current_index += 1;
        }

        if self.current_index >= self.words.len() {
            Advance::Finished(self.outcome())
        } else {
            Advance::Next {
                delay: ADVANCE_DELAY,
            }
        }
    }

    pub fn is_review_mode(&self) -> bool {
        self.review_mode
    }

    /// known = words − unknown − stock, compared by `en` value since the
    /// shuffled copies are distinct objects from the caller's.
    fn outcome(&self) -> SessionOutcome {
        let classified = |word: &Word| {
            self.unknown_words.iter().any(|w| w.same_en(&word.en))
                || self.stock_words.iter().any(|w| w.same_en(&word.en))
        };
        let known = self
            .words
            .iter()
            .filter(|word| !classified(word))
            .cloned()
            .collect();

        SessionOutcome {
            known,
            stock: self.stock_words.clone(),
            unknown: self.unknown_words.clone(),
            review_mode: self.review_mode,
            book_id: self.book_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn words(pairs: &[(&str, &str)]) -> Vec<Word> {
        pairs.iter().map(|(en, jp)| Word::new(*en, *jp)).collect()
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = LearningSession::start(&[], QuestionDirection::EnToJp, false, None)
            .err()
            .expect("empty input must fail");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn two_known_answers_finish_with_everything_known() {
        let input = words(&[("a", "1"), ("b", "2")]);
        let mut session =
            LearningSession::start(&input, QuestionDirection::EnToJp, false, None).unwrap();

        assert!(matches!(
            session.answer(Answer::Known),
            Advance::Next { delay } if delay == ADVANCE_DELAY
        ));
        let Advance::Finished(outcome) = session.answer(Answer::Known) else {
            panic!("second answer must finish the session");
        };

        let mut known: Vec<&str> = outcome.known.iter().map(|w| w.en.as_str()).collect();
        known.sort_unstable();
        assert_eq!(known, vec!["a", "b"]);
        assert!(outcome.unknown.is_empty());
        assert!(outcome.stock.is_empty());
    }

    #[test]
    fn classification_fills_side_lists() {
        let input = words(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let mut session =
            LearningSession::start(&input, QuestionDirection::EnToJp, true, None).unwrap();

        session.answer(Answer::Unknown);
        session.answer(Answer::Stock);
        let Advance::Finished(outcome) = session.answer(Answer::Known) else {
            panic!("session must finish");
        };

        assert_eq!(outcome.unknown.len(), 1);
        assert_eq!(outcome.stock.len(), 1);
        assert_eq!(outcome.known.len(), 1);
        assert!(outcome.review_mode);

        let all: Vec<&str> = outcome
            .known
            .iter()
            .chain(&outcome.stock)
            .chain(&outcome.unknown)
            .map(|w| w.en.as_str())
            .collect();
        for en in ["a", "b", "c"] {
            assert!(all.contains(&en));
        }
    }

    #[test]
    fn direction_controls_card_faces_and_pronunciation() {
        let input = words(&[("apple", "りんご")]);

        let session =
            LearningSession::start(&input, QuestionDirection::EnToJp, false, None).unwrap();
        let card = session.current_card().unwrap();
        assert_eq!(card.front, "apple");
        assert_eq!(card.back, "りんご");
        assert_eq!(card.progress, "1 / 1");
        assert!(card.pronunciation_enabled);

        let session =
            LearningSession::start(&input, QuestionDirection::JpToEn, false, None).unwrap();
        let card = session.current_card().unwrap();
        assert_eq!(card.front, "りんご");
        assert_eq!(card.back, "apple");
        assert!(!card.pronunciation_enabled);
    }

    #[test]
    fn answering_past_the_end_reports_completion_again() {
        let input = words(&[("a", "1")]);
        let mut session =
            LearningSession::start(&input, QuestionDirection::EnToJp, false, None).unwrap();

        assert!(matches!(session.answer(Answer::Known), Advance::Finished(_)));
        assert!(session.current_card().is_none());
        let Advance::Finished(outcome) = session.answer(Answer::Unknown) else {
            panic!("past-the-end answer must still report completion");
        };
        // The stray answer must not have classified anything.
        assert!(outcome.unknown.is_empty());
        assert_eq!(outcome.known.len(), 1);
    }

    proptest! {
        #[test]
        fn shuffle_is_a_permutation(pairs in proptest::collection::vec(("[a-z]{1,8}", "[a-z]{1,8}"), 1..40)) {
            let input: Vec<Word> = pairs.iter().map(|(en, jp)| Word::new(en.clone(), jp.clone())).collect();
            let session = LearningSession::start(&input, QuestionDirection::EnToJp, false, None).unwrap();

            let mut expected: Vec<(String, String)> =
                input.iter().map(|w| (w.en.clone(), w.jp.clone())).collect();
            let mut actual: Vec<(String, String)> =
                session.words.iter().map(|w| (w.en.clone(), w.jp.clone())).collect();
            expected.sort();
            actual.sort();
            prop_assert_eq!(expected, actual);
        }
    }
}
