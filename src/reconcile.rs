//! セッション結果と復習リストの突き合わせ
//!
//! Pure list surgery, invoked once when a session finishes. The
//! repository applies these to its in-memory state and then flushes.

use crate::models::Word;

/// Adds each unknown word to the review list unless one with the same
/// `en` is already present. A differing `jp` on the existing entry wins
/// silently (first-write-wins).
pub fn merge_unknown_into_review(review: &mut Vec<Word>, unknown: &[Word]) {
    for word in unknown {
        if !review.iter().any(|existing| existing.same_en(&word.en)) {
            review.push(word.clone());
        }
    }
}

/// Review mode drains the list: everything answered known or stock is
/// resolved and removed.
pub fn drain_resolved_from_review(review: &mut Vec<Word>, resolved: &[Word]) {
    review.retain(|entry| !resolved.iter().any(|word| word.same_en(&entry.en)));
}

/// Normal mode removes only the known words from the source wordbook;
/// stock and unknown words stay in the book.
pub fn remove_known_from_book(words: &mut Vec<Word>, known: &[Word]) {
    words.retain(|entry| !known.iter().any(|word| word.same_en(&entry.en)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_dedups_by_en_and_keeps_first_translation() {
        let mut review = vec![Word::new("apple", "りんご")];
        merge_unknown_into_review(
            &mut review,
            &[Word::new("apple", "林檎"), Word::new("book", "本")],
        );
        assert_eq!(
            review,
            vec![Word::new("apple", "りんご"), Word::new("book", "本")]
        );
    }

    #[test]
    fn merge_is_case_sensitive() {
        // Review-list dedup compares exact `en`, unlike add-time dedup.
        let mut review = vec![Word::new("apple", "りんご")];
        merge_unknown_into_review(&mut review, &[Word::new("Apple", "りんご")]);
        assert_eq!(review.len(), 2);
    }

    #[test]
    fn drain_removes_resolved_entries() {
        let mut review = vec![
            Word::new("a", "1"),
            Word::new("b", "2"),
            Word::new("c", "3"),
        ];
        drain_resolved_from_review(&mut review, &[Word::new("a", "1"), Word::new("c", "3")]);
        assert_eq!(review, vec![Word::new("b", "2")]);
    }

    #[test]
    fn known_words_leave_the_book_but_stock_stays() {
        let mut words = vec![Word::new("a", "1"), Word::new("b", "2")];
        remove_known_from_book(&mut words, &[Word::new("a", "1")]);
        assert_eq!(words, vec![Word::new("b", "2")]);
    }
}
