//! 単語帳リポジトリ
//!
//! Exclusive owner of the in-memory wordbook/review-list snapshot. Every
//! mutation flushes to the persistence adapter and then reloads the whole
//! snapshot, so read-your-writes holds by round trip rather than by
//! optimistic local update.

use crate::error::{AppError, AppResult};
use crate::models::{BookId, Plan, Word, Wordbook};
use crate::reconcile;
use crate::session::SessionOutcome;
use crate::store::Store;

#[derive(Debug, Default)]
pub struct WordbookRepository {
    wordbooks: Vec<Wordbook>,
    review_list: Vec<Word>,
}

impl WordbookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wordbooks(&self) -> &[Wordbook] {
        &self.wordbooks
    }

    pub fn review_list(&self) -> &[Word] {
        &self.review_list
    }

    pub fn review_count(&self) -> usize {
        self.review_list.len()
    }

    pub fn find_book(&self, id: &BookId) -> Option<&Wordbook> {
        self.wordbooks.iter().find(|book| &book.id == id)
    }

    /// Replaces the snapshot wholesale. Fails soft: a read error resets to
    /// empty collections rather than leaving partial state.
    pub async fn load_all(&mut self, store: &Store) {
        let books = store.load_wordbooks().await;
        let review = store.load_review_list().await;
        match (books, review) {
            (Ok(books), Ok(review)) => {
                self.wordbooks = books;
                self.review_list = review;
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(error = %err, "snapshot load failed, resetting to empty");
                self.wordbooks = Vec::new();
                self.review_list = Vec::new();
            }
        }
    }

    /// Creates a wordbook after the empty-name, quota, and duplicate-name
    /// checks, in that order.
    pub async fn create_wordbook(
        &mut self,
        store: &Store,
        name: &str,
        plan: Plan,
        authenticated: bool,
    ) -> AppResult<BookId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("単語帳の名前を入力してください。"));
        }

        if let Some(limit) = plan.wordbook_limit(authenticated) {
            if self.wordbooks.len() >= limit {
                let (message, login_hint) = if authenticated {
                    (
                        format!(
                            "無料プランでは単語帳は{limit}つまでです。プレミアムにアップグレードすると無制限に作成できます。"
                        ),
                        false,
                    )
                } else {
                    (
                        format!(
                            "単語帳は{limit}つまで作成できます。ログインすると5つまで作成可能になり、データをクラウドに保存できます。"
                        ),
                        true,
                    )
                };
                return Err(AppError::QuotaExceeded {
                    message,
                    login_hint,
                });
            }
        }

        if self.wordbooks.iter().any(|book| book.name == name) {
            return Err(AppError::validation(
                "同じ名前の単語帳が既に存在します。",
            ));
        }

        let id = store.create_wordbook(name).await?;
        self.load_all(store).await;
        Ok(id)
    }

    /// Deletes by identifier. A stale id is a no-op, not a failure.
    pub async fn delete_wordbook(&mut self, store: &Store, id: &BookId) -> AppResult<()> {
        if let Err(err) = store.delete_wordbook(id).await {
            if err.is_not_found() {
                tracing::debug!(book = %id, "delete of vanished wordbook ignored");
            } else {
                return Err(err.into());
            }
        }
        self.load_all(store).await;
        Ok(())
    }

    /// Adds a word to a book. Empty fields, a vanished book, and a
    /// duplicate `en` (case-insensitive) are all silent no-ops.
    pub async fn add_word(
        &mut self,
        store: &Store,
        book_id: &BookId,
        en: &str,
        jp: &str,
    ) -> AppResult<()> {
        let en = en.trim();
        let jp = jp.trim();
        if en.is_empty() || jp.is_empty() {
            return Ok(());
        }

        let Some(book) = self.find_book(book_id) else {
            tracing::debug!(book = %book_id, "add_word against vanished wordbook ignored");
            return Ok(());
        };

        let lowered = en.to_lowercase();
        if book.words.iter().any(|w| w.en.to_lowercase() == lowered) {
            tracing::debug!(book = %book_id, word = en, "duplicate word ignored");
            return Ok(());
        }

        store.add_word(book_id, &Word::new(en, jp)).await?;
        self.load_all(store).await;
        Ok(())
    }

    /// Replaces the translation of the word matching `en` exactly. The
    /// English side is immutable through this path. Stale selections are
    /// no-ops.
    pub async fn edit_word(
        &mut self,
        store: &Store,
        book_id: &BookId,
        en: &str,
        new_jp: &str,
    ) -> AppResult<()> {
        let Some(book) = self.find_book(book_id) else {
            tracing::debug!(book = %book_id, "edit_word against vanished wordbook ignored");
            return Ok(());
        };
        if !book.words.iter().any(|w| w.same_en(en)) {
            tracing::debug!(book = %book_id, word = en, "edit_word against vanished word ignored");
            return Ok(());
        }

        let new_words: Vec<Word> = book
            .words
            .iter()
            .map(|w| {
                if w.same_en(en) {
                    Word::new(en, new_jp.trim())
                } else {
                    w.clone()
                }
            })
            .collect();

        store.update_words(book_id, &new_words).await?;
        self.load_all(store).await;
        Ok(())
    }

    /// Removes the word matching `en` exactly. Stale selections are
    /// no-ops.
    pub async fn delete_word(
        &mut self,
        store: &Store,
        book_id: &BookId,
        en: &str,
    ) -> AppResult<()> {
        let Some(book) = self.find_book(book_id) else {
            tracing::debug!(book = %book_id, "delete_word against vanished wordbook ignored");
            return Ok(());
        };
        if !book.words.iter().any(|w| w.same_en(en)) {
            return Ok(());
        }

        store.remove_word(book_id, en).await?;
        self.load_all(store).await;
        Ok(())
    }

    /// Review reconciliation, invoked once when a session finishes.
    pub async fn apply_outcome(
        &mut self,
        store: &Store,
        outcome: &SessionOutcome,
    ) -> AppResult<()> {
        reconcile::merge_unknown_into_review(&mut self.review_list, &outcome.unknown);

        if outcome.review_mode {
            let mut resolved = outcome.known.clone();
            resolved.extend(outcome.stock.iter().cloned());
            reconcile::drain_resolved_from_review(&mut self.review_list, &resolved);
        } else if let Some(book_id) = &outcome.book_id {
            if let Some(book) = self.wordbooks.iter_mut().find(|b| &b.id == book_id) {
                reconcile::remove_known_from_book(&mut book.words, &outcome.known);
                store.update_words(book_id, &book.words).await?;
            } else {
                tracing::debug!(book = %book_id, "session source wordbook vanished, skipping");
            }
        }

        store.save_review_list(&self.review_list).await?;
        self.load_all(store).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::Local(LocalStore::new(dir.path()));
        (dir, store)
    }

    #[tokio::test]
    async fn authenticated_free_quota_is_five() {
        let (_dir, store) = store();
        let mut repo = WordbookRepository::new();

        for i in 0..5 {
            repo.create_wordbook(&store, &format!("帳{i}"), Plan::Free, true)
                .await
                .unwrap();
        }
        let err = repo
            .create_wordbook(&store, "六冊目", Plan::Free, true)
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), "QUOTA_EXCEEDED");
        assert!(matches!(
            err,
            AppError::QuotaExceeded { login_hint: false, .. }
        ));
    }

    #[tokio::test]
    async fn premium_plan_is_unlimited() {
        let (_dir, store) = store();
        let mut repo = WordbookRepository::new();

        for i in 0..8 {
            repo.create_wordbook(&store, &format!("帳{i}"), Plan::Premium, true)
                .await
                .unwrap();
        }
        assert_eq!(repo.wordbooks().len(), 8);
    }

    #[tokio::test]
    async fn names_are_trimmed_before_all_checks() {
        let (_dir, store) = store();
        let mut repo = WordbookRepository::new();

        repo.create_wordbook(&store, "  基本  ", Plan::Free, false)
            .await
            .unwrap();
        assert_eq!(repo.wordbooks()[0].name, "基本");
        let err = repo
            .create_wordbook(&store, "基本", Plan::Free, false)
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
