//! 永続化アダプタ
//!
//! Two interchangeable backends behind one dispatch enum, selected by
//! authentication state: a remote per-user document store, and local
//! JSON-blob storage for guests.

pub mod local;
pub mod migrate;
pub mod remote;

pub use local::LocalStore;
pub use remote::RemoteStore;

use thiserror::Error;

use crate::models::{BookId, Word, Wordbook};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ネットワークエラー: {0}")]
    Network(#[from] reqwest::Error),

    #[error("ストレージ入出力エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("保存データが壊れています: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("リモートエラー [{code}]: {message}")]
    Remote { code: String, message: String },
}

impl StoreError {
    /// True when the failure is a stale reference (the target document is
    /// already gone), which callers treat as a no-op.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote { code, .. } if code == "NOT_FOUND")
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Active persistence backend.
pub enum Store {
    Remote(RemoteStore),
    Local(LocalStore),
}

impl Store {
    pub async fn load_wordbooks(&self) -> StoreResult<Vec<Wordbook>> {
        match self {
            Self::Remote(store) => store.load_wordbooks().await,
            Self::Local(store) => store.load_wordbooks(),
        }
    }

    pub async fn load_review_list(&self) -> StoreResult<Vec<Word>> {
        match self {
            Self::Remote(store) => store.load_review_list().await,
            Self::Local(store) => store.load_review_list(),
        }
    }

    pub async fn save_review_list(&self, words: &[Word]) -> StoreResult<()> {
        match self {
            Self::Remote(store) => store.save_review_list(words).await,
            Self::Local(store) => store.save_review_list(words),
        }
    }

    pub async fn create_wordbook(&self, name: &str) -> StoreResult<BookId> {
        match self {
            Self::Remote(store) => store.insert_wordbook(name, &[]).await,
            Self::Local(store) => store.create_wordbook(name),
        }
    }

    pub async fn delete_wordbook(&self, id: &BookId) -> StoreResult<()> {
        match self {
            Self::Remote(store) => store.delete_wordbook(id).await,
            Self::Local(store) => store.delete_wordbook(id),
        }
    }

    /// Atomic single-word append, the array-union analogue in remote mode.
    pub async fn add_word(&self, id: &BookId, word: &Word) -> StoreResult<()> {
        match self {
            Self::Remote(store) => store.add_word(id, word).await,
            Self::Local(store) => store.add_word(id, word),
        }
    }

    /// Atomic single-word removal by English text.
    pub async fn remove_word(&self, id: &BookId, en: &str) -> StoreResult<()> {
        match self {
            Self::Remote(store) => store.remove_word(id, en).await,
            Self::Local(store) => store.remove_word(id, en),
        }
    }

    /// Whole-array replacement, used for edits and reconciliation.
    pub async fn update_words(&self, id: &BookId, words: &[Word]) -> StoreResult<()> {
        match self {
            Self::Remote(store) => store.update_words(id, words).await,
            Self::Local(store) => store.update_words(id, words),
        }
    }
}
