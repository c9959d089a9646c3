//! ゲストモードのローカル保存
//!
//! Wordbooks and the review list are each one JSON blob under a fixed
//! file name. Mutations are whole-blob read-modify-write; single-device
//! single-threaded access needs no concurrency protection.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::{BookId, Word, Wordbook};
use crate::store::{StoreError, StoreResult};

const WORDBOOKS_FILE: &str = "my-wordbooks.json";
const REVIEW_LIST_FILE: &str = "my-review-list.json";

/// Stored shape of a guest wordbook. The name doubles as the identifier,
/// so no id is persisted.
#[derive(Debug, Serialize, Deserialize)]
struct LocalBook {
    name: String,
    words: Vec<Word>,
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn wordbooks_path(&self) -> PathBuf {
        self.dir.join(WORDBOOKS_FILE)
    }

    fn review_list_path(&self) -> PathBuf {
        self.dir.join(REVIEW_LIST_FILE)
    }

    fn read_blob<T: for<'de> Deserialize<'de>>(path: &Path) -> StoreResult<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn write_blob<T: Serialize>(&self, path: &Path, value: &T) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;
        let raw = serde_json::to_string(value)?;
        fs::write(path, raw)?;
        Ok(())
    }

    pub fn load_wordbooks(&self) -> StoreResult<Vec<Wordbook>> {
        let books: Vec<LocalBook> = Self::read_blob(&self.wordbooks_path())?.unwrap_or_default();
        Ok(books
            .into_iter()
            .map(|book| Wordbook {
                id: BookId::Local(book.name.clone()),
                name: book.name,
                words: book.words,
            })
            .collect())
    }

    pub fn load_review_list(&self) -> StoreResult<Vec<Word>> {
        Ok(Self::read_blob(&self.review_list_path())?.unwrap_or_default())
    }

    pub fn save_review_list(&self, words: &[Word]) -> StoreResult<()> {
        self.write_blob(&self.review_list_path(), &words)
    }

    fn save_wordbooks(&self, books: &[Wordbook]) -> StoreResult<()> {
        let stored: Vec<LocalBook> = books
            .iter()
            .map(|book| LocalBook {
                name: book.name.clone(),
                words: book.words.clone(),
            })
            .collect();
        self.write_blob(&self.wordbooks_path(), &stored)
    }

    pub fn create_wordbook(&self, name: &str) -> StoreResult<BookId> {
        let mut books = self.load_wordbooks()?;
        books.push(Wordbook {
            id: BookId::Local(name.to_string()),
            name: name.to_string(),
            words: Vec::new(),
        });
        self.save_wordbooks(&books)?;
        Ok(BookId::Local(name.to_string()))
    }

    pub fn delete_wordbook(&self, id: &BookId) -> StoreResult<()> {
        let mut books = self.load_wordbooks()?;
        books.retain(|book| &book.id != id);
        self.save_wordbooks(&books)
    }

    pub fn add_word(&self, id: &BookId, word: &Word) -> StoreResult<()> {
        self.mutate_book(id, |words| words.push(word.clone()))
    }

    pub fn remove_word(&self, id: &BookId, en: &str) -> StoreResult<()> {
        self.mutate_book(id, |words| words.retain(|w| w.en != en))
    }

    pub fn update_words(&self, id: &BookId, new_words: &[Word]) -> StoreResult<()> {
        self.mutate_book(id, |words| *words = new_words.to_vec())
    }

    fn mutate_book(&self, id: &BookId, apply: impl FnOnce(&mut Vec<Word>)) -> StoreResult<()> {
        let mut books = self.load_wordbooks()?;
        if let Some(book) = books.iter_mut().find(|book| &book.id == id) {
            apply(&mut book.words);
            self.save_wordbooks(&books)?;
        }
        Ok(())
    }

    /// Whether any guest data is present, for the login merge prompt.
    pub fn has_data(&self) -> bool {
        match self.load_wordbooks() {
            Ok(books) => !books.is_empty(),
            Err(_) => false,
        }
    }

    /// Removes the wordbooks blob only. Called after a confirmed merge
    /// into the remote store; the review list never migrates and stays
    /// on the device.
    pub fn clear_wordbooks(&self) -> StoreResult<()> {
        let path = self.wordbooks_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Wholesale overwrite used by the import path.
    pub fn replace_all(&self, books: &[Wordbook], review: &[Word]) -> StoreResult<()> {
        self.save_wordbooks(books)?;
        self.save_review_list(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn missing_files_read_as_empty() {
        let (_dir, store) = store();
        assert!(store.load_wordbooks().unwrap().is_empty());
        assert!(store.load_review_list().unwrap().is_empty());
        assert!(!store.has_data());
    }

    #[test]
    fn create_and_mutate_round_trip() {
        let (_dir, store) = store();
        let id = store.create_wordbook("基本").unwrap();
        store.add_word(&id, &Word::new("apple", "りんご")).unwrap();
        store.add_word(&id, &Word::new("book", "本")).unwrap();
        store.remove_word(&id, "apple").unwrap();

        let books = store.load_wordbooks().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].words, vec![Word::new("book", "本")]);
        assert!(store.has_data());
    }

    #[test]
    fn mutating_a_vanished_book_is_a_noop() {
        let (_dir, store) = store();
        store
            .add_word(&BookId::Local("ghost".into()), &Word::new("a", "あ"))
            .unwrap();
        assert!(store.load_wordbooks().unwrap().is_empty());
    }

    #[test]
    fn malformed_blob_is_a_corrupt_error() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("my-wordbooks.json"), "{not json").unwrap();
        assert!(matches!(
            store.load_wordbooks(),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn clearing_wordbooks_keeps_the_review_list() {
        let (_dir, store) = store();
        store.create_wordbook("a").unwrap();
        store.save_review_list(&[Word::new("x", "エックス")]).unwrap();
        store.clear_wordbooks().unwrap();
        assert!(!store.has_data());
        assert_eq!(
            store.load_review_list().unwrap(),
            vec![Word::new("x", "エックス")]
        );
    }
}
