//! ゲストデータのエクスポート / インポート
//!
//! One JSON document bundling both guest blobs. Import replaces
//! everything on the device, so the payload is validated for shape
//! before anything is overwritten.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{BookId, Word, Wordbook};

/// Serialized bundle. Wordbooks use their stored guest shape (no ids,
/// the name is the key).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Bundle {
    wordbooks: Vec<BundleBook>,
    review_list: Vec<Word>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BundleBook {
    name: String,
    #[serde(default)]
    words: Vec<Word>,
}

pub fn export_json(books: &[Wordbook], review: &[Word]) -> AppResult<String> {
    let bundle = Bundle {
        wordbooks: books
            .iter()
            .map(|book| BundleBook {
                name: book.name.clone(),
                words: book.words.clone(),
            })
            .collect(),
        review_list: review.to_vec(),
    };
    let json = serde_json::to_string_pretty(&bundle)
        .map_err(|err| AppError::Backend(err.into()))?;
    Ok(json)
}

/// Parses an exported bundle. Both top-level fields must be present and
/// be arrays; anything else is rejected before the caller overwrites
/// local data.
pub fn parse_import(raw: &str) -> AppResult<(Vec<Wordbook>, Vec<Word>)> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|_| AppError::validation("インポートファイルの形式が正しくありません。"))?;
    let valid = value.get("wordbooks").is_some_and(|v| v.is_array())
        && value.get("reviewList").is_some_and(|v| v.is_array());
    if !valid {
        return Err(AppError::validation(
            "インポートファイルの形式が正しくありません。",
        ));
    }

    let bundle: Bundle = serde_json::from_value(value)
        .map_err(|_| AppError::validation("インポートファイルの形式が正しくありません。"))?;
    let books = bundle
        .wordbooks
        .into_iter()
        .map(|book| Wordbook {
            id: BookId::Local(book.name.clone()),
            name: book.name,
            words: book.words,
        })
        .collect();
    Ok((books, bundle.review_list))
}
