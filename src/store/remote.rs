//! リモートドキュメントストアのクライアント
//!
//! Speaks the backend's JSON envelope (`{ success, data }` on success,
//! `{ success, error, code }` on failure) against per-user resources:
//! wordbooks are documents in `/users/{uid}/wordbooks`, the review list is
//! the single document `/users/{uid}/review-list`. Single-word add/remove
//! endpoints are atomic on the server side, so concurrent devices do not
//! need read-modify-write over the whole array.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::{BookId, Plan, Word, Wordbook};
use crate::store::{StoreError, StoreResult};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RemoteBook {
    id: String,
    name: String,
    #[serde(default)]
    words: Vec<Word>,
}

#[derive(Debug, Deserialize)]
struct UserDoc {
    #[serde(default)]
    plan: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewDoc {
    #[serde(default)]
    words: Vec<Word>,
}

#[derive(Debug, Serialize)]
struct ReviewPayload<'a> {
    words: &'a [Word],
}

pub struct RemoteStore {
    client: Client,
    base_url: String,
    user_id: String,
}

impl RemoteStore {
    pub fn new(base_url: &str, user_id: &str) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/users/{}{}", self.base_url, self.user_id, suffix)
    }

    async fn expect_data<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
        let status = response.status();
        let envelope: Envelope<T> = response.json().await?;
        if !status.is_success() || !envelope.success {
            return Err(remote_error(status, envelope.code, envelope.error));
        }
        envelope.data.ok_or_else(|| StoreError::Remote {
            code: "BAD_RESPONSE".to_string(),
            message: "レスポンスに data がありません".to_string(),
        })
    }

    async fn expect_ok(response: Response) -> StoreResult<()> {
        let status = response.status();
        let envelope: Envelope<serde_json::Value> = response.json().await?;
        check_ok(status, envelope)
    }

    /// Reads the user's plan; the field defaults to `free` for accounts
    /// created before plans existed.
    pub async fn fetch_plan(&self) -> StoreResult<Plan> {
        let response = self.client.get(self.url("")).send().await?;
        let doc: UserDoc = Self::expect_data(response).await?;
        Ok(doc.plan.as_deref().map(Plan::from_str).unwrap_or_default())
    }

    pub async fn load_wordbooks(&self) -> StoreResult<Vec<Wordbook>> {
        let response = self.client.get(self.url("/wordbooks")).send().await?;
        let books: Vec<RemoteBook> = Self::expect_data(response).await?;
        Ok(books
            .into_iter()
            .map(|book| Wordbook {
                id: BookId::Remote(book.id),
                name: book.name,
                words: book.words,
            })
            .collect())
    }

    /// The review-list document may not exist yet; a 404 reads as empty.
    pub async fn load_review_list(&self) -> StoreResult<Vec<Word>> {
        let response = self.client.get(self.url("/review-list")).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let doc: ReviewDoc = Self::expect_data(response).await?;
        Ok(doc.words)
    }

    pub async fn save_review_list(&self, words: &[Word]) -> StoreResult<()> {
        let response = self
            .client
            .put(self.url("/review-list"))
            .json(&ReviewPayload { words })
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    /// Creates a wordbook document, optionally pre-filled (the login merge
    /// uses this to carry guest words across). Ids are minted client-side.
    pub async fn insert_wordbook(&self, name: &str, words: &[Word]) -> StoreResult<BookId> {
        let book = RemoteBook {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            words: words.to_vec(),
        };
        let response = self
            .client
            .post(self.url("/wordbooks"))
            .json(&book)
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(BookId::Remote(book.id))
    }

    pub async fn delete_wordbook(&self, id: &BookId) -> StoreResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/wordbooks/{}", id.as_str())))
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    pub async fn add_word(&self, id: &BookId, word: &Word) -> StoreResult<()> {
        let response = self
            .client
            .post(self.url(&format!("/wordbooks/{}/words", id.as_str())))
            .json(word)
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    pub async fn remove_word(&self, id: &BookId, en: &str) -> StoreResult<()> {
        let response = self
            .client
            .delete(self.url(&format!(
                "/wordbooks/{}/words/{}",
                id.as_str(),
                urlencoding::encode(en)
            )))
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    pub async fn update_words(&self, id: &BookId, words: &[Word]) -> StoreResult<()> {
        let response = self
            .client
            .put(self.url(&format!("/wordbooks/{}/words", id.as_str())))
            .json(&ReviewPayload { words })
            .send()
            .await?;
        Self::expect_ok(response).await
    }
}

/// A mutation only counts as committed when both the HTTP status and the
/// envelope's `success` flag agree.
fn check_ok(status: StatusCode, envelope: Envelope<serde_json::Value>) -> StoreResult<()> {
    if status.is_success() && envelope.success {
        return Ok(());
    }
    Err(remote_error(status, envelope.code, envelope.error))
}

fn remote_error(status: StatusCode, code: Option<String>, message: Option<String>) -> StoreError {
    let code = code.unwrap_or_else(|| {
        if status == StatusCode::NOT_FOUND {
            "NOT_FOUND".to_string()
        } else {
            "BACKEND_ERROR".to_string()
        }
    });
    StoreError::Remote {
        code,
        message: message.unwrap_or_else(|| format!("HTTP {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_per_user_and_encoded() {
        let store = RemoteStore::new("https://api.example.com/", "uid-1").expect("client");
        assert_eq!(
            store.url("/wordbooks"),
            "https://api.example.com/users/uid-1/wordbooks"
        );
        assert_eq!(
            format!(
                "{}/words/{}",
                store.url("/wordbooks/b1"),
                urlencoding::encode("ice cream")
            ),
            "https://api.example.com/users/uid-1/wordbooks/b1/words/ice%20cream"
        );
    }

    #[test]
    fn in_band_failure_on_a_2xx_is_an_error() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"success": false, "error": "保存に失敗しました", "code": "BACKEND_ERROR"}"#)
                .expect("envelope");
        let err = check_ok(StatusCode::OK, envelope).err().expect("must fail");
        assert!(matches!(err, StoreError::Remote { ref code, .. } if code == "BACKEND_ERROR"));

        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"success": true}"#).expect("envelope");
        assert!(check_ok(StatusCode::OK, envelope).is_ok());
    }

    #[test]
    fn envelope_error_maps_to_remote() {
        let err = remote_error(StatusCode::NOT_FOUND, None, None);
        assert!(err.is_not_found());
        let err = remote_error(
            StatusCode::BAD_REQUEST,
            Some("VALIDATION_ERROR".into()),
            Some("名称が不正です".into()),
        );
        assert!(!err.is_not_found());
    }
}
