use serde::{Deserialize, Serialize};

/// 単語ペア
///
/// Identity is the `en` field: exact-case everywhere except the
/// insertion-time duplicate check, which lowercases first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub en: String,
    pub jp: String,
}

impl Word {
    pub fn new(en: impl Into<String>, jp: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            jp: jp.into(),
        }
    }

    /// Value equality by English text, exact case.
    pub fn same_en(&self, other_en: &str) -> bool {
        self.en == other_en
    }
}

/// Wordbook identifier, resolved once at the persistence boundary.
///
/// Remote documents carry an opaque id; guest-mode books are keyed by
/// their name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum BookId {
    Remote(String),
    Local(String),
}

impl BookId {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Remote(id) | Self::Local(id) => id,
        }
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 単語帳
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wordbook {
    pub id: BookId,
    pub name: String,
    pub words: Vec<Word>,
}

impl Wordbook {
    /// Display order is computed at render time, never stored.
    pub fn sorted_words(&self) -> Vec<Word> {
        let mut words = self.words.clone();
        words.sort_by(|a, b| a.en.cmp(&b.en));
        words
    }
}

/// 料金プラン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Premium,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "premium" => Self::Premium,
            _ => Self::Free,
        }
    }

    /// Maximum wordbook count for this plan, `None` meaning unlimited.
    /// Guests get 2, authenticated free users 5.
    pub fn wordbook_limit(&self, authenticated: bool) -> Option<usize> {
        match self {
            Self::Premium => None,
            Self::Free if authenticated => Some(5),
            Self::Free => Some(2),
        }
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::Free
    }
}

/// 出題方向。セッション開始時に一度だけ読み取られる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionDirection {
    #[serde(rename = "en-to-jp")]
    EnToJp,
    #[serde(rename = "jp-to-en")]
    JpToEn,
}

impl Default for QuestionDirection {
    fn default() -> Self {
        Self::EnToJp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_words_does_not_mutate() {
        let book = Wordbook {
            id: BookId::Local("basic".to_string()),
            name: "basic".to_string(),
            words: vec![Word::new("zebra", "シマウマ"), Word::new("apple", "りんご")],
        };
        let sorted = book.sorted_words();
        assert_eq!(sorted[0].en, "apple");
        assert_eq!(book.words[0].en, "zebra");
    }

    #[test]
    fn plan_limits() {
        assert_eq!(Plan::Free.wordbook_limit(false), Some(2));
        assert_eq!(Plan::Free.wordbook_limit(true), Some(5));
        assert_eq!(Plan::Premium.wordbook_limit(false), None);
    }

    #[test]
    fn plan_from_str_defaults_to_free() {
        assert_eq!(Plan::from_str("premium"), Plan::Premium);
        assert_eq!(Plan::from_str("unknown"), Plan::Free);
    }
}
