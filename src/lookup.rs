//! 外部翻訳サイトへの検索リンク生成
//!
//! Detects whether the query is Japanese and builds a Google Translate
//! URL with the source/target languages oriented accordingly. The app
//! never calls the translation service itself; the link is handed to the
//! user.

/// Japanese punctuation, hiragana, katakana, and the common CJK ideograph
/// block.
fn is_japanese_char(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{303F}'
        | '\u{3040}'..='\u{309F}'
        | '\u{30A0}'..='\u{30FF}'
        | '\u{4E00}'..='\u{9FAF}')
}

/// A query counts as Japanese if any character falls in a Japanese block.
pub fn is_japanese(text: &str) -> bool {
    text.chars().any(is_japanese_char)
}

/// Translate-page URL for the trimmed query, or `None` when the query is
/// blank.
pub fn translate_url(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let (sl, tl) = if is_japanese(query) {
        ("ja", "en")
    } else {
        ("en", "ja")
    };
    Some(format!(
        "https://translate.google.co.jp/?sl={sl}&tl={tl}&text={}&op=translate",
        urlencoding::encode(query)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_japanese_block() {
        assert!(is_japanese("ひらがな"));
        assert!(is_japanese("カタカナ"));
        assert!(is_japanese("漢字"));
        assert!(is_japanese("、"));
        assert!(!is_japanese("apple pie"));
        assert!(!is_japanese("café 123"));
    }

    #[test]
    fn mixed_text_counts_as_japanese() {
        assert!(is_japanese("apple りんご"));
    }

    #[test]
    fn url_orients_languages_by_script() {
        assert_eq!(
            translate_url("apple").as_deref(),
            Some("https://translate.google.co.jp/?sl=en&tl=ja&text=apple&op=translate")
        );
        assert_eq!(
            translate_url("りんご").as_deref(),
            Some(
                "https://translate.google.co.jp/?sl=ja&tl=en&text=%E3%82%8A%E3%82%93%E3%81%94&op=translate"
            )
        );
    }

    #[test]
    fn blank_queries_produce_no_url() {
        assert_eq!(translate_url(""), None);
        assert_eq!(translate_url("   "), None);
    }

    #[test]
    fn spaces_are_percent_encoded() {
        let url = translate_url("ice cream").unwrap();
        assert!(url.contains("text=ice%20cream"));
    }
}
