//! Wire format of the persisted snapshot: one JSON array of articles.

use crate::app::Result;
use crate::domain::Article;

pub fn encode_snapshot(articles: &[Article]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(articles)?)
}

pub fn decode_snapshot(blob: &[u8]) -> Result<Vec<Article>> {
    Ok(serde_json::from_slice(blob)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::article::sample_raw;

    #[test]
    fn test_snapshot_preserves_fields_and_order() {
        let mut articles = Article::generation(vec![
            sample_raw("first"),
            sample_raw("second"),
            sample_raw("third"),
        ]);
        articles[2].is_pinned = true;
        articles[0].url_to_image = Some("https://img.example.com/1.png".into());

        let blob = encode_snapshot(&articles).unwrap();
        let decoded = decode_snapshot(&blob).unwrap();

        assert_eq!(decoded, articles);
    }

    #[test]
    fn test_snapshot_uses_camel_case_keys() {
        let articles = Article::generation(vec![sample_raw("first")]);
        let blob = encode_snapshot(&articles).unwrap();
        let text = String::from_utf8(blob).unwrap();

        assert!(text.contains("\"isPinned\":false"));
        assert!(text.contains("\"publishedAt\""));
        assert!(text.contains("\"key\":\"0\""));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_snapshot(b"not json").unwrap_err();
        assert!(err.is_cache_failure());
    }
}
