//! Track descriptor builder

use crate::error::{BotbError, Result};
use crate::types::{CatalogRecord, TrackDescriptor};

/// Normalize a catalog record.
///
/// The media URL is taken as-is; reachability is the prober's concern.
pub fn build(record: CatalogRecord) -> Result<TrackDescriptor> {
    let author = record.author_name().unwrap_or_default().to_string();
    let title = record
        .title
        .ok_or(BotbError::MalformedRecord { field: "title" })?;
    let media_url = record
        .media_url
        .ok_or(BotbError::MalformedRecord { field: "play_url" })?;

    Ok(TrackDescriptor {
        title,
        author,
        media_url,
        duration_millis: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Botbr;

    #[test]
    fn test_build_full_record() {
        let record = CatalogRecord {
            title: Some("Bar".to_string()),
            media_url: Some("http://x/y.mp3".to_string()),
            botbr: Some(Botbr {
                name: Some("Z".to_string()),
            }),
        };

        assert_eq!(
            build(record).unwrap(),
            TrackDescriptor {
                title: "Bar".to_string(),
                author: "Z".to_string(),
                media_url: "http://x/y.mp3".to_string(),
                duration_millis: None,
            }
        );
    }

    #[test]
    fn test_author_defaults_to_empty() {
        let record = CatalogRecord {
            title: Some("Bar".to_string()),
            media_url: Some("http://x/y.mp3".to_string()),
            botbr: None,
        };

        assert_eq!(build(record).unwrap().author, "");
    }

    #[test]
    fn test_empty_record_is_malformed() {
        let err = build(CatalogRecord::default()).unwrap_err();
        assert!(matches!(err, BotbError::MalformedRecord { field: "title" }));
    }

    #[test]
    fn test_missing_media_url_is_malformed() {
        let record: CatalogRecord = serde_json::from_str(r#"{"title":"Bar"}"#).unwrap();
        let err = build(record).unwrap_err();
        assert!(matches!(err, BotbError::MalformedRecord { field: "play_url" }));
    }
}
