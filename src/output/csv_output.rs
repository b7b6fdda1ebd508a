//! CSV export of URL records
//!
//! The output format is fixed: a five-column header followed by one row per
//! record, in traversal order. Absent optional fields render as empty
//! strings, and the target file is overwritten if it exists.

use crate::crawler::UrlRecord;
use crate::SweepError;
use std::path::Path;

/// Fixed column order of the output file
pub const CSV_HEADER: [&str; 5] = [
    "url",
    "last_modified",
    "change_frequency",
    "priority",
    "source_sitemap",
];

/// Serializes URL records to a CSV file
///
/// The header row is written even when there are no records, so the output
/// is always a well-formed CSV document.
///
/// # Arguments
///
/// * `records` - The records to write, in the order they should appear
/// * `path` - Target file path; overwritten if it exists
///
/// # Returns
///
/// * `Ok(())` - File written and flushed
/// * `Err(SweepError)` - The file could not be created or written; this is
///   one of the few process-fatal failures
pub fn save_to_csv(records: &[UrlRecord], path: &Path) -> Result<(), SweepError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::info!("Saved {} URLs to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, source: &str) -> UrlRecord {
        UrlRecord {
            url: url.to_string(),
            last_modified: None,
            change_frequency: None,
            priority: None,
            source_sitemap: source.to_string(),
        }
    }

    #[test]
    fn test_round_trip_preserves_fields_and_order() {
        let records = vec![
            UrlRecord {
                url: "http://example.com/p1".to_string(),
                last_modified: Some("2024-01-01".to_string()),
                change_frequency: None,
                priority: Some("0.5".to_string()),
                source_sitemap: "a.xml".to_string(),
            },
            record("http://example.com/p2", "b.xml"),
        ];

        let file = tempfile::NamedTempFile::new().unwrap();
        save_to_csv(&records, file.path()).unwrap();

        let mut reader = csv::Reader::from_path(file.path()).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            &csv::StringRecord::from(CSV_HEADER.to_vec())
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            csv::StringRecord::from(vec![
                "http://example.com/p1",
                "2024-01-01",
                "",
                "0.5",
                "a.xml"
            ])
        );
        assert_eq!(
            rows[1],
            csv::StringRecord::from(vec!["http://example.com/p2", "", "", "", "b.xml"])
        );
    }

    #[test]
    fn test_empty_record_list_still_writes_header() {
        let file = tempfile::NamedTempFile::new().unwrap();
        save_to_csv(&[], file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(
            content.trim_end(),
            "url,last_modified,change_frequency,priority,source_sitemap"
        );
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let records = vec![UrlRecord {
            url: "http://example.com/a,b".to_string(),
            last_modified: None,
            change_frequency: None,
            priority: None,
            source_sitemap: "a.xml".to_string(),
        }];

        let file = tempfile::NamedTempFile::new().unwrap();
        save_to_csv(&records, file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("\"http://example.com/a,b\""));

        let mut reader = csv::Reader::from_path(file.path()).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "http://example.com/a,b");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        save_to_csv(&[record("http://example.com/old", "a.xml")], file.path()).unwrap();
        save_to_csv(&[record("http://example.com/new", "b.xml")], file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("http://example.com/new"));
        assert!(!content.contains("http://example.com/old"));
    }
}
