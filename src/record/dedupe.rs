use crate::record::HarvestedRecord;
use crate::url::canonical_url;
use std::collections::HashMap;

/// Collapses records that share a canonical URL
///
/// A later record fully replaces an earlier one with the same key and keeps
/// the earlier one's position. Records whose URL canonicalizes to an empty
/// string are dropped. Each returned record carries its canonical URL.
pub fn dedupe(records: Vec<HarvestedRecord>) -> Vec<HarvestedRecord> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut deduped: Vec<HarvestedRecord> = Vec::with_capacity(records.len());

    for mut record in records {
        let key = canonical_url(&record.canonical_url);
        if key.is_empty() {
            tracing::debug!("Dropping record with empty URL: {}", record.title);
            continue;
        }
        record.canonical_url = key.clone();

        match positions.get(&key) {
            Some(&index) => deduped[index] = record,
            None => {
                positions.insert(key, deduped.len());
                deduped.push(record);
            }
        }
    }

    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StructuredFields;

    fn record(url: &str, title: &str) -> HarvestedRecord {
        HarvestedRecord {
            canonical_url: url.to_string(),
            title: title.to_string(),
            source_host: "lancers.jp".to_string(),
            fields: StructuredFields::default(),
        }
    }

    #[test]
    fn test_later_record_wins() {
        let deduped = dedupe(vec![
            record("https://lancers.jp/work/detail/1?ref=list", "A"),
            record("https://lancers.jp/work/detail/1/", "B"),
        ]);

        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].title, "B");
        assert_eq!(deduped[0].canonical_url, "https://lancers.jp/work/detail/1");
    }

    #[test]
    fn test_replacement_is_whole_record() {
        let mut first = record("https://lancers.jp/work/detail/1", "A");
        first.fields.price = "50万円".to_string();
        let second = record("https://lancers.jp/work/detail/1#apply", "B");

        let deduped = dedupe(vec![first, second]);
        assert_eq!(deduped.len(), 1);
        assert!(deduped[0].fields.price.is_empty());
    }

    #[test]
    fn test_keeps_first_seen_position() {
        let deduped = dedupe(vec![
            record("https://a.example/1", "one"),
            record("https://a.example/2", "two"),
            record("https://a.example/1?page=2", "one again"),
        ]);

        let titles: Vec<_> = deduped.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["one again", "two"]);
    }

    #[test]
    fn test_drops_empty_urls() {
        let deduped = dedupe(vec![record("   ", "blank"), record("https://a.example/1", "ok")]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].title, "ok");
    }

    #[test]
    fn test_distinct_urls_are_kept() {
        let deduped = dedupe(vec![
            record("https://a.example/1", "one"),
            record("https://b.example/1", "two"),
        ]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe(Vec::new()).is_empty());
    }
}
