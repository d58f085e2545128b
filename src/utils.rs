/// Utility functions
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// Extract number from JSON value
pub fn num(v: &Value) -> Option<f64> {
    if let Some(x) = v.as_f64() {
        return Some(x);
    }
    if let Some(s) = v.as_str() {
        return s.trim().parse::<f64>().ok();
    }
    None
}

/// Parse an RFC 3339 timestamp such as `2024-09-28T17:17:00.000Z`
pub fn parse_utc(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Round to one decimal place
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Human countdown until `target`, e.g. `3d 4h 5m 6s`
pub fn format_countdown(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (target - now).num_seconds();
    if diff <= 0 {
        return "Launch time reached!".to_string();
    }

    let days = diff / 86_400;
    let hours = (diff % 86_400) / 3_600;
    let minutes = (diff % 3_600) / 60;
    let seconds = diff % 60;
    format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
}

/// Counter keyed by label that remembers first-seen order.
///
/// Ranking is a stable sort, so equal totals keep the order in which their
/// labels first appeared.
#[derive(Debug, Default)]
pub struct Tally {
    index: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, amount: u64) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += amount,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), amount));
            }
        }
    }

    /// Highest totals first, at most `limit` entries
    pub fn into_ranked(self, limit: usize) -> Vec<(String, u64)> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(limit);
        entries
    }
}

/// Stable descending sort by a count, truncated to `limit`
pub fn top_n<T, F>(mut items: Vec<T>, limit: usize, count: F) -> Vec<T>
where
    F: Fn(&T) -> u64,
{
    items.sort_by(|a, b| count(b).cmp(&count(a)));
    items.truncate(limit);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_num_from_float() {
        let json = serde_json::json!(42.5);
        assert_eq!(num(&json), Some(42.5));
    }

    #[test]
    fn test_num_from_string() {
        let json = serde_json::json!(" 42.5");
        assert_eq!(num(&json), Some(42.5));
    }

    #[test]
    fn test_num_from_null_and_invalid() {
        assert_eq!(num(&Value::Null), None);
        assert_eq!(num(&serde_json::json!("invalid")), None);
    }

    #[test]
    fn test_parse_utc_with_millis() {
        let dt = parse_utc("2024-09-28T17:17:00.000Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 9, 28, 17, 17, 0).unwrap());
        assert_eq!(parse_utc("not a date"), None);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(97.3456), 97.3);
        assert_eq!(round1(66.66666), 66.7);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn test_format_countdown() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let target = now
            + chrono::Duration::days(2)
            + chrono::Duration::hours(3)
            + chrono::Duration::minutes(4)
            + chrono::Duration::seconds(5);
        assert_eq!(format_countdown(target, now), "2d 3h 4m 5s");
    }

    #[test]
    fn test_format_countdown_reached() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_countdown(now, now), "Launch time reached!");
        assert_eq!(
            format_countdown(now - chrono::Duration::hours(1), now),
            "Launch time reached!"
        );
    }

    #[test]
    fn test_tally_sums_and_ranks() {
        let mut tally = Tally::new();
        tally.add("Just Chatting", 100);
        tally.add("Fortnite", 50);
        tally.add("Just Chatting", 25);
        tally.add("Valorant", 50);

        assert_eq!(
            tally.into_ranked(5),
            vec![
                ("Just Chatting".to_string(), 125),
                ("Fortnite".to_string(), 50),
                ("Valorant".to_string(), 50),
            ]
        );
    }

    #[test]
    fn test_tally_truncates() {
        let mut tally = Tally::new();
        for (i, name) in ["a", "b", "c", "d", "e", "f", "g"].iter().enumerate() {
            tally.add(name, i as u64);
        }
        let ranked = tally.into_ranked(5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].0, "g");
        assert_eq!(ranked[4].0, "c");
    }

    #[test]
    fn test_top_n_keeps_source_order_on_ties() {
        let items = vec![("x", 1), ("y", 3), ("z", 1), ("w", 3)];
        let ranked = top_n(items, 3, |(_, n)| *n);
        assert_eq!(ranked, vec![("y", 3), ("w", 3), ("x", 1)]);
    }
}
