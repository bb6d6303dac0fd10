//! Messenger threads
//!
//! Attribution happens in two phases. Each thread is read into tentative
//! messages that only record whether the sender is the user. Once every
//! thread is known, [`resolve_messages`] decides for the whole corpus: if the
//! user sent anything, messages split into sent and received; otherwise all
//! of them count as received-or-sent.

use crate::config::QuantifierConfig;
use crate::types::{Category, MessageAttribution, RawRecord, RawTimestamp, TimestampUnit};
use serde_json::Value;
use tracing::info;

/// A message whose final category is not decided yet
#[derive(Debug, Clone, PartialEq)]
pub struct TentativeMessage {
    pub sender_matched: bool,
    /// `None` when the message carries no timestamp field
    pub timestamp: Option<RawTimestamp>,
}

/// Read the messages of one thread document
pub(super) fn collect_thread(
    doc: &Value,
    sender_field: &str,
    timestamp_field: &str,
    config: &QuantifierConfig,
) -> Result<Vec<TentativeMessage>, String> {
    let messages = doc
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| "thread has no \"messages\" list".to_string())?;

    // Every message takes part in the attribution decision, whatever the
    // state of its timestamp; only the counting step depends on the timestamp
    Ok(messages
        .iter()
        .filter(|message| message.is_object())
        .map(|message| {
            let timestamp = message.get(timestamp_field).map(RawTimestamp::from);
            let sender_matched = message
                .get(sender_field)
                .and_then(Value::as_str)
                .is_some_and(|sender| config.is_identity(sender));
            TentativeMessage {
                sender_matched,
                timestamp,
            }
        })
        .collect())
}

/// Decide message categories once, over every collected message
pub fn resolve_messages(tentative: Vec<TentativeMessage>) -> (MessageAttribution, Vec<RawRecord>) {
    let attribution = if tentative.is_empty() {
        MessageAttribution::NoMessages
    } else if tentative.iter().any(|m| m.sender_matched) {
        MessageAttribution::SentReceived
    } else {
        info!(
            messages = tentative.len(),
            "identity never matched a sender; counting all messages as received_or_sent"
        );
        MessageAttribution::Fallback
    };

    // Messages without a timestamp count nowhere; unparseable ones are left
    // for the normalizer to discard
    let records = tentative
        .into_iter()
        .filter_map(|message| {
            let timestamp = message.timestamp?;
            let category = match attribution {
                MessageAttribution::SentReceived if message.sender_matched => {
                    Category::MessageSent
                }
                MessageAttribution::SentReceived => Category::MessageReceived,
                MessageAttribution::Fallback | MessageAttribution::NoMessages => {
                    Category::MessageReceivedOrSent
                }
            };
            Some(RawRecord::new(category, timestamp, TimestampUnit::Milliseconds))
        })
        .collect();

    (attribution, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn thread(messages: Value) -> Value {
        json!({
            "participants": [{"name": "Alice"}, {"name": "Bob"}],
            "messages": messages
        })
    }

    fn categories(records: &[RawRecord]) -> Vec<Category> {
        records.iter().map(|r| r.category).collect()
    }

    #[test]
    fn test_sent_and_received() {
        let doc = thread(json!([
            {"sender_name": "Alice", "timestamp_ms": 1272700800000i64, "content": "hi"},
            {"sender_name": "Bob", "timestamp_ms": 1272700860000i64, "content": "hey"}
        ]));
        let config = QuantifierConfig::new().with_identity("Alice");
        let tentative = collect_thread(&doc, "sender_name", "timestamp_ms", &config).unwrap();
        let (attribution, records) = resolve_messages(tentative);

        assert_eq!(attribution, MessageAttribution::SentReceived);
        assert_eq!(
            categories(&records),
            vec![Category::MessageSent, Category::MessageReceived]
        );
        assert!(records.iter().all(|r| r.unit == TimestampUnit::Milliseconds));
    }

    #[test]
    fn test_fallback_when_identity_never_matches() {
        let doc = thread(json!([
            {"sender_name": "Bob", "timestamp_ms": 1},
            {"sender_name": "Carol", "timestamp_ms": 2}
        ]));
        let config = QuantifierConfig::new().with_identity("alice");
        let tentative = collect_thread(&doc, "sender_name", "timestamp_ms", &config).unwrap();
        let (attribution, records) = resolve_messages(tentative);

        assert_eq!(attribution, MessageAttribution::Fallback);
        assert_eq!(
            categories(&records),
            vec![Category::MessageReceivedOrSent, Category::MessageReceivedOrSent]
        );
    }

    #[test]
    fn test_fallback_without_identity() {
        let doc = thread(json!([{"sender_name": "Alice", "timestamp_ms": 1}]));
        let tentative =
            collect_thread(&doc, "sender_name", "timestamp_ms", &QuantifierConfig::default())
                .unwrap();
        let (attribution, _) = resolve_messages(tentative);
        assert_eq!(attribution, MessageAttribution::Fallback);
    }

    #[test]
    fn test_decision_is_global_across_threads() {
        let config = QuantifierConfig::new().with_identity("Alice");
        let quiet = thread(json!([{"sender_name": "Bob", "timestamp_ms": 1}]));
        let chatty = thread(json!([{"sender_name": "Alice", "timestamp_ms": 2}]));

        let mut tentative = collect_thread(&quiet, "sender_name", "timestamp_ms", &config).unwrap();
        tentative.extend(collect_thread(&chatty, "sender_name", "timestamp_ms", &config).unwrap());
        let (attribution, records) = resolve_messages(tentative);

        // The thread without a match is still split, not a fallback
        assert_eq!(attribution, MessageAttribution::SentReceived);
        assert_eq!(
            categories(&records),
            vec![Category::MessageReceived, Category::MessageSent]
        );
    }

    #[test]
    fn test_untimed_message_still_decides_attribution() {
        let doc = thread(json!([
            {"sender_name": "Alice"},
            {"sender_name": "Bob", "timestamp_ms": 5}
        ]));
        let config = QuantifierConfig::new().with_identity("Alice");
        let tentative = collect_thread(&doc, "sender_name", "timestamp_ms", &config).unwrap();
        assert_eq!(tentative.len(), 2);
        assert!(tentative[0].sender_matched);
        assert_eq!(tentative[0].timestamp, None);

        let (attribution, records) = resolve_messages(tentative);
        assert_eq!(attribution, MessageAttribution::SentReceived);
        // The untimed message is not counted anywhere
        assert_eq!(categories(&records), vec![Category::MessageReceived]);
    }

    #[test]
    fn test_missing_and_unparseable_timestamps_decide_alike() {
        let config = QuantifierConfig::new().with_identity("Alice");
        let missing = thread(json!([
            {"sender_name": "Alice"},
            {"sender_name": "Bob", "timestamp_ms": 5}
        ]));
        let unparseable = thread(json!([
            {"sender_name": "Alice", "timestamp_ms": "later"},
            {"sender_name": "Bob", "timestamp_ms": 5}
        ]));

        let (from_missing, _) = resolve_messages(
            collect_thread(&missing, "sender_name", "timestamp_ms", &config).unwrap(),
        );
        let (from_unparseable, records) = resolve_messages(
            collect_thread(&unparseable, "sender_name", "timestamp_ms", &config).unwrap(),
        );
        assert_eq!(from_missing, MessageAttribution::SentReceived);
        assert_eq!(from_unparseable, from_missing);
        // The unparseable value is passed on and discarded during normalization
        assert_eq!(
            categories(&records),
            vec![Category::MessageSent, Category::MessageReceived]
        );
    }

    #[test]
    fn test_thread_without_messages_is_malformed() {
        let config = QuantifierConfig::default();
        assert!(collect_thread(&json!({"title": "x"}), "sender_name", "timestamp_ms", &config).is_err());
        assert!(collect_thread(&json!([]), "sender_name", "timestamp_ms", &config).is_err());
    }

    #[test]
    fn test_no_threads() {
        let (attribution, records) = resolve_messages(Vec::new());
        assert_eq!(attribution, MessageAttribution::NoMessages);
        assert!(records.is_empty());
    }
}
