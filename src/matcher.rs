//! MQTT topic filter matching.

/// Returns `true` when `topic` is selected by the subscription `filter`.
///
/// `+` matches exactly one level, a trailing `#` matches any remaining
/// levels (including none). A `#` anywhere but last never matches.
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');

    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return filter_levels.next().is_none(),
            (Some("+"), Some(_)) => {}
            (Some(f), Some(t)) if f == t => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}
