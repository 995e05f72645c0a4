// Projected wait times for queued entries, derived from match history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EstimatorConfig;
use crate::queue::models::QueueEntry;
use crate::rotation::models::Match;

const MS_PER_MINUTE: f64 = 60_000.0;

/// A queue entry together with its projected start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedEntry {
    #[serde(flatten)]
    pub entry: QueueEntry,
    pub time_until_start_ms: i64,
    pub estimated_start_minutes: i64,
}

/// Average time between consecutive finished matches on a court
///
/// `timestamps` may be in any order; only the most recent
/// `duration_window + 1` are considered. Gaps that are zero or negative are
/// ignored, and the configured default is returned when no gap is usable.
pub fn average_match_duration(timestamps: &[DateTime<Utc>], config: &EstimatorConfig) -> i64 {
    if timestamps.len() < 2 {
        return config.default_match_duration_ms;
    }

    let mut chronological = timestamps.to_vec();
    chronological.sort();
    let keep = config.duration_window + 1;
    let recent = &chronological[chronological.len().saturating_sub(keep)..];

    let gaps: Vec<i64> = recent
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_milliseconds())
        .filter(|gap| *gap > 0)
        .collect();

    if gaps.is_empty() {
        return config.default_match_duration_ms;
    }

    let total: i64 = gaps.iter().sum();
    let average = (total as f64 / gaps.len() as f64).round() as i64;
    match config.clamp {
        Some(band) => band.apply(average),
        None => average,
    }
}

/// Attaches a projected start time to each entry, preserving queue order
///
/// The first entry waits for the current match to run its average length;
/// every further rank adds one more average match.
pub fn estimate_queue(
    queue: &[QueueEntry],
    active_match: Option<&Match>,
    average_duration_ms: i64,
    now: DateTime<Utc>,
) -> Vec<EstimatedEntry> {
    let elapsed = active_match
        .map(|m| (now - m.started_at).num_milliseconds())
        .unwrap_or(0);
    let until_current_ends = if active_match.is_some() {
        (average_duration_ms - elapsed).max(0)
    } else {
        0
    };

    queue
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let time_until_start_ms = until_current_ends + average_duration_ms * idx as i64;
            let minutes = (time_until_start_ms as f64 / MS_PER_MINUTE).round() as i64;
            EstimatedEntry {
                entry: entry.clone(),
                time_until_start_ms,
                estimated_start_minutes: minutes.max(0),
            }
        })
        .collect()
}
