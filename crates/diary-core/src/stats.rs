//! Diary statistics.
//!
//! Aggregation is read-only. Encrypted entries are opened only to count
//! their words; an entry that fails to open counts as empty and the rest
//! are still processed.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::warn;

use crate::crypto::decrypt;
use crate::error::Result;
use crate::policy::OperationKey;
use crate::storage::types::{Diary, DiaryStats};

/// Whitespace-separated token count.
pub fn count_words(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Distinct days covered as a percentage of the span from first to last day.
pub fn check_in_percentage(days: &BTreeSet<NaiveDate>) -> f64 {
    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return 0.0;
    };
    let span = (*last - *first).num_days() + 1;
    if span <= 0 {
        return 0.0;
    }
    days.len() as f64 / span as f64 * 100.0
}

/// Compute statistics over one owner's diaries.
///
/// # Errors
///
/// Key derivation failures propagate. Per-entry decryption failures do not.
pub fn compute_stats(diaries: &[Diary], key: &mut OperationKey<'_>) -> Result<DiaryStats> {
    let mut total_words = 0u64;
    let mut days = BTreeSet::new();
    let mut ratings: BTreeMap<String, u64> = BTreeMap::new();

    for diary in diaries {
        total_words += if diary.is_encrypted {
            match decrypt(&diary.content, key.get()?) {
                Ok(plaintext) => count_words(&plaintext),
                Err(e) => {
                    warn!(diary_id = %diary.id, error = %e, "Skipping undecryptable diary in stats");
                    0
                }
            }
        } else {
            count_words(&diary.content)
        };

        days.insert(diary.entry_date.date_naive());

        if let Some(rating) = diary.daily_rating.as_deref().filter(|r| !r.is_empty()) {
            *ratings.entry(rating.to_string()).or_insert(0) += 1;
        }
    }

    let total_entries = diaries.len() as u64;
    let average_words_per_entry = if total_entries > 0 {
        total_words as f64 / total_entries as f64
    } else {
        0.0
    };

    Ok(DiaryStats {
        total_entries,
        total_words,
        average_words_per_entry,
        check_in_frequency_percentage: check_in_percentage(&days),
        daily_ratings_distribution: ratings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("one two\tthree\nfour"), 4);
    }

    #[test]
    fn test_check_in_percentage() {
        let empty = BTreeSet::new();
        assert_eq!(check_in_percentage(&empty), 0.0);

        let single: BTreeSet<_> = [day(2024, 1, 1)].into_iter().collect();
        assert_eq!(check_in_percentage(&single), 100.0);

        // 2 of 4 days
        let sparse: BTreeSet<_> = [day(2024, 1, 1), day(2024, 1, 4)].into_iter().collect();
        assert_eq!(check_in_percentage(&sparse), 50.0);
    }
}
