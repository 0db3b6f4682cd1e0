use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StreakState {
    /// Consecutive active days ending today, or yesterday while today has no activity yet.
    pub current_streak: u32,
    /// Longest run of consecutive active days up to the evaluation date.
    pub longest_streak: u32,
    pub last_active_date: Option<NaiveDate>,
}

/// Dates with a positive total.
pub fn active_dates(totals: &BTreeMap<NaiveDate, u64>) -> BTreeSet<NaiveDate> {
    totals
        .iter()
        .filter(|(_, total)| **total > 0)
        .map(|(date, _)| *date)
        .collect()
}

/// Counts consecutive active days walking back from `evaluation_date`.
///
/// A day without activity is tolerated only for `evaluation_date` itself, so a streak isn't
/// broken before the day is over.
pub fn compute_streak(active_dates: &BTreeSet<NaiveDate>, evaluation_date: NaiveDate) -> u32 {
    let mut cursor = Some(evaluation_date);
    if !active_dates.contains(&evaluation_date) {
        cursor = evaluation_date.pred_opt();
    }

    let mut streak = 0;
    while let Some(date) = cursor.filter(|d| active_dates.contains(d)) {
        streak += 1;
        cursor = date.pred_opt();
    }
    streak
}

/// Longest run of consecutive active days on or before `evaluation_date`.
pub fn longest_streak(active_dates: &BTreeSet<NaiveDate>, evaluation_date: NaiveDate) -> u32 {
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;
    for date in active_dates.range(..=evaluation_date) {
        current = match previous {
            Some(p) if p.succ_opt() == Some(*date) => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(*date);
    }
    longest
}

pub fn streak_state(totals: &BTreeMap<NaiveDate, u64>, evaluation_date: NaiveDate) -> StreakState {
    let active = active_dates(totals);
    let state = StreakState {
        current_streak: compute_streak(&active, evaluation_date),
        longest_streak: longest_streak(&active, evaluation_date),
        last_active_date: active.range(..=evaluation_date).next_back().copied(),
    };
    debug!(
        "Streak at {evaluation_date} current={} longest={}",
        state.current_streak, state.longest_streak
    );
    state
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use chrono::NaiveDate;

    use super::{compute_streak, longest_streak, streak_state, StreakState};

    const TODAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 12).unwrap();

    fn dates(days: &[u32]) -> BTreeSet<NaiveDate> {
        days.iter()
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, *d).unwrap())
            .collect()
    }

    #[test]
    fn streak_ending_today() {
        assert_eq!(compute_streak(&dates(&[10, 11, 12]), TODAY), 3);
    }

    #[test]
    fn streak_ending_yesterday_is_kept() {
        assert_eq!(compute_streak(&dates(&[10, 11]), TODAY), 2);
    }

    #[test]
    fn two_day_gap_breaks_streak() {
        assert_eq!(compute_streak(&dates(&[10]), TODAY), 0);
    }

    #[test]
    fn gap_inside_history_stops_count() {
        assert_eq!(compute_streak(&dates(&[5, 6, 7, 9, 10, 11, 12]), TODAY), 4);
    }

    #[test]
    fn future_activity_is_not_counted() {
        assert_eq!(compute_streak(&dates(&[12, 13, 14]), TODAY), 1);
        assert_eq!(compute_streak(&dates(&[13, 14]), TODAY), 0);
    }

    #[test]
    fn empty_history() {
        assert_eq!(compute_streak(&BTreeSet::new(), TODAY), 0);
        assert_eq!(longest_streak(&BTreeSet::new(), TODAY), 0);
        assert_eq!(streak_state(&BTreeMap::new(), TODAY), StreakState::default());
    }

    #[test]
    fn streak_stops_at_start_of_calendar() {
        let active = [NaiveDate::MIN, NaiveDate::MIN.succ_opt().unwrap()]
            .into_iter()
            .collect();
        assert_eq!(compute_streak(&active, NaiveDate::MIN.succ_opt().unwrap()), 2);
        assert_eq!(compute_streak(&BTreeSet::new(), NaiveDate::MIN), 0);
    }

    #[test]
    fn longest_streak_in_history() {
        let active = dates(&[1, 2, 3, 4, 7, 8, 11, 12, 20]);
        assert_eq!(longest_streak(&active, TODAY), 4);
        assert_eq!(longest_streak(&active, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()), 2);
    }

    #[test]
    fn state_ignores_inactive_days() {
        let totals = BTreeMap::from([
            (NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(), 1),
            (NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(), 0),
            (TODAY, 3),
        ]);
        let state = streak_state(&totals, TODAY);
        assert_eq!(
            state,
            StreakState {
                current_streak: 1,
                longest_streak: 1,
                last_active_date: Some(TODAY),
            }
        );
    }
}
