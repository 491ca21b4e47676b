use crate::models::{AttendanceStatus, Tally, STATUS_SLOTS};

/// Shapes a stored counter array into the fixed four slots. Missing rows,
/// short arrays, and negative values all read as zero.
pub fn normalize(raw: Option<Vec<i32>>) -> Tally {
    let mut slots = [0; STATUS_SLOTS];
    if let Some(values) = raw {
        for (slot, value) in slots.iter_mut().zip(values) {
            *slot = value.max(0);
        }
    }
    slots
}

/// Parses a raw count entry. Non-numeric input yields None, as does a
/// negative count (the counter slots are non-negative).
pub fn parse_count(input: &str) -> Option<i32> {
    input.trim().parse::<i32>().ok().filter(|count| *count >= 0)
}

/// Overwrites the slot for one status, leaving the other three untouched.
pub fn apply_count(mut tally: Tally, status: AttendanceStatus, count: i32) -> Tally {
    tally[status.slot()] = count;
    tally
}

/// Folds a period tally into the cumulative tally and resets the period.
/// Returns (new cumulative, zeroed period).
pub fn fold_period(attendance: Tally, cumulative: Tally) -> (Tally, Tally) {
    let mut folded = cumulative;
    for (total, period) in folded.iter_mut().zip(attendance) {
        *total += period;
    }
    (folded, [0; STATUS_SLOTS])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults_missing_to_zero() {
        assert_eq!(normalize(None), [0, 0, 0, 0]);
        assert_eq!(normalize(Some(vec![])), [0, 0, 0, 0]);
    }

    #[test]
    fn normalize_pads_short_and_clamps_negative() {
        assert_eq!(normalize(Some(vec![2, -1])), [2, 0, 0, 0]);
        assert_eq!(normalize(Some(vec![1, 2, 3, 4, 9])), [1, 2, 3, 4]);
    }

    #[test]
    fn parse_count_accepts_integers_only() {
        assert_eq!(parse_count("3"), Some(3));
        assert_eq!(parse_count(" 0 "), Some(0));
        assert_eq!(parse_count("three"), None);
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("2.5"), None);
        assert_eq!(parse_count("-1"), None);
    }

    #[test]
    fn apply_count_overwrites_one_slot() {
        let tally = apply_count([5, 1, 2, 3], AttendanceStatus::Late, 7);
        assert_eq!(tally, [5, 1, 2, 7]);

        // Overwrite, not accumulate.
        let tally = apply_count(tally, AttendanceStatus::Late, 2);
        assert_eq!(tally, [5, 1, 2, 2]);
    }

    #[test]
    fn fold_period_adds_and_resets() {
        let (cumulative, period) = fold_period([1, 0, 2, 0], [3, 4, 0, 1]);
        assert_eq!(cumulative, [4, 4, 2, 1]);
        assert_eq!(period, [0, 0, 0, 0]);
    }

    #[test]
    fn folding_twice_without_new_entries_changes_nothing() {
        let (cumulative, period) = fold_period([1, 0, 0, 0], [0, 0, 0, 0]);
        let (again, period) = fold_period(period, cumulative);
        assert_eq!(again, cumulative);
        assert_eq!(period, [0, 0, 0, 0]);
    }
}
