//! Date-range rules for foster assignments of a single pet.
//!
//! Intervals are half-open, `[start, end)`, and an open-ended assignment runs
//! forever. A pet may hold any number of bounded assignments plus at most one
//! open-ended one, and none of them may overlap.

use chrono::{Days, NaiveDate};
use thiserror::Error;

use crate::domain::foster::Foster;
use crate::domain::types::{FosterId, PetId};

/// Shortest accepted bounded assignment.
pub const MIN_FOSTER_DAYS: u64 = 14;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FosterIntervalError {
    #[error("End Date must be greater than Start Date.")]
    EndNotAfterStart,
    #[error("Foster period must be at least 14 Days.")]
    PeriodTooShort,
    #[error("(Open-ended Foster) Conflicting Foster interval for the same Pet.")]
    OpenEndedConflict,
    #[error("Conflicting Foster interval for the same Pet.")]
    Overlap,
}

/// Assignment about to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FosterCandidate {
    pub pet_id: PetId,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Set when editing, so the row does not conflict with itself.
    pub exclude_id: Option<FosterId>,
}

/// Checks `candidate` against the assignments already stored for its pet.
///
/// Rules run in order and the first violation is returned. Rows for other
/// pets and the row named by `exclude_id` are ignored.
pub fn validate_foster_interval(
    candidate: &FosterCandidate,
    existing: &[Foster],
) -> Result<(), FosterIntervalError> {
    if let Some(end) = candidate.end_date {
        if end <= candidate.start_date {
            return Err(FosterIntervalError::EndNotAfterStart);
        }
        let shortest_end = candidate
            .start_date
            .checked_add_days(Days::new(MIN_FOSTER_DAYS))
            .unwrap_or(NaiveDate::MAX);
        if end < shortest_end {
            return Err(FosterIntervalError::PeriodTooShort);
        }
    }

    let others: Vec<&Foster> = existing
        .iter()
        .filter(|foster| foster.pet_id == Some(candidate.pet_id))
        .filter(|foster| Some(foster.id) != candidate.exclude_id)
        .collect();

    let open_conflict = others.iter().any(|foster| {
        foster.end_date.is_none()
            && candidate
                .end_date
                .is_none_or(|end| foster.start_date < end)
    });
    if open_conflict {
        return Err(FosterIntervalError::OpenEndedConflict);
    }

    match candidate.end_date {
        None => {
            let runs_past_start = others
                .iter()
                .any(|foster| foster.end_date.is_some_and(|end| end > candidate.start_date));
            if runs_past_start {
                return Err(FosterIntervalError::OpenEndedConflict);
            }
        }
        Some(end) => {
            let overlaps = others.iter().any(|foster| {
                foster
                    .end_date
                    .is_some_and(|other_end| other_end > candidate.start_date)
                    && foster.start_date < end
            });
            if overlaps {
                return Err(FosterIntervalError::Overlap);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        value.parse().unwrap()
    }

    fn pet() -> PetId {
        PetId::new(7).unwrap()
    }

    fn candidate(start: &str, end: Option<&str>) -> FosterCandidate {
        FosterCandidate {
            pet_id: pet(),
            start_date: date(start),
            end_date: end.map(date),
            exclude_id: None,
        }
    }

    fn stored(id: i32, start: &str, end: Option<&str>) -> Foster {
        Foster {
            id: FosterId::new(id).unwrap(),
            client_id: None,
            pet_id: Some(pet()),
            description: None,
            start_date: date(start),
            end_date: end.map(date),
            version: 1,
        }
    }

    #[test]
    fn rejects_short_period() {
        let result = validate_foster_interval(&candidate("2024-01-01", Some("2024-01-10")), &[]);
        assert_eq!(result, Err(FosterIntervalError::PeriodTooShort));
    }

    #[test]
    fn accepts_long_enough_period() {
        let result = validate_foster_interval(&candidate("2024-01-01", Some("2024-01-20")), &[]);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn exactly_fourteen_days_is_enough() {
        let result = validate_foster_interval(&candidate("2024-01-01", Some("2024-01-15")), &[]);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn rejects_end_not_after_start() {
        assert_eq!(
            validate_foster_interval(&candidate("2024-01-10", Some("2024-01-10")), &[]),
            Err(FosterIntervalError::EndNotAfterStart)
        );
        assert_eq!(
            validate_foster_interval(&candidate("2024-01-10", Some("2024-01-01")), &[]),
            Err(FosterIntervalError::EndNotAfterStart)
        );
    }

    #[test]
    fn rejects_second_open_ended() {
        let existing = [stored(1, "2024-01-01", None)];
        let result = validate_foster_interval(&candidate("2024-02-01", None), &existing);
        assert_eq!(result, Err(FosterIntervalError::OpenEndedConflict));
    }

    #[test]
    fn rejects_bounded_reaching_into_open_ended() {
        let existing = [stored(1, "2024-03-01", None)];
        let result =
            validate_foster_interval(&candidate("2024-02-01", Some("2024-03-02")), &existing);
        assert_eq!(result, Err(FosterIntervalError::OpenEndedConflict));
    }

    #[test]
    fn accepts_bounded_before_open_ended() {
        let existing = [stored(1, "2024-03-01", None)];
        let result =
            validate_foster_interval(&candidate("2024-02-01", Some("2024-03-01")), &existing);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn rejects_open_ended_starting_inside_bounded() {
        let existing = [stored(1, "2024-01-01", Some("2024-02-01"))];
        let result = validate_foster_interval(&candidate("2024-01-15", None), &existing);
        assert_eq!(result, Err(FosterIntervalError::OpenEndedConflict));
    }

    #[test]
    fn accepts_open_ended_after_bounded() {
        let existing = [stored(1, "2024-01-01", Some("2024-02-01"))];
        let result = validate_foster_interval(&candidate("2024-02-01", None), &existing);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn rejects_overlapping_bounded() {
        let existing = [stored(1, "2024-01-01", Some("2024-01-20"))];
        let result =
            validate_foster_interval(&candidate("2024-01-15", Some("2024-02-01")), &existing);
        assert_eq!(result, Err(FosterIntervalError::Overlap));
    }

    #[test]
    fn accepts_touching_bounded() {
        let existing = [stored(1, "2024-01-01", Some("2024-01-20"))];
        let result =
            validate_foster_interval(&candidate("2024-01-20", Some("2024-02-10")), &existing);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn ignores_excluded_row_and_other_pets() {
        let mut other_pet = stored(2, "2024-01-01", None);
        other_pet.pet_id = Some(PetId::new(99).unwrap());
        let existing = [stored(1, "2024-01-01", None), other_pet];

        let mut edit = candidate("2024-01-05", None);
        edit.exclude_id = Some(FosterId::new(1).unwrap());

        assert_eq!(validate_foster_interval(&edit, &existing), Ok(()));
    }

    #[test]
    fn first_failing_rule_wins() {
        let existing = [stored(1, "2024-01-01", None)];
        let result =
            validate_foster_interval(&candidate("2024-02-01", Some("2024-02-05")), &existing);
        assert_eq!(result, Err(FosterIntervalError::PeriodTooShort));
    }
}
