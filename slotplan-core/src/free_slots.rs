//! Free-interval computation for a calendar day.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::constraints::Constraints;
use crate::pinned::Reservation;
use crate::slot::OccupiedSlot;
use crate::time::{Interval, MIN_BLOCK_HOURS, duration_hours, subtract_interval};

/// Remaining free intervals per working day of the horizon.
pub type FreeMap = BTreeMap<NaiveDate, Vec<Interval>>;

/// Working window minus lunch, occupied slots and pinned reservations on `date`.
///
/// Only intervals of at least [`MIN_BLOCK_HOURS`] survive. Order follows the
/// subtraction passes and is not guaranteed to be chronological.
pub fn free_intervals(
    date: NaiveDate,
    constraints: &Constraints,
    occupied: &[OccupiedSlot],
    reservations: &[Reservation],
) -> Vec<Interval> {
    let mut slots = vec![constraints.working_window()];

    if let Some((lunch_start, lunch_end)) = constraints.lunch_window() {
        slots = subtract_interval(&slots, lunch_start, lunch_end);
    }

    for occ in occupied.iter().filter(|o| o.date == date) {
        slots = subtract_interval(&slots, occ.start_time, occ.end_time);
    }

    for r in reservations.iter().filter(|r| r.date == date) {
        slots = subtract_interval(&slots, r.start, r.end);
    }

    slots
        .into_iter()
        .filter(|&(s, e)| duration_hours(s, e) >= MIN_BLOCK_HOURS)
        .collect()
}

/// Free intervals for every working day in `today ..= today + horizon_days`.
/// Days with nothing left are omitted.
pub fn free_map(
    today: NaiveDate,
    horizon_days: u32,
    constraints: &Constraints,
    occupied: &[OccupiedSlot],
    reservations: &[Reservation],
) -> FreeMap {
    let mut map = FreeMap::new();
    for offset in 0..=u64::from(horizon_days) {
        let Some(day) = today.checked_add_days(Days::new(offset)) else {
            break;
        };
        if !constraints.is_working_day(day) {
            continue;
        }
        let slots = free_intervals(day, constraints, occupied, reservations);
        if !slots.is_empty() {
            map.insert(day, slots);
        }
    }
    map
}

/// Total free hours left on days up to and including `deadline`.
pub fn free_hours_until(free: &FreeMap, deadline: NaiveDate) -> f64 {
    free.range(..=deadline)
        .flat_map(|(_, slots)| slots.iter())
        .map(|&(s, e)| duration_hours(s, e))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotCategory;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn lunch_splits_the_day() {
        let c = Constraints::default();
        let slots = free_intervals(monday(), &c, &[], &[]);
        assert_eq!(slots, vec![(t(8, 0), t(12, 0)), (t(13, 0), t(22, 0))]);
    }

    #[test]
    fn occupied_and_reserved_time_is_removed() {
        let c = Constraints {
            lunch_break: false,
            ..Default::default()
        };
        let occ = vec![
            OccupiedSlot::new(monday(), t(9, 0), t(11, 0), SlotCategory::Course, "Maths").unwrap(),
            // other day, ignored
            OccupiedSlot::new(
                monday().succ_opt().unwrap(),
                t(8, 0),
                t(22, 0),
                SlotCategory::Work,
                "",
            )
            .unwrap(),
        ];
        let pins = vec![Reservation {
            date: monday(),
            start: t(14, 0),
            end: t(15, 0),
            title: "Dentist".into(),
        }];
        let slots = free_intervals(monday(), &c, &occ, &pins);
        assert_eq!(
            slots,
            vec![(t(8, 0), t(9, 0)), (t(11, 0), t(14, 0)), (t(15, 0), t(22, 0))]
        );
    }

    #[test]
    fn short_leftovers_are_dropped() {
        let c = Constraints {
            lunch_break: false,
            ..Default::default()
        };
        let occ =
            vec![OccupiedSlot::new(monday(), t(8, 20), t(21, 40), SlotCategory::Work, "").unwrap()];
        assert!(free_intervals(monday(), &c, &occ, &[]).is_empty());
    }

    #[test]
    fn map_skips_sundays_and_respects_horizon() {
        let c = Constraints::default();
        // Saturday 2026-03-07 + 2 days: Sat, Sun (off), Mon
        let sat = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let map = free_map(sat, 2, &c, &[], &[]);
        let days: Vec<_> = map.keys().copied().collect();
        assert_eq!(
            days,
            vec![sat, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()]
        );
        assert_eq!(free_hours_until(&map, sat), 13.0);
        assert_eq!(free_hours_until(&map, sat.pred_opt().unwrap()), 0.0);
    }
}
