//! Recurrence resolution: does a task occur on a given calendar date?
//!
//! Two repeat schemas coexist in stored data for backward compatibility: the
//! legacy discrete options (`daily`, `weekend`, `custom`, ...) and the
//! parametric schema (`frequency` + `interval` + day sets). They are resolved
//! as independent arms behind a single detection predicate; when a rule
//! carries fields of both, the parametric arm wins. Everything here is a pure
//! function of (anchor, target, rule).

use chrono::{Datelike, NaiveDate};

use crate::dates::{days_between, is_weekend, month_offset, parse_date_key, week_offset, weekday_token};
use crate::fields::{Frequency, RepeatOption, Weekday};
use crate::task::{RepeatRule, Task};

/// Whether `task` is scheduled to appear on `target`.
///
/// A task always occurs on its own anchor date, rule or no rule. Outside the
/// anchor date, an absent or inert rule never occurs, and recurrence is never
/// retroactive (no occurrence strictly before the anchor).
pub fn occurs_on(task: &Task, target: NaiveDate) -> bool {
    if target == task.anchor_date {
        return true;
    }
    let rule = match &task.repeat {
        Some(r) if !r.is_inert() => r,
        _ => return false,
    };
    if target < task.anchor_date {
        return false;
    }
    if rule.is_parametric() {
        occurs_parametric(task.anchor_date, target, rule)
    } else {
        occurs_legacy(task.anchor_date, target, rule)
    }
}

/// Date-key variant of [`occurs_on`]; an unparseable key never occurs.
pub fn occurs_on_key(task: &Task, key: &str) -> bool {
    match parse_date_key(key) {
        Some(date) => occurs_on(task, date),
        None => false,
    }
}

/// True when the task repeats at all. Decides whether quantum progress is
/// kept per date or in the single global bucket.
pub fn recurs(task: &Task) -> bool {
    matches!(&task.repeat, Some(r) if !r.is_inert())
}

fn occurs_parametric(anchor: NaiveDate, target: NaiveDate, rule: &RepeatRule) -> bool {
    if let Some(end) = rule.end_date {
        if target > end {
            return false;
        }
    }
    // Missing interval means every period; zero or negative never occurs.
    let interval = rule.interval.unwrap_or(1);
    if interval <= 0 {
        return false;
    }
    match rule.frequency {
        Some(Frequency::Daily) => days_between(anchor, target) % interval == 0,
        Some(Frequency::Weekly) => {
            week_offset(anchor, target) % interval == 0
                && in_weekday_set(&rule.weekdays, weekday_token(target), weekday_token(anchor))
        }
        Some(Frequency::Monthly) => {
            month_offset(anchor, target) % interval == 0
                && in_month_day_set(&rule.month_days, target.day(), anchor.day())
        }
        _ => false,
    }
}

fn occurs_legacy(anchor: NaiveDate, target: NaiveDate, rule: &RepeatRule) -> bool {
    match rule.option {
        Some(RepeatOption::Daily) => true,
        Some(RepeatOption::Weekly) => weekday_token(target) == weekday_token(anchor),
        Some(RepeatOption::Monthly) => target.day() == anchor.day(),
        Some(RepeatOption::Weekend) => is_weekend(target),
        Some(RepeatOption::Weekdays) => !is_weekend(target),
        Some(RepeatOption::Custom) => rule.weekdays.contains(&weekday_token(target)),
        Some(RepeatOption::Interval) => match rule.interval {
            Some(n) if n > 0 => days_between(anchor, target) % n == 0,
            _ => false,
        },
        _ => false,
    }
}

/// Weekly day-set membership; an empty set means the anchor's own weekday.
fn in_weekday_set(set: &[Weekday], target: Weekday, anchor: Weekday) -> bool {
    if set.is_empty() {
        target == anchor
    } else {
        set.contains(&target)
    }
}

/// Monthly day-set membership; an empty set means the anchor's day-of-month.
fn in_month_day_set(set: &[u32], target: u32, anchor: u32) -> bool {
    if set.is_empty() {
        target == anchor
    } else {
        set.contains(&target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TaskKind;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(anchor: NaiveDate, repeat: Option<RepeatRule>) -> Task {
        Task {
            id: 1,
            title: "Morning run".into(),
            color: None,
            anchor_date: anchor,
            time: None,
            repeat,
            completed_dates: Default::default(),
            kind: TaskKind::Checkbox,
            quantum: None,
            subtasks: Vec::new(),
            tag: None,
            tag_label: None,
            created_at_utc: 0,
            updated_at_utc: 0,
        }
    }

    #[test]
    fn test_anchor_date_always_occurs() {
        let anchor = d(2024, 5, 6);
        // Even an explicitly disabled rule occurs on its own anchor day.
        let rule = RepeatRule {
            enabled: Some(false),
            frequency: Some(Frequency::Daily),
            ..Default::default()
        };
        assert!(occurs_on(&task(anchor, None), anchor));
        assert!(occurs_on(&task(anchor, Some(rule)), anchor));
    }

    #[test]
    fn test_no_rule_single_occurrence() {
        let t = task(d(2024, 5, 6), None);
        assert!(!occurs_on(&t, d(2024, 5, 7)));
        assert!(!occurs_on(&t, d(2024, 5, 5)));
    }

    #[test]
    fn test_no_retroactive_recurrence() {
        let rule = RepeatRule {
            option: Some(RepeatOption::Daily),
            ..Default::default()
        };
        let t = task(d(2024, 5, 6), Some(rule));
        assert!(!occurs_on(&t, d(2024, 5, 5)));
        assert!(occurs_on(&t, d(2024, 5, 7)));
    }

    #[test]
    fn test_legacy_options() {
        let anchor = d(2024, 5, 6); // Monday
        let with = |option| {
            task(
                anchor,
                Some(RepeatRule {
                    option: Some(option),
                    ..Default::default()
                }),
            )
        };

        assert!(occurs_on(&with(RepeatOption::Daily), d(2024, 5, 9)));
        assert!(occurs_on(&with(RepeatOption::Weekly), d(2024, 5, 13)));
        assert!(!occurs_on(&with(RepeatOption::Weekly), d(2024, 5, 14)));
        assert!(occurs_on(&with(RepeatOption::Monthly), d(2024, 6, 6)));
        assert!(!occurs_on(&with(RepeatOption::Monthly), d(2024, 6, 7)));
        assert!(occurs_on(&with(RepeatOption::Weekend), d(2024, 5, 11)));
        assert!(!occurs_on(&with(RepeatOption::Weekend), d(2024, 5, 10)));
        assert!(occurs_on(&with(RepeatOption::Weekdays), d(2024, 5, 10)));
        assert!(!occurs_on(&with(RepeatOption::Weekdays), d(2024, 5, 11)));
        assert!(!occurs_on(&with(RepeatOption::Off), d(2024, 5, 7)));
        assert!(!occurs_on(&with(RepeatOption::Unknown), d(2024, 5, 7)));
    }

    #[test]
    fn test_legacy_custom_weekdays() {
        let rule = RepeatRule {
            option: Some(RepeatOption::Custom),
            weekdays: vec![Weekday::Tue, Weekday::Thu],
            ..Default::default()
        };
        let t = task(d(2024, 5, 6), Some(rule));
        assert!(occurs_on(&t, d(2024, 5, 7))); // Tue
        assert!(!occurs_on(&t, d(2024, 5, 8))); // Wed
        assert!(occurs_on(&t, d(2024, 5, 9))); // Thu

        // Empty custom set never recurs.
        let empty = RepeatRule {
            option: Some(RepeatOption::Custom),
            ..Default::default()
        };
        assert!(!occurs_on(&task(d(2024, 5, 6), Some(empty)), d(2024, 5, 7)));
    }

    #[test]
    fn test_legacy_interval() {
        let rule = RepeatRule {
            option: Some(RepeatOption::Interval),
            interval: Some(3),
            ..Default::default()
        };
        let t = task(d(2024, 1, 1), Some(rule));
        assert!(occurs_on(&t, d(2024, 1, 4)));
        assert!(!occurs_on(&t, d(2024, 1, 5)));
        assert!(occurs_on(&t, d(2024, 1, 7)));

        let bad = RepeatRule {
            option: Some(RepeatOption::Interval),
            interval: Some(0),
            ..Default::default()
        };
        assert!(!occurs_on(&task(d(2024, 1, 1), Some(bad)), d(2024, 1, 2)));
    }

    #[test]
    fn test_parametric_daily_interval() {
        let rule = RepeatRule {
            enabled: Some(true),
            frequency: Some(Frequency::Daily),
            interval: Some(2),
            ..Default::default()
        };
        let t = task(d(2024, 1, 1), Some(rule));
        assert!(occurs_on(&t, d(2024, 1, 3)));
        assert!(!occurs_on(&t, d(2024, 1, 4)));
        assert!(occurs_on(&t, d(2024, 1, 5)));
    }

    #[test]
    fn test_parametric_weekly_parity_and_day_set() {
        // Anchor Monday 2024-05-06, every second week on Mon/Wed.
        let rule = RepeatRule {
            enabled: Some(true),
            frequency: Some(Frequency::Weekly),
            interval: Some(2),
            weekdays: vec![Weekday::Mon, Weekday::Wed],
            ..Default::default()
        };
        let t = task(d(2024, 5, 6), Some(rule));
        assert!(occurs_on(&t, d(2024, 5, 8))); // Wed, week 0
        assert!(!occurs_on(&t, d(2024, 5, 13))); // Mon, week 1: wrong parity
        assert!(occurs_on(&t, d(2024, 5, 20))); // Mon, week 2
    }

    #[test]
    fn test_parametric_weekly_defaults_to_anchor_weekday() {
        let rule = RepeatRule {
            frequency: Some(Frequency::Weekly),
            ..Default::default()
        };
        let t = task(d(2024, 5, 6), Some(rule)); // Monday
        assert!(occurs_on(&t, d(2024, 5, 13)));
        assert!(!occurs_on(&t, d(2024, 5, 14)));
    }

    #[test]
    fn test_parametric_monthly_day_default() {
        // Anchor on the 31st with no explicit month days: only months that
        // actually have a 31st qualify.
        let rule = RepeatRule {
            enabled: Some(true),
            frequency: Some(Frequency::Monthly),
            interval: Some(1),
            ..Default::default()
        };
        let t = task(d(2024, 1, 31), Some(rule));
        assert!(!occurs_on(&t, d(2024, 2, 29)));
        assert!(occurs_on(&t, d(2024, 3, 31)));
        assert!(!occurs_on(&t, d(2024, 4, 30)));
    }

    #[test]
    fn test_parametric_monthly_day_set_and_interval() {
        let rule = RepeatRule {
            enabled: Some(true),
            frequency: Some(Frequency::Monthly),
            interval: Some(2),
            month_days: vec![1, 15],
            ..Default::default()
        };
        let t = task(d(2024, 1, 1), Some(rule));
        assert!(occurs_on(&t, d(2024, 1, 15)));
        assert!(!occurs_on(&t, d(2024, 2, 15))); // wrong month parity
        assert!(occurs_on(&t, d(2024, 3, 1)));
        assert!(!occurs_on(&t, d(2024, 3, 2)));
    }

    #[test]
    fn test_parametric_end_date_inclusive() {
        let rule = RepeatRule {
            enabled: Some(true),
            frequency: Some(Frequency::Daily),
            end_date: Some(d(2024, 1, 10)),
            ..Default::default()
        };
        let t = task(d(2024, 1, 1), Some(rule));
        assert!(occurs_on(&t, d(2024, 1, 10)));
        assert!(!occurs_on(&t, d(2024, 1, 11)));
    }

    #[test]
    fn test_parametric_bad_interval_never_occurs() {
        let rule = RepeatRule {
            enabled: Some(true),
            frequency: Some(Frequency::Daily),
            interval: Some(-1),
            ..Default::default()
        };
        let t = task(d(2024, 1, 1), Some(rule));
        assert!(!occurs_on(&t, d(2024, 1, 2)));
        // But the anchor day itself still occurs.
        assert!(occurs_on(&t, d(2024, 1, 1)));
    }

    #[test]
    fn test_unknown_frequency_never_occurs() {
        let rule = RepeatRule {
            enabled: Some(true),
            frequency: Some(Frequency::Unknown),
            ..Default::default()
        };
        assert!(!occurs_on(&task(d(2024, 1, 1), Some(rule)), d(2024, 1, 2)));
    }

    #[test]
    fn test_occurs_on_key() {
        let rule = RepeatRule {
            option: Some(RepeatOption::Daily),
            ..Default::default()
        };
        let t = task(d(2024, 1, 1), Some(rule));
        assert!(occurs_on_key(&t, "2024-01-05"));
        assert!(!occurs_on_key(&t, "garbage"));
    }

    #[test]
    fn test_recurs_predicate() {
        assert!(!recurs(&task(d(2024, 1, 1), None)));
        let off = RepeatRule {
            option: Some(RepeatOption::Off),
            ..Default::default()
        };
        assert!(!recurs(&task(d(2024, 1, 1), Some(off))));
        let daily = RepeatRule {
            option: Some(RepeatOption::Daily),
            ..Default::default()
        };
        assert!(recurs(&task(d(2024, 1, 1), Some(daily))));
    }
}
