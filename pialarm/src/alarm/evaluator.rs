//! Trigger evaluator.
//!
//! Pure function deciding which alarms are eligible to start ringing on a
//! given tick. The match is minute-exact rather than a range, so a tick
//! anywhere inside the target minute fires the alarm exactly once (the
//! session marks `last_fired_date` for the winner, which removes it from
//! subsequent evaluations that day). The host must tick at least once per
//! minute or fires can be missed; that constraint is on the ticker, not
//! handled here.

use time::OffsetDateTime;

use super::{AlarmDefinition, AlarmId, Weekday};

/// Return the ids of all alarms eligible to fire at `now`, sorted
/// ascending so the lowest id wins the session tie-break.
///
/// An alarm is eligible iff it is enabled, `now`'s weekday is in its
/// `days_of_week`, `now`'s hour:minute equals its trigger time, and it
/// has not already fired today.
pub fn evaluate(now: OffsetDateTime, alarms: &[AlarmDefinition]) -> Vec<AlarmId> {
    let weekday = Weekday::from(now.weekday());
    let today = now.date();

    let mut eligible: Vec<AlarmId> = alarms
        .iter()
        .filter(|alarm| alarm.enabled)
        .filter(|alarm| alarm.days_of_week.contains(&weekday))
        .filter(|alarm| {
            alarm.time_of_day.hour == now.hour() && alarm.time_of_day.minute == now.minute()
        })
        .filter(|alarm| alarm.last_fired_date != Some(today))
        .map(|alarm| alarm.id)
        .collect();

    eligible.sort_unstable();
    eligible
}

#[cfg(test)]
mod tests {
    use test_case::test_case;
    use time::macros::datetime;

    use super::*;
    use crate::alarm::TimeOfDay;

    fn alarm(id: u64, hour: u8, minute: u8, days: Vec<Weekday>) -> AlarmDefinition {
        AlarmDefinition {
            id: AlarmId(id),
            label: String::new(),
            time_of_day: TimeOfDay { hour, minute },
            days_of_week: days,
            enabled: true,
            sound_reference: "chime.mp3".into(),
            last_fired_date: None,
        }
    }

    // 2026-08-24 is a Monday.
    const MONDAY_0700: OffsetDateTime = datetime!(2026-08-24 07:00:00 UTC);

    #[test]
    fn matches_enabled_alarm_at_exact_minute() {
        let alarms = vec![alarm(1, 7, 0, vec![Weekday::Mon])];
        assert_eq!(evaluate(MONDAY_0700, &alarms), vec![AlarmId(1)]);
    }

    #[test]
    fn matches_anywhere_inside_the_minute() {
        let alarms = vec![alarm(1, 7, 0, vec![Weekday::Mon])];
        let now = datetime!(2026-08-24 07:00:30 UTC);
        assert_eq!(evaluate(now, &alarms), vec![AlarmId(1)]);
    }

    #[test_case(datetime!(2026-08-24 06:59:59 UTC); "minute before")]
    #[test_case(datetime!(2026-08-24 07:01:00 UTC); "minute after")]
    #[test_case(datetime!(2026-08-25 07:00:00 UTC); "wrong weekday")]
    fn does_not_match_outside_target(now: OffsetDateTime) {
        let alarms = vec![alarm(1, 7, 0, vec![Weekday::Mon])];
        assert!(evaluate(now, &alarms).is_empty());
    }

    #[test]
    fn skips_disabled_alarms() {
        let mut a = alarm(1, 7, 0, vec![Weekday::Mon]);
        a.enabled = false;
        assert!(evaluate(MONDAY_0700, &[a]).is_empty());
    }

    #[test]
    fn empty_days_never_fires() {
        let alarms = vec![alarm(1, 7, 0, vec![])];
        assert!(evaluate(MONDAY_0700, &alarms).is_empty());
    }

    #[test]
    fn already_fired_today_is_excluded() {
        let mut a = alarm(1, 7, 0, vec![Weekday::Mon]);
        a.last_fired_date = Some(MONDAY_0700.date());
        assert!(evaluate(MONDAY_0700, &[a]).is_empty());
    }

    #[test]
    fn fired_yesterday_is_eligible_again() {
        let mut a = alarm(1, 7, 0, vec![Weekday::Mon]);
        a.last_fired_date = Some(datetime!(2026-08-17 07:00:00 UTC).date());
        assert_eq!(evaluate(MONDAY_0700, &[a]), vec![AlarmId(1)]);
    }

    #[test]
    fn same_minute_collision_returns_all_sorted_by_id() {
        let alarms = vec![
            alarm(9, 7, 0, vec![Weekday::Mon]),
            alarm(2, 7, 0, vec![Weekday::Mon]),
            alarm(5, 7, 0, vec![Weekday::Mon]),
        ];
        assert_eq!(
            evaluate(MONDAY_0700, &alarms),
            vec![AlarmId(2), AlarmId(5), AlarmId(9)]
        );
    }
}
