use chrono::{DateTime, Local};

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub urgent: bool,
    pub reached: bool,
}

impl Remaining {
    pub fn from_millis(remaining_ms: i64, urgent_threshold_ms: i64) -> Self {
        let urgent = remaining_ms < urgent_threshold_ms;
        if remaining_ms <= 0 {
            return Self {
                urgent,
                reached: true,
                ..Self::default()
            };
        }

        Self {
            days: remaining_ms / MS_PER_DAY,
            hours: (remaining_ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (remaining_ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (remaining_ms % MS_PER_MINUTE) / MS_PER_SECOND,
            urgent,
            reached: false,
        }
    }

    pub fn fields(&self) -> [String; 4] {
        [self.days, self.hours, self.minutes, self.seconds].map(|v| format!("{:02}", v))
    }
}

pub struct Countdown {
    target: DateTime<Local>,
    urgent_threshold_ms: i64,
    latest: Remaining,
}

impl Countdown {
    pub fn new(target: DateTime<Local>, urgent_threshold_ms: i64) -> Self {
        Self {
            target,
            urgent_threshold_ms,
            latest: Remaining::default(),
        }
    }

    pub fn target(&self) -> DateTime<Local> {
        self.target
    }

    pub fn set_target(&mut self, target: DateTime<Local>) {
        log::info!("Countdown target set to {}", target.to_rfc3339());
        self.target = target;
    }

    pub fn remaining_ms(&self, now: DateTime<Local>) -> i64 {
        (self.target - now).num_milliseconds()
    }

    pub fn tick(&mut self, now: DateTime<Local>) -> Remaining {
        self.latest = Remaining::from_millis(self.remaining_ms(now), self.urgent_threshold_ms);
        self.latest
    }

    pub fn latest(&self) -> Remaining {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).earliest().unwrap()
    }

    #[test]
    fn decomposes_by_floor_division() {
        let r = Remaining::from_millis(90_061_001, 60_000);
        assert_eq!((r.days, r.hours, r.minutes, r.seconds), (1, 1, 1, 1));
        assert!(!r.reached);
        assert_eq!(r.fields(), ["01", "01", "01", "01"]);
    }

    #[test]
    fn urgent_below_one_minute() {
        assert!(Remaining::from_millis(59_999, 60_000).urgent);
        assert!(!Remaining::from_millis(60_000, 60_000).urgent);
    }

    #[test]
    fn clamps_to_zero_once_reached() {
        for ms in [0, -1, -86_400_000] {
            let r = Remaining::from_millis(ms, 60_000);
            assert!(r.reached);
            assert_eq!(r.fields(), ["00", "00", "00", "00"]);
        }
    }

    #[test]
    fn wide_day_counts_are_not_truncated() {
        let r = Remaining::from_millis(123 * MS_PER_DAY + 5 * MS_PER_SECOND, 60_000);
        assert_eq!(r.fields(), ["123", "00", "00", "05"]);
    }

    #[test]
    fn ticks_against_the_target() {
        let target = at(2031, 1, 1, 0, 0, 0);
        let mut countdown = Countdown::new(target, 60_000);

        let r = countdown.tick(target - Duration::milliseconds(90_061_001));
        assert_eq!((r.days, r.hours, r.minutes, r.seconds), (1, 1, 1, 1));
        assert_eq!(countdown.latest(), r);

        let r = countdown.tick(target - Duration::seconds(30));
        assert!(r.urgent);
        assert_eq!(r.seconds, 30);

        assert!(countdown.tick(target).reached);
        assert!(countdown.tick(target + Duration::hours(1)).reached);
    }

    #[test]
    fn replacing_the_target_takes_effect_next_tick() {
        let now = at(2030, 6, 1, 12, 0, 0);
        let mut countdown = Countdown::new(now - Duration::seconds(1), 60_000);
        assert!(countdown.tick(now).reached);

        countdown.set_target(now + Duration::days(2));
        let r = countdown.tick(now);
        assert!(!r.reached);
        assert_eq!(r.days, 2);
    }
}
