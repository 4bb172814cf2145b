/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/2/26
******************************************************************************/
use crate::error::AppError;
use crate::utils::cycle::CycleRunner;
use chrono::{Local, NaiveDateTime, NaiveTime};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

const MAX_SLEEP_CHUNK: Duration = Duration::from_secs(60);

/// Daily trigger times with drift-safe arming. Instead of string-comparing
/// the current minute on every tick, the schedule computes the next concrete
/// fire instant and re-arms after each fire, so a slow cycle or a coarse
/// tick can never skip or double a trigger.
#[derive(Debug)]
pub struct Schedule {
    triggers: Vec<NaiveTime>,
    armed: Option<NaiveDateTime>,
    last_fired: Option<NaiveDateTime>,
}

impl Schedule {
    /// Parses `HH:MM` trigger strings. An empty set is allowed and means
    /// the startup run is the only one.
    pub fn new(triggers: &[String]) -> Result<Self, AppError> {
        let mut parsed = Vec::with_capacity(triggers.len());
        for trigger in triggers {
            let time = NaiveTime::parse_from_str(trigger, "%H:%M").map_err(|_| {
                AppError::Config(format!("invalid trigger time '{}'", trigger))
            })?;
            parsed.push(time);
        }
        Ok(Self {
            triggers: parsed,
            armed: None,
            last_fired: None,
        })
    }

    /// Earliest trigger instant strictly after `now`.
    pub fn next_fire(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        self.triggers
            .iter()
            .filter_map(|trigger| {
                let today = now.date().and_time(*trigger);
                if today > now {
                    Some(today)
                } else {
                    now.date().succ_opt().map(|next| next.and_time(*trigger))
                }
            })
            .min()
    }

    /// Arms lazily and reports whether the armed instant has been reached.
    /// A reached instant fires at most once.
    pub fn poll(&mut self, now: NaiveDateTime) -> bool {
        let target = match self.armed {
            Some(target) => target,
            None => match self.next_fire(now) {
                Some(target) => {
                    self.armed = Some(target);
                    target
                }
                None => return false,
            },
        };

        if now < target {
            return false;
        }

        self.armed = None;
        if self.last_fired == Some(target) {
            return false;
        }
        self.last_fired = Some(target);
        true
    }

    fn armed_target(&self) -> Option<NaiveDateTime> {
        self.armed
    }
}

fn wall_clock() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Drives the publishing cycle: once at startup, then whenever the
/// schedule fires. Cycle failures are logged and never break the loop.
pub struct Scheduler<R: CycleRunner> {
    schedule: Schedule,
    runner: R,
    clock: fn() -> NaiveDateTime,
}

impl<R: CycleRunner> Scheduler<R> {
    pub fn new(schedule: Schedule, runner: R) -> Self {
        Self {
            schedule,
            runner,
            clock: wall_clock,
        }
    }

    #[cfg(test)]
    fn with_clock(schedule: Schedule, runner: R, clock: fn() -> NaiveDateTime) -> Self {
        Self {
            schedule,
            runner,
            clock,
        }
    }

    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        info!("Running startup cycle");
        self.fire().await;

        loop {
            let now = (self.clock)();
            if self.schedule.poll(now) {
                info!("Trigger time reached, starting scheduled cycle");
                self.fire().await;
                continue;
            }

            let chunk = self.sleep_chunk(now);
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received, stopping scheduler");
                    break;
                }
                _ = tokio::time::sleep(chunk) => {}
            }
        }
    }

    async fn fire(&mut self) {
        match self.runner.run_cycle().await {
            Ok(Some(url)) => info!("Cycle finished: {}", url),
            Ok(None) => info!("Cycle finished without a note"),
            Err(e) => error!("Cycle failed: {}", e),
        }
    }

    // Sleeps are re-derived from the wall clock each pass so suspend or
    // clock drift cannot push a trigger out indefinitely.
    fn sleep_chunk(&self, now: NaiveDateTime) -> Duration {
        match self.schedule.armed_target() {
            Some(target) => (target - now)
                .to_std()
                .map_or(Duration::ZERO, |remaining| remaining.min(MAX_SLEEP_CHUNK)),
            None => MAX_SLEEP_CHUNK,
        }
    }
}

#[cfg(test)]
mod tests_schedule {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn schedule(triggers: &[&str]) -> Schedule {
        let strings: Vec<String> = triggers.iter().map(|s| s.to_string()).collect();
        Schedule::new(&strings).unwrap()
    }

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 16)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn test_new_rejects_bad_trigger() {
        let result = Schedule::new(&["8am".to_string()]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_next_fire_later_today() {
        let schedule = schedule(&["20:00"]);
        assert_eq!(schedule.next_fire(at(8, 30, 0)), Some(at(20, 0, 0)));
    }

    #[test]
    fn test_next_fire_rolls_to_tomorrow() {
        let schedule = schedule(&["08:00"]);
        let next = schedule.next_fire(at(9, 0, 0)).unwrap();
        assert_eq!(
            next,
            NaiveDate::from_ymd_opt(2026, 2, 17)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_next_fire_is_strictly_after_now() {
        let schedule = schedule(&["08:00"]);
        let next = schedule.next_fire(at(8, 0, 0)).unwrap();
        assert_eq!(
            next,
            NaiveDate::from_ymd_opt(2026, 2, 17)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_next_fire_picks_earliest_trigger() {
        let schedule = schedule(&["20:00", "08:00"]);
        assert_eq!(schedule.next_fire(at(6, 0, 0)), Some(at(8, 0, 0)));
    }

    #[test]
    fn test_next_fire_empty_set() {
        let schedule = schedule(&[]);
        assert!(schedule.next_fire(at(6, 0, 0)).is_none());
    }

    #[test]
    fn test_poll_fires_exactly_once_around_a_trigger() {
        let mut schedule = schedule(&["08:00"]);
        let ticks = [
            at(7, 59, 50),
            at(8, 0, 0),
            at(8, 0, 10),
            at(8, 0, 20),
            at(8, 0, 30),
            at(8, 0, 40),
        ];

        let fires = ticks.iter().filter(|tick| schedule.poll(**tick)).count();
        assert_eq!(fires, 1);
    }

    #[test]
    fn test_poll_fires_again_next_day() {
        let mut schedule = schedule(&["08:00"]);
        assert!(!schedule.poll(at(7, 59, 0)));
        assert!(schedule.poll(at(8, 0, 5)));
        assert!(!schedule.poll(at(8, 0, 35)));

        let tomorrow = NaiveDate::from_ymd_opt(2026, 2, 17)
            .unwrap()
            .and_hms_opt(8, 0, 2)
            .unwrap();
        assert!(schedule.poll(tomorrow));
    }

    #[test]
    fn test_poll_catches_up_after_a_stall() {
        let mut schedule = schedule(&["08:00", "20:00"]);
        assert!(!schedule.poll(at(7, 0, 0)));
        // The process was stuck past the first trigger; it still fires once.
        assert!(schedule.poll(at(9, 30, 0)));
        assert!(!schedule.poll(at(9, 31, 0)));
    }

    #[test]
    fn test_poll_without_triggers_never_fires() {
        let mut schedule = schedule(&[]);
        assert!(!schedule.poll(at(8, 0, 0)));
        assert!(!schedule.poll(at(20, 0, 0)));
    }
}
