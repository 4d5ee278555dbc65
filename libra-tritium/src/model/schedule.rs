use thiserror::Error;
use uom::{
    ConstZero,
    si::{f64::Time, time::second},
};

/// A period during which the neutron source is on.
///
/// The period is open: the source is off at exactly `start` and `stop`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Irradiation {
    start: Time,
    stop: Time,
}

/// Error returned for an invalid [`Irradiation`] or [`IrradiationSchedule`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("irradiation must stop after it starts: start = {start_s} s, stop = {stop_s} s")]
    EmptyIrradiation { start_s: f64, stop_s: f64 },

    #[error("irradiation bounds must be finite: start = {start_s} s, stop = {stop_s} s")]
    NonFinite { start_s: f64, stop_s: f64 },

    #[error("irradiation cannot start before time zero: start = {start_s} s")]
    NegativeStart { start_s: f64 },

    #[error(
        "irradiation {index} starts at {start_s} s, before the previous one stops at {previous_stop_s} s"
    )]
    OutOfOrder {
        index: usize,
        start_s: f64,
        previous_stop_s: f64,
    },
}

impl Irradiation {
    /// Creates an irradiation from `start` to `stop`.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] if either bound is not finite, if `start`
    /// is negative, or if `start >= stop`.
    pub fn new(start: Time, stop: Time) -> Result<Self, ScheduleError> {
        let irradiation = Self { start, stop };
        irradiation.validate()?;
        Ok(irradiation)
    }

    #[must_use]
    pub fn start(&self) -> Time {
        self.start
    }

    #[must_use]
    pub fn stop(&self) -> Time {
        self.stop
    }

    #[must_use]
    pub fn duration(&self) -> Time {
        self.stop - self.start
    }

    /// Returns `true` if `time` lies strictly between `start` and `stop`.
    #[must_use]
    pub fn contains(&self, time: Time) -> bool {
        self.start < time && time < self.stop
    }

    fn validate(&self) -> Result<(), ScheduleError> {
        let start_s = self.start.get::<second>();
        let stop_s = self.stop.get::<second>();

        if !start_s.is_finite() || !stop_s.is_finite() {
            return Err(ScheduleError::NonFinite { start_s, stop_s });
        }
        if start_s < 0.0 {
            return Err(ScheduleError::NegativeStart { start_s });
        }
        if start_s >= stop_s {
            return Err(ScheduleError::EmptyIrradiation { start_s, stop_s });
        }
        Ok(())
    }
}

/// Irradiations in chronological order.
///
/// The schedule keeps the caller's order and rejects any irradiation that
/// starts before the previous one stops. Back-to-back irradiations, where one
/// starts exactly when the previous one stops, are allowed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IrradiationSchedule {
    irradiations: Vec<Irradiation>,
}

/// A span of the simulated horizon with a constant source state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: Time,
    pub stop: Time,
    pub irradiating: bool,
}

impl IrradiationSchedule {
    /// Creates a schedule from irradiations given in chronological order.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] if any irradiation is invalid, or if one
    /// starts before its predecessor stops.
    pub fn new<I>(irradiations: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = Irradiation>,
    {
        let mut schedule = Self::default();
        for irradiation in irradiations {
            schedule.try_push(irradiation)?;
        }
        Ok(schedule)
    }

    /// Appends an irradiation to the end of the schedule.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] if the irradiation is invalid or starts
    /// before the last scheduled irradiation stops.
    pub fn try_push(&mut self, irradiation: Irradiation) -> Result<(), ScheduleError> {
        irradiation.validate()?;

        if let Some(previous) = self.irradiations.last() {
            if irradiation.start < previous.stop {
                return Err(ScheduleError::OutOfOrder {
                    index: self.irradiations.len(),
                    start_s: irradiation.start.get::<second>(),
                    previous_stop_s: previous.stop.get::<second>(),
                });
            }
        }

        self.irradiations.push(irradiation);
        Ok(())
    }

    #[must_use]
    pub fn irradiations(&self) -> &[Irradiation] {
        &self.irradiations
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.irradiations.is_empty()
    }

    /// Returns `true` if any irradiation strictly contains `time`.
    #[must_use]
    pub fn is_active(&self, time: Time) -> bool {
        self.irradiations.iter().any(|irr| irr.contains(time))
    }

    /// Splits `[0, t_final]` at every irradiation boundary.
    ///
    /// Idle gaps are emitted before each irradiation when non-empty, and after
    /// the last one if it stops before `t_final`. An irradiation spanning
    /// `t_final` is cut there, and nothing at or after `t_final` is emitted.
    #[must_use]
    pub fn intervals(&self, t_final: Time) -> Vec<Interval> {
        let mut intervals = Vec::with_capacity(2 * self.irradiations.len() + 1);
        let mut previous_stop = Time::ZERO;

        for irradiation in &self.irradiations {
            if previous_stop >= t_final {
                break;
            }
            if irradiation.start > previous_stop {
                intervals.push(Interval {
                    start: previous_stop,
                    stop: earlier(irradiation.start, t_final),
                    irradiating: false,
                });
            }
            if irradiation.start >= t_final {
                previous_stop = t_final;
                break;
            }
            let stop = earlier(irradiation.stop, t_final);
            intervals.push(Interval {
                start: irradiation.start,
                stop,
                irradiating: true,
            });
            previous_stop = stop;
        }

        if previous_stop < t_final {
            intervals.push(Interval {
                start: previous_stop,
                stop: t_final,
                irradiating: false,
            });
        }

        intervals
    }
}

fn earlier(a: Time, b: Time) -> Time {
    if a < b { a } else { b }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::time::hour;

    fn hours(value: f64) -> Time {
        Time::new::<hour>(value)
    }

    fn irradiation(start: f64, stop: f64) -> Irradiation {
        Irradiation::new(hours(start), hours(stop)).unwrap()
    }

    fn spans(intervals: &[Interval]) -> Vec<(f64, f64, bool)> {
        intervals
            .iter()
            .map(|i| (i.start.get::<hour>(), i.stop.get::<hour>(), i.irradiating))
            .collect()
    }

    #[test]
    fn boundaries_are_outside_an_irradiation() {
        let irr = irradiation(1.0, 2.0);

        assert!(!irr.contains(hours(1.0)));
        assert!(irr.contains(hours(1.5)));
        assert!(!irr.contains(hours(2.0)));
        assert_eq!(irr.duration(), hours(1.0));
    }

    #[test]
    fn rejects_invalid_irradiations() {
        assert!(matches!(
            Irradiation::new(hours(2.0), hours(2.0)),
            Err(ScheduleError::EmptyIrradiation { .. })
        ));
        assert!(matches!(
            Irradiation::new(hours(-1.0), hours(2.0)),
            Err(ScheduleError::NegativeStart { .. })
        ));
        assert!(matches!(
            Irradiation::new(hours(0.0), hours(f64::INFINITY)),
            Err(ScheduleError::NonFinite { .. })
        ));
    }

    #[test]
    fn rejects_out_of_order_and_overlapping_schedules() {
        let out_of_order = IrradiationSchedule::new([irradiation(5.0, 6.0), irradiation(1.0, 2.0)]);
        assert!(matches!(
            out_of_order,
            Err(ScheduleError::OutOfOrder { index: 1, .. })
        ));

        let overlapping = IrradiationSchedule::new([irradiation(1.0, 3.0), irradiation(2.0, 4.0)]);
        assert!(matches!(
            overlapping,
            Err(ScheduleError::OutOfOrder { index: 1, .. })
        ));

        let back_to_back = IrradiationSchedule::new([irradiation(1.0, 2.0), irradiation(2.0, 3.0)]);
        assert!(back_to_back.is_ok());
    }

    #[test]
    fn partitions_with_gaps_between_irradiations() {
        let schedule =
            IrradiationSchedule::new([irradiation(1.0, 13.0), irradiation(25.0, 37.0)]).unwrap();

        assert_eq!(
            spans(&schedule.intervals(hours(48.0))),
            vec![
                (0.0, 1.0, false),
                (1.0, 13.0, true),
                (13.0, 25.0, false),
                (25.0, 37.0, true),
                (37.0, 48.0, false),
            ]
        );
    }

    #[test]
    fn partitions_without_leading_or_trailing_gaps() {
        let schedule =
            IrradiationSchedule::new([irradiation(0.0, 2.0), irradiation(2.0, 5.0)]).unwrap();

        assert_eq!(
            spans(&schedule.intervals(hours(5.0))),
            vec![(0.0, 2.0, true), (2.0, 5.0, true)]
        );
    }

    #[test]
    fn partitions_stop_at_the_final_time() {
        let schedule = IrradiationSchedule::new([
            irradiation(0.0, 2.0),
            irradiation(3.0, 6.0),
            irradiation(100.0, 200.0),
        ])
        .unwrap();

        assert_eq!(
            spans(&schedule.intervals(hours(4.0))),
            vec![(0.0, 2.0, true), (2.0, 3.0, false), (3.0, 4.0, true)]
        );
        assert_eq!(
            spans(&schedule.intervals(hours(10.0))),
            vec![
                (0.0, 2.0, true),
                (2.0, 3.0, false),
                (3.0, 6.0, true),
                (6.0, 10.0, false),
            ]
        );
        assert_eq!(
            spans(&schedule.intervals(hours(3.0))),
            vec![(0.0, 2.0, true), (2.0, 3.0, false)]
        );
    }

    #[test]
    fn empty_schedule_is_one_idle_interval() {
        let schedule = IrradiationSchedule::default();

        assert!(schedule.is_empty());
        assert!(!schedule.is_active(hours(1.0)));
        assert_eq!(
            spans(&schedule.intervals(hours(10.0))),
            vec![(0.0, 10.0, false)]
        );
    }
}
