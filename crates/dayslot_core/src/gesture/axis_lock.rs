//! Axis lock and snap state machine.
//!
//! # Responsibility
//! - Decide whether a drag is captured by vertical reorder or horizontal
//!   swipe/day-change movement.
//! - Produce the visual translation offset for every pointer tick.
//! - Settle offsets back to zero on release and signal completion.
//!
//! # Invariants
//! - The first axis to cross its threshold wins; the other axis offset is
//!   forced to zero until the drag re-snaps.
//! - `Locked(Vertical)` returns to `Snapped` only when |dy| falls within the
//!   vertical snap threshold; `Locked(Horizontal)` only when |dx| falls
//!   within the horizontal snap threshold.
//! - After `release()` pointer updates are ignored; `Settled` is reached
//!   exactly once.

use crate::config::DragConfig;
use crate::gesture::spring::Spring2;
use crate::model::drag::{Axis, AxisPhase, Point};
use std::time::{Duration, Instant};

/// Phase change observed during an update, used for haptics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisTransition {
    Broke(Axis),
    Locked(Axis),
    Resnapped,
    Settled,
}

#[derive(Debug, Clone, Copy)]
struct AxisThresholds {
    vertical_snap: f64,
    horizontal_break: f64,
    horizontal_snap: f64,
    snap_band: f64,
    snap_resistance: f64,
    break_duration: Duration,
    stiffness: f64,
    damping: f64,
}

/// Axis lock machine for one drag session.
#[derive(Debug, Clone)]
pub struct AxisLock {
    thresholds: AxisThresholds,
    phase: AxisPhase,
    raw: Point,
    offset: Point,
    break_started_at: Option<Instant>,
    last_tick: Option<Instant>,
    /// Animates offsets back into the snap band after a re-snap.
    resnap: Option<Spring2>,
    settle: Option<Spring2>,
}

impl AxisLock {
    pub fn new(config: &DragConfig) -> Self {
        Self {
            thresholds: AxisThresholds {
                vertical_snap: config.vertical_snap_threshold,
                horizontal_break: config.horizontal_break_threshold,
                horizontal_snap: config.horizontal_snap_threshold,
                snap_band: config.snap_band,
                snap_resistance: config.snap_resistance,
                break_duration: config.break_duration,
                stiffness: config.spring_stiffness,
                damping: config.spring_damping,
            },
            phase: AxisPhase::Snapped,
            raw: Point::ZERO,
            offset: Point::ZERO,
            break_started_at: None,
            last_tick: None,
            resnap: None,
            settle: None,
        }
    }

    pub fn phase(&self) -> AxisPhase {
        self.phase
    }

    /// Visual translation after axis locking.
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Whether |dy| is outside the vertical snap band while captured vertically.
    pub fn is_vertical_free(&self) -> bool {
        self.phase.axis() == Some(Axis::Vertical)
            && self.raw.y.abs() > self.thresholds.vertical_snap
    }

    /// Feeds one raw pointer delta from the gesture context.
    pub fn update(&mut self, raw: Point, now: Instant) -> Option<AxisTransition> {
        if self.phase.is_released() {
            return None;
        }
        self.raw = raw;
        let t = self.thresholds;
        let ax = raw.x.abs();
        let ay = raw.y.abs();

        let mut transition = match self.phase {
            AxisPhase::Snapped => {
                if ay > t.vertical_snap && ax < t.horizontal_break {
                    self.begin_break(Axis::Vertical, now)
                } else if ax > t.horizontal_break && ay <= t.vertical_snap {
                    self.begin_break(Axis::Horizontal, now)
                } else {
                    None
                }
            }
            AxisPhase::Breaking(Axis::Vertical) | AxisPhase::Locked(Axis::Vertical) => {
                (ay <= t.vertical_snap).then(|| self.resnap_to_origin())
            }
            AxisPhase::Breaking(Axis::Horizontal) | AxisPhase::Locked(Axis::Horizontal) => {
                (ax <= t.horizontal_snap).then(|| self.resnap_to_origin())
            }
            AxisPhase::Settling | AxisPhase::Settled => None,
        };

        let locked = self.complete_break(now);
        transition = transition.or(locked);
        self.tick_springs(now);
        self.offset = self.compute_offset(now);
        transition
    }

    /// Application-frame pump: finishes breaks, animates re-snap and settle.
    pub fn advance(&mut self, now: Instant) -> Option<AxisTransition> {
        if self.phase == AxisPhase::Settled {
            return None;
        }
        let locked = self.complete_break(now);
        self.tick_springs(now);

        if self.phase == AxisPhase::Settling {
            let at_rest = self.settle.as_ref().map_or(true, Spring2::is_at_rest);
            if at_rest {
                return Some(self.finish_settle());
            }
            return None;
        }

        self.offset = self.compute_offset(now);
        locked
    }

    /// Starts the release settle toward zero on both axes.
    pub fn release(&mut self, now: Instant) -> Option<AxisTransition> {
        if self.phase.is_released() {
            return None;
        }
        self.phase = AxisPhase::Settling;
        self.resnap = None;
        self.break_started_at = None;
        self.last_tick = Some(now);

        let t = self.thresholds;
        let mut spring = Spring2::at(self.offset.x, self.offset.y, t.stiffness, t.damping);
        spring.set_target(0.0, 0.0);
        if spring.is_at_rest() {
            return Some(self.finish_settle());
        }
        self.settle = Some(spring);
        None
    }

    fn finish_settle(&mut self) -> AxisTransition {
        self.phase = AxisPhase::Settled;
        self.settle = None;
        self.offset = Point::ZERO;
        AxisTransition::Settled
    }

    fn begin_break(&mut self, axis: Axis, now: Instant) -> Option<AxisTransition> {
        self.phase = AxisPhase::Breaking(axis);
        self.break_started_at = Some(now);
        self.resnap = None;
        Some(AxisTransition::Broke(axis))
    }

    fn complete_break(&mut self, now: Instant) -> Option<AxisTransition> {
        let AxisPhase::Breaking(axis) = self.phase else {
            return None;
        };
        let started = self.break_started_at?;
        if now.saturating_duration_since(started) < self.thresholds.break_duration {
            return None;
        }
        self.phase = AxisPhase::Locked(axis);
        self.break_started_at = None;
        Some(AxisTransition::Locked(axis))
    }

    fn resnap_to_origin(&mut self) -> AxisTransition {
        let t = self.thresholds;
        let mut spring = Spring2::at(self.offset.x, self.offset.y, t.stiffness, t.damping);
        let banded = self.banded(self.raw);
        spring.set_target(banded.x, banded.y);
        self.resnap = (!spring.is_at_rest()).then_some(spring);
        self.phase = AxisPhase::Snapped;
        self.break_started_at = None;
        AxisTransition::Resnapped
    }

    fn tick_springs(&mut self, now: Instant) {
        let dt = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);

        if let Some(settle) = self.settle.as_mut() {
            settle.advance(dt);
            self.offset = Point::new(settle.x.position(), settle.y.position());
        }
        if self.phase == AxisPhase::Snapped {
            let banded = self.banded(self.raw);
            if let Some(resnap) = self.resnap.as_mut() {
                resnap.set_target(banded.x, banded.y);
                resnap.advance(dt);
                if resnap.is_at_rest() {
                    self.resnap = None;
                }
            }
        }
    }

    fn compute_offset(&self, now: Instant) -> Point {
        let raw = self.raw;
        match self.phase {
            AxisPhase::Snapped => match &self.resnap {
                Some(spring) => Point::new(spring.x.position(), spring.y.position()),
                None => self.banded(raw),
            },
            AxisPhase::Breaking(axis) => {
                let progress = self.break_progress(now);
                let banded = self.banded(raw);
                match axis {
                    Axis::Vertical => Point::new(
                        lerp(banded.x, 0.0, progress),
                        lerp(banded.y, raw.y, progress),
                    ),
                    Axis::Horizontal => Point::new(
                        lerp(banded.x, raw.x, progress),
                        lerp(banded.y, 0.0, progress),
                    ),
                }
            }
            AxisPhase::Locked(Axis::Vertical) => Point::new(0.0, raw.y),
            AxisPhase::Locked(Axis::Horizontal) => Point::new(raw.x, 0.0),
            AxisPhase::Settling => self.offset,
            AxisPhase::Settled => Point::ZERO,
        }
    }

    fn break_progress(&self, now: Instant) -> f64 {
        let Some(started) = self.break_started_at else {
            return 1.0;
        };
        let total = self.thresholds.break_duration.as_secs_f64();
        if total <= 0.0 {
            return 1.0;
        }
        (now.saturating_duration_since(started).as_secs_f64() / total).clamp(0.0, 1.0)
    }

    fn banded(&self, raw: Point) -> Point {
        let t = self.thresholds;
        let band = |value: f64| (value * t.snap_resistance).clamp(-t.snap_band, t.snap_band);
        Point::new(band(raw.x), band(raw.y))
    }
}

fn lerp(from: f64, to: f64, progress: f64) -> f64 {
    from + (to - from) * progress
}

#[cfg(test)]
mod tests {
    use super::{AxisLock, AxisTransition};
    use crate::config::DragConfig;
    use crate::model::drag::{Axis, AxisPhase, Point};
    use std::time::{Duration, Instant};

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    fn settle(lock: &mut AxisLock, base: Instant) -> u64 {
        let mut elapsed = 0;
        while lock.phase() != AxisPhase::Settled {
            elapsed += 16;
            assert!(elapsed < 5_000, "settle did not finish");
            lock.advance(ms(base, elapsed));
        }
        elapsed
    }

    #[test]
    fn vertical_first_locks_vertical_and_zeroes_horizontal() {
        let mut lock = AxisLock::new(&DragConfig::default());
        let t0 = Instant::now();

        lock.update(Point::new(5.0, 20.0), t0);
        assert_eq!(lock.phase(), AxisPhase::Snapped);

        let broke = lock.update(Point::new(10.0, 70.0), ms(t0, 16));
        assert_eq!(broke, Some(AxisTransition::Broke(Axis::Vertical)));

        let locked = lock.advance(ms(t0, 200));
        assert_eq!(locked, Some(AxisTransition::Locked(Axis::Vertical)));

        // Large horizontal movement stays suppressed while locked.
        lock.update(Point::new(150.0, 90.0), ms(t0, 216));
        assert_eq!(lock.phase(), AxisPhase::Locked(Axis::Vertical));
        assert_eq!(lock.offset(), Point::new(0.0, 90.0));
    }

    #[test]
    fn diagonal_crossing_both_thresholds_stays_snapped() {
        let mut lock = AxisLock::new(&DragConfig::default());
        let t0 = Instant::now();
        assert_eq!(lock.update(Point::new(80.0, 80.0), t0), None);
        assert_eq!(lock.phase(), AxisPhase::Snapped);
        assert!(lock.offset().x.abs() <= 8.0);
        assert!(lock.offset().y.abs() <= 8.0);
    }

    #[test]
    fn returning_within_vertical_threshold_resnaps_and_reenables_horizontal() {
        let mut lock = AxisLock::new(&DragConfig::default());
        let t0 = Instant::now();
        lock.update(Point::new(0.0, 120.0), t0);
        lock.advance(ms(t0, 150));
        assert_eq!(lock.phase(), AxisPhase::Locked(Axis::Vertical));

        let resnap = lock.update(Point::new(0.0, 30.0), ms(t0, 170));
        assert_eq!(resnap, Some(AxisTransition::Resnapped));
        assert_eq!(lock.phase(), AxisPhase::Snapped);

        let broke = lock.update(Point::new(-75.0, 10.0), ms(t0, 190));
        assert_eq!(broke, Some(AxisTransition::Broke(Axis::Horizontal)));
    }

    #[test]
    fn horizontal_lock_resnaps_only_inside_snap_threshold() {
        let mut lock = AxisLock::new(&DragConfig::default());
        let t0 = Instant::now();
        lock.update(Point::new(70.0, 0.0), t0);
        lock.advance(ms(t0, 150));
        assert_eq!(lock.phase(), AxisPhase::Locked(Axis::Horizontal));

        // Between snap (30) and break (60) thresholds: still locked.
        assert_eq!(lock.update(Point::new(45.0, 40.0), ms(t0, 160)), None);
        assert_eq!(lock.offset(), Point::new(45.0, 0.0));

        assert_eq!(
            lock.update(Point::new(20.0, 0.0), ms(t0, 170)),
            Some(AxisTransition::Resnapped)
        );
    }

    #[test]
    fn small_vertical_drag_never_breaks_and_settles_to_zero() {
        let mut lock = AxisLock::new(&DragConfig::default());
        let t0 = Instant::now();
        assert_eq!(lock.update(Point::new(0.0, 12.0), t0), None);
        assert_eq!(lock.phase(), AxisPhase::Snapped);
        assert!(lock.offset().y > 0.0);

        assert_eq!(lock.release(ms(t0, 10)), None);
        assert_eq!(lock.phase(), AxisPhase::Settling);
        settle(&mut lock, ms(t0, 10));
        assert_eq!(lock.offset(), Point::ZERO);

        // Updates after release are ignored.
        assert_eq!(lock.update(Point::new(0.0, 300.0), ms(t0, 9_000)), None);
        assert_eq!(lock.phase(), AxisPhase::Settled);
    }

    #[test]
    fn release_at_origin_settles_immediately() {
        let mut lock = AxisLock::new(&DragConfig::default());
        let t0 = Instant::now();
        assert_eq!(lock.release(t0), Some(AxisTransition::Settled));
        assert_eq!(lock.advance(ms(t0, 16)), None);
    }

    #[test]
    fn release_from_locked_state_springs_back() {
        let mut lock = AxisLock::new(&DragConfig::default());
        let t0 = Instant::now();
        lock.update(Point::new(0.0, 200.0), t0);
        lock.advance(ms(t0, 150));
        lock.release(ms(t0, 160));
        lock.advance(ms(t0, 176));
        assert!(lock.offset().y < 200.0);
        let elapsed = settle(&mut lock, ms(t0, 176));
        assert!(elapsed > 0);
    }
}
