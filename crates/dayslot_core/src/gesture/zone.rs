//! Screen-edge zone detection, auto day-advance and list auto-scroll.
//!
//! # Responsibility
//! - Classify pointer positions into vertical/horizontal edge zones.
//! - Advance the calendar day while the pointer rests in a side zone.
//! - Translate the day list toward its content boundary while the pointer
//!   rests in the top/bottom zone.
//!
//! # Invariants
//! - Day advance is scheduled only on a zone transition; repeated reports
//!   of the same zone never restart the delay.
//! - Returning to the middle zone cancels pending day advances and freezes
//!   the scroll translation where it is.
//! - `finish()` folds the translation into the real scroll offset and
//!   resets the translation to zero.

use crate::config::DragConfig;
use crate::model::drag::{HorizontalZone, Point, ScreenSize, VerticalZone};
use std::time::{Duration, Instant};

/// Pure zone classifier.
#[derive(Debug, Clone, Copy)]
pub struct ZoneDetector {
    top_fraction: f64,
    bottom_fraction: f64,
    edge_band_width: f64,
}

impl ZoneDetector {
    pub fn new(config: &DragConfig) -> Self {
        Self {
            top_fraction: config.top_zone_fraction,
            bottom_fraction: config.bottom_zone_fraction,
            edge_band_width: config.edge_band_width,
        }
    }

    pub fn vertical(&self, pointer: Point, screen: ScreenSize) -> VerticalZone {
        if pointer.y < screen.height * self.top_fraction {
            VerticalZone::Top
        } else if pointer.y > screen.height * self.bottom_fraction {
            VerticalZone::Bottom
        } else {
            VerticalZone::Middle
        }
    }

    pub fn horizontal(&self, pointer: Point, screen: ScreenSize) -> HorizontalZone {
        if pointer.x < self.edge_band_width {
            HorizontalZone::Left
        } else if pointer.x > screen.width - self.edge_band_width {
            HorizontalZone::Right
        } else {
            HorizontalZone::Middle
        }
    }

    pub fn classify(&self, pointer: Point, screen: ScreenSize) -> (VerticalZone, HorizontalZone) {
        (
            self.vertical(pointer, screen),
            self.horizontal(pointer, screen),
        )
    }
}

/// Repeating calendar day-advance timer driven by the horizontal zone.
#[derive(Debug, Clone)]
pub struct DayAdvanceDriver {
    delay: Duration,
    interval: Duration,
    zone: HorizontalZone,
    next_advance_at: Option<Instant>,
}

impl DayAdvanceDriver {
    pub fn new(config: &DragConfig) -> Self {
        Self {
            delay: config.day_advance_delay,
            interval: config.day_advance_interval,
            zone: HorizontalZone::Middle,
            next_advance_at: None,
        }
    }

    pub fn zone(&self) -> HorizontalZone {
        self.zone
    }

    pub fn is_scheduled(&self) -> bool {
        self.next_advance_at.is_some()
    }

    /// Reports the current zone. Returns `true` on a zone transition.
    pub fn set_zone(&mut self, zone: HorizontalZone, now: Instant) -> bool {
        if zone == self.zone {
            return false;
        }
        self.zone = zone;
        self.next_advance_at = match zone {
            HorizontalZone::Middle => None,
            HorizontalZone::Left | HorizontalZone::Right => Some(now + self.delay),
        };
        true
    }

    /// Returns the day step (−1/+1) when an advance is due.
    pub fn tick(&mut self, now: Instant) -> Option<i64> {
        let due = self.next_advance_at?;
        if now < due {
            return None;
        }
        self.next_advance_at = Some(due + self.interval);
        Some(self.zone.day_step())
    }

    pub fn stop(&mut self) {
        self.zone = HorizontalZone::Middle;
        self.next_advance_at = None;
    }
}

/// Scroll geometry of the day list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Real scroll position, 0 = top.
    pub offset: f64,
    pub content_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn max_offset(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    from: f64,
    target: f64,
    started_at: Instant,
}

/// Constant-speed scroll translation toward a content boundary.
#[derive(Debug, Clone)]
pub struct AutoScroller {
    speed: f64,
    metrics: ScrollMetrics,
    zone: VerticalZone,
    translation: f64,
    animation: Option<ScrollAnimation>,
}

impl AutoScroller {
    pub fn new(config: &DragConfig) -> Self {
        Self {
            speed: config.scroll_speed,
            metrics: ScrollMetrics::default(),
            zone: VerticalZone::Middle,
            translation: 0.0,
            animation: None,
        }
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub fn set_metrics(&mut self, metrics: ScrollMetrics) {
        self.metrics = metrics;
    }

    /// Current translation added on top of the real scroll offset.
    pub fn translation(&self) -> f64 {
        self.translation
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Reports the current zone; restarts the animation on transitions.
    pub fn set_zone(&mut self, zone: VerticalZone, now: Instant) -> bool {
        if zone == self.zone {
            return false;
        }
        self.advance(now);
        self.zone = zone;
        let target = match zone {
            VerticalZone::Middle => None,
            VerticalZone::Top => Some(-self.metrics.offset),
            VerticalZone::Bottom => Some(self.metrics.max_offset() - self.metrics.offset),
        };
        self.animation = target.map(|target| ScrollAnimation {
            from: self.translation,
            target,
            started_at: now,
        });
        true
    }

    /// Samples the animation at `now` and returns the translation.
    pub fn advance(&mut self, now: Instant) -> f64 {
        let Some(animation) = self.animation else {
            return self.translation;
        };
        let remaining = animation.target - animation.from;
        let travelled = self.speed * now.saturating_duration_since(animation.started_at).as_secs_f64();
        if travelled >= remaining.abs() {
            self.translation = animation.target;
            self.animation = None;
        } else {
            self.translation = animation.from + travelled.copysign(remaining);
        }
        self.translation
    }

    /// Commits the translation into the real scroll offset.
    pub fn finish(&mut self, now: Instant) -> f64 {
        self.advance(now);
        let committed =
            (self.metrics.offset + self.translation).clamp(0.0, self.metrics.max_offset());
        self.metrics.offset = committed;
        self.translation = 0.0;
        self.animation = None;
        self.zone = VerticalZone::Middle;
        committed
    }
}

#[cfg(test)]
mod tests {
    use super::{AutoScroller, DayAdvanceDriver, ScrollMetrics, ZoneDetector};
    use crate::config::DragConfig;
    use crate::model::drag::{HorizontalZone, Point, ScreenSize, VerticalZone};
    use std::time::{Duration, Instant};

    const SCREEN: ScreenSize = ScreenSize::new(400.0, 800.0);

    #[test]
    fn classifies_edge_zones() {
        let detector = ZoneDetector::new(&DragConfig::default());
        assert_eq!(
            detector.classify(Point::new(200.0, 400.0), SCREEN),
            (VerticalZone::Middle, HorizontalZone::Middle)
        );
        assert_eq!(
            detector.classify(Point::new(10.0, 100.0), SCREEN),
            (VerticalZone::Top, HorizontalZone::Left)
        );
        assert_eq!(
            detector.classify(Point::new(390.0, 700.0), SCREEN),
            (VerticalZone::Bottom, HorizontalZone::Right)
        );
    }

    #[test]
    fn unchanged_zone_does_not_restart_delay() {
        let mut driver = DayAdvanceDriver::new(&DragConfig::default());
        let t0 = Instant::now();

        assert!(driver.set_zone(HorizontalZone::Left, t0));
        assert!(!driver.set_zone(HorizontalZone::Left, t0 + Duration::from_millis(900)));

        assert_eq!(driver.tick(t0 + Duration::from_millis(999)), None);
        assert_eq!(driver.tick(t0 + Duration::from_millis(1000)), Some(-1));
        assert_eq!(driver.tick(t0 + Duration::from_millis(1500)), None);
        assert_eq!(driver.tick(t0 + Duration::from_millis(2000)), Some(-1));
    }

    #[test]
    fn returning_to_middle_cancels_day_advance() {
        let mut driver = DayAdvanceDriver::new(&DragConfig::default());
        let t0 = Instant::now();
        driver.set_zone(HorizontalZone::Right, t0);
        driver.set_zone(HorizontalZone::Middle, t0 + Duration::from_millis(500));
        assert!(!driver.is_scheduled());
        assert_eq!(driver.tick(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn scroll_animates_toward_boundary_and_freezes_in_middle() {
        let mut scroller = AutoScroller::new(&DragConfig::default());
        scroller.set_metrics(ScrollMetrics {
            offset: 300.0,
            content_height: 2000.0,
            viewport_height: 800.0,
        });
        let t0 = Instant::now();

        scroller.set_zone(VerticalZone::Top, t0);
        assert_eq!(scroller.advance(t0 + Duration::from_millis(250)), -150.0);

        scroller.set_zone(VerticalZone::Middle, t0 + Duration::from_millis(250));
        assert_eq!(scroller.advance(t0 + Duration::from_secs(3)), -150.0);

        // Top boundary is reached after 300 points in total.
        scroller.set_zone(VerticalZone::Top, t0 + Duration::from_secs(3));
        assert_eq!(scroller.advance(t0 + Duration::from_secs(10)), -300.0);
        assert!(!scroller.is_animating());

        assert_eq!(scroller.finish(t0 + Duration::from_secs(10)), 0.0);
        assert_eq!(scroller.translation(), 0.0);
    }

    #[test]
    fn bottom_zone_stops_at_max_offset() {
        let mut scroller = AutoScroller::new(&DragConfig::default());
        scroller.set_metrics(ScrollMetrics {
            offset: 1000.0,
            content_height: 2000.0,
            viewport_height: 800.0,
        });
        let t0 = Instant::now();
        scroller.set_zone(VerticalZone::Bottom, t0);
        assert_eq!(scroller.advance(t0 + Duration::from_secs(2)), 200.0);
        assert_eq!(scroller.finish(t0 + Duration::from_secs(2)), 1200.0);
    }
}
