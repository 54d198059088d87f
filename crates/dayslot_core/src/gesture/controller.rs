//! Single owner of the active drag session.
//!
//! # Responsibility
//! - Route pointer input through the tracker and axis lock.
//! - Drive quantization, zone timers, overlay reveal and sibling springs
//!   from the application frame pump.
//! - Publish render state through [`DragSignals`].
//! - Hand exactly one [`DragOutcome`] to the caller per finished drag.
//!
//! # Invariants
//! - At most one session exists; drag activation is blocked until the
//!   previous session's settle completes.
//! - Gesture-context calls never perform I/O and never fail.
//! - While locked vertically the horizontal zone reads middle, and vice
//!   versa.
//!
//! # See also
//! - `crate::service::commit_service` for persisting a `DragOutcome`

use crate::calendar::CalendarDateStore;
use crate::config::DragConfig;
use crate::gesture::axis_lock::{AxisLock, AxisTransition};
use crate::gesture::overlay::{OverlayCoordinator, OverlayView, RenderLayer};
use crate::gesture::quantize::TimeQuantizer;
use crate::gesture::reorder::{ReorderCalculator, RowLayout};
use crate::gesture::tracker::{GestureEvent, PointerInput, PointerTracker};
use crate::gesture::zone::{AutoScroller, DayAdvanceDriver, ScrollMetrics, ZoneDetector};
use crate::haptics::{HapticFeedback, HapticIntensity};
use crate::model::drag::{
    Axis, AxisPhase, DragSession, HorizontalZone, ItemFrame, Point, ScreenSize, SwipeAction,
    VerticalZone,
};
use crate::model::slot::{Slot, SlotId};
use crate::observable::ObservableCell;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

/// Draggable item under the pointer at press time.
#[derive(Debug, Clone)]
pub struct DragTarget {
    pub slot: Slot,
    /// Day list the item is rendered in.
    pub day: NaiveDate,
    /// Measured frame; `None` when the item was not mounted.
    pub frame: Option<ItemFrame>,
    /// Measured rows of the same day list, dragged row included.
    pub rows: Vec<RowLayout>,
}

/// Render state published for observers outside the gesture context.
#[derive(Debug)]
pub struct DragSignals {
    pub active_slot: ObservableCell<Option<SlotId>>,
    pub phase: ObservableCell<Option<AxisPhase>>,
    pub offset: ObservableCell<Point>,
    pub zones: ObservableCell<(VerticalZone, HorizontalZone)>,
    pub display_start: ObservableCell<Option<NaiveDateTime>>,
    pub scroll_translation: ObservableCell<f64>,
}

impl Default for DragSignals {
    fn default() -> Self {
        Self {
            active_slot: ObservableCell::new(None),
            phase: ObservableCell::new(None),
            offset: ObservableCell::new(Point::ZERO),
            zones: ObservableCell::new((VerticalZone::Middle, HorizontalZone::Middle)),
            display_start: ObservableCell::new(None),
            scroll_translation: ObservableCell::new(0.0),
        }
    }
}

impl DragSignals {
    fn reset(&self) {
        self.active_slot.set(None);
        self.phase.set(None);
        self.offset.set(Point::ZERO);
        self.zones.set((VerticalZone::Middle, HorizontalZone::Middle));
        self.display_start.set(None);
        self.scroll_translation.set(0.0);
    }
}

/// Result of one finished drag, produced when its settle completes.
#[derive(Debug, Clone, PartialEq)]
pub struct DragOutcome {
    pub slot: Slot,
    pub source_day: NaiveDate,
    /// Day shown when the pointer was released.
    pub target_day: NaiveDate,
    pub day_changed: bool,
    /// Quantized display start at release; never persisted.
    pub display_start: Option<NaiveDateTime>,
    pub swipe_action: Option<SwipeAction>,
    /// Real list scroll offset after folding in the auto-scroll translation.
    pub committed_scroll_offset: f64,
}

impl DragOutcome {
    /// Whether the slot has to be moved to another day.
    pub fn needs_commit(&self) -> bool {
        self.source_day != self.target_day
    }
}

#[derive(Debug)]
struct ActiveDrag {
    session: DragSession,
    lock: AxisLock,
    quantizer: TimeQuantizer,
    day_driver: DayAdvanceDriver,
    release: Option<ReleaseState>,
}

#[derive(Debug, Clone, Copy)]
struct ReleaseState {
    target_day: NaiveDate,
    display_start: Option<NaiveDateTime>,
    swipe_action: Option<SwipeAction>,
    committed_scroll_offset: f64,
}

/// Drag-to-reschedule engine entry point.
#[derive(Debug)]
pub struct DragController {
    config: DragConfig,
    haptics: Arc<dyn HapticFeedback>,
    calendar: CalendarDateStore,
    signals: Arc<DragSignals>,
    screen: ScreenSize,
    tracker: PointerTracker,
    zones: ZoneDetector,
    scroller: AutoScroller,
    overlay: OverlayCoordinator,
    reorder: ReorderCalculator,
    pending: Option<DragTarget>,
    active: Option<ActiveDrag>,
}

impl DragController {
    pub fn new(
        config: DragConfig,
        haptics: Arc<dyn HapticFeedback>,
        calendar: CalendarDateStore,
        screen: ScreenSize,
    ) -> Self {
        Self {
            tracker: PointerTracker::new(&config),
            zones: ZoneDetector::new(&config),
            scroller: AutoScroller::new(&config),
            overlay: OverlayCoordinator::new(&config),
            reorder: ReorderCalculator::new(&config),
            config,
            haptics,
            calendar,
            signals: Arc::new(DragSignals::default()),
            screen,
            pending: None,
            active: None,
        }
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    pub fn calendar(&self) -> &CalendarDateStore {
        &self.calendar
    }

    pub fn signals(&self) -> Arc<DragSignals> {
        Arc::clone(&self.signals)
    }

    pub fn set_screen_size(&mut self, screen: ScreenSize) {
        self.screen = screen;
    }

    /// Updates the day list scroll geometry used by auto-scroll.
    pub fn set_scroll_metrics(&mut self, metrics: ScrollMetrics) {
        self.scroller.set_metrics(metrics);
    }

    pub fn scroll_metrics(&self) -> ScrollMetrics {
        self.scroller.metrics()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.active.as_ref().map(|active| &active.session)
    }

    pub fn layer_for(&self, slot_id: SlotId) -> RenderLayer {
        self.overlay.layer_for(slot_id)
    }

    pub fn overlay_view(&self) -> Option<OverlayView> {
        self.overlay.view()
    }

    /// Animated reposition offset of a sibling row.
    pub fn sibling_offset(&self, slot_id: SlotId) -> f64 {
        self.reorder.offset_for(slot_id)
    }

    /// Overlay content finished loading.
    pub fn overlay_content_loaded(&mut self) {
        self.overlay.content_loaded();
    }

    /// Pointer down on a draggable item.
    pub fn press(&mut self, target: DragTarget, position: Point, now: Instant) -> Option<GestureEvent> {
        if self.tracker.is_pressed() {
            debug!("event=drag_press module=gesture status=skip reason=already_pressed");
            return None;
        }
        self.pending = Some(target);
        self.handle_pointer(PointerInput::Down(position), now)
    }

    /// Gesture-context entry point for every pointer sample.
    pub fn handle_pointer(&mut self, input: PointerInput, now: Instant) -> Option<GestureEvent> {
        let event = self.tracker.process(input, now);
        match event {
            Some(GestureEvent::DragStart { origin, position }) => {
                self.activate(origin, position, now)
            }
            Some(GestureEvent::DragUpdate { position, delta }) => {
                self.pointer_moved(position, delta, now)
            }
            Some(GestureEvent::DragEnd { position, delta }) => self.release(position, delta, now),
            Some(GestureEvent::Tap { .. }) | None => {}
        }
        if !self.tracker.is_pressed() {
            self.pending = None;
        }
        event
    }

    /// Application frame pump.
    ///
    /// Returns the finished drag exactly once, when its settle completes.
    pub fn frame(&mut self, now: Instant) -> Option<DragOutcome> {
        if let Some(GestureEvent::DragStart { origin, position }) = self.tracker.check_long_press(now) {
            self.activate(origin, position, now);
        }

        self.overlay.tick(now);
        self.reorder.advance(now);
        let translation = self.scroller.advance(now);
        self.signals.scroll_translation.set(translation);

        let active = self.active.as_mut()?;
        if active.release.is_none() {
            let transition = active.lock.advance(now);
            Self::pulse_for(self.haptics.as_ref(), transition);
            let stepped = active.quantizer.tick(
                active.lock.offset().y,
                active.lock.is_vertical_free(),
                now,
            );
            Self::publish_display(
                self.haptics.as_ref(),
                &self.signals,
                &active.quantizer,
                stepped,
            );
            if let Some(step) = active.day_driver.tick(now) {
                Self::advance_day(&self.calendar, &mut active.session, step);
            }
        } else {
            active.lock.advance(now);
        }

        active.session.phase = active.lock.phase();
        active.session.offset = active.lock.offset();
        if active.release.is_none() {
            // Auto-scroll moves rows under a still pointer.
            self.reorder.update(
                active.session.current_day,
                active.session.dragged_mid_y(),
                translation,
            );
        }
        self.overlay.track(active.session.offset);
        self.signals.offset.set(active.session.offset);
        self.signals.phase.set(Some(active.session.phase));

        if active.session.phase == AxisPhase::Settled {
            return self.teardown();
        }
        None
    }

    fn activate(&mut self, origin: Point, position: Point, now: Instant) {
        let Some(target) = self.pending.take() else {
            debug!("event=drag_start module=gesture status=skip reason=no_target");
            self.tracker.reset();
            return;
        };
        if self.active.is_some() {
            debug!("event=drag_start module=gesture status=skip reason=session_active");
            self.tracker.reset();
            return;
        }

        let frame = target.frame.unwrap_or_else(|| {
            debug!(
                "event=drag_measure module=gesture status=skip reason=unmeasured slot_id={}",
                target.slot.id
            );
            ItemFrame::default()
        });
        let mut session = DragSession::new(target.slot, target.day, frame, origin, now);
        session.pointer = position;

        self.overlay.begin(session.slot.id, frame, now);
        self.reorder.begin(target.day, session.slot.id, &target.rows, now);
        self.tracker.set_activation_blocked(true);
        self.haptics.pulse(HapticIntensity::Medium);
        self.signals.active_slot.set(Some(session.slot.id));
        self.signals.phase.set(Some(AxisPhase::Snapped));

        info!(
            "event=drag_start module=gesture status=ok slot_id={} day={}",
            session.slot.id, session.source_day
        );
        self.active = Some(ActiveDrag {
            lock: AxisLock::new(&self.config),
            quantizer: TimeQuantizer::new(&self.config, &session.slot),
            day_driver: DayAdvanceDriver::new(&self.config),
            session,
            release: None,
        });
    }

    fn pointer_moved(&mut self, position: Point, delta: Point, now: Instant) {
        let Some(active) = self.active.as_mut() else {
            debug!("event=drag_update module=gesture status=skip reason=no_session");
            return;
        };
        if active.release.is_some() {
            return;
        }

        active.session.pointer = position;
        let transition = active.lock.update(delta, now);
        Self::pulse_for(self.haptics.as_ref(), transition);
        let phase = active.lock.phase();
        let offset = active.lock.offset();
        active.session.phase = phase;
        active.session.offset = offset;

        let (mut vertical, mut horizontal) = self.zones.classify(position, self.screen);
        match phase.axis() {
            Some(Axis::Vertical) => horizontal = HorizontalZone::Middle,
            Some(Axis::Horizontal) => vertical = VerticalZone::Middle,
            None => {}
        }
        active.session.vertical_zone = vertical;
        active.session.horizontal_zone = horizontal;
        active.day_driver.set_zone(horizontal, now);
        self.scroller.set_zone(vertical, now);

        let free = active.lock.is_vertical_free();
        let stepped = active.quantizer.update(offset.y, free, now);
        Self::publish_display(
            self.haptics.as_ref(),
            &self.signals,
            &active.quantizer,
            stepped,
        );

        self.overlay.track(offset);
        self.reorder.update(
            active.session.current_day,
            active.session.dragged_mid_y(),
            self.scroller.translation(),
        );

        self.signals.offset.set(offset);
        self.signals.phase.set(Some(phase));
        self.signals.zones.set((vertical, horizontal));
    }

    fn release(&mut self, position: Point, delta: Point, now: Instant) {
        let Some(active) = self.active.as_mut() else {
            debug!("event=drag_end module=gesture status=skip reason=no_session");
            return;
        };
        if active.release.is_some() {
            return;
        }
        active.session.pointer = position;

        let swipe_action = swipe_action_for(&self.config, &active.session, delta);
        active.day_driver.stop();
        let committed_scroll_offset = self.scroller.finish(now);
        self.reorder.release();
        active.release = Some(ReleaseState {
            target_day: active.session.current_day,
            display_start: active.quantizer.display_start(),
            swipe_action,
            committed_scroll_offset,
        });

        active.lock.release(now);
        active.session.phase = active.lock.phase();
        self.signals.phase.set(Some(active.session.phase));
        self.signals.zones.set((VerticalZone::Middle, HorizontalZone::Middle));
        self.signals.scroll_translation.set(0.0);
        info!(
            "event=drag_release module=gesture status=ok slot_id={} source_day={} target_day={} day_changed={}",
            active.session.slot.id,
            active.session.source_day,
            active.session.current_day,
            active.session.day_changed
        );
    }

    fn teardown(&mut self) -> Option<DragOutcome> {
        let active = self.active.take()?;
        self.overlay.finish();
        self.reorder.clear();
        self.tracker.set_activation_blocked(false);
        self.signals.reset();

        let Some(release) = active.release else {
            debug!("event=drag_teardown module=gesture status=skip reason=not_released");
            return None;
        };
        let session = active.session;
        info!(
            "event=drag_settled module=gesture status=ok slot_id={} target_day={}",
            session.slot.id, release.target_day
        );
        Some(DragOutcome {
            slot: session.slot,
            source_day: session.source_day,
            target_day: release.target_day,
            day_changed: session.day_changed,
            display_start: release.display_start,
            swipe_action: release.swipe_action,
            committed_scroll_offset: release.committed_scroll_offset,
        })
    }

    fn advance_day(calendar: &CalendarDateStore, session: &mut DragSession, step: i64) {
        let Some(next) = TimeDelta::try_days(step)
            .and_then(|delta| session.current_day.checked_add_signed(delta))
        else {
            debug!("event=day_advance module=gesture status=skip reason=out_of_range step={step}");
            return;
        };
        session.current_day = next;
        session.day_changed = true;
        calendar.set(next);
        info!(
            "event=day_advance module=gesture status=ok slot_id={} day={next}",
            session.slot.id
        );
    }

    fn publish_display(
        haptics: &dyn HapticFeedback,
        signals: &DragSignals,
        quantizer: &TimeQuantizer,
        stepped: Option<NaiveDateTime>,
    ) {
        match stepped {
            Some(display) => {
                haptics.pulse(HapticIntensity::Light);
                signals.display_start.set(Some(display));
            }
            None if !quantizer.is_active() => {
                signals.display_start.set(None);
            }
            None => {}
        }
    }

    fn pulse_for(haptics: &dyn HapticFeedback, transition: Option<AxisTransition>) {
        if let Some(AxisTransition::Broke(_) | AxisTransition::Resnapped) = transition {
            haptics.pulse(HapticIntensity::Light);
        }
    }
}

/// Swipe action revealed by a horizontally locked release in the middle zone.
///
/// Day changes take precedence: a drag that moved days reveals nothing.
fn swipe_action_for(config: &DragConfig, session: &DragSession, delta: Point) -> Option<SwipeAction> {
    if session.day_changed
        || session.phase != AxisPhase::Locked(Axis::Horizontal)
        || session.horizontal_zone != HorizontalZone::Middle
        || delta.x.abs() < config.swipe_action_threshold
    {
        return None;
    }
    Some(if delta.x > 0.0 {
        SwipeAction::Complete
    } else {
        SwipeAction::Delete
    })
}

#[cfg(test)]
mod tests {
    use super::{DragController, DragTarget};
    use crate::calendar::CalendarDateStore;
    use crate::config::DragConfig;
    use crate::gesture::overlay::RenderLayer;
    use crate::gesture::reorder::RowLayout;
    use crate::gesture::tracker::{GestureEvent, PointerInput};
    use crate::gesture::zone::ScrollMetrics;
    use crate::haptics::{HapticFeedback, HapticIntensity};
    use crate::model::drag::{AxisPhase, ItemFrame, Point, ScreenSize, SwipeAction};
    use crate::model::slot::Slot;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    #[derive(Debug, Default)]
    struct RecordingHaptics {
        pulses: Mutex<Vec<HapticIntensity>>,
    }

    impl HapticFeedback for RecordingHaptics {
        fn pulse(&self, intensity: HapticIntensity) {
            self.pulses.lock().expect("haptics lock").push(intensity);
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
    }

    fn slot() -> Slot {
        let at = |time: &str| {
            NaiveDateTime::parse_from_str(&format!("2024-06-01 {time}"), "%Y-%m-%d %H:%M")
                .expect("fixture time should parse")
        };
        Slot::timed("standup", at("09:00"), at("10:00"))
    }

    fn target(slot: &Slot) -> DragTarget {
        let frame = ItemFrame::new(Point::new(20.0, 370.0), 360.0, 60.0);
        DragTarget {
            slot: slot.clone(),
            day: day(),
            frame: Some(frame),
            rows: vec![RowLayout {
                slot_id: slot.id,
                index: 0,
                frame,
            }],
        }
    }

    fn controller(haptics: Arc<RecordingHaptics>) -> DragController {
        DragController::new(
            DragConfig::default(),
            haptics,
            CalendarDateStore::new(day()),
            ScreenSize::new(400.0, 800.0),
        )
    }

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    fn pump_until_outcome(
        controller: &mut DragController,
        base: Instant,
        from_ms: u64,
    ) -> super::DragOutcome {
        let mut elapsed = from_ms;
        loop {
            elapsed += 16;
            assert!(elapsed < from_ms + 5_000, "settle did not finish");
            if let Some(outcome) = controller.frame(ms(base, elapsed)) {
                return outcome;
            }
        }
    }

    #[test]
    fn long_press_activates_session_with_medium_pulse() {
        let haptics = Arc::new(RecordingHaptics::default());
        let mut controller = controller(Arc::clone(&haptics));
        let slot = slot();
        let t0 = Instant::now();

        controller.press(target(&slot), Point::new(200.0, 400.0), t0);
        assert!(controller.frame(ms(t0, 400)).is_none());
        assert!(!controller.is_dragging());

        controller.frame(ms(t0, 500));
        assert!(controller.is_dragging());
        assert_eq!(controller.signals().active_slot.get(), Some(slot.id));
        assert!(matches!(
            controller.layer_for(slot.id),
            RenderLayer::Overlay { .. }
        ));
        assert_eq!(
            haptics.pulses.lock().expect("haptics lock").first(),
            Some(&HapticIntensity::Medium)
        );
    }

    #[test]
    fn tap_never_starts_a_session() {
        let mut controller = controller(Arc::new(RecordingHaptics::default()));
        let t0 = Instant::now();
        controller.press(target(&slot()), Point::new(200.0, 400.0), t0);
        let event = controller.handle_pointer(PointerInput::Up(Point::new(201.0, 400.0)), ms(t0, 80));
        assert!(matches!(event, Some(GestureEvent::Tap { .. })));
        assert!(controller.frame(ms(t0, 600)).is_none());
        assert!(!controller.is_dragging());
    }

    #[test]
    fn short_vertical_drag_settles_without_commit() {
        let mut controller = controller(Arc::new(RecordingHaptics::default()));
        let t0 = Instant::now();
        controller.press(target(&slot()), Point::new(200.0, 400.0), t0);
        controller.frame(ms(t0, 500));

        controller.handle_pointer(PointerInput::Move(Point::new(200.0, 412.0)), ms(t0, 520));
        assert_eq!(controller.signals().display_start.get(), None);
        controller.handle_pointer(PointerInput::Up(Point::new(200.0, 412.0)), ms(t0, 540));
        assert_eq!(controller.signals().phase.get(), Some(AxisPhase::Settling));

        let outcome = pump_until_outcome(&mut controller, t0, 540);
        assert!(!outcome.needs_commit());
        assert_eq!(outcome.display_start, None);
        assert!(!controller.is_dragging());
        assert_eq!(controller.signals().active_slot.get(), None);
        assert!(controller.frame(ms(t0, 9_000)).is_none());
    }

    #[test]
    fn second_press_is_ignored_until_teardown() {
        let mut controller = controller(Arc::new(RecordingHaptics::default()));
        let first = slot();
        let t0 = Instant::now();
        controller.press(target(&first), Point::new(200.0, 400.0), t0);
        controller.frame(ms(t0, 500));
        controller.handle_pointer(PointerInput::Move(Point::new(200.0, 460.0)), ms(t0, 520));
        controller.handle_pointer(PointerInput::Up(Point::new(200.0, 460.0)), ms(t0, 540));

        let second = slot();
        controller.press(target(&second), Point::new(200.0, 200.0), ms(t0, 550));
        let mut elapsed = 550;
        let outcome = loop {
            elapsed += 16;
            assert!(elapsed < 6_000, "settle did not finish");
            if let Some(outcome) = controller.frame(ms(t0, elapsed)) {
                break outcome;
            }
            assert_eq!(
                controller.session().map(|session| session.slot.id),
                Some(first.id)
            );
        };
        assert_eq!(outcome.slot.id, first.id);
        assert!(controller.session().is_none());

        // The still-held press activates once its own long-press delay ends.
        let long_press_ms = controller.config().long_press_delay.as_millis() as u64;
        let activation_at = 550 + long_press_ms;
        assert!(elapsed < activation_at);
        while elapsed < activation_at {
            elapsed += 16;
            controller.frame(ms(t0, elapsed));
            if elapsed < activation_at {
                assert!(controller.session().is_none());
            }
        }
        assert_eq!(
            controller.session().map(|session| session.slot.id),
            Some(second.id)
        );
    }

    #[test]
    fn vertical_drag_quantizes_display_time() {
        let haptics = Arc::new(RecordingHaptics::default());
        let mut controller = controller(Arc::clone(&haptics));
        let t0 = Instant::now();
        controller.press(target(&slot()), Point::new(200.0, 400.0), t0);
        controller.frame(ms(t0, 500));

        controller.handle_pointer(PointerInput::Move(Point::new(200.0, 470.0)), ms(t0, 520));
        controller.frame(ms(t0, 700));
        controller.handle_pointer(PointerInput::Move(Point::new(200.0, 470.0)), ms(t0, 710));
        let display = controller.signals().display_start.get();
        assert_eq!(
            display.map(|value| value.format("%H:%M").to_string()),
            Some("09:01".to_owned())
        );

        controller.frame(ms(t0, 1_210));
        assert_eq!(
            controller
                .signals()
                .display_start
                .get()
                .map(|value| value.format("%H:%M").to_string()),
            Some("09:02".to_owned())
        );
        assert!(haptics
            .pulses
            .lock()
            .expect("haptics lock")
            .contains(&HapticIntensity::Light));
    }

    #[test]
    fn held_flick_steps_on_the_grid_of_its_offset() {
        let mut controller = controller(Arc::new(RecordingHaptics::default()));
        let t0 = Instant::now();
        controller.press(target(&slot()), Point::new(200.0, 400.0), t0);
        controller.frame(ms(t0, 500));

        // One move far into the 30 minute band, then the pointer holds still.
        controller.handle_pointer(PointerInput::Move(Point::new(200.0, 730.0)), ms(t0, 520));
        let mut elapsed = 520;
        while elapsed < 2_020 {
            elapsed += 16;
            controller.frame(ms(t0, elapsed));
        }

        assert_eq!(
            controller
                .signals()
                .display_start
                .get()
                .map(|value| value.format("%H:%M").to_string()),
            Some("10:30".to_owned())
        );
    }

    #[test]
    fn auto_scroll_alone_repositions_rows_scrolled_past() {
        let mut controller = controller(Arc::new(RecordingHaptics::default()));
        controller.set_scroll_metrics(ScrollMetrics {
            offset: 0.0,
            content_height: 2_000.0,
            viewport_height: 800.0,
        });
        let dragged = slot();
        let below = slot();
        let dragged_frame = ItemFrame::new(Point::new(20.0, 370.0), 360.0, 60.0);
        let target = DragTarget {
            slot: dragged.clone(),
            day: day(),
            frame: Some(dragged_frame),
            rows: vec![
                RowLayout {
                    slot_id: dragged.id,
                    index: 0,
                    frame: dragged_frame,
                },
                RowLayout {
                    slot_id: below.id,
                    index: 1,
                    frame: ItemFrame::new(Point::new(20.0, 900.0), 360.0, 60.0),
                },
            ],
        };
        let t0 = Instant::now();
        controller.press(target, Point::new(200.0, 400.0), t0);
        controller.frame(ms(t0, 500));

        // Into the bottom zone; the row below is still off screen.
        controller.handle_pointer(PointerInput::Move(Point::new(200.0, 700.0)), ms(t0, 520));
        controller.frame(ms(t0, 536));
        assert_eq!(controller.sibling_offset(below.id), 0.0);

        let mut elapsed = 536;
        while elapsed < 1_200 {
            elapsed += 16;
            controller.frame(ms(t0, elapsed));
        }
        assert!(controller.signals().scroll_translation.get() > 230.0);
        assert!(controller.sibling_offset(below.id) < 0.0);
    }

    #[test]
    fn short_horizontal_release_reveals_swipe_action() {
        let mut controller = controller(Arc::new(RecordingHaptics::default()));
        let t0 = Instant::now();
        controller.press(target(&slot()), Point::new(150.0, 400.0), t0);
        controller.frame(ms(t0, 500));

        controller.handle_pointer(PointerInput::Move(Point::new(250.0, 400.0)), ms(t0, 520));
        controller.frame(ms(t0, 700));
        controller.handle_pointer(PointerInput::Up(Point::new(250.0, 400.0)), ms(t0, 720));

        let outcome = pump_until_outcome(&mut controller, t0, 720);
        assert_eq!(outcome.swipe_action, Some(SwipeAction::Complete));
        assert!(!outcome.needs_commit());
    }
}
