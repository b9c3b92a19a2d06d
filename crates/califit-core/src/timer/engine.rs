//! Interval timer implementation.
//!
//! The interval timer is a wall-clock-anchored state machine for a single
//! exercise set or rest period. It does not use internal threads. Instead it
//! tells the host which recurring callback to run ([`IntervalTimer::active_schedule`])
//! and the host hands the token back through [`IntervalTimer::fire`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> (Countdown 3,2,1) -> Running <-> Paused
//!   ^                             |
//!   +------ reset / complete -----+
//! ```
//!
//! Rest sessions skip the countdown and start on `configure()`.
//!
//! Displayed seconds are always recomputed from the anchors and the clock,
//! never decremented, so a throttled or delayed callback corrects itself on
//! the next tick. Every transition that cancels callbacks bumps the schedule
//! epoch; tokens from an older epoch are ignored.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = IntervalTimer::new(TimerSettings::default(), clock, cues);
//! timer.configure(SessionConfig::exercise(30));
//! timer.start();
//! // In the host's scheduler:
//! if let Some(token) = timer.active_schedule() {
//!     for event in timer.fire(token) { /* render */ }
//! }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::session::{RunState, ScheduleKind, ScheduleToken, SessionConfig, TimerMode, TimerSettings};
use crate::clock::{Clock, SystemClock};
use crate::cue::{self, Cue, CueDispatcher, HapticPattern};
use crate::events::Event;

/// Count-down seconds that get a tick cue.
const TICK_CUE_WINDOW: std::ops::RangeInclusive<i64> = 1..=3;

/// Core interval timer.
pub struct IntervalTimer {
    settings: TimerSettings,
    clock: Arc<dyn Clock>,
    cues: Box<dyn CueDispatcher>,
    session: SessionConfig,
    run_state: RunState,
    /// Current 3-2-1 value while the pre-start countdown is shown.
    countdown: Option<u8>,
    anchor_start_ms: Option<i64>,
    /// Expiry instant; count-down sessions only.
    anchor_end_ms: Option<i64>,
    /// Exact elapsed (count-up) or remaining (count-down) ms frozen at pause.
    paused_ms: Option<i64>,
    displayed_secs: i64,
    muted: bool,
    last_cue_second: Option<i64>,
    final_cue_fired: bool,
    completed: bool,
    /// Set by `start_next()`; consumed by the next exercise `configure()`.
    start_next_requested: bool,
    epoch: u64,
}

impl IntervalTimer {
    /// Create an idle timer on a count-up exercise session.
    pub fn new(
        settings: TimerSettings,
        clock: Arc<dyn Clock>,
        cues: Box<dyn CueDispatcher>,
    ) -> Self {
        let muted = !settings.cues_enabled;
        Self {
            settings,
            clock,
            cues,
            session: SessionConfig::exercise(0),
            run_state: RunState::Idle,
            countdown: None,
            anchor_start_ms: None,
            anchor_end_ms: None,
            paused_ms: None,
            displayed_secs: 0,
            muted,
            last_cue_second: None,
            final_cue_fired: false,
            completed: false,
            start_next_requested: false,
            epoch: 0,
        }
    }

    pub fn with_system_clock(settings: TimerSettings, cues: Box<dyn CueDispatcher>) -> Self {
        Self::new(settings, Arc::new(SystemClock), cues)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.session.mode
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Value of the pre-start countdown, if it is being shown.
    pub fn countdown(&self) -> Option<u8> {
        self.countdown
    }

    pub fn in_countdown(&self) -> bool {
        self.countdown.is_some()
    }

    /// Seconds as of the last tick or control operation. Negative in rest
    /// overtime.
    pub fn displayed_secs(&self) -> i64 {
        self.displayed_secs
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_count_up(&self) -> bool {
        self.session.is_count_up()
    }

    pub fn is_overtime(&self) -> bool {
        self.session.mode == TimerMode::Rest && self.displayed_secs < 0
    }

    /// 0.0 .. 100.0 ring fill for count-downs.
    pub fn progress_pct(&self) -> Option<f64> {
        let total = self.session.configured_secs();
        if self.is_count_up() || total == 0 {
            return None;
        }
        Some((self.displayed_secs as f64 / total as f64 * 100.0).max(0.0))
    }

    /// The one recurring callback the host must currently run.
    pub fn active_schedule(&self) -> Option<ScheduleToken> {
        let kind = if self.countdown.is_some() {
            ScheduleKind::Countdown
        } else if self.run_state == RunState::Running {
            ScheduleKind::Tick
        } else {
            return None;
        };
        Some(ScheduleToken {
            kind,
            epoch: self.epoch,
        })
    }

    /// Period for a schedule kind, in milliseconds.
    pub fn period_ms(&self, kind: ScheduleKind) -> u64 {
        match kind {
            ScheduleKind::Tick => self.settings.tick_interval_ms.max(1),
            ScheduleKind::Countdown => 1000,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.session.mode,
            run_state: self.run_state,
            countdown: self.countdown,
            seconds: self.displayed_secs,
            duration_secs: self.session.configured_secs(),
            progress_pct: self.progress_pct(),
            muted: self.muted,
            at: self.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the session. Cancels every outstanding schedule.
    ///
    /// Rest sessions start immediately. Exercise sessions start (with the
    /// countdown) when `auto_start` is set or the previous rest ended through
    /// `start_next()`.
    pub fn configure(&mut self, session: SessionConfig) -> Vec<Event> {
        self.cancel_schedules();
        let start_next = std::mem::take(&mut self.start_next_requested);
        if let Some(enabled) = session.cues_enabled {
            self.muted = !enabled;
        }
        self.session = session;
        self.clear_run();
        tracing::debug!(
            mode = ?self.session.mode,
            duration_secs = self.session.configured_secs(),
            "timer session configured"
        );

        let mut events = vec![Event::SessionConfigured {
            mode: self.session.mode,
            duration_secs: self.session.configured_secs(),
            count_up: self.is_count_up(),
            at: self.now(),
        }];
        let auto_start = match self.session.mode {
            TimerMode::Rest => true,
            TimerMode::Exercise => self.session.auto_start || start_next,
            TimerMode::Complete => false,
        };
        if auto_start {
            events.extend(self.start());
        }
        events
    }

    /// Start from `Idle`. Exercise sets enter the 3-2-1 countdown first.
    pub fn start(&mut self) -> Option<Event> {
        if self.run_state != RunState::Idle || self.countdown.is_some() || self.completed {
            return None;
        }
        match self.session.mode {
            TimerMode::Complete => None,
            TimerMode::Exercise => {
                self.reset_cue_tracking();
                self.displayed_secs = 0;
                let from = self.settings.countdown_from.max(1);
                self.countdown = Some(from);
                self.epoch += 1;
                if !self.muted {
                    self.cue(Cue::Countdown, None);
                }
                Some(Event::CountdownTick {
                    value: from,
                    at: self.now(),
                })
            }
            TimerMode::Rest => {
                self.reset_cue_tracking();
                Some(self.begin_running())
            }
        }
    }

    /// Pause when running, resume when paused, start when idle.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.countdown.is_some() {
            return None;
        }
        match self.run_state {
            RunState::Running => {
                let now = self.clock.now_ms();
                let captured = if self.is_count_up() {
                    self.elapsed_ms(now).max(0)
                } else {
                    self.remaining_ms(now)
                };
                self.paused_ms = Some(captured);
                self.displayed_secs = self.secs_from_ms(captured);
                self.run_state = RunState::Paused;
                self.cancel_schedules();
                tracing::debug!(seconds = self.displayed_secs, "timer paused");
                Some(Event::TimerPaused {
                    seconds: self.displayed_secs,
                    at: self.now(),
                })
            }
            RunState::Paused => {
                let now = self.clock.now_ms();
                let captured = self
                    .paused_ms
                    .take()
                    .unwrap_or(self.displayed_secs * 1000);
                if self.is_count_up() {
                    self.anchor_start_ms = Some(now - captured);
                } else {
                    let total_ms = self.session.configured_secs() as i64 * 1000;
                    self.anchor_start_ms = Some(now - (total_ms - captured));
                    self.anchor_end_ms = Some(now + captured);
                }
                self.run_state = RunState::Running;
                self.epoch += 1;
                tracing::debug!(seconds = self.displayed_secs, "timer resumed");
                Some(Event::TimerResumed {
                    seconds: self.displayed_secs,
                    at: self.now(),
                })
            }
            RunState::Idle => self.start(),
        }
    }

    /// Back to `Idle` with the mode's default display. Mode and durations are
    /// kept; a completed run is re-armed.
    pub fn reset(&mut self) -> Option<Event> {
        self.cancel_schedules();
        self.start_next_requested = false;
        self.clear_run();
        Some(Event::TimerReset {
            seconds: self.displayed_secs,
            at: self.now(),
        })
    }

    /// Mark the exercise set done now, whatever the timer shows.
    pub fn complete_now(&mut self) -> Option<Event> {
        if self.session.mode != TimerMode::Exercise {
            return None;
        }
        self.finish(true)
    }

    /// End a rest interval and ask the next exercise session to auto-start.
    pub fn start_next(&mut self) -> Option<Event> {
        if self.session.mode != TimerMode::Rest || self.completed {
            return None;
        }
        self.start_next_requested = true;
        self.finish(true)
    }

    pub fn toggle_mute(&mut self) -> Option<Event> {
        self.muted = !self.muted;
        Some(Event::MuteToggled {
            muted: self.muted,
            at: self.now(),
        })
    }

    /// Run one scheduled callback. Tokens from a cancelled schedule are
    /// ignored.
    pub fn fire(&mut self, token: ScheduleToken) -> Vec<Event> {
        if self.active_schedule() != Some(token) {
            tracing::debug!(?token, epoch = self.epoch, "ignoring stale schedule token");
            return Vec::new();
        }
        match token.kind {
            ScheduleKind::Countdown => self.advance_countdown(),
            ScheduleKind::Tick => self.process_tick(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance_countdown(&mut self) -> Vec<Event> {
        let Some(value) = self.countdown else {
            return Vec::new();
        };
        if value <= 1 {
            self.countdown = None;
            let started = self.begin_running();
            return vec![started, self.tick_event()];
        }
        let next = value - 1;
        self.countdown = Some(next);
        if !self.muted {
            self.cue(Cue::Countdown, None);
        }
        vec![Event::CountdownTick {
            value: next,
            at: self.now(),
        }]
    }

    fn process_tick(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();

        if self.is_count_up() {
            self.displayed_secs = self.elapsed_ms(now).max(0).div_euclid(1000);
            return vec![self.tick_event()];
        }

        let secs = ceil_secs(self.remaining_ms(now));
        self.displayed_secs = secs;

        if TICK_CUE_WINDOW.contains(&secs) && self.last_cue_second != Some(secs) && !self.muted {
            let haptic = self.haptic(self.settings.tick_vibration_ms);
            self.cue(Cue::Tick, haptic);
            self.last_cue_second = Some(secs);
        }
        if secs == 0 && !self.final_cue_fired && !self.muted {
            let haptic = self.haptic(self.settings.final_vibration_ms);
            self.cue(Cue::FinalTick, haptic);
            self.final_cue_fired = true;
        }

        let mut events = vec![self.tick_event()];
        if secs <= 0 && self.session.mode == TimerMode::Exercise {
            events.extend(self.finish(false));
        }
        events
    }

    fn begin_running(&mut self) -> Event {
        let now = self.clock.now_ms();
        let total = self.session.configured_secs();
        self.anchor_start_ms = Some(now);
        if self.is_count_up() {
            self.anchor_end_ms = None;
            self.displayed_secs = 0;
        } else {
            self.anchor_end_ms = Some(now + total as i64 * 1000);
            self.displayed_secs = total as i64;
        }
        self.paused_ms = None;
        self.run_state = RunState::Running;
        self.epoch += 1;
        tracing::debug!(mode = ?self.session.mode, duration_secs = total, "timer running");
        Event::TimerStarted {
            mode: self.session.mode,
            duration_secs: total,
            count_up: self.is_count_up(),
            at: self.now(),
        }
    }

    fn finish(&mut self, manual: bool) -> Option<Event> {
        if self.completed {
            return None;
        }
        self.cancel_schedules();
        self.completed = true;
        self.countdown = None;
        self.paused_ms = None;
        self.run_state = RunState::Idle;
        tracing::debug!(mode = ?self.session.mode, manual, "interval completed");
        Some(Event::IntervalCompleted {
            mode: self.session.mode,
            seconds: self.displayed_secs,
            manual,
            at: self.now(),
        })
    }

    fn clear_run(&mut self) {
        self.run_state = RunState::Idle;
        self.countdown = None;
        self.anchor_start_ms = None;
        self.anchor_end_ms = None;
        self.paused_ms = None;
        self.completed = false;
        self.reset_cue_tracking();
        self.displayed_secs = match self.session.mode {
            TimerMode::Rest => self.session.rest_secs() as i64,
            TimerMode::Exercise | TimerMode::Complete => 0,
        };
    }

    fn reset_cue_tracking(&mut self) {
        self.last_cue_second = None;
        self.final_cue_fired = false;
    }

    fn cancel_schedules(&mut self) {
        self.epoch += 1;
    }

    fn elapsed_ms(&self, now: i64) -> i64 {
        now - self.anchor_start_ms.unwrap_or(now)
    }

    fn remaining_ms(&self, now: i64) -> i64 {
        self.anchor_end_ms.unwrap_or(now) - now
    }

    fn secs_from_ms(&self, ms: i64) -> i64 {
        if self.is_count_up() {
            ms.div_euclid(1000)
        } else {
            ceil_secs(ms)
        }
    }

    /// Event timestamp from the injected clock.
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.clock.now_ms()).unwrap_or_default()
    }

    fn tick_event(&self) -> Event {
        Event::Tick {
            seconds: self.displayed_secs,
            progress_pct: self.progress_pct(),
            at: self.now(),
        }
    }

    fn haptic(&self, ms: u32) -> Option<HapticPattern> {
        self.settings.vibration.then(|| HapticPattern::pulse(ms))
    }

    fn cue(&mut self, which: Cue, haptic: Option<HapticPattern>) {
        cue::fire_and_forget(self.cues.as_mut(), which, haptic.as_ref());
    }
}

/// `ceil(ms / 1000)` for signed milliseconds.
fn ceil_secs(ms: i64) -> i64 {
    -((-ms).div_euclid(1000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::cue::{CueRecord, RecordingCueDispatcher};

    fn timer() -> (IntervalTimer, ManualClock, RecordingCueDispatcher) {
        let clock = ManualClock::new(1_000_000);
        let cues = RecordingCueDispatcher::new();
        let timer = IntervalTimer::new(
            TimerSettings::default(),
            Arc::new(clock.clone()),
            Box::new(cues.clone()),
        );
        (timer, clock, cues)
    }

    /// Advance the clock by `ms` in `step`-sized ticks, firing the active
    /// schedule like a host would.
    fn run_for(timer: &mut IntervalTimer, clock: &ManualClock, ms: i64, step: i64) -> Vec<Event> {
        let mut events = Vec::new();
        let mut waited = 0;
        while waited < ms {
            clock.advance_ms(step);
            waited += step;
            if let Some(token) = timer.active_schedule() {
                events.extend(timer.fire(token));
            }
        }
        events
    }

    fn finish_countdown(timer: &mut IntervalTimer, clock: &ManualClock) {
        for _ in 0..3 {
            clock.advance_ms(1000);
            let token = timer.active_schedule().unwrap();
            assert_eq!(token.kind, ScheduleKind::Countdown);
            timer.fire(token);
        }
    }

    #[test]
    fn ceil_secs_handles_sign() {
        assert_eq!(ceil_secs(0), 0);
        assert_eq!(ceil_secs(1), 1);
        assert_eq!(ceil_secs(1000), 1);
        assert_eq!(ceil_secs(1001), 2);
        assert_eq!(ceil_secs(-1), 0);
        assert_eq!(ceil_secs(-999), 0);
        assert_eq!(ceil_secs(-1000), -1);
        assert_eq!(ceil_secs(-5000), -5);
    }

    #[test]
    fn new_timer_is_idle_without_schedule() {
        let (timer, _, _) = timer();
        assert_eq!(timer.run_state(), RunState::Idle);
        assert_eq!(timer.active_schedule(), None);
        assert!(!timer.is_muted());
    }

    #[test]
    fn exercise_configure_stays_idle() {
        let (mut timer, _, _) = timer();
        let events = timer.configure(SessionConfig::exercise(30));
        assert_eq!(events.len(), 1);
        assert_eq!(timer.run_state(), RunState::Idle);
        assert_eq!(timer.displayed_secs(), 0);
    }

    #[test]
    fn rest_configure_auto_starts() {
        let (mut timer, _, _) = timer();
        let events = timer.configure(SessionConfig::rest(45));
        assert!(matches!(events[1], Event::TimerStarted { duration_secs: 45, .. }));
        assert_eq!(timer.run_state(), RunState::Running);
        assert_eq!(timer.displayed_secs(), 45);
        assert_eq!(timer.active_schedule().unwrap().kind, ScheduleKind::Tick);
    }

    #[test]
    fn countdown_fires_first_cue_immediately() {
        let (mut timer, clock, cues) = timer();
        timer.configure(SessionConfig::exercise(0));
        let event = timer.start().unwrap();
        assert!(matches!(event, Event::CountdownTick { value: 3, .. }));
        assert_eq!(cues.played(), vec![Cue::Countdown]);

        clock.advance_ms(1000);
        let events = timer.fire(timer.active_schedule().unwrap());
        assert!(matches!(events[0], Event::CountdownTick { value: 2, .. }));
        assert_eq!(cues.played().len(), 2);
    }

    #[test]
    fn start_is_noop_when_not_idle() {
        let (mut timer, clock, _) = timer();
        timer.configure(SessionConfig::exercise(0));
        timer.start();
        assert!(timer.start().is_none());
        finish_countdown(&mut timer, &clock);
        assert_eq!(timer.run_state(), RunState::Running);
        assert!(timer.start().is_none());
    }

    #[test]
    fn toggle_during_countdown_is_noop() {
        let (mut timer, _, _) = timer();
        timer.configure(SessionConfig::exercise(10));
        timer.start();
        assert!(timer.toggle().is_none());
        assert_eq!(timer.countdown(), Some(3));
    }

    #[test]
    fn toggle_when_idle_starts() {
        let (mut timer, _, _) = timer();
        timer.configure(SessionConfig::exercise(10));
        assert!(matches!(timer.toggle(), Some(Event::CountdownTick { .. })));
    }

    #[test]
    fn count_up_pause_resume_scenario() {
        let (mut timer, clock, _) = timer();
        timer.configure(SessionConfig::exercise(0));
        timer.start();
        finish_countdown(&mut timer, &clock);

        run_for(&mut timer, &clock, 5000, 100);
        assert_eq!(timer.displayed_secs(), 5);

        assert!(matches!(timer.toggle(), Some(Event::TimerPaused { seconds: 5, .. })));
        clock.advance_secs(10);
        assert_eq!(timer.active_schedule(), None);
        assert!(matches!(timer.toggle(), Some(Event::TimerResumed { seconds: 5, .. })));

        let events = run_for(&mut timer, &clock, 100, 100);
        assert_eq!(events[0].seconds(), Some(5));
        run_for(&mut timer, &clock, 900, 100);
        assert_eq!(timer.displayed_secs(), 6);
    }

    #[test]
    fn pause_keeps_sub_second_precision() {
        let (mut timer, clock, _) = timer();
        timer.configure(SessionConfig::rest(10));
        clock.advance_ms(2_400);
        timer.toggle();
        assert_eq!(timer.displayed_secs(), 8);
        clock.advance_secs(30);
        timer.toggle();
        // 7.6s were left at pause; after 600ms more, 7s remain.
        run_for(&mut timer, &clock, 600, 600);
        assert_eq!(timer.displayed_secs(), 7);
    }

    #[test]
    fn rest_goes_into_overtime_without_completing() {
        let (mut timer, clock, _) = timer();
        timer.configure(SessionConfig::rest(60));
        let events = run_for(&mut timer, &clock, 65_000, 100);
        assert_eq!(timer.displayed_secs(), -5);
        assert!(timer.is_overtime());
        assert!(!events.iter().any(Event::is_completion));
        assert_eq!(timer.progress_pct(), Some(0.0));
    }

    #[test]
    fn exercise_countdown_completes_once() {
        let (mut timer, clock, _) = timer();
        timer.configure(SessionConfig::exercise(5));
        timer.start();
        finish_countdown(&mut timer, &clock);
        let events = run_for(&mut timer, &clock, 7_000, 100);
        let completions = events.iter().filter(|e| e.is_completion()).count();
        assert_eq!(completions, 1);
        assert!(timer.is_completed());
        assert!(timer.complete_now().is_none());
        assert_eq!(timer.active_schedule(), None);
    }

    #[test]
    fn complete_now_does_not_double_fire() {
        let (mut timer, _, _) = timer();
        timer.configure(SessionConfig::exercise(0));
        timer.start();
        assert!(matches!(
            timer.complete_now(),
            Some(Event::IntervalCompleted { manual: true, .. })
        ));
        assert!(timer.complete_now().is_none());
        assert!(!timer.in_countdown());
    }

    #[test]
    fn complete_now_ignored_in_rest() {
        let (mut timer, _, _) = timer();
        timer.configure(SessionConfig::rest(30));
        assert!(timer.complete_now().is_none());
        assert_eq!(timer.run_state(), RunState::Running);
    }

    #[test]
    fn start_next_auto_starts_following_exercise() {
        let (mut timer, _, _) = timer();
        timer.configure(SessionConfig::rest(30));
        assert!(timer.start_next().unwrap().is_completion());
        assert!(timer.start_next().is_none());

        let events = timer.configure(SessionConfig::exercise(0));
        assert!(matches!(events[1], Event::CountdownTick { value: 3, .. }));

        // The request is consumed.
        let events = timer.configure(SessionConfig::exercise(0));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn reset_after_start_next_drops_auto_start() {
        let (mut timer, _, _) = timer();
        timer.configure(SessionConfig::rest(30));
        timer.start_next();
        timer.reset();

        let events = timer.configure(SessionConfig::exercise(0));
        assert_eq!(events.len(), 1);
        assert!(!timer.in_countdown());
        assert_eq!(timer.run_state(), RunState::Idle);
    }

    #[test]
    fn event_timestamps_follow_injected_clock() {
        let (mut timer, clock, _) = timer();
        timer.configure(SessionConfig::rest(30));
        clock.advance_ms(2_500);
        let events = timer.fire(timer.active_schedule().unwrap());
        match &events[0] {
            Event::Tick { at, .. } => assert_eq!(at.timestamp_millis(), 1_002_500),
            other => panic!("Expected Tick, got {other:?}"),
        }
        match timer.toggle() {
            Some(Event::TimerPaused { at, .. }) => assert_eq!(at.timestamp_millis(), 1_002_500),
            other => panic!("Expected TimerPaused, got {other:?}"),
        }
    }

    #[test]
    fn tick_cues_fire_once_per_second() {
        let (mut timer, clock, cues) = timer();
        timer.configure(SessionConfig::rest(5));
        run_for(&mut timer, &clock, 6_000, 100);
        let played = cues.played();
        assert_eq!(played.iter().filter(|c| **c == Cue::Tick).count(), 3);
        assert_eq!(played.iter().filter(|c| **c == Cue::FinalTick).count(), 1);
        assert!(cues
            .records()
            .contains(&CueRecord::Vibrated(HapticPattern::pulse(200))));
    }

    #[test]
    fn muted_session_plays_nothing() {
        let (mut timer, clock, cues) = timer();
        timer.configure(SessionConfig::exercise(3).with_cues(false));
        timer.start();
        finish_countdown(&mut timer, &clock);
        run_for(&mut timer, &clock, 4_000, 100);
        assert!(cues.records().is_empty());
    }

    #[test]
    fn toggle_mute_takes_effect_on_next_tick() {
        let (mut timer, clock, cues) = timer();
        timer.configure(SessionConfig::rest(4));
        run_for(&mut timer, &clock, 500, 100);
        timer.toggle_mute();
        run_for(&mut timer, &clock, 3_000, 100);
        assert!(cues.played().is_empty());
        timer.toggle_mute();
        // 1s left: the tick for 1 was never played, so it still fires.
        run_for(&mut timer, &clock, 600, 100);
        assert_eq!(cues.played(), vec![Cue::Tick, Cue::FinalTick]);
    }

    #[test]
    fn mute_survives_configure_without_override() {
        let (mut timer, _, _) = timer();
        timer.toggle_mute();
        timer.configure(SessionConfig::rest(10));
        assert!(timer.is_muted());
        timer.configure(SessionConfig::rest(10).with_cues(true));
        assert!(!timer.is_muted());
    }

    #[test]
    fn reset_restores_mode_default() {
        let (mut timer, clock, _) = timer();
        timer.configure(SessionConfig::rest(30));
        run_for(&mut timer, &clock, 4_000, 100);
        assert!(matches!(timer.reset(), Some(Event::TimerReset { seconds: 30, .. })));
        assert_eq!(timer.run_state(), RunState::Idle);
        assert_eq!(timer.active_schedule(), None);

        timer.configure(SessionConfig::exercise(20));
        timer.start();
        timer.reset();
        assert!(!timer.in_countdown());
        assert_eq!(timer.displayed_secs(), 0);
    }

    #[test]
    fn stale_token_is_ignored() {
        let (mut timer, clock, _) = timer();
        timer.configure(SessionConfig::rest(30));
        let old = timer.active_schedule().unwrap();
        timer.configure(SessionConfig::exercise(0));
        clock.advance_secs(5);
        assert!(timer.fire(old).is_empty());
        assert_eq!(timer.displayed_secs(), 0);
    }

    #[test]
    fn complete_mode_is_inert() {
        let (mut timer, _, _) = timer();
        timer.configure(SessionConfig::complete());
        assert!(timer.start().is_none());
        assert!(timer.toggle().is_none());
        assert!(timer.complete_now().is_none());
        assert_eq!(timer.active_schedule(), None);
    }

    #[test]
    fn backwards_clock_jump_clamps_count_up() {
        let (mut timer, clock, _) = timer();
        timer.configure(SessionConfig::exercise(0));
        timer.start();
        finish_countdown(&mut timer, &clock);
        clock.advance_ms(-60_000);
        run_for(&mut timer, &clock, 100, 100);
        assert_eq!(timer.displayed_secs(), 0);
    }

    #[test]
    fn snapshot_reflects_state() {
        let (mut timer, _, _) = timer();
        timer.configure(SessionConfig::rest(40));
        match timer.snapshot() {
            Event::StateSnapshot {
                mode,
                run_state,
                seconds,
                progress_pct,
                ..
            } => {
                assert_eq!(mode, TimerMode::Rest);
                assert_eq!(run_state, RunState::Running);
                assert_eq!(seconds, 40);
                assert_eq!(progress_pct, Some(100.0));
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
