//! Decoders that turn raw encoder/button levels into `InputEvent`s.
//!
//! These are pure state machines so they can be driven from a GPIO polling
//! thread on hardware and from plain tests everywhere else.

use std::time::Duration;

use crossbeam_channel as xch;
use whiskers_traits::{InputDevice, InputEvent, InputStatus};

/// Quadrature transition table indexed by `(prev << 2) | curr`, where each
/// state is `(a << 1) | b`. Invalid (double) transitions count as 0.
const QUAD_TABLE: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

/// Gray-code decoder for a detented rotary encoder.
#[derive(Debug, Clone)]
pub struct QuadratureDecoder {
    state: u8,
    accum: i8,
    steps_per_detent: i8,
}

impl QuadratureDecoder {
    /// `steps_per_detent` is 4 for common full-cycle encoders, 2 for half-cycle ones.
    pub fn new(a: bool, b: bool, steps_per_detent: u8) -> Self {
        Self {
            state: levels(a, b),
            accum: 0,
            steps_per_detent: steps_per_detent.clamp(1, 4) as i8,
        }
    }

    /// Feed the current pin levels; returns +1/-1 once a full detent is completed.
    pub fn update(&mut self, a: bool, b: bool) -> i32 {
        let next = levels(a, b);
        if next == self.state {
            return 0;
        }
        let idx = ((self.state << 2) | next) as usize;
        self.state = next;
        self.accum += QUAD_TABLE[idx];
        if self.accum >= self.steps_per_detent {
            self.accum = 0;
            1
        } else if self.accum <= -self.steps_per_detent {
            self.accum = 0;
            -1
        } else {
            0
        }
    }
}

#[inline]
fn levels(a: bool, b: bool) -> u8 {
    (u8::from(a) << 1) | u8::from(b)
}

/// Debounced push button that classifies releases as short or long presses.
#[derive(Debug, Clone)]
pub struct ButtonTracker {
    debounce_ms: u64,
    long_press_ms: u64,
    stable: bool,
    candidate: bool,
    candidate_since_ms: u64,
    pressed_at_ms: Option<u64>,
}

impl ButtonTracker {
    pub fn new(debounce_ms: u64, long_press_ms: u64) -> Self {
        Self {
            debounce_ms,
            long_press_ms,
            stable: false,
            candidate: false,
            candidate_since_ms: 0,
            pressed_at_ms: None,
        }
    }

    /// Whether the debounced level is currently "pressed".
    pub fn is_pressed(&self) -> bool {
        self.stable
    }

    /// Feed the (active-high) pressed level sampled at `now_ms`.
    pub fn update(&mut self, pressed: bool, now_ms: u64) -> Option<InputEvent> {
        if pressed != self.candidate {
            self.candidate = pressed;
            self.candidate_since_ms = now_ms;
        }
        if self.candidate == self.stable
            || now_ms.saturating_sub(self.candidate_since_ms) < self.debounce_ms
        {
            return None;
        }
        self.stable = self.candidate;
        if self.stable {
            self.pressed_at_ms = Some(self.candidate_since_ms);
            return None;
        }
        let since = self.pressed_at_ms.take()?;
        let held = self.candidate_since_ms.saturating_sub(since);
        if held >= self.long_press_ms {
            Some(InputEvent::LongPress)
        } else {
            Some(InputEvent::Press)
        }
    }
}

/// `InputDevice` fed from a channel, for producers running on their own
/// thread (GPIO poller, stdin reader, tests).
#[derive(Debug)]
pub struct ChannelInput {
    rx: xch::Receiver<InputEvent>,
}

/// Unbounded queue; events are tiny and the consumer drains them every poll.
pub fn input_channel() -> (xch::Sender<InputEvent>, ChannelInput) {
    let (tx, rx) = xch::unbounded();
    (tx, ChannelInput { rx })
}

impl InputDevice for ChannelInput {
    fn poll_event(&mut self, timeout: Duration) -> Result<InputEvent, InputStatus> {
        let res = if timeout.is_zero() {
            self.rx.try_recv().map_err(|e| e.is_disconnected())
        } else {
            self.rx.recv_timeout(timeout).map_err(|e| e.is_disconnected())
        };
        match res {
            Ok(ev) => Ok(ev),
            Err(true) => Err(InputStatus::Closed),
            Err(false) => Err(InputStatus::Idle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_input_reports_idle_then_closed() {
        let (tx, mut input) = input_channel();
        assert_eq!(input.poll_event(Duration::ZERO), Err(InputStatus::Idle));
        tx.send(InputEvent::Delta(3)).expect("send");
        tx.send(InputEvent::Press).expect("send");
        drop(tx);
        // Queued events are still delivered after the sender is gone.
        assert_eq!(input.poll_event(Duration::ZERO), Ok(InputEvent::Delta(3)));
        assert_eq!(input.poll_event(Duration::from_millis(5)), Ok(InputEvent::Press));
        assert_eq!(input.poll_event(Duration::from_millis(5)), Err(InputStatus::Closed));
    }

    // B rises first: 00 -> 01 -> 11 -> 10 -> 00
    const B_LEADS: [(bool, bool); 4] = [(false, true), (true, true), (true, false), (false, false)];
    // A rises first: 00 -> 10 -> 11 -> 01 -> 00
    const A_LEADS: [(bool, bool); 4] = [(true, false), (true, true), (false, true), (false, false)];

    #[test]
    fn full_cycle_is_one_detent_in_each_direction() {
        let mut dec = QuadratureDecoder::new(false, false, 4);
        let total: i32 = B_LEADS.iter().map(|&(a, b)| dec.update(a, b)).sum();
        assert_eq!(total, -1);
        let total: i32 = A_LEADS.iter().map(|&(a, b)| dec.update(a, b)).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn half_cycle_encoders_emit_every_two_steps() {
        let mut dec = QuadratureDecoder::new(false, false, 2);
        let deltas: Vec<i32> = A_LEADS.iter().map(|&(a, b)| dec.update(a, b)).collect();
        assert_eq!(deltas, vec![0, 1, 0, 1]);
    }

    #[test]
    fn bounce_on_one_edge_cancels_out() {
        let mut dec = QuadratureDecoder::new(false, false, 4);
        for _ in 0..10 {
            assert_eq!(dec.update(false, true), 0);
            assert_eq!(dec.update(false, false), 0);
        }
    }

    #[test]
    fn short_and_long_presses_are_classified_on_release() {
        let mut btn = ButtonTracker::new(5, 1000);
        assert_eq!(btn.update(true, 0), None);
        assert_eq!(btn.update(true, 10), None);
        assert!(btn.is_pressed());
        assert_eq!(btn.update(false, 200), None);
        assert_eq!(btn.update(false, 210), Some(InputEvent::Press));

        assert_eq!(btn.update(true, 1000), None);
        assert_eq!(btn.update(true, 1010), None);
        assert_eq!(btn.update(false, 2500), None);
        assert_eq!(btn.update(false, 2506), Some(InputEvent::LongPress));
    }

    #[test]
    fn glitch_shorter_than_debounce_is_ignored() {
        let mut btn = ButtonTracker::new(5, 1000);
        assert_eq!(btn.update(true, 0), None);
        assert_eq!(btn.update(false, 2), None);
        assert_eq!(btn.update(false, 20), None);
        assert!(!btn.is_pressed());
    }
}
