//! Sample-and-hold rate bridge
//!
//! The converter feeding this chain may be limited to a lower sampling
//! rate than the one the carrier is generated at. The bridge holds the
//! last (filtered) input sample for `hold_factor` output ticks and only
//! re-reads the input on every `hold_factor`-th tick.
//!
//! Input buffers are delivered at the output cadence, one slot per output
//! frame. With `hold_factor > 1` only the slot that lands on a refresh
//! tick is read; the others are ignored. The countdown runs continuously
//! across block boundaries.

#[cfg(not(feature = "std"))]
use micromath::F32Ext;

use crate::config::RATE_TOLERANCE;

/// Integer hold factor bridging `input_hz` up to `output_hz`
///
/// Returns `None` when the ratio is not within [`RATE_TOLERANCE`] of a
/// positive integer; such rates cannot be bridged by sample-and-hold.
#[must_use]
pub fn hold_factor_for(output_hz: f32, input_hz: f32) -> Option<u32> {
    if !(output_hz > 0.0 && input_hz > 0.0) {
        return None;
    }
    let ratio = output_hz / input_hz;
    let nearest = ratio.round();
    if nearest < 1.0 || (ratio - nearest).abs() > RATE_TOLERANCE * nearest {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(nearest as u32)
}

/// Sample-and-hold decimator
#[derive(Clone, Copy, Debug)]
pub struct RateBridge {
    /// Last refreshed sample
    held: f32,
    /// Ticks left before the next refresh
    countdown: u32,
    /// Output ticks per input sample (>= 1)
    hold_factor: u32,
}

impl RateBridge {
    /// Create a bridge with an explicit hold factor (0 is treated as 1)
    #[must_use]
    pub const fn new(hold_factor: u32) -> Self {
        Self {
            held: 0.0,
            countdown: 0,
            hold_factor: if hold_factor == 0 { 1 } else { hold_factor },
        }
    }

    /// Create a bridge for the given output and input rates
    ///
    /// Falls back to a hold factor of 1 (rates assumed equal) when the
    /// ratio is not close to an integer.
    #[must_use]
    pub fn for_rates(output_hz: f32, input_hz: f32) -> Self {
        Self::new(hold_factor_for(output_hz, input_hz).unwrap_or(1))
    }

    /// Advance one output tick, returning the held sample
    ///
    /// `None` means no input source is connected: the held value is forced
    /// to silence instead of repeating stale energy.
    #[inline]
    pub fn tick(&mut self, source: Option<f32>) -> f32 {
        self.tick_with(source, |x| x)
    }

    /// Advance one output tick, running `shape` on refresh ticks only
    ///
    /// `shape` is the input-rate filter path; it sees exactly one sample
    /// per input period.
    #[inline]
    pub fn tick_with<F>(&mut self, source: Option<f32>, shape: F) -> f32
    where
        F: FnOnce(f32) -> f32,
    {
        let refresh = self.countdown == 0;
        if refresh {
            self.countdown = self.hold_factor - 1;
        } else {
            self.countdown -= 1;
        }

        match source {
            Some(x) if refresh => self.held = shape(x),
            Some(_) => {}
            None => self.held = 0.0,
        }
        self.held
    }

    /// Output ticks per input sample
    #[must_use]
    pub fn hold_factor(&self) -> u32 {
        self.hold_factor
    }

    /// Currently held sample
    #[must_use]
    pub fn held(&self) -> f32 {
        self.held
    }

    /// Clear the held value and re-arm the first-tick refresh
    pub fn reset(&mut self) {
        self.held = 0.0;
        self.countdown = 0;
    }
}

impl Default for RateBridge {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_factor_within_tolerance() {
        assert_eq!(hold_factor_for(96_000.0, 96_000.0), Some(1));
        assert_eq!(hold_factor_for(96_000.0, 48_000.0), Some(2));
        assert_eq!(hold_factor_for(192_000.0, 48_000.0), Some(4));
        // 96000 / 47800 = 2.0084, within 1% of 2
        assert_eq!(hold_factor_for(96_000.0, 47_800.0), Some(2));
    }

    #[test]
    fn hold_factor_outside_tolerance() {
        // 96000 / 44100 = 2.177
        assert_eq!(hold_factor_for(96_000.0, 44_100.0), None);
        assert_eq!(hold_factor_for(96_000.0, 0.0), None);
        assert_eq!(RateBridge::for_rates(96_000.0, 44_100.0).hold_factor(), 1);
    }

    #[test]
    fn zero_hold_factor_clamped() {
        assert_eq!(RateBridge::new(0).hold_factor(), 1);
    }

    #[test]
    fn shape_runs_only_on_refresh() {
        let mut bridge = RateBridge::new(3);
        let mut calls = 0;
        for x in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0] {
            bridge.tick_with(Some(x), |v| {
                calls += 1;
                v * 10.0
            });
        }
        assert_eq!(calls, 2);
        assert_eq!(bridge.held(), 40.0);
    }
}
