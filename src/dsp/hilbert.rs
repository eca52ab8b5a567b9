//! Hilbert Transformer
//!
//! Linear-phase FIR approximating a 90° phase shift, used to build the
//! quadrature component for single-sideband style modulation.
//!
//! The kernel is the ideal discrete Hilbert response, `2 / (π·k)` at odd
//! offsets `k` from the center tap and zero elsewhere, apodized by a
//! four-term Blackman-Harris window. For an `N`-tap transformer the output
//! is delayed by `(N - 1) / 2` samples; [`HilbertTransformer::process_iq`]
//! returns the direct signal with the same delay so the pair lines up.

use core::f32::consts::PI;
#[cfg(not(feature = "std"))]
use micromath::F32Ext;

use crate::types::IqSample;

/// Four-term Blackman-Harris window coefficients
const BLACKMAN_HARRIS: [f32; 4] = [0.358_75, 0.488_29, 0.141_28, 0.011_68];

/// Fixed-length Hilbert FIR with its own delay line
///
/// `N` must be odd so the center tap falls on a sample.
#[derive(Clone, Debug)]
pub struct HilbertTransformer<const N: usize> {
    /// Antisymmetric coefficient table, computed once
    coeffs: [f32; N],
    /// Filter delay line
    delay: [f32; N],
    /// Index of the newest sample
    pos: usize,
}

impl<const N: usize> HilbertTransformer<N> {
    const ODD_TAPS: () = assert!(N % 2 == 1 && N >= 3, "Hilbert transformer needs an odd tap count >= 3");

    /// Center tap index, also the group delay in samples
    pub const CENTER: usize = (N - 1) / 2;

    /// Create a transformer with a zeroed delay line
    #[must_use]
    pub fn new() -> Self {
        let () = Self::ODD_TAPS;
        Self {
            coeffs: Self::design(),
            delay: [0.0; N],
            pos: 0,
        }
    }

    /// Windowed ideal Hilbert kernel
    ///
    /// Only the right half is evaluated; the left half is its exact
    /// negation, so antisymmetry does not depend on the accuracy of `cos`.
    #[allow(clippy::cast_precision_loss)]
    fn design() -> [f32; N] {
        let mut coeffs = [0.0f32; N];
        let center = Self::CENTER;
        let span = (N - 1) as f32;

        for k in (1..=center).step_by(2) {
            let n = (center + k) as f32;
            let x = 2.0 * PI * n / span;
            let window = BLACKMAN_HARRIS[0] - BLACKMAN_HARRIS[1] * x.cos()
                + BLACKMAN_HARRIS[2] * (2.0 * x).cos()
                - BLACKMAN_HARRIS[3] * (3.0 * x).cos();
            let tap = 2.0 / (PI * k as f32) * window;
            coeffs[center + k] = tap;
            coeffs[center - k] = -tap;
        }
        coeffs
    }

    /// Insert a sample and return the quadrature output
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.pos = if self.pos + 1 == N { 0 } else { self.pos + 1 };
        self.delay[self.pos] = input;

        // coeffs[m] weights x[n - m]
        let mut output = 0.0;
        let mut idx = self.pos;
        for &coeff in &self.coeffs {
            output += self.delay[idx] * coeff;
            idx = if idx == 0 { N - 1 } else { idx - 1 };
        }
        output
    }

    /// Insert a sample and return the delayed direct signal (I) and its
    /// Hilbert transform (Q)
    #[inline]
    pub fn process_iq(&mut self, input: f32) -> IqSample {
        let q = self.process(input);
        let i = self.delay[(self.pos + N - Self::CENTER) % N];
        IqSample::new(i, q)
    }

    /// Coefficient table in convolution order
    #[must_use]
    pub fn coefficients(&self) -> &[f32; N] {
        &self.coeffs
    }

    /// Group delay in samples
    #[must_use]
    pub const fn delay(&self) -> usize {
        Self::CENTER
    }

    /// Reset transform state
    pub fn reset(&mut self) {
        self.delay.fill(0.0);
        self.pos = 0;
    }
}

impl<const N: usize> Default for HilbertTransformer<N> {
    fn default() -> Self {
        Self::new()
    }
}
