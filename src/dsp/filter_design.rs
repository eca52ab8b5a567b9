//! Filter Design Module
//!
//! Provides coefficient calculation for the biquad stages used in the
//! modulation chain. All calculations are done at initialization, never
//! during real-time audio processing.
//!
//! # Supported Filter Types
//!
//! - Low-pass and high-pass (band limiting around the carrier)
//! - Peaking EQ (bass/mid voicing of the baseband)
//! - Low-shelf and high-shelf (pre-emphasis)
//!
//! All designs use the analog-prototype bilinear-transform formulas from
//! the RBJ audio EQ cookbook, normalized so that `a0 == 1`.

use core::f32::consts::PI;

#[cfg(not(feature = "std"))]
use micromath::F32Ext;

use crate::types::{ConfigError, SampleRate};

/// Biquad filter coefficients
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiquadCoeffs {
    /// Numerator coefficient b0
    pub b0: f32,
    /// Numerator coefficient b1
    pub b1: f32,
    /// Numerator coefficient b2
    pub b2: f32,
    /// Denominator coefficient a1 (note: a0 is normalized to 1)
    pub a1: f32,
    /// Denominator coefficient a2
    pub a2: f32,
}

impl BiquadCoeffs {
    /// Unity (pass-through) coefficients
    pub const UNITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Design a low-pass filter
    ///
    /// # Arguments
    /// * `fs` - Sample rate in Hz
    /// * `fc` - Cutoff frequency in Hz
    /// * `q` - Quality factor (0.707 for Butterworth)
    #[must_use]
    pub fn lowpass(fs: f32, fc: f32, q: f32) -> Self {
        let (sin_omega, cos_omega) = omega(fs, fc);
        let alpha = sin_omega / (2.0 * q);

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// Design a high-pass filter
    ///
    /// # Arguments
    /// * `fs` - Sample rate in Hz
    /// * `fc` - Cutoff frequency in Hz
    /// * `q` - Quality factor (0.707 for Butterworth)
    #[must_use]
    pub fn highpass(fs: f32, fc: f32, q: f32) -> Self {
        let (sin_omega, cos_omega) = omega(fs, fc);
        let alpha = sin_omega / (2.0 * q);

        let b0 = (1.0 + cos_omega) / 2.0;
        let b1 = -(1.0 + cos_omega);
        let b2 = (1.0 + cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// Design a peaking EQ filter
    ///
    /// # Arguments
    /// * `fs` - Sample rate in Hz
    /// * `fc` - Center frequency in Hz
    /// * `q` - Quality factor
    /// * `gain_db` - Gain at center frequency in dB
    #[must_use]
    pub fn peaking(fs: f32, fc: f32, q: f32, gain_db: f32) -> Self {
        let (sin_omega, cos_omega) = omega(fs, fc);
        let a = shelf_amplitude(gain_db);
        let alpha = sin_omega / (2.0 * q);

        let b0 = 1.0 + alpha * a;
        let b1 = -2.0 * cos_omega;
        let b2 = 1.0 - alpha * a;
        let a0 = 1.0 + alpha / a;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha / a;

        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// Design a low-shelf filter
    ///
    /// # Arguments
    /// * `fs` - Sample rate in Hz
    /// * `fc` - Corner frequency in Hz
    /// * `q` - Shelf quality factor (0.707 gives the steepest monotonic slope)
    /// * `gain_db` - Shelf gain in dB
    #[must_use]
    pub fn low_shelf(fs: f32, fc: f32, q: f32, gain_db: f32) -> Self {
        let (sin_omega, cos_omega) = omega(fs, fc);
        let a = shelf_amplitude(gain_db);
        let beta = 2.0 * a.sqrt() * (sin_omega / (2.0 * q));

        let b0 = a * ((a + 1.0) - (a - 1.0) * cos_omega + beta);
        let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega);
        let b2 = a * ((a + 1.0) - (a - 1.0) * cos_omega - beta);
        let a0 = (a + 1.0) + (a - 1.0) * cos_omega + beta;
        let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega);
        let a2 = (a + 1.0) + (a - 1.0) * cos_omega - beta;

        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// Design a high-shelf filter
    ///
    /// # Arguments
    /// * `fs` - Sample rate in Hz
    /// * `fc` - Corner frequency in Hz
    /// * `q` - Shelf quality factor
    /// * `gain_db` - Shelf gain in dB
    #[must_use]
    pub fn high_shelf(fs: f32, fc: f32, q: f32, gain_db: f32) -> Self {
        let (sin_omega, cos_omega) = omega(fs, fc);
        let a = shelf_amplitude(gain_db);
        let beta = 2.0 * a.sqrt() * (sin_omega / (2.0 * q));

        let b0 = a * ((a + 1.0) + (a - 1.0) * cos_omega + beta);
        let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega);
        let b2 = a * ((a + 1.0) + (a - 1.0) * cos_omega - beta);
        let a0 = (a + 1.0) - (a - 1.0) * cos_omega + beta;
        let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_omega);
        let a2 = (a + 1.0) - (a - 1.0) * cos_omega - beta;

        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// Normalize coefficients by a0
    fn normalize(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Calculate magnitude response at a given frequency
    #[must_use]
    pub fn magnitude_at(&self, freq: f32, fs: f32) -> f32 {
        let omega = 2.0 * PI * freq / fs;
        let (cos_w, sin_w) = (omega.cos(), omega.sin());
        let (cos_2w, sin_2w) = ((2.0 * omega).cos(), (2.0 * omega).sin());

        // Evaluate B and A at e^jw separately; expanding |A|^2 into a
        // single polynomial cancels catastrophically near DC in f32.
        let num_re = self.b0 + self.b1 * cos_w + self.b2 * cos_2w;
        let num_im = -(self.b1 * sin_w + self.b2 * sin_2w);
        let den_re = 1.0 + self.a1 * cos_w + self.a2 * cos_2w;
        let den_im = -(self.a1 * sin_w + self.a2 * sin_2w);

        let num = num_re * num_re + num_im * num_im;
        let den = den_re * den_re + den_im * den_im;

        if den > 0.0 && num > 0.0 {
            (num / den).sqrt()
        } else {
            0.0
        }
    }

    /// Calculate magnitude response in dB at a given frequency
    #[must_use]
    pub fn magnitude_db_at(&self, freq: f32, fs: f32) -> f32 {
        let mag = self.magnitude_at(freq, fs);
        if mag > 0.0 {
            20.0 * mag.log10()
        } else {
            -120.0
        }
    }
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        Self::UNITY
    }
}

/// `(sin ω0, cos ω0)` for a frequency at a sample rate
fn omega(fs: f32, fc: f32) -> (f32, f32) {
    let w0 = 2.0 * PI * fc / fs;
    (w0.sin(), w0.cos())
}

/// Square root of the linear gain, `A` in the cookbook formulas
fn shelf_amplitude(gain_db: f32) -> f32 {
    10.0_f32.powf(gain_db / 40.0)
}

/// One configured filter stage
///
/// Stages are plain data so a whole chain can be described in a
/// configuration constant and designed once the sample rate is known.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterSpec {
    /// Pass-through stage (disabled EQ slots)
    Identity,
    /// Low-pass at `freq` Hz
    Lowpass {
        /// Cutoff in Hz
        freq: f32,
        /// Quality factor
        q: f32,
    },
    /// High-pass at `freq` Hz
    Highpass {
        /// Cutoff in Hz
        freq: f32,
        /// Quality factor
        q: f32,
    },
    /// Peaking EQ centered at `freq` Hz
    Peaking {
        /// Center in Hz
        freq: f32,
        /// Quality factor
        q: f32,
        /// Gain at center in dB
        gain_db: f32,
    },
    /// Low shelf with corner at `freq` Hz
    LowShelf {
        /// Corner in Hz
        freq: f32,
        /// Quality factor
        q: f32,
        /// Shelf gain in dB
        gain_db: f32,
    },
    /// High shelf with corner at `freq` Hz
    HighShelf {
        /// Corner in Hz
        freq: f32,
        /// Quality factor
        q: f32,
        /// Shelf gain in dB
        gain_db: f32,
    },
}

impl FilterSpec {
    /// Butterworth quality factor (1/√2)
    pub const BUTTERWORTH_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

    /// Butterworth low-pass stage
    #[must_use]
    pub const fn butterworth_lowpass(freq: f32) -> Self {
        Self::Lowpass {
            freq,
            q: Self::BUTTERWORTH_Q,
        }
    }

    /// Butterworth high-pass stage
    #[must_use]
    pub const fn butterworth_highpass(freq: f32) -> Self {
        Self::Highpass {
            freq,
            q: Self::BUTTERWORTH_Q,
        }
    }

    /// Check the designer's preconditions for this stage at `fs`
    ///
    /// # Errors
    /// Returns the first violated precondition: frequency outside
    /// (0, Nyquist), non-positive Q or a non-finite gain.
    pub fn validate(&self, fs: SampleRate) -> Result<(), ConfigError> {
        let (freq, q, gain_db) = match *self {
            Self::Identity => return Ok(()),
            Self::Lowpass { freq, q } | Self::Highpass { freq, q } => (freq, q, 0.0),
            Self::Peaking { freq, q, gain_db }
            | Self::LowShelf { freq, q, gain_db }
            | Self::HighShelf { freq, q, gain_db } => (freq, q, gain_db),
        };

        let nyquist = fs.nyquist();
        if !(freq > 0.0 && freq < nyquist) {
            return Err(ConfigError::FrequencyOutOfRange {
                frequency: freq,
                nyquist,
            });
        }
        if !(q.is_finite() && q > 0.0) {
            return Err(ConfigError::InvalidQ(q));
        }
        if !gain_db.is_finite() {
            return Err(ConfigError::InvalidGain(gain_db));
        }
        Ok(())
    }

    /// Design normalized coefficients for this stage at `fs`
    ///
    /// Callers are expected to have run [`FilterSpec::validate`] first.
    #[must_use]
    pub fn design(&self, fs: SampleRate) -> BiquadCoeffs {
        let fs = fs.as_hz();
        match *self {
            Self::Identity => BiquadCoeffs::UNITY,
            Self::Lowpass { freq, q } => BiquadCoeffs::lowpass(fs, freq, q),
            Self::Highpass { freq, q } => BiquadCoeffs::highpass(fs, freq, q),
            Self::Peaking { freq, q, gain_db } => BiquadCoeffs::peaking(fs, freq, q, gain_db),
            Self::LowShelf { freq, q, gain_db } => BiquadCoeffs::low_shelf(fs, freq, q, gain_db),
            Self::HighShelf { freq, q, gain_db } => BiquadCoeffs::high_shelf(fs, freq, q, gain_db),
        }
    }
}

#[cfg(defmt_log)]
impl defmt::Format for FilterSpec {
    fn format(&self, f: defmt::Formatter) {
        match *self {
            Self::Identity => defmt::write!(f, "identity"),
            Self::Lowpass { freq, q } => defmt::write!(f, "LP {} Hz Q{}", freq, q),
            Self::Highpass { freq, q } => defmt::write!(f, "HP {} Hz Q{}", freq, q),
            Self::Peaking { freq, q, gain_db } => {
                defmt::write!(f, "PK {} Hz Q{} {} dB", freq, q, gain_db);
            }
            Self::LowShelf { freq, q, gain_db } => {
                defmt::write!(f, "LS {} Hz Q{} {} dB", freq, q, gain_db);
            }
            Self::HighShelf { freq, q, gain_db } => {
                defmt::write!(f, "HS {} Hz Q{} {} dB", freq, q, gain_db);
            }
        }
    }
}
