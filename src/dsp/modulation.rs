//! Modulation
//!
//! Combines the filtered baseband with the carrier. Supports suppressed
//! carrier (DSB-SC), carrier-present AM and an exploratory quadrature
//! (phasing-method SSB) combiner.

use super::hilbert::HilbertTransformer;
use crate::types::{ConfigError, IqSample};

/// How baseband and carrier are combined
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum ModulationScheme {
    /// `out = baseband × carrier`
    #[default]
    SuppressedCarrier,
    /// `out = (carrier_level + depth·gain·baseband) × carrier`
    CarrierPresent {
        /// Modulation floor in [0, 1]
        carrier_level: f32,
        /// Modulation depth
        depth: f32,
        /// Baseband gain applied before the depth scaling
        gain: f32,
    },
    /// `out = I·cos − Q·sin`, Q being the Hilbert transform of the baseband
    ///
    /// Exploratory: the combiner is the textbook phasing identity and has
    /// not been qualified against a transducer.
    Quadrature,
}

impl ModulationScheme {
    /// Carrier-present AM with unity baseband gain
    #[must_use]
    pub const fn am(carrier_level: f32, depth: f32) -> Self {
        Self::CarrierPresent {
            carrier_level,
            depth,
            gain: 1.0,
        }
    }

    /// Check the scheme parameters
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidModulation`] when the carrier level is
    /// outside [0, 1] or depth/gain are negative or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::SuppressedCarrier | Self::Quadrature => Ok(()),
            Self::CarrierPresent {
                carrier_level,
                depth,
                gain,
            } => {
                let level_ok = (0.0..=1.0).contains(&carrier_level);
                let depth_ok = depth.is_finite() && depth >= 0.0;
                if level_ok && depth_ok && gain.is_finite() {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidModulation)
                }
            }
        }
    }

    /// True if the scheme needs a quadrature carrier
    #[must_use]
    pub const fn is_quadrature(&self) -> bool {
        matches!(self, Self::Quadrature)
    }
}

#[cfg(defmt_log)]
impl defmt::Format for ModulationScheme {
    fn format(&self, f: defmt::Formatter) {
        match *self {
            Self::SuppressedCarrier => defmt::write!(f, "DSB-SC"),
            Self::CarrierPresent {
                carrier_level,
                depth,
                gain,
            } => defmt::write!(f, "AM level={} depth={} gain={}", carrier_level, depth, gain),
            Self::Quadrature => defmt::write!(f, "quadrature"),
        }
    }
}

/// Suppressed-carrier multiply
#[inline]
#[must_use]
pub fn suppressed_carrier(baseband: f32, carrier: f32) -> f32 {
    baseband * carrier
}

/// Carrier-present amplitude modulation
#[inline]
#[must_use]
pub fn carrier_present(baseband: f32, carrier: f32, carrier_level: f32, depth: f32, gain: f32) -> f32 {
    (carrier_level + depth * gain * baseband) * carrier
}

/// Per-channel modulator
///
/// Owns the Hilbert transformer used by the quadrature scheme so that no
/// FIR state is ever shared between channels.
#[derive(Clone, Debug)]
pub struct Modulator<const N: usize> {
    scheme: ModulationScheme,
    hilbert: HilbertTransformer<N>,
}

impl<const N: usize> Modulator<N> {
    /// Create a modulator for `scheme`
    #[must_use]
    pub fn new(scheme: ModulationScheme) -> Self {
        Self {
            scheme,
            hilbert: HilbertTransformer::new(),
        }
    }

    /// Combine one baseband sample with the carrier
    ///
    /// `carrier.i` is the real carrier; `carrier.q` is only read by the
    /// quadrature scheme, which expects `(cos, sin)`.
    #[inline]
    pub fn process(&mut self, baseband: f32, carrier: IqSample) -> f32 {
        match self.scheme {
            ModulationScheme::SuppressedCarrier => suppressed_carrier(baseband, carrier.i),
            ModulationScheme::CarrierPresent {
                carrier_level,
                depth,
                gain,
            } => carrier_present(baseband, carrier.i, carrier_level, depth, gain),
            ModulationScheme::Quadrature => self
                .hilbert
                .process_iq(baseband)
                .upconvert(carrier.i, carrier.q),
        }
    }

    /// Selected scheme
    #[must_use]
    pub fn scheme(&self) -> ModulationScheme {
        self.scheme
    }

    /// Samples of delay the scheme adds to the baseband
    #[must_use]
    pub fn latency(&self) -> usize {
        if self.scheme.is_quadrature() {
            self.hilbert.delay()
        } else {
            0
        }
    }

    /// Reset modulator state
    pub fn reset(&mut self) {
        self.hilbert.reset();
    }
}
