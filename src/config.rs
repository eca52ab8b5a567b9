//! System configuration and signal-chain constants
//!
//! Compile-time constants for the transmitter plus the runtime
//! [`EngineConfig`] evaluated once when the engine is initialized. Nothing
//! here is consulted from the per-sample path.

use heapless::Vec;

use crate::dsp::compressor::CompressorConfig;
use crate::dsp::filter_design::FilterSpec;
use crate::dsp::modulation::ModulationScheme;
use crate::dsp::oscillator::Waveform;
use crate::dsp::rate_bridge::hold_factor_for;
use crate::types::{ConfigError, SampleRate};

/// Output sample rate the codec is configured for (96 kHz)
pub const DEFAULT_SAMPLE_RATE_HZ: f32 = 96_000.0;

/// Highest rate the input converter supports
pub const MAX_INPUT_RATE_HZ: f32 = 96_000.0;

/// Frames per audio callback
pub const AUDIO_BLOCK_SIZE: usize = 48;

/// Channels processed by the engine
pub const NUM_CHANNELS: usize = 2;

/// Maximum biquad stages in one filter chain
pub const MAX_STAGES: usize = 8;

/// Hilbert transformer length (odd)
pub const HILBERT_TAPS: usize = 63;

/// Ultrasonic carrier frequency
pub const CARRIER_HZ: f32 = 39_500.0;

/// Input scaling applied before any filtering
pub const INPUT_GAIN: f32 = 2.0;

/// Relative tolerance for treating a rate ratio as an integer
pub const RATE_TOLERANCE: f32 = 0.01;

/// Corner of the post-modulation highpass that strips audible products
pub const POST_HIGHPASS_HZ: f32 = 19_000.0;

/// Filter stage list with fixed capacity
pub type StageList = Vec<FilterSpec, MAX_STAGES>;

/// Build a stage list from a slice
///
/// # Errors
/// Returns [`ConfigError::TooManyStages`] if `specs` exceeds [`MAX_STAGES`].
pub fn stages(specs: &[FilterSpec]) -> Result<StageList, ConfigError> {
    Vec::from_slice(specs).map_err(|()| ConfigError::TooManyStages {
        requested: specs.len(),
        capacity: MAX_STAGES,
    })
}

/// Stage list for a preset table
///
/// Preset tables are checked against [`MAX_STAGES`] at compile time, so
/// `take` never drops a stage.
fn preset(specs: &[FilterSpec]) -> StageList {
    specs.iter().copied().take(MAX_STAGES).collect()
}

/// Peaking stages of the voicing EQ
const VOICING: [FilterSpec; 2] = [
    FilterSpec::Peaking {
        freq: 120.0,
        q: 0.7,
        gain_db: 6.0,
    },
    FilterSpec::Peaking {
        freq: 1500.0,
        q: 1.0,
        gain_db: 4.0,
    },
];

/// Pre-emphasis shelf
const PRE_EMPHASIS: [FilterSpec; 1] = [FilterSpec::HighShelf {
    freq: 3000.0,
    q: FilterSpec::BUTTERWORTH_Q,
    gain_db: 6.0,
}];

/// 4th-order highpass stripping audible products after the modulator
const POST_HIGHPASS: [FilterSpec; 2] = [
    FilterSpec::butterworth_highpass(POST_HIGHPASS_HZ),
    FilterSpec::butterworth_highpass(POST_HIGHPASS_HZ),
];

/// Voice band for the AM preset
const VOICE_BAND: [FilterSpec; 2] = [
    FilterSpec::butterworth_highpass(200.0),
    FilterSpec::butterworth_lowpass(5000.0),
];

const _: () = assert!(
    VOICING.len() <= MAX_STAGES
        && PRE_EMPHASIS.len() <= MAX_STAGES
        && POST_HIGHPASS.len() <= MAX_STAGES
        && VOICE_BAND.len() <= MAX_STAGES
);

/// Baseband EQ (bass and presence voicing)
#[derive(Clone, Debug, PartialEq)]
pub struct EqConfig {
    /// When false every stage becomes an identity section
    pub enabled: bool,
    /// Stages applied in order
    pub stages: StageList,
}

impl EqConfig {
    /// Bass and mid peaking stages, disabled
    #[must_use]
    pub fn voicing() -> Self {
        Self {
            enabled: false,
            stages: preset(&VOICING),
        }
    }

    /// Pre-emphasis high shelf, disabled
    #[must_use]
    pub fn pre_emphasis() -> Self {
        Self {
            enabled: false,
            stages: preset(&PRE_EMPHASIS),
        }
    }

    /// Stages as they enter the chain
    ///
    /// A disabled EQ keeps its slots as identity sections so the chain
    /// layout does not depend on the toggle.
    pub fn effective_stages(&self) -> impl Iterator<Item = FilterSpec> + '_ {
        let enabled = self.enabled;
        self.stages
            .iter()
            .map(move |&spec| if enabled { spec } else { FilterSpec::Identity })
    }
}

impl Default for EqConfig {
    fn default() -> Self {
        Self::voicing()
    }
}

/// Carrier oscillator settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarrierConfig {
    /// Carrier frequency in Hz
    pub frequency_hz: f32,
    /// Output shape for the real-carrier schemes
    pub waveform: Waveform,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            frequency_hz: CARRIER_HZ,
            waveform: Waveform::UnipolarSine,
        }
    }
}

/// Complete engine configuration
///
/// Evaluated once by [`crate::engine::ModulationEngine::initialize`].
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Input converter rate; `None` means it matches the output rate.
    /// Rates above the output rate are clamped to it.
    pub input_rate_hz: Option<f32>,
    /// Gain applied to every input sample
    pub input_gain: f32,
    /// Input channel feeding each output channel
    pub routing: [usize; NUM_CHANNELS],
    /// Optional voicing stages, first in the input-rate chain
    pub eq: EqConfig,
    /// Band-limiting stages after the EQ, run at the input rate
    pub baseband: StageList,
    /// Optional dynamics stage
    pub compressor: CompressorConfig,
    /// Carrier oscillator
    pub carrier: CarrierConfig,
    /// How baseband and carrier are combined
    pub modulation: ModulationScheme,
    /// Stages after the modulator, run at the output rate
    pub output: StageList,
}

impl EngineConfig {
    /// Ultrasonic transmitter as shipped
    ///
    /// EQ and compressor off, input doubled, left/right inputs swapped onto
    /// the outputs, unipolar 39.5 kHz carrier multiplied with the baseband
    /// and a 4th-order 19 kHz highpass on the result.
    #[must_use]
    pub fn transmitter() -> Self {
        Self {
            input_rate_hz: Some(MAX_INPUT_RATE_HZ),
            input_gain: INPUT_GAIN,
            routing: [1, 0],
            eq: EqConfig::voicing(),
            baseband: StageList::new(),
            compressor: CompressorConfig::default(),
            carrier: CarrierConfig::default(),
            modulation: ModulationScheme::SuppressedCarrier,
            output: preset(&POST_HIGHPASS),
        }
    }

    /// Voice-band AM preset
    ///
    /// Highpass 200 Hz, lowpass 5 kHz, carrier-present AM with a 0.5 floor
    /// on a bipolar sine carrier; straight channel routing, unity input
    /// gain and no output filtering.
    #[must_use]
    pub fn am_transmitter() -> Self {
        Self {
            input_rate_hz: None,
            input_gain: 1.0,
            routing: [0, 1],
            eq: EqConfig::voicing(),
            baseband: preset(&VOICE_BAND),
            compressor: CompressorConfig::default(),
            carrier: CarrierConfig {
                frequency_hz: CARRIER_HZ,
                waveform: Waveform::Sine,
            },
            modulation: ModulationScheme::am(0.5, 1.0),
            output: StageList::new(),
        }
    }

    /// Requested input converter rate for an output rate of `fs`
    ///
    /// Rates above the output rate are clamped to it.
    #[must_use]
    pub fn input_rate(&self, fs: SampleRate) -> f32 {
        match self.input_rate_hz {
            Some(hz) if hz.is_finite() && hz >= fs.as_hz() => fs.as_hz(),
            Some(hz) => hz,
            None => fs.as_hz(),
        }
    }

    /// Hold factor and the rate the input-side stages are designed at
    ///
    /// The input chain runs once per `hold` output ticks, so its rate is
    /// `fs / hold` exactly, not the requested converter rate. A requested
    /// rate that is not within [`RATE_TOLERANCE`] of `fs / H` is not
    /// bridged: `hold` is 1 and the chain runs at `fs`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidSampleRate`] for a requested rate that
    /// is zero, negative or not finite.
    pub fn input_bridge(&self, fs: SampleRate) -> Result<(u32, SampleRate), ConfigError> {
        let requested = self.input_rate(fs);
        if SampleRate::from_hz(requested).is_none() {
            return Err(ConfigError::InvalidSampleRate(requested));
        }
        let hold = hold_factor_for(fs.as_hz(), requested).unwrap_or(1);
        #[allow(clippy::cast_precision_loss)]
        let bridged = fs.as_hz() / hold as f32;
        let bridged = SampleRate::from_hz(bridged).ok_or(ConfigError::InvalidSampleRate(bridged))?;
        Ok((hold, bridged))
    }

    /// Check every setting against the output rate `fs`
    ///
    /// Input-side stages are checked against the bridged rate from
    /// [`EngineConfig::input_bridge`], which is what they are designed at.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self, fs: SampleRate) -> Result<(), ConfigError> {
        let (_, input_fs) = self.input_bridge(fs)?;
        if !self.input_gain.is_finite() {
            return Err(ConfigError::InvalidGain(self.input_gain));
        }
        for (output, &input) in self.routing.iter().enumerate() {
            if input >= NUM_CHANNELS {
                return Err(ConfigError::InvalidRouting { output, input });
            }
        }

        let input_stages = self.eq.stages.len() + self.baseband.len();
        if input_stages > MAX_STAGES {
            return Err(ConfigError::TooManyStages {
                requested: input_stages,
                capacity: MAX_STAGES,
            });
        }
        for spec in self.eq.effective_stages().chain(self.baseband.iter().copied()) {
            spec.validate(input_fs)?;
        }
        for spec in &self.output {
            spec.validate(fs)?;
        }

        self.compressor.validate()?;

        let carrier = self.carrier.frequency_hz;
        if !(carrier > 0.0 && carrier < fs.nyquist()) {
            return Err(ConfigError::InvalidModulation);
        }
        self.modulation.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::transmitter()
    }
}
