//! Modulation engine
//!
//! Owns every piece of processing state for the transmitter and exposes the
//! two entry points the audio harness drives: [`ModulationEngine::initialize`]
//! once before streaming, then [`ModulationEngine::process_block`] per
//! callback.
//!
//! Per frame the shared carrier oscillator is advanced once, then each
//! channel runs:
//!
//! ```text
//! input ─► RateBridge ─► input chain ─► Compressor ─► Modulator ─► output chain ─► out
//!           (hold)        (EQ + band,     (optional)    ▲
//!                          input rate)                  │
//!                                                    carrier
//! ```

use crate::config::{EngineConfig, HILBERT_TAPS, NUM_CHANNELS};
use crate::dsp::compressor::Compressor;
use crate::dsp::filter::FilterChain;
use crate::dsp::modulation::{ModulationScheme, Modulator};
use crate::dsp::oscillator::PhaseOscillator;
#[cfg(defmt_log)]
use crate::dsp::rate_bridge::hold_factor_for;
use crate::dsp::rate_bridge::RateBridge;
use crate::types::{ConfigError, IqSample, SampleRate};

/// Processing state of one output channel
#[derive(Clone, Debug)]
struct ChannelPath {
    /// Input channel this path reads
    source: usize,
    bridge: RateBridge,
    /// EQ and baseband stages, run once per input period
    input_chain: FilterChain,
    compressor: Compressor,
    modulator: Modulator<HILBERT_TAPS>,
    /// Post-modulation stages at the output rate
    output_chain: FilterChain,
}

impl ChannelPath {
    #[inline]
    fn process(&mut self, input: Option<f32>, carrier: IqSample) -> f32 {
        let input_chain = &mut self.input_chain;
        let baseband = self.bridge.tick_with(input, |x| input_chain.process(x));
        let baseband = self.compressor.process(baseband);
        let modulated = self.modulator.process(baseband, carrier);
        self.output_chain.process(modulated)
    }

    fn reset(&mut self) {
        self.bridge.reset();
        self.input_chain.reset();
        self.compressor.reset();
        self.modulator.reset();
        self.output_chain.reset();
    }
}

/// Real-time modulation engine
///
/// A plain owned value: no globals, no allocation after
/// [`initialize`](Self::initialize), no error path while streaming.
#[derive(Clone, Debug)]
pub struct ModulationEngine {
    sample_rate: SampleRate,
    /// Rate the input chain is designed for (`sample_rate / hold_factor`)
    input_rate: SampleRate,
    input_gain: f32,
    /// One carrier for every channel
    carrier: PhaseOscillator,
    quadrature: bool,
    channels: [ChannelPath; NUM_CHANNELS],
}

impl ModulationEngine {
    /// Validate `config` and build the processing state for `sample_rate_hz`
    ///
    /// # Errors
    /// Returns [`ConfigError`] for a non-positive sample rate or any setting
    /// rejected by [`EngineConfig::validate`].
    pub fn initialize(config: &EngineConfig, sample_rate_hz: f32) -> Result<Self, ConfigError> {
        let fs = SampleRate::from_hz(sample_rate_hz).ok_or(ConfigError::InvalidSampleRate(sample_rate_hz))?;
        config.validate(fs)?;

        let (hold_factor, input_rate) = config.input_bridge(fs)?;
        #[cfg(defmt_log)]
        if hold_factor_for(fs.as_hz(), config.input_rate(fs)).is_none() {
            defmt::warn!(
                "input rate {} Hz cannot be bridged to {}, running input chain at output rate",
                config.input_rate(fs),
                fs
            );
        }

        let mut input_chain = FilterChain::new();
        for spec in config.eq.effective_stages().chain(config.baseband.iter().copied()) {
            spec.validate(input_rate)?;
            input_chain.push(spec.design(input_rate))?;
        }
        let output_chain = FilterChain::from_specs(&config.output, fs)?;

        let carrier = PhaseOscillator::new(config.carrier.frequency_hz, fs.as_hz(), config.carrier.waveform);

        let path = ChannelPath {
            source: 0,
            bridge: RateBridge::new(hold_factor),
            input_chain,
            compressor: Compressor::new(&config.compressor, fs),
            modulator: Modulator::new(config.modulation),
            output_chain,
        };
        let channels = core::array::from_fn(|ch| ChannelPath {
            source: config.routing[ch],
            ..path.clone()
        });

        #[cfg(defmt_log)]
        defmt::info!(
            "engine: fs={} input={} hold={} carrier={} Hz {} scheme={} stages in={} out={} comp={}",
            fs,
            input_rate,
            hold_factor,
            config.carrier.frequency_hz,
            config.carrier.waveform,
            config.modulation,
            path.input_chain.len(),
            path.output_chain.len(),
            config.compressor
        );

        Ok(Self {
            sample_rate: fs,
            input_rate,
            input_gain: config.input_gain,
            carrier,
            quadrature: config.modulation.is_quadrature(),
            channels,
        })
    }

    /// Process `frames` frames
    ///
    /// `inputs[c]` is the input channel `c`; a `None` entry, a channel
    /// missing from the slice or a buffer shorter than `frames` reads as
    /// silence. Output channels beyond [`NUM_CHANNELS`] are zero-filled.
    pub fn process_block(&mut self, inputs: &[Option<&[f32]>], outputs: &mut [&mut [f32]], frames: usize) {
        for frame in 0..frames {
            let carrier = self.next_carrier();

            for (ch, output) in outputs.iter_mut().enumerate() {
                let sample = match self.channels.get_mut(ch) {
                    Some(path) => {
                        let input = inputs
                            .get(path.source)
                            .copied()
                            .flatten()
                            .and_then(|buf| buf.get(frame))
                            .map(|&x| x * self.input_gain);
                        path.process(input, carrier)
                    }
                    None => 0.0,
                };
                if let Some(slot) = output.get_mut(frame) {
                    *slot = sample;
                }
            }
        }
    }

    #[inline]
    fn next_carrier(&mut self) -> IqSample {
        if self.quadrature {
            let (cos, sin) = self.carrier.tick_iq();
            IqSample::new(cos, sin)
        } else {
            IqSample::new(self.carrier.tick(), 0.0)
        }
    }

    /// Clear all filter, bridge and envelope state and restart the carrier
    pub fn reset(&mut self) {
        self.carrier.reset();
        for path in &mut self.channels {
            path.reset();
        }
    }

    /// Output sample rate
    #[must_use]
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Rate the input chain runs at
    #[must_use]
    pub fn input_rate(&self) -> SampleRate {
        self.input_rate
    }

    /// Output ticks per input sample
    #[must_use]
    pub fn hold_factor(&self) -> u32 {
        self.channels[0].bridge.hold_factor()
    }

    /// Selected modulation scheme
    #[must_use]
    pub fn scheme(&self) -> ModulationScheme {
        self.channels[0].modulator.scheme()
    }

    /// Samples of delay added by the modulator
    #[must_use]
    pub fn latency(&self) -> usize {
        self.channels[0].modulator.latency()
    }

    /// Carrier phase in cycles
    #[must_use]
    pub fn carrier_phase(&self) -> f32 {
        self.carrier.phase()
    }

    /// Input channel read by each output channel
    #[must_use]
    pub fn routing(&self) -> [usize; NUM_CHANNELS] {
        core::array::from_fn(|ch| self.channels[ch].source)
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn default_config_initializes() {
        let engine = ModulationEngine::initialize(&EngineConfig::default(), 96_000.0).unwrap();
        assert_eq!(engine.hold_factor(), 1);
        assert_eq!(engine.routing(), [1, 0]);
        assert_eq!(engine.latency(), 0);
    }

    #[test]
    fn rejects_bad_sample_rate() {
        assert_eq!(
            ModulationEngine::initialize(&EngineConfig::default(), 0.0).unwrap_err(),
            ConfigError::InvalidSampleRate(0.0)
        );
    }

    #[test]
    fn half_rate_input_holds_two() {
        let config = EngineConfig {
            input_rate_hz: Some(48_000.0),
            ..EngineConfig::am_transmitter()
        };
        let engine = ModulationEngine::initialize(&config, 96_000.0).unwrap();
        assert_eq!(engine.hold_factor(), 2);
        assert_eq!(engine.input_rate().as_hz(), 48_000.0);
    }

    #[test]
    fn unbridgeable_input_falls_back_to_output_rate() {
        let config = EngineConfig {
            input_rate_hz: Some(44_100.0),
            ..EngineConfig::am_transmitter()
        };
        let engine = ModulationEngine::initialize(&config, 96_000.0).unwrap();
        assert_eq!(engine.hold_factor(), 1);
        assert_eq!(engine.input_rate().as_hz(), 96_000.0);
    }

    #[test]
    fn near_integer_input_designs_at_bridged_rate() {
        let config = EngineConfig {
            input_rate_hz: Some(47_700.0),
            ..EngineConfig::am_transmitter()
        };
        let engine = ModulationEngine::initialize(&config, 96_000.0).unwrap();
        assert_eq!(engine.hold_factor(), 2);
        assert_eq!(engine.input_rate().as_hz(), 48_000.0);
    }
}
