//! Oscillator Module Tests
//!
//! Tests for the phase-accumulator carrier oscillator
//! Run with: cargo test --test oscillator_tests

use carrier_dsp::config::CARRIER_HZ;
use carrier_dsp::dsp::oscillator::{PhaseOscillator, Waveform};

const EPSILON: f32 = 0.01;

/// Indices of rising zero crossings
fn rising_crossings(samples: &[f32]) -> Vec<usize> {
    samples
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] < 0.0 && w[1] >= 0.0)
        .map(|(n, _)| n + 1)
        .collect()
}

// =============================================================================
// Waveform Tests
// =============================================================================

#[test]
fn test_waveform_values() {
    assert!(Waveform::Sine.at(0.0).abs() < 1e-6);
    assert!((Waveform::Sine.at(0.25) - 1.0).abs() < 1e-6);
    assert!((Waveform::Cosine.at(0.0) - 1.0).abs() < 1e-6);
    assert!((Waveform::UnipolarSine.at(0.0) - 0.5).abs() < 1e-6);
    assert!((Waveform::UnipolarSine.at(0.25) - 1.0).abs() < 1e-6);
    assert!(Waveform::UnipolarSine.at(0.75).abs() < 1e-6);
}

#[test]
fn test_unipolar_range() {
    let mut osc = PhaseOscillator::new(CARRIER_HZ, 96_000.0, Waveform::UnipolarSine);
    for _ in 0..10_000 {
        let sample = osc.tick();
        assert!((0.0..=1.0).contains(&sample), "sample {} out of range", sample);
    }
}

// =============================================================================
// PhaseOscillator Tests
// =============================================================================

#[test]
fn test_oscillator_starts_at_zero_phase() {
    let mut osc = PhaseOscillator::new(1000.0, 48_000.0, Waveform::Sine);
    assert_eq!(osc.phase(), 0.0);
    assert!(osc.tick().abs() < 1e-6);
}

#[test]
fn test_phase_increment() {
    let osc = PhaseOscillator::new(1000.0, 48_000.0, Waveform::Sine);
    assert!((osc.phase_increment() - 1.0 / 48.0).abs() < 1e-7);
}

#[test]
fn test_quarter_period_peak() {
    let mut osc = PhaseOscillator::new(1000.0, 48_000.0, Waveform::Sine);
    // 48 samples per period; sample 12 is the peak
    for _ in 0..12 {
        osc.tick();
    }
    let sample = osc.tick();
    assert!((sample - 1.0).abs() < EPSILON, "Expected peak, got {}", sample);
}

#[test]
fn test_phase_stays_bounded() {
    let mut osc = PhaseOscillator::new(CARRIER_HZ, 96_000.0, Waveform::Sine);
    for _ in 0..1_000_000 {
        osc.tick();
        let phase = osc.phase();
        assert!((0.0..1.0).contains(&phase), "phase {} escaped [0, 1)", phase);
    }
}

#[test]
fn test_zero_crossing_spacing() {
    let fs = 96_000.0;
    let freq = 1000.0;
    let mut osc = PhaseOscillator::new(freq, fs, Waveform::Sine);
    let samples: Vec<f32> = (0..9600).map(|_| osc.tick()).collect();

    let crossings = rising_crossings(&samples);
    assert!(crossings.len() >= 9);
    for pair in crossings.windows(2) {
        let spacing = pair[1] - pair[0];
        assert!(
            (95..=97).contains(&spacing),
            "crossing spacing {} samples, expected 96",
            spacing
        );
    }
}

#[test]
fn test_carrier_frequency_over_long_run() {
    let fs = 96_000.0;
    let mut osc = PhaseOscillator::new(CARRIER_HZ, fs, Waveform::Sine);
    // One second of carrier
    let samples: Vec<f32> = (0..96_000).map(|_| osc.tick()).collect();
    let cycles = rising_crossings(&samples).len() as f32;
    assert!((cycles - CARRIER_HZ).abs() <= 2.0, "counted {} cycles", cycles);
}

#[test]
fn test_iq_outputs_are_quadrature() {
    let mut osc = PhaseOscillator::new(1000.0, 48_000.0, Waveform::UnipolarSine);
    for _ in 0..480 {
        let (cos, sin) = osc.tick_iq();
        assert!((cos * cos + sin * sin - 1.0).abs() < 1e-4);
    }
}

#[test]
fn test_set_frequency_preserves_phase() {
    let mut osc = PhaseOscillator::new(1000.0, 48_000.0, Waveform::Sine);
    for _ in 0..10 {
        osc.tick();
    }
    let phase = osc.phase();
    osc.set_frequency(2000.0, 48_000.0);
    assert_eq!(osc.phase(), phase);
    assert!((osc.phase_increment() - 2.0 / 48.0).abs() < 1e-7);
}

#[test]
fn test_reset() {
    let mut osc = PhaseOscillator::new(1000.0, 48_000.0, Waveform::Cosine);
    for _ in 0..17 {
        osc.tick();
    }
    osc.reset();
    assert_eq!(osc.phase(), 0.0);
    assert!((osc.tick() - 1.0).abs() < 1e-6);
    assert_eq!(osc.waveform(), Waveform::Cosine);
}
