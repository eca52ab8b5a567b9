//! Rate Bridge Tests
//!
//! Tests for the sample-and-hold bridge between input and output rates
//! Run with: cargo test --test rate_bridge_tests

use carrier_dsp::dsp::rate_bridge::{hold_factor_for, RateBridge};

fn run(bridge: &mut RateBridge, input: &[f32]) -> Vec<f32> {
    input.iter().map(|&x| bridge.tick(Some(x))).collect()
}

// =============================================================================
// Hold Factor Tests
// =============================================================================

#[test]
fn test_hold_factor_integer_ratios() {
    assert_eq!(hold_factor_for(96_000.0, 96_000.0), Some(1));
    assert_eq!(hold_factor_for(96_000.0, 48_000.0), Some(2));
    assert_eq!(hold_factor_for(96_000.0, 32_000.0), Some(3));
    assert_eq!(hold_factor_for(96_000.0, 24_000.0), Some(4));
}

#[test]
fn test_hold_factor_rejects_fractional_ratio() {
    assert_eq!(hold_factor_for(96_000.0, 44_100.0), None);
    assert_eq!(hold_factor_for(48_000.0, 96_000.0), None);
    assert_eq!(hold_factor_for(-1.0, 48_000.0), None);
}

#[test]
fn test_for_rates() {
    assert_eq!(RateBridge::for_rates(96_000.0, 48_000.0).hold_factor(), 2);
    assert_eq!(RateBridge::for_rates(96_000.0, 44_100.0).hold_factor(), 1);
}

// =============================================================================
// Sample-and-Hold Tests
// =============================================================================

#[test]
fn test_unity_hold_passes_through() {
    let mut bridge = RateBridge::new(1);
    assert_eq!(run(&mut bridge, &[1.0, 2.0, 3.0, 4.0]), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_hold_two() {
    let mut bridge = RateBridge::new(2);
    assert_eq!(run(&mut bridge, &[1.0, 2.0, 3.0, 4.0]), vec![1.0, 1.0, 3.0, 3.0]);
}

#[test]
fn test_hold_three() {
    let mut bridge = RateBridge::new(3);
    let input = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
    assert_eq!(
        run(&mut bridge, &input),
        vec![1.0, 1.0, 1.0, 4.0, 4.0, 4.0, 7.0]
    );
}

#[test]
fn test_countdown_continues_across_blocks() {
    let mut bridge = RateBridge::new(2);
    // A block of odd length ends mid-hold
    assert_eq!(run(&mut bridge, &[1.0, 2.0, 3.0]), vec![1.0, 1.0, 3.0]);
    assert_eq!(run(&mut bridge, &[4.0, 5.0, 6.0]), vec![3.0, 5.0, 5.0]);
}

#[test]
fn test_disconnected_source_is_silence() {
    let mut bridge = RateBridge::new(4);
    bridge.tick(Some(0.8));
    assert_eq!(bridge.held(), 0.8);
    // Mid-hold disconnect does not keep the stale value
    assert_eq!(bridge.tick(None), 0.0);
    assert_eq!(bridge.tick(None), 0.0);
}

#[test]
fn test_shape_sees_input_rate_only() {
    let mut bridge = RateBridge::new(2);
    let mut seen = Vec::new();
    for x in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0] {
        bridge.tick_with(Some(x), |v| {
            seen.push(v);
            -v
        });
    }
    assert_eq!(seen, vec![1.0, 3.0, 5.0]);
    assert_eq!(bridge.held(), -5.0);
}

#[test]
fn test_reset_rearms_refresh() {
    let mut bridge = RateBridge::new(2);
    run(&mut bridge, &[1.0]);
    bridge.reset();
    assert_eq!(bridge.held(), 0.0);
    assert_eq!(run(&mut bridge, &[7.0, 8.0]), vec![7.0, 7.0]);
}
