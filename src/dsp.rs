//! Digital Signal Processing
//!
//! Provides the building blocks of the transmit chain:
//! - RBJ biquad design and cascaded filter chains
//! - Phase-accumulator carrier oscillator
//! - Sample-and-hold rate bridge
//! - Hilbert transform for quadrature modulation
//! - Envelope follower and compressor
//! - Modulation schemes

pub mod filter_design;
pub mod filter;
pub mod oscillator;
pub mod rate_bridge;
pub mod hilbert;
pub mod modulation;
pub mod compressor;
