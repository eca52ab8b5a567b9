//! Ultrasonic Carrier DSP Library
//!
//! Real-time signal chain that shapes a baseband audio signal and
//! modulates it onto an ultrasonic carrier. The design targets a
//! parametric-speaker style transmitter: stereo codec in, stereo
//! transducer drive out, one block of samples per audio callback.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        ENGINE                                │
//! │   initialize(config, fs)   │   process_block(in, out, n)     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      DSP LAYER                               │
//! │  RateBridge │ Biquad chains │ Compressor │ Modulator │ NCO   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 CONFIG / TYPES                               │
//! │  EngineConfig  │  FilterSpec  │  SampleRate  │  ConfigError  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **No allocation while streaming**: fixed arrays and `heapless` chains
//! - **Type-driven design**: validated newtypes and specs checked up front
//! - **No error path in the hot loop**: everything fails in `initialize`
//! - **`no_std` capable**: `micromath` supplies float math without `std`

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Digital Signal Processing
///
/// Filters, oscillator, rate bridge, Hilbert transformer, modulation and
/// dynamics.
pub mod dsp;

/// System Configuration
///
/// Constants and the runtime engine configuration.
pub mod config;

/// Common Types
///
/// Shared type definitions used across modules.
pub mod types;

/// Modulation Engine
///
/// Per-channel processing paths driven block by block.
pub mod engine;

pub use config::EngineConfig;
pub use engine::ModulationEngine;
pub use types::{ConfigError, SampleRate};
