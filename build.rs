//! Build script for the carrier DSP library
//!
//! Handles:
//! - Selecting the defmt logging backend (embedded, non-std builds only)

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rustc-check-cfg=cfg(defmt_log)");

    // Host builds never link a defmt global logger, so logging is only
    // compiled in when the embedded feature is on and std is off.
    let embedded = std::env::var_os("CARGO_FEATURE_EMBEDDED").is_some();
    let host = std::env::var_os("CARGO_FEATURE_STD").is_some();
    if embedded && !host {
        println!("cargo:rustc-cfg=defmt_log");
    }
}
