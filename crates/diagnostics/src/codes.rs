//! Diagnostic ID constants (`MS1001`...), one per catalogue entry.
//!
//! Generated by `build.rs` from `spec/diagnostics.jsonc`; the catalogue is
//! the only place a code is defined.

include!(concat!(env!("OUT_DIR"), "/generated_codes.rs"));
