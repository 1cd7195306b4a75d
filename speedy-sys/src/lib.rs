//! Provides raw, low-level bindings to the Speedy and Sonic C APIs.
//!
//! Speedy computes a per-frame "tension" value from spectral features of speech audio.
//! Sonic performs time-scale modification of an audio stream and can steer its local speed
//! from an internal Speedy instance ("nonlinear speedup").

use std::os::raw::{c_float, c_int};

/// Opaque handle to a Speedy tension analysis stream.
/// Corresponds to `speedyStream` in the C API.
#[repr(C)]
#[derive(Debug)]
pub struct SpeedyStream {
    _private: [u8; 0],
}

/// Opaque handle to a Sonic time-scale modification stream.
/// Corresponds to `sonicStream` in the C API.
#[repr(C)]
#[derive(Debug)]
pub struct SonicStream {
    _private: [u8; 0],
}

/// Callback invoked by Sonic with the frame time and the speed it applied to that frame.
/// The stream pointer is the only context passed along.
pub type SonicSpeedCallback =
    Option<unsafe extern "C" fn(stream: *mut SonicStream, time: c_int, speed: c_float)>;

// -------------------------------------------------------------------------------------------------

pub mod sonic;
pub mod speedy;
