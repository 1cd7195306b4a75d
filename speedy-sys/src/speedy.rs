//! Provides raw, low-level bindings to the Speedy C API (`speedy.h`).

use std::ffi::{c_float, c_int, c_short};

use crate::SpeedyStream;

// -------------------------------------------------------------------------------------------------

extern "C" {
    fn speedyCreateStream(sample_rate: c_int) -> *mut SpeedyStream;
    fn speedyDestroyStream(stream: *mut SpeedyStream);
    fn speedyInputFrameSize(stream: *mut SpeedyStream) -> c_int;
    fn speedyInputFrameStep(stream: *mut SpeedyStream) -> c_int;
    fn speedyAddData(stream: *mut SpeedyStream, data: *const c_float, at_time: i64);
    fn speedyAddDataShort(stream: *mut SpeedyStream, data: *const c_short, at_time: i64);
    fn speedyComputeTension(stream: *mut SpeedyStream, at_time: i64, tension: *mut c_float)
        -> c_int;
    fn speedyComputeSpeedFromTension(
        tension: c_float,
        r_g: c_float,
        duration_feedback_strength: c_float,
        stream: *mut SpeedyStream,
    ) -> c_float;
    fn speedyGetCurrentTime(stream: *mut SpeedyStream) -> i64;
    fn speedyFFTSize(stream: *mut SpeedyStream) -> c_int;
    fn speedySetPreemphasisFactor(stream: *mut SpeedyStream, factor: c_float);
    fn speedySetLowEnergyThresholdScale(stream: *mut SpeedyStream, scale: c_float);
    fn speedySetBinThresholdDivisor(stream: *mut SpeedyStream, divisor: c_float);
    fn speedySetTensionWeights(
        stream: *mut SpeedyStream,
        energy_weight: c_float,
        speech_weight: c_float,
    );
    fn speedySetTensionOffsets(
        stream: *mut SpeedyStream,
        energy_offset: c_float,
        speech_offset: c_float,
    );
    fn speedySetSpeechChangeCapMultiplier(stream: *mut SpeedyStream, multiplier: c_float);
}

// -------------------------------------------------------------------------------------------------

/// Creates a tension analysis stream. Returns null when out of memory.
pub fn create(sample_rate: c_int) -> *mut SpeedyStream {
    unsafe { speedyCreateStream(sample_rate) }
}

/// Destroys a tension analysis stream.
pub fn destroy(stream: *mut SpeedyStream) {
    unsafe { speedyDestroyStream(stream) }
}

/// Number of samples expected by each `add_data` call.
pub fn input_frame_size(stream: *mut SpeedyStream) -> c_int {
    unsafe { speedyInputFrameSize(stream) }
}

/// Number of samples between the starts of two consecutive input frames.
pub fn input_frame_step(stream: *mut SpeedyStream) -> c_int {
    unsafe { speedyInputFrameStep(stream) }
}

/// Adds one input frame at the given frame time.
///
/// # Safety
/// `data` must point to at least `input_frame_size(stream)` readable floats.
pub unsafe fn add_data(stream: *mut SpeedyStream, data: *const c_float, at_time: i64) {
    speedyAddData(stream, data, at_time)
}

/// Adds one 16-bit input frame at the given frame time.
///
/// # Safety
/// `data` must point to at least `input_frame_size(stream)` readable shorts.
pub unsafe fn add_data_short(stream: *mut SpeedyStream, data: *const c_short, at_time: i64) {
    speedyAddDataShort(stream, data, at_time)
}

/// Computes the tension at the given frame time. Returns 0 when not enough data was added yet.
pub fn compute_tension(stream: *mut SpeedyStream, at_time: i64, tension: *mut c_float) -> c_int {
    unsafe { speedyComputeTension(stream, at_time, tension) }
}

/// Maps a tension value to a speed multiplier.
pub fn compute_speed_from_tension(
    tension: c_float,
    r_g: c_float,
    duration_feedback_strength: c_float,
    stream: *mut SpeedyStream,
) -> c_float {
    unsafe { speedyComputeSpeedFromTension(tension, r_g, duration_feedback_strength, stream) }
}

/// Current frame time of the stream.
pub fn current_time(stream: *mut SpeedyStream) -> i64 {
    unsafe { speedyGetCurrentTime(stream) }
}

/// FFT size used for the spectral analysis.
pub fn fft_size(stream: *mut SpeedyStream) -> c_int {
    unsafe { speedyFFTSize(stream) }
}

pub fn set_preemphasis_factor(stream: *mut SpeedyStream, factor: c_float) {
    unsafe { speedySetPreemphasisFactor(stream, factor) }
}

pub fn set_low_energy_threshold_scale(stream: *mut SpeedyStream, scale: c_float) {
    unsafe { speedySetLowEnergyThresholdScale(stream, scale) }
}

pub fn set_bin_threshold_divisor(stream: *mut SpeedyStream, divisor: c_float) {
    unsafe { speedySetBinThresholdDivisor(stream, divisor) }
}

pub fn set_tension_weights(stream: *mut SpeedyStream, energy_weight: c_float, speech_weight: c_float) {
    unsafe { speedySetTensionWeights(stream, energy_weight, speech_weight) }
}

pub fn set_tension_offsets(stream: *mut SpeedyStream, energy_offset: c_float, speech_offset: c_float) {
    unsafe { speedySetTensionOffsets(stream, energy_offset, speech_offset) }
}

pub fn set_speech_change_cap_multiplier(stream: *mut SpeedyStream, multiplier: c_float) {
    unsafe { speedySetSpeechChangeCapMultiplier(stream, multiplier) }
}
