//! Provides raw, low-level bindings to the Sonic C API (`sonic2.h`).

use std::ffi::{c_float, c_int, c_short};

use crate::{SonicSpeedCallback, SonicStream};

// -------------------------------------------------------------------------------------------------

extern "C" {
    fn sonicCreateStream(sample_rate: c_int, num_channels: c_int) -> *mut SonicStream;
    fn sonicDestroyStream(stream: *mut SonicStream);
    fn sonicWriteFloatToStream(
        stream: *mut SonicStream,
        samples: *const c_float,
        num_samples: c_int,
    ) -> c_int;
    fn sonicWriteShortToStream(
        stream: *mut SonicStream,
        samples: *const c_short,
        num_samples: c_int,
    ) -> c_int;
    fn sonicReadFloatFromStream(
        stream: *mut SonicStream,
        samples: *mut c_float,
        max_samples: c_int,
    ) -> c_int;
    fn sonicReadShortFromStream(
        stream: *mut SonicStream,
        samples: *mut c_short,
        max_samples: c_int,
    ) -> c_int;
    fn sonicFlushStream(stream: *mut SonicStream) -> c_int;
    fn sonicSamplesAvailable(stream: *mut SonicStream) -> c_int;
    fn sonicGetSpeed(stream: *mut SonicStream) -> c_float;
    fn sonicSetSpeed(stream: *mut SonicStream, speed: c_float);
    fn sonicSetRate(stream: *mut SonicStream, rate: c_float);
    fn sonicEnableNonlinearSpeedup(stream: *mut SonicStream, nonlinear_factor: c_float);
    fn sonicSetDurationFeedbackStrength(stream: *mut SonicStream, factor: c_float);
    fn sonicSetSpeedyPreemphasisFactor(stream: *mut SonicStream, factor: c_float);
    fn sonicSetSpeedyLowEnergyThresholdScale(stream: *mut SonicStream, scale: c_float);
    fn sonicSetSpeedyBinThresholdDivisor(stream: *mut SonicStream, divisor: c_float);
    fn sonicSetSpeedyTensionWeights(
        stream: *mut SonicStream,
        energy_weight: c_float,
        speech_weight: c_float,
    );
    fn sonicSetSpeedyTensionOffsets(
        stream: *mut SonicStream,
        energy_offset: c_float,
        speech_offset: c_float,
    );
    fn sonicSetSpeedySpeechChangeCapMultiplier(stream: *mut SonicStream, multiplier: c_float);
    fn sonicSpeedCallback(stream: *mut SonicStream, callback: SonicSpeedCallback);
}

// -------------------------------------------------------------------------------------------------

/// Creates a time-scale modification stream. Returns null when out of memory.
pub fn create(sample_rate: c_int, num_channels: c_int) -> *mut SonicStream {
    unsafe { sonicCreateStream(sample_rate, num_channels) }
}

/// Destroys a time-scale modification stream.
pub fn destroy(stream: *mut SonicStream) {
    unsafe { sonicDestroyStream(stream) }
}

/// Writes interleaved float samples. `num_samples` counts frames (samples per channel).
///
/// # Safety
/// `samples` must point to at least `num_samples * num_channels` readable floats.
pub unsafe fn write_float(stream: *mut SonicStream, samples: *const c_float, num_samples: c_int) -> c_int {
    sonicWriteFloatToStream(stream, samples, num_samples)
}

/// Writes interleaved 16-bit samples. `num_samples` counts frames (samples per channel).
///
/// # Safety
/// `samples` must point to at least `num_samples * num_channels` readable shorts.
pub unsafe fn write_short(stream: *mut SonicStream, samples: *const c_short, num_samples: c_int) -> c_int {
    sonicWriteShortToStream(stream, samples, num_samples)
}

/// Reads up to `max_samples` frames of interleaved float output. Returns the frames read.
///
/// # Safety
/// `samples` must point to at least `max_samples * num_channels` writable floats.
pub unsafe fn read_float(stream: *mut SonicStream, samples: *mut c_float, max_samples: c_int) -> c_int {
    sonicReadFloatFromStream(stream, samples, max_samples)
}

/// Reads up to `max_samples` frames of interleaved 16-bit output. Returns the frames read.
///
/// # Safety
/// `samples` must point to at least `max_samples * num_channels` writable shorts.
pub unsafe fn read_short(stream: *mut SonicStream, samples: *mut c_short, max_samples: c_int) -> c_int {
    sonicReadShortFromStream(stream, samples, max_samples)
}

/// Forces out all buffered input.
pub fn flush(stream: *mut SonicStream) -> c_int {
    unsafe { sonicFlushStream(stream) }
}

/// Frames ready to be read.
pub fn samples_available(stream: *mut SonicStream) -> c_int {
    unsafe { sonicSamplesAvailable(stream) }
}

pub fn speed(stream: *mut SonicStream) -> c_float {
    unsafe { sonicGetSpeed(stream) }
}

pub fn set_speed(stream: *mut SonicStream, speed: c_float) {
    unsafe { sonicSetSpeed(stream, speed) }
}

pub fn set_rate(stream: *mut SonicStream, rate: c_float) {
    unsafe { sonicSetRate(stream, rate) }
}

pub fn enable_nonlinear_speedup(stream: *mut SonicStream, nonlinear_factor: c_float) {
    unsafe { sonicEnableNonlinearSpeedup(stream, nonlinear_factor) }
}

pub fn set_duration_feedback_strength(stream: *mut SonicStream, factor: c_float) {
    unsafe { sonicSetDurationFeedbackStrength(stream, factor) }
}

pub fn set_speedy_preemphasis_factor(stream: *mut SonicStream, factor: c_float) {
    unsafe { sonicSetSpeedyPreemphasisFactor(stream, factor) }
}

pub fn set_speedy_low_energy_threshold_scale(stream: *mut SonicStream, scale: c_float) {
    unsafe { sonicSetSpeedyLowEnergyThresholdScale(stream, scale) }
}

pub fn set_speedy_bin_threshold_divisor(stream: *mut SonicStream, divisor: c_float) {
    unsafe { sonicSetSpeedyBinThresholdDivisor(stream, divisor) }
}

pub fn set_speedy_tension_weights(stream: *mut SonicStream, energy_weight: c_float, speech_weight: c_float) {
    unsafe { sonicSetSpeedyTensionWeights(stream, energy_weight, speech_weight) }
}

pub fn set_speedy_tension_offsets(stream: *mut SonicStream, energy_offset: c_float, speech_offset: c_float) {
    unsafe { sonicSetSpeedyTensionOffsets(stream, energy_offset, speech_offset) }
}

pub fn set_speedy_speech_change_cap_multiplier(stream: *mut SonicStream, multiplier: c_float) {
    unsafe { sonicSetSpeedySpeechChangeCapMultiplier(stream, multiplier) }
}

/// Installs the per-frame speed callback.
pub fn set_speed_callback(stream: *mut SonicStream, callback: SonicSpeedCallback) {
    unsafe { sonicSpeedCallback(stream, callback) }
}
