//! JavaScript classes for a WebAssembly host.
//!
//! ```javascript
//! import { SpeedyStream, SonicStream } from './speedy.js';
//!
//! const sonic = new SonicStream(22050, 1);
//! sonic.setSpeed(2.0);
//! sonic.enableNonlinearSpeedup(1.0);
//! ```
//!
//! Sample arrays may be any array-like of numbers. Calls that can legitimately produce nothing
//! return `undefined` rather than an empty array, and errors are thrown.
//! Zero-copy variants (`*Ptr`) take byte offsets into the module's linear memory.

use js_sys::{Float32Array, Float64Array, Int16Array};
use wasm_bindgen::prelude::*;

use crate::marshal;
use crate::native::{Sonic, Speedy};
use crate::registry::interleave_speed_points;
use crate::{AnalysisStream, TransformStream};

// -------------------------------------------------------------------------------------------------

/// Reads a host array-like. Anything that is not an object, `undefined` and `null` included,
/// is absent.
fn host_numbers(value: &JsValue) -> Option<Vec<f64>> {
    if value.is_object() {
        Some(Float64Array::new(value).to_vec())
    } else {
        None
    }
}

/// Reads a host array-like as 16-bit samples, converting each number with `ToInt16`.
fn host_shorts(value: &JsValue) -> Option<Vec<i16>> {
    host_numbers(value).map(|numbers| numbers.into_iter().map(marshal::wrap_to_i16).collect())
}

// -------------------------------------------------------------------------------------------------

#[wasm_bindgen(js_name = SpeedyStream)]
pub struct JsSpeedyStream {
    inner: AnalysisStream<Speedy>,
}

#[wasm_bindgen(js_class = SpeedyStream)]
impl JsSpeedyStream {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: usize) -> Result<JsSpeedyStream, JsError> {
        Ok(JsSpeedyStream {
            inner: AnalysisStream::new(Speedy, sample_rate)?,
        })
    }

    #[wasm_bindgen(js_name = inputFrameSize)]
    pub fn input_frame_size(&self) -> usize {
        self.inner.input_frame_size()
    }

    #[wasm_bindgen(js_name = inputFrameStep)]
    pub fn input_frame_step(&self) -> usize {
        self.inner.input_frame_step()
    }

    #[wasm_bindgen(js_name = addData)]
    pub fn add_data(&mut self, input: &JsValue, at_time: i64) -> Result<(), JsError> {
        let host = host_numbers(input);
        Ok(self.inner.add_data(host.as_deref().unwrap_or(&[]), at_time)?)
    }

    #[wasm_bindgen(js_name = addDataPtr)]
    pub fn add_data_ptr(&mut self, input_ptr: usize, _size: usize, at_time: i64) {
        unsafe { self.inner.add_data_ptr(input_ptr as *const f32, at_time) }
    }

    #[wasm_bindgen(js_name = addDataShort)]
    pub fn add_data_short(&mut self, input: &JsValue, at_time: i64) -> Result<(), JsError> {
        let host = host_shorts(input);
        Ok(self.inner.add_data_i16(host.as_deref().unwrap_or(&[]), at_time)?)
    }

    #[wasm_bindgen(js_name = computeTension)]
    pub fn compute_tension(&mut self, at_time: i64) -> Result<f32, JsError> {
        Ok(self.inner.compute_tension(at_time)?)
    }

    #[wasm_bindgen(js_name = computeSpeedFromTension)]
    pub fn compute_speed_from_tension(&self, tension: f32, r_g: f32, duration_feedback_strength: f32) -> f32 {
        self.inner
            .compute_speed_from_tension(tension, r_g, duration_feedback_strength)
    }

    #[wasm_bindgen(js_name = getCurrentTime)]
    pub fn current_time(&self) -> i64 {
        self.inner.current_time()
    }

    #[wasm_bindgen(js_name = fftSize)]
    pub fn fft_size(&self) -> usize {
        self.inner.fft_size()
    }

    #[wasm_bindgen(js_name = frameRate)]
    pub fn frame_rate(&self) -> f32 {
        self.inner.frame_rate()
    }

    #[wasm_bindgen(js_name = preemphasisCoefficient)]
    pub fn preemphasis_coefficient(&self) -> f32 {
        self.inner.preemphasis_coefficient()
    }

    #[wasm_bindgen(js_name = temporalHysteresisFuture)]
    pub fn temporal_hysteresis_future(&self) -> usize {
        self.inner.temporal_hysteresis_future()
    }

    #[wasm_bindgen(js_name = temporalHysteresisPast)]
    pub fn temporal_hysteresis_past(&self) -> usize {
        self.inner.temporal_hysteresis_past()
    }

    #[wasm_bindgen(js_name = setPreemphasisFactor)]
    pub fn set_preemphasis_factor(&mut self, factor: f32) {
        self.inner.set_preemphasis_factor(factor);
    }

    #[wasm_bindgen(js_name = setLowEnergyThresholdScale)]
    pub fn set_low_energy_threshold_scale(&mut self, scale: f32) {
        self.inner.set_low_energy_threshold_scale(scale);
    }

    #[wasm_bindgen(js_name = setBinThresholdDivisor)]
    pub fn set_bin_threshold_divisor(&mut self, divisor: f32) {
        self.inner.set_bin_threshold_divisor(divisor);
    }

    #[wasm_bindgen(js_name = setTensionWeights)]
    pub fn set_tension_weights(&mut self, energy_weight: f32, speech_weight: f32) {
        self.inner.set_tension_weights(energy_weight, speech_weight);
    }

    #[wasm_bindgen(js_name = setTensionOffsets)]
    pub fn set_tension_offsets(&mut self, energy_offset: f32, speech_offset: f32) {
        self.inner.set_tension_offsets(energy_offset, speech_offset);
    }

    #[wasm_bindgen(js_name = setSpeechChangeCapMultiplier)]
    pub fn set_speech_change_cap_multiplier(&mut self, multiplier: f32) {
        self.inner.set_speech_change_cap_multiplier(multiplier);
    }
}

// -------------------------------------------------------------------------------------------------

#[wasm_bindgen(js_name = SonicStream)]
pub struct JsSonicStream {
    inner: TransformStream<Sonic>,
}

#[wasm_bindgen(js_class = SonicStream)]
impl JsSonicStream {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: usize, num_channels: usize) -> Result<JsSonicStream, JsError> {
        Ok(JsSonicStream {
            inner: TransformStream::new(Sonic, sample_rate, num_channels)?,
        })
    }

    #[wasm_bindgen(js_name = writeFloatToStream)]
    pub fn write_float_to_stream(&mut self, input: &JsValue, sample_count: usize) -> usize {
        let host = host_numbers(input);
        self.inner
            .write_float(host.as_deref().unwrap_or(&[]), sample_count)
    }

    #[wasm_bindgen(js_name = writeFloatToStreamPtr)]
    pub fn write_float_to_stream_ptr(&mut self, input_ptr: usize, sample_count: usize) -> usize {
        unsafe { self.inner.write_float_ptr(input_ptr as *const f32, sample_count) }
    }

    #[wasm_bindgen(js_name = readFloatFromStream)]
    pub fn read_float_from_stream(&mut self, buffer_size: usize) -> Option<Float32Array> {
        self.inner
            .read_float::<f32>(buffer_size)
            .map(|samples| Float32Array::from(&samples[..]))
    }

    #[wasm_bindgen(js_name = readFloatFromStreamPtr)]
    pub fn read_float_from_stream_ptr(&mut self, output_ptr: usize, buffer_size: usize) -> usize {
        unsafe { self.inner.read_float_ptr(output_ptr as *mut f32, buffer_size) }
    }

    #[wasm_bindgen(js_name = writeShortToStream)]
    pub fn write_short_to_stream(&mut self, input: &JsValue, sample_count: usize) -> usize {
        let host = host_shorts(input);
        self.inner
            .write_short(host.as_deref().unwrap_or(&[]), sample_count)
    }

    #[wasm_bindgen(js_name = writeShortToStreamPtr)]
    pub fn write_short_to_stream_ptr(&mut self, input_ptr: usize, sample_count: usize) -> usize {
        unsafe { self.inner.write_short_ptr(input_ptr as *const i16, sample_count) }
    }

    #[wasm_bindgen(js_name = readShortFromStream)]
    pub fn read_short_from_stream(&mut self, buffer_size: usize) -> Option<Int16Array> {
        self.inner
            .read_short::<i16>(buffer_size)
            .map(|samples| Int16Array::from(&samples[..]))
    }

    #[wasm_bindgen(js_name = readShortFromStreamPtr)]
    pub fn read_short_from_stream_ptr(&mut self, output_ptr: usize, buffer_size: usize) -> usize {
        unsafe { self.inner.read_short_ptr(output_ptr as *mut i16, buffer_size) }
    }

    #[wasm_bindgen(js_name = flushStream)]
    pub fn flush_stream(&mut self) -> usize {
        self.inner.flush()
    }

    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&mut self, rate: f32) {
        self.inner.set_speed(rate);
    }

    #[wasm_bindgen(js_name = getSpeed)]
    pub fn speed(&self) -> f32 {
        self.inner.speed()
    }

    #[wasm_bindgen(js_name = setRate)]
    pub fn set_rate(&mut self, rate: f32) {
        self.inner.set_rate(rate);
    }

    #[wasm_bindgen(js_name = enableNonlinearSpeedup)]
    pub fn enable_nonlinear_speedup(&mut self, nonlinear_factor: f32) {
        self.inner.enable_nonlinear_speedup(nonlinear_factor);
    }

    #[wasm_bindgen(js_name = setDurationFeedbackStrength)]
    pub fn set_duration_feedback_strength(&mut self, factor: f32) {
        self.inner.set_duration_feedback_strength(factor);
    }

    #[wasm_bindgen(js_name = setSpeedyPreemphasisFactor)]
    pub fn set_speedy_preemphasis_factor(&mut self, factor: f32) {
        self.inner.set_speedy_preemphasis_factor(factor);
    }

    #[wasm_bindgen(js_name = setSpeedyLowEnergyThresholdScale)]
    pub fn set_speedy_low_energy_threshold_scale(&mut self, scale: f32) {
        self.inner.set_speedy_low_energy_threshold_scale(scale);
    }

    #[wasm_bindgen(js_name = setSpeedyBinThresholdDivisor)]
    pub fn set_speedy_bin_threshold_divisor(&mut self, divisor: f32) {
        self.inner.set_speedy_bin_threshold_divisor(divisor);
    }

    #[wasm_bindgen(js_name = setSpeedyTensionWeights)]
    pub fn set_speedy_tension_weights(&mut self, energy_weight: f32, speech_weight: f32) {
        self.inner
            .set_speedy_tension_weights(energy_weight, speech_weight);
    }

    #[wasm_bindgen(js_name = setSpeedyTensionOffsets)]
    pub fn set_speedy_tension_offsets(&mut self, energy_offset: f32, speech_offset: f32) {
        self.inner
            .set_speedy_tension_offsets(energy_offset, speech_offset);
    }

    #[wasm_bindgen(js_name = setSpeedySpeechChangeCapMultiplier)]
    pub fn set_speedy_speech_change_cap_multiplier(&mut self, multiplier: f32) {
        self.inner.set_speedy_speech_change_cap_multiplier(multiplier);
    }

    #[wasm_bindgen(js_name = samplesAvailable)]
    pub fn samples_available(&self) -> usize {
        self.inner.samples_available()
    }

    #[wasm_bindgen(js_name = setupSpeedCallback)]
    pub fn setup_speed_callback(&mut self) {
        self.inner.enable_speed_profile_recording();
    }

    /// Returns the speed profile recorded since the last call as a flat array
    /// `[time0, speed0, time1, speed1, ...]`, or `undefined` if it is empty.
    #[wasm_bindgen(js_name = getSpeedProfile)]
    pub fn speed_profile(&mut self) -> Option<Float32Array> {
        let points = self.inner.drain_speed_profile()?;
        Some(Float32Array::from(&interleave_speed_points(&points)[..]))
    }

    #[wasm_bindgen(js_name = getSpeedyFrameRate)]
    pub fn speedy_frame_rate(&self) -> f32 {
        self.inner.speedy_frame_rate()
    }

    #[wasm_bindgen(js_name = getSpeedyPreemphasisCoefficient)]
    pub fn speedy_preemphasis_coefficient(&self) -> f32 {
        self.inner.speedy_preemphasis_coefficient()
    }

    #[wasm_bindgen(js_name = getSpeedyTemporalHysteresisFuture)]
    pub fn speedy_temporal_hysteresis_future(&self) -> usize {
        self.inner.speedy_temporal_hysteresis_future()
    }

    #[wasm_bindgen(js_name = getSpeedyTemporalHysteresisPast)]
    pub fn speedy_temporal_hysteresis_past(&self) -> usize {
        self.inner.speedy_temporal_hysteresis_past()
    }
}
