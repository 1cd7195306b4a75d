use std::sync::Arc;

use crate::engine::TransformEngine;
use crate::error::{Error, Result, StreamKind};
use crate::marshal::{self, HostSample};
use crate::params::{HysteresisProfile, TensionParameter, FRAME_RATE_HZ, PREEMPHASIS_COEFFICIENT};
use crate::registry::{SpeedPoint, SpeedProfile};

// -------------------------------------------------------------------------------------------------

/// A safe wrapper around one time-scale modification stream, for "streaming" applications
/// that write audio in, change speed or rate on the fly, and read processed audio out.
///
/// Sample counts are per channel; sample buffers are interleaved.
///
/// While the stream is alive its handle is registered in the engine's callback registry, so
/// per-frame speed callbacks from the engine end up in this stream's speed profile once
/// [`enable_speed_profile_recording`](Self::enable_speed_profile_recording) was called.
pub struct TransformStream<E: TransformEngine> {
    engine: E,
    stream: E::Handle,
    sample_rate: usize,
    num_channels: usize,
    hysteresis: HysteresisProfile,
    speed_profile: Arc<SpeedProfile>,
    recording: bool,
}

impl<E: TransformEngine> TransformStream<E> {
    /// Creates a new stream and registers it for speed callbacks.
    ///
    /// # Errors
    /// Returns an error if the sample rate or channel count is invalid, or if the engine cannot
    /// allocate the stream. Nothing is registered in that case.
    pub fn new(engine: E, sample_rate: usize, num_channels: usize) -> Result<Self> {
        let native_rate = i32::try_from(sample_rate)
            .ok()
            .filter(|rate| *rate > 0)
            .ok_or(Error::InvalidSampleRate(sample_rate))?;
        let native_channels = i32::try_from(num_channels)
            .ok()
            .filter(|channels| *channels > 0)
            .ok_or(Error::InvalidChannelCount(num_channels))?;

        let stream = engine
            .create_stream(native_rate, native_channels)
            .ok_or(Error::StreamAllocation(StreamKind::Transform))?;

        let speed_profile = Arc::new(SpeedProfile::new());
        engine.callbacks().register(stream, speed_profile.clone());
        log::debug!(
            "Created {} stream {stream:?} at {sample_rate} Hz with {num_channels} channel(s)",
            StreamKind::Transform
        );

        Ok(TransformStream {
            engine,
            stream,
            sample_rate,
            num_channels,
            hysteresis: HysteresisProfile::default(),
            speed_profile,
            recording: false,
        })
    }

    /// Selects which hysteresis window layout the Speedy constant queries report.
    pub fn with_hysteresis_profile(mut self, profile: HysteresisProfile) -> Self {
        self.hysteresis = profile;
        self
    }

    #[cfg(test)]
    pub(crate) fn handle(&self) -> E::Handle {
        self.stream
    }

    /// Returns the stream's sample rate.
    pub fn sample_rate(&self) -> usize {
        self.sample_rate
    }

    /// Returns the stream's channel count.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Writes up to `count` frames of interleaved float samples. Returns the number of frames
    /// the engine accepted, which may be less than requested.
    ///
    /// `count` is capped at the number of whole frames in `samples`. An empty `samples` writes
    /// nothing and returns 0.
    pub fn write_float<T: HostSample>(&mut self, samples: &[T], count: usize) -> usize {
        let data = marshal::to_float_buffer(Some(samples));
        if data.is_empty() {
            return 0;
        }
        let count = self.frames_in(data.len(), count);
        Self::accepted(unsafe { self.engine.write_float(self.stream, data.as_ptr(), count) })
    }

    /// Writes up to `count` frames of interleaved 16-bit samples. See [`write_float`](Self::write_float).
    pub fn write_short<T: HostSample>(&mut self, samples: &[T], count: usize) -> usize {
        let data = marshal::to_int16_buffer(Some(samples));
        if data.is_empty() {
            return 0;
        }
        let count = self.frames_in(data.len(), count);
        Self::accepted(unsafe { self.engine.write_short(self.stream, data.as_ptr(), count) })
    }

    /// Zero-copy version of [`write_float`](Self::write_float).
    ///
    /// # Safety
    /// Unless `count` is 0, `samples` must be aligned and point to `count * num_channels()`
    /// readable floats. None of this is checked; the address is forwarded unchanged.
    pub unsafe fn write_float_ptr(&mut self, samples: *const f32, count: usize) -> usize {
        Self::accepted(self.engine.write_float(self.stream, samples, Self::clamp(count)))
    }

    /// Zero-copy version of [`write_short`](Self::write_short).
    ///
    /// # Safety
    /// As [`write_float_ptr`](Self::write_float_ptr), for shorts.
    pub unsafe fn write_short_ptr(&mut self, samples: *const i16, count: usize) -> usize {
        Self::accepted(self.engine.write_short(self.stream, samples, Self::clamp(count)))
    }

    /// Reads up to `max_count` frames of processed float output.
    ///
    /// Returns `None` if no output is available right now, else exactly the frames produced
    /// (at least one), interleaved.
    pub fn read_float<T: HostSample>(&mut self, max_count: usize) -> Option<Vec<T>> {
        let max_count = Self::clamp(max_count);
        let mut output = vec![0.0f32; max_count as usize * self.num_channels];
        let frames = unsafe { self.engine.read_float(self.stream, output.as_mut_ptr(), max_count) };
        output.truncate(Self::accepted(frames).min(max_count as usize) * self.num_channels);
        marshal::from_float_buffer(&output)
    }

    /// Reads up to `max_count` frames of processed 16-bit output. See [`read_float`](Self::read_float).
    pub fn read_short<T: HostSample>(&mut self, max_count: usize) -> Option<Vec<T>> {
        let max_count = Self::clamp(max_count);
        let mut output = vec![0i16; max_count as usize * self.num_channels];
        let frames = unsafe { self.engine.read_short(self.stream, output.as_mut_ptr(), max_count) };
        output.truncate(Self::accepted(frames).min(max_count as usize) * self.num_channels);
        marshal::from_int16_buffer(&output)
    }

    /// Zero-copy version of [`read_float`](Self::read_float). Returns the number of frames
    /// written to `samples`; 0 means no output is available yet.
    ///
    /// # Safety
    /// Unless `max_count` is 0, `samples` must be aligned and point to
    /// `max_count * num_channels()` writable floats that nothing else accesses during the call.
    /// None of this is checked; the address is forwarded unchanged.
    pub unsafe fn read_float_ptr(&mut self, samples: *mut f32, max_count: usize) -> usize {
        Self::accepted(self.engine.read_float(self.stream, samples, Self::clamp(max_count)))
    }

    /// Zero-copy version of [`read_short`](Self::read_short).
    ///
    /// # Safety
    /// As [`read_float_ptr`](Self::read_float_ptr), for shorts.
    pub unsafe fn read_short_ptr(&mut self, samples: *mut i16, max_count: usize) -> usize {
        Self::accepted(self.engine.read_short(self.stream, samples, Self::clamp(max_count)))
    }

    /// Signals the end of the input and forces out everything the engine still holds back.
    /// Returns the number of frames flushed; read them with the `read_*` functions.
    pub fn flush(&mut self) -> usize {
        Self::accepted(self.engine.flush(self.stream))
    }

    /// Number of processed frames ready to be read.
    pub fn samples_available(&self) -> usize {
        Self::accepted(self.engine.samples_available(self.stream))
    }

    /// Sets the playback speed. Values > 1.0 speed up, values < 1.0 slow down.
    pub fn set_speed(&mut self, speed: f32) {
        self.engine.set_speed(self.stream, speed);
    }

    pub fn speed(&self) -> f32 {
        self.engine.speed(self.stream)
    }

    /// Sets the resampling rate, which changes pitch independent of speed.
    pub fn set_rate(&mut self, rate: f32) {
        self.engine.set_rate(self.stream, rate);
    }

    /// Blends in tension-driven speed control: 0.0 is plain linear speedup, 1.0 fully follows
    /// the tension analysis.
    pub fn enable_nonlinear_speedup(&mut self, factor: f32) {
        self.engine.enable_nonlinear_speedup(self.stream, factor);
    }

    /// Sets how strongly the accumulated duration error is fed back into the speed
    /// (0.0 to 0.5, 0.1 recommended).
    pub fn set_duration_feedback_strength(&mut self, factor: f32) {
        self.engine.set_duration_feedback_strength(self.stream, factor);
    }

    /// Forwards a tuning parameter to the analysis that drives nonlinear speedup.
    pub fn apply_speedy_parameter(&mut self, parameter: TensionParameter) {
        self.engine.set_speedy_parameter(self.stream, parameter);
    }

    pub fn set_speedy_preemphasis_factor(&mut self, factor: f32) {
        self.apply_speedy_parameter(TensionParameter::PreemphasisFactor(factor));
    }

    pub fn set_speedy_low_energy_threshold_scale(&mut self, scale: f32) {
        self.apply_speedy_parameter(TensionParameter::LowEnergyThresholdScale(scale));
    }

    pub fn set_speedy_bin_threshold_divisor(&mut self, divisor: f32) {
        self.apply_speedy_parameter(TensionParameter::BinThresholdDivisor(divisor));
    }

    pub fn set_speedy_tension_weights(&mut self, energy_weight: f32, speech_weight: f32) {
        self.apply_speedy_parameter(TensionParameter::TensionWeights {
            energy: energy_weight,
            speech: speech_weight,
        });
    }

    pub fn set_speedy_tension_offsets(&mut self, energy_offset: f32, speech_offset: f32) {
        self.apply_speedy_parameter(TensionParameter::TensionOffsets {
            energy: energy_offset,
            speech: speech_offset,
        });
    }

    pub fn set_speedy_speech_change_cap_multiplier(&mut self, multiplier: f32) {
        self.apply_speedy_parameter(TensionParameter::SpeechChangeCapMultiplier(multiplier));
    }

    /// Starts recording the per-frame speeds the engine applies. Calling it again is a no-op.
    pub fn enable_speed_profile_recording(&mut self) {
        let callbacks = self.engine.callbacks();
        if !callbacks.contains(self.stream) {
            callbacks.register(self.stream, self.speed_profile.clone());
        }
        if !self.recording {
            self.engine.enable_speed_callback(self.stream);
            self.recording = true;
            log::debug!("Recording speed profile of {} stream {:?}", StreamKind::Transform, self.stream);
        }
    }

    pub fn is_recording_speed_profile(&self) -> bool {
        self.recording
    }

    /// Takes the speed profile recorded since the last call. Returns `None` if it is empty.
    pub fn drain_speed_profile(&mut self) -> Option<Vec<SpeedPoint>> {
        self.speed_profile.drain()
    }

    /// Frame rate of the driving analysis, in Hz.
    pub fn speedy_frame_rate(&self) -> f32 {
        FRAME_RATE_HZ
    }

    /// Preemphasis coefficient of the driving analysis.
    pub fn speedy_preemphasis_coefficient(&self) -> f32 {
        PREEMPHASIS_COEFFICIENT
    }

    pub fn hysteresis_profile(&self) -> HysteresisProfile {
        self.hysteresis
    }

    /// Number of future frames of the driving analysis' temporal hysteresis.
    pub fn speedy_temporal_hysteresis_future(&self) -> usize {
        self.hysteresis.future_frames()
    }

    /// Number of past frames of the driving analysis' temporal hysteresis.
    pub fn speedy_temporal_hysteresis_past(&self) -> usize {
        self.hysteresis.past_frames()
    }

    fn frames_in(&self, len: usize, count: usize) -> i32 {
        Self::clamp(count.min(len / self.num_channels))
    }

    fn clamp(count: usize) -> i32 {
        count.min(i32::MAX as usize) as i32
    }

    fn accepted(count: i32) -> usize {
        count.max(0) as usize
    }
}

impl<E: TransformEngine> Drop for TransformStream<E> {
    fn drop(&mut self) {
        // no callback may reach the stream once the native side is gone
        let (engine, stream) = (&self.engine, self.stream);
        engine
            .callbacks()
            .unregister_with(stream, || engine.destroy_stream(stream));
        log::debug!("Destroyed {} stream {stream:?}", StreamKind::Transform);
    }
}

// -------------------------------------------------------------------------------------------------
