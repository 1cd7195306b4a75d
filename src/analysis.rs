use crate::engine::AnalysisEngine;
use crate::error::{Error, Result, StreamKind};
use crate::marshal::{self, HostSample};
use crate::params::{HysteresisProfile, TensionParameter, FRAME_RATE_HZ, PREEMPHASIS_COEFFICIENT};

// -------------------------------------------------------------------------------------------------

/// A safe wrapper around one tension analysis stream.
///
/// Audio is fed in frames of exactly [`input_frame_size`](Self::input_frame_size) samples,
/// each tagged with a frame time. Successive frames should start
/// [`input_frame_step`](Self::input_frame_step) samples apart for the tension to be meaningful;
/// the wrapper forwards whatever time it is given.
pub struct AnalysisStream<E: AnalysisEngine> {
    engine: E,
    stream: E::Handle,
    sample_rate: usize,
    hysteresis: HysteresisProfile,
}

impl<E: AnalysisEngine> AnalysisStream<E> {
    /// Creates and initializes an analysis stream.
    ///
    /// # Errors
    /// Returns an error if the sample rate is invalid, or if the engine cannot allocate the
    /// stream.
    pub fn new(engine: E, sample_rate: usize) -> Result<Self> {
        let native_rate = i32::try_from(sample_rate)
            .ok()
            .filter(|rate| *rate > 0)
            .ok_or(Error::InvalidSampleRate(sample_rate))?;

        let stream = engine
            .create_stream(native_rate)
            .ok_or(Error::StreamAllocation(StreamKind::Analysis))?;
        log::debug!("Created {} stream {stream:?} at {sample_rate} Hz", StreamKind::Analysis);

        Ok(AnalysisStream {
            engine,
            stream,
            sample_rate,
            hysteresis: HysteresisProfile::default(),
        })
    }

    /// Selects which hysteresis window layout the constant queries report.
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

    /// Number of samples every `add_data` call must provide.
    pub fn input_frame_size(&self) -> usize {
        self.engine.input_frame_size(self.stream).max(0) as usize
    }

    /// Number of samples between the starts of two consecutive frames.
    pub fn input_frame_step(&self) -> usize {
        self.engine.input_frame_step(self.stream).max(0) as usize
    }

    /// Adds one frame of audio at the given frame time.
    ///
    /// # Errors
    /// [`Error::EmptyInput`] if `samples` is empty, [`Error::ShortFrame`] if it holds fewer than
    /// `input_frame_size()` samples. Extra samples past the first frame are ignored.
    pub fn add_data<T: HostSample>(&mut self, samples: &[T], at_time: i64) -> Result<()> {
        let data = marshal::to_float_buffer(Some(samples));
        self.check_frame(data.len())?;
        unsafe { self.engine.add_data(self.stream, data.as_ptr(), at_time) };
        Ok(())
    }

    /// Adds one frame of audio at the given frame time, converted to 16-bit samples.
    ///
    /// # Errors
    /// As [`add_data`](Self::add_data).
    pub fn add_data_i16<T: HostSample>(&mut self, samples: &[T], at_time: i64) -> Result<()> {
        let data = marshal::to_int16_buffer(Some(samples));
        self.check_frame(data.len())?;
        unsafe { self.engine.add_data_short(self.stream, data.as_ptr(), at_time) };
        Ok(())
    }

    /// Zero-copy version of [`add_data`](Self::add_data): hands `samples` to the engine as is.
    ///
    /// # Safety
    /// `samples` must be aligned and point to at least `input_frame_size()` readable floats.
    /// None of this is checked.
    pub unsafe fn add_data_ptr(&mut self, samples: *const f32, at_time: i64) {
        self.engine.add_data(self.stream, samples, at_time);
    }

    /// Computes the tension at the given frame time.
    ///
    /// # Errors
    /// [`Error::InsufficientData`] if not enough frames around `at_time` were added yet.
    pub fn compute_tension(&mut self, at_time: i64) -> Result<f32> {
        self.engine
            .compute_tension(self.stream, at_time)
            .ok_or(Error::InsufficientData { at_time })
    }

    /// Converts a tension value to a playback speed multiplier.
    ///
    /// * **target_speed_ratio:** Target average speedup, e.g. 2.0
    /// * **feedback_strength:** Strength of the duration error correction (0.0 to 0.5)
    pub fn compute_speed_from_tension(
        &self,
        tension: f32,
        target_speed_ratio: f32,
        feedback_strength: f32,
    ) -> f32 {
        self.engine.compute_speed_from_tension(
            self.stream,
            tension,
            target_speed_ratio,
            feedback_strength,
        )
    }

    /// Current frame time of the analysis.
    pub fn current_time(&self) -> i64 {
        self.engine.current_time(self.stream)
    }

    /// FFT size used for the spectral analysis, in samples.
    pub fn fft_size(&self) -> usize {
        self.engine.fft_size(self.stream).max(0) as usize
    }

    /// Forwards a tuning parameter to the engine without validating it.
    pub fn apply_tension_parameter(&mut self, parameter: TensionParameter) {
        self.engine.set_tension_parameter(self.stream, parameter);
    }

    pub fn set_preemphasis_factor(&mut self, factor: f32) {
        self.apply_tension_parameter(TensionParameter::PreemphasisFactor(factor));
    }

    pub fn set_low_energy_threshold_scale(&mut self, scale: f32) {
        self.apply_tension_parameter(TensionParameter::LowEnergyThresholdScale(scale));
    }

    pub fn set_bin_threshold_divisor(&mut self, divisor: f32) {
        self.apply_tension_parameter(TensionParameter::BinThresholdDivisor(divisor));
    }

    pub fn set_tension_weights(&mut self, energy_weight: f32, speech_weight: f32) {
        self.apply_tension_parameter(TensionParameter::TensionWeights {
            energy: energy_weight,
            speech: speech_weight,
        });
    }

    pub fn set_tension_offsets(&mut self, energy_offset: f32, speech_offset: f32) {
        self.apply_tension_parameter(TensionParameter::TensionOffsets {
            energy: energy_offset,
            speech: speech_offset,
        });
    }

    pub fn set_speech_change_cap_multiplier(&mut self, multiplier: f32) {
        self.apply_tension_parameter(TensionParameter::SpeechChangeCapMultiplier(multiplier));
    }

    /// Frame rate of the analysis, in Hz.
    pub fn frame_rate(&self) -> f32 {
        FRAME_RATE_HZ
    }

    /// Preemphasis filter coefficient.
    pub fn preemphasis_coefficient(&self) -> f32 {
        PREEMPHASIS_COEFFICIENT
    }

    pub fn hysteresis_profile(&self) -> HysteresisProfile {
        self.hysteresis
    }

    /// Number of future frames of the temporal hysteresis.
    pub fn temporal_hysteresis_future(&self) -> usize {
        self.hysteresis.future_frames()
    }

    /// Number of past frames of the temporal hysteresis.
    pub fn temporal_hysteresis_past(&self) -> usize {
        self.hysteresis.past_frames()
    }

    fn check_frame(&self, actual: usize) -> Result<()> {
        if actual == 0 {
            return Err(Error::EmptyInput);
        }
        let expected = self.input_frame_size();
        if actual < expected {
            return Err(Error::ShortFrame { expected, actual });
        }
        Ok(())
    }
}

impl<E: AnalysisEngine> Drop for AnalysisStream<E> {
    /// Destroys the analysis stream and frees its memory.
    fn drop(&mut self) {
        self.engine.destroy_stream(self.stream);
        log::debug!("Destroyed {} stream {:?}", StreamKind::Analysis, self.stream);
    }
}

// -------------------------------------------------------------------------------------------------
