//! Engine adapters for the native Speedy and Sonic libraries.

use std::ffi::{c_float, c_int};
use std::ptr::NonNull;

use once_cell::sync::Lazy;

use crate::{
    AnalysisEngine, AnalysisStream, CallbackRegistry, TensionParameter, TransformEngine,
    TransformStream,
};

// -------------------------------------------------------------------------------------------------

/// An analysis stream backed by the native Speedy library.
pub type SpeedyStream = AnalysisStream<Speedy>;

/// A transform stream backed by the native Sonic library.
pub type SonicStream = TransformStream<Sonic>;

// -------------------------------------------------------------------------------------------------

/// Handle of a native Speedy stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpeedyHandle(NonNull<speedy_sys::SpeedyStream>);

unsafe impl Send for SpeedyHandle {}
unsafe impl Sync for SpeedyHandle {}

impl SpeedyHandle {
    fn as_ptr(self) -> *mut speedy_sys::SpeedyStream {
        self.0.as_ptr()
    }
}

/// Handle of a native Sonic stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SonicHandle(NonNull<speedy_sys::SonicStream>);

unsafe impl Send for SonicHandle {}
unsafe impl Sync for SonicHandle {}

impl SonicHandle {
    fn as_ptr(self) -> *mut speedy_sys::SonicStream {
        self.0.as_ptr()
    }
}

// -------------------------------------------------------------------------------------------------

/// Process-wide routing table for Sonic speed callbacks.
static SONIC_CALLBACKS: Lazy<CallbackRegistry<SonicHandle>> = Lazy::new(CallbackRegistry::new);

/// Speed callback handed to Sonic. Sonic only passes the stream pointer back, so the owning
/// stream is looked up in [`SONIC_CALLBACKS`].
unsafe extern "C" fn dispatch_speed(
    stream: *mut speedy_sys::SonicStream,
    time: c_int,
    speed: c_float,
) {
    if let Some(stream) = NonNull::new(stream) {
        SONIC_CALLBACKS.dispatch(SonicHandle(stream), time, speed);
    }
}

// -------------------------------------------------------------------------------------------------

/// The native Speedy tension analysis engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Speedy;

impl AnalysisEngine for Speedy {
    type Handle = SpeedyHandle;

    fn create_stream(&self, sample_rate: i32) -> Option<SpeedyHandle> {
        NonNull::new(speedy_sys::speedy::create(sample_rate)).map(SpeedyHandle)
    }

    fn destroy_stream(&self, stream: SpeedyHandle) {
        speedy_sys::speedy::destroy(stream.as_ptr());
    }

    fn input_frame_size(&self, stream: SpeedyHandle) -> i32 {
        speedy_sys::speedy::input_frame_size(stream.as_ptr())
    }

    fn input_frame_step(&self, stream: SpeedyHandle) -> i32 {
        speedy_sys::speedy::input_frame_step(stream.as_ptr())
    }

    unsafe fn add_data(&self, stream: SpeedyHandle, samples: *const f32, at_time: i64) {
        speedy_sys::speedy::add_data(stream.as_ptr(), samples, at_time);
    }

    unsafe fn add_data_short(&self, stream: SpeedyHandle, samples: *const i16, at_time: i64) {
        speedy_sys::speedy::add_data_short(stream.as_ptr(), samples, at_time);
    }

    fn compute_tension(&self, stream: SpeedyHandle, at_time: i64) -> Option<f32> {
        let mut tension = 0.0;
        let computed = speedy_sys::speedy::compute_tension(stream.as_ptr(), at_time, &mut tension);
        (computed != 0).then_some(tension)
    }

    fn compute_speed_from_tension(
        &self,
        stream: SpeedyHandle,
        tension: f32,
        target_speed_ratio: f32,
        feedback_strength: f32,
    ) -> f32 {
        speedy_sys::speedy::compute_speed_from_tension(
            tension,
            target_speed_ratio,
            feedback_strength,
            stream.as_ptr(),
        )
    }

    fn current_time(&self, stream: SpeedyHandle) -> i64 {
        speedy_sys::speedy::current_time(stream.as_ptr())
    }

    fn fft_size(&self, stream: SpeedyHandle) -> i32 {
        speedy_sys::speedy::fft_size(stream.as_ptr())
    }

    fn set_tension_parameter(&self, stream: SpeedyHandle, parameter: TensionParameter) {
        use speedy_sys::speedy;
        let stream = stream.as_ptr();
        match parameter {
            TensionParameter::PreemphasisFactor(factor) => {
                speedy::set_preemphasis_factor(stream, factor)
            }
            TensionParameter::LowEnergyThresholdScale(scale) => {
                speedy::set_low_energy_threshold_scale(stream, scale)
            }
            TensionParameter::BinThresholdDivisor(divisor) => {
                speedy::set_bin_threshold_divisor(stream, divisor)
            }
            TensionParameter::TensionWeights { energy, speech } => {
                speedy::set_tension_weights(stream, energy, speech)
            }
            TensionParameter::TensionOffsets { energy, speech } => {
                speedy::set_tension_offsets(stream, energy, speech)
            }
            TensionParameter::SpeechChangeCapMultiplier(multiplier) => {
                speedy::set_speech_change_cap_multiplier(stream, multiplier)
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// The native Sonic time-scale modification engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sonic;

impl TransformEngine for Sonic {
    type Handle = SonicHandle;

    fn create_stream(&self, sample_rate: i32, num_channels: i32) -> Option<SonicHandle> {
        NonNull::new(speedy_sys::sonic::create(sample_rate, num_channels)).map(SonicHandle)
    }

    fn destroy_stream(&self, stream: SonicHandle) {
        speedy_sys::sonic::destroy(stream.as_ptr());
    }

    unsafe fn write_float(&self, stream: SonicHandle, samples: *const f32, count: i32) -> i32 {
        speedy_sys::sonic::write_float(stream.as_ptr(), samples, count)
    }

    unsafe fn write_short(&self, stream: SonicHandle, samples: *const i16, count: i32) -> i32 {
        speedy_sys::sonic::write_short(stream.as_ptr(), samples, count)
    }

    unsafe fn read_float(&self, stream: SonicHandle, samples: *mut f32, max_count: i32) -> i32 {
        speedy_sys::sonic::read_float(stream.as_ptr(), samples, max_count)
    }

    unsafe fn read_short(&self, stream: SonicHandle, samples: *mut i16, max_count: i32) -> i32 {
        speedy_sys::sonic::read_short(stream.as_ptr(), samples, max_count)
    }

    fn flush(&self, stream: SonicHandle) -> i32 {
        speedy_sys::sonic::flush(stream.as_ptr())
    }

    fn samples_available(&self, stream: SonicHandle) -> i32 {
        speedy_sys::sonic::samples_available(stream.as_ptr())
    }

    fn speed(&self, stream: SonicHandle) -> f32 {
        speedy_sys::sonic::speed(stream.as_ptr())
    }

    fn set_speed(&self, stream: SonicHandle, speed: f32) {
        speedy_sys::sonic::set_speed(stream.as_ptr(), speed);
    }

    fn set_rate(&self, stream: SonicHandle, rate: f32) {
        speedy_sys::sonic::set_rate(stream.as_ptr(), rate);
    }

    fn enable_nonlinear_speedup(&self, stream: SonicHandle, factor: f32) {
        speedy_sys::sonic::enable_nonlinear_speedup(stream.as_ptr(), factor);
    }

    fn set_duration_feedback_strength(&self, stream: SonicHandle, factor: f32) {
        speedy_sys::sonic::set_duration_feedback_strength(stream.as_ptr(), factor);
    }

    fn set_speedy_parameter(&self, stream: SonicHandle, parameter: TensionParameter) {
        use speedy_sys::sonic;
        let stream = stream.as_ptr();
        match parameter {
            TensionParameter::PreemphasisFactor(factor) => {
                sonic::set_speedy_preemphasis_factor(stream, factor)
            }
            TensionParameter::LowEnergyThresholdScale(scale) => {
                sonic::set_speedy_low_energy_threshold_scale(stream, scale)
            }
            TensionParameter::BinThresholdDivisor(divisor) => {
                sonic::set_speedy_bin_threshold_divisor(stream, divisor)
            }
            TensionParameter::TensionWeights { energy, speech } => {
                sonic::set_speedy_tension_weights(stream, energy, speech)
            }
            TensionParameter::TensionOffsets { energy, speech } => {
                sonic::set_speedy_tension_offsets(stream, energy, speech)
            }
            TensionParameter::SpeechChangeCapMultiplier(multiplier) => {
                sonic::set_speedy_speech_change_cap_multiplier(stream, multiplier)
            }
        }
    }

    fn callbacks(&self) -> &CallbackRegistry<SonicHandle> {
        &SONIC_CALLBACKS
    }

    fn enable_speed_callback(&self, stream: SonicHandle) {
        speedy_sys::sonic::set_speed_callback(stream.as_ptr(), Some(dispatch_speed));
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn speedy_needs_data_before_tension() {
        let mut speedy = SpeedyStream::new(Speedy, 22050).unwrap();
        let frame_size = speedy.input_frame_size();
        assert!(frame_size > 0);
        assert!(speedy.input_frame_step() > 0);
        assert!(speedy.fft_size() > 0);

        assert_eq!(
            speedy.compute_tension(0),
            Err(Error::InsufficientData { at_time: 0 })
        );
        assert_eq!(speedy.add_data::<f32>(&[], 0), Err(Error::EmptyInput));

        // a few seconds of a voiced-ish signal
        for time in 0..300i64 {
            let frame: Vec<f32> = (0..frame_size)
                .map(|i| ((time as f32 * 220.0 + i as f32) * 0.07).sin() * 0.3)
                .collect();
            speedy.add_data(&frame, time).unwrap();
        }
        let tension = speedy.compute_tension(100).unwrap();
        assert!(tension.is_finite());
    }

    #[test]
    fn sonic_stream_processing() {
        const SAMPLE_RATE: usize = 22050;
        const INPUT_SAMPLES_COUNT: usize = 4096;

        let mut sonic = SonicStream::new(Sonic, SAMPLE_RATE, 1).unwrap();
        let handle = sonic.handle();
        assert!(Sonic.callbacks().contains(handle));

        sonic.set_speed(2.0);
        assert_eq!(sonic.speed(), 2.0);
        sonic.enable_speed_profile_recording();

        let input = vec![0.0f32; INPUT_SAMPLES_COUNT];
        assert!(sonic.write_float(&input, INPUT_SAMPLES_COUNT) > 0);

        let output = sonic
            .read_float::<f32>(INPUT_SAMPLES_COUNT)
            .expect("sonic should produce output");
        assert!(output.len() <= INPUT_SAMPLES_COUNT / 2);

        sonic.flush();
        while sonic.read_float::<f32>(INPUT_SAMPLES_COUNT).is_some() {}
        assert_eq!(sonic.samples_available(), 0);

        drop(sonic);
        assert!(!Sonic.callbacks().contains(handle));
    }
}
