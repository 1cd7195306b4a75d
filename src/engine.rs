//! The stream-handle interfaces of the two native engines.
//!
//! Both traits mirror the engines' C API one to one: a factory that returns an opaque handle
//! (or nothing when out of memory), a destructor, and calls that take the handle. The stream
//! wrappers in this crate own a handle for its entire lifetime and only pass handles to the
//! engine that created them, so implementations may assume every handle they are given is live.

use std::fmt::Debug;
use std::hash::Hash;

use crate::params::TensionParameter;
use crate::registry::CallbackRegistry;

// -------------------------------------------------------------------------------------------------

/// The tension analysis engine (Speedy).
pub trait AnalysisEngine {
    /// Opaque stream identity allocated by the engine.
    type Handle: Copy + Eq + Debug;

    /// Allocates a stream. `None` means the engine ran out of memory.
    fn create_stream(&self, sample_rate: i32) -> Option<Self::Handle>;
    /// Releases a stream. Called exactly once per handle.
    fn destroy_stream(&self, stream: Self::Handle);

    fn input_frame_size(&self, stream: Self::Handle) -> i32;
    fn input_frame_step(&self, stream: Self::Handle) -> i32;

    /// Adds one input frame.
    ///
    /// # Safety
    /// `samples` must point to at least `input_frame_size(stream)` readable floats.
    unsafe fn add_data(&self, stream: Self::Handle, samples: *const f32, at_time: i64);

    /// Adds one 16-bit input frame.
    ///
    /// # Safety
    /// `samples` must point to at least `input_frame_size(stream)` readable shorts.
    unsafe fn add_data_short(&self, stream: Self::Handle, samples: *const i16, at_time: i64);

    /// Tension at `at_time`, or `None` if the added frames do not cover the analysis window.
    fn compute_tension(&self, stream: Self::Handle, at_time: i64) -> Option<f32>;
    fn compute_speed_from_tension(
        &self,
        stream: Self::Handle,
        tension: f32,
        target_speed_ratio: f32,
        feedback_strength: f32,
    ) -> f32;

    fn current_time(&self, stream: Self::Handle) -> i64;
    fn fft_size(&self, stream: Self::Handle) -> i32;

    fn set_tension_parameter(&self, stream: Self::Handle, parameter: TensionParameter);
}

// -------------------------------------------------------------------------------------------------

/// The time-scale modification engine (Sonic).
///
/// Sample counts are frames, i.e. samples per channel. Buffers are interleaved.
pub trait TransformEngine {
    /// Opaque stream identity allocated by the engine. Handles may be reused after destruction.
    type Handle: Copy + Eq + Hash + Debug;

    /// Allocates a stream. `None` means the engine ran out of memory.
    fn create_stream(&self, sample_rate: i32, num_channels: i32) -> Option<Self::Handle>;
    /// Releases a stream. Called exactly once per handle, and never concurrently with a speed
    /// callback dispatch. Must not invoke the speed callback itself.
    fn destroy_stream(&self, stream: Self::Handle);

    /// Returns the number of frames accepted.
    ///
    /// # Safety
    /// `samples` must point to at least `count * num_channels` readable floats.
    unsafe fn write_float(&self, stream: Self::Handle, samples: *const f32, count: i32) -> i32;

    /// Returns the number of frames accepted.
    ///
    /// # Safety
    /// `samples` must point to at least `count * num_channels` readable shorts.
    unsafe fn write_short(&self, stream: Self::Handle, samples: *const i16, count: i32) -> i32;

    /// Returns the number of frames written to `samples`.
    ///
    /// # Safety
    /// `samples` must point to at least `max_count * num_channels` writable floats.
    unsafe fn read_float(&self, stream: Self::Handle, samples: *mut f32, max_count: i32) -> i32;

    /// Returns the number of frames written to `samples`.
    ///
    /// # Safety
    /// `samples` must point to at least `max_count * num_channels` writable shorts.
    unsafe fn read_short(&self, stream: Self::Handle, samples: *mut i16, max_count: i32) -> i32;

    fn flush(&self, stream: Self::Handle) -> i32;
    fn samples_available(&self, stream: Self::Handle) -> i32;

    fn speed(&self, stream: Self::Handle) -> f32;
    fn set_speed(&self, stream: Self::Handle, speed: f32);
    fn set_rate(&self, stream: Self::Handle, rate: f32);
    fn enable_nonlinear_speedup(&self, stream: Self::Handle, factor: f32);
    fn set_duration_feedback_strength(&self, stream: Self::Handle, factor: f32);

    /// Tunes the analysis instance the engine drives for nonlinear speedup.
    fn set_speedy_parameter(&self, stream: Self::Handle, parameter: TensionParameter);

    /// The registry this engine's speed callbacks are dispatched through.
    fn callbacks(&self) -> &CallbackRegistry<Self::Handle>;
    /// Makes the engine report per-frame speeds for `stream` through [`Self::callbacks`].
    fn enable_speed_callback(&self, stream: Self::Handle);
}
