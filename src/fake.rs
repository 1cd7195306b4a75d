//! Deterministic in-process stand-ins for the native engines, used by the unit tests.
//!
//! The analysis fake stores per-frame energies and reports the RMS of a frame as its tension
//! once `TENSION_LOOKAHEAD` later frames exist. The transform fake buffers input and, whenever
//! output is requested, resamples complete blocks by dropping or repeating frames according to
//! `speed * rate`, emitting one speed callback per block. Handles are small integers recycled
//! after destruction, like a native allocator reusing addresses.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::{AnalysisEngine, TransformEngine};
use crate::params::TensionParameter;
use crate::registry::CallbackRegistry;

// -------------------------------------------------------------------------------------------------

/// Frames after `at_time` that must exist before its tension can be computed.
pub(crate) const TENSION_LOOKAHEAD: i64 = 2;

/// Frames processed per transform block, and per speed callback.
pub(crate) const BLOCK_FRAMES: usize = 256;

#[derive(Default)]
struct Handles {
    next: u32,
    free: Vec<u32>,
    fail_next: bool,
    destroyed: Vec<u32>,
}

impl Handles {
    fn allocate(&mut self) -> Option<u32> {
        if std::mem::take(&mut self.fail_next) {
            return None;
        }
        Some(self.free.pop().unwrap_or_else(|| {
            self.next += 1;
            self.next
        }))
    }

    fn release(&mut self, handle: u32) {
        self.destroyed.push(handle);
        self.free.push(handle);
    }
}

// -------------------------------------------------------------------------------------------------

struct AnalysisState {
    sample_rate: i32,
    energies: BTreeMap<i64, f32>,
    current_time: i64,
    parameters: Vec<TensionParameter>,
}

#[derive(Default)]
struct SpeedyState {
    handles: Handles,
    streams: HashMap<u32, AnalysisState>,
    last_speed_request: Option<(f32, f32, f32)>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeSpeedy {
    state: Arc<Mutex<SpeedyState>>,
}

impl FakeSpeedy {
    pub fn fail_next_create(&self) {
        self.state.lock().handles.fail_next = true;
    }

    pub fn live_streams(&self) -> usize {
        self.state.lock().streams.len()
    }

    pub fn destroyed(&self) -> Vec<u32> {
        self.state.lock().handles.destroyed.clone()
    }

    pub fn frames_added(&self, stream: u32) -> usize {
        self.state.lock().streams[&stream].energies.len()
    }

    pub fn parameters(&self, stream: u32) -> Vec<TensionParameter> {
        self.state.lock().streams[&stream].parameters.clone()
    }

    pub fn last_speed_request(&self) -> Option<(f32, f32, f32)> {
        self.state.lock().last_speed_request
    }

    pub fn frame_step_for(sample_rate: i32) -> i32 {
        sample_rate / 100
    }

    pub fn frame_size_for(sample_rate: i32) -> i32 {
        2 * Self::frame_step_for(sample_rate)
    }

    pub fn fft_size_for(&self, sample_rate: usize) -> usize {
        (Self::frame_size_for(sample_rate as i32) as usize).next_power_of_two()
    }

    pub fn speed_from_tension(tension: f32, target_speed_ratio: f32, feedback_strength: f32) -> f32 {
        target_speed_ratio * (1.0 + feedback_strength) / (1.0 + tension)
    }

    fn frame_size(&self, stream: u32) -> usize {
        Self::frame_size_for(self.state.lock().streams[&stream].sample_rate) as usize
    }

    fn store_frame(&self, stream: u32, frame: impl Iterator<Item = f32>, at_time: i64) {
        let (sum, count) = frame.fold((0.0f32, 0usize), |(sum, count), v| (sum + v * v, count + 1));
        let mut state = self.state.lock();
        let analysis = state.streams.get_mut(&stream).unwrap();
        analysis.energies.insert(at_time, sum / count.max(1) as f32);
        analysis.current_time = analysis.current_time.max(at_time);
    }
}

impl AnalysisEngine for FakeSpeedy {
    type Handle = u32;

    fn create_stream(&self, sample_rate: i32) -> Option<u32> {
        let mut state = self.state.lock();
        let handle = state.handles.allocate()?;
        state.streams.insert(
            handle,
            AnalysisState {
                sample_rate,
                energies: BTreeMap::new(),
                current_time: 0,
                parameters: Vec::new(),
            },
        );
        Some(handle)
    }

    fn destroy_stream(&self, stream: u32) {
        let mut state = self.state.lock();
        state.streams.remove(&stream).unwrap();
        state.handles.release(stream);
    }

    fn input_frame_size(&self, stream: u32) -> i32 {
        self.frame_size(stream) as i32
    }

    fn input_frame_step(&self, stream: u32) -> i32 {
        Self::frame_step_for(self.state.lock().streams[&stream].sample_rate)
    }

    unsafe fn add_data(&self, stream: u32, samples: *const f32, at_time: i64) {
        let frame = std::slice::from_raw_parts(samples, self.frame_size(stream));
        self.store_frame(stream, frame.iter().copied(), at_time);
    }

    unsafe fn add_data_short(&self, stream: u32, samples: *const i16, at_time: i64) {
        let frame = std::slice::from_raw_parts(samples, self.frame_size(stream));
        self.store_frame(stream, frame.iter().map(|&v| v as f32 / 32768.0), at_time);
    }

    fn compute_tension(&self, stream: u32, at_time: i64) -> Option<f32> {
        let state = self.state.lock();
        let energies = &state.streams[&stream].energies;
        energies.get(&(at_time + TENSION_LOOKAHEAD))?;
        energies.get(&at_time).map(|energy| energy.sqrt())
    }

    fn compute_speed_from_tension(
        &self,
        _stream: u32,
        tension: f32,
        target_speed_ratio: f32,
        feedback_strength: f32,
    ) -> f32 {
        self.state.lock().last_speed_request = Some((tension, target_speed_ratio, feedback_strength));
        Self::speed_from_tension(tension, target_speed_ratio, feedback_strength)
    }

    fn current_time(&self, stream: u32) -> i64 {
        self.state.lock().streams[&stream].current_time
    }

    fn fft_size(&self, stream: u32) -> i32 {
        (self.frame_size(stream)).next_power_of_two() as i32
    }

    fn set_tension_parameter(&self, stream: u32, parameter: TensionParameter) {
        let mut state = self.state.lock();
        state.streams.get_mut(&stream).unwrap().parameters.push(parameter);
    }
}

// -------------------------------------------------------------------------------------------------

pub(crate) struct TransformState {
    pub channels: usize,
    pub speed: f32,
    pub rate: f32,
    pub nonlinear_factor: f32,
    pub feedback_strength: f32,
    pub speedy_parameters: Vec<TensionParameter>,
    pub reporting: bool,
    pending: Vec<f32>,
    position: f64,
    output: Vec<f32>,
    frame_time: i32,
}

impl TransformState {
    /// Resamples buffered input into the output queue. Returns the frames produced and the
    /// speed callbacks to deliver.
    fn process(&mut self, flushing: bool) -> (usize, Vec<(i32, f32)>) {
        let channels = self.channels;
        let frames = self.pending.len() / channels;
        let usable = if flushing {
            frames
        } else {
            frames - frames % BLOCK_FRAMES
        };
        if usable == 0 {
            return (0, Vec::new());
        }

        let step = f64::from(self.speed * self.rate).max(1e-3);
        let mut produced = 0;
        while (self.position as usize) < usable {
            let start = self.position as usize * channels;
            self.output
                .extend_from_slice(&self.pending[start..start + channels]);
            produced += 1;
            self.position += step;
        }
        self.pending.drain(..usable * channels);
        self.position -= usable as f64;

        let mut callbacks = Vec::new();
        for _ in 0..usable.div_ceil(BLOCK_FRAMES) {
            if self.reporting {
                callbacks.push((self.frame_time, self.speed));
            }
            self.frame_time += 1;
        }
        (produced, callbacks)
    }

    fn take_output(&mut self, max_count: usize) -> Vec<f32> {
        let frames = (self.output.len() / self.channels).min(max_count);
        self.output.drain(..frames * self.channels).collect()
    }
}

#[derive(Default)]
struct SonicState {
    handles: Handles,
    streams: HashMap<u32, TransformState>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeSonic {
    state: Arc<Mutex<SonicState>>,
    callbacks: Arc<CallbackRegistry<u32>>,
}

impl FakeSonic {
    pub fn fail_next_create(&self) {
        self.state.lock().handles.fail_next = true;
    }

    pub fn live_streams(&self) -> usize {
        self.state.lock().streams.len()
    }

    pub fn destroyed(&self) -> Vec<u32> {
        self.state.lock().handles.destroyed.clone()
    }

    /// Runs `f` against the engine-side state of `stream`.
    pub fn inspect<R>(&self, stream: u32, f: impl FnOnce(&TransformState) -> R) -> R {
        f(&self.state.lock().streams[&stream])
    }

    /// Emits a speed callback the way an engine-internal thread would.
    pub fn emit_speed(&self, stream: u32, time: i32, speed: f32) -> bool {
        let reporting = self
            .state
            .lock()
            .streams
            .get(&stream)
            .is_some_and(|state| state.reporting);
        reporting && self.callbacks.dispatch(stream, time, speed)
    }

    /// Processes pending input, then delivers callbacks outside the engine lock.
    fn run(&self, stream: u32, flushing: bool) -> usize {
        let (produced, callbacks) = self
            .state
            .lock()
            .streams
            .get_mut(&stream)
            .unwrap()
            .process(flushing);
        for (time, speed) in callbacks {
            self.callbacks.dispatch(stream, time, speed);
        }
        produced
    }

    fn with_stream<R>(&self, stream: u32, f: impl FnOnce(&mut TransformState) -> R) -> R {
        f(self.state.lock().streams.get_mut(&stream).unwrap())
    }
}

impl TransformEngine for FakeSonic {
    type Handle = u32;

    fn create_stream(&self, _sample_rate: i32, num_channels: i32) -> Option<u32> {
        let mut state = self.state.lock();
        let handle = state.handles.allocate()?;
        state.streams.insert(
            handle,
            TransformState {
                channels: num_channels as usize,
                speed: 1.0,
                rate: 1.0,
                nonlinear_factor: 0.0,
                feedback_strength: 0.0,
                speedy_parameters: Vec::new(),
                reporting: false,
                pending: Vec::new(),
                position: 0.0,
                output: Vec::new(),
                frame_time: 0,
            },
        );
        Some(handle)
    }

    fn destroy_stream(&self, stream: u32) {
        let mut state = self.state.lock();
        state.streams.remove(&stream).unwrap();
        state.handles.release(stream);
    }

    unsafe fn write_float(&self, stream: u32, samples: *const f32, count: i32) -> i32 {
        if count <= 0 {
            return 0;
        }
        let channels = self.with_stream(stream, |state| state.channels);
        let input = std::slice::from_raw_parts(samples, count as usize * channels);
        self.with_stream(stream, |state| state.pending.extend_from_slice(input));
        count
    }

    unsafe fn write_short(&self, stream: u32, samples: *const i16, count: i32) -> i32 {
        if count <= 0 {
            return 0;
        }
        let channels = self.with_stream(stream, |state| state.channels);
        let input = std::slice::from_raw_parts(samples, count as usize * channels);
        self.with_stream(stream, |state| {
            state
                .pending
                .extend(input.iter().map(|&v| v as f32 / 32768.0))
        });
        count
    }

    unsafe fn read_float(&self, stream: u32, samples: *mut f32, max_count: i32) -> i32 {
        self.run(stream, false);
        let (frames, output) = self.with_stream(stream, |state| {
            let output = state.take_output(max_count.max(0) as usize);
            (output.len() / state.channels, output)
        });
        if !output.is_empty() {
            std::ptr::copy_nonoverlapping(output.as_ptr(), samples, output.len());
        }
        frames as i32
    }

    unsafe fn read_short(&self, stream: u32, samples: *mut i16, max_count: i32) -> i32 {
        self.run(stream, false);
        let (frames, output) = self.with_stream(stream, |state| {
            let output = state.take_output(max_count.max(0) as usize);
            (output.len() / state.channels, output)
        });
        for (i, value) in output.iter().enumerate() {
            *samples.add(i) = (value * 32767.0) as i16;
        }
        frames as i32
    }

    fn flush(&self, stream: u32) -> i32 {
        self.run(stream, true) as i32
    }

    fn samples_available(&self, stream: u32) -> i32 {
        self.run(stream, false);
        self.with_stream(stream, |state| (state.output.len() / state.channels) as i32)
    }

    fn speed(&self, stream: u32) -> f32 {
        self.with_stream(stream, |state| state.speed)
    }

    fn set_speed(&self, stream: u32, speed: f32) {
        self.with_stream(stream, |state| state.speed = speed);
    }

    fn set_rate(&self, stream: u32, rate: f32) {
        self.with_stream(stream, |state| state.rate = rate);
    }

    fn enable_nonlinear_speedup(&self, stream: u32, factor: f32) {
        self.with_stream(stream, |state| state.nonlinear_factor = factor);
    }

    fn set_duration_feedback_strength(&self, stream: u32, factor: f32) {
        self.with_stream(stream, |state| state.feedback_strength = factor);
    }

    fn set_speedy_parameter(&self, stream: u32, parameter: TensionParameter) {
        self.with_stream(stream, |state| state.speedy_parameters.push(parameter));
    }

    fn callbacks(&self) -> &CallbackRegistry<u32> {
        &self.callbacks
    }

    fn enable_speed_callback(&self, stream: u32) {
        self.with_stream(stream, |state| state.reporting = true);
    }
}
