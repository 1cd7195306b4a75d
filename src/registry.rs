//! Routes engine speed callbacks, which only carry a native stream handle, back to the
//! transform stream that owns the handle.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

// -------------------------------------------------------------------------------------------------

/// One entry of a speed profile: the speed the engine applied at a frame time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedPoint {
    /// Frame index reported by the engine.
    pub time: i32,
    /// Speed multiplier applied at that frame.
    pub speed: f32,
}

/// Flattens points into `[time0, speed0, time1, speed1, ...]`, the layout hosts without
/// structured values receive a speed profile in.
pub fn interleave_speed_points(points: &[SpeedPoint]) -> Vec<f32> {
    points
        .iter()
        .flat_map(|point| [point.time as f32, point.speed])
        .collect()
}

// -------------------------------------------------------------------------------------------------

/// Receiver of dispatched speed callbacks.
pub trait SpeedRecorder: Send + Sync {
    fn record_speed(&self, time: i32, speed: f32);
}

/// Append-only accumulation buffer of [`SpeedPoint`]s, emptied by [`SpeedProfile::drain`].
#[derive(Debug, Default)]
pub struct SpeedProfile {
    points: Mutex<Vec<SpeedPoint>>,
}

impl SpeedProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points recorded since the last drain.
    pub fn len(&self) -> usize {
        self.points.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.lock().is_empty()
    }

    /// Takes all recorded points, leaving the profile empty. Returns `None` if there are none.
    pub fn drain(&self) -> Option<Vec<SpeedPoint>> {
        let mut points = self.points.lock();
        if points.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut *points))
        }
    }
}

impl SpeedRecorder for SpeedProfile {
    fn record_speed(&self, time: i32, speed: f32) {
        self.points.lock().push(SpeedPoint { time, speed });
    }
}

// -------------------------------------------------------------------------------------------------

/// Mapping from native stream handle to the recorder of the stream owning it.
///
/// All reads and writes happen under one lock. A dispatch keeps holding that lock while the
/// recorder runs, and [`CallbackRegistry::unregister_with`] keeps holding it while the native
/// stream is destroyed, so no callback is delivered for a handle once its removal has returned.
pub struct CallbackRegistry<H> {
    entries: Mutex<HashMap<H, Arc<dyn SpeedRecorder>>>,
}

impl<H> CallbackRegistry<H>
where
    H: Copy + Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Routes callbacks for `handle` to `recorder`, replacing any previous entry.
    /// Returns false if an entry was replaced.
    pub fn register(&self, handle: H, recorder: Arc<dyn SpeedRecorder>) -> bool {
        self.entries.lock().insert(handle, recorder).is_none()
    }

    pub fn contains(&self, handle: H) -> bool {
        self.entries.lock().contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Removes the entry for `handle`, then runs `release` before giving up the lock.
    ///
    /// `release` must not call back into this registry.
    pub fn unregister_with<R>(&self, handle: H, release: impl FnOnce() -> R) -> R {
        let mut entries = self.entries.lock();
        entries.remove(&handle);
        let released = release();
        drop(entries);
        released
    }

    /// Delivers a speed callback to the recorder registered for `handle`.
    /// Returns false, and does nothing else, if there is none.
    pub fn dispatch(&self, handle: H, time: i32, speed: f32) -> bool {
        let entries = self.entries.lock();
        match entries.get(&handle) {
            Some(recorder) => {
                recorder.record_speed(time, speed);
                true
            }
            None => {
                log::trace!("Dropping speed callback for unregistered stream {handle:?}");
                false
            }
        }
    }
}

impl<H> Default for CallbackRegistry<H>
where
    H: Copy + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for CallbackRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
