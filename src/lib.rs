#![doc=include_str!("../README.md")]

// -------------------------------------------------------------------------------------------------

mod error;
pub use error::{Error, Result, StreamKind};

pub mod engine;
pub use engine::{AnalysisEngine, TransformEngine};

pub mod marshal;
pub use marshal::HostSample;

pub mod params;
pub use params::{HysteresisProfile, TensionParameter};

pub mod registry;
pub use registry::{CallbackRegistry, SpeedPoint, SpeedProfile, SpeedRecorder};

mod analysis;
pub use analysis::AnalysisStream;

mod transform;
pub use transform::TransformStream;

#[cfg(feature = "native")]
pub mod native;
#[cfg(feature = "native")]
pub use native::{Sonic, SonicStream, Speedy, SpeedyStream};

#[cfg(feature = "wasm")]
pub mod bindings;

#[cfg(test)]
mod fake;
