//! Conversion between host-side numeric arrays and the sample buffers the engines consume.
//!
//! The copying functions allocate a fresh buffer per call. Zero-copy paths never come through
//! here: the stream wrappers hand caller addresses to the engines unchanged.

// -------------------------------------------------------------------------------------------------

/// A numeric element type a host array may hold.
///
/// Conversions follow Rust's numeric `as` casts: floats truncate toward zero and saturate when
/// cast to integers (NaN becomes 0), integers wrap. No audio scaling is applied, so `0.5_f64`
/// becomes `0_i16`, not `16383_i16`.
///
/// These casts are the numeric rule for Rust callers only. A JavaScript host converts with
/// `ToInt16`, which wraps instead of saturating; see [`wrap_to_i16`].
pub trait HostSample: Copy {
    fn to_f32(self) -> f32;
    fn to_i16(self) -> i16;
    fn from_f32(value: f32) -> Self;
    fn from_i16(value: i16) -> Self;
}

macro_rules! impl_host_sample {
    ($($t:ty),*) => {
        $(
            impl HostSample for $t {
                #[inline]
                fn to_f32(self) -> f32 {
                    self as f32
                }
                #[inline]
                fn to_i16(self) -> i16 {
                    self as i16
                }
                #[inline]
                fn from_f32(value: f32) -> Self {
                    value as $t
                }
                #[inline]
                fn from_i16(value: i16) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_host_sample!(f32, f64, i16, i32);

// -------------------------------------------------------------------------------------------------

/// Converts a host array to a float sample buffer. An absent array yields an empty buffer.
pub fn to_float_buffer<T: HostSample>(host: Option<&[T]>) -> Vec<f32> {
    match host {
        Some(values) => values.iter().map(|v| v.to_f32()).collect(),
        None => Vec::new(),
    }
}

/// Converts a host array to a 16-bit sample buffer. An absent array yields an empty buffer.
pub fn to_int16_buffer<T: HostSample>(host: Option<&[T]>) -> Vec<i16> {
    match host {
        Some(values) => values.iter().map(|v| v.to_i16()).collect(),
        None => Vec::new(),
    }
}

/// Converts a float sample buffer back to a host array.
///
/// Returns `None` for an empty buffer: "nothing produced" is never an empty array.
pub fn from_float_buffer<T: HostSample>(buffer: &[f32]) -> Option<Vec<T>> {
    if buffer.is_empty() {
        return None;
    }
    Some(buffer.iter().map(|&v| T::from_f32(v)).collect())
}

/// Converts a 16-bit sample buffer back to a host array. Returns `None` for an empty buffer.
pub fn from_int16_buffer<T: HostSample>(buffer: &[i16]) -> Option<Vec<T>> {
    if buffer.is_empty() {
        return None;
    }
    Some(buffer.iter().map(|&v| T::from_i16(v)).collect())
}

/// Applies the "empty means absent" rule to a buffer that already has its final element type.
pub fn present<T>(buffer: Vec<T>) -> Option<Vec<T>> {
    if buffer.is_empty() {
        None
    } else {
        Some(buffer)
    }
}

// -------------------------------------------------------------------------------------------------

/// Converts a host number to a 16-bit sample the way JavaScript's `ToInt16` does: truncate
/// toward zero, then keep the low 16 bits. NaN and infinities become 0.
pub fn wrap_to_i16(value: f64) -> i16 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(65536.0) as u16 as i16
}

// -------------------------------------------------------------------------------------------------
