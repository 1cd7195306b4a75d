//! Tuning parameters and build constants of the tension analysis.

// -------------------------------------------------------------------------------------------------

/// Rate at which the analysis produces tension frames, in Hz.
pub const FRAME_RATE_HZ: f32 = 100.0;

/// Coefficient of the analysis' preemphasis filter.
pub const PREEMPHASIS_COEFFICIENT: f32 = 0.97;

// -------------------------------------------------------------------------------------------------

/// Temporal hysteresis window used by the tension analysis.
///
/// The analysis engine is built with one of two window layouts. `MatchMatlab` mirrors the
/// MATLAB reference implementation and swaps the future and past frame counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HysteresisProfile {
    /// 12 future frames, 8 past frames.
    #[default]
    Standard,
    /// 8 future frames, 12 past frames.
    MatchMatlab,
}

impl HysteresisProfile {
    /// Number of future frames the hysteresis looks at.
    pub const fn future_frames(self) -> usize {
        match self {
            HysteresisProfile::Standard => 12,
            HysteresisProfile::MatchMatlab => 8,
        }
    }

    /// Number of past frames the hysteresis looks at.
    pub const fn past_frames(self) -> usize {
        match self {
            HysteresisProfile::Standard => 8,
            HysteresisProfile::MatchMatlab => 12,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// A tuning knob of the tension analysis, forwarded verbatim to the engine.
///
/// Values are not validated here. Range checks, clamping or rejection are up to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TensionParameter {
    PreemphasisFactor(f32),
    LowEnergyThresholdScale(f32),
    BinThresholdDivisor(f32),
    TensionWeights { energy: f32, speech: f32 },
    TensionOffsets { energy: f32, speech: f32 },
    SpeechChangeCapMultiplier(f32),
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_swap_future_and_past() {
        let standard = HysteresisProfile::default();
        assert_eq!(standard, HysteresisProfile::Standard);
        assert_eq!((standard.future_frames(), standard.past_frames()), (12, 8));

        let matlab = HysteresisProfile::MatchMatlab;
        assert_eq!((matlab.future_frames(), matlab.past_frames()), (8, 12));
    }
}
