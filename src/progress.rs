//! Scene state and per-group progress smoothing.
//!
//! The whole scene is driven by one shared target value: 0 when scattered,
//! 1 when gathered into the tree. Each group lags toward that target with its
//! own exponential low-pass filter, so different parts of the scene settle at
//! different rates instead of moving in lockstep. This is a per-frame decay,
//! not a fixed-duration tween; the filter approaches the target forever and
//! visual convergence within a small epsilon is all that matters.

/// The two attractor configurations of the scene.
///
/// There is no discrete state machine beyond this: toggling simply redirects
/// the attractor and in-flight motion reverses continuously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneState {
    /// Particles dispersed through the scatter sphere.
    Scattered,
    /// Particles settled into the tree configuration.
    #[default]
    TreeShape,
}

impl SceneState {
    /// Interpolation target for this state.
    #[inline]
    pub fn target(&self) -> f32 {
        match self {
            SceneState::Scattered => 0.0,
            SceneState::TreeShape => 1.0,
        }
    }

    /// The other state.
    #[inline]
    pub fn toggled(&self) -> Self {
        match self {
            SceneState::Scattered => SceneState::TreeShape,
            SceneState::TreeShape => SceneState::Scattered,
        }
    }
}

/// Exponentially-smoothed progress scalar, one per particle group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSmoother {
    smoothed: f32,
    alpha: f32,
}

impl ProgressSmoother {
    /// Create a smoother starting fully scattered.
    ///
    /// `alpha` is the per-frame smoothing constant in (0, 1); reference
    /// groups use 0.04-0.05. Larger values settle faster.
    pub fn new(alpha: f32) -> Self {
        Self {
            smoothed: 0.0,
            alpha: alpha.clamp(f32::EPSILON, 1.0),
        }
    }

    /// Pull the smoothed value one frame toward `target` and return it.
    pub fn advance(&mut self, target: f32) -> f32 {
        self.smoothed += (target - self.smoothed) * self.alpha;
        self.smoothed
    }

    /// Current smoothed value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.smoothed
    }

    /// The smoothing constant.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Number of frames after which the remaining distance to a constant
    /// target is guaranteed below `epsilon` (starting from distance 1).
    pub fn steps_to_converge(&self, epsilon: f32) -> u32 {
        if self.alpha >= 1.0 {
            return 1;
        }
        (epsilon.ln() / (1.0 - self.alpha).ln()).ceil().max(0.0) as u32
    }
}
