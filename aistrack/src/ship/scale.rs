//! Render scale derived from hull dimensions.

use super::record::Dimensions;

/// Hull of the reference vessel, `[bow, stern, port, starboard]` in metres.
pub const REFERENCE_DIMENSIONS: [f64; 4] = [30.0, 25.0, 5.0, 6.0];

/// Default user scale multiplier.
pub const DEFAULT_USER_SCALE: f64 = 1.0;

/// Scale configuration, read-only after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleConfig {
    /// Derive scale from reported dimensions.
    pub dynamic: bool,
    /// Constant multiplier applied to every scale.
    pub user_scale: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            dynamic: false,
            user_scale: DEFAULT_USER_SCALE,
        }
    }
}

impl ScaleConfig {
    pub fn fixed(user_scale: f64) -> Self {
        Self {
            dynamic: false,
            user_scale,
        }
    }

    pub fn dynamic(user_scale: f64) -> Self {
        Self {
            dynamic: true,
            user_scale,
        }
    }
}

/// Computes per-vessel render scale relative to the reference hull.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleCalculator {
    config: ScaleConfig,
}

impl ScaleCalculator {
    pub fn new(config: ScaleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScaleConfig {
        &self.config
    }

    /// Scale for a vessel with the given dimensions.
    ///
    /// Falls back to the user scale when dynamic scaling is off, when any
    /// dimension is unknown, or when the result is not a positive number.
    pub fn scale(&self, dimensions: &Dimensions) -> f64 {
        let user_scale = self.config.user_scale;
        if !self.config.dynamic {
            return user_scale;
        }
        let Some(observed) = dimensions.complete() else {
            return user_scale;
        };

        let ratio_sum: f64 = observed
            .iter()
            .zip(REFERENCE_DIMENSIONS.iter())
            .map(|(value, reference)| value / reference)
            .sum();
        let scale = ratio_sum / REFERENCE_DIMENSIONS.len() as f64 * user_scale;

        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            user_scale
        }
    }
}
