//! Pass/fail policy for a single comparison

use serde::{Deserialize, Serialize};

/// Thresholds a comparison must stay under to pass
///
/// A measurement passes when it is strictly below its limit, or when it is
/// exactly zero. The zero rule lets a `0%` height limit demand equal heights
/// instead of failing everything.
///
/// # Examples
///
/// ```
/// use pixel_parity::compare::PassPolicy;
///
/// let policy = PassPolicy::default();
/// assert!(policy.accepts(4.9, 0.0));
/// assert!(!policy.accepts(5.0, 0.0));
///
/// let strict = PassPolicy::pixel_perfect();
/// assert!(strict.accepts(0.5, 0.0));
/// assert!(!strict.accepts(0.5, 0.1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PassPolicy {
    /// Maximum share of differing pixels, in percent
    pub max_diff_percent: f64,
    /// Maximum height difference relative to the taller frame, in percent
    pub max_height_delta_percent: f64,
}

impl Default for PassPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl PassPolicy {
    /// Create a policy from explicit thresholds
    pub fn new(max_diff_percent: f64, max_height_delta_percent: f64) -> Self {
        Self {
            max_diff_percent,
            max_height_delta_percent,
        }
    }

    /// 10% pixels, 15% height
    pub fn lenient() -> Self {
        Self::new(10.0, 15.0)
    }

    /// 5% pixels, 10% height
    pub fn standard() -> Self {
        Self::new(5.0, 10.0)
    }

    /// 1% pixels, equal heights
    pub fn pixel_perfect() -> Self {
        Self::new(1.0, 0.0)
    }

    /// Sets the max diff percent.
    pub fn with_max_diff_percent(mut self, percent: f64) -> Self {
        self.max_diff_percent = percent;
        self
    }

    /// Sets the max height delta percent.
    pub fn with_max_height_delta_percent(mut self, percent: f64) -> Self {
        self.max_height_delta_percent = percent;
        self
    }

    /// Decide whether the measured percentages pass
    pub fn accepts(&self, diff_percentage: f64, height_delta_percentage: f64) -> bool {
        within(diff_percentage, self.max_diff_percent)
            && within(height_delta_percentage, self.max_height_delta_percent)
    }
}

fn within(value: f64, limit: f64) -> bool {
    value < limit || value == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_standard() {
        let policy = PassPolicy::default();
        assert_eq!(policy.max_diff_percent, 5.0);
        assert_eq!(policy.max_height_delta_percent, 10.0);
    }

    #[test]
    fn test_limits_are_exclusive() {
        let policy = PassPolicy::standard();
        assert!(policy.accepts(4.99, 9.99));
        assert!(!policy.accepts(5.0, 0.0));
        assert!(!policy.accepts(0.0, 10.0));
    }

    #[test]
    fn test_zero_measurement_passes_zero_limit() {
        let policy = PassPolicy::new(0.0, 0.0);
        assert!(policy.accepts(0.0, 0.0));
        assert!(!policy.accepts(0.001, 0.0));
    }

    #[test]
    fn test_presets_are_ordered_by_strictness() {
        let lenient = PassPolicy::lenient();
        let standard = PassPolicy::standard();
        let perfect = PassPolicy::pixel_perfect();
        assert!(lenient.max_diff_percent > standard.max_diff_percent);
        assert!(standard.max_diff_percent > perfect.max_diff_percent);
        assert!(standard.max_height_delta_percent > perfect.max_height_delta_percent);
    }

    #[test]
    fn test_policy_serializes_kebab_case() {
        let json = serde_json::to_string(&PassPolicy::standard()).unwrap();
        assert!(json.contains("max-diff-percent"));
        assert!(json.contains("max-height-delta-percent"));
    }
}
