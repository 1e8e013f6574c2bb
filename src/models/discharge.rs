//! Peak-hour grid discharge incentive.

use serde::{Deserialize, Serialize};

/// Settings for the peak-hour discharge benefit.
///
/// When enabled, every unit of service time that overlaps
/// `[peak_start, peak_end]` earns `benefit_rate`, subtracted from route cost.
/// Times use the same unit as customer time windows (minutes in Solomon
/// instances), so the default peak is 14:00–18:00.
///
/// # Examples
///
/// ```
/// use ev_routing::models::DischargeConfig;
///
/// let off = DischargeConfig::default();
/// assert!(!off.enabled);
///
/// let on = DischargeConfig::peak_hours(100.0, 200.0).with_benefit_rate(0.5);
/// assert!(on.enabled);
/// assert_eq!(on.overlap(150.0, 250.0), 50.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DischargeConfig {
    /// Whether the benefit is applied at all.
    pub enabled: bool,
    /// Start of the peak interval.
    pub peak_start: f64,
    /// End of the peak interval.
    pub peak_end: f64,
    /// Benefit per unit of overlapping service time.
    pub benefit_rate: f64,
}

impl DischargeConfig {
    /// Enabled incentive over the given peak interval with the default rate.
    pub fn peak_hours(peak_start: f64, peak_end: f64) -> Self {
        Self {
            enabled: true,
            peak_start,
            peak_end,
            ..Self::default()
        }
    }

    /// Sets the benefit per unit of overlapping service time.
    pub fn with_benefit_rate(mut self, rate: f64) -> Self {
        self.benefit_rate = rate;
        self
    }

    /// Length of the intersection of `[start, end]` with the peak interval.
    pub fn overlap(&self, start: f64, end: f64) -> f64 {
        (end.min(self.peak_end) - start.max(self.peak_start)).max(0.0)
    }
}

impl Default for DischargeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            peak_start: 14.0 * 60.0,
            peak_end: 18.0 * 60.0,
            benefit_rate: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_cases() {
        let cfg = DischargeConfig::peak_hours(10.0, 20.0);
        assert_eq!(cfg.overlap(0.0, 5.0), 0.0);
        assert_eq!(cfg.overlap(25.0, 30.0), 0.0);
        assert_eq!(cfg.overlap(5.0, 15.0), 5.0);
        assert_eq!(cfg.overlap(12.0, 18.0), 6.0);
        assert_eq!(cfg.overlap(0.0, 30.0), 10.0);
        assert_eq!(cfg.overlap(20.0, 20.0), 0.0);
    }

    #[test]
    fn test_default_peak_is_afternoon() {
        let cfg = DischargeConfig::default();
        assert_eq!(cfg.peak_start, 840.0);
        assert_eq!(cfg.peak_end, 1080.0);
    }
}
