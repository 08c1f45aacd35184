//! Resolver configuration.

/// Configuration for turning milepost records into segment geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveConfig {
    /// Multiplier from `ARM` units to the route geometry's measure units.
    ///
    /// The LRS stores both in miles, so the default is 1.0. Keeping the two
    /// consistent is the caller's job; nothing checks it.
    pub measure_scale: f64,
}

impl ResolveConfig {
    pub fn new(measure_scale: f64) -> Self {
        Self { measure_scale }
    }

    pub fn with_measure_scale(mut self, scale: f64) -> Self {
        self.measure_scale = scale;
        self
    }

    /// Convert an `ARM` value to a route measure.
    pub fn to_measure(&self, arm: f64) -> f64 {
        arm * self.measure_scale
    }
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self { measure_scale: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let config = ResolveConfig::default();
        assert_eq!(config.measure_scale, 1.0);
        assert_eq!(config.to_measure(119.05), 119.05);
    }

    #[test]
    fn miles_to_meters() {
        let config = ResolveConfig::default().with_measure_scale(1609.344);
        assert_eq!(config.to_measure(2.0), 3218.688);
        assert_eq!(ResolveConfig::new(0.5).to_measure(3.0), 1.5);
    }
}
