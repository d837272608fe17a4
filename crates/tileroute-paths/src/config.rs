/// Default step budget of one [`RoutePather::update`](crate::RoutePather::update).
pub const DEFAULT_MAX_TICKS: usize = 1000;

/// Configuration for a [`RoutePather`](crate::RoutePather).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PatherConfig {
    /// Upper bound on search steps per `update()`, and per immediate solve.
    pub max_ticks: usize,
    /// Name reported through [`Pather::name`](crate::Pather::name).
    pub name: String,
}

impl Default for PatherConfig {
    fn default() -> Self {
        Self {
            max_ticks: DEFAULT_MAX_TICKS,
            name: "RoutePather".into(),
        }
    }
}

impl PatherConfig {
    pub fn with_max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: PatherConfig = serde_json::from_str(r#"{"max_ticks": 12}"#).unwrap();
        assert_eq!(config, PatherConfig::default().with_max_ticks(12));
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<PatherConfig>(&json).unwrap(), config);
    }
}
