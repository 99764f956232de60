//! tests/config_tests.rs

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use anyhow::Result;
    use chrono::{TimeZone, Timelike, Utc};

    use crate::config::app_config::AppConfig;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "sqlite://data/candidates.db"),
        ("EXTERNAL_API_URL", "http://localhost:5000/process"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.relay.batch_size, 10);
        assert_eq!(config.relay.interval_hours, 2);
        assert_eq!(config.relay.timeout, Duration::from_secs(30));
        assert!(!config.relay.run_on_start);
        assert_eq!(config.relay.external_api_url, "http://localhost:5000/process");
    }

    #[test]
    fn test_missing_required_values_fail() {
        let err = load(&[REQUIRED[1]]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = load(&[REQUIRED[0], ("EXTERNAL_API_URL", "  ")]).unwrap_err();
        assert!(err.to_string().contains("EXTERNAL_API_URL"));
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("PORT", "8080"),
            ("RELAY_BATCH_SIZE", "25"),
            ("RELAY_INTERVAL_HOURS", "6"),
            ("RELAY_TIMEOUT_SECS", "5"),
            ("RELAY_RUN_ON_START", "true"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.relay.batch_size, 25);
        assert_eq!(config.relay.interval_hours, 6);
        let ticks: Vec<u32> = config
            .relay
            .schedule
            .after(&Utc.with_ymd_and_hms(2024, 3, 5, 0, 30, 0).unwrap())
            .take(4)
            .map(|t| t.hour())
            .collect();
        assert_eq!(ticks, vec![6, 12, 18, 0]);
        assert_eq!(config.relay.timeout, Duration::from_secs(5));
        assert!(config.relay.run_on_start);
    }

    #[test]
    fn test_invalid_values_fail() {
        for bad in [
            ("PORT", "abc"),
            ("RELAY_BATCH_SIZE", "0"),
            ("RELAY_INTERVAL_HOURS", "25"),
            ("RELAY_INTERVAL_HOURS", "0"),
            ("RELAY_RUN_ON_START", "quizás"),
        ] {
            let mut vars = REQUIRED.to_vec();
            vars.push(bad);
            assert!(load(&vars).is_err(), "{:?} debería fallar", bad);
        }
    }
}
