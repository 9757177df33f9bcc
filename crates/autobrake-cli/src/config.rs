//! Vehicle configuration – reads/writes `autobrake.toml`.
//!
//! ```toml
//! [vehicle]
//! wheelbase_length = 0.3
//! track_width = 0.25
//! autobrake_distance = 0.5
//! autobrake_time = 1.0
//! min_corroborating_samples = 1
//!
//! [mount]
//! lateral_offset = 0.0
//! forward_offset = 0.0
//!
//! [debounce]
//! engage_after = 1
//! release_after = 1
//! ```
//!
//! Every key is optional; a missing file means all defaults.

use autobrake_kernel::{BrakeDebouncer, CollisionPredictor};
use autobrake_perception::SensorMount;
use autobrake_types::{AutobrakeError, VehicleGeometry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "autobrake.toml";

/// Engage/release thresholds for the verdict debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Consecutive braking verdicts before the brake engages.
    #[serde(default = "default_streak")]
    pub engage_after: usize,

    /// Consecutive clear verdicts before the brake releases.
    #[serde(default = "default_streak")]
    pub release_after: usize,
}

fn default_streak() -> usize {
    1
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            engage_after: default_streak(),
            release_after: default_streak(),
        }
    }
}

/// Effective configuration of the `autobrake` binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vehicle: VehicleGeometry,

    #[serde(default)]
    pub mount: SensorMount,

    #[serde(default)]
    pub debounce: DebounceConfig,
}

impl Config {
    /// Build the predictor described by `[vehicle]` and `[mount]`.
    pub fn predictor(&self) -> Result<CollisionPredictor, AutobrakeError> {
        Ok(CollisionPredictor::new(self.vehicle.clone())?.with_mount(self.mount))
    }

    pub fn debouncer(&self) -> BrakeDebouncer {
        BrakeDebouncer::new(self.debounce.engage_after, self.debounce.release_after)
    }
}

/// Load the config from `path`.  Returns `None` if the file does not exist.
///
/// Environment overrides are **not** applied; see [`load`].
pub fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Load the config from `path` (defaults when absent) and apply
/// `AUTOBRAKE_*` environment overrides.
pub fn load(path: &Path) -> Result<Config, String> {
    let mut cfg = load_from(path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Apply `AUTOBRAKE_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `AUTOBRAKE_DISTANCE` | `vehicle.autobrake_distance` |
/// | `AUTOBRAKE_TIME` | `vehicle.autobrake_time` |
/// | `AUTOBRAKE_MIN_SAMPLES` | `vehicle.min_corroborating_samples` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides_from(cfg, |key| std::env::var(key).ok());
}

/// Same as [`apply_env_overrides`] with an injectable variable lookup.
pub(crate) fn apply_overrides_from(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("AUTOBRAKE_DISTANCE")
        && let Ok(distance) = v.trim().parse::<f64>()
    {
        cfg.vehicle.autobrake_distance = distance;
    }
    if let Some(v) = lookup("AUTOBRAKE_TIME")
        && let Ok(time) = v.trim().parse::<f64>()
    {
        cfg.vehicle.autobrake_time = time;
    }
    if let Some(v) = lookup("AUTOBRAKE_MIN_SAMPLES")
        && let Ok(samples) = v.trim().parse::<usize>()
    {
        cfg.vehicle.min_corroborating_samples = samples;
    }
}

/// Save the config to `path`, creating parent directories if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        save_to(&Config::default(), &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, Config::default());
        assert_eq!(loaded.vehicle.wheelbase_length, 0.3);
        assert_eq!(loaded.debounce.engage_after, 1);
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("nested").join("cfg").join("autobrake.toml");
        save_to(&Config::default(), &path).expect("save");
        assert!(path.exists());
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let result = load_from(&dir.path().join("absent.toml")).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            "[vehicle]\ntrack_width = 0.4\n\n[debounce]\nengage_after = 3\n",
        )
        .expect("write");

        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg.vehicle.track_width, 0.4);
        assert_eq!(cfg.vehicle.autobrake_distance, 0.5);
        assert_eq!(cfg.mount, SensorMount::default());
        assert_eq!(cfg.debounce.engage_after, 3);
        assert_eq!(cfg.debounce.release_after, 1);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "[vehicle\n").expect("write");
        let err = load_from(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse config"));
    }

    #[test]
    fn overrides_replace_thresholds() {
        let mut cfg = Config::default();
        apply_overrides_from(
            &mut cfg,
            lookup(&[
                ("AUTOBRAKE_DISTANCE", "0.8"),
                ("AUTOBRAKE_TIME", " 1.5 "),
                ("AUTOBRAKE_MIN_SAMPLES", "3"),
            ]),
        );
        assert_eq!(cfg.vehicle.autobrake_distance, 0.8);
        assert_eq!(cfg.vehicle.autobrake_time, 1.5);
        assert_eq!(cfg.vehicle.min_corroborating_samples, 3);
    }

    #[test]
    fn overrides_ignore_unparsable_values() {
        let mut cfg = Config::default();
        apply_overrides_from(
            &mut cfg,
            lookup(&[("AUTOBRAKE_DISTANCE", "close"), ("AUTOBRAKE_MIN_SAMPLES", "-2")]),
        );
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn apply_env_overrides_reads_process_env() {
        // SAFETY: no other test in this crate touches AUTOBRAKE_TIME.
        unsafe { std::env::set_var("AUTOBRAKE_TIME", "2.5") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.vehicle.autobrake_time, 2.5);
        unsafe { std::env::remove_var("AUTOBRAKE_TIME") };
    }

    #[test]
    fn predictor_rejects_invalid_vehicle() {
        let mut cfg = Config::default();
        cfg.vehicle.wheelbase_length = -1.0;
        assert!(matches!(
            cfg.predictor(),
            Err(AutobrakeError::InvalidGeometry(_))
        ));
    }
}
