use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{LensError, Result};
use crate::formatting::parse_salary;
use crate::models::{clamp_what_if_pct, SourceKey};
use crate::months::Month;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Salary versus inflation and USD/TRY over time
#[derive(Parser, Debug, Clone)]
#[command(
    name = "salary-lens",
    about = "Compare a fixed salary against compounding inflation and USD/TRY",
    version
)]
pub struct Settings {
    /// Inflation JSON file
    #[arg(long, default_value = "data/inflation.json")]
    pub inflation: PathBuf,

    /// USD/TRY JSON file
    #[arg(long, default_value = "data/usdtry.json")]
    pub fx: PathBuf,

    /// Monthly salary in TRY, Turkish notation (e.g. 45.000 or 45.000,50)
    #[arg(long)]
    pub salary: Option<String>,

    /// Month of the last raise, YYYY-MM (defaults to the first aligned month)
    #[arg(long)]
    pub start_month: Option<Month>,

    /// Month a hypothetical raise takes effect, YYYY-MM (defaults to the last aligned month)
    #[arg(long)]
    pub what_if_month: Option<Month>,

    /// Hypothetical raise in percent (0-200)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub what_if_pct: f64,

    /// Inflation source when the file carries more than one
    #[arg(long, value_enum)]
    pub source: Option<SourceKey>,

    /// Write the monthly table as CSV to this path
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.salary-lens/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_month: Option<Month>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub what_if_month: Option<Month>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub what_if_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKey>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.salary-lens/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".salary-lens").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!("Ignoring unreadable {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and merge with last-used params where no explicit
    /// CLI value was provided. Nothing is written here; see
    /// [`Settings::save_last_used`].
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation. Accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());
        let settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("Failed to clear {}: {}", config_path.display(), e);
            }
            return settings.resolve();
        }

        let last = LastUsedParams::load_from(config_path);
        settings.merge(last, &matches).resolve()
    }

    /// Persist the current parameters to the default path.
    ///
    /// Call only once a report has been produced, so that values which did
    /// not work are never remembered.
    pub fn save_last_used(&self) -> Result<()> {
        self.save_last_used_to(&LastUsedParams::config_path())
    }

    /// Persist the current parameters to an explicit path.
    pub fn save_last_used_to(&self, path: &std::path::Path) -> Result<()> {
        LastUsedParams::from(self).save_to(path)
    }

    /// Fill fields that were not given on the command line from `last`.
    /// CLI always wins.
    fn merge(mut self, last: LastUsedParams, matches: &clap::ArgMatches) -> Self {
        // clap stores the arg id using the field name, not the flag spelling.
        if !is_arg_explicitly_set(matches, "salary") && self.salary.is_none() {
            self.salary = last.salary;
        }
        if !is_arg_explicitly_set(matches, "start_month") && self.start_month.is_none() {
            self.start_month = last.start_month;
        }
        if !is_arg_explicitly_set(matches, "what_if_month") && self.what_if_month.is_none() {
            self.what_if_month = last.what_if_month;
        }
        if !is_arg_explicitly_set(matches, "what_if_pct") {
            if let Some(v) = last.what_if_pct {
                self.what_if_pct = v;
            }
        }
        if !is_arg_explicitly_set(matches, "source") && self.source.is_none() {
            self.source = last.source;
        }
        self
    }

    /// Clamp the raise percentage and apply the `--debug` flag.
    fn resolve(mut self) -> Self {
        self.what_if_pct = clamp_what_if_pct(self.what_if_pct);
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// The base salary as a number.
    ///
    /// Fails with [`LensError::Config`] when no salary was given and none was
    /// persisted, and with [`LensError::InvalidSalary`] when the text does not
    /// parse to a positive amount.
    pub fn base_salary(&self) -> Result<f64> {
        let raw = self.salary.as_deref().ok_or_else(|| {
            LensError::Config("a monthly salary is required (e.g. --salary 45.000)".to_string())
        })?;
        match parse_salary(raw) {
            Some(v) if v > 0.0 => Ok(v),
            _ => Err(LensError::InvalidSalary(raw.to_string())),
        }
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            salary: s.salary.clone(),
            start_month: s.start_month,
            what_if_month: s.what_if_month,
            what_if_pct: Some(s.what_if_pct),
            source: s.source,
        }
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn m(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn args(list: &[&str]) -> Vec<std::ffi::OsString> {
        std::iter::once("salary-lens")
            .chain(list.iter().copied())
            .map(Into::into)
            .collect()
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            salary: Some("45.000".to_string()),
            start_month: Some(m("2024-01")),
            what_if_month: Some(m("2024-09")),
            what_if_pct: Some(25.0),
            source: Some(SourceKey::Enag),
        };

        params.save_to(&path).expect("save");
        assert_eq!(LastUsedParams::load_from(&path), params);
    }

    #[test]
    fn test_last_used_params_json_keys() {
        let params = LastUsedParams {
            salary: Some("1".to_string()),
            start_month: Some(m("2024-01")),
            what_if_month: Some(m("2024-02")),
            what_if_pct: Some(5.0),
            source: Some(SourceKey::Tuik),
        };
        let json: serde_json::Value = serde_json::to_value(&params).unwrap();
        assert_eq!(json["startMonth"], "2024-01");
        assert_eq!(json["whatIfMonth"], "2024-02");
        assert_eq!(json["whatIfPct"], 5.0);
        assert_eq!(json["source"], "TUIK");
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            salary: Some("10.000".to_string()),
            ..Default::default()
        };
        params.save_to(&path).expect("save");
        assert!(path.exists(), "file must exist after save");

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists(), "file must be gone after clear");
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert_eq!(LastUsedParams::load_from(&path), LastUsedParams::default());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(LastUsedParams::load_from(&path), LastUsedParams::default());
    }

    // ── CLI parsing ───────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["salary-lens"]);

        assert_eq!(settings.inflation, PathBuf::from("data/inflation.json"));
        assert_eq!(settings.fx, PathBuf::from("data/usdtry.json"));
        assert!(settings.salary.is_none());
        assert!(settings.start_month.is_none());
        assert!(settings.what_if_month.is_none());
        assert_eq!(settings.what_if_pct, 0.0);
        assert!(settings.source.is_none());
        assert!(settings.export.is_none());
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_cli_months_and_source() {
        let settings = Settings::parse_from(args(&[
            "--start-month",
            "2024-02",
            "--what-if-month",
            "2024-06",
            "--source",
            "enag",
        ]));
        assert_eq!(settings.start_month, Some(m("2024-02")));
        assert_eq!(settings.what_if_month, Some(m("2024-06")));
        assert_eq!(settings.source, Some(SourceKey::Enag));
    }

    #[test]
    fn test_settings_cli_rejects_bad_month() {
        let result = Settings::try_parse_from(args(&["--start-month", "2024-13"]));
        assert!(result.is_err());

        let result = Settings::try_parse_from(args(&["--what-if-month", "123\u{0664}-01"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_cli_rejects_default_source() {
        let result = Settings::try_parse_from(args(&["--source", "default"]));
        assert!(result.is_err());
    }

    // ── base_salary ───────────────────────────────────────────────────────────

    #[test]
    fn test_base_salary_turkish_notation() {
        let settings = Settings::parse_from(args(&["--salary", "45.000,50"]));
        assert_eq!(settings.base_salary().unwrap(), 45_000.5);
    }

    #[test]
    fn test_base_salary_missing_is_config_error() {
        let settings = Settings::parse_from(args(&[]));
        assert!(matches!(settings.base_salary(), Err(LensError::Config(_))));
    }

    #[test]
    fn test_base_salary_invalid() {
        for raw in ["0", "abc", "1,2,3"] {
            let settings = Settings::parse_from(args(&["--salary", raw]));
            assert!(
                matches!(settings.base_salary(), Err(LensError::InvalidSalary(_))),
                "{raw} should be rejected"
            );
        }
    }

    // ── load_with_last_used ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            salary: Some("30.000".to_string()),
            start_month: Some(m("2024-01")),
            what_if_pct: Some(15.0),
            source: Some(SourceKey::Tuik),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&[]), &config_path);
        assert_eq!(settings.salary.as_deref(), Some("30.000"));
        assert_eq!(settings.start_month, Some(m("2024-01")));
        assert_eq!(settings.what_if_pct, 15.0);
        assert_eq!(settings.source, Some(SourceKey::Tuik));
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            salary: Some("30.000".to_string()),
            what_if_pct: Some(15.0),
            source: Some(SourceKey::Tuik),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            args(&["--salary", "50.000", "--what-if-pct", "0", "--source", "avg"]),
            &config_path,
        );
        assert_eq!(settings.salary.as_deref(), Some("50.000"));
        assert_eq!(settings.what_if_pct, 0.0);
        assert_eq!(settings.source, Some(SourceKey::Avg));
    }

    #[test]
    fn test_load_with_last_used_clamps_what_if_pct() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let high = Settings::load_with_last_used_impl(args(&["--what-if-pct", "500"]), &config_path);
        assert_eq!(high.what_if_pct, 200.0);

        let low = Settings::load_with_last_used_impl(args(&["--what-if-pct", "-10"]), &config_path);
        assert_eq!(low.what_if_pct, 0.0);
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            salary: Some("30.000".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");
        assert!(config_path.exists(), "file must exist before clear");

        let settings = Settings::load_with_last_used_impl(args(&["--clear"]), &config_path);

        assert!(!config_path.exists(), "file must be gone after --clear");
        assert!(settings.salary.is_none(), "cleared values must not be merged");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(args(&["--debug"]), &config_path);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_does_not_write() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(args(&["--salary", "12.500"]), &config_path);

        assert!(!config_path.exists(), "loading alone must not persist");
    }

    #[test]
    fn test_save_last_used_after_success() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(
            args(&["--salary", "12.500", "--what-if-month", "2024-05"]),
            &config_path,
        );
        settings.base_salary().expect("salary parses");
        settings.save_last_used_to(&config_path).expect("save");

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.salary.as_deref(), Some("12.500"));
        assert_eq!(loaded.what_if_month, Some(m("2024-05")));
        assert_eq!(loaded.what_if_pct, Some(0.0));
    }

    #[test]
    fn test_failed_run_keeps_previous_params() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let good = LastUsedParams {
            salary: Some("30.000".to_string()),
            start_month: Some(m("2024-01")),
            ..Default::default()
        };
        good.save_to(&config_path).expect("save");
        let before = std::fs::read_to_string(&config_path).unwrap();

        let settings = Settings::load_with_last_used_impl(
            args(&["--salary", "abc", "--start-month", "2030-01"]),
            &config_path,
        );
        assert!(matches!(settings.base_salary(), Err(LensError::InvalidSalary(_))));

        let after = std::fs::read_to_string(&config_path).unwrap();
        assert_eq!(before, after, "a failed run must not overwrite saved params");
        assert_eq!(LastUsedParams::load_from(&config_path), good);
    }
}
