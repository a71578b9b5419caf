use log::LevelFilter;
use std::path::PathBuf;

pub const EXPORT_DIR_VAR: &str = "BRACKETUI_EXPORT_DIR";
pub const EXPORT_HEADER_VAR: &str = "BRACKETUI_EXPORT_HEADER";
pub const LOG_VAR: &str = "BRACKETUI_LOG";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: LevelFilter,
    /// Where exports are written.
    pub export_dir: PathBuf,
    /// Optional text banner written above every export.
    pub export_header: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: LevelFilter::Info,
            export_dir: PathBuf::from("."),
            export_header: None,
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            full_screen: false,
            log_level: non_blank(LOG_VAR)
                .and_then(|v| v.trim().parse::<LevelFilter>().ok())
                .unwrap_or(defaults.log_level),
            export_dir: non_blank(EXPORT_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            export_header: non_blank(EXPORT_HEADER_VAR).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> AppSettings {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppSettings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let s = settings(&[]);
        assert_eq!(s.log_level, LevelFilter::Info);
        assert_eq!(s.export_dir, PathBuf::from("."));
        assert!(s.export_header.is_none());
    }

    #[test]
    fn reads_export_paths() {
        let s = settings(&[(EXPORT_DIR_VAR, "/tmp/out"), (EXPORT_HEADER_VAR, "banner.txt")]);
        assert_eq!(s.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(s.export_header, Some(PathBuf::from("banner.txt")));
    }

    #[test]
    fn log_level_is_case_insensitive_and_falls_back() {
        assert_eq!(settings(&[(LOG_VAR, "DEBUG")]).log_level, LevelFilter::Debug);
        assert_eq!(settings(&[(LOG_VAR, "loud")]).log_level, LevelFilter::Info);
    }

    #[test]
    fn blank_values_are_ignored() {
        let s = settings(&[(EXPORT_DIR_VAR, "  "), (EXPORT_HEADER_VAR, "")]);
        assert_eq!(s.export_dir, PathBuf::from("."));
        assert!(s.export_header.is_none());
    }
}
