use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Config;
use crate::scoring::BonusPolicy;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub classification: Option<ClassificationConfig>,
    pub ocr: Option<OcrConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationConfig {
    pub bank_threshold: Option<u32>,
    pub salary_threshold: Option<u32>,
    pub fuzzy_threshold: Option<u32>,
    pub bonus_weight: Option<u32>,
    pub bonus_policy: Option<BonusPolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrConfig {
    pub tesseract_path: Option<String>,
    pub language: Option<String>,
    pub render_dpi: Option<u32>,
    pub scratch_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub max_upload_mb: Option<usize>,
}

/// Platform config directory path: `<config_dir>/docsort/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("docsort").join("config.toml"))
}

/// Load config by cascading CWD `.docsort.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".docsort.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config");
            None
        }
    }
}

fn pick<S, T>(
    overlay: &Option<S>,
    base: &Option<S>,
    field: impl Fn(&S) -> Option<T>,
) -> Option<T> {
    overlay
        .as_ref()
        .and_then(&field)
        .or_else(|| base.as_ref().and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (bc, oc) = (&base.classification, &overlay.classification);
    let (bo, oo) = (&base.ocr, &overlay.ocr);
    let (bs, os) = (&base.server, &overlay.server);

    ConfigFile {
        classification: Some(ClassificationConfig {
            bank_threshold: pick(oc, bc, |c| c.bank_threshold),
            salary_threshold: pick(oc, bc, |c| c.salary_threshold),
            fuzzy_threshold: pick(oc, bc, |c| c.fuzzy_threshold),
            bonus_weight: pick(oc, bc, |c| c.bonus_weight),
            bonus_policy: pick(oc, bc, |c| c.bonus_policy),
        }),
        ocr: Some(OcrConfig {
            tesseract_path: pick(oo, bo, |o| o.tesseract_path.clone()),
            language: pick(oo, bo, |o| o.language.clone()),
            render_dpi: pick(oo, bo, |o| o.render_dpi),
            scratch_dir: pick(oo, bo, |o| o.scratch_dir.clone()),
        }),
        server: Some(ServerConfig {
            bind: pick(os, bs, |s| s.bind.clone()),
            max_upload_mb: pick(os, bs, |s| s.max_upload_mb),
        }),
    }
}

impl ConfigFile {
    /// Overwrite `config` with every value this file sets.
    pub fn apply(&self, config: &mut Config) {
        if let Some(c) = &self.classification {
            if let Some(v) = c.bank_threshold {
                config.bank_threshold = v;
            }
            if let Some(v) = c.salary_threshold {
                config.salary_threshold = v;
            }
            if let Some(v) = c.fuzzy_threshold {
                config.scoring.fuzzy_threshold = v;
            }
            if let Some(v) = c.bonus_weight {
                config.scoring.bonus_weight = v;
            }
            if let Some(v) = c.bonus_policy {
                config.scoring.bonus_policy = v;
            }
        }
        if let Some(o) = &self.ocr {
            if let Some(v) = &o.tesseract_path {
                config.tesseract_path = v.clone();
            }
            if let Some(v) = &o.language {
                config.ocr_language = v.clone();
            }
            if let Some(v) = o.render_dpi {
                config.render_dpi = v;
            }
            if let Some(v) = &o.scratch_dir {
                config.scratch_root = PathBuf::from(v);
            }
        }
    }
}

/// Apply `DOCSORT_*` overrides. `lookup` is normally `std::env::var`.
pub fn apply_env<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    if let Some(v) = lookup("DOCSORT_BANK_THRESHOLD")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.bank_threshold = v;
    }
    if let Some(v) = lookup("DOCSORT_SALARY_THRESHOLD")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.salary_threshold = v;
    }
    if let Ok(v) = lookup("DOCSORT_SCRATCH_DIR") {
        config.scratch_root = PathBuf::from(v);
    }
    if let Ok(v) = lookup("DOCSORT_TESSERACT") {
        config.tesseract_path = v;
    }
}

/// Defaults, then config files, then environment.
pub fn resolve_config() -> (Config, ConfigFile) {
    let file = load_config();
    let mut config = Config::default();
    file.apply(&mut config);
    apply_env(&mut config, |k| std::env::var(k));
    (config, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::VarError;

    fn no_env(_: &str) -> Result<String, VarError> {
        Err(VarError::NotPresent)
    }

    #[test]
    fn test_partial_toml_parses() {
        let toml_str = "[classification]\nbank_threshold = 9\nbonus_policy = \"on_match\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let c = parsed.classification.unwrap();
        assert_eq!(c.bank_threshold, Some(9));
        assert_eq!(c.salary_threshold, None);
        assert_eq!(c.bonus_policy, Some(BonusPolicy::OnMatch));
        assert!(parsed.ocr.is_none());
    }

    #[test]
    fn test_load_from_path_missing_or_invalid() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "classification = [[[").unwrap();
        assert!(load_from_path(&bad).is_none());
    }

    #[test]
    fn test_merge_overlay_wins() {
        let base = ConfigFile {
            classification: Some(ClassificationConfig {
                bank_threshold: Some(5),
                salary_threshold: Some(6),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            classification: Some(ClassificationConfig {
                bank_threshold: Some(10),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).classification.unwrap();
        assert_eq!(merged.bank_threshold, Some(10));
        assert_eq!(merged.salary_threshold, Some(6));
    }

    #[test]
    fn test_merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            ocr: Some(OcrConfig {
                tesseract_path: Some("/opt/tesseract".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(
            merged.ocr.unwrap().tesseract_path.as_deref(),
            Some("/opt/tesseract")
        );
    }

    #[test]
    fn test_apply_overrides_defaults() {
        let file: ConfigFile = toml::from_str(
            "[classification]\nsalary_threshold = 5\nfuzzy_threshold = 90\n\
             [ocr]\nrender_dpi = 300\nscratch_dir = \"/var/tmp/docsort\"\n",
        )
        .unwrap();
        let mut config = Config::default();
        file.apply(&mut config);

        assert_eq!(config.bank_threshold, 8);
        assert_eq!(config.salary_threshold, 5);
        assert_eq!(config.scoring.fuzzy_threshold, 90);
        assert_eq!(config.render_dpi, 300);
        assert_eq!(config.scratch_root, PathBuf::from("/var/tmp/docsort"));
    }

    #[test]
    fn test_apply_env() {
        let mut config = Config::default();
        apply_env(&mut config, |k| match k {
            "DOCSORT_BANK_THRESHOLD" => Ok("12".into()),
            "DOCSORT_SALARY_THRESHOLD" => Ok("not a number".into()),
            "DOCSORT_TESSERACT" => Ok("/usr/local/bin/tesseract".into()),
            _ => Err(VarError::NotPresent),
        });
        assert_eq!(config.bank_threshold, 12);
        assert_eq!(config.salary_threshold, 7);
        assert_eq!(config.tesseract_path, "/usr/local/bin/tesseract");
    }

    #[test]
    fn test_apply_env_nothing_set() {
        let mut config = Config::default();
        apply_env(&mut config, no_env);
        assert_eq!(config.bank_threshold, 8);
        assert_eq!(config.tesseract_path, "tesseract");
    }
}
