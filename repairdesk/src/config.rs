use anyhow::{Context, Result};
use repairdesk_core::{IntakePolicy, StatusLabels};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Csv,
    Sqlite,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: Option<BackendKind>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct ShopConfig {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub currency: Option<String>,
    pub qr_service: Option<String>,
    pub rtl: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct LabelsConfig {
    pub in_repair: Option<String>,
    pub delivered: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct IntakeConfig {
    pub require_phone: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub username: String,
    /// Hex SHA-256 of the password; `repairdesk hash-password` prints it.
    pub password_sha256: String,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    pub storage: Option<StorageConfig>,
    pub shop: Option<ShopConfig>,
    pub labels: Option<LabelsConfig>,
    pub intake: Option<IntakeConfig>,
    pub auth: Option<AuthConfig>,
    pub brands: Option<Vec<String>>,
}

const DEFAULT_CONFIG: &str = "repairdesk.yaml";
const DEFAULT_BRANDS: [&str; 5] = ["iPhone", "Samsung", "Xiaomi", "Infinix", "Techno"];

/// An explicit path must load; the default `./repairdesk.yaml` is optional.
/// A file that does not parse is an error so a broken `auth` section can
/// never silently turn the login off.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG);
            if p.exists() { p.to_path_buf() } else { return Ok(None); }
        }
    };
    let s = fs::read_to_string(&path).with_context(|| format!("reading config {}", path.display()))?;
    let cfg = parse_config(&s).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(Some(cfg))
}

pub fn parse_config(s: &str) -> Result<Config> {
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(s)?)
}

impl Config {
    /// Backend and file, with `--data` taking precedence over config.
    /// Without an explicit backend, `.db`/`.sqlite` files use SQLite.
    pub fn storage(&self, data_override: Option<&Path>) -> (BackendKind, PathBuf) {
        let st = self.storage.clone().unwrap_or_default();
        let path = data_override.map(Path::to_path_buf).or(st.path);
        let kind = st.backend.unwrap_or_else(|| match path.as_deref().and_then(|p| p.extension()).and_then(|e| e.to_str()) {
            Some("db" | "sqlite" | "sqlite3") => BackendKind::Sqlite,
            _ => BackendKind::Csv,
        });
        let path = path.unwrap_or_else(|| match kind {
            BackendKind::Csv => PathBuf::from("repairs.csv"),
            BackendKind::Sqlite => PathBuf::from("repairs.db"),
        });
        (kind, path)
    }

    pub fn status_labels(&self) -> StatusLabels {
        let mut labels = StatusLabels::default();
        if let Some(l) = &self.labels {
            if let Some(v) = &l.in_repair { labels.in_repair = v.clone(); }
            if let Some(v) = &l.delivered { labels.delivered = v.clone(); }
        }
        labels
    }

    pub fn intake_policy(&self) -> IntakePolicy {
        IntakePolicy { require_phone: self.intake.as_ref().and_then(|i| i.require_phone).unwrap_or(false) }
    }

    pub fn currency(&self) -> String {
        self.shop.as_ref().and_then(|s| s.currency.clone()).unwrap_or_else(|| "$".into())
    }

    /// Configured spelling of a brand typed in any case; unknown brands pass through.
    pub fn canonical_brand(&self, brand: &str) -> String {
        let b = brand.trim();
        let known: Vec<String> = match &self.brands {
            Some(list) => list.clone(),
            None => DEFAULT_BRANDS.iter().map(|s| s.to_string()).collect(),
        };
        known.into_iter().find(|k| k.eq_ignore_ascii_case(b)).unwrap_or_else(|| b.to_string())
    }

    #[cfg(feature = "print")]
    pub fn shop_profile(&self) -> receipts::ShopProfile {
        let mut p = receipts::ShopProfile::default();
        if let Some(s) = &self.shop {
            if let Some(v) = &s.name { p.name = v.clone(); }
            if let Some(v) = &s.phone { p.phone = v.clone(); }
            if let Some(v) = &s.currency { p.currency = v.clone(); }
            if let Some(v) = &s.qr_service { p.qr_service = v.clone(); }
            if let Some(v) = s.rtl { p.rtl = v; }
        }
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repairdesk_core::TicketStatus;

    const SAMPLE: &str = r#"
storage:
  backend: sqlite
  path: data/shop.db
shop:
  name: Al-Hal Tech
  phone: "0916206100"
  rtl: true
labels:
  in_repair: تحت الصيانة
  delivered: تم التسليم
intake:
  require_phone: true
auth:
  username: admin
  password_sha256: 8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918
brands: [iPhone, Samsung, Huawei]
"#;

    #[test]
    fn full_config() {
        let cfg = parse_config(SAMPLE).unwrap();
        assert_eq!(cfg.storage(None), (BackendKind::Sqlite, PathBuf::from("data/shop.db")));
        assert_eq!(cfg.status_labels().label(TicketStatus::Delivered), "تم التسليم");
        assert!(cfg.intake_policy().require_phone);
        assert_eq!(cfg.auth.as_ref().unwrap().username, "admin");
        assert_eq!(cfg.canonical_brand("huawei"), "Huawei");
        assert_eq!(cfg.currency(), "$");
    }

    #[test]
    fn defaults_when_empty() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.storage(None), (BackendKind::Csv, PathBuf::from("repairs.csv")));
        assert_eq!(cfg.status_labels(), StatusLabels::default());
        assert!(!cfg.intake_policy().require_phone);
        assert!(cfg.auth.is_none());
        assert_eq!(cfg.canonical_brand(" samsung "), "Samsung");
        assert_eq!(cfg.canonical_brand("Nokia"), "Nokia");
    }

    #[test]
    fn data_override_and_extension() {
        let cfg = Config::default();
        assert_eq!(cfg.storage(Some(Path::new("x/t.sqlite"))), (BackendKind::Sqlite, PathBuf::from("x/t.sqlite")));
        assert_eq!(cfg.storage(Some(Path::new("t.csv"))).0, BackendKind::Csv);
        let cfg = parse_config("storage:\n  backend: csv\n").unwrap();
        assert_eq!(cfg.storage(Some(Path::new("odd.db"))).0, BackendKind::Csv);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(parse_config("auth: [not, a, map]").is_err());
        assert!(parse_config("storage:\n  backend: postgres\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.yaml"))).is_err());
        let p = dir.path().join("c.yaml");
        fs::write(&p, "shop:\n  currency: LYD\n").unwrap();
        assert_eq!(load_config(Some(&p)).unwrap().unwrap().currency(), "LYD");
    }
}
