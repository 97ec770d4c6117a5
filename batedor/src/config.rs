//! Settings, layered: defaults, then the JSON file, then BATEDOR_* env vars, then flags.
//! Stored under XDG config dir: $XDG_CONFIG_HOME/batedor/config.json (fallback ~/.config/batedor/config.json)

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use batedor_agent::probe::ProbeTargets;
use batedor_agent::scheduler::Cadence;
use serde::{Deserialize, Serialize};

use crate::cli::ParsedArgs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tick_ms: u64,
    pub persist_secs: u64,
    pub probe_secs: u64,
    pub web: bool,
    pub web_port: u16,
    pub web_root: PathBuf,
    pub db_path: PathBuf,
    pub disk_path: PathBuf,
    pub latency_target: String,
    pub ip_lookup_host: String,
    pub series_capacity: usize,
    pub headless: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            persist_secs: 60,
            probe_secs: 30,
            web: false,
            web_port: 9090,
            web_root: PathBuf::from("frontend"),
            db_path: PathBuf::from("batedor_history.db"),
            disk_path: PathBuf::from("/"),
            latency_target: "8.8.8.8:53".into(),
            ip_lookup_host: "api.ipify.org".into(),
            series_capacity: 100,
            headless: false,
        }
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("batedor")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("batedor")
    }
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Where the log file goes while the terminal UI owns the screen.
pub fn data_dir() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("batedor")
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> anyhow::Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| anyhow::anyhow!("invalid value for {key}: {raw:?}"))
}

fn parse_bool(key: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => bail!("invalid value for {key}: {raw:?}"),
    }
}

impl Settings {
    /// `Ok(None)` when the file does not exist.
    pub fn load_file(path: &Path) -> anyhow::Result<Option<Settings>> {
        let data = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        let s = serde_json::from_str(&data)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(s))
    }

    pub fn apply_env<F>(&mut self, get: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get("BATEDOR_TICK_MS") {
            self.tick_ms = parse_env("BATEDOR_TICK_MS", &v)?;
        }
        if let Some(v) = get("BATEDOR_PERSIST_SECS") {
            self.persist_secs = parse_env("BATEDOR_PERSIST_SECS", &v)?;
        }
        if let Some(v) = get("BATEDOR_PROBE_SECS") {
            self.probe_secs = parse_env("BATEDOR_PROBE_SECS", &v)?;
        }
        if let Some(v) = get("BATEDOR_WEB") {
            self.web = parse_bool("BATEDOR_WEB", &v)?;
        }
        if let Some(v) = get("BATEDOR_PORT") {
            self.web_port = parse_env("BATEDOR_PORT", &v)?;
        }
        if let Some(v) = get("BATEDOR_WEB_ROOT") {
            self.web_root = PathBuf::from(v);
        }
        if let Some(v) = get("BATEDOR_DB") {
            self.db_path = PathBuf::from(v);
        }
        if let Some(v) = get("BATEDOR_DISK_PATH") {
            self.disk_path = PathBuf::from(v);
        }
        if let Some(v) = get("BATEDOR_LATENCY_TARGET") {
            self.latency_target = v;
        }
        if let Some(v) = get("BATEDOR_IP_LOOKUP_HOST") {
            self.ip_lookup_host = v;
        }
        if let Some(v) = get("BATEDOR_SERIES_CAPACITY") {
            self.series_capacity = parse_env("BATEDOR_SERIES_CAPACITY", &v)?;
        }
        if let Some(v) = get("BATEDOR_HEADLESS") {
            self.headless = parse_bool("BATEDOR_HEADLESS", &v)?;
        }
        Ok(())
    }

    pub fn apply_args(&mut self, args: &ParsedArgs) {
        if args.web {
            self.web = true;
        }
        if let Some(p) = args.port {
            self.web_port = p;
        }
        if let Some(db) = &args.db {
            self.db_path = db.clone();
        }
        if args.headless {
            self.headless = true;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tick_ms == 0 || self.persist_secs == 0 || self.probe_secs == 0 {
            bail!("tick_ms, persist_secs and probe_secs must be greater than zero");
        }
        Ok(())
    }

    /// Full resolution against the real environment.
    pub fn resolve(args: &ParsedArgs) -> anyhow::Result<Settings> {
        let mut s = match &args.config {
            Some(path) => Self::load_file(path)?
                .with_context(|| format!("config file {} not found", path.display()))?,
            None => Self::load_file(&config_path())?.unwrap_or_default(),
        };
        s.apply_env(|k| std::env::var(k).ok())?;
        s.apply_args(args);
        s.validate()?;
        Ok(s)
    }

    pub fn cadence(&self) -> Cadence {
        Cadence {
            fast: Duration::from_millis(self.tick_ms),
            slow: Duration::from_secs(self.persist_secs),
            probe: Duration::from_secs(self.probe_secs),
        }
    }

    pub fn probe_targets(&self) -> ProbeTargets {
        ProbeTargets {
            latency_addr: self.latency_target.clone(),
            ip_host: self.ip_lookup_host.clone(),
            ..ProbeTargets::default()
        }
    }
}
