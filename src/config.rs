use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub root: Root,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub cors: Cors,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Root {
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
}
impl Default for Root {
    fn default() -> Self { Self { root_dir: default_root_dir() } }
}
fn default_root_dir() -> PathBuf { Path::new(env!("CARGO_MANIFEST_DIR")).join("public").join("data_dev") }

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}
impl Default for Server {
    fn default() -> Self { Self { bind_addr: default_bind_addr(), port: default_port() } }
}
fn default_bind_addr() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }

/// `["*"]` allows every origin, method and header.
#[derive(Debug, Deserialize, Clone)]
pub struct Cors {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}
impl Default for Cors {
    fn default() -> Self { Self { allowed_origins: default_allowed_origins() } }
}
fn default_allowed_origins() -> Vec<String> { vec!["*".to_string()] }

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(toml::from_str(&raw)?)
        }
    }

    /// Loads `path` when given, else `simdata.toml` if present, else defaults.
    pub fn discover(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let local = Path::new("simdata.toml");
                if local.is_file() { Self::load(local) } else { Ok(Self::default()) }
            }
        }
    }

    /// Applies the `PORT` override; `port` is the raw env value.
    pub fn apply_port_override(&mut self, port: Option<&str>) -> anyhow::Result<()> {
        if let Some(raw) = port {
            self.server.port = raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a port number, got {raw:?}: {e}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.root.root_dir.is_dir() {
            anyhow::bail!("root_dir does not exist or is not a directory: {}", self.root.root_dir.display());
        }
        if self.cors.allowed_origins.is_empty() { anyhow::bail!("allowed_origins must not be empty"); }
        Ok(())
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors.allowed_origins.iter().any(|o| o == "*")
    }
}
