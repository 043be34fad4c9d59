mod config;
mod data;
mod errors;
mod logging;
mod security;
mod server;

#[cfg(test)]
mod fixtures;

use crate::{config::Config, security::PathGuard};
use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                if i >= args.len() { eprintln!("--config requires a path"); std::process::exit(2); }
                config_path = Some(PathBuf::from(&args[i]));
            }
            other => { eprintln!("unknown argument: {other}"); std::process::exit(2); }
        }
        i += 1;
    }

    let mut cfg = Config::discover(config_path.as_deref()).context("loading config")?;
    cfg.apply_port_override(std::env::var("PORT").ok().as_deref()).context("reading PORT")?;
    cfg.validate().context("validating config")?;
    let guard = PathGuard::new(&cfg.root.root_dir).context("canonicalizing root_dir")?;

    let addr = format!("{}:{}", cfg.server.bind_addr, cfg.server.port);
    info!(addr = %addr, root = %guard.root().display(), any_origin = cfg.allows_any_origin(), "simdata ready");
    println!("simdata ready addr={} root={}", addr, guard.root().display());

    server::serve(cfg, guard).await
}
