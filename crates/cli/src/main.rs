use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use medstaff_auth::{Resolution, RoleResolver};
use serde::Serialize;

mod config;

#[derive(Serialize)]
struct Line<'a> {
    input: &'a str,
    #[serde(flatten)]
    resolution: Resolution,
}

fn main() -> Result<()> {
    medstaff_observability::init();

    let config = config::Config::from_env()?;
    let resolver = config.build_resolver()?;
    tracing::info!(
        roles = resolver.map().len(),
        default_role = %resolver.default_role(),
        custom_map = config.role_map_path.is_some(),
        "resolver ready"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("failed to read stdin")?;
            emit(&mut out, &resolver, &line)?;
        }
    } else {
        for arg in &args {
            emit(&mut out, &resolver, arg)?;
        }
    }

    out.flush().context("failed to flush stdout")?;
    Ok(())
}

fn emit(out: &mut impl Write, resolver: &RoleResolver, input: &str) -> Result<()> {
    let resolution = resolver.explain(Some(input));
    if resolution.is_default() && !input.is_empty() {
        tracing::warn!(input, role = %resolution.role, "no confident match; using default");
    }

    serde_json::to_writer(&mut *out, &Line { input, resolution })
        .context("failed to write resolution")?;
    writeln!(out).context("failed to write resolution")?;
    Ok(())
}
