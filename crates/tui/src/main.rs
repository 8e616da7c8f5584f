mod renderer;

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use folio_core::{OrchestrationConfig, Portfolio, content_from_json, default_content};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 3 || args.iter().skip(1).any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: folio [content.json] [config.json]");
        std::process::exit(1);
    }

    let content = match args.get(1) {
        Some(path) => {
            let data = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            content_from_json(&data).with_context(|| format!("parsing {path}"))?
        }
        None => default_content()?,
    };
    let config = match args.get(2) {
        Some(path) => {
            let data = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            OrchestrationConfig::from_json(&data).with_context(|| format!("parsing {path}"))?
        }
        None => OrchestrationConfig::default(),
    };

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let portfolio = Portfolio::seeded(content, config, seed)?;

    renderer::render_tui(portfolio)
}
