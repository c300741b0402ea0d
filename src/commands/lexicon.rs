//! Lexicon command handlers.

use anyhow::Context;
use redflag::config::RedflagConfig;
use redflag::{TermCodec, normalize};
use std::path::{Path, PathBuf};

/// Build command.
///
/// Reads one raw candidate per line, normalizes the list, and writes it.
pub fn cmd_build(
    config: &RedflagConfig,
    raw: &Path,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(raw)
        .with_context(|| format!("reading raw terms from {}", raw.display()))?;
    let candidates: Vec<&str> = contents.lines().collect();
    let terms = normalize(&candidates);

    let store = match output {
        Some(path) => config.clone().with_lexicon_path(path).lexicon_store(),
        None => config.lexicon_store(),
    };
    store.write(&terms)?;

    println!(
        "Wrote {} terms ({} candidates) to {}",
        terms.len(),
        candidates.len(),
        store.path().display()
    );
    Ok(())
}

/// Terms command.
pub fn cmd_terms(config: &RedflagConfig) -> anyhow::Result<()> {
    for term in config.lexicon_store().read()? {
        println!("{term}");
    }
    Ok(())
}

/// Obscure command.
pub fn cmd_obscure(config: &RedflagConfig, term: &str) -> anyhow::Result<()> {
    let store = config.lexicon_store();
    let record = store.codec().encode(term);
    println!("{}", String::from_utf8_lossy(&record));
    Ok(())
}

/// Reveal command.
pub fn cmd_reveal(config: &RedflagConfig, record: &str) -> anyhow::Result<()> {
    let store = config.lexicon_store();
    let term = store
        .codec()
        .decode(record.trim().as_bytes())
        .context("record is not a valid obscured term")?;
    println!("{term}");
    Ok(())
}
