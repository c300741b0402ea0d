//! Detection command handlers.

use super::text_or_stdin;
use redflag::DetectionEngine;
use redflag::config::RedflagConfig;

/// Detect command.
///
/// Returns whether anything was flagged.
pub fn cmd_detect(
    config: &RedflagConfig,
    text: Option<String>,
    flag_only: bool,
) -> anyhow::Result<bool> {
    let engine = DetectionEngine::load(&config.lexicon_store())?;
    let text = text_or_stdin(text)?;

    let detection = engine.detect(&text, !flag_only);
    let flagged = detection.is_flagged();
    match detection.into_matches() {
        Some(matches) => matches.iter().for_each(|m| println!("{m}")),
        None => println!("{flagged}"),
    }
    Ok(flagged)
}

/// Vector command.
pub fn cmd_vector(config: &RedflagConfig, text: Option<String>) -> anyhow::Result<()> {
    let engine = DetectionEngine::load(&config.lexicon_store())?;
    let text = text_or_stdin(text)?;
    println!("{}", serde_json::to_string(&engine.abuse_vector(&text))?);
    Ok(())
}
