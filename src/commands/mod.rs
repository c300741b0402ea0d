//! Command handlers module.
//!
//! - `lexicon.rs`: lexicon build/inspection and codec helpers
//! - `detect.rs`: detection and occurrence vectors

mod detect;
mod lexicon;

use anyhow::Context;
use std::io::Read;

pub use detect::{cmd_detect, cmd_vector};
pub use lexicon::{cmd_build, cmd_obscure, cmd_reveal, cmd_terms};

/// Returns `text`, or all of stdin when absent.
fn text_or_stdin(text: Option<String>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading text from stdin")?;
    Ok(buf)
}
