use std::io::Write;

use docsort_core::{ClassificationResult, OTHER_LABEL};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print a classification verdict with its supporting signals.
pub fn print_result(
    w: &mut dyn Write,
    file_name: &str,
    result: &ClassificationResult,
    threshold: u32,
    color: ColorMode,
) -> std::io::Result<()> {
    let sep = "=".repeat(60);
    let matched = result.classification != OTHER_LABEL;

    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{} {}", "File:".bold(), file_name.cyan())?;
        let verdict = if matched {
            result.classification.bold().green().to_string()
        } else {
            result.classification.bold().yellow().to_string()
        };
        writeln!(w, "{} {}", "Classification:".bold(), verdict)?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "File: {}", file_name)?;
        writeln!(w, "Classification: {}", result.classification)?;
    }

    writeln!(
        w,
        "Match count: {} (threshold {})",
        result.match_count, threshold
    )?;
    writeln!(
        w,
        "Text source: {}",
        if result.scanned { "OCR (scanned)" } else { "native text" }
    )?;

    let created = result.creation_date.as_deref().unwrap_or("(none)");
    let modified = result.modification_date.as_deref().unwrap_or("(none)");
    writeln!(w, "Created: {}", created)?;
    writeln!(w, "Modified: {}", modified)?;

    if result.pdf_modified {
        let msg = "PDF was modified after creation";
        if color.enabled() {
            writeln!(w, "{}", msg.red())?;
        } else {
            writeln!(w, "{}", msg)?;
        }
    }

    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
    }
    Ok(())
}

/// Print extracted text for keyword tuning.
pub fn print_text(
    w: &mut dyn Write,
    text: &str,
    scanned: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    let header = if scanned {
        "--- extracted via OCR ---"
    } else {
        "--- native text ---"
    };
    if color.enabled() {
        writeln!(w, "{}", header.dimmed())?;
    } else {
        writeln!(w, "{}", header)?;
    }
    writeln!(w, "{}", text)?;
    Ok(())
}
