//! Text-only extraction command.

use std::io::Write;
use std::path::Path;

use agendex::config::Settings;
use agendex::extract::TextExtractor;

/// Print the extracted text of `input` to stdout.
pub fn cmd_text(settings: &Settings, input: &Path) -> anyhow::Result<()> {
    let extractor = TextExtractor::new(settings.extraction.backend());
    let extracted = extractor.extract(input)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(extracted.text.as_bytes())?;
    stdout.flush()?;

    eprintln!(
        "{} characters from {} of {} pages",
        extracted.char_count(),
        extracted.pages_with_text,
        extracted.page_count
    );
    Ok(())
}
