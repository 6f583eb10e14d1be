//! Full pipeline command.

use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use agendex::config::Settings;
use agendex::extract::{ExtractedText, TextExtractor};
use agendex::llm::StructuringClient;
use agendex::{Pipeline, RunObserver, RunSummary, StructuredRecord};

/// Terminal progress: status lines plus a spinner while the model works.
struct ConsoleProgress {
    spinner: ProgressBar,
    model: String,
}

impl ConsoleProgress {
    fn new(settings: &Settings) -> anyhow::Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        Ok(Self {
            spinner,
            model: format!("{} ({})", settings.llm.model_id(), settings.llm.provider),
        })
    }
}

impl RunObserver for ConsoleProgress {
    fn extracting(&self, input: &Path) {
        println!("Extracting text from {}...", input.display());
    }

    fn extracted(&self, text: &ExtractedText) {
        println!("Extracted {} characters of text", text.char_count());
        if text.pages_with_text < text.page_count {
            println!(
                "  {} {} of {} pages had no text layer",
                style("!").yellow(),
                text.page_count - text.pages_with_text,
                text.page_count
            );
        }
    }

    fn structuring(&self) {
        self.spinner
            .set_message(format!("Structuring with {}...", self.model));
        self.spinner.enable_steady_tick(Duration::from_millis(100));
    }

    fn structuring_done(&self) {
        self.spinner.finish_and_clear();
    }

    fn written(&self, record: &StructuredRecord, _output: &Path) {
        if record.is_degraded() {
            println!(
                "  {} Model reply was not valid JSON; saved raw response",
                style("!").yellow()
            );
        }
    }
}

/// Extract text, structure it with the model and write the JSON record.
pub async fn cmd_run(settings: &Settings, input: &Path, output: &Path) -> anyhow::Result<()> {
    let extractor = TextExtractor::new(settings.extraction.backend());
    let structurer = StructuringClient::from_config(settings.llm.clone())?;
    let pipeline = Pipeline::new(extractor, structurer);

    let progress = ConsoleProgress::new(settings)?;
    let summary = pipeline.run_with(input, output, &progress).await?;
    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let record = &summary.record;
    if !record.is_degraded() {
        if let Some(title) = record.meeting_title() {
            println!("  {} {}", style("✓").green(), title);
        }
        println!(
            "  {} sections, {} social services items",
            record.section_titles().len(),
            record.social_services_count()
        );
    }
    println!(
        "Output: {} ({} of {} pages had text)",
        summary.output.display(),
        summary.pages_with_text,
        summary.page_count
    );
}
