//! Turns extracted document text into rows for one sheet.

use tracing::{debug, error, info, warn};

use crate::app::ports::{CompletionPort, CompletionRequest, ModelProfile};
use crate::config::ExtractionSettings;
use crate::domain::{ColumnSchema, ExtractedText, ParsedDataset, SheetDefinition, SheetKind};
use crate::error::Result;
use crate::pipeline::chunk::{estimate_tokens, LineChunks};
use crate::pipeline::normalize::normalize_line;
use crate::pipeline::segment::{excerpt, split_policy_text};
use crate::prompts;

/// Rows produced for a sheet plus bookkeeping about how they were obtained
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub dataset: ParsedDataset,
    /// Completion calls attempted
    pub calls: usize,
    /// Completion calls that failed and contributed nothing
    pub failed_calls: usize,
    /// Response lines that could not be parsed as CSV
    pub unparsed_lines: usize,
}

impl ExtractionReport {
    pub fn all_calls_failed(&self) -> bool {
        self.calls > 0 && self.failed_calls == self.calls
    }
}

/// Sends text to the model and collects the returned rows.
pub struct Extractor<'a> {
    model: &'a dyn CompletionPort,
    settings: &'a ExtractionSettings,
    profile: &'a ModelProfile,
}

impl<'a> Extractor<'a> {
    pub fn new(model: &'a dyn CompletionPort, settings: &'a ExtractionSettings, profile: &'a ModelProfile) -> Self {
        Self { model, settings, profile }
    }

    /// Builds the dataset for `sheet` from the uploaded documents' text.
    ///
    /// Flat sheets use only the first document and always yield one row
    /// (blank when the model returns nothing). Grouped sheets split every
    /// document into header and insured list and yield the header row
    /// followed by one row per returned member line, in call order.
    pub async fn extract(&self, sheet: &SheetDefinition, schema: &ColumnSchema, texts: &[ExtractedText]) -> ExtractionReport {
        let mut report = ExtractionReport::default();
        match &sheet.kind {
            SheetKind::Flat => {
                info!("Processing flat sheet {}", sheet.name);
                if let Some(first) = texts.first() {
                    if texts.len() > 1 {
                        debug!("Flat sheet uses only {}; {} more documents ignored", first.source, texts.len() - 1);
                    }
                    self.extract_flat(schema, first, &mut report).await;
                }
            }
            SheetKind::Grouped { instructions } => {
                for (i, text) in texts.iter().enumerate() {
                    info!("Processing file {}/{} for {}", i + 1, texts.len(), sheet.name);
                    self.extract_grouped(instructions, schema, text, &mut report).await;
                }
            }
        }
        info!(
            "Extracted {} rows for {} ({} calls, {} failed, {} unparsed lines)",
            report.dataset.len(),
            sheet.name,
            report.calls,
            report.failed_calls,
            report.unparsed_lines
        );
        report
    }

    async fn extract_flat(&self, schema: &ColumnSchema, text: &ExtractedText, report: &mut ExtractionReport) {
        let instructions = &self.settings.flat_instructions;
        let user = prompts::flat_request(instructions, schema.columns(), &text.text);
        let lines = self.call(instructions, user, report).await;

        let first = lines.first().map(String::as_str).unwrap_or("");
        match normalize_line(first, schema) {
            Some(row) => report.dataset.push(row),
            None => report.unparsed_lines += 1,
        }
    }

    async fn extract_grouped(&self, instructions: &str, schema: &ColumnSchema, text: &ExtractedText, report: &mut ExtractionReport) {
        let segments = split_policy_text(&text.text, self.settings.markers.as_slice());

        let header_lines = self
            .call(instructions, prompts::policy_header_request(instructions, &segments.policy_text), report)
            .await;
        match header_lines.first() {
            Some(line) => {
                if header_lines.len() > 1 {
                    debug!("Header call returned {} lines, keeping the first", header_lines.len());
                }
                self.push_line(line, schema, report);
            }
            None => warn!("No policy header data extracted from {}", text.source),
        }

        if !segments.has_insured() {
            return;
        }

        let chunks = LineChunks::new(&segments.insured_text, self.settings.chunk_lines);
        let total = chunks.total_chunks();
        info!("Processing {} chunks of insured data", total);
        for (i, chunk) in chunks.enumerate() {
            let tokens = estimate_tokens(&chunk, self.settings.chars_per_token);
            if tokens > self.settings.chunk_token_budget {
                warn!(
                    "Chunk {}/{} is about {} tokens, above the budget of {}",
                    i + 1,
                    total,
                    tokens,
                    self.settings.chunk_token_budget
                );
            }
            let lines = self
                .call(instructions, prompts::members_request(instructions, &chunk), report)
                .await;
            for line in &lines {
                self.push_line(line, schema, report);
            }
            info!("Processed chunk {}/{}", i + 1, total);
        }
    }

    fn push_line(&self, line: &str, schema: &ColumnSchema, report: &mut ExtractionReport) {
        match normalize_line(line, schema) {
            Some(row) => report.dataset.push(row),
            None => report.unparsed_lines += 1,
        }
    }

    /// One completion call; a failure is logged, counted and yields no lines
    async fn call(&self, system: &str, user: String, report: &mut ExtractionReport) -> Vec<String> {
        report.calls += 1;
        match request_lines(self.model, self.profile, system, user).await {
            Ok(lines) => lines,
            Err(e) => {
                error!("Error in chunk processing: {}", e);
                report.failed_calls += 1;
                Vec::new()
            }
        }
    }
}

/// Calls the model and splits its answer into trimmed, non-empty lines
pub async fn request_lines(model: &dyn CompletionPort, profile: &ModelProfile, system: &str, user: String) -> Result<Vec<String>> {
    let request = CompletionRequest {
        profile: profile.clone(),
        system: system.to_string(),
        user,
    };
    info!("Sending request to {}", profile.model);
    let response = model.complete(&request).await?;
    info!("Received response from {}", profile.model);
    debug!("Model response (first 500 chars): {}", excerpt(&response, 500));

    Ok(response
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}
