use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ModelSpec, TrainingStats};
use crate::stages::{EvaluationResult, ModelVariant};

/// Machine-readable summary of a training and evaluation run
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub generated_at: DateTime<Utc>,
    pub train_conversations: usize,
    pub train_utterances: usize,
    pub test_conversations: usize,
    pub test_utterances: usize,
    /// One entry per trained model
    pub training: Vec<TrainingSummary>,
    /// One entry per evaluated variant
    pub variants: Vec<VariantReport>,
    /// Share of each canonical tag in the training corpus
    pub tag_distribution: Vec<TagShare>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub model: String,
    pub spec: ModelSpec,
    #[serde(flatten)]
    pub stats: TrainingStats,
    pub contexts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariantReport {
    pub variant: ModelVariant,
    #[serde(flatten)]
    pub result: EvaluationResult,
    pub accuracy: Option<f64>,
}

impl VariantReport {
    pub fn new(variant: ModelVariant, result: EvaluationResult) -> Self {
        Self {
            variant,
            result,
            accuracy: result.accuracy(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagShare {
    pub tag: String,
    pub share: f64,
}

impl ExperimentReport {
    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Plain-text rendering of an experiment report
pub struct HumanReport<'a> {
    report: &'a ExperimentReport,
}

impl<'a> HumanReport<'a> {
    pub fn new(report: &'a ExperimentReport) -> Self {
        Self { report }
    }

    pub fn format(&self) -> String {
        let report = self.report;
        let mut output = String::new();

        output.push_str("Corpus\n------\n");
        output.push_str(&format!(
            "Train: {} conversations, {} utterances\n",
            report.train_conversations, report.train_utterances
        ));
        output.push_str(&format!(
            "Test: {} conversations, {} utterances\n\n",
            report.test_conversations, report.test_utterances
        ));

        output.push_str("Training\n--------\n");
        for summary in &report.training {
            output.push_str(&format!(
                "{}: trained on {} utterances ({} errors, {} contexts)\n",
                summary.model, summary.stats.counted, summary.stats.errors, summary.contexts
            ));
        }

        output.push_str("\nEvaluation\n----------\n");
        for variant in &report.variants {
            output.push_str(&format!(
                "{}: {} of {} correct\n{} errors\n{}\n\n",
                variant.variant.name(),
                variant.result.correct,
                variant.result.total,
                variant.result.errors,
                format_accuracy(variant.accuracy)
            ));
        }

        if !report.tag_distribution.is_empty() {
            output.push_str("Tag distribution\n----------------\n");
            output.push_str(&format_distribution(&report.tag_distribution));
        }

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// One `"tag": share,` line per canonical tag
pub fn format_distribution(shares: &[TagShare]) -> String {
    shares
        .iter()
        .map(|s| format!("\"{}\": {},\n", s.tag, s.share))
        .collect()
}

fn format_accuracy(accuracy: Option<f64>) -> String {
    match accuracy {
        Some(accuracy) => format!("{:.3}", accuracy),
        None => "n/a (nothing scored)".to_string(),
    }
}
