use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::io::{ExperimentReport, HumanReport, TagShare, TrainingSummary, VariantReport};
use crate::models::{Corpus, TagSet};

use super::{evaluate, train_family, BackoffPredictor, EvaluationConfig, ModelVariant, DEFAULT_TAG};

/// Configuration for a training and evaluation run
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Tag predicted when no model has an answer
    pub default_tag: String,
    /// Variants to evaluate, in report order
    pub variants: Vec<ModelVariant>,
    pub evaluation: EvaluationConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            default_tag: DEFAULT_TAG.to_string(),
            variants: ModelVariant::ALL.to_vec(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

/// Train the model family on `train` and score each variant on `test`
pub fn run_experiment(train: &Corpus, test: &Corpus, tags: &TagSet, config: &ExperimentConfig) -> ExperimentReport {
    let family = train_family(train, tags);

    let training = family
        .models()
        .map(|model| TrainingSummary {
            model: model.spec.name().to_string(),
            spec: model.spec,
            stats: model.stats,
            contexts: model.frequencies.context_count(),
        })
        .collect();

    let variants = config
        .variants
        .iter()
        .map(|&variant| {
            let predictor = BackoffPredictor::for_variant(&family, variant, tags, config.default_tag.as_str());
            let result = evaluate(test, &predictor, tags, &config.evaluation);
            info!(
                "{}: {} of {} correct, {} errors",
                variant.name(),
                result.correct,
                result.total,
                result.errors
            );
            VariantReport::new(variant, result)
        })
        .collect();

    let tag_distribution = train
        .tag_distribution(tags)
        .into_iter()
        .map(|(tag, share)| TagShare { tag, share })
        .collect();

    ExperimentReport {
        generated_at: Utc::now(),
        train_conversations: train.conversations.len(),
        train_utterances: train.utterance_count(),
        test_conversations: test.conversations.len(),
        test_utterances: test.utterance_count(),
        training,
        variants,
        tag_distribution,
    }
}

/// Paths written by [`write_report`]
#[derive(Debug, Default)]
pub struct ReportPaths {
    pub json_path: Option<PathBuf>,
    pub human_path: Option<PathBuf>,
}

/// Write the report as JSON and/or text
pub fn write_report(
    report: &ExperimentReport,
    json_output: Option<&Path>,
    human_output: Option<&Path>,
) -> Result<ReportPaths> {
    let mut paths = ReportPaths::default();

    if let Some(path) = json_output {
        info!("Writing JSON report to {:?}", path);
        report.write_json(path)?;
        paths.json_path = Some(path.to_path_buf());
    }

    if let Some(path) = human_output {
        info!("Writing text report to {:?}", path);
        HumanReport::new(report).write_file(path)?;
        paths.human_path = Some(path.to_path_buf());
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Conversation;

    const S: &str = "Statement-non-opinion";
    const Q: &str = "Yes-No-Question";
    const A: &str = "Yes-Answer";

    fn corpus() -> Corpus {
        Corpus::new(vec![
            Conversation::from_acts(None, &[S, S, Q, A, S, S, Q, A, S, S]),
            Conversation::from_acts(None, &[S, Q, A, S, Q, A, S, S, Q, A]),
        ])
    }

    #[test]
    fn test_run_experiment() {
        let tags = TagSet::new([S, Q, A]);
        let train = corpus();
        let test = Corpus::new(vec![Conversation::from_acts(None, &[S, S, Q, A, S, Q, A, S])]);

        let report = run_experiment(&train, &test, &tags, &ExperimentConfig::default());

        assert_eq!(report.training.len(), 5);
        assert_eq!(report.variants.len(), 5);
        assert_eq!(report.train_utterances, 20);
        assert_eq!(report.test_conversations, 1);
        for variant in &report.variants {
            // Ordinals 3..=6 are scored
            assert_eq!(variant.result.total, 4);
            assert_eq!(variant.result.errors, 0);
        }
        // Q is always answered with A and A always followed by S
        let unigram = &report.variants[0];
        assert_eq!(unigram.variant, ModelVariant::UniGram);
        assert!(unigram.result.correct >= 3);
        assert_eq!(report.tag_distribution.len(), 3);
        let total_share: f64 = report.tag_distribution.iter().map(|t| t.share).sum();
        assert!((total_share - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_test_corpus_has_no_accuracy() {
        let tags = TagSet::new([S, Q, A]);
        let report = run_experiment(&corpus(), &Corpus::default(), &tags, &ExperimentConfig::default());

        assert!(report.variants.iter().all(|v| v.accuracy.is_none()));
    }

    #[test]
    fn test_write_report() {
        let tags = TagSet::new([S, Q, A]);
        let report = run_experiment(&corpus(), &corpus(), &tags, &ExperimentConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("report.json");
        let text = dir.path().join("report.txt");

        let paths = write_report(&report, Some(&json), Some(&text)).unwrap();

        assert_eq!(paths.json_path.as_deref(), Some(json.as_path()));
        assert!(std::fs::read_to_string(&text).unwrap().contains("forwardTriGram:"));

        let none = write_report(&report, None, None).unwrap();
        assert!(none.json_path.is_none() && none.human_path.is_none());
    }
}
