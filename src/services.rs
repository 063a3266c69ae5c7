use chrono::{DateTime, Local};

use crate::classifier::Classifier;
use crate::errors::{AppError, ResultExt};
use crate::history::HistoryLogger;
use crate::models::{
    format_percent, BorrowerRecord, PredictionLogEntry, PredictionResponse, RiskTier,
};
use crate::risk::tier;
use crate::schema::TIMESTAMP_FORMAT;

/// Warning shown when the income guard rejects a submit.
pub const INCOME_WARNING: &str = "A renda deve ser maior que zero.";

/// Whether the prediction made it into the history file.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryStatus {
    Recorded,
    Failed(String),
}

/// Everything produced by one prediction.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub record: BorrowerRecord,
    pub probability: f64,
    pub tier: RiskTier,
    pub timestamp: DateTime<Local>,
    pub history: HistoryStatus,
}

impl PredictionOutcome {
    pub fn to_response(&self) -> PredictionResponse {
        let (logged, log_error) = match &self.history {
            HistoryStatus::Recorded => (true, None),
            HistoryStatus::Failed(msg) => (false, Some(msg.clone())),
        };
        PredictionResponse {
            record: self.record,
            probability: self.probability,
            probability_percent: format_percent(self.probability),
            tier: self.tier,
            tier_label: self.tier.label().to_string(),
            logged,
            log_error,
            timestamp: self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Runs the scoring pipeline: guard, classify, tier, log.
pub struct PredictionService<'a> {
    classifier: &'a dyn Classifier,
    history: &'a HistoryLogger,
}

impl<'a> PredictionService<'a> {
    pub fn new(classifier: &'a dyn Classifier, history: &'a HistoryLogger) -> Self {
        Self {
            classifier,
            history,
        }
    }

    /// Scores one record and appends it to the history.
    ///
    /// Out-of-domain values yield `BadRequest`. A non-positive income yields
    /// `Validation` without touching the classifier or the history file. A
    /// failed append does not discard the score; it is reported through
    /// [`PredictionOutcome::history`].
    pub fn predict(&self, record: BorrowerRecord) -> Result<PredictionOutcome, AppError> {
        record.check_domain()?;

        if record.income <= 0.0 {
            return Err(AppError::Validation(INCOME_WARNING.to_string()));
        }

        let probability = self
            .classifier
            .predict_proba(&record)
            .context("classifier rejected the record")?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(AppError::Inference(format!(
                "probability {} outside [0, 1]",
                probability
            )));
        }

        let tier = tier(probability);
        let timestamp = Local::now();
        tracing::info!(
            "Prediction: p={:.4} tier={:?} income={} loan_amount={}",
            probability,
            tier,
            record.income,
            record.loan_amount
        );

        let entry = PredictionLogEntry::new(record, probability, timestamp);
        let history = match self.history.append(&entry) {
            Ok(()) => HistoryStatus::Recorded,
            Err(e) => {
                tracing::error!(
                    "Failed to append prediction to {}: {}",
                    self.history.path().display(),
                    e
                );
                HistoryStatus::Failed(e.to_string())
            }
        };

        Ok(PredictionOutcome {
            record,
            probability,
            tier,
            timestamp,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStub {
        probability: f64,
        calls: AtomicUsize,
    }

    impl Classifier for CountingStub {
        fn predict_proba(&self, _record: &BorrowerRecord) -> Result<f64, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.probability)
        }
    }

    fn stub(probability: f64) -> CountingStub {
        CountingStub {
            probability,
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_zero_income_skips_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryLogger::new(dir.path().join("h.csv"));
        let classifier = stub(0.9);
        let service = PredictionService::new(&classifier, &history);

        let record = BorrowerRecord {
            income: 0.0,
            ..BorrowerRecord::default()
        };
        let err = service.predict(record).unwrap_err();

        assert!(err.is_warning());
        assert_eq!(err.to_string(), INCOME_WARNING);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
        assert!(!history.path().exists());
    }

    #[test]
    fn test_out_of_domain_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryLogger::new(dir.path().join("h.csv"));
        let classifier = stub(0.1);
        let service = PredictionService::new(&classifier, &history);

        let record = BorrowerRecord {
            age: 12,
            ..BorrowerRecord::default()
        };
        assert!(matches!(
            service.predict(record),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_probability_outside_unit_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryLogger::new(dir.path().join("h.csv"));
        let classifier = stub(1.2);
        let service = PredictionService::new(&classifier, &history);

        let err = service.predict(BorrowerRecord::default()).unwrap_err();
        assert!(matches!(err, AppError::Inference(_)));
        assert!(!history.path().exists());
    }

    #[test]
    fn test_logging_failure_keeps_result() {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryLogger::new(dir.path().join("nope").join("h.csv"));
        let classifier = stub(0.65);
        let service = PredictionService::new(&classifier, &history);

        let outcome = service.predict(BorrowerRecord::default()).unwrap();
        assert_eq!(outcome.tier, RiskTier::High);
        assert!(matches!(outcome.history, HistoryStatus::Failed(_)));

        let response = outcome.to_response();
        assert!(!response.logged);
        assert!(response.log_error.is_some());
        assert_eq!(response.probability_percent, "65.00%");
    }
}
