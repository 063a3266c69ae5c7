use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::schema::{FeatureId, FeatureKind, FEATURES, FEATURE_COUNT, TIMESTAMP_FORMAT};

// ============ Input Models ============

/// Borrower attributes captured by the form.
///
/// Missing fields take the form's initial values, so a partial JSON body or
/// an empty form submit still yields a complete record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BorrowerRecord {
    /// Age in years, 18 to 100.
    pub age: i64,
    /// Monthly income, 0 to 100000.
    pub income: f64,
    /// Requested loan amount, 0 to 50000.
    pub loan_amount: f64,
    /// Credit bureau score, 0 to 1000.
    pub credit_score: i64,
    /// Number of dependents, 0 to 10.
    pub num_dependents: i64,
    /// Years at current employment, 0 to 40.
    pub employment_time: i64,
    /// Debt-to-income ratio, 0 to 1.
    pub debt_ratio: f64,
    /// 1 if the borrower defaulted before.
    pub default_history: i64,
    /// Account balance, 0 to 100000.
    pub balance: f64,
    /// Number of transactions, 0 to 500.
    pub transactions: i64,
    /// Region code (0, 1, 2).
    pub region: i64,
    /// Gender code (0, 1).
    pub gender: i64,
    /// Marital status code (0, 1, 2).
    pub marital_status: i64,
    /// Education code (0, 1, 2).
    pub education: i64,
}

impl Default for BorrowerRecord {
    fn default() -> Self {
        Self {
            age: 30,
            income: 3000.0,
            loan_amount: 5000.0,
            credit_score: 600,
            num_dependents: 1,
            employment_time: 5,
            debt_ratio: 0.3,
            default_history: 0,
            balance: 2000.0,
            transactions: 20,
            region: 0,
            gender: 0,
            marital_status: 0,
            education: 0,
        }
    }
}

/// A single cell of the model input, keeping integer columns integral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
}

impl FeatureValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FeatureValue::Int(v) => v as f64,
            FeatureValue::Float(v) => v,
        }
    }

    /// Text written to the history file and the "Dados informados" table.
    ///
    /// Floats always carry a decimal point (`3000.0`).
    pub fn to_cell(self) -> String {
        match self {
            FeatureValue::Int(v) => v.to_string(),
            FeatureValue::Float(v) if v.is_finite() && v.fract() == 0.0 => format!("{:.1}", v),
            FeatureValue::Float(v) => v.to_string(),
        }
    }
}

impl BorrowerRecord {
    /// Value of a single attribute.
    pub fn value(&self, id: FeatureId) -> FeatureValue {
        match id {
            FeatureId::Age => FeatureValue::Int(self.age),
            FeatureId::Income => FeatureValue::Float(self.income),
            FeatureId::LoanAmount => FeatureValue::Float(self.loan_amount),
            FeatureId::CreditScore => FeatureValue::Int(self.credit_score),
            FeatureId::NumDependents => FeatureValue::Int(self.num_dependents),
            FeatureId::EmploymentTime => FeatureValue::Int(self.employment_time),
            FeatureId::DebtRatio => FeatureValue::Float(self.debt_ratio),
            FeatureId::DefaultHistory => FeatureValue::Int(self.default_history),
            FeatureId::Balance => FeatureValue::Float(self.balance),
            FeatureId::Transactions => FeatureValue::Int(self.transactions),
            FeatureId::Region => FeatureValue::Int(self.region),
            FeatureId::Gender => FeatureValue::Int(self.gender),
            FeatureId::MaritalStatus => FeatureValue::Int(self.marital_status),
            FeatureId::Education => FeatureValue::Int(self.education),
        }
    }

    /// All attributes in training order.
    pub fn values(&self) -> [FeatureValue; FEATURE_COUNT] {
        FEATURES.map(|f| self.value(f.id))
    }

    /// The single-row model input, in training order.
    pub fn feature_vector(&self) -> [f64; FEATURE_COUNT] {
        self.values().map(FeatureValue::as_f64)
    }

    /// Checks every attribute against its control's bounds.
    pub fn check_domain(&self) -> Result<(), AppError> {
        for spec in FEATURES.iter() {
            let value = self.value(spec.id).as_f64();
            if !spec.accepts(value) {
                let allowed = match spec.kind {
                    FeatureKind::Categorical => format!("one of {:?}", spec.options()),
                    FeatureKind::Integer | FeatureKind::Float => {
                        format!("between {} and {}", spec.min, spec.max)
                    }
                };
                return Err(AppError::BadRequest(format!(
                    "{} must be {} (got {})",
                    spec.name, allowed, value
                )));
            }
        }
        Ok(())
    }
}

// ============ Risk Tier ============

/// Discretized default risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Message shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Risco baixo de inadimplência",
            RiskTier::Medium => "Risco médio de inadimplência",
            RiskTier::High => "Risco alto de inadimplência",
        }
    }

    /// CSS class of the result banner.
    pub fn style(self) -> &'static str {
        match self {
            RiskTier::Low => "success",
            RiskTier::Medium => "warning",
            RiskTier::High => "error",
        }
    }
}

// ============ History ============

/// One row of the prediction history file.
#[derive(Debug, Clone)]
pub struct PredictionLogEntry {
    pub record: BorrowerRecord,
    /// Probability of default, 0 to 1.
    pub probability: f64,
    /// Local wall-clock time of the prediction.
    pub prediction_timestamp: DateTime<Local>,
}

impl PredictionLogEntry {
    pub fn new(record: BorrowerRecord, probability: f64, at: DateTime<Local>) -> Self {
        Self {
            record,
            probability,
            prediction_timestamp: at,
        }
    }

    /// Timestamp as written to the file (`YYYY-MM-DD HH:MM:SS`).
    pub fn timestamp_text(&self) -> String {
        self.prediction_timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Cells in header order: the record, the probability, the timestamp.
    pub fn to_row(&self) -> Vec<String> {
        let mut row: Vec<String> = self
            .record
            .values()
            .iter()
            .map(|v| v.to_cell())
            .collect();
        row.push(self.probability.to_string());
        row.push(self.timestamp_text());
        row
    }
}

// ============ API Response Models ============

/// Result of a prediction request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    /// The record that was scored.
    pub record: BorrowerRecord,
    /// Probability of default, 0 to 1.
    pub probability: f64,
    /// Probability formatted as a percentage with two decimals.
    pub probability_percent: String,
    pub tier: RiskTier,
    /// Human-readable tier message.
    pub tier_label: String,
    /// Whether the prediction was appended to the history file.
    pub logged: bool,
    /// Reason the history append failed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_error: Option<String>,
    /// Prediction time (`YYYY-MM-DD HH:MM:SS`).
    pub timestamp: String,
}

/// Health check payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub model_path: String,
    /// SHA-256 of the loaded artifact (hex).
    pub model_sha256: String,
    pub feature_count: usize,
}

/// Formats a probability as a percentage with two decimals.
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}
