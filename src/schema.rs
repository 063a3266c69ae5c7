//! Ordered feature schema shared by the form, the classifier adapter and the
//! prediction history.
//!
//! The classifier was trained on these fourteen columns in exactly this
//! order. Everything that needs a field list (form controls, feature vector,
//! domain checks, CSV header, artifact check) walks [`FEATURES`] instead of
//! spelling the fields out again.

use serde::Serialize;

/// Number of model input features.
pub const FEATURE_COUNT: usize = 14;

/// Extra CSV column holding the predicted probability.
pub const PROBABILITY_COLUMN: &str = "probabilidade";

/// Extra CSV column holding the local prediction timestamp.
pub const TIMESTAMP_COLUMN: &str = "data_previsao";

/// Timestamp format used in the history file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identifies one borrower attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureId {
    Age,
    Income,
    LoanAmount,
    CreditScore,
    NumDependents,
    EmploymentTime,
    DebtRatio,
    DefaultHistory,
    Balance,
    Transactions,
    Region,
    Gender,
    MaritalStatus,
    Education,
}

/// How a feature is captured and written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Whole number input.
    Integer,
    /// Decimal number input.
    Float,
    /// Small set of integer codes, rendered as a select.
    Categorical,
}

/// Which visual group of the form a control belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormGroup {
    Primary,
    Secondary,
}

/// One column of the model input.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeatureSpec {
    #[serde(skip)]
    pub id: FeatureId,
    /// Column name as seen by the model and the history file.
    pub name: &'static str,
    /// Label shown next to the form control.
    pub label: &'static str,
    pub kind: FeatureKind,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub group: FormGroup,
}

impl FeatureSpec {
    /// Returns true if `value` lies within the control's bounds.
    ///
    /// Categorical codes must also be whole numbers.
    pub fn accepts(&self, value: f64) -> bool {
        if !value.is_finite() || value < self.min || value > self.max {
            return false;
        }
        match self.kind {
            FeatureKind::Float => true,
            FeatureKind::Integer | FeatureKind::Categorical => value.fract() == 0.0,
        }
    }

    /// Codes offered by a categorical control.
    pub fn options(&self) -> Vec<i64> {
        match self.kind {
            FeatureKind::Categorical => (self.min as i64..=self.max as i64).collect(),
            _ => Vec::new(),
        }
    }

    /// Input step for numeric controls.
    pub fn step(&self) -> &'static str {
        match self.kind {
            FeatureKind::Float => "0.01",
            FeatureKind::Integer | FeatureKind::Categorical => "1",
        }
    }
}

const fn spec(
    id: FeatureId,
    name: &'static str,
    label: &'static str,
    kind: FeatureKind,
    bounds: (f64, f64),
    default: f64,
    group: FormGroup,
) -> FeatureSpec {
    FeatureSpec {
        id,
        name,
        label,
        kind,
        min: bounds.0,
        max: bounds.1,
        default,
        group,
    }
}

/// The model input schema, in training order.
pub static FEATURES: [FeatureSpec; FEATURE_COUNT] = [
    spec(FeatureId::Age, "age", "Idade", FeatureKind::Integer, (18.0, 100.0), 30.0, FormGroup::Primary),
    spec(FeatureId::Income, "income", "Renda", FeatureKind::Float, (0.0, 100_000.0), 3000.0, FormGroup::Primary),
    spec(FeatureId::LoanAmount, "loan_amount", "Valor do empréstimo", FeatureKind::Float, (0.0, 50_000.0), 5000.0, FormGroup::Primary),
    spec(FeatureId::CreditScore, "credit_score", "Score crédito", FeatureKind::Integer, (0.0, 1000.0), 600.0, FormGroup::Primary),
    spec(FeatureId::NumDependents, "num_dependents", "Dependentes", FeatureKind::Integer, (0.0, 10.0), 1.0, FormGroup::Primary),
    spec(FeatureId::EmploymentTime, "employment_time", "Tempo de emprego (anos)", FeatureKind::Integer, (0.0, 40.0), 5.0, FormGroup::Primary),
    spec(FeatureId::DebtRatio, "debt_ratio", "Debt ratio", FeatureKind::Float, (0.0, 1.0), 0.3, FormGroup::Secondary),
    spec(FeatureId::DefaultHistory, "default_history", "Histórico de inadimplência", FeatureKind::Categorical, (0.0, 1.0), 0.0, FormGroup::Secondary),
    spec(FeatureId::Balance, "balance", "Saldo", FeatureKind::Float, (0.0, 100_000.0), 2000.0, FormGroup::Secondary),
    spec(FeatureId::Transactions, "transactions", "Transações", FeatureKind::Integer, (0.0, 500.0), 20.0, FormGroup::Secondary),
    spec(FeatureId::Region, "region", "Região", FeatureKind::Categorical, (0.0, 2.0), 0.0, FormGroup::Secondary),
    spec(FeatureId::Gender, "gender", "Sexo", FeatureKind::Categorical, (0.0, 1.0), 0.0, FormGroup::Secondary),
    spec(FeatureId::MaritalStatus, "marital_status", "Estado civil", FeatureKind::Categorical, (0.0, 2.0), 0.0, FormGroup::Secondary),
    spec(FeatureId::Education, "education", "Educação", FeatureKind::Categorical, (0.0, 2.0), 0.0, FormGroup::Secondary),
];

/// Feature names in training order.
pub fn feature_names() -> impl Iterator<Item = &'static str> {
    FEATURES.iter().map(|f| f.name)
}

/// Header row of the prediction history file.
pub fn history_header() -> Vec<&'static str> {
    feature_names()
        .chain([PROBABILITY_COLUMN, TIMESTAMP_COLUMN])
        .collect()
}
