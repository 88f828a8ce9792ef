use crate::error::{LiasseError, Result};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One ledger account's period totals, as delivered by the import layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BalanceEntry {
    #[schemars(description = "Hierarchical SYSCOHADA account code (e.g. '4111'). Whitespace is trimmed on load.")]
    pub account_code: String,

    #[schemars(description = "Account label as it appears in the general ledger")]
    pub label: String,

    #[schemars(description = "Total debit for the period, in FCFA. Must be finite and non-negative.")]
    pub debit: f64,

    #[schemars(description = "Total credit for the period, in FCFA. Must be finite and non-negative.")]
    pub credit: f64,
}

impl BalanceEntry {
    pub fn new(account_code: impl Into<String>, label: impl Into<String>, debit: f64, credit: f64) -> Self {
        Self {
            account_code: account_code.into(),
            label: label.into(),
            debit,
            credit,
        }
    }

    /// Debit-positive net balance: positive = debtor, negative = creditor.
    pub fn net(&self) -> f64 {
        self.debit - self.credit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum StatementFamily {
    Actif,
    Passif,
    Charges,
    Produits,
}

impl StatementFamily {
    pub const ALL: [StatementFamily; 4] = [
        StatementFamily::Actif,
        StatementFamily::Passif,
        StatementFamily::Charges,
        StatementFamily::Produits,
    ];

    /// Filter applied to the family's ordinary lines.
    pub fn default_filter(self) -> SignFilter {
        match self {
            StatementFamily::Actif | StatementFamily::Charges => SignFilter::PositiveOnly,
            StatementFamily::Passif | StatementFamily::Produits => SignFilter::NegativeOnlyAbs,
        }
    }

    /// Credit-side families read signed nets with the sign flipped.
    pub fn is_credit_side(self) -> bool {
        matches!(self, StatementFamily::Passif | StatementFamily::Produits)
    }
}

impl fmt::Display for StatementFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementFamily::Actif => "actif",
            StatementFamily::Passif => "passif",
            StatementFamily::Charges => "charges",
            StatementFamily::Produits => "produits",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for StatementFamily {
    type Err = LiasseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "actif" | "asset" | "assets" => Ok(StatementFamily::Actif),
            "passif" | "liability" | "liabilities" => Ok(StatementFamily::Passif),
            "charges" | "charge" => Ok(StatementFamily::Charges),
            "produits" | "produit" | "product" | "products" => Ok(StatementFamily::Produits),
            _ => Err(LiasseError::UnknownFamily(s.to_string())),
        }
    }
}

/// Which part of an account's net balance a query keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignFilter {
    /// Signed net, debit-positive. Used for variation lines.
    Any,
    /// Debtor balances only.
    PositiveOnly,
    /// Absolute value of creditor balances only.
    NegativeOnlyAbs,
}

impl SignFilter {
    pub fn apply(self, net: f64) -> f64 {
        match self {
            SignFilter::Any => net,
            SignFilter::PositiveOnly if net > 0.0 => net,
            SignFilter::NegativeOnlyAbs if net < 0.0 => -net,
            _ => 0.0,
        }
    }

    pub fn opposite(self) -> SignFilter {
        match self {
            SignFilter::Any => SignFilter::Any,
            SignFilter::PositiveOnly => SignFilter::NegativeOnlyAbs,
            SignFilter::NegativeOnlyAbs => SignFilter::PositiveOnly,
        }
    }
}

/// Per-rule metadata driving sign-filter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "nature", rename_all = "snake_case")]
pub enum LineNature {
    /// One-sided magnitude with the family's default filter.
    Standard,
    /// Signed delta (stock movements, capital non appelé, report à nouveau).
    Variation,
    /// Signed net of a whole account family, so sub-accounts carried with the
    /// opposite sign (rabais, remises et ristournes, prélèvements de
    /// l'exploitant) reduce the line instead of dropping out of it.
    Net,
    /// Accounts structurally on the other side of the balance sheet, taken
    /// here only when their balance has the opposite sign.
    Reciprocal { counterpart: &'static str },
    /// Signed balance of the result account plus the unclosed period result.
    NetResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccountMappingRule {
    pub reference_code: &'static str,
    pub label: &'static str,
    pub account_prefixes: &'static [&'static str],
    pub contra_prefixes: &'static [&'static str],
    #[serde(flatten)]
    pub nature: LineNature,
}

impl AccountMappingRule {
    pub fn is_variation(&self) -> bool {
        self.nature == LineNature::Variation
    }

    pub fn is_reciprocal(&self) -> bool {
        matches!(self.nature, LineNature::Reciprocal { .. })
    }
}

/// Generated balance-sheet asset row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetLine {
    pub reference_code: String,
    pub label: String,
    pub gross: f64,
    pub contra: f64,
    pub net: f64,
}

/// Generated liability, charge or product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountLine {
    pub reference_code: String,
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToleranceConfig {
    #[schemars(description = "Absolute tolerance in the trial balance currency unit (FCFA). Deviations up to and including this amount are CONFORME.")]
    #[serde(default = "default_absolute_tolerance")]
    pub absolute: f64,

    #[schemars(description = "Deviations above absolute * critical_multiplier are classified ERREUR instead of ECART. Must be >= 1.")]
    #[serde(default = "default_critical_multiplier")]
    pub critical_multiplier: f64,
}

fn default_absolute_tolerance() -> f64 {
    1.0
}

fn default_critical_multiplier() -> f64 {
    10.0
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            absolute: default_absolute_tolerance(),
            critical_multiplier: default_critical_multiplier(),
        }
    }
}

impl ToleranceConfig {
    pub fn new(absolute: f64, critical_multiplier: f64) -> Self {
        Self {
            absolute,
            critical_multiplier,
        }
    }

    pub fn critical(&self) -> f64 {
        self.absolute * self.critical_multiplier
    }

    pub fn validate(&self) -> Result<()> {
        if !self.absolute.is_finite() || self.absolute < 0.0 {
            return Err(LiasseError::InvalidTolerance(format!(
                "absolute tolerance must be finite and non-negative, got {}",
                self.absolute
            )));
        }
        if !self.critical_multiplier.is_finite() || self.critical_multiplier < 1.0 {
            return Err(LiasseError::InvalidTolerance(format!(
                "critical multiplier must be finite and >= 1, got {}",
                self.critical_multiplier
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExercisePeriod {
    #[schemars(description = "First day of the exercise, YYYY-MM-DD")]
    pub start: NaiveDate,

    #[schemars(description = "Closing date of the exercise, YYYY-MM-DD")]
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LiasseConfig {
    #[schemars(description = "Legal name of the reporting entity")]
    pub organization_name: String,

    #[serde(default)]
    #[schemars(description = "Exercise covered by the trial balance. Optional; used for report headers.")]
    pub exercise: Option<ExercisePeriod>,

    #[serde(default)]
    #[schemars(description = "Tolerance applied to every coherence check unless overridden")]
    pub tolerance: ToleranceConfig,

    #[serde(default)]
    #[schemars(description = "Per-check tolerance overrides keyed by check id (e.g. 'BIL-01')")]
    pub tolerance_overrides: BTreeMap<String, ToleranceConfig>,
}

impl LiasseConfig {
    pub fn new(organization_name: impl Into<String>) -> Self {
        Self {
            organization_name: organization_name.into(),
            exercise: None,
            tolerance: ToleranceConfig::default(),
            tolerance_overrides: BTreeMap::new(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: ToleranceConfig) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_exercise(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.exercise = Some(ExercisePeriod { start, end });
        self
    }

    pub fn tolerance_for(&self, check_id: &str) -> ToleranceConfig {
        self.tolerance_overrides
            .get(check_id)
            .copied()
            .unwrap_or(self.tolerance)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.tolerance.validate()?;
        for (check_id, tolerance) in &self.tolerance_overrides {
            if let Err(LiasseError::InvalidTolerance(details)) = tolerance.validate() {
                return Err(LiasseError::InvalidTolerance(format!(
                    "override for {}: {}",
                    check_id, details
                )));
            }
        }
        if let Some(exercise) = &self.exercise {
            crate::utils::validate_exercise_period(exercise)?;
        }
        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(LiasseConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// Totals declared in the supporting schedules of the liasse.
/// Only the notes that are supplied are cross-checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NotesAnnexes {
    #[serde(default)]
    #[schemars(description = "Note 3: total gross value of fixed assets (incorporelles, corporelles, financières)")]
    pub note3_immobilisations_brutes: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Note 6: net value of stocks and work in progress")]
    pub note6_stocks: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Note 7: net value of customer receivables")]
    pub note7_clients: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Note 11: net treasury assets (titres de placement, valeurs à encaisser, banques et caisse)")]
    pub note11_tresorerie_actif: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Note 14: share capital")]
    pub note14_capital: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Note 17: trade payables")]
    pub note17_fournisseurs: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Note 21: turnover (chiffre d'affaires)")]
    pub note21_chiffre_affaires: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Note 27: personnel charges")]
    pub note27_charges_personnel: Option<f64>,
}

impl NotesAnnexes {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(NotesAnnexes)
    }
}
