//! # SYSCOHADA Liasse
//!
//! A library for deriving the SYSCOHADA révisé 2017 financial statements from a
//! trial balance and cross-checking them for coherence.
//!
//! ## Core Concepts
//!
//! - **Mapping Table**: static rules tying each statement reference code (AE, CA, RA...)
//!   to chart-of-accounts prefixes, with per-rule sign metadata
//! - **Balance Aggregator**: net-balance index answering `sum(prefixes, filter)` queries
//! - **Statements**: bilan actif/passif, compte de résultat, SIG cascade, TFT
//! - **Coherence Report**: cross-statement and statement-vs-notes checks, each
//!   CONFORME, ECART or ERREUR, with a 0-100 score
//!
//! ## Example
//!
//! ```rust,ignore
//! use syscohada_liasse::*;
//!
//! let config = LiasseConfig::new("SOTRA SA");
//! let entries = vec![
//!     BalanceEntry::new("101", "Capital social", 0.0, 100.0),
//!     BalanceEntry::new("5211", "Banque", 100.0, 0.0),
//! ];
//!
//! let liasse = process_liasse(&config, &entries, &NotesAnnexes::default()).unwrap();
//! assert_eq!(liasse.report.score, Some(100));
//! println!("{}", liasse.report.to_markdown());
//! ```

pub mod aggregator;
pub mod balance_sheet;
pub mod cash_flow;
pub mod coherence;
pub mod error;
pub mod income_statement;
pub mod ingestion;
pub mod mapping;
pub mod report;
pub mod schema;
pub mod sig;
pub mod utils;

pub use aggregator::{BalanceAggregator, TrialBalanceSummary, UnplacedAccount};
pub use balance_sheet::{generate_assets, generate_liabilities, AssetStatement, LiabilityStatement, SubtotalLine};
pub use cash_flow::{generate_cash_flow, net_treasury, CashFlowStatement, WorkingCapitalFlows};
pub use coherence::{
    classify, standard_checks, CheckDefinition, CheckFamily, CheckStatus, CoherenceCheck, CoherenceChecker,
    StatementSet, ValidationReport,
};
pub use error::{LiasseError, Result};
pub use income_statement::{generate_income_statement, IncomeStatement};
pub use ingestion::*;
pub use mapping::{MappingTable, SubtotalDefinition, FRAMEWORK_SYSCOHADA_2017};
pub use schema::*;
pub use sig::{generate_sig, SigCascade, SigSubtotal, SigTerm, SIG_FORMULAS};
pub use utils::*;

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Every statement of one run together with its coherence report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liasse {
    pub framework: String,
    pub balance_summary: TrialBalanceSummary,
    pub actif: AssetStatement,
    pub passif: LiabilityStatement,
    pub compte_resultat: IncomeStatement,
    pub sig: SigCascade,
    pub tft: CashFlowStatement,
    pub unplaced_accounts: Vec<UnplacedAccount>,
    pub report: ValidationReport,
}

impl Liasse {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct LiasseProcessor;

impl LiasseProcessor {
    pub fn process(config: &LiasseConfig, entries: &[BalanceEntry], notes: &NotesAnnexes) -> Result<Liasse> {
        let table = Self::prepare(config)?;
        let aggregator = BalanceAggregator::load(entries)?;

        Ok(Self::generate(config, &table, &aggregator, None, notes))
    }

    /// Same as [`LiasseProcessor::process`], with the balance d'ouverture so
    /// the TFT can derive working-capital and treasury variations.
    pub fn process_with_opening(
        config: &LiasseConfig,
        entries: &[BalanceEntry],
        opening_entries: &[BalanceEntry],
        notes: &NotesAnnexes,
    ) -> Result<Liasse> {
        let table = Self::prepare(config)?;
        let aggregator = BalanceAggregator::load(entries)?;
        let opening = BalanceAggregator::load(opening_entries)?;

        Ok(Self::generate(config, &table, &aggregator, Some(&opening), notes))
    }

    /// Runs every generator and the checker over an already loaded
    /// aggregator. Pure: the same inputs give the same `Liasse`.
    pub fn generate(
        config: &LiasseConfig,
        table: &MappingTable,
        aggregator: &BalanceAggregator,
        opening: Option<&BalanceAggregator>,
        notes: &NotesAnnexes,
    ) -> Liasse {
        let balance_summary = aggregator.summary();
        let actif = generate_assets(aggregator, table);
        let passif = generate_liabilities(aggregator, table);
        let compte_resultat = generate_income_statement(aggregator, table);
        let sig = generate_sig(aggregator, table);
        let tft = generate_cash_flow(aggregator, table, opening);
        let unplaced_accounts = aggregator.unplaced_accounts(table);

        debug!(
            "Generated {} actif, {} passif, {} charges and {} produits lines; {} unplaced accounts",
            actif.lines.len(),
            passif.lines.len(),
            compte_resultat.charges.len(),
            compte_resultat.produits.len(),
            unplaced_accounts.len()
        );

        let report = CoherenceChecker::new(config, table.framework()).run(&StatementSet {
            summary: &balance_summary,
            actif: &actif,
            passif: &passif,
            compte_resultat: &compte_resultat,
            sig: &sig,
            tft: &tft,
            unplaced: &unplaced_accounts,
            notes,
        });

        info!(
            "Coherence report for {}: score {}, {} ecart(s), {} erreur(s)",
            config.organization_name,
            report
                .score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "n/a".to_string()),
            report.ecarts().len(),
            report.erreurs().len()
        );

        Liasse {
            framework: table.framework().to_string(),
            balance_summary,
            actif,
            passif,
            compte_resultat,
            sig,
            tft,
            unplaced_accounts,
            report,
        }
    }

    fn prepare(config: &LiasseConfig) -> Result<MappingTable> {
        config.validate()?;

        let table = MappingTable::syscohada_2017();
        table.ensure_valid()?;

        info!(
            "Processing liasse for organization: {} ({})",
            config.organization_name,
            table.framework()
        );

        Ok(table)
    }
}

pub fn process_liasse(config: &LiasseConfig, entries: &[BalanceEntry], notes: &NotesAnnexes) -> Result<Liasse> {
    LiasseProcessor::process(config, entries, notes)
}

pub fn process_liasse_with_opening(
    config: &LiasseConfig,
    entries: &[BalanceEntry],
    opening_entries: &[BalanceEntry],
    notes: &NotesAnnexes,
) -> Result<Liasse> {
    LiasseProcessor::process_with_opening(config, entries, opening_entries, notes)
}
