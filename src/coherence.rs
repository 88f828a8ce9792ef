//! Cross-statement coherence checks.
//!
//! Every check reads two values from already generated statements, compares
//! them against a tolerance and ends in one of three statuses. Deviations are
//! reported, never raised as errors: the caller decides whether an `ERREUR`
//! blocks anything downstream.

use crate::aggregator::{TrialBalanceSummary, UnplacedAccount};
use crate::balance_sheet::{AssetStatement, LiabilityStatement, SubtotalLine};
use crate::cash_flow::CashFlowStatement;
use crate::income_statement::IncomeStatement;
use crate::mapping::{IMMOBILISATION_LINES, TRESORERIE_ACTIF_LINES, TRESORERIE_PASSIF_LINES};
use crate::schema::{ExercisePeriod, LiasseConfig, NotesAnnexes, ToleranceConfig};
use crate::sig::SigCascade;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Conforme,
    Ecart,
    Erreur,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckStatus::Conforme => "CONFORME",
            CheckStatus::Ecart => "ECART",
            CheckStatus::Erreur => "ERREUR",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckFamily {
    BalanceGenerale,
    Bilan,
    Resultat,
    Tresorerie,
    Sig,
    Couverture,
    Notes,
}

impl CheckFamily {
    pub fn recommendation(self) -> &'static str {
        match self {
            CheckFamily::BalanceGenerale => {
                "Vérifier l'import de la balance : le total des débits doit égaler le total des crédits. Rechercher les écritures déséquilibrées ou les comptes omis."
            }
            CheckFamily::Bilan => {
                "Contrôler l'affectation des comptes aux postes du bilan et les comptes à solde inversé (fournisseurs débiteurs, clients créditeurs, découverts)."
            }
            CheckFamily::Resultat => {
                "Rapprocher le résultat du compte de résultat, des SIG et du bilan : vérifier le compte 13 et les comptes de gestion non soldés."
            }
            CheckFamily::Tresorerie => {
                "Rapprocher la trésorerie du TFT des postes BQ, BR, BS, DQ et DR du bilan ; vérifier les comptes de trésorerie à solde créditeur."
            }
            CheckFamily::Sig => {
                "Recalculer la cascade des soldes intermédiaires de gestion : un solde ne respecte pas sa formule."
            }
            CheckFamily::Couverture => {
                "Des comptes soldés ne sont repris dans aucun poste des états financiers : compléter l'imputation ou corriger la codification."
            }
            CheckFamily::Notes => {
                "Mettre à jour la note annexe concernée ou corriger les postes des états financiers correspondants."
            }
        }
    }
}

impl fmt::Display for CheckFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckFamily::BalanceGenerale => "Balance générale",
            CheckFamily::Bilan => "Bilan",
            CheckFamily::Resultat => "Résultat",
            CheckFamily::Tresorerie => "Trésorerie",
            CheckFamily::Sig => "SIG",
            CheckFamily::Couverture => "Couverture du plan comptable",
            CheckFamily::Notes => "Notes annexes",
        };
        write!(f, "{}", name)
    }
}

/// The generated statements a check battery reads from.
#[derive(Debug, Clone, Copy)]
pub struct StatementSet<'a> {
    pub summary: &'a TrialBalanceSummary,
    pub actif: &'a AssetStatement,
    pub passif: &'a LiabilityStatement,
    pub compte_resultat: &'a IncomeStatement,
    pub sig: &'a SigCascade,
    pub tft: &'a CashFlowStatement,
    pub unplaced: &'a [UnplacedAccount],
    pub notes: &'a NotesAnnexes,
}

/// Reads one side of a check. `None` means the check does not apply.
pub type Extractor = fn(&StatementSet<'_>) -> Option<f64>;

/// A check before evaluation.
#[derive(Clone, Copy)]
pub struct CheckDefinition {
    pub id: &'static str,
    pub family: CheckFamily,
    pub description: &'static str,
    pub value_a: Extractor,
    pub value_b: Extractor,
    /// Algebraic identities ignore the configured tolerance.
    pub exact: bool,
}

impl CheckDefinition {
    pub fn new(
        id: &'static str,
        family: CheckFamily,
        description: &'static str,
        value_a: Extractor,
        value_b: Extractor,
    ) -> Self {
        Self {
            id,
            family,
            description,
            value_a,
            value_b,
            exact: false,
        }
    }

    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    /// Evaluates both sides; `None` when either side is not available.
    pub fn evaluate(&self, statements: &StatementSet<'_>, tolerance: ToleranceConfig) -> Option<CoherenceCheck> {
        let value_a = (self.value_a)(statements)?;
        let value_b = (self.value_b)(statements)?;
        let tolerance = if self.exact {
            ToleranceConfig::new(0.0, 1.0)
        } else {
            tolerance
        };

        let deviation = (value_a - value_b).abs();
        let status = classify(deviation, &tolerance);

        Some(CoherenceCheck {
            id: self.id.to_string(),
            family: self.family,
            description: self.description.to_string(),
            value_a,
            value_b,
            deviation,
            tolerance: tolerance.absolute,
            status,
            recommendation: (status != CheckStatus::Conforme).then(|| self.family.recommendation().to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceCheck {
    pub id: String,
    pub family: CheckFamily,
    pub description: String,
    pub value_a: f64,
    pub value_b: f64,
    pub deviation: f64,
    pub tolerance: f64,
    pub status: CheckStatus,
    pub recommendation: Option<String>,
}

/// Up to the tolerance is CONFORME, up to tolerance × multiplier is ECART,
/// anything beyond (or NaN) is ERREUR.
pub fn classify(deviation: f64, tolerance: &ToleranceConfig) -> CheckStatus {
    if deviation <= tolerance.absolute {
        CheckStatus::Conforme
    } else if deviation <= tolerance.critical() {
        CheckStatus::Ecart
    } else {
        CheckStatus::Erreur
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub framework: String,
    pub organization_name: String,
    pub exercise: Option<ExercisePeriod>,
    pub checks: Vec<CoherenceCheck>,
    /// Percentage of CONFORME checks, absent when no check applied.
    pub score: Option<u8>,
}

impl ValidationReport {
    pub fn check(&self, id: &str) -> Option<&CoherenceCheck> {
        self.checks.iter().find(|c| c.id == id)
    }

    pub fn with_status(&self, status: CheckStatus) -> Vec<&CoherenceCheck> {
        self.checks.iter().filter(|c| c.status == status).collect()
    }

    pub fn conformes(&self) -> Vec<&CoherenceCheck> {
        self.with_status(CheckStatus::Conforme)
    }

    pub fn ecarts(&self) -> Vec<&CoherenceCheck> {
        self.with_status(CheckStatus::Ecart)
    }

    pub fn erreurs(&self) -> Vec<&CoherenceCheck> {
        self.with_status(CheckStatus::Erreur)
    }

    pub fn has_errors(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Erreur)
    }
}

pub fn score(checks: &[CoherenceCheck]) -> Option<u8> {
    if checks.is_empty() {
        return None;
    }
    let conformes = checks.iter().filter(|c| c.status == CheckStatus::Conforme).count();
    Some((100.0 * conformes as f64 / checks.len() as f64).round() as u8)
}

pub struct CoherenceChecker<'a> {
    config: &'a LiasseConfig,
    framework: &'a str,
    definitions: Vec<CheckDefinition>,
}

impl<'a> CoherenceChecker<'a> {
    pub fn new(config: &'a LiasseConfig, framework: &'a str) -> Self {
        Self::with_definitions(config, framework, standard_checks())
    }

    pub fn with_definitions(config: &'a LiasseConfig, framework: &'a str, definitions: Vec<CheckDefinition>) -> Self {
        Self {
            config,
            framework,
            definitions,
        }
    }

    pub fn definitions(&self) -> &[CheckDefinition] {
        &self.definitions
    }

    pub fn run(&self, statements: &StatementSet<'_>) -> ValidationReport {
        let checks: Vec<CoherenceCheck> = self
            .definitions
            .iter()
            .filter_map(|definition| {
                let check = definition.evaluate(statements, self.config.tolerance_for(definition.id));
                match &check {
                    Some(c) => debug!(
                        "{} {}: A={} B={} deviation={} -> {}",
                        c.id, c.description, c.value_a, c.value_b, c.deviation, c.status
                    ),
                    None => debug!("{} skipped: no value to compare", definition.id),
                }
                check
            })
            .collect();

        ValidationReport {
            framework: self.framework.to_string(),
            organization_name: self.config.organization_name.clone(),
            exercise: self.config.exercise,
            score: score(&checks),
            checks,
        }
    }
}

fn tresorerie_bilan(s: &StatementSet<'_>) -> f64 {
    s.actif.net_of(TRESORERIE_ACTIF_LINES) - s.passif.amount_of(TRESORERIE_PASSIF_LINES)
}

/// CAFG by the EBE method: SIG4 plus the cash share of financial and HAO
/// items, less participation and income tax.
fn cafg_from_ebe(s: &StatementSet<'_>) -> f64 {
    let (sig, cr, tft) = (s.sig, s.compte_resultat, s.tft);
    let financial_income = sig.term(23) - cr.produit("TL");
    let financial_charges = sig.term(24) - cr.charge("RN");
    let hao_income = cr.produit("TO") - tft.hao_reprises;
    let hao_charges = cr.charge("RP") - tft.hao_dotations;

    sig.sig(4) + financial_income - financial_charges + hao_income - hao_charges - sig.term(27)
}

fn subtotal(lines: &[SubtotalLine], code: &str) -> f64 {
    lines
        .iter()
        .find(|l| l.reference_code == code)
        .map(|l| l.amount)
        .unwrap_or(0.0)
}

/// The built-in battery, in report order.
pub fn standard_checks() -> Vec<CheckDefinition> {
    use CheckFamily::*;

    vec![
        CheckDefinition::new(
            "BAL-01",
            BalanceGenerale,
            "Balance générale : total débit = total crédit",
            |s| Some(s.summary.total_debit),
            |s| Some(s.summary.total_credit),
        ),
        CheckDefinition::new(
            "BIL-01",
            Bilan,
            "Bilan : total actif net (BZ) = total passif (DZ)",
            |s| Some(subtotal(&s.actif.subtotals, "BZ")),
            |s| Some(subtotal(&s.passif.subtotals, "DZ")),
        ),
        CheckDefinition::new(
            "RES-01",
            Resultat,
            "Résultat net : SIG (XI) = compte de résultat (produits - charges)",
            |s| Some(s.sig.net_result()),
            |s| Some(s.compte_resultat.net_result()),
        ),
        CheckDefinition::new(
            "RES-02",
            Resultat,
            "Résultat net : SIG (XI) = bilan (CJ)",
            |s| Some(s.sig.net_result()),
            |s| Some(s.passif.net_result()),
        ),
        CheckDefinition::new(
            "RES-03",
            Resultat,
            "Résultat net : compte de résultat = bilan (CJ)",
            |s| Some(s.compte_resultat.net_result()),
            |s| Some(s.passif.net_result()),
        ),
        CheckDefinition::new(
            "TFT-01",
            Tresorerie,
            "Trésorerie nette de clôture : TFT (ZH) = bilan (BT - DT)",
            |s| Some(s.tft.closing_net_treasury),
            |s| Some(tresorerie_bilan(s)),
        ),
        CheckDefinition::new(
            "TFT-02",
            Tresorerie,
            "CAFG du TFT (FA) = CAFG reconstituée depuis l'EBE (XD)",
            |s| Some(s.tft.cafg),
            |s| Some(cafg_from_ebe(s)),
        ),
        CheckDefinition::new(
            "SIG-01",
            Sig,
            "SIG : nombre de soldes ne respectant pas leur formule",
            |s| Some(s.sig.verify_formulas().len() as f64),
            |_| Some(0.0),
        )
        .exact(),
        CheckDefinition::new(
            "SIG-02",
            Sig,
            "Chiffre d'affaires : SIG (XB) = compte de résultat (TA + TB + TC + TD)",
            |s| Some(s.sig.chiffre_affaires()),
            |s| {
                let cr = s.compte_resultat;
                Some(cr.produit("TA") + cr.produit("TB") + cr.produit("TC") + cr.produit("TD"))
            },
        ),
        CheckDefinition::new(
            "COU-01",
            Couverture,
            "Soldes non repris dans les états financiers",
            |s| Some(s.unplaced.iter().map(|a| a.net.abs()).fold(0.0, |acc, v| acc + v)),
            |_| Some(0.0),
        ),
        CheckDefinition::new(
            "NOTE-03",
            Notes,
            "Note 3 : immobilisations brutes = bilan (brut AE à AS)",
            |s| s.notes.note3_immobilisations_brutes,
            |s| Some(s.actif.gross_of(IMMOBILISATION_LINES)),
        ),
        CheckDefinition::new(
            "NOTE-06",
            Notes,
            "Note 6 : stocks = bilan (BB net)",
            |s| s.notes.note6_stocks,
            |s| Some(s.actif.net_of(&["BB"])),
        ),
        CheckDefinition::new(
            "NOTE-07",
            Notes,
            "Note 7 : clients = bilan (BI net)",
            |s| s.notes.note7_clients,
            |s| Some(s.actif.net_of(&["BI"])),
        ),
        CheckDefinition::new(
            "NOTE-11",
            Notes,
            "Note 11 : trésorerie-actif = bilan (BT)",
            |s| s.notes.note11_tresorerie_actif,
            |s| Some(s.actif.net_of(TRESORERIE_ACTIF_LINES)),
        ),
        CheckDefinition::new(
            "NOTE-14",
            Notes,
            "Note 14 : capital = bilan (CA)",
            |s| s.notes.note14_capital,
            |s| Some(s.passif.amount_of(&["CA"])),
        ),
        CheckDefinition::new(
            "NOTE-17",
            Notes,
            "Note 17 : fournisseurs = bilan (DJ)",
            |s| s.notes.note17_fournisseurs,
            |s| Some(s.passif.amount_of(&["DJ"])),
        ),
        CheckDefinition::new(
            "NOTE-21",
            Notes,
            "Note 21 : chiffre d'affaires = SIG (XB)",
            |s| s.notes.note21_chiffre_affaires,
            |s| Some(s.sig.chiffre_affaires()),
        ),
        CheckDefinition::new(
            "NOTE-27",
            Notes,
            "Note 27 : charges de personnel = compte de résultat (RK)",
            |s| s.notes.note27_charges_personnel,
            |s| Some(s.compte_resultat.charge("RK")),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::BalanceAggregator;
    use crate::balance_sheet::{generate_assets, generate_liabilities};
    use crate::cash_flow::generate_cash_flow;
    use crate::income_statement::generate_income_statement;
    use crate::mapping::MappingTable;
    use crate::schema::BalanceEntry;
    use crate::sig::generate_sig;

    struct Generated {
        summary: TrialBalanceSummary,
        actif: AssetStatement,
        passif: LiabilityStatement,
        compte_resultat: IncomeStatement,
        sig: SigCascade,
        tft: CashFlowStatement,
        unplaced: Vec<UnplacedAccount>,
    }

    impl Generated {
        fn load(entries: &[(&str, f64, f64)]) -> Self {
            let rows: Vec<BalanceEntry> = entries
                .iter()
                .map(|(code, d, c)| BalanceEntry::new(*code, "", *d, *c))
                .collect();
            let aggregator = BalanceAggregator::load(&rows).unwrap();
            let table = MappingTable::default();
            Self {
                summary: aggregator.summary(),
                actif: generate_assets(&aggregator, &table),
                passif: generate_liabilities(&aggregator, &table),
                compte_resultat: generate_income_statement(&aggregator, &table),
                sig: generate_sig(&aggregator, &table),
                tft: generate_cash_flow(&aggregator, &table, None),
                unplaced: aggregator.unplaced_accounts(&table),
            }
        }

        fn statements<'a>(&'a self, notes: &'a NotesAnnexes) -> StatementSet<'a> {
            StatementSet {
                summary: &self.summary,
                actif: &self.actif,
                passif: &self.passif,
                compte_resultat: &self.compte_resultat,
                sig: &self.sig,
                tft: &self.tft,
                unplaced: &self.unplaced,
                notes,
            }
        }
    }

    fn compare(a: f64, b: f64, tolerance: ToleranceConfig) -> CheckStatus {
        classify((a - b).abs(), &tolerance)
    }

    #[test]
    fn test_tolerance_boundary() {
        let tolerance = ToleranceConfig::new(1.0, 10.0);

        assert_eq!(compare(100.0, 101.0, tolerance), CheckStatus::Conforme);
        assert_eq!(compare(100.0, 102.0, tolerance), CheckStatus::Ecart);
        assert_eq!(compare(100.0, 110.0, tolerance), CheckStatus::Ecart);
        assert_eq!(compare(100.0, 111.0, tolerance), CheckStatus::Erreur);
        assert_eq!(classify(f64::NAN, &tolerance), CheckStatus::Erreur);
    }

    #[test]
    fn test_zero_tolerance_is_exact() {
        let tolerance = ToleranceConfig::new(0.0, 10.0);
        assert_eq!(compare(5.0, 5.0, tolerance), CheckStatus::Conforme);
        assert_eq!(compare(5.0, 6.0, tolerance), CheckStatus::Erreur);
    }

    #[test]
    fn test_score_rounding() {
        let check = |status| CoherenceCheck {
            id: "X".to_string(),
            family: CheckFamily::Bilan,
            description: String::new(),
            value_a: 0.0,
            value_b: 0.0,
            deviation: 0.0,
            tolerance: 1.0,
            status,
            recommendation: None,
        };

        assert_eq!(score(&[]), None);
        assert_eq!(
            score(&[check(CheckStatus::Conforme), check(CheckStatus::Conforme), check(CheckStatus::Ecart)]),
            Some(67)
        );
        assert_eq!(score(&[check(CheckStatus::Erreur)]), Some(0));
    }

    #[test]
    fn test_trivial_balance_scores_100() {
        let generated = Generated::load(&[("101", 0.0, 100.0), ("512", 100.0, 0.0)]);
        let notes = NotesAnnexes::default();
        let config = LiasseConfig::new("Test SARL");

        let report = CoherenceChecker::new(&config, "SYSCOHADA révisé 2017").run(&generated.statements(&notes));

        assert_eq!(report.score, Some(100));
        assert!(report.check("BIL-01").is_some());
        assert!(report.check("NOTE-03").is_none());
        assert!(report.checks.iter().all(|c| c.recommendation.is_none()));
        assert!(!report.has_errors());
    }

    #[test]
    fn test_unbalanced_trial_balance_is_reported() {
        let generated = Generated::load(&[("101", 0.0, 1_000.0), ("512", 900.0, 0.0)]);
        let notes = NotesAnnexes::default();
        let config = LiasseConfig::new("Test SARL");

        let report = CoherenceChecker::new(&config, "SYSCOHADA révisé 2017").run(&generated.statements(&notes));

        let bal = report.check("BAL-01").unwrap();
        assert_eq!(bal.deviation, 100.0);
        assert_eq!(bal.status, CheckStatus::Erreur);
        assert!(bal.recommendation.is_some());
        assert_eq!(report.check("BIL-01").unwrap().status, CheckStatus::Erreur);
        assert_eq!(report.erreurs().len(), 2);
        assert!(report.score.unwrap() < 100);
    }

    #[test]
    fn test_notes_checks_and_overrides() {
        let generated = Generated::load(&[
            ("101", 0.0, 5_000_000.0),
            ("6611", 1_200_000.0, 0.0),
            ("7011", 0.0, 3_000_000.0),
            ("5211", 6_800_000.0, 0.0),
        ]);
        let notes = NotesAnnexes {
            note14_capital: Some(5_000_000.0),
            note21_chiffre_affaires: Some(3_000_005.0),
            note27_charges_personnel: Some(1_150_000.0),
            ..Default::default()
        };
        let mut config = LiasseConfig::new("Test SA");
        config
            .tolerance_overrides
            .insert("NOTE-21".to_string(), ToleranceConfig::new(10.0, 10.0));

        let report = CoherenceChecker::new(&config, "SYSCOHADA révisé 2017").run(&generated.statements(&notes));

        assert_eq!(report.check("NOTE-14").unwrap().status, CheckStatus::Conforme);
        let ca = report.check("NOTE-21").unwrap();
        assert_eq!(ca.status, CheckStatus::Conforme);
        assert_eq!(ca.tolerance, 10.0);
        assert_eq!(report.check("NOTE-27").unwrap().status, CheckStatus::Erreur);
        assert!(report.check("NOTE-06").is_none());
    }

    fn hao_and_financial_items() -> Generated {
        Generated::load(&[
            ("7011", 0.0, 1_000.0),
            ("6611", 200.0, 0.0),
            ("6711", 30.0, 0.0),
            ("6871", 40.0, 0.0),
            ("6813", 70.0, 0.0),
            ("7911", 0.0, 5.0),
            ("7711", 0.0, 25.0),
            ("7971", 0.0, 15.0),
            ("831", 20.0, 0.0),
            ("851", 300.0, 0.0),
            ("841", 0.0, 10.0),
            ("861", 0.0, 50.0),
            ("8911", 60.0, 0.0),
            ("5211", 385.0, 0.0),
        ])
    }

    #[test]
    fn test_cafg_matches_ebe_method() {
        let generated = hao_and_financial_items();
        let notes = NotesAnnexes::default();
        let statements = generated.statements(&notes);

        assert_eq!(generated.sig.by_reference("XD").unwrap().amount, 800.0);
        assert_eq!(generated.tft.cafg, 725.0);
        assert_eq!(cafg_from_ebe(&statements), 725.0);

        let report = CoherenceChecker::new(&LiasseConfig::new("Test SA"), "SYSCOHADA révisé 2017").run(&statements);
        assert_eq!(report.check("TFT-02").unwrap().status, CheckStatus::Conforme);
        assert_eq!(report.score, Some(100));
    }

    #[test]
    fn test_cafg_missing_an_add_back_is_flagged() {
        let mut generated = hao_and_financial_items();
        generated.tft.cafg -= generated.tft.hao_dotations;
        let notes = NotesAnnexes::default();

        let report =
            CoherenceChecker::new(&LiasseConfig::new("Test SA"), "SYSCOHADA révisé 2017").run(&generated.statements(&notes));

        let tft = report.check("TFT-02").unwrap();
        assert_eq!(tft.deviation, 300.0);
        assert_eq!(tft.status, CheckStatus::Erreur);
    }

    #[test]
    fn test_rebates_keep_the_net_result_consistent() {
        let generated = Generated::load(&[
            ("6011", 1_000.0, 0.0),
            ("6019", 0.0, 100.0),
            ("7011", 0.0, 2_000.0),
            ("5211", 1_100.0, 0.0),
        ]);
        let notes = NotesAnnexes::default();

        let report =
            CoherenceChecker::new(&LiasseConfig::new("Test SA"), "SYSCOHADA révisé 2017").run(&generated.statements(&notes));

        assert_eq!(generated.compte_resultat.charge("RA"), 900.0);
        assert_eq!(generated.sig.net_result(), 1_100.0);
        assert_eq!(generated.passif.net_result(), 1_100.0);
        assert!(generated.unplaced.is_empty());
        assert_eq!(report.score, Some(100));
    }

    #[test]
    fn test_sole_proprietor_account_is_capital() {
        let generated = Generated::load(&[
            ("1011", 0.0, 500.0),
            ("1081", 120.0, 0.0),
            ("5211", 380.0, 0.0),
        ]);
        let notes = NotesAnnexes::default();

        let report =
            CoherenceChecker::new(&LiasseConfig::new("Ets Kouassi"), "SYSCOHADA révisé 2017").run(&generated.statements(&notes));

        assert_eq!(generated.passif.amount_of(&["CA"]), 380.0);
        assert_eq!(report.check("BIL-01").unwrap().status, CheckStatus::Conforme);
        assert_eq!(report.check("COU-01").unwrap().status, CheckStatus::Conforme);
    }

    #[test]
    fn test_unplaced_balance_fails_coverage() {
        let generated = Generated::load(&[("101", 0.0, 100.0), ("512", 70.0, 0.0), ("16", 30.0, 0.0)]);
        let notes = NotesAnnexes::default();
        let config = LiasseConfig::new("Test SARL");

        let report = CoherenceChecker::new(&config, "SYSCOHADA révisé 2017").run(&generated.statements(&notes));

        let coverage = report.check("COU-01").unwrap();
        assert_eq!(coverage.value_a, 30.0);
        assert_eq!(coverage.status, CheckStatus::Erreur);
    }

    #[test]
    fn test_custom_battery() {
        let generated = Generated::load(&[("101", 0.0, 100.0), ("512", 100.0, 0.0)]);
        let notes = NotesAnnexes::default();
        let config = LiasseConfig::new("Test SARL");
        let only_capital = vec![CheckDefinition::new(
            "CAP",
            CheckFamily::Bilan,
            "Capital = 90",
            |s| Some(s.passif.amount_of(&["CA"])),
            |_| Some(90.0),
        )];

        let checker = CoherenceChecker::with_definitions(&config, "SYSCOHADA révisé 2017", only_capital);
        let report = checker.run(&generated.statements(&notes));

        assert_eq!(checker.definitions().len(), 1);
        assert_eq!(report.checks.len(), 1);
        assert_eq!(report.checks[0].status, CheckStatus::Ecart);
        assert_eq!(report.score, Some(0));
    }
}
