//! Static SYSCOHADA révisé 2017 mapping from statement reference codes to
//! chart-of-accounts prefixes.

use crate::error::{LiasseError, Result};
use crate::schema::{AccountMappingRule, LineNature, SignFilter, StatementFamily};
use serde::Serialize;
use std::collections::HashSet;

pub const FRAMEWORK_SYSCOHADA_2017: &str = "SYSCOHADA révisé 2017";

/// Classes whose unclosed balances form the period result.
pub const INCOME_CLASSES: &[&str] = &["6", "7", "8"];

/// Dotations HAO, carried inside RP.
pub const HAO_DOTATION_PREFIXES: &[&str] = &["85"];
/// Reprises HAO, carried inside TO.
pub const HAO_REPRISE_PREFIXES: &[&str] = &["86"];

const fn rule(
    reference_code: &'static str,
    label: &'static str,
    account_prefixes: &'static [&'static str],
    contra_prefixes: &'static [&'static str],
    nature: LineNature,
) -> AccountMappingRule {
    AccountMappingRule {
        reference_code,
        label,
        account_prefixes,
        contra_prefixes,
        nature,
    }
}

use LineNature::{Net, NetResult, Standard, Variation};

const SUPPLIER_ACCOUNTS: &[&str] = &["401", "402", "403", "404", "405", "408", "409"];
const CUSTOMER_ACCOUNTS: &[&str] = &["411", "412", "413", "414", "415", "416", "418", "419"];

static ACTIF_RULES: &[AccountMappingRule] = &[
    rule("AE", "Frais de développement et de prospection", &["211", "2191"], &["2811", "2911"], Standard),
    rule(
        "AF",
        "Brevets, licences, logiciels et droits similaires",
        &["212", "213", "214", "2193"],
        &["2812", "2813", "2814", "2912", "2913", "2914"],
        Standard,
    ),
    rule("AG", "Fonds commercial et droit au bail", &["215", "216"], &["2815", "2816", "2915", "2916"], Standard),
    rule(
        "AH",
        "Autres immobilisations incorporelles",
        &["217", "218", "2198"],
        &["2817", "2818", "2917", "2918", "2919"],
        Standard,
    ),
    rule("AJ", "Terrains", &["22"], &["282", "292"], Standard),
    rule(
        "AK",
        "Bâtiments",
        &["231", "232", "233", "237", "2391"],
        &["2831", "2832", "2833", "2837", "2931", "2932", "2933", "2937", "2939"],
        Standard,
    ),
    rule(
        "AL",
        "Aménagements, agencements et installations",
        &["234", "235", "238", "2392", "2393"],
        &["2834", "2835", "2838", "2934", "2935", "2938"],
        Standard,
    ),
    rule(
        "AM",
        "Matériel, mobilier et actifs biologiques",
        &["241", "242", "243", "244", "246", "247", "248", "2494"],
        &["2841", "2842", "2843", "2844", "2846", "2847", "2848", "2941", "2942", "2943", "2944", "2946"],
        Standard,
    ),
    rule("AN", "Matériel de transport", &["245", "2495"], &["2845", "2945"], Standard),
    rule("AP", "Avances et acomptes versés sur immobilisations", &["25"], &["295"], Standard),
    rule("AR", "Titres de participation", &["26"], &["296"], Standard),
    rule("AS", "Autres immobilisations financières", &["27"], &["297"], Standard),
    rule("BA", "Actif circulant HAO", &["485", "488"], &["498"], Standard),
    rule("BB", "Stocks et encours", &["31", "32", "33", "34", "35", "36", "37", "38"], &["39"], Standard),
    rule(
        "BH",
        "Fournisseurs, avances versées",
        SUPPLIER_ACCOUNTS,
        &[],
        LineNature::Reciprocal { counterpart: "DJ" },
    ),
    rule("BI", "Clients", CUSTOMER_ACCOUNTS, &["491"], Standard),
    rule(
        "BJ",
        "Autres créances",
        &["185", "42", "43", "44", "45", "46", "471", "472", "473", "474", "475", "476", "477"],
        &["492", "493", "494", "495", "496", "497"],
        Standard,
    ),
    rule("BQ", "Titres de placement", &["50"], &["590"], Standard),
    rule("BR", "Valeurs à encaisser", &["51"], &["591"], Standard),
    rule(
        "BS",
        "Banques, chèques postaux, caisse et assimilés",
        &["52", "53", "54", "55", "56", "57", "58"],
        &["592", "593", "594"],
        Standard,
    ),
    rule("BU", "Ecart de conversion-Actif", &["478"], &[], Standard),
];

static PASSIF_RULES: &[AccountMappingRule] = &[
    rule("CA", "Capital", &["101", "102", "103", "104", "108"], &[], Net),
    rule("CB", "Apporteurs capital non appelé (-)", &["109"], &[], Variation),
    rule("CD", "Primes liées au capital social", &["105"], &[], Standard),
    rule("CE", "Ecarts de réévaluation", &["106"], &[], Standard),
    rule("CF", "Réserves indisponibles", &["111", "112", "113"], &[], Standard),
    rule("CG", "Réserves libres", &["118"], &[], Standard),
    rule("CH", "Report à nouveau (+ ou -)", &["12"], &[], Variation),
    rule("CJ", "Résultat net de l'exercice (bénéfice + ou perte -)", &["13"], &[], NetResult),
    rule("CL", "Subventions d'investissement", &["14"], &[], Standard),
    rule("CM", "Provisions réglementées", &["15"], &[], Standard),
    rule(
        "DA",
        "Emprunts et dettes financières diverses",
        &["16", "181", "182", "183", "184"],
        &[],
        Standard,
    ),
    rule("DB", "Dettes de location-acquisition", &["17"], &[], Standard),
    rule("DC", "Provisions pour risques et charges", &["19"], &[], Standard),
    rule("DH", "Dettes circulantes HAO", &["481", "482", "483", "484"], &[], Standard),
    rule(
        "DI",
        "Clients, avances reçues",
        CUSTOMER_ACCOUNTS,
        &[],
        LineNature::Reciprocal { counterpart: "BI" },
    ),
    rule("DJ", "Fournisseurs d'exploitation", SUPPLIER_ACCOUNTS, &[], Standard),
    rule("DK", "Dettes fiscales et sociales", &["42", "43", "44"], &[], Standard),
    rule(
        "DM",
        "Autres dettes",
        &["185", "45", "46", "471", "472", "473", "474", "475", "476", "477"],
        &[],
        Standard,
    ),
    rule("DN", "Provisions pour risques à court terme", &["499", "599"], &[], Standard),
    rule("DQ", "Banques, crédits d'escompte", &["564", "565"], &[], Standard),
    rule(
        "DR",
        "Banques, établissements financiers et crédits de trésorerie",
        &["52", "53", "54", "55", "561", "562", "563", "566", "567", "568", "57", "58"],
        &[],
        LineNature::Reciprocal { counterpart: "BS" },
    ),
    rule("DV", "Ecart de conversion-Passif", &["479"], &[], Standard),
];

static CHARGES_RULES: &[AccountMappingRule] = &[
    rule("RA", "Achats de marchandises", &["601"], &[], Net),
    rule("RB", "Variation de stocks de marchandises", &["6031"], &[], Variation),
    rule("RC", "Achats de matières premières et fournitures liées", &["602"], &[], Net),
    rule("RD", "Variation de stocks de matières premières et fournitures liées", &["6032"], &[], Variation),
    rule("RE", "Autres achats", &["604", "605", "608"], &[], Net),
    rule("RF", "Variation de stocks d'autres approvisionnements", &["6033"], &[], Variation),
    rule("RG", "Transports", &["61"], &[], Standard),
    rule("RH", "Services extérieurs", &["62", "63"], &[], Standard),
    rule("RI", "Impôts et taxes", &["64"], &[], Standard),
    rule("RJ", "Autres charges", &["65"], &[], Standard),
    rule("RK", "Charges de personnel", &["66"], &[], Standard),
    rule(
        "RL",
        "Dotations aux amortissements, aux provisions et dépréciations",
        &["681", "691"],
        &[],
        Standard,
    ),
    rule("RM", "Frais financiers et charges assimilées", &["67"], &[], Standard),
    rule("RN", "Dotations aux provisions et aux dépréciations financières", &["687", "697"], &[], Standard),
    rule("RO", "Valeurs comptables des cessions d'immobilisations", &["81"], &[], Standard),
    rule("RP", "Autres charges HAO", &["83", "85"], &[], Standard),
    rule("RQ", "Participation des travailleurs", &["87"], &[], Standard),
    rule("RS", "Impôts sur le résultat", &["89"], &[], Standard),
];

static PRODUITS_RULES: &[AccountMappingRule] = &[
    rule("TA", "Ventes de marchandises", &["701"], &[], Net),
    rule("TB", "Ventes de produits fabriqués", &["702", "703", "704"], &[], Net),
    rule("TC", "Travaux, services vendus", &["705", "706"], &[], Net),
    rule("TD", "Produits accessoires", &["707"], &[], Net),
    rule("TE", "Production stockée (ou déstockage)", &["73"], &[], Variation),
    rule("TF", "Production immobilisée", &["72"], &[], Standard),
    rule("TG", "Subventions d'exploitation", &["71"], &[], Standard),
    rule("TH", "Autres produits", &["75"], &[], Standard),
    rule("TI", "Transferts de charges d'exploitation", &["781"], &[], Standard),
    rule(
        "TJ",
        "Reprises d'amortissements, de provisions et dépréciations",
        &["791", "798", "799"],
        &[],
        Standard,
    ),
    rule("TK", "Revenus financiers et assimilés", &["77"], &[], Standard),
    rule("TL", "Reprises de provisions et dépréciations financières", &["797"], &[], Standard),
    rule("TM", "Transferts de charges financières", &["787"], &[], Standard),
    rule("TN", "Produits des cessions d'immobilisations", &["82"], &[], Standard),
    rule("TO", "Autres produits HAO", &["84", "86", "88"], &[], Standard),
];

/// A total row of the balance sheet, defined over detail reference codes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubtotalDefinition {
    pub reference_code: &'static str,
    pub label: &'static str,
    pub components: &'static [&'static str],
}

const fn subtotal(
    reference_code: &'static str,
    label: &'static str,
    components: &'static [&'static str],
) -> SubtotalDefinition {
    SubtotalDefinition {
        reference_code,
        label,
        components,
    }
}

pub const TRESORERIE_ACTIF_LINES: &[&str] = &["BQ", "BR", "BS"];
pub const TRESORERIE_PASSIF_LINES: &[&str] = &["DQ", "DR"];
pub const IMMOBILISATION_LINES: &[&str] = &[
    "AE", "AF", "AG", "AH", "AJ", "AK", "AL", "AM", "AN", "AP", "AR", "AS",
];

static ACTIF_SUBTOTALS: &[SubtotalDefinition] = &[
    subtotal("AD", "Immobilisations incorporelles", &["AE", "AF", "AG", "AH"]),
    subtotal("AI", "Immobilisations corporelles", &["AJ", "AK", "AL", "AM", "AN", "AP"]),
    subtotal("AQ", "Immobilisations financières", &["AR", "AS"]),
    subtotal("AZ", "Total actif immobilisé", IMMOBILISATION_LINES),
    subtotal("BG", "Créances et emplois assimilés", &["BH", "BI", "BJ"]),
    subtotal("BK", "Total actif circulant", &["BA", "BB", "BH", "BI", "BJ"]),
    subtotal("BT", "Total trésorerie-actif", TRESORERIE_ACTIF_LINES),
    subtotal(
        "BZ",
        "Total général",
        &[
            "AE", "AF", "AG", "AH", "AJ", "AK", "AL", "AM", "AN", "AP", "AR", "AS", "BA", "BB",
            "BH", "BI", "BJ", "BQ", "BR", "BS", "BU",
        ],
    ),
];

static PASSIF_SUBTOTALS: &[SubtotalDefinition] = &[
    subtotal(
        "CP",
        "Total capitaux propres et ressources assimilées",
        &["CA", "CB", "CD", "CE", "CF", "CG", "CH", "CJ", "CL", "CM"],
    ),
    subtotal("DD", "Total dettes financières et ressources assimilées", &["DA", "DB", "DC"]),
    subtotal(
        "DF",
        "Total ressources stables",
        &["CA", "CB", "CD", "CE", "CF", "CG", "CH", "CJ", "CL", "CM", "DA", "DB", "DC"],
    ),
    subtotal("DP", "Total passif circulant", &["DH", "DI", "DJ", "DK", "DM", "DN"]),
    subtotal("DT", "Total trésorerie-passif", TRESORERIE_PASSIF_LINES),
    subtotal(
        "DZ",
        "Total général",
        &[
            "CA", "CB", "CD", "CE", "CF", "CG", "CH", "CJ", "CL", "CM", "DA", "DB", "DC", "DH",
            "DI", "DJ", "DK", "DM", "DN", "DQ", "DR", "DV",
        ],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingTable {
    framework: &'static str,
    actif: &'static [AccountMappingRule],
    passif: &'static [AccountMappingRule],
    charges: &'static [AccountMappingRule],
    produits: &'static [AccountMappingRule],
}

impl Default for MappingTable {
    fn default() -> Self {
        Self::syscohada_2017()
    }
}

impl MappingTable {
    pub fn syscohada_2017() -> Self {
        Self {
            framework: FRAMEWORK_SYSCOHADA_2017,
            actif: ACTIF_RULES,
            passif: PASSIF_RULES,
            charges: CHARGES_RULES,
            produits: PRODUITS_RULES,
        }
    }

    pub fn framework(&self) -> &'static str {
        self.framework
    }

    pub fn rules_for(&self, family: StatementFamily) -> &'static [AccountMappingRule] {
        match family {
            StatementFamily::Actif => self.actif,
            StatementFamily::Passif => self.passif,
            StatementFamily::Charges => self.charges,
            StatementFamily::Produits => self.produits,
        }
    }

    /// Looks a family up by name; an unknown name is a caller defect.
    pub fn rules_for_name(&self, family: &str) -> Result<&'static [AccountMappingRule]> {
        let family: StatementFamily = family.parse()?;
        Ok(self.rules_for(family))
    }

    pub fn rule(&self, family: StatementFamily, reference_code: &str) -> Option<&'static AccountMappingRule> {
        self.rules_for(family)
            .iter()
            .find(|r| r.reference_code == reference_code)
    }

    pub fn subtotals(&self, family: StatementFamily) -> &'static [SubtotalDefinition] {
        match family {
            StatementFamily::Actif => ACTIF_SUBTOTALS,
            StatementFamily::Passif => PASSIF_SUBTOTALS,
            StatementFamily::Charges | StatementFamily::Produits => &[],
        }
    }

    /// Sign filter a generator applies to a rule's account prefixes.
    pub fn filter_for(&self, family: StatementFamily, rule: &AccountMappingRule) -> SignFilter {
        match rule.nature {
            LineNature::Standard => family.default_filter(),
            LineNature::Variation | LineNature::Net | LineNature::NetResult => SignFilter::Any,
            LineNature::Reciprocal { .. } => opposite_side(family).default_filter().opposite(),
        }
    }

    /// Collects every configuration defect in the table. The built-in table
    /// must come back empty.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for family in StatementFamily::ALL {
            let rules = self.rules_for(family);
            let mut seen = HashSet::new();
            for rule in rules {
                if !seen.insert(rule.reference_code) {
                    issues.push(format!(
                        "duplicate reference code {} in {} family",
                        rule.reference_code, family
                    ));
                }
                if rule.account_prefixes.is_empty() {
                    issues.push(format!("{} has no account prefixes", rule.reference_code));
                }
            }

            if matches!(family, StatementFamily::Actif | StatementFamily::Passif) {
                issues.extend(overlaps(family, rules, |r| r.account_prefixes));
                issues.extend(overlaps(family, rules, |r| r.contra_prefixes));
                issues.extend(self.check_counterparts(family, rules));
            }
        }

        issues
    }

    /// Fails with `MappingConflict` when `validate` reports anything.
    pub fn ensure_valid(&self) -> Result<()> {
        let issues = self.validate();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(LiasseError::MappingConflict(issues.join("; ")))
        }
    }

    fn check_counterparts(&self, family: StatementFamily, rules: &[AccountMappingRule]) -> Vec<String> {
        let mut issues = Vec::new();
        for rule in rules {
            let LineNature::Reciprocal { counterpart } = rule.nature else {
                continue;
            };
            match self.rule(opposite_side(family), counterpart) {
                None => issues.push(format!(
                    "{} names unknown reciprocal counterpart {}",
                    rule.reference_code, counterpart
                )),
                Some(target) => {
                    for prefix in rule.account_prefixes {
                        let reached = target
                            .account_prefixes
                            .iter()
                            .any(|p| prefix.starts_with(p) || p.starts_with(prefix));
                        if !reached {
                            issues.push(format!(
                                "{} prefix {} is not carried by counterpart {}",
                                rule.reference_code, prefix, counterpart
                            ));
                        }
                    }
                }
            }
        }
        issues
    }
}

fn opposite_side(family: StatementFamily) -> StatementFamily {
    match family {
        StatementFamily::Actif => StatementFamily::Passif,
        StatementFamily::Passif => StatementFamily::Actif,
        StatementFamily::Charges => StatementFamily::Produits,
        StatementFamily::Produits => StatementFamily::Charges,
    }
}

fn overlaps(
    family: StatementFamily,
    rules: &[AccountMappingRule],
    prefixes: impl Fn(&AccountMappingRule) -> &'static [&'static str],
) -> Vec<String> {
    let mut issues = Vec::new();
    let flattened: Vec<(&str, &str)> = rules
        .iter()
        .flat_map(|r| prefixes(r).iter().map(move |p| (r.reference_code, *p)))
        .collect();

    for (i, (code_a, prefix_a)) in flattened.iter().enumerate() {
        for (code_b, prefix_b) in flattened.iter().skip(i + 1) {
            if prefix_a.starts_with(prefix_b) || prefix_b.starts_with(prefix_a) {
                issues.push(format!(
                    "{} family: prefix {} ({}) overlaps {} ({})",
                    family, prefix_a, code_a, prefix_b, code_b
                ));
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_consistent() {
        let table = MappingTable::syscohada_2017();
        let issues = table.validate();
        assert!(issues.is_empty(), "unexpected mapping issues: {:?}", issues);
        assert!(table.ensure_valid().is_ok());
        assert_eq!(table.framework(), "SYSCOHADA révisé 2017");
    }

    #[test]
    fn test_family_sizes() {
        let table = MappingTable::default();
        assert_eq!(table.rules_for(StatementFamily::Charges).len(), 18);
        assert_eq!(table.rules_for(StatementFamily::Produits).len(), 15);
        assert_eq!(table.rules_for(StatementFamily::Actif).len(), 21);
        assert_eq!(table.rules_for(StatementFamily::Passif).len(), 22);
    }

    #[test]
    fn test_rules_for_unknown_family_fails() {
        let table = MappingTable::default();
        assert!(table.rules_for_name("passif").is_ok());
        assert!(matches!(
            table.rules_for_name("hors-bilan"),
            Err(LiasseError::UnknownFamily(_))
        ));
    }

    #[test]
    fn test_filters_are_table_driven() {
        let table = MappingTable::default();
        let rb = table.rule(StatementFamily::Charges, "RB").unwrap();
        let ra = table.rule(StatementFamily::Charges, "RA").unwrap();
        let dr = table.rule(StatementFamily::Passif, "DR").unwrap();
        let bh = table.rule(StatementFamily::Actif, "BH").unwrap();
        let cj = table.rule(StatementFamily::Passif, "CJ").unwrap();

        assert!(rb.is_variation());
        assert_eq!(table.filter_for(StatementFamily::Charges, rb), SignFilter::Any);
        assert_eq!(table.filter_for(StatementFamily::Charges, ra), SignFilter::Any);
        let rh = table.rule(StatementFamily::Charges, "RH").unwrap();
        assert_eq!(table.filter_for(StatementFamily::Charges, rh), SignFilter::PositiveOnly);
        assert!(dr.is_reciprocal());
        assert_eq!(table.filter_for(StatementFamily::Passif, dr), SignFilter::NegativeOnlyAbs);
        assert_eq!(table.filter_for(StatementFamily::Actif, bh), SignFilter::PositiveOnly);
        assert_eq!(table.filter_for(StatementFamily::Passif, cj), SignFilter::Any);
    }

    #[test]
    fn test_rebate_and_exploitant_accounts_are_placed() {
        let table = MappingTable::default();
        for (family, code, prefix) in [
            (StatementFamily::Charges, "RA", "6019"),
            (StatementFamily::Charges, "RE", "6049"),
            (StatementFamily::Produits, "TA", "7019"),
            (StatementFamily::Passif, "CA", "1081"),
        ] {
            let rule = table.rule(family, code).unwrap();
            assert!(
                rule.account_prefixes.iter().any(|p| prefix.starts_with(p)),
                "{} should carry {}",
                code,
                prefix
            );
            assert_eq!(table.filter_for(family, rule), SignFilter::Any, "{} should be signed", code);
        }

        let rn = table.rule(StatementFamily::Charges, "RN").unwrap();
        assert!(rn.account_prefixes.contains(&"687"));
    }

    #[test]
    fn test_overlap_detection() {
        static BROKEN: &[AccountMappingRule] = &[
            rule("BI", "Clients", &["41"], &[], Standard),
            rule("BX", "Clients douteux", &["416"], &[], Standard),
        ];
        let issues = overlaps(StatementFamily::Actif, BROKEN, |r| r.account_prefixes);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("416"));
    }

    #[test]
    fn test_subtotals_reference_known_lines() {
        let table = MappingTable::default();
        for family in [StatementFamily::Actif, StatementFamily::Passif] {
            for total in table.subtotals(family) {
                for code in total.components {
                    assert!(
                        table.rule(family, code).is_some(),
                        "{} refers to unknown line {}",
                        total.reference_code,
                        code
                    );
                }
            }
        }
    }
}
