use crate::coherence::{CheckStatus, ValidationReport};

impl ValidationReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Id,Famille,Description,Valeur A,Valeur B,Ecart,Tolerance,Statut,Recommandation\n");

        for check in &self.checks {
            output.push_str(&format!(
                "{},{},{},{},{},{},{},{},{}\n",
                csv_field(&check.id),
                csv_field(&check.family.to_string()),
                csv_field(&check.description),
                plain_amount(check.value_a),
                plain_amount(check.value_b),
                plain_amount(check.deviation),
                plain_amount(check.tolerance),
                check.status,
                csv_field(check.recommendation.as_deref().unwrap_or(""))
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Rapport de cohérence - {}\n\n", self.organization_name));
        output.push_str(&format!("**Référentiel :** {}\n\n", self.framework));
        if let Some(exercise) = &self.exercise {
            output.push_str(&format!(
                "**Exercice :** du {} au {}\n\n",
                exercise.start.format("%d/%m/%Y"),
                exercise.end.format("%d/%m/%Y")
            ));
        }

        match self.score {
            Some(score) => output.push_str(&format!("**Score :** {}/100\n\n", score)),
            None => output.push_str("**Score :** non applicable (aucun contrôle)\n\n"),
        }
        output.push_str(&format!(
            "{} conforme(s), {} écart(s), {} erreur(s)\n\n",
            self.conformes().len(),
            self.ecarts().len(),
            self.erreurs().len()
        ));

        output.push_str("## Contrôles\n\n");
        output.push_str("| Statut | Id | Contrôle | Valeur A | Valeur B | Écart | Tolérance |\n");
        output.push_str("|---|---|---|---:|---:|---:|---:|\n");
        for check in &self.checks {
            output.push_str(&format!(
                "| {} {} | {} | {} | {} | {} | {} | {} |\n",
                status_marker(check.status),
                check.status,
                check.id,
                check.description.replace('|', "\\|"),
                grouped_amount(check.value_a),
                grouped_amount(check.value_b),
                grouped_amount(check.deviation),
                grouped_amount(check.tolerance)
            ));
        }
        output.push('\n');

        let flagged: Vec<_> = self
            .checks
            .iter()
            .filter(|c| c.status != CheckStatus::Conforme)
            .collect();
        if !flagged.is_empty() {
            output.push_str("## Recommandations\n\n");
            for check in flagged {
                output.push_str(&format!(
                    "- **{}** ({}) : {}\n",
                    check.id,
                    check.family,
                    check.recommendation.as_deref().unwrap_or("")
                ));
            }
            output.push('\n');
        }

        output
    }
}

fn status_marker(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Conforme => "✅",
        CheckStatus::Ecart => "⚠️",
        CheckStatus::Erreur => "❌",
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Drops `-0` and prints whole amounts without decimals.
fn plain_amount(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// `plain_amount` with a space every three digits, e.g. `-1 250 000`.
fn grouped_amount(value: f64) -> String {
    let plain = plain_amount(value);
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (integer, decimals) = match unsigned.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (unsigned, None),
    };

    let mut grouped = String::new();
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    match decimals {
        Some(d) => format!("{}{},{}", sign, grouped, d),
        None => format!("{}{}", sign, grouped),
    }
}
