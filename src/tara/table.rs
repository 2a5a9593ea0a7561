//! Tabular projection of TARA rows for spreadsheet and terminal output

use super::row::{derive_tara_fields, TaraRow};
use serde::Serialize;

pub const HEADERS: [&str; 20] = [
    "Damage Scenario No.",
    "Damage Scenario",
    "Cybersecurity Property",
    "Threat Scenario No.",
    "Threat Scenario",
    "Impact Category",
    "Impact Rating",
    "Impact",
    "Attack Path No.",
    "Entry Point",
    "Logic",
    "Attack Path",
    "UN R155 CSMS Annex 5 Part A",
    "Attack Vector-based Approach",
    "Attack Feasibility Rating",
    "Risk Impact",
    "Risk Value",
    "Attack Vector Parameters",
    "Risk Impact (Final)",
    "CAL",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaraTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl TaraTable {
    /// Derive every row, then flatten it into one string cell per column
    pub fn from_rows(rows: &[TaraRow]) -> Self {
        let rows = rows
            .iter()
            .map(derive_tara_fields)
            .map(|r| {
                vec![
                    cell(&r.damage_scenario_no),
                    cell(&r.damage_scenario),
                    r.cybersecurity_property.map(|p| p.letters()).unwrap_or_default(),
                    cell(&r.threat_scenario_no),
                    cell(&r.threat_scenario),
                    cell(&r.impact_category),
                    cell(&r.impact_rating),
                    cell(&r.impact),
                    cell(&r.attack_path_no),
                    cell(&r.entry_point),
                    cell(&r.logic),
                    cell(&r.attack_path),
                    cell(&r.un_r155_csms_annex5_part_a),
                    cell(&r.attack_vector_based_approach),
                    cell(&r.attack_feasibility_rating),
                    cell(&r.risk_impact),
                    r.risk_value.map(|v| v.to_string()).unwrap_or_default(),
                    cell(&r.attack_vector_parameters),
                    cell(&r.risk_impact_final),
                    cell(&r.cal),
                ]
            })
            .collect();
        Self {
            headers: HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// RFC 4180 style CSV with a header line
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for line in std::iter::once(&self.headers).chain(self.rows.iter()) {
            let cells: Vec<String> = line.iter().map(|c| csv_escape(c)).collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }
}

/// Quote a CSV cell when it holds a separator, quote or line break
pub fn csv_escape(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tara::row::CiaTriple;

    #[test]
    fn test_projection_includes_derived() {
        let row = TaraRow {
            damage_scenario: Some("Key extraction".into()),
            cybersecurity_property: Some(CiaTriple {
                confidentiality: true,
                integrity: true,
                availability: false,
            }),
            impact_rating: Some("Major".into()),
            attack_vector_based_approach: Some("Medium".into()),
            ..Default::default()
        };
        let table = TaraTable::from_rows(&[row]);
        assert_eq!(table.headers.len(), HEADERS.len());
        assert_eq!(table.len(), 1);
        let cells = &table.rows[0];
        assert_eq!(cells.len(), HEADERS.len());
        assert_eq!(cells[1], "Key extraction");
        assert_eq!(cells[2], "C, I");
        assert_eq!(cells[16], "3");
        assert_eq!(cells[17], "Adjacent");
        assert_eq!(cells[19], "CAL3");
        assert_eq!(cells[0], "");
    }

    #[test]
    fn test_csv_escaping() {
        let row = TaraRow {
            damage_scenario: Some("Leak, \"secret\"".into()),
            ..Default::default()
        };
        let csv = TaraTable::from_rows(&[row]).to_csv();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("Damage Scenario No.,Damage Scenario,"));
        assert!(lines.next().unwrap().starts_with(",\"Leak, \"\"secret\"\"\","));
    }

    #[test]
    fn test_csv_escape_cells() {
        assert_eq!(csv_escape("UART -> Linux"), "UART -> Linux");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("two\nlines"), "\"two\nlines\"");
        assert_eq!(csv_escape("cr\r"), "\"cr\r\"");
        assert_eq!(csv_escape(""), "");
    }

    #[test]
    fn test_empty() {
        let table = TaraTable::from_rows(&[]);
        assert!(table.is_empty());
        assert_eq!(table.to_csv().lines().count(), 1);
    }
}
