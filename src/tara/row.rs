//! TARA row model and derivation pipeline

use super::levels::{
    cal_for, normalize_feasibility, normalize_impact_rating, risk_value, Cal, FeasibilityLevel, ImpactLevel,
    VectorParam,
};
use crate::graph::property::{lenient_text, rating_1_to_5, PropertyMap};
use serde::{Deserialize, Deserializer, Serialize};

/// Affected cybersecurity properties
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiaTriple {
    #[serde(rename = "C", default)]
    pub confidentiality: bool,
    #[serde(rename = "I", default)]
    pub integrity: bool,
    #[serde(rename = "A", default)]
    pub availability: bool,
}

impl CiaTriple {
    /// Short form such as "C, I"
    pub fn letters(&self) -> String {
        [
            (self.confidentiality, "C"),
            (self.integrity, "I"),
            (self.availability, "A"),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, letter)| *letter)
        .collect::<Vec<_>>()
        .join(", ")
    }
}

fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(rating_1_to_5(value.as_ref()))
}

/// One TARA worksheet row.
///
/// Every field is optional. Fields this crate does not know are kept in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaraRow {
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub damage_scenario_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cybersecurity_property: Option<CiaTriple>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub threat_scenario_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threat_scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_category: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub impact_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub attack_path_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_path: Option<String>,
    #[serde(rename = "unR155CsmsAnnex5PartA", skip_serializing_if = "Option::is_none")]
    pub un_r155_csms_annex5_part_a: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub attack_vector_based_approach: Option<String>,

    // Derived
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub attack_feasibility_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_impact: Option<String>,
    #[serde(deserialize_with = "lenient_rating", skip_serializing_if = "Option::is_none")]
    pub risk_value: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_vector_parameters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_impact_final: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cal: Option<String>,

    #[serde(flatten)]
    pub extra: PropertyMap,
}

/// Typed result of the derivation steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedFields {
    pub feasibility: Option<FeasibilityLevel>,
    pub impact: Option<ImpactLevel>,
    pub risk_value: Option<u8>,
    pub vector: Option<VectorParam>,
    pub impact_final: Option<ImpactLevel>,
    pub cal: Option<Cal>,
}

impl DerivedFields {
    pub fn compute(row: &TaraRow) -> Self {
        // The attack-vector approach wins whenever it is present at all
        let feasibility = row
            .attack_vector_based_approach
            .as_deref()
            .or(row.attack_feasibility_rating.as_deref())
            .and_then(normalize_feasibility);
        let impact = row.impact_rating.as_deref().and_then(normalize_impact_rating);

        let risk_value = match (impact, feasibility) {
            (Some(i), Some(f)) => Some(risk_value(i, f)),
            _ => None,
        };
        let vector = feasibility.map(FeasibilityLevel::vector_param);
        let impact_final = impact;
        let cal = match (impact_final, vector) {
            (Some(i), Some(v)) => Some(cal_for(i, v)),
            _ => None,
        };

        Self {
            feasibility,
            impact,
            risk_value,
            vector,
            impact_final,
            cal,
        }
    }
}

impl TaraRow {
    pub fn derived(&self) -> DerivedFields {
        DerivedFields::compute(self)
    }

    /// Whether any of the C/I/A flags is set
    pub fn affects_any_property(&self) -> bool {
        self.cybersecurity_property
            .map(|p| p.confidentiality || p.integrity || p.availability)
            .unwrap_or(false)
    }
}

/// Return the row merged with every derived field that could be computed.
///
/// Derived fields that cannot be computed are cleared, so stale values from a
/// previous run never survive a change of inputs.
pub fn derive_tara_fields(row: &TaraRow) -> TaraRow {
    let derived = row.derived();
    let mut out = row.clone();
    out.attack_feasibility_rating = derived.feasibility.map(|f| f.to_string());
    out.risk_impact = derived.impact.map(|i| i.to_string());
    out.risk_value = derived.risk_value;
    out.attack_vector_parameters = derived.vector.map(|v| v.to_string());
    out.risk_impact_final = derived.impact_final.map(|i| i.to_string());
    out.cal = derived.cal.map(|c| c.to_string());
    out
}

pub fn apply_tara_derivations(rows: &[TaraRow]) -> Vec<TaraRow> {
    rows.iter().map(derive_tara_fields).collect()
}
