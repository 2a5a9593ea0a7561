//! Rating scales and lookup matrices

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ImpactLevel {
    Negligible,
    Moderate,
    Major,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeasibilityLevel {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VectorParam {
    Physical,
    Local,
    Adjacent,
    Network,
}

/// Cybersecurity Assurance Level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cal {
    #[serde(rename = "N/A")]
    NotApplicable,
    #[serde(rename = "CAL1")]
    Cal1,
    #[serde(rename = "CAL2")]
    Cal2,
    #[serde(rename = "CAL3")]
    Cal3,
    #[serde(rename = "CAL4")]
    Cal4,
}

impl ImpactLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::Negligible => "Negligible",
            ImpactLevel::Moderate => "Moderate",
            ImpactLevel::Major => "Major",
            ImpactLevel::Severe => "Severe",
        }
    }

    fn row(self) -> usize {
        self as usize
    }
}

impl FeasibilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeasibilityLevel::VeryLow => "Very Low",
            FeasibilityLevel::Low => "Low",
            FeasibilityLevel::Medium => "Medium",
            FeasibilityLevel::High => "High",
        }
    }

    /// Attack vector implied by the feasibility rating
    pub fn vector_param(self) -> VectorParam {
        match self {
            FeasibilityLevel::VeryLow => VectorParam::Physical,
            FeasibilityLevel::Low => VectorParam::Local,
            FeasibilityLevel::Medium => VectorParam::Adjacent,
            FeasibilityLevel::High => VectorParam::Network,
        }
    }
}

impl VectorParam {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorParam::Physical => "Physical",
            VectorParam::Local => "Local",
            VectorParam::Adjacent => "Adjacent",
            VectorParam::Network => "Network",
        }
    }

    /// Parse the canonical name (exact match)
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "Physical" => Some(VectorParam::Physical),
            "Local" => Some(VectorParam::Local),
            "Adjacent" => Some(VectorParam::Adjacent),
            "Network" => Some(VectorParam::Network),
            _ => None,
        }
    }
}

impl Cal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cal::NotApplicable => "N/A",
            Cal::Cal1 => "CAL1",
            Cal::Cal2 => "CAL2",
            Cal::Cal3 => "CAL3",
            Cal::Cal4 => "CAL4",
        }
    }
}

macro_rules! impl_display {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(ImpactLevel, FeasibilityLevel, VectorParam, Cal);

/// Trim, collapse inner whitespace and lowercase
fn norm(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

pub fn normalize_feasibility(text: &str) -> Option<FeasibilityLevel> {
    match norm(text).as_str() {
        "very low" | "verylow" | "vlow" | "v-low" => Some(FeasibilityLevel::VeryLow),
        "low" => Some(FeasibilityLevel::Low),
        "medium" | "med" => Some(FeasibilityLevel::Medium),
        "high" => Some(FeasibilityLevel::High),
        _ => None,
    }
}

/// Literal names, or a numeric shortcut: <=1, 2, 3, >=4.
/// Blank input and non-integral values between the steps stay unclassified.
///
/// Blank is never coerced to the number 0. A numeric reading of "" would rate
/// an unassessed row Negligible and give it a CAL of "N/A".
pub fn normalize_impact_rating(text: &str) -> Option<ImpactLevel> {
    let s = norm(text);
    match s.as_str() {
        "negligible" => return Some(ImpactLevel::Negligible),
        "moderate" => return Some(ImpactLevel::Moderate),
        "major" => return Some(ImpactLevel::Major),
        "severe" => return Some(ImpactLevel::Severe),
        "" => return None,
        _ => {}
    }
    let n: f64 = s.parse().ok().filter(|n: &f64| n.is_finite())?;
    if n <= 1.0 {
        Some(ImpactLevel::Negligible)
    } else if n == 2.0 {
        Some(ImpactLevel::Moderate)
    } else if n == 3.0 {
        Some(ImpactLevel::Major)
    } else if n >= 4.0 {
        Some(ImpactLevel::Severe)
    } else {
        None
    }
}

const RISK_MATRIX: [[u8; 4]; 4] = [
    [1, 1, 1, 1],
    [1, 2, 2, 3],
    [1, 2, 3, 4],
    [1, 3, 4, 5],
];

const CAL_MATRIX: [[Cal; 4]; 4] = [
    [Cal::NotApplicable, Cal::NotApplicable, Cal::NotApplicable, Cal::NotApplicable],
    [Cal::Cal1, Cal::Cal1, Cal::Cal2, Cal::Cal3],
    [Cal::Cal1, Cal::Cal2, Cal::Cal3, Cal::Cal4],
    [Cal::Cal2, Cal::Cal3, Cal::Cal4, Cal::Cal4],
];

pub fn risk_value(impact: ImpactLevel, feasibility: FeasibilityLevel) -> u8 {
    RISK_MATRIX[impact.row()][feasibility as usize]
}

pub fn cal_for(impact: ImpactLevel, vector: VectorParam) -> Cal {
    CAL_MATRIX[impact.row()][vector as usize]
}
