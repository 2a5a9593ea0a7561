//! Attack technique catalog
//!
//! A rule pairs a [`Technique`] with a list of [`Predicate`]s over the first
//! entity, the terminal entity and the path labels. All predicates of a rule
//! must hold; rules are independent and evaluated in catalog order.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Catalog loading errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rule {id}: confidence {value} outside [0, 1]")]
    InvalidConfidence { id: String, value: f64 },

    #[error("Rule without an id")]
    MissingId,

    #[error("Rule {0} has no predicates")]
    NoPredicates(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    pub url: String,
}

/// Static description of an attack technique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    /// Heuristic confidence in [0, 1]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

/// Keyword test over one part of a path.
///
/// A predicate holds when any of its keywords is a case-insensitive
/// substring of the inspected text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// First entity's technology tag (or label)
    First(Vec<String>),
    /// Terminal entity's technology tag (or label, or id)
    Last(Vec<String>),
    /// Space-joined labels of the whole path
    PathContains(Vec<String>),
}

impl Predicate {
    pub fn first(keywords: &[&str]) -> Self {
        Predicate::First(keywords.iter().map(|k| k.to_lowercase()).collect())
    }

    pub fn last(keywords: &[&str]) -> Self {
        Predicate::Last(keywords.iter().map(|k| k.to_lowercase()).collect())
    }

    pub fn path_contains(keywords: &[&str]) -> Self {
        Predicate::PathContains(keywords.iter().map(|k| k.to_lowercase()).collect())
    }

    pub fn keywords(&self) -> &[String] {
        match self {
            Predicate::First(k) | Predicate::Last(k) | Predicate::PathContains(k) => k,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackRule {
    #[serde(flatten)]
    pub technique: Technique,
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub when: Vec<Predicate>,
}

impl AttackRule {
    fn validate(&self) -> CatalogResult<()> {
        if self.technique.id.trim().is_empty() {
            return Err(CatalogError::MissingId);
        }
        if !(0.0..=1.0).contains(&self.technique.confidence) {
            return Err(CatalogError::InvalidConfidence {
                id: self.technique.id.clone(),
                value: self.technique.confidence,
            });
        }
        if self.when.is_empty() {
            return Err(CatalogError::NoPredicates(self.technique.id.clone()));
        }
        Ok(())
    }
}

fn technique(
    id: &str,
    title: &str,
    description: &str,
    severity: Severity,
    confidence: f64,
    references: &[(&str, &str)],
) -> Technique {
    Technique {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        severity,
        confidence,
        references: references
            .iter()
            .map(|(title, url)| Reference { title: title.to_string(), url: url.to_string() })
            .collect(),
    }
}

/// Ordered list of attack rules
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttackCatalog {
    rules: Vec<AttackRule>,
}

impl AttackCatalog {
    pub fn new(rules: Vec<AttackRule>) -> CatalogResult<Self> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    /// The built-in embedded-device and web rules
    pub fn builtin() -> Self {
        let uart = Predicate::first(&["uart"]);
        let ble = Predicate::first(&["ble"]);
        let to_linux = Predicate::last(&["linux"]);
        let to_spi = Predicate::last(&["spi"]);

        let rules = vec![
            AttackRule {
                technique: technique(
                    "uart-linux-bruteforce",
                    "Crack UART console password",
                    "Attempt password brute-force or default credentials on the UART login to obtain shell access.",
                    Severity::High,
                    0.7,
                    &[("Common IoT UART Attacks", "https://owasp.org/www-project-iot/")],
                ),
                when: vec![uart.clone(), to_linux.clone()],
            },
            AttackRule {
                technique: technique(
                    "uart-bootloader-interrupt",
                    "Interrupt bootloader via UART and spawn root shell",
                    "Interrupt U-Boot/bootloader over UART, modify bootargs/init to obtain a privileged shell.",
                    Severity::High,
                    0.6,
                    &[("U-Boot Bootargs Tricks", "https://u-boot.readthedocs.io/")],
                ),
                when: vec![uart.clone(), to_linux.clone()],
            },
            AttackRule {
                technique: technique(
                    "uart-linux-spi-dump",
                    "Pivot from UART shell to dump SPI device",
                    "Use UART-obtained shell on Linux to access SPI device nodes (e.g., /dev/spidev*), dump firmware/config or issue malicious writes.",
                    Severity::High,
                    0.65,
                    &[("spidev Userspace", "https://www.kernel.org/doc/Documentation/spi/spidev")],
                ),
                when: vec![uart, to_spi],
            },
            AttackRule {
                technique: technique(
                    "ble-mitm-keys",
                    "BLE pairing MITM to derive keys",
                    "Perform BLE MITM during pairing to capture/derive long-term keys, then access services on the Linux device.",
                    Severity::Medium,
                    0.5,
                    &[],
                ),
                when: vec![ble, to_linux],
            },
            AttackRule {
                technique: technique(
                    "web-credential-stuffing",
                    "Credential stuffing via exposed HTTP endpoint",
                    "Leverage reused credentials against exposed HTTP services en route to the target.",
                    Severity::Medium,
                    0.4,
                    &[],
                ),
                when: vec![Predicate::path_contains(&["http"])],
            },
        ];
        Self { rules }
    }

    /// Parse a YAML list of rules
    pub fn from_yaml_str(yaml: &str) -> CatalogResult<Self> {
        let mut rules: Vec<AttackRule> = serde_yaml::from_str(yaml)?;
        for rule in &mut rules {
            for predicate in &mut rule.when {
                let keywords = match predicate {
                    Predicate::First(k) | Predicate::Last(k) | Predicate::PathContains(k) => k,
                };
                for keyword in keywords.iter_mut() {
                    *keyword = keyword.to_lowercase();
                }
            }
        }
        Self::new(rules)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> CatalogResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Append another catalog's rules after this one's
    pub fn extend(&mut self, other: AttackCatalog) {
        self.rules.extend(other.rules);
    }

    pub fn rules(&self) -> &[AttackRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
