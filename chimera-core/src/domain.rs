//! Closed vocabularies for hybrid threat analysis
//!
//! Both enumerations serialise in `snake_case` and parse from the same
//! spelling, so persisted snapshots and command-line input share one form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Threat domains a signal can be observed in.
///
/// Declaration order is significant: it is the ordinal used to break ties
/// when the auditor looks for the dominant domain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ThreatDomain {
    Cyber,
    Information,
    Economic,
    Political,
    Social,
    Physical,
    Psychological,
}

impl ThreatDomain {
    /// Every domain, in ordinal order
    pub const ALL: [ThreatDomain; 7] = [
        ThreatDomain::Cyber,
        ThreatDomain::Information,
        ThreatDomain::Economic,
        ThreatDomain::Political,
        ThreatDomain::Social,
        ThreatDomain::Physical,
        ThreatDomain::Psychological,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatDomain::Cyber => "cyber",
            ThreatDomain::Information => "information",
            ThreatDomain::Economic => "economic",
            ThreatDomain::Political => "political",
            ThreatDomain::Social => "social",
            ThreatDomain::Physical => "physical",
            ThreatDomain::Psychological => "psychological",
        }
    }
}

/// Kinds of causal or correlative relationship between two signals
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Amplification,
    Enablement,
    Masking,
    Triggering,
    Correlation,
}

impl RelationType {
    pub const ALL: [RelationType; 5] = [
        RelationType::Amplification,
        RelationType::Enablement,
        RelationType::Masking,
        RelationType::Triggering,
        RelationType::Correlation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Amplification => "amplification",
            RelationType::Enablement => "enablement",
            RelationType::Masking => "masking",
            RelationType::Triggering => "triggering",
            RelationType::Correlation => "correlation",
        }
    }
}

impl fmt::Display for ThreatDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A vocabulary term that is not part of the closed set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl FromStr for ThreatDomain {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == needle)
            .ok_or_else(|| UnknownVariant {
                kind: "threat domain",
                value: s.to_string(),
                expected: Self::ALL.map(|d| d.as_str()).join(", "),
            })
    }
}

impl FromStr for RelationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == needle)
            .ok_or_else(|| UnknownVariant {
                kind: "relation type",
                value: s.to_string(),
                expected: Self::ALL.map(|r| r.as_str()).join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_parse_and_display() {
        assert_eq!("Cyber".parse::<ThreatDomain>().unwrap(), ThreatDomain::Cyber);
        assert_eq!(ThreatDomain::Psychological.to_string(), "psychological");

        let err = "kinetic".parse::<ThreatDomain>().unwrap_err();
        assert!(err.to_string().contains("kinetic"));
        assert!(err.expected.contains("information"));
    }

    #[test]
    fn test_relation_serde_spelling() {
        let json = serde_json::to_string(&RelationType::Triggering).unwrap();
        assert_eq!(json, "\"triggering\"");
        let back: RelationType = serde_json::from_str("\"masking\"").unwrap();
        assert_eq!(back, RelationType::Masking);
    }

    #[test]
    fn test_domain_ordinal_order() {
        assert!(ThreatDomain::Cyber < ThreatDomain::Information);
        assert!(ThreatDomain::Physical < ThreatDomain::Psychological);
    }
}
