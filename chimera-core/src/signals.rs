//! Signals and links - the vertices and edges of a hybrid threat chain
//!
//! Both are read-only value records. Fields are only reachable through
//! accessors; an "edit" builds a new value and replaces the old one in
//! the owning [`Chain`](crate::Chain).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{round2, ConstructionError, RelationType, ThreatDomain};
use crate::{DEFAULT_LINK_WEIGHT, MIN_SIGNAL_TYPE_LEN};

/// A single observed event or indicator in one threat domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Unique signal ID
    id: Uuid,

    /// When the signal was observed
    timestamp: DateTime<Utc>,

    domain: ThreatDomain,

    /// Free-form classification (e.g. "ddos_probe")
    signal_type: String,

    /// Analyst confidence (0.0 - 1.0), two decimals
    confidence: f64,

    /// Normalized resource cost for the actor
    #[serde(default)]
    cost_estimate: f64,

    /// Short analytical summary
    description: String,
}

impl Signal {
    /// Create a new signal builder
    pub fn builder(domain: ThreatDomain, signal_type: impl Into<String>) -> SignalBuilder {
        SignalBuilder::new(domain, signal_type)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn domain(&self) -> ThreatDomain {
        self.domain
    }

    pub fn signal_type(&self) -> &str {
        &self.signal_type
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn cost_estimate(&self) -> f64 {
        self.cost_estimate
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Re-check the construction invariants on a value that did not come
    /// through the builder (e.g. a deserialized snapshot).
    pub fn validate(&self) -> Result<(), ConstructionError> {
        check_confidence(self.confidence)?;
        if round2(self.confidence) != self.confidence {
            return Err(ConstructionError::ConfidenceNotRounded(self.confidence));
        }
        check_cost(self.cost_estimate)?;
        check_signal_type(&self.signal_type)
    }
}

/// Builder for signals
#[derive(Debug, Clone)]
pub struct SignalBuilder {
    domain: ThreatDomain,
    signal_type: String,
    confidence: f64,
    cost_estimate: f64,
    description: String,
    observed_at: Option<DateTime<Utc>>,
}

impl SignalBuilder {
    pub fn new(domain: ThreatDomain, signal_type: impl Into<String>) -> Self {
        Self {
            domain,
            signal_type: signal_type.into(),
            confidence: 0.5,
            cost_estimate: 0.0,
            description: String::new(),
            observed_at: None,
        }
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn cost_estimate(mut self, cost: f64) -> Self {
        self.cost_estimate = cost;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Pin the observation time. Without it, `build` stamps the current time.
    pub fn observed_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.observed_at = Some(timestamp);
        self
    }

    /// Validate every field and produce the signal.
    ///
    /// Confidence is range-checked first and then rounded to two decimals.
    pub fn build(self) -> Result<Signal, ConstructionError> {
        check_confidence(self.confidence)?;
        check_cost(self.cost_estimate)?;
        check_signal_type(&self.signal_type)?;

        Ok(Signal {
            id: Uuid::new_v4(),
            timestamp: self.observed_at.unwrap_or_else(Utc::now),
            domain: self.domain,
            signal_type: self.signal_type,
            confidence: round2(self.confidence),
            cost_estimate: self.cost_estimate,
            description: self.description,
        })
    }
}

/// A claimed causal or correlative relationship between two signals.
///
/// Endpoints are held by identifier only; a link means nothing outside the
/// chain that accepted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    source_id: Uuid,
    target_id: Uuid,
    relation_type: RelationType,

    /// Strength of the connection (0.0 - 1.0)
    #[serde(default = "default_weight")]
    weight: f64,

    /// Why does this link exist?
    justification: String,
}

fn default_weight() -> f64 {
    DEFAULT_LINK_WEIGHT
}

impl Link {
    /// A full-strength link
    pub fn new(
        source_id: Uuid,
        target_id: Uuid,
        relation_type: RelationType,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            source_id,
            target_id,
            relation_type,
            weight: DEFAULT_LINK_WEIGHT,
            justification: justification.into(),
        }
    }

    /// A link with an explicit strength
    pub fn weighted(
        source_id: Uuid,
        target_id: Uuid,
        relation_type: RelationType,
        weight: f64,
        justification: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        check_weight(weight)?;
        Ok(Self {
            weight,
            ..Self::new(source_id, target_id, relation_type, justification)
        })
    }

    pub fn source_id(&self) -> Uuid {
        self.source_id
    }

    pub fn target_id(&self) -> Uuid {
        self.target_id
    }

    pub fn relation_type(&self) -> RelationType {
        self.relation_type
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn justification(&self) -> &str {
        &self.justification
    }

    pub fn validate(&self) -> Result<(), ConstructionError> {
        check_weight(self.weight)
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConstructionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConstructionError::NonFinite { field, value })
    }
}

fn check_confidence(confidence: f64) -> Result<(), ConstructionError> {
    check_finite("confidence", confidence)?;
    if (0.0..=1.0).contains(&confidence) {
        Ok(())
    } else {
        Err(ConstructionError::ConfidenceOutOfRange(confidence))
    }
}

fn check_cost(cost: f64) -> Result<(), ConstructionError> {
    check_finite("cost estimate", cost)?;
    if cost >= 0.0 {
        Ok(())
    } else {
        Err(ConstructionError::NegativeCost(cost))
    }
}

fn check_signal_type(signal_type: &str) -> Result<(), ConstructionError> {
    if signal_type.chars().count() >= MIN_SIGNAL_TYPE_LEN {
        Ok(())
    } else {
        Err(ConstructionError::SignalTypeTooShort {
            min: MIN_SIGNAL_TYPE_LEN,
            got: signal_type.to_string(),
        })
    }
}

fn check_weight(weight: f64) -> Result<(), ConstructionError> {
    check_finite("link weight", weight)?;
    if (0.0..=1.0).contains(&weight) {
        Ok(())
    } else {
        Err(ConstructionError::WeightOutOfRange(weight))
    }
}
