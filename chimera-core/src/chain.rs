//! Hybrid Threat Chain - the aggregate root
//!
//! A chain owns its signals (keyed by id) and the ordered list of links
//! asserted between them:
//! - Signals and links are only ever appended
//! - Every stored link points at signals the chain holds
//! - `updated_at` never moves backwards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use uuid::Uuid;

use crate::{coherence_score, information_pressure};
use crate::{ChainError, ConstructionError, IntegrityError, Link, Signal, ThreatDomain};
use crate::MIN_CHAIN_NAME_LEN;

/// The primary operational unit: signals and links modelling one threat vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    id: Uuid,
    name: String,

    /// Signals keyed by their own id
    #[serde(default)]
    nodes: BTreeMap<Uuid, Signal>,

    /// Links in the order the causal claims were made
    #[serde(default)]
    edges: Vec<Link>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Chain {
    /// Create an empty chain
    pub fn new(name: impl Into<String>) -> Result<Self, ConstructionError> {
        let name = name.into();
        check_name(&name)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &BTreeMap<Uuid, Signal> {
        &self.nodes
    }

    pub fn edges(&self) -> &[Link] {
        &self.edges
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn node(&self, id: &Uuid) -> Option<&Signal> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Insert a signal under its id.
    ///
    /// A signal whose id is already present overwrites the earlier one.
    pub fn add_node(&mut self, signal: Signal) {
        debug!(chain = %self.id, signal = %signal.id(), domain = %signal.domain(), "adding signal");
        self.nodes.insert(signal.id(), signal);
        self.touch();
    }

    /// Replace a signal with an edited copy carrying the same id
    pub fn replace_node(&mut self, signal: Signal) {
        self.add_node(signal);
    }

    /// Append a link after checking both endpoints exist.
    ///
    /// On failure the chain is left exactly as it was.
    pub fn add_edge(&mut self, link: Link) -> Result<(), IntegrityError> {
        self.check_endpoints(&link)?;

        debug!(
            chain = %self.id,
            source = %link.source_id(),
            target = %link.target_id(),
            relation = %link.relation_type(),
            "adding link"
        );
        self.edges.push(link);
        self.touch();
        Ok(())
    }

    /// Distinct domains present among the signals, in ordinal order
    pub fn domain_mix(&self) -> Vec<ThreatDomain> {
        self.nodes
            .values()
            .map(|s| s.domain())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Mean confidence over all signals; 0.0 for an empty chain
    pub fn mean_confidence(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.nodes.values().map(|s| s.confidence()).sum::<f64>() / self.nodes.len() as f64
    }

    /// Chain Coherence Score (CCS)
    pub fn coherence_score(&self) -> f64 {
        coherence_score(self)
    }

    /// Information Asymmetry Pressure (IAP) for the given urgency
    pub fn calculate_pressure(&self, urgency: f64) -> f64 {
        information_pressure(self, urgency)
    }

    /// Signals ordered by observation time, ties broken by id
    pub fn signals_chronological(&self) -> Vec<&Signal> {
        let mut signals: Vec<&Signal> = self.nodes.values().collect();
        signals.sort_by(|a, b| a.timestamp().cmp(&b.timestamp()).then(a.id().cmp(&b.id())));
        signals
    }

    /// One-line digest for listings
    pub fn summary(&self, urgency: f64) -> ChainSummary {
        ChainSummary {
            id: self.id,
            name: self.name.clone(),
            domains: self.domain_mix(),
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            coherence: self.coherence_score(),
            pressure: self.calculate_pressure(urgency),
            updated_at: self.updated_at,
        }
    }

    /// Re-check every invariant on a chain that was not built through the
    /// mutators (e.g. a loaded snapshot).
    pub fn validate(&self) -> Result<(), ChainError> {
        check_name(&self.name)?;

        if self.updated_at < self.created_at {
            return Err(ChainError::TimestampsOutOfOrder);
        }

        for (key, signal) in &self.nodes {
            if *key != signal.id() {
                return Err(ChainError::KeyMismatch {
                    key: *key,
                    actual: signal.id(),
                });
            }
            signal.validate()?;
        }

        for link in &self.edges {
            link.validate()?;
            self.check_endpoints(link)?;
        }

        Ok(())
    }

    fn check_endpoints(&self, link: &Link) -> Result<(), IntegrityError> {
        if !self.nodes.contains_key(&link.source_id()) {
            return Err(IntegrityError::MissingSource(link.source_id()));
        }
        if !self.nodes.contains_key(&link.target_id()) {
            return Err(IntegrityError::MissingTarget(link.target_id()));
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}

fn check_name(name: &str) -> Result<(), ConstructionError> {
    if name.chars().count() >= MIN_CHAIN_NAME_LEN {
        Ok(())
    } else {
        Err(ConstructionError::ChainNameTooShort {
            min: MIN_CHAIN_NAME_LEN,
            got: name.to_string(),
        })
    }
}

/// Listing view of a chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainSummary {
    pub id: Uuid,
    pub name: String,
    pub domains: Vec<ThreatDomain>,
    pub node_count: usize,
    pub edge_count: usize,
    pub coherence: f64,
    pub pressure: f64,
    pub updated_at: DateTime<Utc>,
}
