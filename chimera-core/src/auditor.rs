//! Cognitive Auditor - the red team for an analyst's chain
//!
//! A fixed, ordered list of independent rules. Each rule looks at the chain
//! and yields zero or one finding; the auditor runs them in order and
//! concatenates the results. The order is the order findings are reported
//! in, not a priority.
//!
//! The auditor is total: any chain that passed construction, including an
//! empty one, produces a (possibly empty) list of findings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, trace};

use crate::{Chain, ThreatDomain};

/// Share of a single domain above which the chain is considered fixated
pub const MONO_DOMAIN_RATIO: f64 = 0.75;

/// Minimum signal count before domain fixation is judged
pub const MONO_DOMAIN_MIN_NODES: usize = 3;

/// Mean confidence above which a sparse chain is closing too early
pub const PREMATURE_CLOSURE_CONFIDENCE: f64 = 0.8;

/// Chains with fewer signals than this can close prematurely
pub const PREMATURE_CLOSURE_MAX_NODES: usize = 4;

/// Fraction of the minimal path's links a chain must carry
pub const LINKAGE_RATIO: f64 = 0.5;

/// Closed set of structural and analytical biases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasType {
    /// Analysing only one domain and missing the "hybrid" aspect
    MonoDomainFixation,
    /// High confidence claimed from too few data points
    PrematureClosure,
    /// Signals exist but lack causal links
    DisconnectedNarrative,
}

impl BiasType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BiasType::MonoDomainFixation => "mono_domain_fixation",
            BiasType::PrematureClosure => "premature_closure",
            BiasType::DisconnectedNarrative => "disconnected_narrative",
        }
    }
}

impl fmt::Display for BiasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A specific cognitive or structural weakness in the assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub bias_type: BiasType,
    /// 0.0 - 1.0, where 1.0 is a critical analytical failure
    pub severity: f64,
    pub description: String,
    pub remediation_hint: String,
}

/// A single audit rule
pub type Rule = fn(&Chain) -> Option<Finding>;

/// Rules in evaluation order
pub const RULES: &[(BiasType, Rule)] = &[
    (BiasType::MonoDomainFixation, mono_domain_fixation),
    (BiasType::PrematureClosure, premature_closure),
    (BiasType::DisconnectedNarrative, disconnected_narrative),
];

/// Stateless rule evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct CognitiveAuditor;

impl CognitiveAuditor {
    pub fn new() -> Self {
        Self
    }

    /// Run every rule against the chain, in order
    pub fn audit(&self, chain: &Chain) -> Vec<Finding> {
        let findings: Vec<Finding> = RULES
            .iter()
            .filter_map(|(bias, rule)| {
                let finding = rule(chain);
                trace!(rule = %bias, fired = finding.is_some(), "evaluated audit rule");
                finding
            })
            .collect();

        debug!(chain = %chain.id(), findings = findings.len(), "audit complete");
        findings
    }
}

/// Convenience wrapper around [`CognitiveAuditor::audit`]
pub fn audit(chain: &Chain) -> Vec<Finding> {
    CognitiveAuditor::new().audit(chain)
}

/// Most frequent domain and its count.
///
/// Ties go to the lowest domain ordinal: the map iterates in ordinal order
/// and only a strictly larger count replaces the current leader.
pub fn dominant_domain(chain: &Chain) -> Option<(ThreatDomain, usize)> {
    let mut counts: BTreeMap<ThreatDomain, usize> = BTreeMap::new();
    for signal in chain.nodes().values() {
        *counts.entry(signal.domain()).or_insert(0) += 1;
    }

    let mut leader: Option<(ThreatDomain, usize)> = None;
    for (domain, count) in counts {
        match leader {
            Some((_, best)) if count <= best => {}
            _ => leader = Some((domain, count)),
        }
    }
    leader
}

/// Fires when more than 75% of signals (strictly) share one domain and the
/// chain has more than three signals. Severity is `0.8 * share`.
pub fn mono_domain_fixation(chain: &Chain) -> Option<Finding> {
    let node_count = chain.node_count();
    if node_count <= MONO_DOMAIN_MIN_NODES {
        return None;
    }

    let (domain, count) = dominant_domain(chain)?;
    let ratio = count as f64 / node_count as f64;
    if ratio <= MONO_DOMAIN_RATIO {
        return None;
    }

    Some(Finding {
        bias_type: BiasType::MonoDomainFixation,
        severity: 0.8 * ratio,
        description: format!(
            "Analysis is heavily skewed ({:.0}%) towards {}.",
            ratio * 100.0,
            domain.as_str().to_uppercase()
        ),
        remediation_hint:
            "Force-collect signals from at least one adjacent domain (e.g., Economic or Social)."
                .to_string(),
    })
}

/// Fires when fewer than four signals carry a mean confidence above 0.8
pub fn premature_closure(chain: &Chain) -> Option<Finding> {
    let node_count = chain.node_count();
    let mean = chain.mean_confidence();
    if node_count >= PREMATURE_CLOSURE_MAX_NODES || mean <= PREMATURE_CLOSURE_CONFIDENCE {
        return None;
    }

    Some(Finding {
        bias_type: BiasType::PrematureClosure,
        severity: 0.7,
        description: format!(
            "High aggregate confidence ({:.2}) claimed with sparse data points ({} signal{}).",
            mean,
            node_count,
            if node_count == 1 { "" } else { "s" }
        ),
        remediation_hint: "Reduce confidence or corroborate with independent sources.".to_string(),
    })
}

/// Fires when more than two signals have fewer links than half a minimal
/// path through them (`edges < 0.5 * (nodes - 1)`).
pub fn disconnected_narrative(chain: &Chain) -> Option<Finding> {
    let node_count = chain.node_count();
    if node_count <= 2 {
        return None;
    }

    let needed = (node_count - 1) as f64 * LINKAGE_RATIO;
    let edge_count = chain.edge_count();
    if edge_count as f64 >= needed {
        return None;
    }

    Some(Finding {
        bias_type: BiasType::DisconnectedNarrative,
        severity: 0.6,
        description: format!(
            "Signals are isolated: {} link(s) across {} signals, at least {} needed. Causal logic is missing.",
            edge_count,
            node_count,
            needed.ceil() as usize
        ),
        remediation_hint:
            "Use the 'link' command to define how Signal A causes/relates to Signal B.".to_string(),
    })
}
