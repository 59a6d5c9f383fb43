//! Derived chain metrics
//!
//! - Coherence Score (CCS): how well the causal narrative hangs together
//! - Information Pressure (IAP): urgency under uncertainty
//!
//! Both are pure functions of the chain state and round to two decimals,
//! so identical chains always produce bit-identical results.

use crate::{Chain, CONFIDENCE_FLOOR};

/// Round half away from zero to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Chain Coherence Score.
///
/// `avg_weight * min(1, edges / (nodes - 1))`. A minimal path through N
/// signals needs N-1 links, which is the reference density of 1.0; links
/// beyond that do not raise the score.
pub fn coherence_score(chain: &Chain) -> f64 {
    let edges = chain.edges();
    if edges.is_empty() {
        return 0.0;
    }

    let node_count = chain.node_count();
    if node_count < 2 {
        return 0.0;
    }

    let avg_weight = edges.iter().map(|e| e.weight()).sum::<f64>() / edges.len() as f64;
    let density = edges.len() as f64 / (node_count - 1) as f64;

    round2(avg_weight * density.min(1.0))
}

/// Information Asymmetry Pressure.
///
/// `urgency / max(0.1, mean confidence)`; the floor keeps near-zero
/// confidence from producing unbounded pressure.
pub fn information_pressure(chain: &Chain, urgency: f64) -> f64 {
    if chain.node_count() == 0 {
        return 0.0;
    }

    let safe_conf = chain.mean_confidence().max(CONFIDENCE_FLOOR);
    round2(urgency / safe_conf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Link, RelationType, Signal, ThreatDomain};

    fn signal(domain: ThreatDomain, confidence: f64) -> Signal {
        Signal::builder(domain, "indicator")
            .confidence(confidence)
            .build()
            .unwrap()
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.333), 0.33);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(40.0), 40.0);
    }

    #[test]
    fn test_pressure_single_low_confidence_node() {
        let mut chain = Chain::new("Pressure Test").unwrap();
        chain.add_node(signal(ThreatDomain::Information, 0.2));

        assert_eq!(information_pressure(&chain, 8.0), 40.0);
    }

    #[test]
    fn test_pressure_matches_formula_for_single_node() {
        for (conf, urgency) in [(0.05, 3.0), (0.1, 1.0), (0.37, 7.5), (1.0, 2.0)] {
            let mut chain = Chain::new("Formula").unwrap();
            chain.add_node(signal(ThreatDomain::Cyber, conf));
            let expected = round2(urgency / f64::max(0.1, conf));
            assert_eq!(chain.calculate_pressure(urgency), expected);
        }
    }

    #[test]
    fn test_pressure_floor_applies() {
        let mut chain = Chain::new("Floor").unwrap();
        chain.add_node(signal(ThreatDomain::Cyber, 0.0));
        assert_eq!(chain.calculate_pressure(5.0), 50.0);
    }

    #[test]
    fn test_pressure_empty_chain() {
        let chain = Chain::new("Empty").unwrap();
        assert_eq!(information_pressure(&chain, 9.0), 0.0);
    }

    #[test]
    fn test_coherence_zero_without_edges() {
        let mut chain = Chain::new("No links").unwrap();
        chain.add_node(signal(ThreatDomain::Cyber, 0.9));
        chain.add_node(signal(ThreatDomain::Social, 0.9));
        assert_eq!(coherence_score(&chain), 0.0);
    }

    #[test]
    fn test_coherence_zero_with_single_node() {
        let mut chain = Chain::new("Self loop").unwrap();
        let only = signal(ThreatDomain::Cyber, 0.9);
        let id = only.id();
        chain.add_node(only);
        chain
            .add_edge(Link::new(id, id, RelationType::Correlation, "loop"))
            .unwrap();

        assert_eq!(chain.edge_count(), 1);
        assert_eq!(coherence_score(&chain), 0.0);
    }

    #[test]
    fn test_coherence_partial_density_and_weight() {
        let mut chain = Chain::new("Partial").unwrap();
        let nodes: Vec<Signal> = (0..5).map(|_| signal(ThreatDomain::Cyber, 0.5)).collect();
        let ids: Vec<_> = nodes.iter().map(|n| n.id()).collect();
        for n in nodes {
            chain.add_node(n);
        }
        chain
            .add_edge(Link::weighted(ids[0], ids[1], RelationType::Enablement, 0.5, "a").unwrap())
            .unwrap();
        chain
            .add_edge(Link::new(ids[1], ids[2], RelationType::Enablement, "b"))
            .unwrap();

        // avg weight 0.75, density 2/4
        assert_eq!(coherence_score(&chain), 0.38);
    }

    #[test]
    fn test_coherence_density_capped() {
        let mut chain = Chain::new("Over-linked").unwrap();
        let a = signal(ThreatDomain::Cyber, 0.5);
        let b = signal(ThreatDomain::Economic, 0.5);
        let (ia, ib) = (a.id(), b.id());
        chain.add_node(a);
        chain.add_node(b);
        for _ in 0..4 {
            chain
                .add_edge(Link::weighted(ia, ib, RelationType::Amplification, 0.8, "x").unwrap())
                .unwrap();
        }
        assert_eq!(coherence_score(&chain), 0.8);
    }

    #[test]
    fn test_metrics_are_repeatable() {
        let mut chain = Chain::new("Repeat").unwrap();
        for c in [0.33, 0.71, 0.12] {
            chain.add_node(signal(ThreatDomain::Political, c));
        }
        let first = chain.calculate_pressure(6.3);
        for _ in 0..10 {
            assert_eq!(chain.calculate_pressure(6.3).to_bits(), first.to_bits());
        }
    }
}
