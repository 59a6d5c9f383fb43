//! Terminal rendering of chains and audit findings

use chimera_core::{Chain, Finding};

/// Confidence tier shown next to each signal
pub fn confidence_tier(confidence: f64) -> &'static str {
    if confidence > 0.7 {
        "high"
    } else if confidence > 0.4 {
        "medium"
    } else {
        "low"
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Situation report for a single chain
pub fn chain_details(chain: &Chain, urgency: f64) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== NEXUS REPORT: {} ===\n", chain.name().to_uppercase()));
    out.push_str(&format!("ID:     {}\n", chain.id()));
    out.push_str(&format!(
        "Nodes:  {} | Edges: {}\n",
        chain.node_count(),
        chain.edge_count()
    ));
    out.push_str(&format!(
        "IAP (Pressure): {:.2} | Coherence: {:.2}\n\n",
        chain.calculate_pressure(urgency),
        chain.coherence_score()
    ));

    if chain.node_count() == 0 {
        out.push_str("No signals collected yet.\n");
    } else {
        out.push_str("Detected Signals (Nodes)\n");
        out.push_str(&format!(
            "{:>3}  {:<13}  {:<20}  {:>5}  {:<6}  {:<36}  {}\n",
            "#", "Domain", "Type", "Conf.", "Tier", "Id", "Description"
        ));
        for (idx, s) in chain.signals_chronological().iter().enumerate() {
            out.push_str(&format!(
                "{:>3}  {:<13}  {:<20}  {:>5.2}  {:<6}  {:<36}  {}\n",
                idx + 1,
                s.domain(),
                truncate(s.signal_type(), 20),
                s.confidence(),
                confidence_tier(s.confidence()),
                s.id(),
                s.description()
            ));
        }
    }

    if chain.edge_count() > 0 {
        out.push_str(&format!("\nActive Links ({}):\n", chain.edge_count()));
        for link in chain.edges() {
            if let (Some(src), Some(tgt)) = (chain.node(&link.source_id()), chain.node(&link.target_id())) {
                out.push_str(&format!(
                    "  └─ {} ==({})==> {}  [w={:.2}]\n",
                    src.signal_type(),
                    link.relation_type(),
                    tgt.signal_type(),
                    link.weight()
                ));
            }
        }
    }

    out
}

/// Registry table of every stored chain
pub fn chain_list(chains: &[Chain], urgency: f64) -> String {
    if chains.is_empty() {
        return "No active chains found.\n".to_string();
    }

    let mut out = String::from("CHIMERA Nexus Registry\n");
    out.push_str(&format!(
        "{:<10}  {:<28}  {:<24}  {:>5}  {:>14}\n",
        "ID (Short)", "Name", "Domains", "Nodes", "Pressure (IAP)"
    ));

    for chain in chains {
        let summary = chain.summary(urgency);
        let domains = summary
            .domains
            .iter()
            .map(|d| &d.as_str()[..3])
            .collect::<Vec<_>>()
            .join(", ");
        let id = summary.id.to_string();
        out.push_str(&format!(
            "{:<10}  {:<28}  {:<24}  {:>5}  {:>14.2}\n",
            &id[..8],
            truncate(&summary.name, 28),
            domains,
            summary.node_count,
            summary.pressure
        ));
    }
    out
}

/// Audit outcome for a chain
pub fn audit_report(chain: &Chain, findings: &[Finding]) -> String {
    let mut out = format!("Cognitive Audit Report: {}\n", chain.name());

    if findings.is_empty() {
        out.push_str("\n✓ No structural biases detected.\n");
        return out;
    }

    out.push_str("\nDetected Anomalies\n");
    for finding in findings {
        let level = if finding.severity > 0.7 { "CRITICAL" } else { "WARNING" };
        out.push_str(&format!(
            "\n[{}] {} (severity {:.2})\n  {}\n  Fix: {}\n",
            level,
            finding.bias_type.as_str().to_uppercase(),
            finding.severity,
            finding.description,
            finding.remediation_hint
        ));
    }
    out
}
