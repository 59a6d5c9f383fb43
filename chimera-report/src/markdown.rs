//! Markdown situation report
//!
//! Layout:
//! - header with chain metadata and the two metrics
//! - signals grouped by domain, chronological within a domain
//! - causal links in the order they were asserted
//! - one section per audit finding

use chimera_core::{Chain, Finding, Signal, ThreatDomain};
use chrono::Utc;
use tracing::debug;

/// Render the full report
pub fn render(chain: &Chain, findings: &[Finding], urgency: f64) -> String {
    let mut md = String::new();

    md.push_str(&render_header(chain, urgency));
    md.push('\n');
    md.push_str(&render_signals(chain));
    md.push('\n');
    md.push_str(&render_links(chain));
    md.push('\n');
    md.push_str(&render_findings(findings));
    md.push('\n');
    md.push_str(&render_footer());

    debug!(chain = %chain.id(), bytes = md.len(), "rendered markdown report");
    md
}

fn render_header(chain: &Chain, urgency: f64) -> String {
    let domains = chain
        .domain_mix()
        .iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut md = format!("# Situation Report: {}\n\n", chain.name());
    md.push_str("| Field | Value |\n");
    md.push_str("|-------|-------|\n");
    md.push_str(&format!("| Chain ID | `{}` |\n", chain.id()));
    md.push_str(&format!(
        "| Created | {} |\n",
        chain.created_at().format("%Y-%m-%d %H:%M UTC")
    ));
    md.push_str(&format!(
        "| Updated | {} |\n",
        chain.updated_at().format("%Y-%m-%d %H:%M UTC")
    ));
    md.push_str(&format!("| Signals | {} |\n", chain.node_count()));
    md.push_str(&format!("| Links | {} |\n", chain.edge_count()));
    md.push_str(&format!(
        "| Coherence (CCS) | {:.2} |\n",
        chain.coherence_score()
    ));
    md.push_str(&format!(
        "| Pressure (IAP, urgency {:.1}) | {:.2} |\n",
        urgency,
        chain.calculate_pressure(urgency)
    ));
    md.push_str(&format!(
        "| Domains | {} |\n",
        if domains.is_empty() { "-" } else { domains.as_str() }
    ));
    md
}

fn render_signals(chain: &Chain) -> String {
    let mut md = String::from("## Signals\n\n");

    if chain.node_count() == 0 {
        md.push_str("_No signals collected yet._\n");
        return md;
    }

    let timeline = chain.signals_chronological();
    for domain in ThreatDomain::ALL {
        let in_domain: Vec<&&Signal> = timeline.iter().filter(|s| s.domain() == domain).collect();
        if in_domain.is_empty() {
            continue;
        }

        md.push_str(&format!("### {}\n\n", capitalize(domain.as_str())));
        md.push_str("| Observed | Type | Confidence | Cost | Description |\n");
        md.push_str("|----------|------|------------|------|-------------|\n");
        for s in in_domain {
            md.push_str(&format!(
                "| {} | {} | {:.2} | {:.2} | {} |\n",
                s.timestamp().format("%Y-%m-%d %H:%M"),
                escape_cell(s.signal_type()),
                s.confidence(),
                s.cost_estimate(),
                escape_cell(s.description())
            ));
        }
        md.push('\n');
    }
    md
}

fn render_links(chain: &Chain) -> String {
    let mut md = String::from("## Causal Links\n\n");

    if chain.edge_count() == 0 {
        md.push_str("_No causal links asserted._\n");
        return md;
    }

    for (idx, link) in chain.edges().iter().enumerate() {
        let source = chain.node(&link.source_id()).map_or("?", |s| s.signal_type());
        let target = chain.node(&link.target_id()).map_or("?", |s| s.signal_type());
        md.push_str(&format!(
            "{}. **{}** --{}--> **{}** (weight {:.2})\n   - {}\n",
            idx + 1,
            single_line(source),
            link.relation_type(),
            single_line(target),
            link.weight(),
            single_line(link.justification())
        ));
    }
    md
}

fn render_findings(findings: &[Finding]) -> String {
    let mut md = String::from("## Anomalies\n\n");

    if findings.is_empty() {
        md.push_str("No structural biases detected.\n");
        return md;
    }

    for finding in findings {
        md.push_str(&format!(
            "### {} {}\n\n",
            severity_marker(finding.severity),
            finding.bias_type.as_str().to_uppercase()
        ));
        md.push_str(&format!("- **Severity:** {:.2}\n", finding.severity));
        md.push_str(&format!("- **Finding:** {}\n", finding.description));
        md.push_str(&format!("- **Remediation:** {}\n\n", finding.remediation_hint));
    }
    md
}

fn render_footer() -> String {
    format!(
        "---\n_Generated by CHIMERA Nexus on {}_\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    )
}

fn severity_marker(severity: f64) -> &'static str {
    if severity > 0.7 {
        "🔴"
    } else {
        "🟡"
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

fn escape_cell(text: &str) -> String {
    single_line(text).replace('|', "\\|")
}
