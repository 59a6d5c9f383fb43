//! Graphviz DOT export
//!
//! One cluster per domain present in the chain, one labelled vertex per
//! signal, one labelled edge per link. Render with
//! `dot -Tpng chain.dot -o chain.png`.

use chimera_core::{Chain, ThreatDomain};
use tracing::debug;

/// Fill colour for a domain's vertices
fn domain_color(domain: ThreatDomain) -> &'static str {
    match domain {
        ThreatDomain::Cyber => "#8ecae6",
        ThreatDomain::Information => "#ffb703",
        ThreatDomain::Economic => "#90be6d",
        ThreatDomain::Political => "#cdb4db",
        ThreatDomain::Social => "#f4a261",
        ThreatDomain::Physical => "#adb5bd",
        ThreatDomain::Psychological => "#ff8fab",
    }
}

/// Escape a string for use inside a double-quoted DOT id or label
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Render the chain as a directed graph
pub fn render(chain: &Chain) -> String {
    let mut dot = String::new();

    dot.push_str(&format!("digraph \"{}\" {{\n", escape(chain.name())));
    dot.push_str("    rankdir=LR;\n");
    dot.push_str("    node [shape=box, style=\"rounded,filled\", fontname=\"Helvetica\"];\n");
    dot.push_str("    edge [fontname=\"Helvetica\", fontsize=10];\n\n");

    let timeline = chain.signals_chronological();
    for domain in chain.domain_mix() {
        dot.push_str(&format!("    subgraph \"cluster_{}\" {{\n", domain));
        dot.push_str(&format!("        label=\"{}\";\n", domain.as_str().to_uppercase()));
        dot.push_str("        style=dashed;\n");

        for signal in timeline.iter().filter(|s| s.domain() == domain) {
            dot.push_str(&format!(
                "        \"{}\" [label=\"{}\\n({:.2})\", fillcolor=\"{}\"];\n",
                signal.id(),
                escape(signal.signal_type()),
                signal.confidence(),
                domain_color(domain)
            ));
        }
        dot.push_str("    }\n\n");
    }

    for link in chain.edges() {
        dot.push_str(&format!(
            "    \"{}\" -> \"{}\" [label=\"{}\", penwidth={:.1}];\n",
            link.source_id(),
            link.target_id(),
            link.relation_type(),
            1.0 + 2.0 * link.weight()
        ));
    }

    dot.push_str("}\n");

    debug!(chain = %chain.id(), "rendered graphviz description");
    dot
}
