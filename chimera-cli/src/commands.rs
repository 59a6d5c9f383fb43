//! Command handlers
//!
//! Each handler receives the repository explicitly and returns what it
//! produced, leaving printing to `main`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use chimera_core::{
    audit, Chain, Finding, Link, RelationType, Signal, ThreatDomain,
};
use chimera_report::{dot, export_file_stem, markdown, ExportFormat};
use chimera_store::ChainRepository;

/// Fields of a new signal as collected from the command line
#[derive(Debug, Clone)]
pub struct NewSignal {
    pub domain: ThreatDomain,
    pub signal_type: String,
    pub description: String,
    pub confidence: f64,
    pub cost: f64,
    pub observed_at: DateTime<Utc>,
}

/// Fields of a new link as collected from the command line
#[derive(Debug, Clone)]
pub struct NewLink {
    pub source: Uuid,
    pub target: Uuid,
    pub relation: RelationType,
    pub weight: f64,
    pub justification: String,
}

/// Initialize a new hybrid threat chain
pub fn init(repo: &dyn ChainRepository, name: &str) -> Result<(Chain, PathBuf)> {
    let chain = Chain::new(name)?;
    let path = repo.save(&chain)?;
    info!("Initialized chain '{}' ({})", chain.name(), chain.id());
    Ok((chain, path))
}

/// Every stored chain
pub fn list(repo: &dyn ChainRepository) -> Result<Vec<Chain>> {
    Ok(repo.list()?)
}

/// Add a signal to a stored chain and persist it
pub fn add_signal(repo: &dyn ChainRepository, chain_id: Uuid, new: NewSignal) -> Result<Signal> {
    let mut chain = repo.load(chain_id)?;

    let signal = Signal::builder(new.domain, new.signal_type)
        .confidence(new.confidence)
        .cost_estimate(new.cost)
        .description(new.description)
        .observed_at(new.observed_at)
        .build()?;

    chain.add_node(signal.clone());
    repo.save(&chain)?;
    info!("Signal {} integrated into '{}'", signal.id(), chain.name());
    Ok(signal)
}

/// Create a causal link between two signals of a stored chain
pub fn link(repo: &dyn ChainRepository, chain_id: Uuid, new: NewLink) -> Result<Link> {
    if new.source == new.target {
        bail!("Cannot link a signal to itself.");
    }

    let mut chain = repo.load(chain_id)?;
    let link = Link::weighted(
        new.source,
        new.target,
        new.relation,
        new.weight,
        new.justification,
    )?;

    chain.add_edge(link.clone())?;
    repo.save(&chain)?;
    info!(
        "Linked {} -> {} ({}) in '{}'",
        link.source_id(),
        link.target_id(),
        link.relation_type(),
        chain.name()
    );
    Ok(link)
}

/// Load a chain for inspection
pub fn inspect(repo: &dyn ChainRepository, chain_id: Uuid) -> Result<Chain> {
    Ok(repo.load(chain_id)?)
}

/// Run the cognitive auditor on a stored chain
pub fn run_audit(repo: &dyn ChainRepository, chain_id: Uuid) -> Result<(Chain, Vec<Finding>)> {
    let chain = repo.load(chain_id)?;
    let findings = audit(&chain);
    Ok((chain, findings))
}

/// Write a decision-support artifact for a stored chain
pub fn export(
    repo: &dyn ChainRepository,
    chain_id: Uuid,
    format: ExportFormat,
    output_dir: &Path,
    urgency: f64,
) -> Result<PathBuf> {
    let chain = repo.load(chain_id)?;

    let content = match format {
        ExportFormat::Markdown => {
            // Reports always carry a fresh audit
            let findings = audit(&chain);
            markdown::render(&chain, &findings, urgency)
        }
        ExportFormat::Dot => dot::render(&chain),
    };

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;
    let out_path = output_dir.join(format!("{}.{}", export_file_stem(&chain), format.extension()));
    fs::write(&out_path, content)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    info!("Exported '{}' to {}", chain.name(), out_path.display());
    Ok(out_path)
}

/// Build the "Blue Sky" training scenario: a rumor about bank solvency,
/// amplified by a DDoS on the login portal, triggering a stock dip.
/// The stock dip is observed at `now`, the other signals shortly before.
pub fn training_scenario(now: DateTime<Utc>) -> Result<Chain> {
    let tag = Uuid::new_v4().simple().to_string();
    let mut chain = Chain::new(format!("Exercise_Blue_Sky_{}", &tag[..4]))?;

    let rumor = Signal::builder(ThreatDomain::Information, "social_media_rumor")
        .confidence(0.6)
        .description("Leaked false documents about bank solvency.")
        .observed_at(now - Duration::hours(2))
        .build()?;
    let ddos = Signal::builder(ThreatDomain::Cyber, "ddos_probe")
        .confidence(0.9)
        .description("High traffic on banking login portal.")
        .observed_at(now - Duration::hours(1))
        .build()?;
    let dip = Signal::builder(ThreatDomain::Economic, "stock_dip")
        .confidence(0.8)
        .description("Bank stock drops 4% in pre-market.")
        .observed_at(now)
        .build()?;

    let (rumor_id, ddos_id, dip_id) = (rumor.id(), ddos.id(), dip.id());
    chain.add_node(rumor);
    chain.add_node(ddos);
    chain.add_node(dip);

    chain.add_edge(Link::new(
        rumor_id,
        dip_id,
        RelationType::Triggering,
        "Panic selling driven by rumor.",
    ))?;
    chain.add_edge(Link::new(
        ddos_id,
        rumor_id,
        RelationType::Amplification,
        "Service outage validates the fake documents.",
    ))?;

    Ok(chain)
}

/// Generate and persist the training scenario
pub fn simulate(repo: &dyn ChainRepository) -> Result<(Chain, PathBuf)> {
    let chain = training_scenario(Utc::now())?;
    let path = repo.save(&chain)?;
    info!("Generated training scenario '{}'", chain.name());
    Ok((chain, path))
}

/// Remove a stored chain
pub fn delete(repo: &dyn ChainRepository, chain_id: Uuid) -> Result<()> {
    repo.delete(chain_id)?;
    Ok(())
}
