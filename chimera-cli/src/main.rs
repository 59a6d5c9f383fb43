//! CHIMERA Nexus CLI
//!
//! Contextual Hybrid Intelligence for Monitoring, Evaluation & Risk Assessment.

mod commands;
mod config;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use chimera_core::{RelationType, ThreatDomain};
use chimera_report::ExportFormat;
use chimera_store::FileRepository;

use commands::{NewLink, NewSignal};
use config::NexusConfig;

#[derive(Parser)]
#[command(name = "chimera-nexus")]
#[command(author, version, about = "CHIMERA Nexus: hybrid threat chain analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1", global = true)]
    verbose: u8,

    /// Configuration file (TOML)
    #[arg(long, env = "CHIMERA_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file)
    #[arg(long, env = "CHIMERA_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new hybrid threat chain
    Init {
        /// Chain name (at least 3 characters)
        name: String,
    },

    /// List all chains in the registry
    List,

    /// Add a signal to a chain
    AddSignal {
        chain_id: Uuid,

        /// Threat domain (cyber, information, economic, political, social, physical, psychological)
        #[arg(short, long)]
        domain: ThreatDomain,

        /// Signal classification (e.g. ddos, misinformation)
        #[arg(short = 't', long)]
        signal_type: String,

        /// Short analytical summary
        #[arg(long, default_value = "")]
        description: String,

        /// Analyst confidence (0.0 - 1.0)
        #[arg(short, long, default_value = "0.5")]
        confidence: f64,

        /// Normalized resource cost for the actor
        #[arg(long, default_value = "0.0")]
        cost: f64,

        /// When the signal was observed (RFC 3339, default: now)
        #[arg(long)]
        observed_at: Option<DateTime<Utc>>,
    },

    /// Create a causal link between two signals
    Link {
        chain_id: Uuid,

        /// Source signal id (cause)
        #[arg(short, long)]
        source: Uuid,

        /// Target signal id (effect)
        #[arg(short, long)]
        target: Uuid,

        /// Relationship (amplification, enablement, masking, triggering, correlation)
        #[arg(short, long)]
        relation: RelationType,

        /// Connection strength (0.0 - 1.0)
        #[arg(short, long, default_value = "1.0")]
        weight: f64,

        /// Why are these signals linked?
        #[arg(short, long)]
        justification: String,
    },

    /// Show a chain with its metrics
    Inspect {
        chain_id: Uuid,

        /// Urgency used for the pressure metric
        #[arg(short, long)]
        urgency: Option<f64>,
    },

    /// Run the cognitive auditor on a chain
    Audit { chain_id: Uuid },

    /// Generate a report (md) or graph description (dot)
    Export {
        chain_id: Uuid,

        #[arg(short, long, value_enum, default_value = "md")]
        format: FormatArg,

        /// Directory to write into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        #[arg(short, long)]
        urgency: Option<f64>,
    },

    /// Generate a training scenario chain
    Simulate,

    /// Delete a chain
    Delete { chain_id: Uuid },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Markdown situation report
    Md,
    /// Graphviz graph description
    Dot,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Md => ExportFormat::Markdown,
            FormatArg::Dot => ExportFormat::Dot,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let mut config = NexusConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }

    let repo = FileRepository::open(&config.store_config())?;
    let default_urgency = config.analysis.default_urgency;

    match cli.command {
        Commands::Init { name } => {
            let (chain, path) = commands::init(&repo, &name)?;
            println!("✅ Initialized Nexus chain '{}'", chain.name());
            println!("   ID: {}", chain.id());
            println!("   Storage: {}", path.display());
        }
        Commands::List => {
            let chains = commands::list(&repo)?;
            print!("{}", render::chain_list(&chains, default_urgency));
        }
        Commands::AddSignal {
            chain_id,
            domain,
            signal_type,
            description,
            confidence,
            cost,
            observed_at,
        } => {
            let signal = commands::add_signal(
                &repo,
                chain_id,
                NewSignal {
                    domain,
                    signal_type,
                    description,
                    confidence,
                    cost,
                    observed_at: observed_at.unwrap_or_else(Utc::now),
                },
            )?;
            println!("✅ Signal integrated: {}", signal.id());
        }
        Commands::Link {
            chain_id,
            source,
            target,
            relation,
            weight,
            justification,
        } => {
            let link = commands::link(
                &repo,
                chain_id,
                NewLink {
                    source,
                    target,
                    relation,
                    weight,
                    justification,
                },
            )?;
            println!(
                "✅ Linked: {} ==({})==> {}",
                link.source_id(),
                link.relation_type(),
                link.target_id()
            );
        }
        Commands::Inspect { chain_id, urgency } => {
            let chain = commands::inspect(&repo, chain_id)?;
            print!("{}", render::chain_details(&chain, urgency.unwrap_or(default_urgency)));
        }
        Commands::Audit { chain_id } => {
            let (chain, findings) = commands::run_audit(&repo, chain_id)?;
            print!("{}", render::audit_report(&chain, &findings));
        }
        Commands::Export {
            chain_id,
            format,
            output_dir,
            urgency,
        } => {
            let format = ExportFormat::from(format);
            let dir = output_dir.unwrap_or_else(|| config.export.output_dir.clone());
            let path = commands::export(
                &repo,
                chain_id,
                format,
                &dir,
                urgency.unwrap_or(default_urgency),
            )?;
            match format {
                ExportFormat::Markdown => {
                    println!("📄 Executive report generated: {}", path.display());
                }
                ExportFormat::Dot => {
                    println!("🕸️  Graphviz definition generated: {}", path.display());
                    println!("   Tip: dot -Tpng {} -o chain.png", path.display());
                }
            }
        }
        Commands::Simulate => {
            let (chain, path) = commands::simulate(&repo)?;
            println!("✅ Scenario '{}' created at: {}", chain.name(), path.display());
            println!("   Use `chimera-nexus inspect {}` to view.", chain.id());
        }
        Commands::Delete { chain_id } => {
            commands::delete(&repo, chain_id)?;
            println!("🗑️  Deleted chain {}", chain_id);
        }
    }

    Ok(())
}
