//! CHIMERA Nexus Reporting
//!
//! Decision-support artifacts built from a chain and its audit findings:
//! - **markdown**: executive situation report
//! - **dot**: Graphviz description of the causal graph

pub mod markdown;
pub mod dot;

use chimera_core::Chain;

/// Output formats understood by the exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Dot,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Dot => "dot",
        }
    }
}

/// File stem for exported artifacts: lowercased name with spaces as
/// underscores, then the first 8 characters of the chain id
pub fn export_file_stem(chain: &Chain) -> String {
    let id = chain.id().to_string();
    format!(
        "{}_{}",
        chain.name().replace(' ', "_").to_lowercase(),
        &id[..8]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_file_stem() {
        let chain = Chain::new("Operation Blue Sky").unwrap();
        let stem = export_file_stem(&chain);
        assert!(stem.starts_with("operation_blue_sky_"));
        assert_eq!(stem.len(), "operation_blue_sky_".len() + 8);
        assert!(chain.id().to_string().starts_with(&stem[stem.len() - 8..]));
    }

    #[test]
    fn test_extensions() {
        assert_eq!(ExportFormat::Markdown.extension(), "md");
        assert_eq!(ExportFormat::Dot.extension(), "dot");
    }
}
