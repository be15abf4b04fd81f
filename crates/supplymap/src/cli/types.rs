//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::export::ExportFormat;
use crate::view::ViewMode;

/// View mode for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewModeArg {
    /// Focus and the nodes that depend on it
    Downstream,
    /// Focus and its suppliers
    Upstream,
    /// Focus, suppliers and dependents
    Both,
}

impl std::fmt::Display for ViewModeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Downstream => write!(f, "downstream"),
            Self::Upstream => write!(f, "upstream"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl From<ViewModeArg> for ViewMode {
    fn from(arg: ViewModeArg) -> Self {
        match arg {
            ViewModeArg::Downstream => ViewMode::Downstream,
            ViewModeArg::Upstream => ViewMode::Upstream,
            ViewModeArg::Both => ViewMode::Both,
        }
    }
}

/// Export format for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormatArg {
    /// JSON Lines, one edge per line
    Jsonl,
    /// Comma-separated values with a header row
    Csv,
}

impl std::fmt::Display for ExportFormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jsonl => write!(f, "jsonl"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Jsonl => ExportFormat::Jsonl,
            ExportFormatArg::Csv => ExportFormat::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_mode_conversion() {
        assert_eq!(ViewMode::from(ViewModeArg::Downstream), ViewMode::Downstream);
        assert_eq!(ViewMode::from(ViewModeArg::Upstream), ViewMode::Upstream);
        assert_eq!(ViewMode::from(ViewModeArg::Both), ViewMode::Both);
    }

    #[test]
    fn export_format_display_matches_extension() {
        for arg in [ExportFormatArg::Jsonl, ExportFormatArg::Csv] {
            assert_eq!(arg.to_string(), ExportFormat::from(arg).extension());
        }
    }
}
