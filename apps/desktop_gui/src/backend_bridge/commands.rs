//! Backend commands queued from UI to backend worker.

use std::{path::PathBuf, sync::Arc};

use shared::domain::DetailTab;

pub enum BackendCommand {
    SelectFile {
        path: PathBuf,
    },
    /// A dropped file whose contents arrived without a path.
    SelectBytes {
        filename: String,
        declared_mime: String,
        bytes: Arc<[u8]>,
    },
    Analyze,
    Reset,
    SwitchTab(DetailTab),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectFile { .. } => "select_file",
            Self::SelectBytes { .. } => "select_bytes",
            Self::Analyze => "analyze",
            Self::Reset => "reset",
            Self::SwitchTab(_) => "switch_tab",
        }
    }
}
