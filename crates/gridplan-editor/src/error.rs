use std::path::PathBuf;

use gridplan_spatial::PlacementError;

/// Errors from loading or saving files.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Failed to parse a scene or config file.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A config file parsed but holds unusable values.
    #[error("invalid config in {file}: {detail}")]
    Config { file: PathBuf, detail: String },

    /// Failed to encode a scene.
    #[error("serialization error: {detail}")]
    Serialization { detail: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why an editor command was refused. A refused command changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// The placement rules reject the target position.
    #[error("placement rejected: {0}")]
    Rejected(#[from] PlacementError),

    /// The command names an entity that no longer exists, or nothing is
    /// selected.
    #[error("no such entity")]
    StaleReference,

    /// The pointer went down on a cell where a belt cannot start.
    #[error("cannot draw a pipeline from {},{}", .0.col, .0.row)]
    NotDrawable(gridplan_core::GridPosition),

    /// The selected entity does not support the command.
    #[error("command does not apply to the selected entity")]
    WrongSelection,

    /// The command needs a different tool to be active.
    #[error("command requires the {0} tool")]
    WrongTool(&'static str),
}
