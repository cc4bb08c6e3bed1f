use thiserror::Error;

/// Engine failure taxonomy. Errors surface to the caller immediately; the
/// engine never retries internally.
///
/// Cycle-enumeration timeouts are deliberately not represented here: an
/// expired budget yields a partial [`CycleScan`](crate::cycles::CycleScan)
/// with `complete == false`, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// An operation referenced a node the graph does not contain.
    #[error("unknown node `{0}`")]
    UnknownNode(String),

    /// A structurally invalid parameter: zero threshold, zero inhibition
    /// count, malformed polarity tag, empty cycle declaration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
