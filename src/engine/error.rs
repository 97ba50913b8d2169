use thiserror::Error;

/// Everything the engine can refuse to do.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MindMapError {
	/// Malformed graph at load/import time. The graph is rejected, never repaired.
	#[error("invalid graph: {0}")]
	InvalidGraph(String),
	/// A well-formed request that would break a structural rule.
	#[error("invalid operation: {0}")]
	InvalidOperation(String),
	/// Configuration that would make the engine misbehave, such as an
	/// empty zoom range.
	#[error("invalid config: {0}")]
	InvalidConfig(String),
	/// Vector or raster capture could not complete.
	#[error("export failed: {0}")]
	ExportFailure(String),
	/// Walking the parent chain of `node_id` visited more nodes than exist.
	#[error("cycle detected above node `{node_id}`")]
	Cycle { node_id: String },
}

impl MindMapError {
	pub(crate) fn unknown_node(id: &str) -> Self {
		MindMapError::InvalidOperation(format!("node `{id}` does not exist"))
	}
}
