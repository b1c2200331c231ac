//! Transcript submission pipeline: validate raw input, dispatch it to the
//! analysis boundary, and fold the result back into a renderable graph.

use gloo_net::http::Request;
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::components::discourse_map::{
	BuildError, DiscourseEdge, DiscourseNode, RenderableGraph, build,
};

pub const ANALYZE_ENDPOINT: &str = "/api/analyze";

/// Wire shape of a successful analysis response.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AnalysisResult {
	pub nodes: Vec<DiscourseNode>,
	pub edges: Vec<DiscourseEdge>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
	error: Option<String>,
}

fn server_error_message(message: Option<&str>) -> String {
	match message {
		Some(message) => format!("Server error: {message}"),
		None => "Could not reach the analysis service.".to_owned(),
	}
}

/// Everything that can go wrong between pasting a transcript and seeing a
/// map. All variants are recovered locally and shown to the user; the
/// `Display` text is the user-visible message.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AnalyzeError {
	#[error("Please enter valid JSON.")]
	MalformedInput,
	#[error("The transcript must be a JSON array of records.")]
	InvalidShape,
	#[error("{}", server_error_message(.0.as_deref()))]
	Server(Option<String>),
	#[error("The analysis result is inconsistent: {0}")]
	GraphConstruction(BuildError),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestPhase {
	#[default]
	Idle,
	Loading,
	Success(RenderableGraph),
	Failure(AnalyzeError),
}

/// An accepted submission, ready to be sent to the analysis boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
	pub generation: u64,
	pub records: Vec<Value>,
}

/// State machine for one submission slot: `Idle -> Loading -> (Success |
/// Failure)`, leaving the terminal states only on the next submission.
///
/// Every submission advances a generation counter, and a boundary response
/// only applies when its generation is still the latest. A late response
/// from a superseded request is dropped silently; that is superseded work,
/// not a failure.
#[derive(Clone, Debug, Default)]
pub struct Orchestrator {
	phase: RequestPhase,
	generation: u64,
}

impl Orchestrator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn phase(&self) -> &RequestPhase {
		&self.phase
	}

	pub fn is_loading(&self) -> bool {
		matches!(self.phase, RequestPhase::Loading)
	}

	pub fn error(&self) -> Option<&AnalyzeError> {
		match &self.phase {
			RequestPhase::Failure(error) => Some(error),
			_ => None,
		}
	}

	pub fn graph(&self) -> Option<&RenderableGraph> {
		match &self.phase {
			RequestPhase::Success(graph) => Some(graph),
			_ => None,
		}
	}

	/// Validate raw transcript input. Returns the dispatch to send, or
	/// `None` when the input was rejected without touching the network (the
	/// failure is already recorded in the phase).
	pub fn submit(&mut self, raw: &str) -> Option<Dispatch> {
		// Rejected submissions advance the generation too, so an in-flight
		// response can never paper over the error the user just caused.
		self.generation += 1;

		let parsed: Value = match serde_json::from_str(raw) {
			Ok(parsed) => parsed,
			Err(_) => {
				self.phase = RequestPhase::Failure(AnalyzeError::MalformedInput);
				return None;
			}
		};
		let Value::Array(records) = parsed else {
			self.phase = RequestPhase::Failure(AnalyzeError::InvalidShape);
			return None;
		};

		info!(
			"submitting {} transcript records (generation {})",
			records.len(),
			self.generation
		);
		self.phase = RequestPhase::Loading;
		Some(Dispatch {
			generation: self.generation,
			records,
		})
	}

	/// Fold a boundary outcome back in. Returns whether it applied; stale
	/// generations never do.
	pub fn resolve(
		&mut self,
		generation: u64,
		outcome: Result<AnalysisResult, AnalyzeError>,
	) -> bool {
		if generation != self.generation {
			warn!(
				"discarding stale analysis response (generation {generation}, latest {})",
				self.generation
			);
			return false;
		}

		self.phase = match outcome {
			Ok(result) => match build(&result.nodes, &result.edges) {
				Ok(graph) => {
					info!(
						"loaded discourse graph: {} nodes, {} edges",
						graph.vertices().len(),
						graph.edges().len()
					);
					RequestPhase::Success(graph)
				}
				Err(error) => RequestPhase::Failure(AnalyzeError::GraphConstruction(error)),
			},
			Err(error) => RequestPhase::Failure(error),
		};
		true
	}
}

/// POST the parsed transcript to the analysis boundary.
pub async fn request_analysis(records: &[Value]) -> Result<AnalysisResult, AnalyzeError> {
	let body = serde_json::json!({ "data": records });
	let response = Request::post(ANALYZE_ENDPOINT)
		.json(&body)
		.map_err(|_| AnalyzeError::Server(None))?
		.send()
		.await
		.map_err(|_| AnalyzeError::Server(None))?;

	if !response.ok() {
		let message = response
			.json::<ErrorBody>()
			.await
			.ok()
			.and_then(|body| body.error);
		return Err(AnalyzeError::Server(message));
	}

	response
		.json::<AnalysisResult>()
		.await
		.map_err(|_| AnalyzeError::Server(None))
}

#[cfg(test)]
mod tests {
	use crate::components::discourse_map::Selection;

	use super::*;

	fn node(id: &str, label: &str) -> DiscourseNode {
		DiscourseNode {
			id: id.to_owned(),
			label: label.to_owned(),
			kind: "statement".to_owned(),
			speaker: "A".to_owned(),
			utterance: label.to_owned(),
		}
	}

	#[test]
	fn malformed_input_fails_without_a_dispatch() {
		let mut orch = Orchestrator::new();
		assert_eq!(orch.submit("not json"), None);
		assert_eq!(orch.error(), Some(&AnalyzeError::MalformedInput));
	}

	#[test]
	fn non_array_input_fails_without_a_dispatch() {
		let mut orch = Orchestrator::new();
		assert_eq!(orch.submit("{}"), None);
		assert_eq!(orch.error(), Some(&AnalyzeError::InvalidShape));
	}

	#[test]
	fn array_input_dispatches_and_enters_loading() {
		let mut orch = Orchestrator::new();
		let dispatch = orch.submit("[]").expect("empty array is a valid transcript");
		assert_eq!(dispatch.records, Vec::<Value>::new());
		assert!(orch.is_loading());
	}

	#[test]
	fn successful_analysis_produces_a_selectable_graph() {
		let mut orch = Orchestrator::new();
		let dispatch = orch
			.submit(r#"[{"speaker":"A","text":"X"}]"#)
			.expect("valid transcript");
		assert_eq!(dispatch.records.len(), 1);

		let result = AnalysisResult {
			nodes: vec![node("n1", "X")],
			edges: vec![],
		};
		assert!(orch.resolve(dispatch.generation, Ok(result)));

		let graph = orch.graph().expect("success carries the graph");
		assert_eq!(graph.vertices().len(), 1);
		assert!(graph.edges().is_empty());

		let mut selection = Selection::default();
		selection.select_node(graph, "n1");
		let detail = selection.selected_detail(graph).expect("n1 selected");
		assert_eq!(detail.speaker, "A");
		assert_eq!(detail.utterance, "X");
	}

	#[test]
	fn dangling_edge_surfaces_as_graph_construction_failure() {
		let mut orch = Orchestrator::new();
		let dispatch = orch.submit("[]").expect("valid transcript");

		let result = AnalysisResult {
			nodes: vec![node("n1", "X")],
			edges: vec![DiscourseEdge {
				id: "e1".to_owned(),
				source: "n1".to_owned(),
				target: "n9".to_owned(),
				relation: "support".to_owned(),
			}],
		};
		assert!(orch.resolve(dispatch.generation, Ok(result)));

		match orch.error() {
			Some(AnalyzeError::GraphConstruction(BuildError::DanglingReference {
				edge_id,
				node_id,
			})) => {
				assert_eq!(edge_id, "e1");
				assert_eq!(node_id, "n9");
			}
			other => panic!("expected a dangling-reference failure, got {other:?}"),
		}
	}

	#[test]
	fn server_failure_carries_the_message_when_present() {
		let mut orch = Orchestrator::new();
		let dispatch = orch.submit("[]").expect("valid transcript");
		orch.resolve(
			dispatch.generation,
			Err(AnalyzeError::Server(Some("model overloaded".to_owned()))),
		);
		assert_eq!(
			orch.error().map(ToString::to_string),
			Some("Server error: model overloaded".to_owned())
		);

		let dispatch = orch.submit("[]").expect("valid transcript");
		orch.resolve(dispatch.generation, Err(AnalyzeError::Server(None)));
		assert_eq!(
			orch.error().map(ToString::to_string),
			Some("Could not reach the analysis service.".to_owned())
		);
	}

	#[test]
	fn superseded_responses_are_discarded() {
		let mut orch = Orchestrator::new();
		let first = orch.submit("[]").expect("valid transcript");
		let second = orch.submit("[]").expect("valid transcript");

		let stale = AnalysisResult {
			nodes: vec![node("n1", "stale")],
			edges: vec![],
		};
		assert!(!orch.resolve(first.generation, Ok(stale)));
		assert!(orch.is_loading());

		let fresh = AnalysisResult {
			nodes: vec![node("n2", "fresh")],
			edges: vec![],
		};
		assert!(orch.resolve(second.generation, Ok(fresh)));
		assert!(orch.graph().is_some_and(|g| g.contains("n2")));
	}

	#[test]
	fn rejected_submission_supersedes_the_in_flight_one() {
		let mut orch = Orchestrator::new();
		let dispatch = orch.submit("[]").expect("valid transcript");
		assert_eq!(orch.submit("not json"), None);

		let late = AnalysisResult {
			nodes: vec![node("n1", "late")],
			edges: vec![],
		};
		assert!(!orch.resolve(dispatch.generation, Ok(late)));
		assert_eq!(orch.error(), Some(&AnalyzeError::MalformedInput));
	}
}
