use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::types::{DiscourseEdge, DiscourseNode};

/// All vertices share one color; the semantic signal lives on the edges.
pub const NODE_COLOR: &str = "#1976d2";
pub const NODE_RADIUS: f64 = 6.0;
pub const EDGE_STYLE: &str = "arrow";

const AFFIRMATIVE_COLOR: &str = "#2ecc40";
const CONTENTIOUS_COLOR: &str = "#ff9800";
const NEUTRAL_COLOR: &str = "#888";

/// Visual class of a rhetorical relation. Total over all relation strings:
/// anything unrecognized is neutral, never an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationClass {
	Affirmative,
	Contentious,
	Neutral,
}

impl RelationClass {
	pub fn of(relation: &str) -> Self {
		match relation {
			"support" | "agree" => Self::Affirmative,
			"oppose" | "question" => Self::Contentious,
			_ => Self::Neutral,
		}
	}

	pub fn color(self) -> &'static str {
		match self {
			Self::Affirmative => AFFIRMATIVE_COLOR,
			Self::Contentious => CONTENTIOUS_COLOR,
			Self::Neutral => NEUTRAL_COLOR,
		}
	}
}

/// A structurally inconsistent snapshot. The builder rejects the whole
/// snapshot rather than dropping the offending record.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
	#[error("edge `{edge_id}` references unknown node `{node_id}`")]
	DanglingReference { edge_id: String, node_id: String },
	#[error("duplicate node id `{0}`")]
	DuplicateNodeId(String),
	#[error("duplicate edge id `{0}`")]
	DuplicateEdgeId(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphVertex {
	pub id: String,
	pub label: String,
	pub color: &'static str,
	pub radius: f64,
	pub speaker: String,
	pub utterance: String,
	pub kind: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub class: RelationClass,
	pub color: &'static str,
	pub style: &'static str,
	pub relation: String,
}

/// An immutable graph snapshot with visual attributes attached, ready for
/// the rendering surface. Replaced wholesale on every analysis run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderableGraph {
	vertices: Vec<GraphVertex>,
	edges: Vec<GraphEdge>,
	by_id: HashMap<String, usize>,
}

impl RenderableGraph {
	pub fn vertices(&self) -> &[GraphVertex] {
		&self.vertices
	}

	pub fn edges(&self) -> &[GraphEdge] {
		&self.edges
	}

	pub fn node(&self, id: &str) -> Option<&GraphVertex> {
		self.by_id.get(id).map(|&i| &self.vertices[i])
	}

	pub fn contains(&self, id: &str) -> bool {
		self.by_id.contains_key(id)
	}
}

/// Build a renderable graph from one analysis snapshot.
///
/// Vertex and edge order follows input order. The color and size mapping is
/// a pure function of the record types, so the same snapshot always yields
/// the same visual attributes.
pub fn build(
	nodes: &[DiscourseNode],
	edges: &[DiscourseEdge],
) -> Result<RenderableGraph, BuildError> {
	let mut vertices = Vec::with_capacity(nodes.len());
	let mut by_id = HashMap::with_capacity(nodes.len());

	for node in nodes {
		if by_id.insert(node.id.clone(), vertices.len()).is_some() {
			return Err(BuildError::DuplicateNodeId(node.id.clone()));
		}
		vertices.push(GraphVertex {
			id: node.id.clone(),
			label: node.label.clone(),
			color: NODE_COLOR,
			radius: NODE_RADIUS,
			speaker: node.speaker.clone(),
			utterance: node.utterance.clone(),
			kind: node.kind.clone(),
		});
	}

	let mut out_edges: Vec<GraphEdge> = Vec::with_capacity(edges.len());
	let mut seen_edge_ids = HashSet::with_capacity(edges.len());

	for edge in edges {
		if !seen_edge_ids.insert(edge.id.clone()) {
			return Err(BuildError::DuplicateEdgeId(edge.id.clone()));
		}
		for endpoint in [&edge.source, &edge.target] {
			if !by_id.contains_key(endpoint) {
				return Err(BuildError::DanglingReference {
					edge_id: edge.id.clone(),
					node_id: endpoint.clone(),
				});
			}
		}
		let class = RelationClass::of(&edge.relation);
		out_edges.push(GraphEdge {
			id: edge.id.clone(),
			source: edge.source.clone(),
			target: edge.target.clone(),
			class,
			color: class.color(),
			style: EDGE_STYLE,
			relation: edge.relation.clone(),
		});
	}

	Ok(RenderableGraph {
		vertices,
		edges: out_edges,
		by_id,
	})
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	fn node(id: &str, speaker: &str) -> DiscourseNode {
		DiscourseNode {
			id: id.to_owned(),
			label: format!("{speaker} says"),
			kind: "statement".to_owned(),
			speaker: speaker.to_owned(),
			utterance: format!("utterance of {id}"),
		}
	}

	fn edge(id: &str, source: &str, target: &str, relation: &str) -> DiscourseEdge {
		DiscourseEdge {
			id: id.to_owned(),
			source: source.to_owned(),
			target: target.to_owned(),
			relation: relation.to_owned(),
		}
	}

	#[rstest]
	#[case("support", RelationClass::Affirmative)]
	#[case("agree", RelationClass::Affirmative)]
	#[case("oppose", RelationClass::Contentious)]
	#[case("question", RelationClass::Contentious)]
	#[case("anything-else", RelationClass::Neutral)]
	#[case("", RelationClass::Neutral)]
	fn relation_classification_is_total(#[case] relation: &str, #[case] expected: RelationClass) {
		assert_eq!(RelationClass::of(relation), expected);
	}

	#[test]
	fn build_attaches_visual_attributes() {
		let nodes = [node("n1", "A"), node("n2", "B")];
		let edges = [edge("e1", "n1", "n2", "support")];

		let graph = build(&nodes, &edges).expect("consistent snapshot");

		assert_eq!(graph.vertices().len(), 2);
		assert_eq!(graph.edges().len(), 1);

		let v = graph.node("n1").expect("n1 registered");
		assert_eq!(v.label, "A says");
		assert_eq!(v.color, NODE_COLOR);
		assert_eq!(v.radius, NODE_RADIUS);
		assert_eq!(v.speaker, "A");
		assert_eq!(v.kind, "statement");

		let e = &graph.edges()[0];
		assert_eq!(e.class, RelationClass::Affirmative);
		assert_eq!(e.color, "#2ecc40");
		assert_eq!(e.style, "arrow");
		assert_eq!(e.relation, "support");
	}

	#[test]
	fn edge_colors_follow_the_three_way_classification() {
		let nodes = [node("n1", "A"), node("n2", "B")];
		let edges = [
			edge("e1", "n1", "n2", "agree"),
			edge("e2", "n2", "n1", "question"),
			edge("e3", "n1", "n2", "elaborate"),
		];

		let graph = build(&nodes, &edges).expect("consistent snapshot");
		let colors: Vec<_> = graph.edges().iter().map(|e| e.color).collect();
		assert_eq!(colors, vec!["#2ecc40", "#ff9800", "#888"]);
	}

	#[test]
	fn dangling_edge_rejects_the_whole_snapshot() {
		let nodes = [node("n1", "A")];
		let edges = [edge("e1", "n1", "n9", "support")];

		let err = build(&nodes, &edges).expect_err("n9 does not exist");
		assert_eq!(
			err,
			BuildError::DanglingReference {
				edge_id: "e1".to_owned(),
				node_id: "n9".to_owned(),
			}
		);
	}

	#[test]
	fn dangling_source_is_rejected_too() {
		let nodes = [node("n1", "A")];
		let edges = [edge("e1", "n0", "n1", "oppose")];

		let err = build(&nodes, &edges).expect_err("n0 does not exist");
		assert!(matches!(
			err,
			BuildError::DanglingReference { ref edge_id, ref node_id }
				if edge_id == "e1" && node_id == "n0"
		));
	}

	#[test]
	fn duplicate_ids_are_rejected() {
		let nodes = [node("n1", "A"), node("n1", "B")];
		assert_eq!(
			build(&nodes, &[]).expect_err("duplicate node id"),
			BuildError::DuplicateNodeId("n1".to_owned())
		);

		let nodes = [node("n1", "A"), node("n2", "B")];
		let edges = [
			edge("e1", "n1", "n2", "support"),
			edge("e1", "n2", "n1", "oppose"),
		];
		assert_eq!(
			build(&nodes, &edges).expect_err("duplicate edge id"),
			BuildError::DuplicateEdgeId("e1".to_owned())
		);
	}

	#[test]
	fn build_is_deterministic() {
		let nodes = [node("n1", "A"), node("n2", "B")];
		let edges = [edge("e1", "n1", "n2", "oppose")];

		let first = build(&nodes, &edges).expect("consistent snapshot");
		let second = build(&nodes, &edges).expect("consistent snapshot");
		assert_eq!(first, second);
	}
}
