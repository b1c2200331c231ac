use serde::{Deserialize, Serialize};

/// One utterance in the discussion, as returned by the analysis boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscourseNode {
	pub id: String,
	pub label: String,
	#[serde(rename = "type")]
	pub kind: String,
	pub speaker: String,
	pub utterance: String,
}

/// A directed rhetorical relation between two utterances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscourseEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	#[serde(rename = "type")]
	pub relation: String,
}
