use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::graph::{GraphVertex, RenderableGraph};

pub const HIT_RADIUS: f64 = 12.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub color: &'static str,
	pub radius: f64,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// The single currently-inspected node, or none.
///
/// Clicks are the only way in, dismissal and graph reloads the only ways
/// out. Selection is scoped to one graph snapshot and never survives a
/// reload, so a resolved detail always belongs to the graph on screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
	selected: Option<String>,
}

impl Selection {
	/// Select a node by id. Ids the loaded graph does not know are ignored;
	/// the rendering surface is the only event source and stays consistent
	/// with the graph it displays.
	pub fn select_node(&mut self, graph: &RenderableGraph, id: &str) {
		if graph.contains(id) {
			self.selected = Some(id.to_owned());
		}
	}

	pub fn clear(&mut self) {
		self.selected = None;
	}

	pub fn selected_id(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	pub fn selected_detail<'a>(&self, graph: &'a RenderableGraph) -> Option<&'a GraphVertex> {
		self.selected.as_deref().and_then(|id| graph.node(id))
	}
}

pub struct MapState {
	pub graph: ForceGraph<NodeInfo, &'static str>,
	pub records: RenderableGraph,
	pub selection: Selection,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	highlight_t: f64,
	selected_idx: Option<DefaultNodeIdx>,
	neighbors: HashSet<DefaultNodeIdx>,
	idx_to_id: HashMap<DefaultNodeIdx, String>,
	id_to_idx: HashMap<String, DefaultNodeIdx>,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
}

impl MapState {
	pub fn new(records: &RenderableGraph, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut id_to_idx = HashMap::new();
		let mut idx_to_id = HashMap::new();
		let mut edges = Vec::new();

		let count = records.vertices().len();
		for (i, vertex) in records.vertices().iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / count as f64;
			let (x, y) = (
				(width / 2.0 + 100.0 * angle.cos()) as f32,
				(height / 2.0 + 100.0 * angle.sin()) as f32,
			);

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: vertex.id.clone(),
					label: vertex.label.clone(),
					color: vertex.color,
					radius: vertex.radius,
				},
			});
			id_to_idx.insert(vertex.id.clone(), idx);
			idx_to_id.insert(idx, vertex.id.clone());
		}

		// The builder already rejected dangling endpoints, so every edge
		// resolves here.
		for edge in records.edges() {
			if let (Some(&src), Some(&tgt)) =
				(id_to_idx.get(&edge.source), id_to_idx.get(&edge.target))
			{
				graph.add_edge(
					src,
					tgt,
					EdgeData {
						user_data: edge.color,
					},
				);
				edges.push((src, tgt));
			}
		}

		Self {
			graph,
			records: records.clone(),
			selection: Selection::default(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			highlight_t: 0.0,
			selected_idx: None,
			neighbors: HashSet::new(),
			idx_to_id,
			id_to_idx,
			edges,
		}
	}

	/// Swap in a new graph snapshot. Unconditionally discards the current
	/// selection; node identity is not guaranteed across analysis runs even
	/// when ids collide.
	pub fn reload(&mut self, records: &RenderableGraph) {
		*self = Self::new(records, self.width, self.height);
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	/// Node-click transition, fed by the rendering surface.
	pub fn select_index(&mut self, idx: DefaultNodeIdx) {
		if let Some(id) = self.idx_to_id.get(&idx) {
			let id = id.clone();
			self.selection.select_node(&self.records, &id);
		}
		self.sync_highlight();
	}

	/// Explicit dismissal transition.
	pub fn clear_selection(&mut self) {
		self.selection.clear();
		self.sync_highlight();
	}

	pub fn selected_id(&self) -> Option<&str> {
		self.selection.selected_id()
	}

	pub fn selected_detail(&self) -> Option<&GraphVertex> {
		self.selection.selected_detail(&self.records)
	}

	fn sync_highlight(&mut self) {
		self.selected_idx = self
			.selection
			.selected_id()
			.and_then(|id| self.id_to_idx.get(id).copied());
		self.neighbors.clear();

		if let Some(idx) = self.selected_idx {
			for &(src, tgt) in &self.edges {
				if src == idx {
					self.neighbors.insert(tgt);
				} else if tgt == idx {
					self.neighbors.insert(src);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.selected_idx == Some(idx) || self.neighbors.contains(&idx)
	}

	pub fn is_selected(&self, idx: DefaultNodeIdx) -> bool {
		self.selected_idx == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.selected_idx.is_some()
	}

	pub fn highlight_t(&self) -> f64 {
		self.highlight_t
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;

		let (target, speed) = if self.selected_idx.is_some() {
			(1.0, 1.8)
		} else {
			(0.0, 1.26)
		};
		self.highlight_t += (target - self.highlight_t) * speed * dt as f64;
		if self.selected_idx.is_none() && self.highlight_t < 0.01 {
			self.highlight_t = 0.0;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::super::graph::build;
	use super::super::types::{DiscourseEdge, DiscourseNode};
	use super::*;

	fn node_index(state: &MapState, id: &str) -> DefaultNodeIdx {
		state.id_to_idx[id]
	}

	fn snapshot(ids: &[&str], edges: &[(&str, &str, &str)]) -> RenderableGraph {
		let nodes: Vec<DiscourseNode> = ids
			.iter()
			.map(|id| DiscourseNode {
				id: (*id).to_owned(),
				label: format!("label {id}"),
				kind: "statement".to_owned(),
				speaker: "A".to_owned(),
				utterance: format!("utterance {id}"),
			})
			.collect();
		let edges: Vec<DiscourseEdge> = edges
			.iter()
			.map(|(id, source, target)| DiscourseEdge {
				id: (*id).to_owned(),
				source: (*source).to_owned(),
				target: (*target).to_owned(),
				relation: "support".to_owned(),
			})
			.collect();
		build(&nodes, &edges).expect("consistent snapshot")
	}

	#[test]
	fn selection_round_trip() {
		let graph = snapshot(&["n1", "n2"], &[("e1", "n1", "n2")]);
		let mut selection = Selection::default();

		selection.select_node(&graph, "n1");
		let detail = selection.selected_detail(&graph).expect("n1 selected");
		assert_eq!(detail.id, "n1");
		assert_eq!(detail.utterance, "utterance n1");

		selection.clear();
		assert_eq!(selection.selected_detail(&graph), None);
	}

	#[test]
	fn unknown_id_is_a_no_op() {
		let graph = snapshot(&["n1"], &[]);
		let mut selection = Selection::default();

		selection.select_node(&graph, "n9");
		assert_eq!(selection.selected_id(), None);

		// and it does not clobber an existing selection either
		selection.select_node(&graph, "n1");
		selection.select_node(&graph, "n9");
		assert_eq!(selection.selected_id(), Some("n1"));
	}

	#[test]
	fn reload_always_clears_the_selection() {
		let first = snapshot(&["n1", "n2"], &[("e1", "n1", "n2")]);
		let mut state = MapState::new(&first, 800.0, 600.0);

		let n1 = node_index(&state, "n1");
		state.select_index(n1);
		assert_eq!(state.selected_id(), Some("n1"));

		// the new snapshot reuses the id, but it is a different utterance
		let second = snapshot(&["n1"], &[]);
		state.reload(&second);
		assert_eq!(state.selected_id(), None);
		assert_eq!(state.selected_detail(), None);
	}

	#[test]
	fn click_selects_and_highlights_neighbors() {
		let graph = snapshot(&["n1", "n2", "n3"], &[("e1", "n1", "n2")]);
		let mut state = MapState::new(&graph, 800.0, 600.0);

		let (n1, n2, n3) = (
			node_index(&state, "n1"),
			node_index(&state, "n2"),
			node_index(&state, "n3"),
		);
		state.select_index(n1);

		assert_eq!(state.selected_detail().map(|v| v.id.as_str()), Some("n1"));
		assert!(state.is_selected(n1));
		assert!(state.is_highlighted(n2));
		assert!(!state.is_highlighted(n3));

		state.clear_selection();
		assert!(!state.has_active_highlight());
	}
}
