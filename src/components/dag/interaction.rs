//! Pointer gestures on the graph: node drag, edge creation, selection, pan.
//!
//! Every gesture ends in [`InteractionMode::Idle`] on pointer-up, whatever its
//! outcome.

use std::collections::HashSet;

use super::arena::GraphArena;
use super::store::ScopedStore;
use super::types::{DagEvent, Modifiers, NodeClass, NodeId, Point, Transform};
use super::viewport::Viewport;

/// Hit radius of a node's outgoing connector, in screen pixels.
pub const CONNECTOR_RADIUS: f64 = 7.0;
/// Hit distance of an edge stroke, in screen pixels.
pub const EDGE_TOLERANCE: f64 = 5.0;
/// Pointer travel below which a background press is still a click.
pub const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Debug)]
pub struct NodeDrag {
	pub node: NodeId,
	grab: Point,
	moved: bool,
}

/// Edge being drawn out of a node's connector.
#[derive(Clone, Debug, PartialEq)]
pub struct DraggedEdge {
	pub source: String,
	pub points: [Point; 2],
	pub offset: Point,
}

#[derive(Clone, Debug)]
pub struct Pan {
	origin: Point,
	start: Transform,
	moved: bool,
}

#[derive(Clone, Debug, Default)]
pub enum InteractionMode {
	#[default]
	Idle,
	DraggingNode(NodeDrag),
	DraggingEdge(DraggedEdge),
	Panning(Pan),
}

#[derive(Default)]
pub struct Interaction {
	mode: InteractionMode,
	selectable: bool,
	draggable: HashSet<NodeId>,
}

impl Interaction {
	pub fn new(selectable: bool) -> Self {
		Self {
			selectable,
			..Self::default()
		}
	}

	pub fn mode(&self) -> &InteractionMode {
		&self.mode
	}

	pub fn is_idle(&self) -> bool {
		matches!(self.mode, InteractionMode::Idle)
	}

	pub fn selectable(&self) -> bool {
		self.selectable
	}

	pub fn dragged_edge(&self) -> Option<&DraggedEdge> {
		match &self.mode {
			InteractionMode::DraggingEdge(edge) => Some(edge),
			_ => None,
		}
	}

	/// Replace the set of nodes that accept drag gestures.
	pub fn rebind(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
		self.draggable = nodes.into_iter().collect();
	}

	pub fn pointer_down(
		&mut self,
		arena: &mut GraphArena,
		viewport: &Viewport,
		screen: Point,
		modifiers: Modifiers,
	) -> Vec<DagEvent> {
		let k = viewport.transform().k;
		let p = viewport.screen_to_graph(screen);
		let multiple = modifiers.multiple();

		if self.selectable {
			if let Some(source) = arena.connector_at(p, CONNECTOR_RADIUS / k) {
				if let Some(node) = arena.node(source) {
					let anchor = node.source_anchor(arena.orientation());
					self.mode = InteractionMode::DraggingEdge(DraggedEdge {
						source: node.name.clone(),
						points: [anchor, anchor],
						offset: p - anchor,
					});
				}
				return Vec::new();
			}
		}

		if let Some(id) = arena.node_at(p) {
			let Some(node) = arena.node(id) else {
				return Vec::new();
			};
			let (name, origin) = (node.name.clone(), Point::new(node.rect.x, node.rect.y));
			if !multiple {
				arena.clear_edge_selection();
			}
			if self.selectable && self.draggable.contains(&id) {
				arena.set_node_class(id, Some(NodeClass::Dragging));
				arena.raise_node(id);
				self.mode = InteractionMode::DraggingNode(NodeDrag {
					node: id,
					grab: p - origin,
					moved: false,
				});
			}
			return vec![DagEvent::NodeSelected { name, multiple }];
		}

		if let Some(id) = arena.edge_at(p, EDGE_TOLERANCE / k) {
			arena.select_edge(id, multiple);
			return arena
				.edge(id)
				.map(|e| DagEvent::EdgeSelected {
					id: e.id.clone(),
					multiple,
				})
				.into_iter()
				.collect();
		}

		self.mode = InteractionMode::Panning(Pan {
			origin: screen,
			start: viewport.transform(),
			moved: false,
		});
		Vec::new()
	}

	/// Returns whether anything visible changed.
	pub fn pointer_move(&mut self, arena: &mut GraphArena, viewport: &mut Viewport, screen: Point) -> bool {
		let p = viewport.screen_to_graph(screen);
		match &mut self.mode {
			InteractionMode::Idle => false,
			InteractionMode::DraggingNode(drag) => {
				drag.moved = true;
				arena.move_node(drag.node, p - drag.grab);
				true
			}
			InteractionMode::DraggingEdge(edge) => {
				edge.points[1] = p - edge.offset;
				true
			}
			InteractionMode::Panning(pan) => {
				let (dx, dy) = (screen.x - pan.origin.x, screen.y - pan.origin.y);
				if !pan.moved && dx.hypot(dy) < CLICK_SLOP {
					return false;
				}
				pan.moved = true;
				viewport.pan_to(pan.start.x + dx, pan.start.y + dy)
			}
		}
	}

	pub fn pointer_up(
		&mut self,
		arena: &mut GraphArena,
		viewport: &Viewport,
		screen: Point,
		positions: Option<&ScopedStore>,
	) -> Vec<DagEvent> {
		match std::mem::take(&mut self.mode) {
			InteractionMode::Idle => Vec::new(),
			InteractionMode::DraggingNode(drag) => {
				end_node_drag(arena, &drag, positions);
				Vec::new()
			}
			InteractionMode::DraggingEdge(edge) => {
				let p = viewport.screen_to_graph(screen);
				let target = arena
					.node_at(p)
					.and_then(|id| arena.node(id))
					.map(|n| n.name.clone());
				match target {
					Some(target) if target != edge.source => vec![DagEvent::EdgeCreate {
						source: edge.source,
						target,
					}],
					_ => Vec::new(),
				}
			}
			InteractionMode::Panning(pan) if !pan.moved => {
				arena.clear_edge_selection();
				vec![DagEvent::NodeUnselected, DagEvent::EdgeUnselected]
			}
			InteractionMode::Panning(_) => Vec::new(),
		}
	}

	/// Pointer left the surface: finish a node drag, abandon anything else.
	pub fn cancel(&mut self, arena: &mut GraphArena, positions: Option<&ScopedStore>) {
		if let InteractionMode::DraggingNode(drag) = std::mem::take(&mut self.mode) {
			end_node_drag(arena, &drag, positions);
		}
	}
}

fn end_node_drag(arena: &mut GraphArena, drag: &NodeDrag, positions: Option<&ScopedStore>) {
	arena.set_node_class(drag.node, None);
	if !drag.moved {
		return;
	}
	if let (Some(store), Some(node)) = (positions, arena.node(drag.node)) {
		store.save(
			&store.node_key(&node.name),
			&Point::new(node.rect.x, node.rect.y),
		);
	}
}
