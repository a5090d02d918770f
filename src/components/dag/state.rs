use std::rc::Rc;

use log::{debug, error};

use super::arena::{GraphArena, NodeMeasure};
use super::coalesce::{Batch, Coalescer, DEFAULT_QUIET_MS, Input};
use super::diff::diff;
use super::interaction::Interaction;
use super::layout::{LayeredLayout, LayoutConfig, Sugiyama};
use super::store::{ScopedStore, ViewStore};
use super::types::{DagEvent, EdgeSpec, Modifiers, NodeSpec, Orientation, Point};
use super::viewport::{Viewport, ViewportConfig};

/// Settings of one graph view.
#[derive(Clone, Debug)]
pub struct DagConfig {
	/// Prefix of every persisted key.
	pub namespace: String,
	/// Node size used for layout and until a node is measured.
	pub node_size: [f64; 2],
	pub selectable: bool,
	pub persist_zoom: bool,
	pub persist_positions: bool,
	pub viewport: ViewportConfig,
	pub layout: LayoutConfig,
	/// Quiet window before coalesced inputs trigger a layout pass.
	pub quiet_ms: f64,
}

impl Default for DagConfig {
	fn default() -> Self {
		Self {
			namespace: "dag".into(),
			node_size: [160.0, 48.0],
			selectable: false,
			persist_zoom: false,
			persist_positions: false,
			viewport: ViewportConfig::default(),
			layout: LayoutConfig::default(),
			quiet_ms: DEFAULT_QUIET_MS,
		}
	}
}

/// Everything a DAG view knows, independent of the DOM.
pub struct DagState {
	config: DagConfig,
	arena: GraphArena,
	layout: Box<dyn LayeredLayout>,
	viewport: Viewport,
	interaction: Interaction,
	inputs: Coalescer,
	positions: Option<ScopedStore>,
	previous: Vec<NodeSpec>,
	laid_out: bool,
	initialized: bool,
	failed: bool,
	dirty: bool,
}

impl DagState {
	pub fn new(config: DagConfig, store: Rc<dyn ViewStore>) -> Self {
		let scoped = ScopedStore::new(store, config.namespace.clone());
		Self {
			arena: GraphArena::default(),
			layout: Box::new(Sugiyama::new(config.layout)),
			viewport: Viewport::new(config.viewport, config.persist_zoom.then(|| scoped.clone())),
			interaction: Interaction::new(config.selectable),
			inputs: Coalescer::new(config.quiet_ms),
			positions: config.persist_positions.then_some(scoped),
			previous: Vec::new(),
			laid_out: false,
			initialized: false,
			failed: false,
			dirty: true,
			config,
		}
	}

	/// Swap the layered layout implementation.
	pub fn with_layout(mut self, layout: impl LayeredLayout + 'static) -> Self {
		self.layout = Box::new(layout);
		self
	}

	pub fn config(&self) -> &DagConfig {
		&self.config
	}

	pub fn arena(&self) -> &GraphArena {
		&self.arena
	}

	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	pub fn interaction(&self) -> &Interaction {
		&self.interaction
	}

	pub fn orientation(&self) -> Orientation {
		self.inputs.orientation().unwrap_or_default()
	}

	/// Whether a redraw is due; resets the flag.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}

	pub fn set_nodes(&mut self, nodes: Vec<NodeSpec>, now_ms: f64) {
		self.inputs.push(Input::Nodes(nodes), now_ms);
	}

	pub fn set_edges(&mut self, edges: Vec<EdgeSpec>, now_ms: f64) {
		self.inputs.push(Input::Edges(edges), now_ms);
	}

	pub fn set_orientation(&mut self, orientation: Orientation, now_ms: f64) {
		self.inputs.push(Input::Orientation(orientation), now_ms);
	}

	pub fn refresh(&mut self, now_ms: f64) {
		self.inputs.push(Input::Refresh, now_ms);
	}

	/// Run a layout pass if coalesced inputs are due.
	pub fn poll(&mut self, now_ms: f64, measure: &dyn NodeMeasure) -> Vec<DagEvent> {
		match self.inputs.flush(now_ms) {
			Some(batch) => self.run_layout(batch, measure),
			None => Vec::new(),
		}
	}

	/// Lay out a scratch copy of the arena and adopt it only on success, so a
	/// failed pass leaves the previous render and its stored state in place.
	fn run_layout(&mut self, batch: Batch, measure: &dyn NodeMeasure) -> Vec<DagEvent> {
		let changes = diff(&self.previous, &batch.nodes);
		let removed: Vec<String> = changes.removed.iter().map(|n| n.name.clone()).collect();
		let added = !changes.added.is_empty();

		let mut next = self.arena.clone();
		next.sync_nodes(&batch.nodes, self.config.node_size);
		let positions = self.positions.clone();
		let pinned = move |name: &str| -> Option<Point> {
			let store = positions.as_ref()?;
			store.load(&store.node_key(name))
		};
		let result = next.apply_layout(
			self.layout.as_ref(),
			&batch.edges,
			batch.orientation,
			self.config.node_size,
			&pinned,
			measure,
		);
		if let Err(e) = result {
			error!("dag layout failed: {e}");
			self.failed = true;
			return vec![DagEvent::RenderError(e.to_string())];
		}

		self.arena = next;
		if let Some(store) = &self.positions {
			for name in &removed {
				store.remove(&store.node_key(name));
			}
		}
		if added && self.config.selectable {
			self.interaction.rebind(self.arena.node_ids());
		}
		self.previous = batch.nodes;
		self.dirty = true;

		self.laid_out = true;
		if !self.initialized {
			self.initialize();
		}
		if std::mem::take(&mut self.failed) {
			debug!("dag layout recovered");
			return vec![DagEvent::RenderRecovered];
		}
		Vec::new()
	}

	/// First placement of the viewport: persisted transform, else fit.
	/// Retried on later passes and resizes until it succeeds.
	fn initialize(&mut self) {
		if !self.viewport.is_measured() {
			return;
		}
		self.initialized = self.viewport.restore() || self.viewport.zoom_to_fit(self.arena.bounds());
		self.dirty |= self.initialized;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport.resize(width, height);
		if self.laid_out && !self.initialized {
			self.initialize();
		}
		self.dirty = true;
	}

	pub fn zoom_in(&mut self) -> bool {
		self.mark(|s| s.viewport.zoom_in())
	}

	pub fn zoom_out(&mut self) -> bool {
		self.mark(|s| s.viewport.zoom_out())
	}

	pub fn zoom_to_fit(&mut self) -> bool {
		self.mark(|s| s.viewport.zoom_to_fit(s.arena.bounds()))
	}

	pub fn wheel(&mut self, screen: Point, delta_y: f64) -> bool {
		self.mark(|s| s.viewport.wheel(screen, delta_y))
	}

	pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) -> Vec<DagEvent> {
		self.dirty = true;
		self.interaction
			.pointer_down(&mut self.arena, &self.viewport, screen, modifiers)
	}

	pub fn pointer_move(&mut self, screen: Point) -> bool {
		self.mark(|s| s.interaction.pointer_move(&mut s.arena, &mut s.viewport, screen))
	}

	pub fn pointer_up(&mut self, screen: Point) -> Vec<DagEvent> {
		self.dirty = true;
		self.interaction.pointer_up(
			&mut self.arena,
			&self.viewport,
			screen,
			self.positions.as_ref(),
		)
	}

	pub fn pointer_leave(&mut self) {
		self.dirty = true;
		self.interaction
			.cancel(&mut self.arena, self.positions.as_ref());
	}

	fn mark(&mut self, op: impl FnOnce(&mut Self) -> bool) -> bool {
		let changed = op(self);
		self.dirty |= changed;
		changed
	}
}
