//! Debounced coalescing of layout inputs.
//!
//! Orientation, edges, nodes and manual refresh each feed one channel. Only
//! the latest value per channel is kept. A batch is released once every
//! channel has been fed at least once and no input arrived for `quiet_ms`.

use super::types::{EdgeSpec, NodeSpec, Orientation};

pub const DEFAULT_QUIET_MS: f64 = 50.0;

#[derive(Clone, Debug)]
pub enum Input {
	Orientation(Orientation),
	Nodes(Vec<NodeSpec>),
	Edges(Vec<EdgeSpec>),
	Refresh,
}

/// Latest value of every channel at flush time.
#[derive(Clone, Debug)]
pub struct Batch {
	pub orientation: Orientation,
	pub nodes: Vec<NodeSpec>,
	pub edges: Vec<EdgeSpec>,
}

#[derive(Debug)]
pub struct Coalescer {
	quiet_ms: f64,
	orientation: Option<Orientation>,
	nodes: Option<Vec<NodeSpec>>,
	edges: Option<Vec<EdgeSpec>>,
	refreshed: bool,
	last_input_ms: f64,
	pending: bool,
}

impl Coalescer {
	pub fn new(quiet_ms: f64) -> Self {
		Self {
			quiet_ms,
			orientation: None,
			nodes: None,
			edges: None,
			refreshed: false,
			last_input_ms: 0.0,
			pending: false,
		}
	}

	pub fn push(&mut self, input: Input, now_ms: f64) {
		match input {
			Input::Orientation(o) => self.orientation = Some(o),
			Input::Nodes(n) => self.nodes = Some(n),
			Input::Edges(e) => self.edges = Some(e),
			Input::Refresh => self.refreshed = true,
		}
		self.last_input_ms = now_ms;
		self.pending = true;
	}

	pub fn orientation(&self) -> Option<Orientation> {
		self.orientation
	}

	/// Whether a batch is waiting for the quiet window to pass.
	pub fn is_pending(&self) -> bool {
		self.pending
	}

	pub fn flush(&mut self, now_ms: f64) -> Option<Batch> {
		if !self.pending || now_ms - self.last_input_ms < self.quiet_ms || !self.refreshed {
			return None;
		}
		let batch = Batch {
			orientation: self.orientation?,
			nodes: self.nodes.clone()?,
			edges: self.edges.clone()?,
		};
		self.pending = false;
		Some(batch)
	}
}

impl Default for Coalescer {
	fn default() -> Self {
		Self::new(DEFAULT_QUIET_MS)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn primed(at: f64) -> Coalescer {
		let mut c = Coalescer::default();
		c.push(Input::Orientation(Orientation::Horizontal), at);
		c.push(Input::Edges(Vec::new()), at);
		c.push(Input::Nodes(vec![NodeSpec::new("a")]), at);
		c.push(Input::Refresh, at);
		c
	}

	#[test]
	fn waits_for_every_channel() {
		let mut c = Coalescer::default();
		c.push(Input::Orientation(Orientation::Vertical), 0.0);
		c.push(Input::Nodes(Vec::new()), 0.0);
		c.push(Input::Edges(Vec::new()), 0.0);
		assert!(c.flush(1_000.0).is_none());
		c.push(Input::Refresh, 1_000.0);
		assert!(c.flush(1_000.0 + DEFAULT_QUIET_MS).is_some());
	}

	#[test]
	fn waits_for_quiet_window() {
		let mut c = primed(0.0);
		assert!(c.flush(DEFAULT_QUIET_MS - 1.0).is_none());
		assert!(c.flush(DEFAULT_QUIET_MS).is_some());
		assert!(c.flush(DEFAULT_QUIET_MS * 10.0).is_none());
	}

	#[test]
	fn bursts_collapse_to_latest_values() {
		let mut c = primed(0.0);
		c.push(Input::Nodes(vec![NodeSpec::new("b")]), 30.0);
		c.push(Input::Orientation(Orientation::Vertical), 60.0);
		assert!(c.flush(100.0).is_none());
		let batch = c.flush(110.0).unwrap();
		assert_eq!(batch.orientation, Orientation::Vertical);
		assert_eq!(batch.nodes, vec![NodeSpec::new("b")]);
		assert!(!c.is_pending());
	}

	#[test]
	fn later_input_on_one_channel_retriggers() {
		let mut c = primed(0.0);
		assert!(c.flush(100.0).is_some());
		c.push(Input::Edges(vec![EdgeSpec::new("a", "b")]), 200.0);
		let batch = c.flush(250.0).unwrap();
		assert_eq!(batch.edges.len(), 1);
		assert_eq!(batch.nodes.len(), 1);
	}
}
