//! Layered (Sugiyama-style) layout.
//!
//! Phases:
//!   1. Cycle check (a cycle cannot be layered and fails the pass)
//!   2. Longest-path layering
//!   3. Dummy nodes on edges spanning several layers
//!   4. Two-layer barycenter crossing minimization
//!   5. Centered coordinate assignment
//!
//! Output is horizontal: layers advance along x, slots within a layer along y.

use std::collections::VecDeque;

use super::types::Point;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
	#[error("graph contains a cycle through node '{0}'")]
	Cycle(String),
	#[error("invalid node size {width}x{height}")]
	InvalidSize { width: f64, height: f64 },
}

/// Spacing between layers and between nodes of one layer, in pixels.
#[derive(Clone, Copy, Debug)]
pub struct LayoutConfig {
	pub layer_gap: f64,
	pub node_gap: f64,
	pub max_sweeps: usize,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			layer_gap: 80.0,
			node_gap: 24.0,
			max_sweeps: 24,
		}
	}
}

pub struct LayoutInput<'a> {
	pub nodes: Vec<&'a str>,
	/// `(source, target)` indices into `nodes`.
	pub edges: Vec<(usize, usize)>,
	pub node_size: [f64; 2],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutOutput {
	/// Top-left corner per input node, same order as `LayoutInput::nodes`.
	pub positions: Vec<Point>,
	pub width: f64,
	pub height: f64,
}

impl LayoutOutput {
	/// Exchange the axes of every position and of the total size.
	pub fn swap_axes(&mut self) {
		for p in &mut self.positions {
			*p = p.swapped();
		}
		std::mem::swap(&mut self.width, &mut self.height);
	}
}

/// Layered graph layout seam.
pub trait LayeredLayout {
	fn layout(&self, input: &LayoutInput<'_>) -> Result<LayoutOutput, LayoutError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Sugiyama {
	pub config: LayoutConfig,
}

impl Sugiyama {
	pub fn new(config: LayoutConfig) -> Self {
		Self { config }
	}
}

impl LayeredLayout for Sugiyama {
	fn layout(&self, input: &LayoutInput<'_>) -> Result<LayoutOutput, LayoutError> {
		let [w, h] = input.node_size;
		if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
			return Err(LayoutError::InvalidSize {
				width: w,
				height: h,
			});
		}
		let n = input.nodes.len();
		if n == 0 {
			return Ok(LayoutOutput::default());
		}

		let layers = longest_path_layers(n, &input.edges).map_err(|idx| {
			LayoutError::Cycle(input.nodes.get(idx).copied().unwrap_or_default().to_string())
		})?;
		let aug = Augmented::build(n, &input.edges, &layers);
		let ordering = minimize_crossings(&aug, self.config.max_sweeps);

		let layer_step = w + self.config.layer_gap;
		let slot_step = h + self.config.node_gap;
		let widest = ordering.iter().map(Vec::len).max().unwrap_or(1);

		let mut positions = vec![Point::default(); n];
		for (layer, row) in ordering.iter().enumerate() {
			let offset = (widest - row.len()) as f64 / 2.0;
			for (slot, &v) in row.iter().enumerate() {
				if v < n {
					positions[v] = Point::new(layer as f64 * layer_step, (offset + slot as f64) * slot_step);
				}
			}
		}

		Ok(LayoutOutput {
			positions,
			width: (ordering.len() - 1) as f64 * layer_step + w,
			height: (widest - 1) as f64 * slot_step + h,
		})
	}
}

/// Layer per node via Kahn's order. `Err` carries a node left on a cycle.
fn longest_path_layers(n: usize, edges: &[(usize, usize)]) -> Result<Vec<usize>, usize> {
	let mut succ = vec![Vec::new(); n];
	let mut indegree = vec![0usize; n];
	for &(s, t) in edges {
		succ[s].push(t);
		indegree[t] += 1;
	}

	let mut queue: VecDeque<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
	let mut layers = vec![0usize; n];
	let mut visited = 0;
	while let Some(v) = queue.pop_front() {
		visited += 1;
		for &t in &succ[v] {
			layers[t] = layers[t].max(layers[v] + 1);
			indegree[t] -= 1;
			if indegree[t] == 0 {
				queue.push_back(t);
			}
		}
	}

	if visited < n {
		return Err((0..n).find(|&v| indegree[v] > 0).unwrap_or(0));
	}
	Ok(layers)
}

/// Layered graph with dummy vertices; real vertices keep their input index.
struct Augmented {
	layer: Vec<usize>,
	succ: Vec<Vec<usize>>,
	pred: Vec<Vec<usize>>,
	layer_count: usize,
}

impl Augmented {
	fn build(n: usize, edges: &[(usize, usize)], layers: &[usize]) -> Self {
		let mut aug = Augmented {
			layer: layers.to_vec(),
			succ: vec![Vec::new(); n],
			pred: vec![Vec::new(); n],
			layer_count: layers.iter().max().map_or(0, |m| m + 1),
		};
		for &(s, t) in edges {
			let mut prev = s;
			for layer in layers[s] + 1..layers[t] {
				let dummy = aug.layer.len();
				aug.layer.push(layer);
				aug.succ.push(Vec::new());
				aug.pred.push(Vec::new());
				aug.link(prev, dummy);
				prev = dummy;
			}
			aug.link(prev, t);
		}
		aug
	}

	fn link(&mut self, s: usize, t: usize) {
		self.succ[s].push(t);
		self.pred[t].push(s);
	}
}

fn minimize_crossings(aug: &Augmented, max_sweeps: usize) -> Vec<Vec<usize>> {
	let mut ordering = vec![Vec::new(); aug.layer_count];
	for (v, &layer) in aug.layer.iter().enumerate() {
		ordering[layer].push(v);
	}

	let mut best = ordering.clone();
	let mut best_crossings = count_crossings(&best, aug);
	for _ in 0..max_sweeps {
		if best_crossings == 0 {
			break;
		}
		for layer in 1..ordering.len() {
			let (fixed, free) = ordering.split_at_mut(layer);
			reorder(&mut free[0], &fixed[layer - 1], &aug.pred);
		}
		for layer in (0..ordering.len().saturating_sub(1)).rev() {
			let (free, fixed) = ordering.split_at_mut(layer + 1);
			reorder(&mut free[layer], &fixed[0], &aug.succ);
		}

		let crossings = count_crossings(&ordering, aug);
		if crossings >= best_crossings {
			break;
		}
		best_crossings = crossings;
		best.clone_from(&ordering);
	}
	best
}

/// Sort `row` by the mean slot of each vertex's neighbors in `fixed`.
/// Vertices without neighbors there keep their current slot as key.
fn reorder(row: &mut [usize], fixed: &[usize], neighbors: &[Vec<usize>]) {
	let mut slot_of = vec![None; neighbors.len()];
	for (slot, &v) in fixed.iter().enumerate() {
		slot_of[v] = Some(slot as f64);
	}

	let mut keyed: Vec<(f64, usize)> = row
		.iter()
		.enumerate()
		.map(|(current, &v)| {
			let slots: Vec<f64> = neighbors[v].iter().filter_map(|&u| slot_of[u]).collect();
			let key = if slots.is_empty() {
				current as f64
			} else {
				slots.iter().sum::<f64>() / slots.len() as f64
			};
			(key, v)
		})
		.collect();
	keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
	for (dst, (_, v)) in row.iter_mut().zip(keyed) {
		*dst = v;
	}
}

fn count_crossings(ordering: &[Vec<usize>], aug: &Augmented) -> usize {
	let mut slot_of = vec![0usize; aug.layer.len()];
	for row in ordering {
		for (slot, &v) in row.iter().enumerate() {
			slot_of[v] = slot;
		}
	}

	let mut total = 0;
	for row in ordering {
		let segments: Vec<(usize, usize)> = row
			.iter()
			.flat_map(|&s| aug.succ[s].iter().map(move |&t| (s, t)))
			.map(|(s, t)| (slot_of[s], slot_of[t]))
			.collect();
		for (i, &(a0, a1)) in segments.iter().enumerate() {
			for &(b0, b1) in &segments[i + 1..] {
				if (a0 < b0 && a1 > b1) || (a0 > b0 && a1 < b1) {
					total += 1;
				}
			}
		}
	}
	total
}
