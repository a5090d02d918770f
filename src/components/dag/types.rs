use std::ops::Sub;

use serde::{Deserialize, Serialize};

use super::diff::Identified;

/// A point in graph space, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}

	pub fn swapped(self) -> Point {
		Point::new(self.y, self.x)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

/// Axis-aligned rectangle; `x`/`y` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
	}

	pub fn center(&self) -> Point {
		Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	/// Smallest rectangle covering both.
	pub fn union(&self, other: &Rect) -> Rect {
		let (x0, y0) = (self.x.min(other.x), self.y.min(other.y));
		let (x1, y1) = (
			(self.x + self.width).max(other.x + other.width),
			(self.y + self.height).max(other.y + other.height),
		);
		Rect {
			x: x0,
			y: y0,
			width: x1 - x0,
			height: y1 - y0,
		}
	}
}

/// Direction in which layers advance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
	#[default]
	Horizontal,
	Vertical,
}

impl Orientation {
	pub fn toggled(self) -> Self {
		match self {
			Orientation::Horizontal => Orientation::Vertical,
			Orientation::Vertical => Orientation::Horizontal,
		}
	}
}

/// Declarative node input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeSpec {
	pub name: String,
	pub label: Option<String>,
	/// Anchor offset from the left edge, replacing the horizontal center.
	pub center_x: Option<f64>,
	/// Anchor offset from the top edge, replacing the vertical center.
	pub center_y: Option<f64>,
}

impl NodeSpec {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}
}

impl Identified for NodeSpec {
	fn identity(&self) -> &str {
		&self.name
	}
}

/// Declarative edge input, referencing nodes by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeSpec {
	pub id: String,
	pub source: String,
	pub target: String,
}

impl EdgeSpec {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		let (source, target) = (source.into(), target.into());
		Self {
			id: format!("{source}->{target}"),
			source,
			target,
		}
	}
}

impl Identified for EdgeSpec {
	fn identity(&self) -> &str {
		&self.id
	}
}

/// Stable arena slot of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Index of an edge in the current layout pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId(pub usize);

/// Transient visual state of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeClass {
	Dragging,
}

/// Keyboard modifiers held during a pointer gesture.
#[derive(Clone, Copy, Debug, Default)]
pub struct Modifiers {
	pub shift: bool,
	pub ctrl: bool,
	pub meta: bool,
	pub alt: bool,
}

impl Modifiers {
	/// Shift, ctrl and meta all engage multi-select.
	pub fn multiple(&self) -> bool {
		self.shift || self.ctrl || self.meta
	}
}

/// Viewport transform: graph point `p` is drawn at `p * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for Transform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// Selected node or edge as reported to the embedding view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
	pub id: String,
	/// A modifier key asked to extend the existing selection.
	pub multiple: bool,
}

/// Outputs for the embedding view.
#[derive(Clone, Debug, PartialEq)]
pub enum DagEvent {
	NodeSelected { name: String, multiple: bool },
	NodeUnselected,
	EdgeSelected { id: String, multiple: bool },
	EdgeUnselected,
	EdgeCreate { source: String, target: String },
	RenderError(String),
	RenderRecovered,
}
