use log::debug;

use super::store::ScopedStore;
use super::types::{Point, Rect, Transform};

#[derive(Clone, Copy, Debug)]
pub struct ViewportConfig {
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Scale change per `zoom_in` / `zoom_out`.
	pub zoom_step: f64,
	/// Share of the viewport the graph occupies after `zoom_to_fit`.
	pub fit_ratio: f64,
	/// Scale factor per wheel notch.
	pub wheel_factor: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.1,
			max_zoom: 2.0,
			zoom_step: 0.1,
			fit_ratio: 0.85,
			wheel_factor: 1.1,
		}
	}
}

/// Pan/zoom state of one graph view.
pub struct Viewport {
	config: ViewportConfig,
	transform: Transform,
	width: f64,
	height: f64,
	persist: Option<ScopedStore>,
}

impl Viewport {
	pub fn new(config: ViewportConfig, persist: Option<ScopedStore>) -> Self {
		Self {
			config,
			transform: Transform::default(),
			width: 0.0,
			height: 0.0,
			persist,
		}
	}

	pub fn transform(&self) -> Transform {
		self.transform
	}

	pub fn config(&self) -> &ViewportConfig {
		&self.config
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn is_measured(&self) -> bool {
		self.width > 0.0 && self.height > 0.0
	}

	pub fn screen_to_graph(&self, p: Point) -> Point {
		let t = self.transform;
		Point::new((p.x - t.x) / t.k, (p.y - t.y) / t.k)
	}

	/// Adopt `next` unless it equals the current transform. Returns whether
	/// anything changed; only changes are persisted.
	pub fn commit(&mut self, next: Transform) -> bool {
		if next == self.transform {
			return false;
		}
		self.transform = next;
		if let Some(store) = &self.persist {
			store.save(&store.zoom_key(), &next);
		}
		true
	}

	pub fn zoom_in(&mut self) -> bool {
		self.step_zoom(self.config.zoom_step)
	}

	pub fn zoom_out(&mut self) -> bool {
		self.step_zoom(-self.config.zoom_step)
	}

	/// Steps never land on or beyond a bound; such a step is dropped.
	fn step_zoom(&mut self, delta: f64) -> bool {
		let k = self.transform.k + delta;
		if k >= self.config.max_zoom || k <= self.config.min_zoom {
			return false;
		}
		let center = Point::new(self.width / 2.0, self.height / 2.0);
		self.scale_about(k, center)
	}

	/// Wheel zoom about the pointer, clamped to the zoom range.
	pub fn wheel(&mut self, at: Point, delta_y: f64) -> bool {
		let factor = if delta_y > 0.0 {
			1.0 / self.config.wheel_factor
		} else {
			self.config.wheel_factor
		};
		let k = (self.transform.k * factor).clamp(self.config.min_zoom, self.config.max_zoom);
		self.scale_about(k, at)
	}

	/// Change scale keeping the graph point under `anchor` (screen space) fixed.
	fn scale_about(&mut self, k: f64, anchor: Point) -> bool {
		let t = self.transform;
		let ratio = k / t.k;
		self.commit(Transform {
			x: anchor.x - (anchor.x - t.x) * ratio,
			y: anchor.y - (anchor.y - t.y) * ratio,
			k,
		})
	}

	pub fn pan_to(&mut self, x: f64, y: f64) -> bool {
		self.commit(Transform { x, y, ..self.transform })
	}

	/// Center `bounds` at `fit_ratio` of the viewport. No-op until both the
	/// viewport and the graph have a size.
	pub fn zoom_to_fit(&mut self, bounds: Option<Rect>) -> bool {
		let Some(bounds) = bounds else {
			return false;
		};
		if bounds.width <= 0.0 || bounds.height <= 0.0 || !self.is_measured() {
			return false;
		}
		let fill = (bounds.width / self.width).max(bounds.height / self.height);
		let k = (self.config.fit_ratio / fill).clamp(self.config.min_zoom, self.config.max_zoom);
		let c = bounds.center();
		self.commit(Transform {
			x: self.width / 2.0 - c.x * k,
			y: self.height / 2.0 - c.y * k,
			k,
		})
	}

	/// Adopt a persisted transform, if one exists. Does not write back.
	pub fn restore(&mut self) -> bool {
		let Some(store) = &self.persist else {
			return false;
		};
		let Some(saved) = store.load::<Transform>(&store.zoom_key()) else {
			return false;
		};
		if !(saved.x.is_finite() && saved.y.is_finite() && saved.k.is_finite() && saved.k > 0.0) {
			return false;
		}
		debug!("restoring viewport {saved:?}");
		self.transform = Transform {
			k: saved.k.clamp(self.config.min_zoom, self.config.max_zoom),
			..saved
		};
		true
	}
}

#[cfg(test)]
mod tests {
	use std::rc::Rc;

	use super::*;
	use crate::components::dag::store::{MemoryStore, ViewStore};

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn zoom_in_stops_short_of_max() {
		let mut vp = Viewport::new(ViewportConfig::default(), None);
		vp.resize(400.0, 300.0);
		let mut steps = 0;
		while vp.zoom_in() {
			steps += 1;
			assert!(vp.transform().k < 2.0);
		}
		let k = vp.transform().k;
		assert_eq!(steps, 9);
		assert!(!vp.zoom_in());
		assert_eq!(vp.transform().k, k);
	}

	#[test]
	fn zoom_out_stops_above_min() {
		let mut vp = Viewport::new(ViewportConfig::default(), None);
		while vp.zoom_out() {
			assert!(vp.transform().k > 0.1);
		}
		assert!(vp.transform().k > 0.1);
	}

	#[test]
	fn stepping_keeps_viewport_center_fixed() {
		let mut vp = Viewport::new(ViewportConfig::default(), None);
		vp.resize(400.0, 300.0);
		let before = vp.screen_to_graph(Point::new(200.0, 150.0));
		assert!(vp.zoom_in());
		let after = vp.screen_to_graph(Point::new(200.0, 150.0));
		assert!(close(before.x, after.x) && close(before.y, after.y));
	}

	#[test]
	fn fit_scales_and_centers_bounds() {
		let mut vp = Viewport::new(ViewportConfig::default(), None);
		vp.resize(300.0, 100.0);
		let bounds = Rect {
			x: 20.0,
			y: 10.0,
			width: 100.0,
			height: 50.0,
		};
		assert!(vp.zoom_to_fit(Some(bounds)));
		let t = vp.transform();
		let k = (0.85_f64 / (100.0_f64 / 300.0).max(50.0 / 100.0)).clamp(0.1, 2.0);
		assert!(close(t.k, k));
		assert!(close(70.0 * t.k + t.x, 150.0));
		assert!(close(35.0 * t.k + t.y, 50.0));
	}

	#[test]
	fn fit_clamps_tiny_graphs_to_max_zoom() {
		let mut vp = Viewport::new(ViewportConfig::default(), None);
		vp.resize(1000.0, 1000.0);
		let bounds = Rect {
			x: 0.0,
			y: 0.0,
			width: 10.0,
			height: 10.0,
		};
		assert!(vp.zoom_to_fit(Some(bounds)));
		assert_eq!(vp.transform().k, 2.0);
	}

	#[test]
	fn fit_without_extent_is_a_no_op() {
		let mut vp = Viewport::new(ViewportConfig::default(), None);
		let flat = Rect {
			x: 0.0,
			y: 0.0,
			width: 100.0,
			height: 0.0,
		};
		vp.resize(300.0, 100.0);
		assert!(!vp.zoom_to_fit(Some(flat)));
		assert!(!vp.zoom_to_fit(None));
		vp.resize(0.0, 0.0);
		assert!(!vp.zoom_to_fit(Some(Rect { height: 5.0, ..flat })));
		assert_eq!(vp.transform(), Transform::default());
	}

	#[test]
	fn unchanged_transforms_are_not_persisted() {
		let memory = Rc::new(MemoryStore::default());
		let store = ScopedStore::new(memory.clone(), "ns");
		let mut vp = Viewport::new(ViewportConfig::default(), Some(store));
		assert!(!vp.commit(Transform::default()));
		assert!(memory.is_empty());
		assert!(vp.pan_to(5.0, 6.0));
		let saved = memory.get("ns.zoom").unwrap();
		memory.remove("ns.zoom").unwrap();
		assert!(!vp.pan_to(5.0, 6.0));
		assert!(memory.is_empty());
		assert!(saved.contains("\"x\":5.0"));
	}

	#[test]
	fn restore_reads_persisted_transform() {
		let memory = Rc::new(MemoryStore::default());
		memory.set("ns.zoom", r#"{"x":3.0,"y":4.0,"k":1.5}"#).unwrap();
		let mut vp = Viewport::new(ViewportConfig::default(), Some(ScopedStore::new(memory, "ns")));
		assert!(vp.restore());
		assert_eq!(vp.transform(), Transform { x: 3.0, y: 4.0, k: 1.5 });
	}

	#[test]
	fn restore_without_persistence_does_nothing() {
		let mut vp = Viewport::new(ViewportConfig::default(), None);
		assert!(!vp.restore());
	}

	#[test]
	fn wheel_zooms_about_pointer_within_range() {
		let mut vp = Viewport::new(ViewportConfig::default(), None);
		let at = Point::new(40.0, 60.0);
		let before = vp.screen_to_graph(at);
		assert!(vp.wheel(at, -1.0));
		let after = vp.screen_to_graph(at);
		assert!(close(before.x, after.x) && close(before.y, after.y));
		for _ in 0..100 {
			vp.wheel(at, -1.0);
		}
		assert_eq!(vp.transform().k, 2.0);
		assert!(!vp.wheel(at, -1.0));
	}
}
