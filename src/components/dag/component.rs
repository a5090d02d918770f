use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render::{self, CanvasMeasure};
use super::state::{DagConfig, DagState};
use super::store::default_store;
use super::types::{DagEvent, EdgeSpec, Modifiers, NodeSpec, Orientation, Point, Selection};

type Slot = Rc<RefCell<Option<DagState>>>;

/// Imperative access to a mounted [`DagView`]. Calls before mount are
/// ignored.
#[derive(Clone, Default)]
pub struct DagHandle {
	state: Slot,
}

impl DagHandle {
	pub fn new() -> Self {
		Self::default()
	}

	fn with<R>(&self, f: impl FnOnce(&mut DagState) -> R) -> Option<R> {
		self.state.borrow_mut().as_mut().map(f)
	}

	/// Queue a layout pass with the current inputs.
	pub fn refresh(&self) {
		self.with(|s| s.refresh(now_ms()));
	}

	pub fn orientation(&self) -> Orientation {
		self.with(|s| s.orientation()).unwrap_or_default()
	}

	pub fn set_orientation(&self, orientation: Orientation) {
		self.with(|s| s.set_orientation(orientation, now_ms()));
	}

	pub fn zoom_in(&self) {
		self.with(DagState::zoom_in);
	}

	pub fn zoom_out(&self) {
		self.with(DagState::zoom_out);
	}

	pub fn zoom_to_fit(&self) {
		self.with(DagState::zoom_to_fit);
	}

	/// Whether a view currently owns this handle's state.
	pub fn is_mounted(&self) -> bool {
		self.state.borrow().is_some()
	}

	fn detach(&self) {
		self.state.borrow_mut().take();
	}
}

type Listener = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Browser callbacks of one mounted view, released on unmount.
#[derive(Clone, Default)]
struct Callbacks {
	animate: Listener,
	frame: Rc<Cell<Option<i32>>>,
	resize: Listener,
}

impl Callbacks {
	fn request_frame(&self, window: &web_sys::Window) {
		if let Some(ref cb) = *self.animate.borrow() {
			self.frame
				.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	}

	/// Cancel the pending frame, unhook the resize listener and drop both
	/// closures. Must not run from inside the frame callback.
	fn release(&self) {
		let window = web_sys::window();
		if let (Some(window), Some(id)) = (&window, self.frame.take()) {
			let _ = window.cancel_animation_frame(id);
		}
		self.animate.borrow_mut().take();
		if let Some(cb) = self.resize.borrow_mut().take() {
			if let Some(window) = &window {
				let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
	}
}

fn now_ms() -> f64 {
	js_sys::Date::now()
}

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> Point {
	let rect = canvas.get_bounding_client_rect();
	Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn modifiers(ev: &MouseEvent) -> Modifiers {
	Modifiers {
		shift: ev.shift_key(),
		ctrl: ev.ctrl_key(),
		meta: ev.meta_key(),
		alt: ev.alt_key(),
	}
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((800.0, 600.0))
}

/// Layered DAG rendered to a canvas. Node and edge signals are coalesced
/// and laid out once they settle.
#[component]
pub fn DagView(
	#[prop(into)] nodes: Signal<Vec<NodeSpec>>,
	#[prop(into)] edges: Signal<Vec<EdgeSpec>>,
	#[prop(default = [160.0, 48.0])] node_size: [f64; 2],
	#[prop(default = false)] selectable: bool,
	#[prop(default = false)] persist_zoom: bool,
	#[prop(default = false)] persist_positions: bool,
	#[prop(into, default = "dag".to_string())] namespace: String,
	#[prop(default = Orientation::Horizontal)] orientation: Orientation,
	#[prop(optional)] handle: Option<DagHandle>,
	#[prop(optional)] on_node_selected: Option<Callback<Option<Selection>>>,
	#[prop(optional)] on_edge_selected: Option<Callback<Option<Selection>>>,
	#[prop(optional)] on_edge_create: Option<Callback<(String, String)>>,
	/// Called with the failure message, then with `None` once a later pass
	/// succeeds.
	#[prop(optional)] on_render_error: Option<Callback<Option<String>>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let handle = handle.unwrap_or_default();
	let state: Slot = handle.state.clone();
	let callbacks = Callbacks::default();

	let config = DagConfig {
		namespace,
		node_size,
		selectable,
		persist_zoom,
		persist_positions,
		..DagConfig::default()
	};
	let mut initial = DagState::new(config, default_store());
	initial.set_orientation(orientation, now_ms());
	initial.refresh(now_ms());
	*state.borrow_mut() = Some(initial);

	let dispatch: Rc<dyn Fn(Vec<DagEvent>)> = Rc::new(move |events: Vec<DagEvent>| {
		for event in events {
			match event {
				DagEvent::NodeSelected { name, multiple } => {
					if let Some(cb) = &on_node_selected {
						cb.run(Some(Selection { id: name, multiple }));
					}
				}
				DagEvent::NodeUnselected => {
					if let Some(cb) = &on_node_selected {
						cb.run(None);
					}
				}
				DagEvent::EdgeSelected { id, multiple } => {
					if let Some(cb) = &on_edge_selected {
						cb.run(Some(Selection { id, multiple }));
					}
				}
				DagEvent::EdgeUnselected => {
					if let Some(cb) = &on_edge_selected {
						cb.run(None);
					}
				}
				DagEvent::EdgeCreate { source, target } => {
					if let Some(cb) = &on_edge_create {
						cb.run((source, target));
					}
				}
				DagEvent::RenderError(message) => {
					if let Some(cb) = &on_render_error {
						cb.run(Some(message));
					}
				}
				DagEvent::RenderRecovered => {
					if let Some(cb) = &on_render_error {
						cb.run(None);
					}
				}
			}
		}
	});

	let state_nodes = state.clone();
	Effect::new(move |_| {
		let nodes = nodes.get();
		if let Some(ref mut s) = *state_nodes.borrow_mut() {
			s.set_nodes(nodes, now_ms());
		}
	});

	let state_edges = state.clone();
	Effect::new(move |_| {
		let edges = edges.get();
		if let Some(ref mut s) = *state_edges.borrow_mut() {
			s.set_edges(edges, now_ms());
		}
	});

	let teardown = StoredValue::new_local((callbacks.clone(), handle));
	on_cleanup(move || {
		teardown.try_with_value(|(callbacks, handle)| {
			callbacks.release();
			handle.detach();
		});
	});

	let (state_init, dispatch_init) = (state.clone(), dispatch.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::warn!("dag canvas has no 2d context");
			return;
		};

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		if let Some(ref mut s) = *state_init.borrow_mut() {
			s.resize(w, h);
		}

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*callbacks.resize.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *callbacks.resize.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, callbacks_anim, dispatch_anim) =
			(state_init.clone(), callbacks.clone(), dispatch_init.clone());
		*callbacks.animate.borrow_mut() = Some(Closure::new(move || {
			let events = match *state_anim.borrow_mut() {
				Some(ref mut s) => {
					let measure = CanvasMeasure::new(&ctx, s.config().node_size);
					let events = s.poll(now_ms(), &measure);
					if s.take_dirty() {
						render::render(s, &ctx);
					}
					events
				}
				None => Vec::new(),
			};
			dispatch_anim(events);
			if let Some(win) = web_sys::window() {
				callbacks_anim.request_frame(&win);
			}
		}));
		callbacks.request_frame(&window);
	});

	let canvas_of = move || -> Option<HtmlCanvasElement> { canvas_ref.get().map(Into::into) };

	let (state_md, dispatch_md) = (state.clone(), dispatch.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_of() else {
			return;
		};
		let p = local_point(&canvas, &ev);
		let events = match *state_md.borrow_mut() {
			Some(ref mut s) => s.pointer_down(p, modifiers(&ev)),
			None => return,
		};
		dispatch_md(events);
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_of() else {
			return;
		};
		let p = local_point(&canvas, &ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(p);
		}
	};

	let (state_mu, dispatch_mu) = (state.clone(), dispatch.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_of() else {
			return;
		};
		let p = local_point(&canvas, &ev);
		let events = match *state_mu.borrow_mut() {
			Some(ref mut s) => s.pointer_up(p),
			None => return,
		};
		dispatch_mu(events);
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_of() else {
			return;
		};
		let p = local_point(&canvas, &ev);
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(p, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="dag-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: default;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::dag::store::MemoryStore;

	fn mounted() -> DagHandle {
		let handle = DagHandle::new();
		let mut state = DagState::new(DagConfig::default(), Rc::new(MemoryStore::default()));
		state.resize(400.0, 300.0);
		*handle.state.borrow_mut() = Some(state);
		handle
	}

	fn scale(handle: &DagHandle) -> Option<f64> {
		handle.with(|s| s.viewport().transform().k)
	}

	#[test]
	fn clones_share_the_mounted_view() {
		let handle = mounted();
		let other = handle.clone();
		other.zoom_in();
		assert!(handle.is_mounted());
		assert!((scale(&handle).unwrap() - 1.1).abs() < 1e-9);
	}

	#[test]
	fn unmount_detaches_every_clone() {
		let handle = mounted();
		let kept = handle.clone();
		handle.detach();
		assert!(!kept.is_mounted());
		kept.zoom_in();
		kept.zoom_to_fit();
		assert_eq!(scale(&kept), None);
		assert_eq!(kept.orientation(), Orientation::Horizontal);
	}
}
