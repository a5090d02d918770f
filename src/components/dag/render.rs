use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, Path2d};

use super::arena::{Node, NodeMeasure};
use super::state::DagState;
use super::types::{NodeClass, Orientation, Point};

const BACKGROUND: &str = "#f5f6f8";
const NODE_FILL: &str = "#ffffff";
const NODE_STROKE: &str = "#9aa5b1";
const NODE_DRAGGING: &str = "#3b82f6";
const LABEL: &str = "#1f2933";
const EDGE: &str = "#7b8794";
const EDGE_SELECTED: &str = "#2563eb";
const CONNECTOR: &str = "#3b82f6";
const FONT: &str = "13px sans-serif";

const LABEL_PADDING: f64 = 16.0;
const CORNER_RADIUS: f64 = 6.0;
const CONNECTOR_SIZE: f64 = 4.0;
const ARROW_SIZE: f64 = 6.0;

/// Node sizes from canvas text metrics: the label plus padding, never
/// smaller than the layout hint.
pub struct CanvasMeasure<'a> {
	ctx: &'a CanvasRenderingContext2d,
	hint: [f64; 2],
}

impl<'a> CanvasMeasure<'a> {
	pub fn new(ctx: &'a CanvasRenderingContext2d, hint: [f64; 2]) -> Self {
		Self { ctx, hint }
	}
}

impl NodeMeasure for CanvasMeasure<'_> {
	fn measure(&self, node: &Node) -> Option<(f64, f64)> {
		self.ctx.set_font(FONT);
		let metrics = self.ctx.measure_text(node.display_label()).ok()?;
		Some(((metrics.width() + 2.0 * LABEL_PADDING).max(self.hint[0]), self.hint[1]))
	}
}

pub fn render(state: &DagState, ctx: &CanvasRenderingContext2d) {
	let (width, height) = state.viewport().size();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);

	let t = state.viewport().transform();
	ctx.save();
	let _ = ctx.translate(t.x, t.y);
	let _ = ctx.scale(t.k, t.k);
	draw_edges(state, ctx);
	draw_dragged_edge(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &DagState, ctx: &CanvasRenderingContext2d) {
	let k = state.viewport().transform().k;
	let orientation = state.arena().orientation();
	for edge in state.arena().edges_in_paint_order() {
		let Ok(path) = Path2d::new_with_path_string(&edge.path) else {
			continue;
		};
		let color = if edge.selected { EDGE_SELECTED } else { EDGE };
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(if edge.selected { 2.5 } else { 1.5 } / k.max(0.5));
		ctx.stroke_with_path(&path);
		draw_arrow(ctx, edge.points[2], orientation, color);
	}
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, tip: Point, orientation: Orientation, color: &str) {
	let (back, side) = match orientation {
		Orientation::Horizontal => ((-ARROW_SIZE, 0.0), (0.0, ARROW_SIZE / 2.0)),
		Orientation::Vertical => ((0.0, -ARROW_SIZE), (ARROW_SIZE / 2.0, 0.0)),
	};
	ctx.set_fill_style_str(color);
	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(tip.x + back.0 + side.0, tip.y + back.1 + side.1);
	ctx.line_to(tip.x + back.0 - side.0, tip.y + back.1 - side.1);
	ctx.close_path();
	ctx.fill();
}

fn draw_dragged_edge(state: &DagState, ctx: &CanvasRenderingContext2d) {
	let Some(edge) = state.interaction().dragged_edge() else {
		return;
	};
	let [from, to] = edge.points;
	let dash = 6.0 / state.viewport().transform().k;
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(dash),
		&JsValue::from_f64(dash),
	));
	ctx.set_stroke_style_str(CONNECTOR);
	ctx.set_line_width(1.5);
	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(to.x, to.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &DagState, ctx: &CanvasRenderingContext2d) {
	let orientation = state.arena().orientation();
	let show_connectors = state.interaction().selectable();
	ctx.set_font(FONT);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for node in state.arena().nodes_in_paint_order() {
		let r = node.rect;
		rounded_rect(ctx, r.x, r.y, r.width, r.height, CORNER_RADIUS);
		ctx.set_fill_style_str(NODE_FILL);
		ctx.fill();
		let dragging = node.class == Some(NodeClass::Dragging);
		ctx.set_stroke_style_str(if dragging { NODE_DRAGGING } else { NODE_STROKE });
		ctx.set_line_width(if dragging { 2.0 } else { 1.0 });
		ctx.stroke();

		let c = r.center();
		ctx.set_fill_style_str(LABEL);
		let _ = ctx.fill_text(node.display_label(), c.x, c.y);

		if show_connectors {
			let p = node.source_anchor(orientation);
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, CONNECTOR_SIZE, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(CONNECTOR);
			ctx.fill();
		}
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}
