use leptos::prelude::*;

use crate::components::dag::{DagHandle, DagView, EdgeSpec, NodeSpec, Selection};

/// A small build pipeline.
fn sample_nodes() -> Vec<NodeSpec> {
	[
		("fetch", "Fetch"),
		("deps", "Resolve"),
		("lint", "Lint"),
		("build", "Build"),
		("test", "Test"),
		("bench", "Bench"),
		("package", "Package"),
		("deploy", "Deploy"),
	]
	.into_iter()
	.map(|(name, label)| NodeSpec::new(name).with_label(label))
	.collect()
}

fn sample_edges() -> Vec<EdgeSpec> {
	[
		("fetch", "deps"),
		("fetch", "lint"),
		("deps", "build"),
		("build", "test"),
		("build", "bench"),
		("lint", "package"),
		("test", "package"),
		("package", "deploy"),
	]
	.into_iter()
	.map(|(source, target)| EdgeSpec::new(source, target))
	.collect()
}

fn describe(selection: Option<Selection>) -> String {
	match selection {
		Some(Selection { id, multiple: true }) => format!("{id} (+)"),
		Some(Selection { id, .. }) => id,
		None => "none".into(),
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let nodes = RwSignal::new(sample_nodes());
	let edges = RwSignal::new(sample_edges());
	let selected = RwSignal::new(String::from("none"));
	let failure = RwSignal::new(None::<String>);
	let handle = DagHandle::new();

	let on_node_selected = Callback::new(move |s: Option<Selection>| selected.set(describe(s)));
	let on_edge_selected = Callback::new(move |s: Option<Selection>| selected.set(describe(s)));
	let on_edge_create = Callback::new(move |(source, target): (String, String)| {
		edges.update(|edges| {
			let edge = EdgeSpec::new(source, target);
			if !edges.iter().any(|e| e.id == edge.id) {
				edges.push(edge);
			}
		});
	});
	let on_render_error = Callback::new(move |e: Option<String>| failure.set(e));

	let add_node = move |_: leptos::ev::MouseEvent| {
		nodes.update(|nodes| {
			let name = format!("step{}", nodes.len() + 1);
			nodes.push(NodeSpec::new(name));
		});
	};

	let (h_in, h_out, h_fit, h_flip, h_refresh) = (
		handle.clone(),
		handle.clone(),
		handle.clone(),
		handle.clone(),
		handle.clone(),
	);

	view! {
		<div class="dag-page">
			<div class="dag-toolbar">
				<button on:click=move |_| h_in.zoom_in()>"+"</button>
				<button on:click=move |_| h_out.zoom_out()>"-"</button>
				<button on:click=move |_| h_fit.zoom_to_fit()>"Fit"</button>
				<button on:click=move |_| h_flip.set_orientation(h_flip.orientation().toggled())>
					"Rotate"
				</button>
				<button on:click=move |_| h_refresh.refresh()>"Re-layout"</button>
				<button on:click=add_node>"Add step"</button>
				<span class="dag-status">
					"Selected: " {move || selected.get()}
					{move || failure.get().map(|e| view! { <span class="error">" | " {e}</span> })}
				</span>
			</div>
			<div class="dag-frame">
				// slots along a layer are spaced by height + gap, so a box no
				// wider than 96 + 24 keeps siblings apart after "Rotate"
				<DagView
					nodes=nodes
					node_size=[112.0, 96.0]
					edges=edges
					selectable=true
					persist_zoom=true
					persist_positions=true
					namespace="pipeline"
					handle=handle
					on_node_selected=on_node_selected
					on_edge_selected=on_edge_selected
					on_edge_create=on_edge_create
					on_render_error=on_render_error
				/>
			</div>
		</div>
	}
}
