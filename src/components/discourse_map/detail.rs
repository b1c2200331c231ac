use leptos::prelude::*;

use super::graph::RenderableGraph;

/// Detail overlay for the selected utterance. A pure projection of the
/// selection: resolves the selected id against the loaded snapshot and
/// renders nothing when no node is selected.
#[component]
pub fn DetailOverlay(
	#[prop(into)] data: Signal<RenderableGraph>,
	selected: RwSignal<Option<String>>,
) -> impl IntoView {
	let detail = Memo::new(move |_| {
		selected
			.get()
			.and_then(|id| data.with(|graph| graph.node(&id).cloned()))
	});

	view! {
		{move || {
			detail.get().map(|node| {
				view! {
					<div class="detail-overlay">
						<div class="detail-heading">{node.speaker.clone()} " (" {node.kind.clone()} ")"</div>
						<div class="detail-utterance">{node.utterance.clone()}</div>
						<button class="detail-close" on:click=move |_| selected.set(None)>
							"Close"
						</button>
					</div>
				}
			})
		}}
	}
}
