use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::analysis::{Orchestrator, request_analysis};
use crate::components::discourse_map::{DetailOverlay, DiscourseMapCanvas};

/// Transcript-to-map page: paste a transcript, send it off for analysis,
/// explore the resulting discourse map.
#[component]
pub fn Home() -> impl IntoView {
	let transcript = RwSignal::new(String::new());
	let orchestrator = RwSignal::new(Orchestrator::new());
	let selected = RwSignal::new(None::<String>);

	let loading = Memo::new(move |_| orchestrator.with(|o| o.is_loading()));
	let error = Memo::new(move |_| orchestrator.with(|o| o.error().map(ToString::to_string)));
	let graph = Memo::new(move |_| orchestrator.with(|o| o.graph().cloned()));
	let map_data = Signal::derive(move || graph.get().unwrap_or_default());

	let on_submit = move |_| {
		let raw = transcript.get_untracked();
		let Some(dispatch) = orchestrator.try_update(|o| o.submit(&raw)).flatten() else {
			return;
		};
		spawn_local(async move {
			let outcome = request_analysis(&dispatch.records).await;
			orchestrator.update(|o| {
				o.resolve(dispatch.generation, outcome);
			});
		});
	};

	view! {
		<div class="discourse-app">
			<h1>"Discussion Map"</h1>
			<textarea
				prop:value=move || transcript.get()
				on:input=move |ev| transcript.set(event_target_value(&ev))
				placeholder="Paste the meeting transcript here as a JSON array"
				rows=12
			></textarea>
			<button class="submit-button" on:click=on_submit disabled=move || loading.get()>
				{move || if loading.get() { "Generating…" } else { "Generate map" }}
			</button>
			{move || {
				error
					.get()
					.map(|message| view! { <div class="submit-error">{message}</div> })
			}}
			<div class="map-region">
				{move || {
					loading
						.get()
						.then(|| view! { <div class="loading-indicator">"Analyzing transcript…"</div> })
				}}
				<Show
					when=move || graph.with(|g| g.is_some())
					fallback=|| {
						view! {
							<div class="map-placeholder">"The discussion map will appear here."</div>
						}
					}
				>
					<DiscourseMapCanvas data=map_data selected=selected />
					<DetailOverlay data=map_data selected=selected />
				</Show>
			</div>
		</div>
	}
}
