//! Chart controls panel

use ab_core::Variation;
use ab_state::{
    Granularity, LineStyle, MAX_ZOOM, MIN_ZOOM, Theme, UserEvent, ZOOM_STEP,
    use_dashboard_computed, use_dashboard_state,
};
use leptos::prelude::*;
use web_sys::HtmlInputElement;

#[component]
pub fn Controls() -> impl IntoView {
    let state = use_dashboard_state();
    let computed = use_dashboard_computed();

    // The variation set is fixed for the session
    let variations = state.dashboard.with_untracked(|d| d.variations().to_vec());

    view! {
        <div class=move || format!("controls {}", computed.theme.get().css_class())>
            <div class="controls-header">
                <h3 class="controls-title">"Chart Controls"</h3>
            </div>

            <div class="controls-body">
                <div class="controls-section">
                    <div class="block-label">"Variations"</div>
                    <div class="variations">
                        {variations.into_iter().map(|v| view! { <VariationCheckbox variation=v /> }).collect_view()}
                    </div>
                </div>

                <div class="controls-section">
                    <div class="block-label">"Granularity"</div>
                    <div class="segment">
                        {Granularity::all().iter().copied().map(|g| {
                            view! {
                                <button
                                    class=move || {
                                        if computed.granularity.get() == g {
                                            "segment-btn active"
                                        } else {
                                            "segment-btn"
                                        }
                                    }
                                    on:click=move |_| {
                                        state.dispatch(UserEvent::SetGranularity(g));
                                    }
                                >
                                    {g.label()}
                                </button>
                            }
                        }).collect_view()}
                    </div>

                    <div class="block-label spaced">"Line Style"</div>
                    <select
                        class="select"
                        prop:value=move || computed.line_style.get().as_str()
                        on:change=move |ev| {
                            if let Some(style) = LineStyle::parse(&event_target_value(&ev)) {
                                state.dispatch(UserEvent::SetLineStyle(style));
                            }
                        }
                    >
                        {LineStyle::all().iter().copied().map(|s| {
                            view! {
                                <option
                                    value=s.as_str()
                                    selected=move || computed.line_style.get() == s
                                >
                                    {s.label()}
                                </option>
                            }
                        }).collect_view()}
                    </select>
                </div>

                <div class="controls-section">
                    <div class="block-label">"Theme"</div>
                    <select
                        class="select"
                        prop:value=move || computed.theme.get().as_str()
                        on:change=move |ev| {
                            if let Some(theme) = Theme::parse(&event_target_value(&ev)) {
                                state.dispatch(UserEvent::SetTheme(theme));
                            }
                        }
                    >
                        {Theme::all().iter().copied().map(|t| {
                            view! {
                                <option value=t.as_str() selected=move || computed.theme.get() == t>
                                    {t.label()}
                                </option>
                            }
                        }).collect_view()}
                    </select>

                    <div class="block-label spaced">"Zoom"</div>
                    <div class="zoom-control">
                        <input
                            type="range"
                            class="zoom-slider"
                            min=MIN_ZOOM
                            max=MAX_ZOOM
                            step=ZOOM_STEP
                            prop:value=move || computed.zoom.get().percent().to_string()
                            style=move || {
                                format!("--zoom: {:.1}%", computed.zoom.get().slider_ratio() * 100.0)
                            }
                            on:input=move |ev| {
                                if let Ok(value) = event_target_value(&ev).parse::<i64>() {
                                    state.dispatch(UserEvent::SetZoom(value));
                                }
                            }
                        />
                        <span class="zoom-value">{move || computed.zoom.get().to_string()}</span>
                    </div>
                </div>
            </div>

            <div class="controls-footer">
                <button class="btn" on:click=move |_| { state.dispatch(UserEvent::ResetZoom); }>
                    "Reset Zoom"
                </button>
                <button class="btn ghost" on:click=move |_| state.reset_preferences()>
                    "Reset Preferences"
                </button>
                <button class="btn primary" on:click=move |_| { state.dispatch(UserEvent::RequestExport); }>
                    "Export PNG"
                </button>
            </div>
        </div>
    }
}

/// One variation toggle
#[component]
fn VariationCheckbox(variation: Variation) -> impl IntoView {
    let state = use_dashboard_state();
    let computed = use_dashboard_computed();

    let key = variation.key;
    let toggle_key = key.clone();
    let checked = Memo::new(move |_| computed.selected.with(|s| s.contains(&key)));

    view! {
        <label class=move || if checked.get() { "checkbox checked" } else { "checkbox" }>
            <input
                type="checkbox"
                prop:checked=move || checked.get()
                on:change=move |ev| {
                    let selected = state.toggle(toggle_key.clone());
                    // The browser flips the box even when the last key is kept
                    event_target::<HtmlInputElement>(&ev).set_checked(selected);
                }
            />
            <span class="checkbox-custom" style=format!("border-color: {}", variation.color)>
                <svg class="check-icon" viewBox="0 0 12 10">
                    <path
                        d="M1 5L4.5 8.5L11 1.5"
                        stroke="currentColor"
                        stroke-width="2"
                        stroke-linecap="round"
                        stroke-linejoin="round"
                        fill="none"
                    />
                </svg>
            </span>
            <span class="checkbox-label">{variation.name}</span>
        </label>
    }
}
