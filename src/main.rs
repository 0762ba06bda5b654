//! Main module for the genre/decade picker using Yew.
//! Wires the selection form hook to the view components.

use log::{info, warn};
use recco_picker::{read_options_from_csv_string, FormConfig, SelectOption};
use std::rc::Rc;
use yew::prelude::*;

mod components;
mod config;
mod hooks;
mod utils;

use components::{
    CheckboxList, GenreSearchModal, LimitInput, NoticeBanner, SelectionSummary, SubmitButton,
};
use config::*;
use hooks::use_selection_form;

/// Parse an embedded catalog, falling back to an empty list so the page still renders.
fn load_catalog(name: &str, csv_data: &str) -> Rc<Vec<SelectOption>> {
    let (id_column, label_column) = CATALOG_COLUMNS;
    match read_options_from_csv_string(csv_data, id_column, label_column) {
        Ok(options) => Rc::new(options),
        Err(e) => {
            warn!("Could not load {} catalog: {}", name, e);
            Rc::new(Vec::new())
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: Rc<FormConfig>,
}

/// Primary application component wiring the form state to the page.
#[function_component(App)]
fn app(props: &AppProps) -> Html {
    let genres = use_state(|| load_catalog("genre", include_str!("genres.csv")));
    let decades = use_state(|| load_catalog("decade", include_str!("decades.csv")));
    let modal_open = use_state(|| false);
    let list_shown = use_state(|| true);

    let form = use_selection_form((*genres).clone(), (*decades).clone(), props.config.clone());
    let state = &*form.state;
    let busy = state.is_busy();

    let open_modal = {
        let modal_open = modal_open.clone();
        Callback::from(move |_: MouseEvent| modal_open.set(true))
    };
    let close_modal = {
        let modal_open = modal_open.clone();
        Callback::from(move |_: MouseEvent| modal_open.set(false))
    };
    let toggle_list = {
        let list_shown = list_shown.clone();
        Callback::from(move |_: MouseEvent| list_shown.set(!*list_shown))
    };
    // Enter in a text field must not trigger a native submit
    let onsubmit = Callback::from(|e: SubmitEvent| e.prevent_default());

    html! {
        <div class="container recco-picker">
            <NoticeBanner notice={state.notice.clone()} on_dismiss={form.on_dismiss.clone()} />

            <form onsubmit={onsubmit}>
                <section class="genres mb-4">
                    <h2>{ "Genrer" }</h2>
                    <SelectionSummary title="Valda genrer" group={state.genres.clone()} />
                    <button type="button" class="btn btn-outline-secondary my-2"
                        disabled={busy}
                        onclick={open_modal}>
                        { "Sök genre" }
                    </button>
                    <LimitInput
                        id={RECCO_LIMIT_ID}
                        label="Antal rekommendationer"
                        value={state.recco_limit.clone()}
                        oninput={form.on_recco_limit_input.clone()}
                    />
                </section>

                <section class="decades mb-4">
                    <h2>{ "Årtal" }</h2>
                    <SelectionSummary title="Valda årtal" group={state.decades.clone()} />
                    <CheckboxList
                        group={state.decades.clone()}
                        checkbox_class={DECADE_CHECKBOX_CLASS}
                        list_id="decadeList"
                        disabled={busy}
                        onchange={form.on_decade_change.clone()}
                    />
                    <LimitInput
                        id={SEARCH_LIMIT_ID}
                        label="Antal låtar"
                        value={state.search_limit.clone()}
                        oninput={form.on_search_limit_input.clone()}
                    />
                </section>

                <SubmitButton busy={busy} onclick={form.on_submit.clone()} />
            </form>

            <GenreSearchModal
                open={*modal_open}
                group={state.genres.clone()}
                checkbox_class={GENRE_CHECKBOX_CLASS}
                filter={state.filter.clone()}
                list_shown={*list_shown}
                disabled={busy}
                on_filter_input={form.on_filter_input.clone()}
                on_change={form.on_genre_change.clone()}
                on_toggle_list={toggle_list}
                on_close={close_modal}
            />
        </div>
    }
}

/// Entry point: installs the panic hook and mounts the app on `#app`.
fn main() {
    console_error_panic_hook::set_once();

    let config = utils::read_form_config();
    info!(
        "Starting picker: recommendations={} search={} redirect={}",
        config.recommendations_url, config.search_url, config.redirect_to
    );
    let props = AppProps {
        config: Rc::new(config),
    };

    match gloo_utils::document().get_element_by_id(MOUNT_ID) {
        Some(root) => yew::Renderer::<App>::with_root_and_props(root, props).render(),
        None => yew::Renderer::<App>::with_props(props).render(),
    };
}
