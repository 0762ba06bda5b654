//! Yew view components for the genre/decade picker.
//!
//! Everything here renders from props; state lives in the
//! `use_selection_form` hook.

use crate::config::{FILTER_INPUT_ID, GENRE_LIST_ID, MAX_LIMIT, MIN_LIMIT, MODAL_ID, SUBMIT_ID};
use crate::hooks::use_focus_when;
use recco_picker::{filter_options, matches_filter, CheckboxGroup, Notice};
use yew::prelude::*;

/// "3 av 40 genrer" under the filter box
fn render_match_count(group: &CheckboxGroup, filter: &str) -> Html {
    let total = group.options().len();
    let shown = filter_options(group.options(), filter).count();
    html! {
        <small class="text-muted match-count">{ format!("{} av {} genrer", shown, total) }</small>
    }
}

/// The single message slot replacing browser alerts.
#[derive(Properties, PartialEq)]
pub struct NoticeBannerProps {
    pub notice: Option<Notice>,
    pub on_dismiss: Callback<MouseEvent>,
}

#[function_component(NoticeBanner)]
pub fn notice_banner(props: &NoticeBannerProps) -> Html {
    let Some(notice) = &props.notice else {
        return html! {};
    };

    let (class, text) = match notice {
        Notice::Warning(t) => ("alert-warning", t),
        Notice::Info(t) => ("alert-success", t),
        Notice::Error(t) => ("alert-danger", t),
    };

    html! {
        <div class={classes!("alert", class, "d-flex", "justify-content-between")} role="alert">
            <span>{ text }</span>
            <button type="button" class="btn-close" aria-label="Stäng" onclick={props.on_dismiss.clone()} />
        </div>
    }
}

/// Checkbox list for one group. Options whose label does not match
/// `filter` stay in the DOM but are hidden, keeping their checked state.
#[derive(Properties, PartialEq)]
pub struct CheckboxListProps {
    pub group: CheckboxGroup,
    pub checkbox_class: &'static str,
    pub list_id: &'static str,
    #[prop_or_default]
    pub filter: String,
    #[prop_or(true)]
    pub shown: bool,
    #[prop_or_default]
    pub disabled: bool,
    pub onchange: Callback<Event>,
}

#[function_component(CheckboxList)]
pub fn checkbox_list(props: &CheckboxListProps) -> Html {
    let group = &props.group;

    html! {
        <div id={props.list_id} class={classes!("checkbox-list", props.shown.then_some("show"))}>
            { for group.options().iter().map(|option| {
                let hidden = !matches_filter(&option.label, &props.filter);
                html! {
                    <a class="dropdown-item" style={if hidden { "display: none" } else { "" }}>
                        <label class="form-check-label">
                            <input type="checkbox"
                                class={classes!("form-check-input", props.checkbox_class)}
                                value={option.id.clone()}
                                checked={group.is_checked(&option.id)}
                                disabled={props.disabled}
                                onchange={props.onchange.clone()}
                            />
                            { format!(" {}", option.label) }
                        </label>
                    </a>
                }
            }) }
        </div>
    }
}

/// Numeric limit field sent alongside a selection.
#[derive(Properties, PartialEq)]
pub struct LimitInputProps {
    pub id: &'static str,
    pub label: &'static str,
    pub value: String,
    pub oninput: Callback<InputEvent>,
}

#[function_component(LimitInput)]
pub fn limit_input(props: &LimitInputProps) -> Html {
    html! {
        <div class="form-group">
            <label for={props.id}>{ props.label }</label>
            <input type="number"
                class="form-control"
                id={props.id}
                min={MIN_LIMIT.to_string()}
                max={MAX_LIMIT.to_string()}
                value={props.value.clone()}
                oninput={props.oninput.clone()}
            />
        </div>
    }
}

/// Chosen options as badges, with the remaining room under the cap.
#[derive(Properties, PartialEq)]
pub struct SelectionSummaryProps {
    pub title: &'static str,
    pub group: CheckboxGroup,
}

#[function_component(SelectionSummary)]
pub fn selection_summary(props: &SelectionSummaryProps) -> Html {
    let group = &props.group;
    html! {
        <div class="selection-summary">
            <span class="me-2">{ format!("{} ({}/{}):", props.title, group.len(), group.limit().cap) }</span>
            if group.is_empty() {
                <span class="text-muted">{ "inga" }</span>
            } else {
                { for group.checked_options().map(|o| html! {
                    <span class="badge bg-secondary me-1">{ &o.label }</span>
                }) }
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SubmitButtonProps {
    pub busy: bool,
    pub onclick: Callback<MouseEvent>,
}

#[function_component(SubmitButton)]
pub fn submit_button(props: &SubmitButtonProps) -> Html {
    html! {
        <button type="submit" id={SUBMIT_ID} class="btn btn-primary"
            disabled={props.busy}
            onclick={props.onclick.clone()}>
            { if props.busy { "Skickar…" } else { "Skapa spellista" } }
        </button>
    }
}

/// Modal with the genre filter box and the filterable genre checkboxes.
/// The filter input is focused whenever the modal opens.
#[derive(Properties, PartialEq)]
pub struct GenreSearchModalProps {
    pub open: bool,
    pub group: CheckboxGroup,
    pub checkbox_class: &'static str,
    pub filter: String,
    pub list_shown: bool,
    pub disabled: bool,
    pub on_filter_input: Callback<InputEvent>,
    pub on_change: Callback<Event>,
    pub on_toggle_list: Callback<MouseEvent>,
    pub on_close: Callback<MouseEvent>,
}

#[function_component(GenreSearchModal)]
pub fn genre_search_modal(props: &GenreSearchModalProps) -> Html {
    let input_ref = use_focus_when(props.open);

    if !props.open {
        return html! {};
    }

    html! {
        <>
            <div class="modal fade show d-block" id={MODAL_ID} tabindex="-1" role="dialog" aria-modal="true">
                <div class="modal-dialog modal-dialog-scrollable">
                    <div class="modal-content">
                        <div class="modal-header">
                            <h5 class="modal-title">{ "Sök genre" }</h5>
                            <button type="button" class="btn-close" aria-label="Stäng" onclick={props.on_close.clone()} />
                        </div>
                        <div class="modal-body">
                            <div class="input-group mb-2">
                                <input type="text"
                                    class="form-control"
                                    id={FILTER_INPUT_ID}
                                    placeholder="Sök.."
                                    ref={input_ref}
                                    value={props.filter.clone()}
                                    oninput={props.on_filter_input.clone()}
                                />
                                <button type="button" class="btn btn-outline-secondary dropdown_btn"
                                    onclick={props.on_toggle_list.clone()}>
                                    { if props.list_shown { "Dölj" } else { "Visa" } }
                                </button>
                            </div>
                            { render_match_count(&props.group, &props.filter) }
                            <CheckboxList
                                group={props.group.clone()}
                                checkbox_class={props.checkbox_class}
                                list_id={GENRE_LIST_ID}
                                filter={props.filter.clone()}
                                shown={props.list_shown}
                                disabled={props.disabled}
                                onchange={props.on_change.clone()}
                            />
                        </div>
                        <div class="modal-footer">
                            <button type="button" class="btn btn-secondary" onclick={props.on_close.clone()}>
                                { "Klar" }
                            </button>
                        </div>
                    </div>
                </div>
            </div>
            <div class="modal-backdrop fade show"></div>
        </>
    }
}
