use crate::utils::{checkbox_change, input_value, navigate_to};
use gloo_timers::callback::Timeout;
use log::warn;
use recco_picker::api::FetchTransport;
use recco_picker::{
    submit_selection, FormAction, FormConfig, RedirectPlan, SelectOption, SelectionForm,
};
use std::rc::Rc;
use web_sys::HtmlElement;
use yew::prelude::*;

/// Form state plus the event callbacks the view binds to.
#[derive(Clone)]
pub struct SelectionFormHandle {
    pub state: UseReducerHandle<SelectionForm>,
    /// `onchange` for `.genre-checkbox` inputs.
    pub on_genre_change: Callback<Event>,
    /// `onchange` for `.search-checkbox` inputs.
    pub on_decade_change: Callback<Event>,
    pub on_recco_limit_input: Callback<InputEvent>,
    pub on_search_limit_input: Callback<InputEvent>,
    pub on_filter_input: Callback<InputEvent>,
    /// Submit button click. Prevents the native form submission.
    pub on_submit: Callback<MouseEvent>,
    pub on_dismiss: Callback<MouseEvent>,
}

/// Custom hook owning the selection form for the page's lifetime.
///
/// A validated submit leaves a payload in `pending`; an effect picks it up,
/// performs the request and feeds the outcome back as an action. A success
/// schedules navigation to the configured destination.
#[hook]
pub fn use_selection_form(
    genres: Rc<Vec<SelectOption>>,
    decades: Rc<Vec<SelectOption>>,
    config: Rc<FormConfig>,
) -> SelectionFormHandle {
    let state = use_reducer(move || SelectionForm::new(genres, decades, config));

    let on_genre_change = {
        let dispatcher = state.dispatcher();
        Callback::from(move |e: Event| {
            let (id, checked) = checkbox_change(&e);
            dispatcher.dispatch(FormAction::ToggleGenre { id, checked });
        })
    };

    let on_decade_change = {
        let dispatcher = state.dispatcher();
        Callback::from(move |e: Event| {
            let (id, checked) = checkbox_change(&e);
            dispatcher.dispatch(FormAction::ToggleDecade { id, checked });
        })
    };

    let on_recco_limit_input = {
        let dispatcher = state.dispatcher();
        Callback::from(move |e: InputEvent| {
            dispatcher.dispatch(FormAction::SetReccoLimit(input_value(&e)));
        })
    };

    let on_search_limit_input = {
        let dispatcher = state.dispatcher();
        Callback::from(move |e: InputEvent| {
            dispatcher.dispatch(FormAction::SetSearchLimit(input_value(&e)));
        })
    };

    let on_filter_input = {
        let dispatcher = state.dispatcher();
        Callback::from(move |e: InputEvent| {
            dispatcher.dispatch(FormAction::SetFilter(input_value(&e)));
        })
    };

    let on_submit = {
        let dispatcher = state.dispatcher();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            dispatcher.dispatch(FormAction::Submit);
        })
    };

    let on_dismiss = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(FormAction::DismissNotice))
    };

    // Send whatever the last submit queued
    {
        let dispatcher = state.dispatcher();
        let config = state.config.clone();
        use_effect_with(state.pending.clone(), move |pending| {
            if let Some(payload) = pending.clone() {
                wasm_bindgen_futures::spawn_local(async move {
                    let outcome = match submit_selection(&FetchTransport, &config, &payload).await {
                        Ok(response) => FormAction::SubmitSucceeded(response.message),
                        Err(e) => {
                            warn!("Submission to {} failed: {}", payload.endpoint(&config), e);
                            FormAction::SubmitFailed(e.to_string())
                        }
                    };
                    dispatcher.dispatch(outcome);
                });
            }
            || ()
        });
    }

    // Leave the page once the server has answered
    {
        use_effect_with(state.redirect_plan(), move |plan| {
            let timer = match plan.clone() {
                RedirectPlan::Stay => None,
                RedirectPlan::Now(target) => {
                    navigate_to(&target);
                    None
                }
                RedirectPlan::After { delay_ms, target } => {
                    Some(Timeout::new(delay_ms, move || navigate_to(&target)))
                }
            };
            // dropping the handle cancels a redirect that has not fired yet
            move || drop(timer)
        });
    }

    SelectionFormHandle {
        state,
        on_genre_change,
        on_decade_change,
        on_recco_limit_input,
        on_search_limit_input,
        on_filter_input,
        on_submit,
        on_dismiss,
    }
}

/// Returns a node ref that receives focus each time `active` turns true.
#[hook]
pub fn use_focus_when(active: bool) -> NodeRef {
    let node = use_node_ref();
    {
        let node = node.clone();
        use_effect_with(active, move |active| {
            if *active {
                if let Some(el) = node.cast::<HtmlElement>() {
                    if let Err(e) = el.focus() {
                        warn!("Could not focus element: {:?}", e);
                    }
                }
            }
            || ()
        });
    }
    node
}
