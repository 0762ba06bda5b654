//! Browser `fetch` implementation of [`Transport`].

use crate::{SubmitError, Transport, TransportResponse};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use log::warn;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

/// Sends requests through `window.fetch` relative to the page origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FetchTransport;

impl Transport for FetchTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: String,
    ) -> LocalBoxFuture<'a, Result<TransportResponse, SubmitError>> {
        async move { post_json(url, &body).await }.boxed_local()
    }
}

async fn post_json(url: &str, body: &str) -> Result<TransportResponse, SubmitError> {
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(url, &init).map_err(js_error)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(js_error)?;

    let value = JsFuture::from(gloo_utils::window().fetch_with_request(&request))
        .await
        .map_err(|e| {
            let err = js_error(e);
            warn!("POST {} failed: {}", url, err);
            err
        })?;
    let response: Response = value.dyn_into().map_err(js_error)?;

    // Body text is read even for error statuses so the server's reason can be shown.
    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;

    Ok(TransportResponse {
        status: response.status(),
        body: text.as_string().unwrap_or_default(),
    })
}

/// Best-effort description of a rejected JS promise.
fn js_error(value: JsValue) -> SubmitError {
    let msg = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value));
    SubmitError::Transport(msg)
}
