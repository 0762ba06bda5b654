use crate::config::{
    ATTR_RECOMMENDATIONS_URL, ATTR_REDIRECT, ATTR_REDIRECT_DELAY, ATTR_SEARCH_URL, MOUNT_ID,
};
use log::{info, warn};
use recco_picker::FormConfig;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Value and checked state of the checkbox that fired `e`.
pub fn checkbox_change(e: &Event) -> (String, bool) {
    let input: HtmlInputElement = e.target_unchecked_into();
    (input.value(), input.checked())
}

/// Current text of the input that fired `e`.
pub fn input_value(e: &InputEvent) -> String {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.value()
}

pub fn navigate_to(path: &str) {
    info!("Navigating to {}", path);
    if let Err(e) = gloo_utils::window().location().set_href(path) {
        warn!("Navigation to {} failed: {:?}", path, e);
    }
}

/// Builds the form config from defaults plus the mount element's data attributes.
pub fn read_form_config() -> FormConfig {
    let mount = gloo_utils::document().get_element_by_id(MOUNT_ID);
    apply_overrides(FormConfig::default(), |name| {
        mount.as_ref().and_then(|el| el.get_attribute(name))
    })
}

/// Overrides `config` fields with whichever attributes `attr` returns.
/// Blank values are ignored; an invalid delay is logged and ignored.
pub fn apply_overrides(mut config: FormConfig, attr: impl Fn(&str) -> Option<String>) -> FormConfig {
    let non_blank = |name: &str| attr(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_blank(ATTR_REDIRECT) {
        config.redirect_to = v;
    }
    if let Some(v) = non_blank(ATTR_RECOMMENDATIONS_URL) {
        config.recommendations_url = v;
    }
    if let Some(v) = non_blank(ATTR_SEARCH_URL) {
        config.search_url = v;
    }
    if let Some(v) = non_blank(ATTR_REDIRECT_DELAY) {
        match validate_numeric_input::<u32>(&v, Some(0), Some(60_000), "Redirect delay") {
            Ok(ms) => config.redirect_delay_ms = ms,
            Err(e) => warn!("Ignoring {}: {}", ATTR_REDIRECT_DELAY, e),
        }
    }
    config
}

/// Generic numeric input validation
pub fn validate_numeric_input<T>(
    input: &str,
    min: Option<T>,
    max: Option<T>,
    field_name: &str,
) -> Result<T, String>
where
    T: std::str::FromStr + std::fmt::Display + PartialOrd,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field_name));
    }

    match trimmed.parse::<T>() {
        Ok(val) => {
            if let Some(min_val) = min {
                if val < min_val {
                    return Err(format!("{} must be at least {}", field_name, min_val));
                }
            }
            if let Some(max_val) = max {
                if val > max_val {
                    return Err(format!("{} cannot exceed {}", field_name, max_val));
                }
            }
            Ok(val)
        }
        Err(_) => Err(format!("{} must be a valid number", field_name)),
    }
}
