use futures::future::LocalBoxFuture;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Default controller parameters
pub mod defaults {
    pub const GENRE_CAP: usize = 5;
    pub const DECADE_CAP: usize = 3;

    pub const GENRE_CAP_MESSAGE: &str = "Du kan max välja 5 genres.";
    pub const DECADE_CAP_MESSAGE: &str = "Du kan max välja 3 årtal.";
    pub const EMPTY_SELECTION_MESSAGE: &str = "Du måste välja minst en genre/årtal!";

    pub const RECOMMENDATIONS_URL: &str = "/recommendations";
    pub const SEARCH_URL: &str = "/search";
    pub const REDIRECT_TO: &str = "/";
    pub const REDIRECT_DELAY_MS: u32 = 1_500;

    /// Initial text of both limit inputs.
    pub const LIMIT: &str = "20";
}

/// One checkbox in a group: `id` is the value sent to the server, `label` the visible text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Csv(csv::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Csv(e) => write!(f, "Failed to read option catalog: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<csv::Error> for CatalogError {
    fn from(e: csv::Error) -> Self {
        CatalogError::Csv(e)
    }
}

/// Reads checkbox options from CSV content with a header row.
///
/// Rows that are short, have an empty id, or repeat an id already seen are
/// logged and skipped. A missing label falls back to the id.
pub fn read_options_from_csv_string(
    csv_content: &str,
    id_column: usize,
    label_column: usize,
) -> Result<Vec<SelectOption>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_content.as_bytes());

    reader.headers()?;

    let mut options = Vec::new();
    let mut seen_ids = HashSet::new();

    for (i, record) in reader.records().enumerate() {
        // header is line 1
        let line = i + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                debug!("Warning: {} on line {}", e, line);
                continue;
            }
        };

        let id = match record.get(id_column) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                debug!("Warning: Line {} has no id column, skipping", line);
                continue;
            }
        };

        if !seen_ids.insert(id.clone()) {
            debug!("Warning: Duplicate ID '{}' found on line {}, skipping", id, line);
            continue;
        }

        let label = record
            .get(label_column)
            .filter(|l| !l.is_empty())
            .unwrap_or(id.as_str())
            .to_string();

        options.push(SelectOption { id, label });
    }

    info!("Successfully loaded {} options from CSV content", options.len());
    Ok(options)
}

/// Cap and over-cap warning for one checkbox group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLimit {
    pub cap: usize,
    pub message: String,
}

impl GroupLimit {
    pub fn new(cap: usize, message: impl Into<String>) -> Self {
        Self {
            cap,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Checking one more box would exceed the group's cap.
    CapExceeded { cap: usize, message: String },
    UnknownOption(String),
    /// Submit was pressed with both groups empty.
    NothingSelected(String),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::CapExceeded { message, .. } => write!(f, "{}", message),
            SelectionError::UnknownOption(id) => write!(f, "Unknown option '{}'", id),
            SelectionError::NothingSelected(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for SelectionError {}

/// A capped group of checkboxes over a fixed option list.
///
/// The selection is always reported in option order, the way checked boxes
/// appear in the document, regardless of the order they were clicked in.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckboxGroup {
    options: Rc<Vec<SelectOption>>,
    checked: HashSet<String>,
    limit: GroupLimit,
}

impl CheckboxGroup {
    pub fn new(options: Rc<Vec<SelectOption>>, limit: GroupLimit) -> Self {
        Self {
            options,
            checked: HashSet::new(),
            limit,
        }
    }

    pub fn options(&self) -> &Rc<Vec<SelectOption>> {
        &self.options
    }

    pub fn limit(&self) -> &GroupLimit {
        &self.limit
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.checked.contains(id)
    }

    pub fn len(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    /// Checked ids in option order.
    pub fn selection(&self) -> Vec<String> {
        self.checked_options().map(|o| o.id.clone()).collect()
    }

    pub fn checked_options(&self) -> impl Iterator<Item = &SelectOption> + '_ {
        self.options.iter().filter(|o| self.checked.contains(&o.id))
    }

    /// Applies one checkbox change. A rejected change leaves the group untouched.
    pub fn toggle(&mut self, id: &str, checked: bool) -> Result<(), SelectionError> {
        if !checked {
            self.checked.remove(id);
            return Ok(());
        }

        if !self.options.iter().any(|o| o.id == id) {
            return Err(SelectionError::UnknownOption(id.to_string()));
        }

        if self.checked.contains(id) {
            return Ok(());
        }

        if self.checked.len() + 1 > self.limit.cap {
            return Err(SelectionError::CapExceeded {
                cap: self.limit.cap,
                message: self.limit.message.clone(),
            });
        }

        self.checked.insert(id.to_string());
        Ok(())
    }
}

/// Case-insensitive substring match of `filter` against `label`.
#[inline]
pub fn matches_filter(label: &str, filter: &str) -> bool {
    label.to_uppercase().contains(&filter.to_uppercase())
}

/// Lazily yields the options whose label contains `filter`, ignoring case.
/// An empty filter yields every option.
pub fn filter_options<'a>(
    options: &'a [SelectOption],
    filter: &str,
) -> impl Iterator<Item = &'a SelectOption> + 'a {
    let needle = filter.to_uppercase();
    options
        .iter()
        .filter(move |o| o.label.to_uppercase().contains(&needle))
}

/// Request body for one submission. Serializes to the bare object the
/// endpoints expect, e.g. `{"genres":["rock"],"recco_limit":"20"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SubmissionPayload {
    Recommendations {
        genres: Vec<String>,
        recco_limit: String,
    },
    Search {
        decades: Vec<String>,
        search_limit: String,
    },
}

impl SubmissionPayload {
    pub fn endpoint<'a>(&self, config: &'a FormConfig) -> &'a str {
        match self {
            SubmissionPayload::Recommendations { .. } => &config.recommendations_url,
            SubmissionPayload::Search { .. } => &config.search_url,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionPayload::Recommendations { .. } => "recommendations",
            SubmissionPayload::Search { .. } => "search",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The request never produced a response (network down, CORS, aborted).
    Transport(String),
    Status { status: u16, body: String },
    Decode(String),
    Encode(String),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Transport(msg) => write!(f, "Kunde inte nå servern: {}", msg),
            SubmitError::Status { status, body } => match status_reason(body) {
                Some(reason) => write!(f, "Servern svarade med fel {}: {}", status, reason),
                None => write!(f, "Servern svarade med fel {}", status),
            },
            SubmitError::Decode(msg) => write!(f, "Oväntat svar från servern: {}", msg),
            SubmitError::Encode(msg) => write!(f, "Kunde inte skapa förfrågan: {}", msg),
        }
    }
}

impl std::error::Error for SubmitError {}

const MAX_REASON_CHARS: usize = 200;

/// The `message` of a JSON error body, capped. Anything else (HTML error
/// pages, plain text) is left out of the user-facing text.
fn status_reason(body: &str) -> Option<String> {
    let message = serde_json::from_str::<SubmitResponse>(body).ok()?.message;
    let message = message.trim();
    if message.is_empty() {
        return None;
    }
    if message.chars().count() > MAX_REASON_CHARS {
        let capped: String = message.chars().take(MAX_REASON_CHARS).collect();
        Some(format!("{}…", capped))
    } else {
        Some(message.to_string())
    }
}

/// Raw HTTP outcome handed back by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// POSTs a JSON body and returns the status and body text.
pub trait Transport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: String,
    ) -> LocalBoxFuture<'a, Result<TransportResponse, SubmitError>>;
}

/// Sends `payload` to its endpoint and decodes the `{ message }` reply.
///
/// Non-2xx statuses and bodies without a `message` field are errors.
pub async fn submit_selection<T: Transport + ?Sized>(
    transport: &T,
    config: &FormConfig,
    payload: &SubmissionPayload,
) -> Result<SubmitResponse, SubmitError> {
    let url = payload.endpoint(config);
    let body = serde_json::to_string(payload).map_err(|e| SubmitError::Encode(e.to_string()))?;

    info!("Submitting {} request to {}", payload.kind(), url);
    let response = transport.post_json(url, body).await?;

    if !(200..300).contains(&response.status) {
        warn!("{} returned status {}", url, response.status);
        return Err(SubmitError::Status {
            status: response.status,
            body: response.body,
        });
    }

    serde_json::from_str::<SubmitResponse>(&response.body)
        .map_err(|e| SubmitError::Decode(e.to_string()))
}

/// Everything that differs between deployments of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    pub genre_limit: GroupLimit,
    pub decade_limit: GroupLimit,
    pub empty_selection_message: String,
    pub recommendations_url: String,
    pub search_url: String,
    pub redirect_to: String,
    pub redirect_delay_ms: u32,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            genre_limit: GroupLimit::new(defaults::GENRE_CAP, defaults::GENRE_CAP_MESSAGE),
            decade_limit: GroupLimit::new(defaults::DECADE_CAP, defaults::DECADE_CAP_MESSAGE),
            empty_selection_message: defaults::EMPTY_SELECTION_MESSAGE.to_string(),
            recommendations_url: defaults::RECOMMENDATIONS_URL.to_string(),
            search_url: defaults::SEARCH_URL.to_string(),
            redirect_to: defaults::REDIRECT_TO.to_string(),
            redirect_delay_ms: defaults::REDIRECT_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning(String),
    Info(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    /// A request is in flight; further submits are ignored.
    Submitting,
    /// The server accepted the submission; navigation is pending.
    Redirecting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    ToggleGenre { id: String, checked: bool },
    ToggleDecade { id: String, checked: bool },
    SetReccoLimit(String),
    SetSearchLimit(String),
    SetFilter(String),
    Submit,
    SubmitSucceeded(String),
    SubmitFailed(String),
    DismissNotice,
}

/// Page-lifetime state of the selection form.
///
/// All mutation goes through [`SelectionForm::apply`]; the network call
/// itself happens outside, driven by `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionForm {
    pub config: Rc<FormConfig>,
    pub genres: CheckboxGroup,
    pub decades: CheckboxGroup,
    pub recco_limit: String,
    pub search_limit: String,
    pub filter: String,
    pub notice: Option<Notice>,
    pub phase: SubmitPhase,
    /// Payload waiting to be sent, set when a submit passes validation.
    pub pending: Option<SubmissionPayload>,
}

/// What the page should do about navigation in the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectPlan {
    Stay,
    Now(String),
    After { delay_ms: u32, target: String },
}

impl SelectionForm {
    pub fn new(
        genre_options: Rc<Vec<SelectOption>>,
        decade_options: Rc<Vec<SelectOption>>,
        config: Rc<FormConfig>,
    ) -> Self {
        Self {
            genres: CheckboxGroup::new(genre_options, config.genre_limit.clone()),
            decades: CheckboxGroup::new(decade_options, config.decade_limit.clone()),
            config,
            recco_limit: defaults::LIMIT.to_string(),
            search_limit: defaults::LIMIT.to_string(),
            filter: String::new(),
            notice: None,
            phase: SubmitPhase::Idle,
            pending: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase != SubmitPhase::Idle
    }

    pub fn redirect_plan(&self) -> RedirectPlan {
        redirect_plan(self.phase, &self.config)
    }

    /// Chooses the request for the current selection. Genres win over decades.
    pub fn plan_submission(&self) -> Result<SubmissionPayload, SelectionError> {
        if !self.genres.is_empty() {
            Ok(SubmissionPayload::Recommendations {
                genres: self.genres.selection(),
                recco_limit: self.recco_limit.clone(),
            })
        } else if !self.decades.is_empty() {
            Ok(SubmissionPayload::Search {
                decades: self.decades.selection(),
                search_limit: self.search_limit.clone(),
            })
        } else {
            Err(SelectionError::NothingSelected(
                self.config.empty_selection_message.clone(),
            ))
        }
    }

    pub fn apply(&mut self, action: FormAction) {
        match action {
            FormAction::ToggleGenre { id, checked } => {
                let result = self.genres.toggle(&id, checked);
                self.after_toggle("genre", &id, result);
            }
            FormAction::ToggleDecade { id, checked } => {
                let result = self.decades.toggle(&id, checked);
                self.after_toggle("decade", &id, result);
            }
            FormAction::SetReccoLimit(value) => self.recco_limit = value,
            FormAction::SetSearchLimit(value) => self.search_limit = value,
            FormAction::SetFilter(value) => self.filter = value,
            FormAction::Submit => self.begin_submission(),
            FormAction::SubmitSucceeded(message) => {
                self.pending = None;
                self.phase = SubmitPhase::Redirecting;
                self.notice = Some(Notice::Info(message));
            }
            FormAction::SubmitFailed(message) => {
                self.pending = None;
                self.phase = SubmitPhase::Idle;
                self.notice = Some(Notice::Error(message));
            }
            FormAction::DismissNotice => self.notice = None,
        }
    }

    fn after_toggle(&mut self, group: &str, id: &str, result: Result<(), SelectionError>) {
        match result {
            Ok(()) => {
                if matches!(self.notice, Some(Notice::Warning(_))) {
                    self.notice = None;
                }
            }
            Err(e) => {
                debug!("Rejected {} toggle '{}': {}", group, id, e);
                self.notice = Some(Notice::Warning(e.to_string()));
            }
        }
    }

    fn begin_submission(&mut self) {
        if self.is_busy() {
            debug!("Submit ignored while {:?}", self.phase);
            return;
        }

        match self.plan_submission() {
            Ok(payload) => {
                self.notice = None;
                self.phase = SubmitPhase::Submitting;
                self.pending = Some(payload);
            }
            Err(e) => {
                debug!("Submit rejected: {}", e);
                self.notice = Some(Notice::Warning(e.to_string()));
            }
        }
    }
}

/// Navigation only happens after a successful submit; a zero delay means right away.
pub fn redirect_plan(phase: SubmitPhase, config: &FormConfig) -> RedirectPlan {
    if phase != SubmitPhase::Redirecting {
        return RedirectPlan::Stay;
    }
    let target = config.redirect_to.clone();
    match config.redirect_delay_ms {
        0 => RedirectPlan::Now(target),
        delay_ms => RedirectPlan::After { delay_ms, target },
    }
}

impl yew::functional::Reducible for SelectionForm {
    type Action = FormAction;

    fn reduce(self: Rc<Self>, action: FormAction) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

pub mod api;

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::FutureExt;
    use std::cell::RefCell;

    struct RecordingTransport {
        calls: RefCell<Vec<(String, String)>>,
        reply: Result<TransportResponse, SubmitError>,
    }

    impl RecordingTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                reply: Ok(TransportResponse {
                    status,
                    body: body.to_string(),
                }),
            }
        }

        fn failing(msg: &str) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                reply: Err(SubmitError::Transport(msg.to_string())),
            }
        }
    }

    impl Transport for RecordingTransport {
        fn post_json<'a>(
            &'a self,
            url: &'a str,
            body: String,
        ) -> LocalBoxFuture<'a, Result<TransportResponse, SubmitError>> {
            self.calls.borrow_mut().push((url.to_string(), body));
            let reply = self.reply.clone();
            async move { reply }.boxed_local()
        }
    }

    fn options(ids: &[&str]) -> Rc<Vec<SelectOption>> {
        Rc::new(
            ids.iter()
                .map(|id| {
                    let mut label = id.to_string();
                    label[..1].make_ascii_uppercase();
                    SelectOption::new(*id, label)
                })
                .collect(),
        )
    }

    fn form() -> SelectionForm {
        SelectionForm::new(
            options(&["rock", "pop", "jazz", "blues", "metal", "punk", "soul"]),
            options(&["1960", "1970", "1980", "1990", "2000"]),
            Rc::new(FormConfig::default()),
        )
    }

    /// Submits the way the page does: apply, send whatever is pending, feed the outcome back.
    fn drive(form: &mut SelectionForm, transport: &RecordingTransport) {
        form.apply(FormAction::Submit);
        if let Some(payload) = form.pending.clone() {
            let config = form.config.clone();
            let outcome = match block_on(submit_selection(transport, &config, &payload)) {
                Ok(resp) => FormAction::SubmitSucceeded(resp.message),
                Err(e) => FormAction::SubmitFailed(e.to_string()),
            };
            form.apply(outcome);
        }
    }

    fn check_genre(form: &mut SelectionForm, id: &str) {
        form.apply(FormAction::ToggleGenre {
            id: id.to_string(),
            checked: true,
        });
    }

    fn check_decade(form: &mut SelectionForm, id: &str) {
        form.apply(FormAction::ToggleDecade {
            id: id.to_string(),
            checked: true,
        });
    }

    #[test]
    fn sixth_genre_is_rejected_and_prior_five_kept() {
        let mut f = form();
        for id in ["rock", "pop", "jazz", "blues", "metal"] {
            check_genre(&mut f, id);
        }
        assert_eq!(f.genres.len(), 5);
        assert!(f.notice.is_none());

        check_genre(&mut f, "punk");

        assert_eq!(
            f.genres.selection(),
            vec!["rock", "pop", "jazz", "blues", "metal"]
        );
        assert!(!f.genres.is_checked("punk"));
        assert_eq!(
            f.notice,
            Some(Notice::Warning(defaults::GENRE_CAP_MESSAGE.to_string()))
        );
    }

    #[test]
    fn fourth_decade_is_rejected() {
        let mut f = form();
        for id in ["1960", "1970", "1980", "1990"] {
            check_decade(&mut f, id);
        }
        assert_eq!(f.decades.selection(), vec!["1960", "1970", "1980"]);
        assert_eq!(
            f.notice,
            Some(Notice::Warning(defaults::DECADE_CAP_MESSAGE.to_string()))
        );
    }

    #[test]
    fn cap_holds_over_mixed_toggle_sequence() {
        let mut group = CheckboxGroup::new(
            options(&["a", "b", "c", "d", "e", "f", "g"]),
            GroupLimit::new(3, "max 3"),
        );
        let steps = [
            ("a", true),
            ("b", true),
            ("c", true),
            ("d", true),
            ("b", false),
            ("d", true),
            ("e", true),
            ("a", false),
            ("a", false),
            ("f", true),
            ("g", true),
        ];
        for (id, checked) in steps {
            let _ = group.toggle(id, checked);
            assert!(group.len() <= 3);
        }
        assert_eq!(group.selection(), vec!["c", "d", "f"]);
    }

    #[test]
    fn selection_follows_option_order_not_click_order() {
        let mut f = form();
        check_genre(&mut f, "metal");
        check_genre(&mut f, "rock");
        check_genre(&mut f, "jazz");
        assert_eq!(f.genres.selection(), vec!["rock", "jazz", "metal"]);
    }

    #[test]
    fn recheck_and_uncheck_are_harmless() {
        let mut group = CheckboxGroup::new(options(&["a", "b"]), GroupLimit::new(1, "max 1"));
        assert!(group.toggle("a", true).is_ok());
        assert!(group.toggle("a", true).is_ok());
        assert_eq!(group.len(), 1);
        assert!(group.toggle("b", false).is_ok());
        assert!(group.toggle("a", false).is_ok());
        assert!(group.is_empty());
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut group = CheckboxGroup::new(options(&["a"]), GroupLimit::new(5, "max"));
        assert_eq!(
            group.toggle("zz", true),
            Err(SelectionError::UnknownOption("zz".to_string()))
        );
        assert!(group.is_empty());
    }

    #[test]
    fn successful_toggle_clears_cap_warning() {
        let mut f = form();
        for id in ["1960", "1970", "1980", "1990"] {
            check_decade(&mut f, id);
        }
        assert!(matches!(f.notice, Some(Notice::Warning(_))));
        f.apply(FormAction::ToggleDecade {
            id: "1960".into(),
            checked: false,
        });
        assert!(f.notice.is_none());
    }

    #[test]
    fn filter_leaves_hidden_selection_alone() {
        let mut f = form();
        check_genre(&mut f, "rock");
        f.apply(FormAction::SetFilter("pop".into()));

        assert_eq!(f.genres.selection(), vec!["rock"]);
        assert!(f.genres.is_checked("rock"));

        let transport = RecordingTransport::replying(200, r#"{"message":"ok"}"#);
        drive(&mut f, &transport);

        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/recommendations");
        let body: serde_json::Value = serde_json::from_str(&calls[0].1).unwrap();
        assert_eq!(body["genres"], serde_json::json!(["rock"]));
    }

    #[test]
    fn redirect_waits_for_success_and_honors_delay() {
        let config = FormConfig::default();
        assert_eq!(redirect_plan(SubmitPhase::Idle, &config), RedirectPlan::Stay);
        assert_eq!(redirect_plan(SubmitPhase::Submitting, &config), RedirectPlan::Stay);
        assert_eq!(
            redirect_plan(SubmitPhase::Redirecting, &config),
            RedirectPlan::After {
                delay_ms: defaults::REDIRECT_DELAY_MS,
                target: "/".into(),
            }
        );

        let immediate = FormConfig {
            redirect_delay_ms: 0,
            redirect_to: "/redirect-playlist".into(),
            ..FormConfig::default()
        };
        assert_eq!(
            redirect_plan(SubmitPhase::Redirecting, &immediate),
            RedirectPlan::Now("/redirect-playlist".into())
        );
    }

    #[test]
    fn successful_submit_plans_redirect() {
        let mut f = form();
        assert_eq!(f.redirect_plan(), RedirectPlan::Stay);
        check_decade(&mut f, "1970");
        drive(&mut f, &RecordingTransport::replying(200, r#"{"message":"ok"}"#));
        assert!(matches!(f.redirect_plan(), RedirectPlan::After { .. }));
    }

    #[test]
    fn empty_filter_shows_everything() {
        let opts = options(&["rock", "pop", "jazz"]);
        assert_eq!(filter_options(&opts, "").count(), 3);
    }

    #[test]
    fn absent_filter_hides_everything() {
        let opts = options(&["rock", "pop", "jazz"]);
        assert_eq!(filter_options(&opts, "polka").count(), 0);
    }

    #[test]
    fn filter_ignores_case_and_matches_substrings() {
        let opts = Rc::new(vec![
            SelectOption::new("hiphop", "Hip Hop"),
            SelectOption::new("trip", "Trip-Hop"),
            SelectOption::new("rock", "Rock"),
        ]);
        let ids: Vec<_> = filter_options(&opts, "hOp").map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["hiphop", "trip"]);
        assert!(matches_filter("Rock", "OC"));
        assert!(!matches_filter("Rock", " rock"));
    }

    #[test]
    fn filter_is_restartable() {
        let opts = options(&["rock", "pop", "punk"]);
        let first: Vec<_> = filter_options(&opts, "p").collect();
        let second: Vec<_> = filter_options(&opts, "ro").collect();
        let again: Vec<_> = filter_options(&opts, "p").collect();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(first, again);
    }

    #[test]
    fn genres_go_to_recommendations() {
        let mut f = form();
        check_genre(&mut f, "rock");
        check_genre(&mut f, "pop");
        let transport = RecordingTransport::replying(200, r#"{"message":"Spellista skapad"}"#);

        drive(&mut f, &transport);

        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/recommendations");
        let body: serde_json::Value = serde_json::from_str(&calls[0].1).unwrap();
        assert_eq!(body["genres"], serde_json::json!(["rock", "pop"]));
        assert_eq!(body["recco_limit"], serde_json::json!("20"));
        assert!(body.get("decades").is_none());

        assert_eq!(f.phase, SubmitPhase::Redirecting);
        assert_eq!(f.notice, Some(Notice::Info("Spellista skapad".into())));
    }

    #[test]
    fn decades_go_to_search() {
        let mut f = form();
        check_decade(&mut f, "1980");
        f.apply(FormAction::SetSearchLimit("5".into()));
        let transport = RecordingTransport::replying(200, r#"{"message":"ok"}"#);

        drive(&mut f, &transport);

        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/search");
        assert_eq!(calls[0].1, r#"{"decades":["1980"],"search_limit":"5"}"#);
    }

    #[test]
    fn nothing_selected_warns_without_calling() {
        let mut f = form();
        let transport = RecordingTransport::replying(200, r#"{"message":"ok"}"#);

        drive(&mut f, &transport);

        assert!(transport.calls.borrow().is_empty());
        assert_eq!(f.phase, SubmitPhase::Idle);
        assert_eq!(
            f.notice,
            Some(Notice::Warning(defaults::EMPTY_SELECTION_MESSAGE.to_string()))
        );
    }

    #[test]
    fn genres_win_when_both_groups_are_set() {
        let mut f = form();
        check_genre(&mut f, "jazz");
        check_decade(&mut f, "1960");
        let transport = RecordingTransport::replying(200, r#"{"message":"ok"}"#);

        drive(&mut f, &transport);

        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/recommendations");
        assert!(calls.iter().all(|(url, _)| url != "/search"));
    }

    #[test]
    fn second_submit_while_in_flight_is_ignored() {
        let mut f = form();
        check_genre(&mut f, "rock");
        f.apply(FormAction::Submit);
        let first = f.pending.clone();
        assert_eq!(f.phase, SubmitPhase::Submitting);

        f.apply(FormAction::Submit);
        assert_eq!(f.pending, first);
        assert_eq!(f.phase, SubmitPhase::Submitting);
    }

    #[test]
    fn http_error_is_surfaced_and_form_returns_to_idle() {
        let mut f = form();
        check_genre(&mut f, "rock");
        let transport = RecordingTransport::replying(500, "boom");

        drive(&mut f, &transport);

        assert_eq!(f.phase, SubmitPhase::Idle);
        assert!(f.pending.is_none());
        match &f.notice {
            Some(Notice::Error(msg)) => assert!(msg.contains("500")),
            other => panic!("expected error notice, got {:?}", other),
        }
        assert_eq!(f.genres.selection(), vec!["rock"]);
    }

    #[test]
    fn html_error_page_is_not_shown_to_the_user() {
        let mut f = form();
        check_genre(&mut f, "rock");
        let page = format!("<!doctype html><html>{}</html>", "x".repeat(5000));
        let transport = RecordingTransport::replying(500, &page);

        drive(&mut f, &transport);

        match &f.notice {
            Some(Notice::Error(msg)) => {
                assert!(msg.contains("500"));
                assert!(!msg.contains('<'));
                assert!(msg.chars().count() < 100, "notice too long: {}", msg.len());
            }
            other => panic!("expected error notice, got {:?}", other),
        }
    }

    #[test]
    fn json_error_message_is_shown_capped() {
        let err = SubmitError::Status {
            status: 422,
            body: r#"{"message":"Ogiltig gräns"}"#.into(),
        };
        assert_eq!(err.to_string(), "Servern svarade med fel 422: Ogiltig gräns");

        let long = format!(r#"{{"message":"{}"}}"#, "y".repeat(1000));
        let err = SubmitError::Status {
            status: 400,
            body: long,
        };
        let text = err.to_string();
        assert!(text.starts_with("Servern svarade med fel 400: yyy"));
        assert!(text.chars().count() < 260);
    }

    #[test]
    fn transport_failure_is_surfaced() {
        let mut f = form();
        check_decade(&mut f, "1990");
        let transport = RecordingTransport::failing("Failed to fetch");

        drive(&mut f, &transport);

        assert_eq!(transport.calls.borrow().len(), 1);
        assert_eq!(f.phase, SubmitPhase::Idle);
        assert!(matches!(&f.notice, Some(Notice::Error(m)) if m.contains("Failed to fetch")));
    }

    #[test]
    fn reply_without_message_is_a_decode_error() {
        let config = FormConfig::default();
        let payload = SubmissionPayload::Search {
            decades: vec!["1970".into()],
            search_limit: "10".into(),
        };
        let transport = RecordingTransport::replying(200, r#"{"status":"done"}"#);
        let result = block_on(submit_selection(&transport, &config, &payload));
        assert!(matches!(result, Err(SubmitError::Decode(_))));
    }

    #[test]
    fn custom_endpoints_are_used() {
        let config = FormConfig {
            recommendations_url: "/api/recco".into(),
            ..FormConfig::default()
        };
        let payload = SubmissionPayload::Recommendations {
            genres: vec!["pop".into()],
            recco_limit: "3".into(),
        };
        let transport = RecordingTransport::replying(201, r#"{"message":"created"}"#);
        let resp = block_on(submit_selection(&transport, &config, &payload)).unwrap();
        assert_eq!(resp.message, "created");
        assert_eq!(transport.calls.borrow()[0].0, "/api/recco");
    }

    #[test]
    fn failed_submit_can_be_retried() {
        let mut f = form();
        check_genre(&mut f, "soul");
        drive(&mut f, &RecordingTransport::failing("offline"));
        assert_eq!(f.phase, SubmitPhase::Idle);

        let transport = RecordingTransport::replying(200, r#"{"message":"ok"}"#);
        drive(&mut f, &transport);
        assert_eq!(transport.calls.borrow().len(), 1);
        assert_eq!(f.phase, SubmitPhase::Redirecting);
    }

    #[test]
    fn csv_catalog_skips_bad_and_duplicate_rows() {
        let csv = "id,label\n\
                   rock,Rock\n\
                   pop,Pop\n\
                   rock,Rock again\n\
                   ,Nameless\n\
                   jazz\n\
                    indie , Indie \n";
        let opts = read_options_from_csv_string(csv, 0, 1).unwrap();
        let ids: Vec<_> = opts.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["rock", "pop", "jazz", "indie"]);
        assert_eq!(opts[2].label, "jazz");
        assert_eq!(opts[3].label, "Indie");
    }
}
