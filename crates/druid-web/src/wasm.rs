#![forbid(unsafe_code)]

use druid_runtime::state_persistence::{cookie_assignment, cookie_removal, find_cookie};
use druid_runtime::{CookieJar, Dashboard, HostEvent, StorageError, StorageResult};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlDocument;

use crate::wire::{HostOptions, WireEvent, WireOutputs};
use crate::{StepProgram, WebBackendError, build_dashboard, duration_from_millis};

/// Preferences jar over `document.cookie`.
#[derive(Debug, Clone)]
pub struct DocumentCookieJar {
    document: HtmlDocument,
}

impl DocumentCookieJar {
    fn current() -> Result<Self, WebBackendError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(WebBackendError::Unsupported("no document"))?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| WebBackendError::Unsupported("document is not an HTML document"))?;
        Ok(Self { document })
    }

    fn write(&self, assignment: &str) -> StorageResult<()> {
        self.document
            .set_cookie(assignment)
            .map_err(|err| StorageError::Unavailable(format!("{err:?}")))
    }
}

impl CookieJar for DocumentCookieJar {
    fn name(&self) -> &str {
        "document.cookie"
    }

    fn get(&self, name: &str) -> StorageResult<Option<String>> {
        let header = self
            .document
            .cookie()
            .map_err(|err| StorageError::Unavailable(format!("{err:?}")))?;
        Ok(find_cookie(&header, name))
    }

    fn set(&self, name: &str, value: &str) -> StorageResult<()> {
        self.write(&cookie_assignment(name, value))
    }

    fn remove(&self, name: &str) -> StorageResult<()> {
        self.write(&cookie_removal(name))
    }
}

fn js_err(err: WebBackendError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Dashboard page driven from JavaScript.
///
/// The host performs every request listed in `takeOutputs().requests` and
/// answers with a `response` event carrying the same id.
#[wasm_bindgen]
pub struct DruidDashboard {
    program: StepProgram<Dashboard<DocumentCookieJar>>,
}

#[wasm_bindgen]
impl DruidDashboard {
    /// Build the page model from the JSON embedded in the page.
    ///
    /// `host` carries `{notifications, language, languages, focused, permission}`
    /// as detected by the loader script.
    #[wasm_bindgen(constructor)]
    pub fn new(config: &str, specs: &str, host: &str) -> Result<DruidDashboard, JsValue> {
        let jar = DocumentCookieJar::current().map_err(js_err)?;
        let host = HostOptions::parse(host).map_err(js_err)?;
        let dashboard = build_dashboard(config, specs, host, jar).map_err(js_err)?;
        Ok(Self {
            program: StepProgram::new(dashboard),
        })
    }

    pub fn init(&mut self) -> Result<(), JsValue> {
        self.program.init().map_err(js_err)
    }

    /// Queue one JSON-encoded host event.
    #[wasm_bindgen(js_name = pushEvent)]
    pub fn push_event(&mut self, event: &str) -> Result<(), JsValue> {
        let event = WireEvent::parse(event).map_err(js_err)?;
        self.program.push_event(HostEvent::from(event));
        Ok(())
    }

    #[wasm_bindgen(js_name = advanceTime)]
    pub fn advance_time(&mut self, ms: f64) {
        self.program.advance_time(duration_from_millis(ms));
    }

    #[wasm_bindgen(js_name = setTime)]
    pub fn set_time(&mut self, ms: f64) {
        self.program.set_time(duration_from_millis(ms));
    }

    /// Process queued events. Returns `{rendered, eventsProcessed, ticked, frameIdx}`.
    pub fn step(&mut self) -> Result<JsValue, JsValue> {
        let result = self.program.step().map_err(js_err)?;
        let json = serde_json::json!({
            "rendered": result.rendered,
            "eventsProcessed": result.events_processed,
            "ticked": result.ticked,
            "frameIdx": result.frame_idx,
        });
        js_sys::JSON::parse(&json.to_string())
    }

    /// Drain side effects captured since the last call.
    #[wasm_bindgen(js_name = takeOutputs)]
    pub fn take_outputs(&mut self) -> Result<JsValue, JsValue> {
        let outputs = self.program.take_outputs();
        let json = WireOutputs::from(&outputs).to_json().map_err(js_err)?;
        js_sys::JSON::parse(&json)
    }

    /// Current pipeline state, e.g. `"reports-displayed"`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.program.model().state().as_str().to_owned()
    }
}
