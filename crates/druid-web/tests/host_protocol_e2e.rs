//! Host protocol E2E tests.
//!
//! Runs the dashboard behind a [`StepProgram`] and talks to it only through
//! JSON wire events, the way the browser loader does.
//!
//! # Running Tests
//!
//! ```sh
//! cargo test -p druid-web --test host_protocol_e2e
//! ```
//!
//! # Invariants
//!
//! 1. **Request correlation**: every response id answers exactly one request
//! 2. **Render on change**: a step with no events and no time renders nothing
//! 3. **Cookie write-through**: UI events persist before the step returns

#![cfg(test)]

use std::rc::Rc;
use std::time::Duration;

use druid_core::{ClusterId, SortOrder};
use druid_runtime::{
    CookieJar, Dashboard, HttpMethod, HttpRequest, MemoryCookieJar, PermissionApi, PipelineState,
};
use druid_web::{HostOptions, StepProgram, WireEvent, WireOutputs, build_dashboard};
use pretty_assertions::assert_eq;

// ============================================================================
// Test Utilities
// ============================================================================

const SPECS: &str = r#"{
    "bursts": {
        "title": "Burst candidates",
        "metric": "pain",
        "cols": [
            {"datum": "account", "title": "Account", "searchable": true, "sortable": true},
            {"datum": "pain", "title": "Pain", "type": "number", "sortable": true},
            {"datum": "action", "title": "Action"}
        ]
    }
}"#;

const CLUSTERS: &str = r#"[{"id":"cedar","name":"Cedar"},{"id":"arbutus","name":"Arbutus"}]"#;

type Program = StepProgram<Dashboard<Rc<MemoryCookieJar>>>;

struct Host {
    program: Program,
    jar: Rc<MemoryCookieJar>,
}

impl Host {
    fn start(config: &str, options: &str) -> Self {
        let jar = Rc::new(MemoryCookieJar::new());
        let dashboard =
            build_dashboard(config, SPECS, HostOptions::parse(options).unwrap(), Rc::clone(&jar)).unwrap();
        let mut program = StepProgram::new(dashboard);
        program.init().unwrap();
        Self { program, jar }
    }

    fn send(&mut self, json: &str) {
        let event = WireEvent::parse(json).unwrap();
        self.program.push_event(event.into());
    }

    fn respond(&mut self, request: &HttpRequest, body: &str) {
        let body = serde_json::to_string(body).unwrap();
        self.send(&format!(r#"{{"type":"response","request":{},"body":{body}}}"#, request.id.0));
    }

    fn step_requests(&mut self) -> Vec<HttpRequest> {
        self.program.step().unwrap();
        self.program.take_outputs().requests
    }

    fn state(&self) -> PipelineState {
        self.program.model().state()
    }
}

fn bursts(cluster: &str) -> String {
    serde_json::json!({
        "cluster": cluster,
        "bursts": {
            "epoch": 1_700_000_000,
            "results": [
                {"id": 1, "account": "def-a", "pain": 2.5, "state": "unactioned"},
                {"id": 2, "account": "def-b", "pain": 9.0, "state": "unactioned"}
            ]
        }
    })
    .to_string()
}

// ============================================================================
// 1. Startup
// ============================================================================

#[test]
fn startup_fetches_clusters_and_renders_skeleton() {
    let mut host = Host::start("", "");
    let out = host.program.take_outputs();
    assert_eq!(out.requests.len(), 1);
    assert_eq!(out.requests[0].url, "/xhr/clusters/");
    assert!(out.subscriptions.is_empty());
    let html = out.html.unwrap();
    assert!(html.contains("Retrieving cluster info..."));
    assert_eq!(host.state(), PipelineState::LoadingClusters);
}

#[test]
fn supported_notifications_subscribe_once() {
    let mut host = Host::start("", r#"{"notifications":"promise"}"#);
    let out = host.program.take_outputs();
    assert_eq!(out.permission_requests, vec![PermissionApi::Promise]);
    assert_eq!(out.subscriptions, vec!["/notifications".to_owned()]);
}

// ============================================================================
// 2. Full session
// ============================================================================

#[test]
fn clusters_then_reports_reach_displayed_state() {
    let mut host = Host::start("", "");
    let init = host.program.take_outputs().requests;

    host.respond(&init[0], CLUSTERS);
    let reports = host.step_requests();
    let urls: Vec<&str> = reports.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["/xhr/cases/?cluster=arbutus", "/xhr/cases/?cluster=cedar"]);
    assert_eq!(host.state(), PipelineState::LoadingReports);

    host.respond(&reports[1], &bursts("cedar"));
    host.respond(&reports[0], &bursts("arbutus"));
    let result = host.program.step().unwrap();
    assert_eq!(result.events_processed, 2);
    assert!(result.rendered);
    assert_eq!(host.state(), PipelineState::ReportsDisplayed);
    assert_eq!(host.program.model().table_count(), 2);
    assert_eq!(
        host.jar.get("prefs").unwrap().map(|c| c.contains(r#""cluster":"arbutus""#)),
        Some(true)
    );
}

#[test]
fn ui_events_write_preferences_through() {
    let mut host = Host::start("", "");
    let init = host.program.take_outputs().requests;
    host.respond(&init[0], CLUSTERS);
    let reports = host.step_requests();
    host.respond(&reports[0], &bursts("arbutus"));
    host.program.step().unwrap();

    host.send(r#"{"type":"tab","cluster":"cedar"}"#);
    host.send(r#"{"type":"sort","cluster":"arbutus","report":"bursts","order":[0,"asc"]}"#);
    host.program.step().unwrap();

    let store = host.program.model().preferences();
    assert_eq!(store.active_cluster(), Some(&ClusterId::from("cedar")));
    assert_eq!(
        store.sort_order(&ClusterId::from("arbutus"), "bursts"),
        Some(SortOrder::ascending(0))
    );
    let cookie = host.jar.get("prefs").unwrap().unwrap();
    assert!(cookie.contains(r#""cluster":"cedar""#));
    assert!(cookie.contains(r#"[0,"asc"]"#));
}

#[test]
fn claim_round_trip_goes_out_as_patch() {
    let mut host = Host::start(r#"{"analyst":"alice"}"#, "");
    let init = host.program.take_outputs().requests;
    host.respond(&init[0], r#"[{"id":"cedar","name":"Cedar"}]"#);
    let reports = host.step_requests();
    host.respond(&reports[0], &bursts("cedar"));
    host.program.step().unwrap();
    host.program.take_outputs();

    host.send(r#"{"type":"action","cluster":"cedar","case":2,"action":"claim"}"#);
    let update = host.step_requests().remove(0);
    assert_eq!(update.method, HttpMethod::Patch);
    assert_eq!(update.url, "/xhr/cases/");

    host.respond(&update, "{}");
    let refresh = host.step_requests().remove(0);
    assert_eq!(refresh.url, "/xhr/cases/?cluster=cedar");
}

#[test]
fn failed_cluster_fetch_is_reported() {
    let mut host = Host::start("", "");
    let init = host.program.take_outputs().requests;
    host.send(&format!(r#"{{"type":"response","request":{},"status":503}}"#, init[0].id.0));
    host.program.step().unwrap();
    assert_eq!(host.state(), PipelineState::Failed);
    let html = host.program.take_outputs().html.unwrap();
    assert!(html.contains("Failed to retrieve cluster list"));
}

// ============================================================================
// 3. Push and time
// ============================================================================

#[test]
fn unfocused_push_becomes_os_notification() {
    let mut host = Host::start("", r#"{"notifications":"promise","permission":"granted"}"#);
    let init = host.program.take_outputs().requests;
    host.respond(&init[0], CLUSTERS);
    host.program.step().unwrap();
    host.program.take_outputs();

    host.send(r#"{"type":"focus","focused":false}"#);
    host.send(r#"{"type":"push","data":"New case on cedar"}"#);
    host.program.step().unwrap();

    let wire = WireOutputs::from(&host.program.take_outputs());
    assert_eq!(wire.notifications.len(), 1);
    assert_eq!(wire.notifications[0].body, "New case on cedar");
    assert_eq!(wire.notifications[0].close_after_ms, 15_000);
    assert_eq!(wire.requests.len(), 2);
}

#[test]
fn idle_steps_render_nothing_until_time_moves() {
    let mut host = Host::start("", "");
    host.program.take_outputs();

    let idle = host.program.step().unwrap();
    assert!(!idle.rendered);
    assert!(host.program.take_outputs().is_empty());

    host.program.advance_time(Duration::from_millis(16));
    let ticked = host.program.step().unwrap();
    assert!(ticked.ticked);
    assert!(ticked.rendered);
}
