#![forbid(unsafe_code)]

//! The report dashboard model.
//!
//! # Pipeline
//!
//! ```text
//!   Idle ──init──▶ LoadingClusters ──ok──▶ ClustersDisplayed ──▶ LoadingReports ──▶ ReportsDisplayed
//!                        │                                            │                  │
//!                        └──err──▶ Failed                 per-cluster ok/err     refresh, sort, tab,
//!                                                                                accordion, actions
//! ```
//!
//! The cluster list must arrive before any report request goes out. Once it
//! does, preferences are repaired against it, tabs are built in display-name
//! order, and one report request per cluster is issued, the active cluster
//! first. Report responses are handled independently as they arrive; a
//! failure for one cluster doesn't affect the others.
//!
//! Case actions and push messages take the refresh path: the affected
//! clusters' reports are fetched again and only existing tables are
//! rebuilt. Report types or clusters that appear between refreshes are not
//! reconciled until the page reloads.
//!
//! Responses are applied in arrival order with no generation check, so a
//! slow stale response can overwrite a newer one.

use std::collections::{BTreeMap, HashMap};

use druid_core::{
    CaseAction, CaseId, Cluster, ClusterDirectory, ClusterId, ReportData, ReportSet, ReportSpecs,
    SortOrder,
};
use druid_i18n::{LanguagePreferences, Translator};
use druid_widgets::page::{self, NOTIFICATION_ID, PANES_CONTAINER_ID, REFRESH_LINK_ID, TABS_CONTAINER_ID};
use druid_widgets::report_view::{self, accordions_id};
use druid_widgets::toast::TOAST_CONTAINER_ID;
use druid_widgets::{Element, ReportTable, StatusSurface, ToastConfig, ToastHandle, ToastKind};

use crate::case_actions::{self, ActionError};
use crate::config::DashboardConfig;
use crate::event::HostEvent;
use crate::http::{HttpRequest, RequestId, TransportError};
use crate::notifications::{NotificationBridge, NotificationSupport, PermissionState, PushOutcome};
use crate::preferences::PreferenceStore;
use crate::program::{Cmd, Model};
use crate::state_persistence::CookieJar;
use crate::strings;

/// Where the report pipeline is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Idle,
    LoadingClusters,
    ClustersDisplayed,
    LoadingReports,
    ReportsDisplayed,
    /// The cluster list could not be loaded.
    Failed,
}

impl PipelineState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoadingClusters => "loading-clusters",
            Self::ClustersDisplayed => "clusters-displayed",
            Self::LoadingReports => "loading-reports",
            Self::ReportsDisplayed => "reports-displayed",
            Self::Failed => "failed",
        }
    }
}

/// First report load of one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterLoad {
    Pending,
    Displayed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    /// Build the cluster's accordions and tables from scratch.
    Display,
    /// Rebuild existing tables only.
    Refresh,
}

#[derive(Debug, Clone)]
enum Pending {
    Clusters {
        status: ToastHandle,
    },
    Reports {
        cluster: ClusterId,
        status: Option<ToastHandle>,
        mode: FetchMode,
    },
    CaseUpdate {
        cluster: ClusterId,
        case: CaseId,
        action: CaseAction,
        status: ToastHandle,
    },
}

/// Facts about the host page at startup.
#[derive(Debug, Clone)]
pub struct HostContext {
    pub notifications: NotificationSupport,
    pub languages: LanguagePreferences,
    pub focused: bool,
    /// Permission already granted or denied before load, if known.
    pub permission: PermissionState,
}

impl Default for HostContext {
    fn default() -> Self {
        Self {
            notifications: NotificationSupport::unsupported(),
            languages: LanguagePreferences::default(),
            focused: true,
            permission: PermissionState::Default,
        }
    }
}

/// Dashboard page state.
#[derive(Debug)]
pub struct Dashboard<J: CookieJar> {
    config: DashboardConfig,
    specs: ReportSpecs,
    tr: Translator,
    prefs: PreferenceStore<J>,
    toasts: StatusSurface,
    notifications: NotificationBridge,
    clusters: ClusterDirectory,
    state: PipelineState,
    loads: BTreeMap<ClusterId, ClusterLoad>,
    tables: BTreeMap<(ClusterId, String), ReportTable>,
    page: Element,
    pending: HashMap<RequestId, Pending>,
    next_request: u64,
}

impl<J: CookieJar> Dashboard<J> {
    /// Build the page model. Preferences are read from `jar` right away.
    pub fn new(config: DashboardConfig, specs: ReportSpecs, jar: J, host: HostContext) -> Self {
        let tr = strings::translator_for(&config, &strings::builtin_catalog(), &host.languages);
        Self::with_translator(config, specs, jar, host, tr)
    }

    /// Same as [`Dashboard::new`] with an explicit translator.
    pub fn with_translator(
        config: DashboardConfig,
        specs: ReportSpecs,
        jar: J,
        host: HostContext,
        tr: Translator,
    ) -> Self {
        let prefs = PreferenceStore::load(jar, config.prefs_cookie.clone());
        let mut notifications = NotificationBridge::new(
            host.notifications,
            config.refresh_sentinel.clone(),
            config.notification_close_after(),
        );
        notifications.set_focused(host.focused);
        if host.permission != PermissionState::Default {
            notifications.set_permission(host.permission);
        }
        Self {
            config,
            specs,
            tr,
            prefs,
            toasts: StatusSurface::new(),
            notifications,
            clusters: ClusterDirectory::default(),
            state: PipelineState::Idle,
            loads: BTreeMap::new(),
            tables: BTreeMap::new(),
            page: page::dashboard_skeleton(),
            pending: HashMap::new(),
            next_request: 1,
        }
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub fn translator(&self) -> &Translator {
        &self.tr
    }

    #[must_use]
    pub fn preferences(&self) -> &PreferenceStore<J> {
        &self.prefs
    }

    #[must_use]
    pub fn toasts(&self) -> &StatusSurface {
        &self.toasts
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationBridge {
        &self.notifications
    }

    #[must_use]
    pub fn clusters(&self) -> &ClusterDirectory {
        &self.clusters
    }

    #[must_use]
    pub fn cluster_load(&self, cluster: &ClusterId) -> Option<ClusterLoad> {
        self.loads.get(cluster).copied()
    }

    #[must_use]
    pub fn table(&self, cluster: &ClusterId, report: &str) -> Option<&ReportTable> {
        self.tables.get(&(cluster.clone(), report.to_owned()))
    }

    /// Number of report tables currently built.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Page tree without toasts.
    #[must_use]
    pub fn page(&self) -> &Element {
        &self.page
    }

    /// Requests sent and not answered yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId(self.next_request);
        self.next_request += 1;
        id
    }

    fn warn_toast(&mut self, message: String) -> ToastHandle {
        match self.config.warning_autohide() {
            Some(after) => self
                .toasts
                .show(ToastKind::Alert, message, ToastConfig::default().autohide(after)),
            None => self.toasts.warning(message),
        }
    }

    fn clear_status(&mut self, status: Option<ToastHandle>) {
        if let Some(handle) = status {
            self.toasts.clear(handle);
        }
    }

    // ── clusters ────────────────────────────────────────────────────────

    /// Ask for the cluster list.
    pub fn request_clusters(&mut self) -> Cmd<HostEvent> {
        let id = self.next_id();
        let status = self.toasts.status(self.tr.text("RETRIEVING_CLUSTER_INFO"));
        self.pending.insert(id, Pending::Clusters { status });
        self.state = PipelineState::LoadingClusters;
        tracing::info!(request = %id, url = %self.config.clusters_url, "requesting clusters");
        Cmd::http(HttpRequest::get(id, self.config.clusters_url.clone()))
    }

    fn clusters_failed(&mut self, reason: &str) -> Cmd<HostEvent> {
        tracing::error!(reason, "cluster list unavailable");
        self.state = PipelineState::Failed;
        self.toasts.error(self.tr.text("FAILED_TO_RETRIEVE_CLUSTERS"));
        Cmd::log(format!("cluster list unavailable: {reason}"))
    }

    /// Build tabs for `clusters`, repair preferences, and request every
    /// cluster's reports, the active one first.
    pub fn display_clusters(&mut self, clusters: Vec<Cluster>) -> Cmd<HostEvent> {
        self.clusters = ClusterDirectory::new(clusters);
        self.prefs.initialize_cluster_preferences(&self.clusters, &self.specs);

        let tabs: Vec<Element> = self.clusters.clusters().iter().map(report_view::cluster_tab).collect();
        let panes: Vec<Element> = self.clusters.ids().map(report_view::cluster_pane).collect();
        if let Some(container) = self.page.find_by_id_mut(TABS_CONTAINER_ID) {
            container.clear_children();
            tabs.into_iter().for_each(|tab| container.push_child(tab));
        }
        if let Some(container) = self.page.find_by_id_mut(PANES_CONTAINER_ID) {
            container.clear_children();
            panes.into_iter().for_each(|pane| container.push_child(pane));
        }
        self.tables.clear();
        self.loads.clear();
        self.state = PipelineState::ClustersDisplayed;
        tracing::info!(clusters = self.clusters.len(), "clusters displayed");

        let Some(active) = self.prefs.active_cluster().cloned() else {
            self.state = PipelineState::ReportsDisplayed;
            return Cmd::none();
        };
        report_view::activate_cluster(&mut self.page, &active);

        let order: Vec<ClusterId> = std::iter::once(active.clone())
            .chain(self.clusters.ids().filter(|id| **id != active).cloned())
            .collect();
        let cmds = order
            .into_iter()
            .map(|cluster| self.request_reports(&cluster))
            .collect();
        self.state = PipelineState::LoadingReports;
        Cmd::batch(cmds)
    }

    // ── reports ─────────────────────────────────────────────────────────

    /// Ask for one cluster's reports and display them when they arrive.
    pub fn request_reports(&mut self, cluster: &ClusterId) -> Cmd<HostEvent> {
        let name = self.clusters.name_of(cluster).to_owned();
        let status = self.toasts.status(self.tr.translate("RETRIEVING_CASE_REPORTS", &[&name]));
        self.loads.insert(cluster.clone(), ClusterLoad::Pending);
        self.fetch_reports(cluster, Some(status), FetchMode::Display)
    }

    fn fetch_reports(&mut self, cluster: &ClusterId, status: Option<ToastHandle>, mode: FetchMode) -> Cmd<HostEvent> {
        let id = self.next_id();
        self.pending.insert(
            id,
            Pending::Reports {
                cluster: cluster.clone(),
                status,
                mode,
            },
        );
        tracing::debug!(request = %id, cluster = %cluster, ?mode, "requesting reports");
        Cmd::http(HttpRequest::get(id, self.config.cases_url_for(cluster)))
    }

    /// Re-request every displayed cluster's reports through the refresh path.
    pub fn refresh_all(&mut self) -> Cmd<HostEvent> {
        let clusters: Vec<ClusterId> = self.clusters.ids().cloned().collect();
        let cmds = clusters
            .iter()
            .map(|cluster| self.fetch_reports(cluster, None, FetchMode::Refresh))
            .collect();
        Cmd::batch(cmds)
    }

    fn finish_load(&mut self, cluster: &ClusterId, load: ClusterLoad) {
        self.loads.insert(cluster.clone(), load);
        let waiting = self.loads.values().any(|l| *l == ClusterLoad::Pending);
        if !waiting && self.state == PipelineState::LoadingReports {
            self.state = PipelineState::ReportsDisplayed;
            tracing::info!("all cluster reports loaded");
        }
    }

    fn table_for(&self, set_cluster: &ClusterId, name: &str, data: &ReportData) -> Option<ReportTable> {
        let Some(spec) = self.specs.get(name) else {
            tracing::warn!(cluster = %set_cluster, report = name, "no spec for report type, skipping");
            return None;
        };
        let order = self
            .prefs
            .sort_order(set_cluster, name)
            .unwrap_or_else(|| spec.default_sort());
        Some(
            ReportTable::new(set_cluster.clone(), name, spec.clone(), data.results.clone(), order)
                .with_analyst(self.config.analyst.clone()),
        )
    }

    /// Build the accordions and tables of `set.cluster` from scratch.
    pub fn display_reports(&mut self, set: &ReportSet) {
        let cluster = &set.cluster;
        if self.page.find_by_id(&accordions_id(cluster)).is_none() {
            tracing::warn!(cluster = %cluster, "reports for an unknown cluster");
            return;
        }
        self.tables.retain(|(c, _), _| c != cluster);

        let mut items = Vec::new();
        let mut shown = Vec::new();
        for (name, data) in set.reports() {
            let Some(table) = self.table_for(cluster, name, data) else {
                continue;
            };
            let spec_title = self.specs.get(name).map(|s| s.title.clone()).unwrap_or_default();
            let header = report_view::report_header(&self.tr, &spec_title, data.epoch, self.config.utc_offset_seconds);
            items.push(report_view::report_accordion(cluster, name, &header, table.to_element(&self.tr)));
            shown.push(name.to_owned());
            self.tables.insert((cluster.clone(), name.to_owned()), table);
        }

        let no_reports = items.is_empty().then(|| report_view::no_reports(&self.tr));
        if let Some(container) = self.page.find_by_id_mut(&accordions_id(cluster)) {
            container.clear_children();
            match no_reports {
                Some(message) => container.push_child(message),
                None => items.into_iter().for_each(|item| container.push_child(item)),
            }
        }
        if shown.is_empty() {
            tracing::info!(cluster = %cluster, "no current reports");
            return;
        }

        let remembered = self.prefs.active_report(cluster).map(str::to_owned);
        let expanded = match remembered {
            Some(report) if shown.contains(&report) => report,
            stale => {
                let first = shown[0].clone();
                tracing::info!(cluster = %cluster, stale = ?stale, expanded = %first, "expanding first report");
                self.prefs.set_active_report(cluster, &first);
                first
            }
        };
        report_view::set_expanded(&mut self.page, cluster, &expanded, true);
        tracing::debug!(cluster = %cluster, reports = shown.len(), "reports displayed");
    }

    /// Rebuild the existing tables of `set.cluster` with fresh rows.
    ///
    /// Sort order and search text carry over. Report types without a table
    /// are ignored.
    pub fn refresh_reports(&mut self, set: &ReportSet) -> usize {
        let cluster = &set.cluster;
        let mut rebuilt = 0;
        for (name, data) in set.reports() {
            let key = (cluster.clone(), name.to_owned());
            let Some(old) = self.tables.get(&key) else {
                tracing::debug!(cluster = %cluster, report = name, "no table to refresh");
                continue;
            };
            let Some(spec) = self.specs.get(name) else {
                continue;
            };
            let mut table = ReportTable::new(cluster.clone(), name, spec.clone(), data.results.clone(), old.order())
                .with_analyst(self.config.analyst.clone());
            table.set_search(old.search().to_owned());
            if report_view::replace_table(&mut self.page, cluster, name, table.to_element(&self.tr)) {
                rebuilt += 1;
            }
            self.tables.insert(key, table);
        }
        tracing::debug!(cluster = %cluster, rebuilt, "tables refreshed");
        rebuilt
    }

    fn rerender_table(&mut self, cluster: &ClusterId, report: &str) {
        if let Some(table) = self.tables.get(&(cluster.clone(), report.to_owned())) {
            report_view::replace_table(&mut self.page, cluster, report, table.to_element(&self.tr));
        }
    }

    // ── user interaction ────────────────────────────────────────────────

    fn show_tab(&mut self, cluster: &ClusterId) {
        if !self.clusters.contains(cluster) {
            tracing::warn!(cluster = %cluster, "tab for unknown cluster");
            return;
        }
        if let Some(previous) = self.prefs.active_cluster().cloned() {
            report_view::deactivate_cluster(&mut self.page, &previous);
        }
        report_view::activate_cluster(&mut self.page, cluster);
        self.prefs.set_active_cluster(cluster);
    }

    fn show_accordion(&mut self, cluster: &ClusterId, report: &str) {
        let reports: Vec<String> = self
            .tables
            .keys()
            .filter(|(c, _)| c == cluster)
            .map(|(_, r)| r.clone())
            .collect();
        for other in &reports {
            report_view::set_expanded(&mut self.page, cluster, other, other == report);
        }
        self.prefs.set_active_report(cluster, report);
    }

    fn change_sort(&mut self, cluster: &ClusterId, report: &str, order: SortOrder) {
        let Some(table) = self.tables.get_mut(&(cluster.clone(), report.to_owned())) else {
            tracing::warn!(cluster = %cluster, report, "sort for unknown table");
            return;
        };
        if table.set_order(order) {
            self.prefs.set_sort_order(cluster, report, order);
            self.rerender_table(cluster, report);
        }
    }

    fn change_search(&mut self, cluster: &ClusterId, report: &str, query: String) {
        if let Some(table) = self.tables.get_mut(&(cluster.clone(), report.to_owned())) {
            table.set_search(query);
            self.rerender_table(cluster, report);
        }
    }

    /// Send a case update for `action`, with progress and failure toasts.
    pub fn dispatch_action(
        &mut self,
        cluster: &ClusterId,
        case: CaseId,
        action: CaseAction,
        note: Option<&str>,
    ) -> Cmd<HostEvent> {
        let messages = case_actions::messages(action);
        let analyst = self.config.analyst.clone();
        let request = case_actions::build_request(case, action, analyst.as_deref(), note);
        let id = self.next_id();
        let http = request.and_then(|r| case_actions::to_http(id, &self.config.case_update_url, &r));
        let http = match http {
            Ok(http) => http,
            Err(err) => return self.action_refused(case, action, &err),
        };
        let status = self.toasts.status(self.tr.text(messages.progress));
        self.pending.insert(
            id,
            Pending::CaseUpdate {
                cluster: cluster.clone(),
                case,
                action,
                status,
            },
        );
        tracing::info!(request = %id, case = %case, action = %action, "dispatching case update");
        Cmd::http(http)
    }

    fn action_refused(&mut self, case: CaseId, action: CaseAction, err: &ActionError) -> Cmd<HostEvent> {
        tracing::warn!(case = %case, action = %action, error = %err, "case action refused");
        let message = self.tr.text(case_actions::messages(action).failure);
        self.warn_toast(message);
        Cmd::none()
    }

    fn handle_push(&mut self, data: &str) -> Cmd<HostEvent> {
        let outcome = self.notifications.classify(data);
        tracing::info!(outcome = outcome.as_str(), "push message");
        let presented = match outcome {
            PushOutcome::RefreshOnly => Cmd::none(),
            PushOutcome::Banner(message) => {
                if let Some(banner) = self.page.find_by_id_mut(NOTIFICATION_ID) {
                    banner.set_text(message);
                    banner.set_hidden(false);
                }
                Cmd::none()
            }
            PushOutcome::Os(notification) => Cmd::Notify(notification),
        };
        Cmd::batch(vec![presented, self.refresh_all()])
    }

    // ── responses ───────────────────────────────────────────────────────

    fn handle_response(&mut self, request: RequestId, result: Result<String, TransportError>) -> Cmd<HostEvent> {
        let Some(pending) = self.pending.remove(&request) else {
            tracing::warn!(request = %request, "response to unknown request");
            return Cmd::none();
        };
        match pending {
            Pending::Clusters { status } => {
                self.toasts.clear(status);
                match result {
                    Ok(body) => match serde_json::from_str::<Vec<Cluster>>(&body) {
                        Ok(clusters) => self.display_clusters(clusters),
                        Err(err) => self.clusters_failed(&err.to_string()),
                    },
                    Err(err) => self.clusters_failed(&err.to_string()),
                }
            }
            Pending::Reports { cluster, status, mode } => {
                self.clear_status(status);
                let set = result
                    .map_err(|e| e.to_string())
                    .and_then(|body| ReportSet::from_json(&body).map_err(|e| e.to_string()));
                match (set, mode) {
                    (Ok(set), FetchMode::Display) => {
                        if set.cluster != cluster {
                            tracing::warn!(requested = %cluster, got = %set.cluster, "report set for another cluster");
                        }
                        self.display_reports(&set);
                        self.finish_load(&cluster, ClusterLoad::Displayed);
                        Cmd::none()
                    }
                    (Ok(set), FetchMode::Refresh) => {
                        self.refresh_reports(&set);
                        Cmd::none()
                    }
                    (Err(reason), mode) => {
                        tracing::error!(cluster = %cluster, ?mode, reason = %reason, "reports unavailable");
                        let name = self.clusters.name_of(&cluster).to_owned();
                        self.toasts.error(self.tr.translate("FAILED_TO_RETRIEVE_CASE_REPORTS", &[&name]));
                        if mode == FetchMode::Display {
                            self.finish_load(&cluster, ClusterLoad::Failed);
                        }
                        Cmd::log(format!("reports for {cluster} unavailable: {reason}"))
                    }
                }
            }
            Pending::CaseUpdate {
                cluster,
                case,
                action,
                status,
            } => {
                self.toasts.clear(status);
                match result {
                    Ok(_) => {
                        tracing::info!(case = %case, action = %action, "case updated");
                        self.fetch_reports(&cluster, None, FetchMode::Refresh)
                    }
                    Err(err) => {
                        tracing::error!(case = %case, action = %action, error = %err, "case update failed");
                        self.toasts.error(self.tr.text(case_actions::messages(action).failure));
                        Cmd::log(format!("case {case} {action} failed: {err}"))
                    }
                }
            }
        }
    }
}

impl<J: CookieJar> Model for Dashboard<J> {
    type Message = HostEvent;

    fn init(&mut self) -> Cmd<HostEvent> {
        druid_widgets::translate_static_elements(&mut self.page, &self.tr);
        if !self.notifications.is_supported()
            && let Some(link) = self.page.find_by_id_mut(REFRESH_LINK_ID)
        {
            link.set_hidden(false);
        }
        let startup = self.notifications.startup(&self.config.notifications_url);
        let clusters = self.request_clusters();
        Cmd::batch(vec![clusters, startup])
    }

    fn update(&mut self, msg: HostEvent) -> Cmd<HostEvent> {
        match msg {
            HostEvent::Response { request, result } => self.handle_response(request, result),
            HostEvent::Permission(permission) => {
                self.notifications.set_permission(permission);
                Cmd::none()
            }
            HostEvent::Focus(focused) => {
                self.notifications.set_focused(focused);
                Cmd::none()
            }
            HostEvent::Push(data) => self.handle_push(&data),
            HostEvent::TabShown(cluster) => {
                self.show_tab(&cluster);
                Cmd::none()
            }
            HostEvent::AccordionShown { cluster, report } => {
                self.show_accordion(&cluster, &report);
                Cmd::none()
            }
            HostEvent::SortChanged { cluster, report, order } => {
                self.change_sort(&cluster, &report, order);
                Cmd::none()
            }
            HostEvent::SearchChanged { cluster, report, query } => {
                self.change_search(&cluster, &report, query);
                Cmd::none()
            }
            HostEvent::CaseAction {
                cluster,
                case,
                action,
                note,
            } => self.dispatch_action(&cluster, case, action, note.as_deref()),
            HostEvent::RefreshRequested => self.refresh_all(),
            HostEvent::ToastDismissed(handle) => {
                self.toasts.clear(handle);
                Cmd::none()
            }
            HostEvent::Tick(now) => {
                self.toasts.advance_to(now);
                Cmd::none()
            }
        }
    }

    fn view(&self) -> Element {
        let mut page = self.page.clone();
        let rendered = self.toasts.render(TOAST_CONTAINER_ID, &self.tr);
        if let Some(container) = page.find_by_id_mut(TOAST_CONTAINER_ID) {
            container.clear_children();
            for toast in rendered.children() {
                container.push_child(toast.clone());
            }
        }
        page
    }
}
