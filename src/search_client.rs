use std::time::{Duration, Instant};

use crate::client::PriceApi;
use crate::config::Config;
use crate::data_models::{SearchRequest, SearchResponse, SearchStatus};
use crate::error::{ClientError, SEARCH_FAILED};
use crate::notify::{NotificationCenter, NotificationKind};

/// Fixed id so a new search replaces the previous search's notification.
pub const SEARCH_NOTIFICATION_ID: &str = "search";
pub const LOADING_MESSAGE: &str = "Gemini AI is analyzing websites...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Search,
    Dashboard,
}

/// Identifies one submitted search. Only the most recently issued ticket may
/// settle the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTicket(u64);

impl SearchTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Searching {
        ticket: SearchTicket,
        query: String,
    },
    Completed(SearchResponse),
    Failed {
        /// Present when the backend answered with status `failed`; absent for
        /// transport and HTTP failures.
        response: Option<SearchResponse>,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub max_results_per_site: u32,
    pub use_cache: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results_per_site: 3,
            use_cache: true,
        }
    }
}

impl From<&Config> for SearchSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_results_per_site: config.max_results_per_site,
            use_cache: config.use_cache,
        }
    }
}

pub struct SearchClient<A> {
    api: A,
    settings: SearchSettings,
    query: String,
    state: SearchState,
    notifications: NotificationCenter,
    active_tab: Tab,
    last_ticket: u64,
}

impl<A: PriceApi> SearchClient<A> {
    pub fn new(api: A, settings: SearchSettings, notification_ttl: Duration) -> Self {
        Self {
            api,
            settings,
            query: String::new(),
            state: SearchState::Idle,
            notifications: NotificationCenter::new(notification_ttl),
            active_tab: Tab::default(),
            last_ticket: 0,
        }
    }

    pub fn from_config(api: A, config: &Config) -> Self {
        Self::new(api, SearchSettings::from(config), config.notification_ttl)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn settings(&self) -> SearchSettings {
        self.settings
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Ignored while a search is in flight, like a disabled input.
    pub fn set_query(&mut self, query: impl Into<String>) {
        if self.is_input_enabled() {
            self.query = query.into();
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.state, SearchState::Searching { .. })
    }

    pub fn is_input_enabled(&self) -> bool {
        !self.is_searching()
    }

    pub fn can_submit(&self) -> bool {
        self.is_input_enabled() && !self.query.trim().is_empty()
    }

    /// The response on display, if any. Only one is ever held.
    pub fn current_response(&self) -> Option<&SearchResponse> {
        match &self.state {
            SearchState::Completed(response) => Some(response),
            SearchState::Failed { response, .. } => response.as_ref(),
            SearchState::Idle | SearchState::Searching { .. } => None,
        }
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn tick(&mut self, now: Instant) {
        self.notifications.expire(now);
    }

    /// Moves to `Searching` and returns the request to send. Returns `None`
    /// and leaves everything untouched when the query is blank or a search is
    /// already running.
    pub fn begin_search(&mut self) -> Option<(SearchTicket, SearchRequest)> {
        if !self.can_submit() {
            tracing::debug!(
                searching = self.is_searching(),
                "search submission rejected"
            );
            return None;
        }

        self.last_ticket += 1;
        let ticket = SearchTicket(self.last_ticket);
        let request = SearchRequest::new(
            &self.query,
            self.settings.max_results_per_site,
            self.settings.use_cache,
        );

        tracing::info!(ticket = ticket.0, query = %request.query, "search started");
        self.state = SearchState::Searching {
            ticket,
            query: request.query.clone(),
        };
        self.notifications.show(
            SEARCH_NOTIFICATION_ID,
            NotificationKind::Loading,
            LOADING_MESSAGE,
        );
        Some((ticket, request))
    }

    /// Settles the search identified by `ticket`. Results for any ticket other
    /// than the one in flight are dropped and `false` is returned.
    pub fn finish_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<SearchResponse, ClientError>,
    ) -> bool {
        match &self.state {
            SearchState::Searching { ticket: current, .. } if *current == ticket => {}
            _ => {
                tracing::warn!(ticket = ticket.0, "dropping result of stale search");
                return false;
            }
        }

        match result {
            Ok(response) => self.apply_response(response),
            Err(e) => {
                tracing::error!("search error: {e:#}");
                let message = e.user_message().to_string();
                self.notifications.show(
                    SEARCH_NOTIFICATION_ID,
                    NotificationKind::Error,
                    message.as_str(),
                );
                self.state = SearchState::Failed {
                    response: None,
                    message,
                };
            }
        }
        true
    }

    fn apply_response(&mut self, response: SearchResponse) {
        match response.status.clone() {
            SearchStatus::Completed => {
                let message = match response.search_time_ms {
                    Some(ms) => format!("Found {} products in {ms}ms", response.total_found),
                    None => format!("Found {} products", response.total_found),
                };
                tracing::info!(
                    search_id = response.search_id,
                    found = response.total_found,
                    "search completed"
                );
                self.notifications
                    .show(SEARCH_NOTIFICATION_ID, NotificationKind::Success, message);
                self.state = SearchState::Completed(response);
            }
            SearchStatus::Failed => {
                let message = response
                    .error_message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| SEARCH_FAILED.to_string());
                tracing::warn!(search_id = response.search_id, "backend reported failure: {message}");
                self.notifications.show(
                    SEARCH_NOTIFICATION_ID,
                    NotificationKind::Error,
                    message.as_str(),
                );
                self.state = SearchState::Failed {
                    response: Some(response),
                    message,
                };
            }
            other => {
                tracing::info!(search_id = response.search_id, status = %other, "search settled");
                self.notifications.show(
                    SEARCH_NOTIFICATION_ID,
                    NotificationKind::Info,
                    format!("Search {other}"),
                );
                self.state = SearchState::Completed(response);
            }
        }
    }

    pub async fn search(&mut self) -> bool {
        let Some((ticket, request)) = self.begin_search() else {
            return false;
        };
        let result = self.api.search(&request).await;
        self.finish_search(ticket, result)
    }
}
