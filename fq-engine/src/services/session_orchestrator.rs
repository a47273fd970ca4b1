//! Session orchestration
//!
//! Drives one session through its states:
//! - identifiers resolved strictly one at a time, in input order, with a
//!   pause between consecutive entries
//! - typed identifiers merge by `clean_id`; design-code lines stay separate
//! - failed lookups are reported, never abort the batch
//! - ending the session writes one history record if there are rows
//!
//! Teardown cancels the session token: pauses and in-flight lookups stop
//! and their late results are discarded.

use crate::config::SessionPacing;
use crate::db::HistoryLog;
use crate::models::{
    AppSettings, HistoryRecord, HistorySummary, Session, SessionKind, SessionState,
};
use crate::services::catalog_client::CatalogClient;
use crate::services::diagnostics::{DiagnosticEvent, DiagnosticSink, Diagnostics};
use crate::services::valuation::{compute_totals, Totals};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Session errors surfaced to the screen
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// Unknown code, empty list, or the lookup failed
    #[error("Design code not found or empty: {0}")]
    DesignCodeNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Session was torn down
    #[error("Session closed")]
    Cancelled,
}

/// Outcome of one batch of identifiers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Identifiers in the batch
    pub requested: usize,
    /// Identifiers that produced a row (including confirmed not-found rows)
    pub resolved: usize,
    /// Raw identifiers that produced nothing
    pub failed: Vec<String>,
    /// Batch stopped early because the session was torn down
    pub abandoned: bool,
}

/// Split typed input on whitespace and commas
pub fn split_identifiers(input: &str) -> Vec<String> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sequences catalog lookups for sessions and records finished ones
pub struct SessionOrchestrator {
    client: Arc<CatalogClient>,
    history: HistoryLog,
    pacing: SessionPacing,
}

impl SessionOrchestrator {
    pub fn new(client: Arc<CatalogClient>, history: HistoryLog, pacing: SessionPacing) -> Self {
        Self {
            client,
            history,
            pacing,
        }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn start_session(&self, kind: SessionKind) -> Session {
        let session = Session::new(kind);
        tracing::debug!(session_id = %session.session_id, ?kind, "Session started");
        session
    }

    /// Resolve typed identifiers into the session, merging duplicates
    pub async fn add_identifiers(
        &self,
        session: &mut Session,
        input: &str,
        settings: &AppSettings,
        sink: Option<&dyn DiagnosticSink>,
    ) -> BatchReport {
        let entries: Vec<(String, u32)> = split_identifiers(input)
            .into_iter()
            .map(|id| (id, 1))
            .collect();

        if entries.is_empty() {
            return BatchReport::default();
        }

        let diagnostics = Diagnostics::new(settings.dev_mode, sink);
        self.resolve_batch(session, entries, self.pacing.list, true, settings, sink, diagnostics)
            .await
    }

    /// Replace the session's rows with the contents of a design code
    ///
    /// An empty lookup result (unknown code, empty list or failed request)
    /// returns the session to idle without fetching anything.
    pub async fn load_design_code(
        &self,
        session: &mut Session,
        code: &str,
        settings: &AppSettings,
        sink: Option<&dyn DiagnosticSink>,
    ) -> Result<BatchReport, SessionError> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(SessionError::InvalidInput("empty design code".to_string()));
        }
        if session.is_torn_down() {
            return Err(SessionError::Cancelled);
        }

        session.items.clear();
        session.design_code = None;
        session.transition_to(SessionState::ResolvingDesignCode);

        let token = session.teardown_token();
        let lines = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(SessionError::Cancelled),
            lines = self.client.resolve_design_code(&code, settings, sink) => lines,
        };

        if lines.is_empty() {
            tracing::warn!(code = %code, "Design code not found or empty");
            session.transition_to(SessionState::Idle);
            return Err(SessionError::DesignCodeNotFound(code));
        }

        session.design_code = Some(code);

        let diagnostics = Diagnostics::new(settings.dev_mode, sink);
        let entries = lines
            .into_iter()
            .map(|line| (line.article_id, line.quantity))
            .collect();

        Ok(self
            .resolve_batch(session, entries, self.pacing.code, false, settings, sink, diagnostics)
            .await)
    }

    #[allow(clippy::too_many_arguments)]
    async fn resolve_batch(
        &self,
        session: &mut Session,
        entries: Vec<(String, u32)>,
        pause: Duration,
        merge: bool,
        settings: &AppSettings,
        sink: Option<&dyn DiagnosticSink>,
        diagnostics: Diagnostics<'_>,
    ) -> BatchReport {
        let total = entries.len();
        let mut report = BatchReport {
            requested: total,
            ..Default::default()
        };

        let token = session.teardown_token();
        if token.is_cancelled() {
            report.abandoned = true;
            return report;
        }

        session.transition_to(SessionState::ResolvingItems);
        diagnostics.emit(DiagnosticEvent::BatchStarted { total });

        for (index, (raw_id, quantity)) in entries.into_iter().enumerate() {
            if index > 0 && !wait_unless_torn_down(&token, pause).await {
                report.abandoned = true;
                break;
            }

            diagnostics.emit(DiagnosticEvent::BatchProgress {
                position: index + 1,
                total,
                raw_id: raw_id.clone(),
            });

            let resolved = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    report.abandoned = true;
                    break;
                }
                item = self.client.resolve_item(&raw_id, settings, sink) => item,
            };

            match resolved {
                Some(item) => {
                    let item = item.with_quantity(quantity);
                    let clean_id = item.clean_id.clone();
                    report.resolved += 1;

                    if merge {
                        let existed = session.items.iter().any(|i| i.clean_id == clean_id);
                        let quantity = session.merge_item(item);
                        if existed {
                            diagnostics.emit(DiagnosticEvent::QuantityIncreased { clean_id, quantity });
                        } else {
                            diagnostics.emit(DiagnosticEvent::RowAdded { clean_id, quantity });
                        }
                    } else {
                        session.push_row(item);
                        diagnostics.emit(DiagnosticEvent::RowAdded { clean_id, quantity });
                    }
                }
                None => {
                    tracing::warn!(raw_id = %raw_id, "Identifier could not be resolved");
                    diagnostics.emit(DiagnosticEvent::ResolutionFailed {
                        raw_id: raw_id.clone(),
                    });
                    report.failed.push(raw_id);
                }
            }
        }

        if report.abandoned {
            diagnostics.emit(DiagnosticEvent::BatchAbandoned {
                processed: report.resolved + report.failed.len(),
                total,
            });
            tracing::debug!(session_id = %session.session_id, "Batch abandoned on teardown");
        } else {
            session.transition_to(SessionState::Active);
        }

        tracing::info!(
            session_id = %session.session_id,
            requested = report.requested,
            resolved = report.resolved,
            failed = report.failed.len(),
            "Batch processed"
        );

        report
    }

    /// Drop one row; quantities are not touched
    pub fn remove_row(&self, session: &mut Session, index: usize) -> Option<crate::models::ItemRecord> {
        session.remove_row(index)
    }

    pub fn totals(&self, session: &Session, settings: &AppSettings) -> Totals {
        compute_totals(&session.items, &settings.valuation)
    }

    /// Tear the session down and record it in history
    ///
    /// Consumes the session, so a session is recorded at most once. Returns
    /// `None` for a session without rows.
    pub async fn end_session(
        &self,
        mut session: Session,
        settings: &AppSettings,
    ) -> Option<HistoryRecord> {
        session.cancel();
        session.transition_to(SessionState::Ended);

        if session.items.is_empty() {
            tracing::debug!(session_id = %session.session_id, "Empty session, no history record");
            return None;
        }

        let totals = self.totals(&session, settings);
        let summary = HistorySummary {
            kind: session.kind.history_kind(),
            title: session.history_title(),
            total_minutes: totals.minutes,
            total_price: totals.price,
            items: session.items,
        };

        Some(self.history.append(summary).await)
    }
}

/// Sleep for `pause`, returns false if the session was torn down meanwhile
async fn wait_unless_torn_down(token: &CancellationToken, pause: Duration) -> bool {
    if pause.is_zero() {
        return !token.is_cancelled();
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(pause) => true,
    }
}
