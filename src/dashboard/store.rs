use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{DashboardEvent, DashboardSnapshot, LifecycleStates};
use super::lifecycle::{Lifecycle, Ticket};
use super::{Completion, DashboardError};
use crate::advisor::{
    AdvisorError, ChatRequest, ExplanationRequest, HealthAdvisor, InsightRequest, LlmAdvisor,
    OllamaClient,
};
use crate::chat::{self, PromptSuggestion, CHAT_FALLBACK_REPLY};
use crate::classify::{classify_scan, EntropySource, PanelEvidence, RandomSource, ScanAssessment};
use crate::config::{DashboardConfig, OllamaSettings};
use crate::models::{
    AnalysisKind, AnalysisState, ChatMessage, HealthInsights, LabPanel, Notice, ScanResult,
    ScanUpload, HEATMAP_REF,
};
use crate::panel::{self, PanelForm};

const EVENT_CAPACITY: usize = 64;

const INSIGHTS_FAILED: &str = "Could not generate health insights. Please try again.";
const EXPLANATION_FAILED: &str = "Could not get explanation. Please try again.";
const SCAN_FAILED: &str = "Could not analyze the scan. Please try again.";

/// Media types accepted for scan uploads.
const SCAN_MEDIA_TYPES: &[&str] = &["image/png", "image/jpeg"];

// ═══════════════════════════════════════════════════════════
// Session state behind the lock
// ═══════════════════════════════════════════════════════════

struct Session {
    panel: Option<LabPanel>,
    panel_life: Lifecycle,
    upload: Option<ScanUpload>,
    scan: Option<ScanResult>,
    scan_life: Lifecycle,
    insights: Option<HealthInsights>,
    insights_life: Lifecycle,
    explanation: Option<String>,
    /// Panel generation an outstanding explanation request belongs to.
    explanation_pending: Option<u64>,
    chat: Vec<ChatMessage>,
    chat_pending: bool,
    last_notice: Option<Notice>,
}

impl Session {
    fn new() -> Self {
        Self {
            panel: None,
            panel_life: Lifecycle::new(AnalysisKind::Panel),
            upload: None,
            scan: None,
            scan_life: Lifecycle::new(AnalysisKind::Scan),
            insights: None,
            insights_life: Lifecycle::new(AnalysisKind::Insights),
            explanation: None,
            explanation_pending: None,
            chat: Vec::new(),
            chat_pending: false,
            last_notice: None,
        }
    }

    fn lifecycle(&self, kind: AnalysisKind) -> &Lifecycle {
        match kind {
            AnalysisKind::Scan => &self.scan_life,
            AnalysisKind::Panel => &self.panel_life,
            AnalysisKind::Insights => &self.insights_life,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Dashboard handle
// ═══════════════════════════════════════════════════════════

struct Shared {
    session: Mutex<Session>,
    random: Mutex<Box<dyn RandomSource>>,
    advisor: Arc<dyn HealthAdvisor>,
    config: DashboardConfig,
    events: broadcast::Sender<DashboardEvent>,
}

/// Single source of truth for one dashboard session.
///
/// Cloning yields another handle to the same session. The session lock is
/// never held across an `.await`; simulated delays and advisor calls run
/// unlocked and re-check their ticket before writing.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<Shared>,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        advisor: Arc<dyn HealthAdvisor>,
        random: impl RandomSource + 'static,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Shared {
                session: Mutex::new(Session::new()),
                random: Mutex::new(Box::new(random)),
                advisor,
                config,
                events,
            }),
        }
    }

    /// Production wiring: Ollama-backed advisor and an entropy-seeded
    /// random source.
    pub fn with_ollama(config: DashboardConfig, settings: &OllamaSettings) -> Self {
        tracing::info!(
            base_url = %settings.base_url,
            model = %settings.model,
            "wiring dashboard to Ollama"
        );
        let advisor = LlmAdvisor::new(OllamaClient::from_settings(settings), settings.model.clone());
        Self::new(config, Arc::new(advisor), EntropySource::new())
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Receive every change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.inner.events.subscribe()
    }

    fn session(&self) -> Result<MutexGuard<'_, Session>, DashboardError> {
        self.inner
            .session
            .lock()
            .map_err(|_| DashboardError::LockPoisoned)
    }

    fn emit(&self, event: DashboardEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    fn emit_lifecycle(&self, life: &Lifecycle) {
        tracing::debug!(kind = %life.kind(), state = %life.state(), "lifecycle transition");
        self.emit(DashboardEvent::Lifecycle {
            kind: life.kind(),
            state: life.state(),
        });
    }

    fn notify(&self, session: &mut Session, description: &str) {
        let notice = Notice::ai_error(description);
        session.last_notice = Some(notice.clone());
        self.emit(DashboardEvent::Notice { notice });
    }

    // ── Blood panel ─────────────────────────────────────────

    /// Coerce, classify and store a panel after the simulated delay.
    ///
    /// Rejected without any change while a panel analysis is loading.
    pub async fn submit_panel(&self, form: &PanelForm) -> Result<Completion<LabPanel>, DashboardError> {
        let ticket = {
            let mut session = self.session()?;
            let ticket = session
                .panel_life
                .begin()
                .inspect_err(|e| tracing::info!(error = %e, "panel submission rejected"))?;
            self.emit_lifecycle(&session.panel_life);
            ticket
        };
        tracing::info!(
            fields = form.len(),
            generation = ticket.generation(),
            "panel analysis started"
        );

        let delay = self.inner.config.panel_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let panel = panel::build_panel(form);
        self.commit_panel(&ticket, panel)
    }

    fn commit_panel(&self, ticket: &Ticket, panel: LabPanel) -> Result<Completion<LabPanel>, DashboardError> {
        let auto = {
            let mut session = self.session()?;
            if !session.panel_life.finish(ticket, true) {
                tracing::debug!(generation = ticket.generation(), "discarding stale panel result");
                return Ok(Completion::Discarded);
            }
            session.panel = Some(panel.clone());
            session.explanation = None;
            session.explanation_pending = None;
            self.invalidate_insights(&mut session);

            tracing::info!(
                observations = panel.len(),
                abnormal = panel.abnormal_count(),
                "panel analysis complete"
            );
            self.emit(DashboardEvent::PanelUpdated {
                observations: panel.len(),
                abnormal: panel.abnormal_count(),
            });
            self.emit_lifecycle(&session.panel_life);
            self.should_auto_insights(&session)
        };

        if auto {
            self.spawn_insights();
        }
        Ok(Completion::Committed(panel))
    }

    /// "Analyze new report": drop the panel and return to idle.
    pub fn reset_panel(&self) -> Result<(), DashboardError> {
        let mut session = self.session()?;
        session.panel = None;
        session.explanation = None;
        session.explanation_pending = None;
        session.panel_life.reset();
        self.invalidate_insights(&mut session);
        self.emit(DashboardEvent::PanelCleared);
        self.emit_lifecycle(&session.panel_life);
        Ok(())
    }

    // ── CT scan ─────────────────────────────────────────────

    /// Register a new scan image. Clears the previous result and returns
    /// the scan lifecycle to idle, invalidating any analysis in flight.
    pub fn submit_scan(&self, file_name: &str) -> Result<ScanUpload, DashboardError> {
        let media_type = scan_media_type(file_name).ok_or_else(|| {
            tracing::info!(file_name, "rejecting scan upload");
            DashboardError::UnsupportedScanFormat(file_name.to_string())
        })?;

        let upload = ScanUpload {
            file_name: file_name.to_string(),
            media_type,
            preview_ref: format!("preview://{}", Uuid::new_v4()),
            uploaded_at: Utc::now(),
        };

        let mut session = self.session()?;
        session.upload = Some(upload.clone());
        session.scan = None;
        session.scan_life.reset();
        self.invalidate_insights(&mut session);

        tracing::info!(file_name, media_type = %upload.media_type, "scan uploaded");
        self.emit(DashboardEvent::ScanUploaded {
            upload: upload.clone(),
        });
        self.emit_lifecycle(&session.scan_life);
        Ok(upload)
    }

    /// Run the scan heuristic on the current upload after the simulated
    /// delay. Panel evidence is taken when the analysis starts.
    pub async fn analyze_scan(&self) -> Result<Completion<ScanResult>, DashboardError> {
        let (ticket, evidence) = {
            let mut session = self.session()?;
            if session.upload.is_none() {
                return Err(DashboardError::NoScanUploaded);
            }
            let ticket = session
                .scan_life
                .begin()
                .inspect_err(|e| tracing::info!(error = %e, "scan analysis rejected"))?;
            self.emit_lifecycle(&session.scan_life);
            (ticket, PanelEvidence::from_panel(session.panel.as_ref()))
        };
        tracing::info!(?evidence, generation = ticket.generation(), "scan analysis started");

        let delay = self.inner.config.scan_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.commit_scan(&ticket, evidence)
    }

    fn commit_scan(&self, ticket: &Ticket, evidence: PanelEvidence) -> Result<Completion<ScanResult>, DashboardError> {
        if !self.session()?.scan_life.is_current(ticket) {
            tracing::debug!(generation = ticket.generation(), "discarding stale scan result");
            return Ok(Completion::Discarded);
        }

        // Session lock is released while the classifier runs.
        let outcome = self.run_classifier(evidence);

        let (result, auto) = {
            let mut session = self.session()?;
            if !session.scan_life.is_current(ticket) {
                tracing::debug!(generation = ticket.generation(), "discarding stale scan result");
                return Ok(Completion::Discarded);
            }

            let assessment = match outcome {
                Ok(assessment) => assessment,
                Err(reason) => {
                    tracing::error!(error = %reason, "scan classification failed");
                    session.scan_life.finish(ticket, false);
                    self.emit_lifecycle(&session.scan_life);
                    self.notify(&mut session, SCAN_FAILED);
                    return Err(DashboardError::ScanFailed(reason));
                }
            };
            let result = ScanResult {
                classification: assessment.classification,
                confidence: assessment.confidence,
                auxiliary_image_ref: HEATMAP_REF.to_string(),
                analyzed_at: Utc::now(),
            };

            session.scan_life.finish(ticket, true);
            session.scan = Some(result.clone());
            self.invalidate_insights(&mut session);

            tracing::info!(
                classification = %result.classification,
                confidence = result.confidence,
                "scan analysis complete"
            );
            self.emit(DashboardEvent::ScanAnalyzed {
                result: result.clone(),
            });
            self.emit_lifecycle(&session.scan_life);
            (result, self.should_auto_insights(&session))
        };

        if auto {
            self.spawn_insights();
        }
        Ok(Completion::Committed(result))
    }

    /// One heuristic run. A panic inside the random source or the heuristic
    /// is reported as a failure instead of unwinding into the caller.
    fn run_classifier(&self, evidence: PanelEvidence) -> Result<ScanAssessment, String> {
        let mut random = self
            .inner
            .random
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        panic::catch_unwind(AssertUnwindSafe(|| classify_scan(evidence, &mut **random)))
            .map_err(|payload| panic_message(payload.as_ref()))
    }

    /// Discard the upload and any result.
    pub fn clear_scan(&self) -> Result<(), DashboardError> {
        let mut session = self.session()?;
        session.upload = None;
        session.scan = None;
        session.scan_life.reset();
        self.invalidate_insights(&mut session);
        self.emit(DashboardEvent::ScanCleared);
        self.emit_lifecycle(&session.scan_life);
        Ok(())
    }

    // ── Combined insights ───────────────────────────────────

    /// Ask the advisor for combined guidance.
    ///
    /// Rejected without calling the advisor unless both the panel and the
    /// scan analyses are in the success state.
    pub async fn request_insights(&self) -> Result<Completion<HealthInsights>, DashboardError> {
        let (ticket, request) = {
            let mut session = self.session()?;
            let panel_state = session.panel_life.state();
            let scan_state = session.scan_life.state();
            let ready = panel_state == AnalysisState::Success && scan_state == AnalysisState::Success;
            let request = match (ready, session.panel.as_ref(), session.scan.as_ref()) {
                (true, Some(panel), Some(scan)) => InsightRequest::from_results(scan, panel),
                _ => {
                    tracing::info!(%panel_state, %scan_state, "insights not ready");
                    return Err(DashboardError::InsightsNotReady {
                        panel: panel_state,
                        scan: scan_state,
                    });
                }
            };
            let ticket = session
                .insights_life
                .begin()
                .inspect_err(|e| tracing::info!(error = %e, "insight request rejected"))?;
            session.insights = None;
            self.emit_lifecycle(&session.insights_life);
            (ticket, request)
        };
        tracing::info!(
            generation = ticket.generation(),
            abnormal_tests = %request.abnormal_tests,
            "requesting health insights"
        );

        let advisor = Arc::clone(&self.inner.advisor);
        let outcome = run_blocking(move || advisor.provide_insights(&request)).await;

        let mut session = self.session()?;
        if !session.insights_life.is_current(&ticket) {
            tracing::debug!(generation = ticket.generation(), "discarding stale insights");
            return Ok(Completion::Discarded);
        }

        match outcome {
            Ok(insights) => {
                session.insights_life.finish(&ticket, true);
                session.insights = Some(insights.clone());
                self.emit(DashboardEvent::InsightsReady);
                self.emit_lifecycle(&session.insights_life);
                Ok(Completion::Committed(insights))
            }
            Err(e) => {
                tracing::error!(error = %e, "error providing health insights");
                session.insights_life.finish(&ticket, false);
                self.emit_lifecycle(&session.insights_life);
                self.notify(&mut session, INSIGHTS_FAILED);
                Err(DashboardError::Advisor(e))
            }
        }
    }

    /// Return insights from success or error to idle.
    pub fn reset_insights(&self) -> Result<(), DashboardError> {
        let mut session = self.session()?;
        session.insights = None;
        session.insights_life.reset();
        self.emit_lifecycle(&session.insights_life);
        Ok(())
    }

    /// Insights describe one panel + scan pair; any change to either makes
    /// them stale.
    fn invalidate_insights(&self, session: &mut Session) {
        if session.insights.is_none() && session.insights_life.state() == AnalysisState::Idle {
            return;
        }
        session.insights = None;
        session.insights_life.reset();
        self.emit_lifecycle(&session.insights_life);
    }

    fn should_auto_insights(&self, session: &Session) -> bool {
        self.inner.config.auto_insights
            && session.panel_life.state() == AnalysisState::Success
            && session.scan_life.state() == AnalysisState::Success
            && session.insights_life.state() == AnalysisState::Idle
    }

    fn spawn_insights(&self) {
        let dashboard = self.clone();
        tokio::spawn(async move {
            if let Err(e) = dashboard.request_insights().await {
                tracing::debug!(error = %e, "automatic insight request ended without insights");
            }
        });
    }

    // ── Abnormal value explanation ──────────────────────────

    /// Plain-language explanation of the current panel's abnormal values.
    /// Cached per panel; a cached explanation is returned without calling
    /// the advisor.
    pub async fn explain_abnormal_values(&self) -> Result<Completion<String>, DashboardError> {
        let (generation, request) = {
            let mut session = self.session()?;
            if session.panel_life.state() != AnalysisState::Success {
                return Err(DashboardError::PanelNotReady);
            }
            if let Some(text) = &session.explanation {
                return Ok(Completion::Committed(text.clone()));
            }
            if session.explanation_pending.is_some() {
                return Err(DashboardError::ExplanationInFlight);
            }
            let request = match session.panel.as_ref() {
                Some(panel) => ExplanationRequest::from_panel(panel),
                None => return Err(DashboardError::PanelNotReady),
            };
            let generation = session.panel_life.generation();
            session.explanation_pending = Some(generation);
            (generation, request)
        };
        tracing::info!(
            abnormal = request.abnormal_values.len(),
            "requesting abnormal value explanation"
        );

        let advisor = Arc::clone(&self.inner.advisor);
        let outcome = run_blocking(move || advisor.explain(&request)).await;

        let mut session = self.session()?;
        if session.explanation_pending == Some(generation) {
            session.explanation_pending = None;
        }
        let current = session.panel_life.generation() == generation
            && session.panel_life.state() == AnalysisState::Success;
        if !current {
            tracing::debug!(generation, "discarding explanation for replaced panel");
            return Ok(Completion::Discarded);
        }

        match outcome {
            Ok(explanation) => {
                session.explanation = Some(explanation.explanation.clone());
                self.emit(DashboardEvent::ExplanationReady);
                Ok(Completion::Committed(explanation.explanation))
            }
            Err(e) => {
                tracing::error!(error = %e, "error explaining abnormal values");
                self.notify(&mut session, EXPLANATION_FAILED);
                Err(DashboardError::Advisor(e))
            }
        }
    }

    // ── Chat ────────────────────────────────────────────────

    /// Send a question to the assistant. Always appends a bot message: the
    /// reply, or a fixed apology when the advisor fails.
    pub async fn ask(&self, question: &str) -> Result<ChatMessage, DashboardError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DashboardError::EmptyQuestion);
        }

        let request = {
            let mut session = self.session()?;
            if session.chat_pending {
                return Err(DashboardError::ChatInFlight);
            }
            let message = ChatMessage::user(question);
            session.chat.push(message.clone());
            session.chat_pending = true;
            self.emit(DashboardEvent::ChatMessage { message });
            ChatRequest {
                panel: session.panel.clone(),
                question: question.to_string(),
            }
        };

        let advisor = Arc::clone(&self.inner.advisor);
        let outcome = run_blocking(move || advisor.chat(&request)).await;

        let reply = match outcome {
            Ok(reply) => ChatMessage::bot(reply.reply),
            Err(e) => {
                tracing::error!(error = %e, "chatbot error");
                ChatMessage::bot(CHAT_FALLBACK_REPLY)
            }
        };

        let mut session = self.session()?;
        session.chat_pending = false;
        session.chat.push(reply.clone());
        self.emit(DashboardEvent::ChatMessage {
            message: reply.clone(),
        });
        Ok(reply)
    }

    pub fn chat_suggestions(&self) -> Result<Vec<PromptSuggestion>, DashboardError> {
        let session = self.session()?;
        Ok(chat::chat_suggestions(session.panel.as_ref()))
    }

    // ── Read access ─────────────────────────────────────────

    pub fn state(&self, kind: AnalysisKind) -> Result<AnalysisState, DashboardError> {
        Ok(self.session()?.lifecycle(kind).state())
    }

    pub fn panel(&self) -> Result<Option<LabPanel>, DashboardError> {
        Ok(self.session()?.panel.clone())
    }

    pub fn scan_result(&self) -> Result<Option<ScanResult>, DashboardError> {
        Ok(self.session()?.scan.clone())
    }

    pub fn insights(&self) -> Result<Option<HealthInsights>, DashboardError> {
        Ok(self.session()?.insights.clone())
    }

    pub fn snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
        let session = self.session()?;
        Ok(DashboardSnapshot {
            abnormal_count: session.panel.as_ref().map_or(0, LabPanel::abnormal_count),
            panel: session.panel.clone(),
            scan_upload: session.upload.clone(),
            scan_result: session.scan.clone(),
            insights: session.insights.clone(),
            explanation: session.explanation.clone(),
            explanation_pending: session.explanation_pending.is_some(),
            chat: session.chat.clone(),
            chat_pending: session.chat_pending,
            last_notice: session.last_notice.clone(),
            states: LifecycleStates {
                scan: session.scan_life.state(),
                panel: session.panel_life.state(),
                insights: session.insights_life.state(),
            },
        })
    }
}

/// Media type of an acceptable scan file, judged by its name.
fn scan_media_type(file_name: &str) -> Option<String> {
    mime_guess::from_path(file_name)
        .iter()
        .find(|mime| SCAN_MEDIA_TYPES.contains(&mime.essence_str()))
        .map(|mime| mime.essence_str().to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "classifier panicked".to_string()
    }
}

/// Run a blocking advisor call off the async workers. A panicked call is
/// reported like any other advisor failure.
async fn run_blocking<T, F>(call: F) -> Result<T, AdvisorError>
where
    F: FnOnce() -> Result<T, AdvisorError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(result) => result,
        Err(e) => Err(AdvisorError::TaskFailed(e.to_string())),
    }
}
