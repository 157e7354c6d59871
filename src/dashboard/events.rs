use serde::Serialize;

use crate::models::{
    AnalysisKind, AnalysisState, ChatMessage, HealthInsights, LabPanel, Notice, ScanResult,
    ScanUpload,
};

/// Change notification pushed to presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    Lifecycle {
        kind: AnalysisKind,
        state: AnalysisState,
    },
    PanelUpdated {
        observations: usize,
        abnormal: usize,
    },
    PanelCleared,
    ScanUploaded {
        upload: ScanUpload,
    },
    ScanCleared,
    ScanAnalyzed {
        result: ScanResult,
    },
    InsightsReady,
    ExplanationReady,
    ChatMessage {
        message: ChatMessage,
    },
    Notice {
        notice: Notice,
    },
}

/// Everything a presentation layer needs to render the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub panel: Option<LabPanel>,
    pub abnormal_count: usize,
    pub scan_upload: Option<ScanUpload>,
    pub scan_result: Option<ScanResult>,
    pub insights: Option<HealthInsights>,
    pub explanation: Option<String>,
    pub explanation_pending: bool,
    pub chat: Vec<ChatMessage>,
    pub chat_pending: bool,
    pub last_notice: Option<Notice>,
    pub states: LifecycleStates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LifecycleStates {
    pub scan: AnalysisState,
    pub panel: AnalysisState,
    pub insights: AnalysisState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_on_the_wire() {
        let event = DashboardEvent::Lifecycle {
            kind: AnalysisKind::Scan,
            state: AnalysisState::Loading,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "lifecycle");
        assert_eq!(json["kind"], "scan");
        assert_eq!(json["state"], "loading");

        let cleared = serde_json::to_value(DashboardEvent::ScanCleared).unwrap();
        assert_eq!(cleared["type"], "scan_cleared");
    }
}
