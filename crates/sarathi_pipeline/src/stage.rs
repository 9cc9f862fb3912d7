//! Per-stage outcomes. The non-fatal-failure policy is an explicit,
//! inspectable structure rather than implicit exception suppression.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Emotion,
    Retrieval,
    Session,
    Generation,
    PersistUserTurn,
    PersistAssistantTurn,
    MoodLog,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum StageStatus {
    /// Primary path succeeded.
    Ok,
    /// Primary path failed; a fallback substitute was used.
    Degraded(String),
    /// The stage failed and its effect was skipped (secondary writes only).
    Failed(String),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<(Stage, StageStatus)>,
}

impl PipelineReport {
    pub fn record(&mut self, stage: Stage, status: StageStatus) {
        if !matches!(status, StageStatus::Ok) {
            tracing::warn!("pipeline stage {:?} degraded: {:?}", stage, status);
        }
        self.stages.push((stage, status));
    }

    pub fn status_of(&self, stage: Stage) -> Option<&StageStatus> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, status)| status)
    }

    pub fn all_ok(&self) -> bool {
        self.stages
            .iter()
            .all(|(_, status)| matches!(status, StageStatus::Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lookup() {
        let mut report = PipelineReport::default();
        report.record(Stage::Emotion, StageStatus::Ok);
        report.record(Stage::Retrieval, StageStatus::Degraded("empty".into()));

        assert!(matches!(
            report.status_of(Stage::Retrieval),
            Some(StageStatus::Degraded(_))
        ));
        assert!(report.status_of(Stage::MoodLog).is_none());
        assert!(!report.all_ok());
    }
}
