use crate::errors::CoreError;
use crate::models::{AnalysisStatus, ArtAnalysis, Mood, PreviewHandle, average_score};

/// Generation token for one analysis request.
///
/// Handed out by [`Session::select`] and presented back to [`Session::resolve`];
/// a ticket from before the latest `select`/`reset` no longer matches and its
/// outcome is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What `resolve` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The outcome was current and moved the session to this status.
    Applied(AnalysisStatus),
    /// The ticket was superseded; state is unchanged.
    Stale,
}

/// Lifecycle of a single analysis: idle → analyzing → complete | error, and back
/// to idle only through `reset`.
#[derive(Debug)]
pub struct Session {
    status: AnalysisStatus,
    generation: u64,
    analysis: Option<ArtAnalysis>,
    preview: Option<PreviewHandle>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            status: AnalysisStatus::Idle,
            generation: 0,
            analysis: None,
            preview: None,
        }
    }

    pub fn status(&self) -> AnalysisStatus {
        self.status
    }

    pub fn analysis(&self) -> Option<&ArtAnalysis> {
        self.analysis.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    /// Derived on every call from the current analysis.
    pub fn average_score(&self) -> u32 {
        average_score(self.analysis.as_ref())
    }

    pub fn mood(&self) -> Mood {
        Mood::from_status(self.status, self.average_score())
    }

    /// A new selection is only accepted from `idle`.
    pub fn can_select(&self) -> bool {
        self.status == AnalysisStatus::Idle
    }

    /// Accept a selected image: store its preview and start analyzing.
    pub fn select(&mut self, preview: PreviewHandle) -> Result<Ticket, CoreError> {
        if !self.can_select() {
            return Err(CoreError::InvalidTransition {
                from: self.status.to_string(),
                event: "select an image".to_string(),
            });
        }
        self.generation += 1;
        tracing::debug!(generation = self.generation, file = %preview.file_name, "analysis started");
        self.preview = Some(preview);
        self.analysis = None;
        self.status = AnalysisStatus::Analyzing;
        Ok(Ticket {
            generation: self.generation,
        })
    }

    /// Apply the outcome of the request identified by `ticket`.
    ///
    /// Failures of any kind collapse into `error`; the detail only reaches the
    /// diagnostic trace.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        outcome: Result<ArtAnalysis, CoreError>,
    ) -> Resolution {
        if ticket.generation != self.generation || self.status != AnalysisStatus::Analyzing {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                status = %self.status,
                "discarding stale analysis outcome"
            );
            return Resolution::Stale;
        }

        match outcome {
            Ok(analysis) => {
                tracing::debug!(
                    generation = self.generation,
                    metrics = analysis.technical_scores.len(),
                    "analysis complete"
                );
                self.analysis = Some(analysis);
                self.status = AnalysisStatus::Complete;
            }
            Err(e) => {
                tracing::warn!(generation = self.generation, error = %e, "analysis failed");
                self.analysis = None;
                self.status = AnalysisStatus::Error;
            }
        }
        Resolution::Applied(self.status)
    }

    /// Return to `idle`, discarding analysis and preview. Any request still in
    /// flight is orphaned.
    pub fn reset(&mut self) {
        if self.status == AnalysisStatus::Analyzing {
            tracing::debug!(generation = self.generation, "reset while analyzing");
        }
        self.generation += 1;
        self.status = AnalysisStatus::Idle;
        self.analysis = None;
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::parse_analysis_response;

    const GOOD_REPLY: &str = r##"{
        "technicalScores": [
            {"category": "Perspectiva", "score": 80, "fullMark": 100},
            {"category": "Color", "score": 60, "fullMark": 100}
        ],
        "detectedPatterns": [],
        "colorPalette": ["#ff0000"],
        "feedback": {"strengths": [], "improvements": [], "tips": []},
        "catCommentary": "Bien"
    }"##;

    fn preview() -> PreviewHandle {
        PreviewHandle::for_path("/tmp/obra.png")
    }

    fn good() -> Result<ArtAnalysis, CoreError> {
        parse_analysis_response(GOOD_REPLY)
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let s = Session::new();
        assert_eq!(s.status(), AnalysisStatus::Idle);
        assert!(s.analysis().is_none());
        assert!(s.preview().is_none());
        assert_eq!(s.average_score(), 0);
        assert_eq!(s.mood(), Mood::Neutral);
    }

    #[test]
    fn test_select_sets_preview_before_any_response() {
        let mut s = Session::new();
        let p = preview();
        s.select(p.clone()).unwrap();
        assert_eq!(s.status(), AnalysisStatus::Analyzing);
        assert_eq!(s.preview(), Some(&p));
        assert!(s.analysis().is_none());
    }

    #[test]
    fn test_success_completes_with_average() {
        let mut s = Session::new();
        let t = s.select(preview()).unwrap();
        assert_eq!(s.resolve(t, good()), Resolution::Applied(AnalysisStatus::Complete));
        assert_eq!(s.status(), AnalysisStatus::Complete);
        assert_eq!(s.average_score(), 70);
        assert_eq!(s.mood(), Mood::Pleased);
    }

    #[test]
    fn test_missing_feedback_goes_to_error() {
        let mut s = Session::new();
        let t = s.select(preview()).unwrap();
        let reply = r##"{
            "technicalScores": [{"category": "Color", "score": 60, "fullMark": 100}],
            "detectedPatterns": [],
            "colorPalette": [],
            "catCommentary": "Bien"
        }"##;
        s.resolve(t, parse_analysis_response(reply));
        assert_eq!(s.status(), AnalysisStatus::Error);
        assert!(s.analysis().is_none());
    }

    #[test]
    fn test_reply_with_unknown_fields_goes_to_error() {
        let mut s = Session::new();
        let t = s.select(preview()).unwrap();
        let reply = GOOD_REPLY.replace(
            "\"catCommentary\": \"Bien\"",
            "\"catCommentary\": \"Bien\", \"mood\": \"feliz\", \"unexpected\": true",
        );
        assert_eq!(
            s.resolve(t, parse_analysis_response(&reply)),
            Resolution::Applied(AnalysisStatus::Error)
        );
        assert!(s.analysis().is_none());
    }

    #[test]
    fn test_every_failure_kind_collapses_to_error() {
        let failures = vec![
            CoreError::MissingCredential("no key".to_string()),
            CoreError::Transport("HTTP 500".to_string()),
            CoreError::EmptyResponse,
            CoreError::Parse("bad json".to_string()),
            CoreError::Io("unreadable".to_string()),
        ];
        for failure in failures {
            let mut s = Session::new();
            let t = s.select(preview()).unwrap();
            assert_eq!(
                s.resolve(t, Err(failure)),
                Resolution::Applied(AnalysisStatus::Error)
            );
            assert_eq!(s.status(), AnalysisStatus::Error);
        }
    }

    #[test]
    fn test_only_one_outcome_applies_per_ticket() {
        let mut s = Session::new();
        let t = s.select(preview()).unwrap();
        s.resolve(t, good());
        // A second outcome for the same ticket must not flip complete to error.
        assert_eq!(
            s.resolve(t, Err(CoreError::EmptyResponse)),
            Resolution::Stale
        );
        assert_eq!(s.status(), AnalysisStatus::Complete);
        assert_eq!(s.average_score(), 70);
    }

    #[test]
    fn test_select_rejected_unless_idle() {
        let mut s = Session::new();
        let t = s.select(preview()).unwrap();
        assert!(matches!(
            s.select(preview()),
            Err(CoreError::InvalidTransition { .. })
        ));

        s.resolve(t, good());
        assert!(s.select(preview()).is_err());
        assert_eq!(s.status(), AnalysisStatus::Complete);

        s.reset();
        let t = s.select(preview()).unwrap();
        s.resolve(t, Err(CoreError::EmptyResponse));
        assert!(s.select(preview()).is_err());
        assert_eq!(s.status(), AnalysisStatus::Error);
    }

    #[test]
    fn test_reset_clears_from_complete_and_error() {
        let mut s = Session::new();
        let t = s.select(preview()).unwrap();
        s.resolve(t, good());
        s.reset();
        assert_eq!(s.status(), AnalysisStatus::Idle);
        assert!(s.analysis().is_none());
        assert!(s.preview().is_none());
        assert_eq!(s.average_score(), 0);

        let t = s.select(preview()).unwrap();
        s.resolve(t, Err(CoreError::Transport("timeout".to_string())));
        s.reset();
        assert_eq!(s.status(), AnalysisStatus::Idle);
        assert!(s.preview().is_none());
    }

    #[test]
    fn test_stale_success_after_reset_is_ignored() {
        let mut s = Session::new();
        let t = s.select(preview()).unwrap();
        s.reset();
        assert_eq!(s.resolve(t, good()), Resolution::Stale);
        assert_eq!(s.status(), AnalysisStatus::Idle);
        assert!(s.analysis().is_none());
    }

    #[test]
    fn test_stale_failure_after_reset_is_ignored() {
        let mut s = Session::new();
        let t = s.select(preview()).unwrap();
        s.reset();
        assert_eq!(s.resolve(t, Err(CoreError::EmptyResponse)), Resolution::Stale);
        assert_eq!(s.status(), AnalysisStatus::Idle);
    }

    #[test]
    fn test_stale_outcome_does_not_overwrite_newer_request() {
        let mut s = Session::new();
        let old = s.select(preview()).unwrap();
        s.reset();
        let newer = s.select(preview()).unwrap();
        assert_ne!(old, newer);

        assert_eq!(s.resolve(old, good()), Resolution::Stale);
        assert_eq!(s.status(), AnalysisStatus::Analyzing);

        s.resolve(newer, Err(CoreError::EmptyResponse));
        assert_eq!(s.status(), AnalysisStatus::Error);
    }

    #[test]
    fn test_new_analysis_replaces_previous_wholesale() {
        let mut s = Session::new();
        let t = s.select(preview()).unwrap();
        s.resolve(t, good());
        s.reset();

        let t = s.select(preview()).unwrap();
        let second = GOOD_REPLY
            .replace("\"score\": 80", "\"score\": 40")
            .replace("\"score\": 60", "\"score\": 50");
        s.resolve(t, parse_analysis_response(&second));
        assert_eq!(s.average_score(), 45);
        assert_eq!(s.mood(), Mood::Stern);
        assert_eq!(s.analysis().unwrap().technical_scores.len(), 2);
    }

    #[test]
    fn test_empty_scores_average_zero_when_complete() {
        let mut s = Session::new();
        let t = s.select(preview()).unwrap();
        let reply = r##"{
            "technicalScores": [],
            "detectedPatterns": ["Tramado"],
            "colorPalette": [],
            "feedback": {"strengths": [], "improvements": [], "tips": []},
            "catCommentary": "Nada que medir"
        }"##;
        s.resolve(t, parse_analysis_response(reply));
        assert_eq!(s.status(), AnalysisStatus::Complete);
        assert_eq!(s.average_score(), 0);
    }
}
