// SPDX-License-Identifier: MPL-2.0
//! The capture-analyze-present session.
//!
//! [`Session`] is the single owner of everything a cycle touches: the pending
//! image, the form values, the camera, the in-flight request and the last
//! result. Every transition is a method here so it can be tested without a
//! window; the app layer only turns the returned values into tasks and
//! notifications.

use crate::analysis::{
    AnalysisParameters, AnalysisRequest, AnalysisResult, EyeCondition, ScreenTime,
};
use crate::capture::camera::{CameraBackend, CameraSettings, CameraState, OpenReceiver, SessionId};
use crate::capture::PendingImage;
use crate::config::DEFAULT_SCREEN_TIME_HOURS;
use crate::error::{AnalysisError, CameraError, FlowError};
use crate::report::Report;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Which part of the cycle the session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// A request is in flight; the loading overlay is up.
    Loading,
    /// A result is on screen.
    Results,
}

/// Identifies one analysis attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generation(u64);

/// Identifies one file load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadId(u64);

/// Everything needed to run one analysis off the UI thread.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    pub generation: Generation,
    pub request: AnalysisRequest,
}

/// What [`Session::finish_analysis`] did with an outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The outcome belonged to an abandoned attempt.
    Ignored,
    /// The result is stored and on screen.
    Presented,
    /// The attempt failed; nothing was committed.
    Failed(AnalysisError),
}

/// The exclusively-owned session state.
#[derive(Debug)]
pub struct Session {
    pending: Option<PendingImage>,
    screen_time_input: String,
    condition: EyeCondition,
    camera: CameraState,
    phase: Phase,
    result: Option<AnalysisResult>,
    generation: u64,
    load: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            pending: None,
            screen_time_input: default_screen_time_input(),
            condition: EyeCondition::default(),
            camera: CameraState::default(),
            phase: Phase::default(),
            result: None,
            generation: 0,
            load: 0,
        }
    }
}

fn default_screen_time_input() -> String {
    crate::analysis::format_hours(DEFAULT_SCREEN_TIME_HOURS)
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // Pending image

    pub fn pending_image(&self) -> Option<&PendingImage> {
        self.pending.as_ref()
    }

    /// Stores an accepted image, replacing any previous one.
    pub fn accept_image(&mut self, image: PendingImage) {
        tracing::info!(source = %image.source(), mime = image.mime(), len = image.bytes().len(), "image accepted");
        self.pending = Some(image);
    }

    pub fn remove_image(&mut self) {
        self.pending = None;
        self.load += 1;
    }

    /// Registers a file load; only the most recent one may deliver an image.
    pub fn begin_load(&mut self) -> LoadId {
        self.load += 1;
        LoadId(self.load)
    }

    /// The most recently registered load.
    pub fn current_load(&self) -> LoadId {
        LoadId(self.load)
    }

    /// Whether `load` is still the one the session is waiting for.
    pub fn is_current_load(&self, load: LoadId) -> bool {
        load.0 == self.load
    }

    /// Stores the image of `load` unless a newer load, a removal, a capture
    /// or a reset superseded it. Returns whether the image was taken.
    pub fn finish_load(&mut self, load: LoadId, image: PendingImage) -> bool {
        if !self.is_current_load(load) {
            tracing::debug!(load = load.0, "dropping stale image load");
            return false;
        }
        self.accept_image(image);
        true
    }

    /// Analyze is offered only with an image and no request in flight.
    pub fn can_analyze(&self) -> bool {
        self.pending.is_some() && self.phase != Phase::Loading
    }

    // Form

    /// Raw text of the screen-time field.
    pub fn screen_time_input(&self) -> &str {
        &self.screen_time_input
    }

    pub fn set_screen_time_input(&mut self, input: String) {
        self.screen_time_input = input;
    }

    pub fn condition(&self) -> EyeCondition {
        self.condition
    }

    pub fn set_condition(&mut self, condition: EyeCondition) {
        self.condition = condition;
    }

    /// Parameters as they would be submitted right now.
    pub fn parameters(&self) -> AnalysisParameters {
        AnalysisParameters {
            screen_time: ScreenTime::parse_or_default(&self.screen_time_input),
            condition: self.condition,
        }
    }

    // Camera

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// Starts the camera unless a session already exists.
    pub fn start_camera(
        &mut self,
        backend: Arc<dyn CameraBackend>,
        settings: CameraSettings,
    ) -> Result<Option<(SessionId, OpenReceiver)>, CameraError> {
        let started = self.camera.start(backend, settings)?;
        if started.is_none() {
            tracing::debug!("camera already running, start ignored");
        }
        Ok(started)
    }

    pub fn camera_opened(
        &mut self,
        id: SessionId,
        result: Result<(), CameraError>,
    ) -> Result<(), CameraError> {
        self.camera.opened(id, result)
    }

    /// Captures a still, ends the camera session and stores the JPEG as the
    /// pending image.
    pub fn capture_photo(&mut self, jpeg_quality: u8) -> Result<(), CameraError> {
        let frame = self.camera.capture()?;
        let image = frame.into_pending_image(jpeg_quality)?;
        self.load += 1;
        self.accept_image(image);
        Ok(())
    }

    pub fn cancel_camera(&mut self) {
        self.camera.stop();
    }

    /// Releases the camera if its stream died, returning the cause.
    pub fn poll_camera_failure(&mut self) -> Option<CameraError> {
        self.camera.take_failure()
    }

    // Analysis

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// The most recently issued attempt.
    pub fn current_generation(&self) -> Generation {
        Generation(self.generation)
    }

    /// Checks preconditions and builds the request.
    ///
    /// On success the session is loading until the matching
    /// [`Self::finish_analysis`] or a [`Self::reset`]. Any previous result is
    /// dropped so it is neither shown nor exported while the new attempt runs.
    pub fn begin_analysis(&mut self, parameters: AnalysisParameters) -> Result<AnalysisTicket, FlowError> {
        if self.phase == Phase::Loading {
            return Err(FlowError::Busy);
        }
        let image = self.pending.as_ref().ok_or(FlowError::NoImage)?;

        let request = AnalysisRequest::new(image.to_data_url(), parameters);
        self.generation += 1;
        self.phase = Phase::Loading;
        self.result = None;
        Ok(AnalysisTicket {
            generation: Generation(self.generation),
            request,
        })
    }

    /// Applies the outcome of attempt `generation`.
    pub fn finish_analysis(
        &mut self,
        generation: Generation,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> Completion {
        if generation.0 != self.generation || self.phase != Phase::Loading {
            tracing::debug!(generation = generation.0, "dropping stale analysis outcome");
            return Completion::Ignored;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.phase = Phase::Results;
                Completion::Presented
            }
            Err(err) => {
                self.phase = Phase::Idle;
                Completion::Failed(err)
            }
        }
    }

    // Reset and export

    /// Returns to the initial state. Idempotent.
    pub fn reset(&mut self) {
        self.pending = None;
        self.camera.stop();
        self.result = None;
        self.phase = Phase::Idle;
        // Invalidates any in-flight attempt and file load.
        self.generation += 1;
        self.load += 1;
        self.screen_time_input = default_screen_time_input();
        self.condition = EyeCondition::default();
    }

    /// Builds the export document from the retained result.
    pub fn export_report(&self, now: DateTime<Utc>) -> Result<Report, FlowError> {
        self.result
            .as_ref()
            .map(|result| Report::new(result, now))
            .ok_or(FlowError::NoResult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisResponse, Score};
    use crate::capture::camera::testing::{start_active, wait_for_frame, FakeBackend};
    use crate::capture::ImageSource;
    use chrono::TimeZone;

    fn jpeg_image() -> PendingImage {
        PendingImage::new(vec![0xff, 0xd8, 0xff, 0xe0], "image/jpeg", ImageSource::Camera)
    }

    fn dry_eyes_result() -> AnalysisResult {
        let response: AnalysisResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "redness_score": 6.2,
            "dryness_score": 7.8,
            "fatigue_score": 5.5,
            "final_fatigue": 6.5,
            "emoji": "😣",
            "fatigue_level": "High",
            "screen_time": 10,
            "condition": "Dry Eyes",
            "demo_mode": false,
            "recommendations": ["Take a 20-20-20 break", "Use lubricating eye drops"],
        }))
        .unwrap();
        let request = AnalysisRequest::new("x", AnalysisParameters::default());
        response.into_result(&request).unwrap()
    }

    #[test]
    fn new_session_has_default_parameters() {
        let session = Session::new();
        assert_eq!(session.screen_time_input(), "8");
        assert_eq!(session.parameters(), AnalysisParameters::default());
        assert!(!session.can_analyze());
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn analyze_without_image_issues_no_request() {
        let mut session = Session::new();
        let err = session.begin_analysis(session.parameters()).unwrap_err();
        assert_eq!(err, FlowError::NoImage);
        assert!(!session.is_loading());
    }

    #[test]
    fn accepted_image_enables_analyze() {
        let mut session = Session::new();
        session.accept_image(jpeg_image());
        assert!(session.can_analyze());

        session.remove_image();
        assert!(session.pending_image().is_none());
        assert!(!session.can_analyze());
    }

    #[test]
    fn only_latest_load_delivers_an_image() {
        let mut session = Session::new();
        let first = session.begin_load();
        let second = session.begin_load();

        assert!(!session.finish_load(first, jpeg_image()));
        assert!(session.pending_image().is_none());
        assert!(session.finish_load(second, jpeg_image()));
        assert!(session.can_analyze());
    }

    #[test]
    fn load_finishing_after_reset_is_dropped() {
        let mut session = Session::new();
        let load = session.begin_load();
        session.reset();

        assert!(!session.is_current_load(load));
        assert!(!session.finish_load(load, jpeg_image()));
        assert!(session.pending_image().is_none());
    }

    #[test]
    fn dry_eyes_scenario_builds_request_and_presents_result() {
        let mut session = Session::new();
        session.accept_image(jpeg_image());
        session.set_screen_time_input("10".into());
        session.set_condition(EyeCondition::DryEyes);

        let ticket = session.begin_analysis(session.parameters()).unwrap();
        assert!(session.is_loading());
        assert!(!session.can_analyze());
        assert_eq!(
            serde_json::to_value(&ticket.request).unwrap(),
            serde_json::json!({
                "image": "data:image/jpeg;base64,/9j/4A==",
                "screen_time": 10,
                "condition": "Dry Eyes",
            })
        );

        let completion = session.finish_analysis(ticket.generation, Ok(dry_eyes_result()));
        assert_eq!(completion, Completion::Presented);
        assert_eq!(session.phase(), Phase::Results);

        let result = session.result().unwrap();
        let scores: Vec<String> = [result.redness, result.dryness, result.fatigue, result.final_fatigue]
            .into_iter()
            .map(Score::display)
            .collect();
        assert_eq!(scores, ["6.2/10", "7.8/10", "5.5/10", "6.5/10"]);
        assert_eq!(result.level_display(), "😣 High");
        assert!(!result.demo_mode);
        assert_eq!(
            result.recommendations,
            ["Take a 20-20-20 break", "Use lubricating eye drops"]
        );
    }

    #[test]
    fn second_analyze_while_loading_is_rejected() {
        let mut session = Session::new();
        session.accept_image(jpeg_image());
        session.begin_analysis(session.parameters()).unwrap();
        assert_eq!(
            session.begin_analysis(session.parameters()).unwrap_err(),
            FlowError::Busy
        );
    }

    #[test]
    fn service_failure_never_reveals_results() {
        let mut session = Session::new();
        session.accept_image(jpeg_image());
        let ticket = session.begin_analysis(session.parameters()).unwrap();

        let err = AnalysisError::Service(Some("No eyes found".into()));
        let completion = session.finish_analysis(ticket.generation, Err(err.clone()));
        assert_eq!(completion, Completion::Failed(err));
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.result().is_none());
        assert!(session.can_analyze());
    }

    #[test]
    fn failure_after_success_hides_previous_result() {
        let mut session = Session::new();
        session.accept_image(jpeg_image());
        let first = session.begin_analysis(session.parameters()).unwrap();
        session.finish_analysis(first.generation, Ok(dry_eyes_result()));

        let second = session.begin_analysis(session.parameters()).unwrap();
        // The old scores are gone while the new request runs.
        assert!(session.result().is_none());

        let err = AnalysisError::Service(Some("No eyes found".into()));
        session.finish_analysis(second.generation, Err(err));
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.result().is_none());
        assert_eq!(session.export_report(Utc::now()).unwrap_err(), FlowError::NoResult);
        assert!(session.can_analyze());
    }

    #[test]
    fn reset_restores_initial_state_and_is_idempotent() {
        let mut session = Session::new();
        session.accept_image(jpeg_image());
        session.set_screen_time_input("12".into());
        session.set_condition(EyeCondition::Astigmatism);
        let ticket = session.begin_analysis(session.parameters()).unwrap();
        session.finish_analysis(ticket.generation, Ok(dry_eyes_result()));

        for _ in 0..2 {
            session.reset();
            assert_eq!(session.parameters(), AnalysisParameters::default());
            assert_eq!(session.parameters().screen_time.hours(), 8.0);
            assert_eq!(session.condition(), EyeCondition::Normal);
            assert!(session.pending_image().is_none());
            assert!(session.result().is_none());
            assert_eq!(session.phase(), Phase::Idle);
        }
    }

    #[test]
    fn reset_abandons_in_flight_analysis() {
        let mut session = Session::new();
        session.accept_image(jpeg_image());
        let ticket = session.begin_analysis(session.parameters()).unwrap();

        session.reset();
        assert!(!session.is_loading());

        let completion = session.finish_analysis(ticket.generation, Ok(dry_eyes_result()));
        assert_eq!(completion, Completion::Ignored);
        assert!(session.result().is_none());
    }

    #[test]
    fn export_requires_a_result() {
        let session = Session::new();
        assert_eq!(session.export_report(Utc::now()).unwrap_err(), FlowError::NoResult);
    }

    #[test]
    fn export_matches_displayed_strings() {
        let mut session = Session::new();
        session.accept_image(jpeg_image());
        let ticket = session.begin_analysis(session.parameters()).unwrap();
        session.finish_analysis(ticket.generation, Ok(dry_eyes_result()));

        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let report = session.export_report(now).unwrap();
        let result = session.result().unwrap();

        assert_eq!(report.redness_score, result.redness.display());
        assert_eq!(report.final_fatigue_score, "6.5/10");
        assert_eq!(report.screen_time, "10 hours");
        assert_eq!(report.recommendations.len(), result.recommendations.len());
        assert_eq!(report.filename(), "eye-fatigue-report-2025-03-14.json");
    }

    #[test]
    fn camera_capture_becomes_pending_image() {
        let backend = Arc::new(FakeBackend::default());
        let mut session = Session::new();
        start_active(&mut session.camera, backend.clone());
        wait_for_frame(session.camera());

        session.capture_photo(80).unwrap();
        assert!(session.camera().is_inactive());
        assert_eq!(backend.open_devices(), 0);
        let image = session.pending_image().unwrap();
        assert_eq!(image.mime(), "image/jpeg");
        assert!(session.can_analyze());
    }

    #[test]
    fn double_camera_start_keeps_one_stream() {
        let backend = Arc::new(FakeBackend::default());
        let mut session = Session::new();
        start_active(&mut session.camera, backend.clone());

        let again = session
            .start_camera(backend.clone(), CameraSettings::default())
            .unwrap();
        assert!(again.is_none());
        assert_eq!(backend.open_devices(), 1);
    }

    #[test]
    fn denied_camera_leaves_pending_image_alone() {
        let backend = Arc::new(FakeBackend::failing(CameraError::PermissionDenied));
        let mut session = Session::new();
        session.accept_image(jpeg_image());

        let (id, opened) = session
            .start_camera(backend, CameraSettings::default())
            .unwrap()
            .unwrap();
        let result = opened.blocking_recv().unwrap();
        assert_eq!(session.camera_opened(id, result), Err(CameraError::PermissionDenied));
        assert!(session.camera().is_inactive());
        assert_eq!(session.pending_image(), Some(&jpeg_image()));
    }

    #[test]
    fn cancel_and_reset_release_the_camera() {
        let backend = Arc::new(FakeBackend::default());
        let mut session = Session::new();

        start_active(&mut session.camera, backend.clone());
        session.cancel_camera();
        assert_eq!(backend.open_devices(), 0);
        assert!(session.pending_image().is_none());

        start_active(&mut session.camera, backend.clone());
        session.reset();
        assert_eq!(backend.open_devices(), 0);
    }

    #[test]
    fn cancel_during_slow_open_returns_promptly() {
        let backend = Arc::new(FakeBackend::slow_to_open(std::time::Duration::from_millis(600)));
        let mut session = Session::new();
        let _started = session
            .start_camera(backend, CameraSettings::default())
            .unwrap()
            .unwrap();

        let before = std::time::Instant::now();
        session.cancel_camera();
        assert!(before.elapsed() < std::time::Duration::from_millis(300));
        assert!(session.camera().is_inactive());
    }

    #[test]
    fn capture_before_first_frame_keeps_session() {
        let backend = Arc::new(FakeBackend::default());
        let mut session = Session::new();
        let (id, opened) = session
            .start_camera(backend.clone(), CameraSettings::default())
            .unwrap()
            .unwrap();
        // Still starting: capture has nothing to take.
        assert_eq!(session.capture_photo(80), Err(CameraError::NoFrame));
        session.camera_opened(id, opened.blocking_recv().unwrap()).unwrap();
        assert!(session.camera().is_active());
        session.cancel_camera();
    }
}
