// SPDX-License-Identifier: MPL-2.0
//! Live camera sessions.
//!
//! A [`CaptureSession`] owns a worker thread that opens the device, keeps the
//! most recent frame in a shared slot, and closes the device when told to
//! stop. Dropping the session stops and joins the worker, so every exit path
//! (capture, cancel, error, shutdown) releases the camera. A session that is
//! still opening is detached instead: `open` may block on a permission prompt,
//! and the worker closes the device itself once it returns.
//!
//! The device is created inside the worker thread because platform camera
//! handles are generally not `Send`.

use super::Frame;
use crate::config::Config;
use crate::error::CameraError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use tokio::sync::oneshot;

/// Consecutive frame errors after which the stream is considered dead.
const MAX_CONSECUTIVE_FRAME_ERRORS: u32 = 10;

/// Requested device and format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraSettings {
    pub device_index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub jpeg_quality: u8,
}

impl CameraSettings {
    pub fn from_config(config: &Config) -> Self {
        use crate::config::{
            DEFAULT_CAMERA_FPS, DEFAULT_CAMERA_HEIGHT, DEFAULT_CAMERA_INDEX, DEFAULT_CAMERA_WIDTH,
        };
        let camera = &config.camera;
        Self {
            device_index: camera.device_index.unwrap_or(DEFAULT_CAMERA_INDEX),
            width: camera.width.unwrap_or(DEFAULT_CAMERA_WIDTH),
            height: camera.height.unwrap_or(DEFAULT_CAMERA_HEIGHT),
            fps: camera.fps.unwrap_or(DEFAULT_CAMERA_FPS),
            jpeg_quality: config.jpeg_quality(),
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// An opened, streaming camera.
pub trait CameraDevice {
    /// Blocks until the next frame is available.
    fn next_frame(&mut self) -> Result<Frame, CameraError>;

    /// Stops the stream. Called exactly once before the device is dropped.
    fn stop(&mut self);
}

/// Opens camera devices.
pub trait CameraBackend: Send + Sync {
    fn open(&self, settings: &CameraSettings) -> Result<Box<dyn CameraDevice>, CameraError>;
}

/// Platform cameras through `nokhwa`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NokhwaBackend;

impl CameraBackend for NokhwaBackend {
    fn open(&self, settings: &CameraSettings) -> Result<Box<dyn CameraDevice>, CameraError> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{
            CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
            Resolution,
        };

        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(settings.width, settings.height),
                FrameFormat::MJPEG,
                settings.fps,
            ),
        ));

        let mut camera =
            nokhwa::Camera::new(CameraIndex::Index(settings.device_index), format)
                .map_err(|e| CameraError::from_message(&e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CameraError::from_message(&e.to_string()))?;

        let resolution = camera.resolution();
        tracing::info!(
            device = settings.device_index,
            width = resolution.width(),
            height = resolution.height(),
            "camera stream opened"
        );

        Ok(Box::new(NokhwaDevice { camera }))
    }
}

struct NokhwaDevice {
    camera: nokhwa::Camera,
}

impl CameraDevice for NokhwaDevice {
    fn next_frame(&mut self) -> Result<Frame, CameraError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::Stream(e.to_string()))?;
        let decoded = buffer
            .decode_image::<nokhwa::pixel_format::RgbFormat>()
            .map_err(|e| CameraError::Stream(e.to_string()))?;

        Ok(Frame {
            width: decoded.width(),
            height: decoded.height(),
            rgb: decoded.into_raw(),
        })
    }

    fn stop(&mut self) {
        if let Err(err) = self.camera.stop_stream() {
            tracing::warn!(error = %err, "failed to stop camera stream");
        }
    }
}

enum WorkerCommand {
    Stop,
}

#[derive(Default)]
struct Shared {
    frame: Option<Frame>,
    failure: Option<CameraError>,
}

/// Resolves once the worker has either opened the device or given up.
pub type OpenReceiver = oneshot::Receiver<Result<(), CameraError>>;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one session, so late open results for a cancelled session can
/// be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// A running camera worker.
pub struct CaptureSession {
    id: SessionId,
    commands: mpsc::Sender<WorkerCommand>,
    shared: Arc<Mutex<Shared>>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession").field("id", &self.id).finish()
    }
}

impl CaptureSession {
    /// Spawns the worker. The returned receiver reports whether the device
    /// opened.
    pub fn start(
        backend: Arc<dyn CameraBackend>,
        settings: CameraSettings,
    ) -> Result<(Self, OpenReceiver), CameraError> {
        let id = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        let (command_tx, command_rx) = mpsc::channel();
        let (opened_tx, opened_rx) = oneshot::channel();
        let shared = Arc::new(Mutex::new(Shared::default()));

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("camera-capture".into())
            .spawn(move || run_worker(backend, settings, command_rx, worker_shared, opened_tx))
            .map_err(|e| CameraError::Open(e.to_string()))?;

        tracing::debug!(session = id.0, "camera session started");
        Ok((
            Self {
                id,
                commands: command_tx,
                shared,
                worker: Some(worker),
            },
            opened_rx,
        ))
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Copy of the most recent frame, for the live preview.
    pub fn latest_frame(&self) -> Option<Frame> {
        self.lock().frame.clone()
    }

    /// The stream failure that ended the worker, if any.
    pub fn failure(&self) -> Option<CameraError> {
        self.lock().failure.clone()
    }

    /// The frame a capture would produce right now.
    pub fn snapshot(&self) -> Result<Frame, CameraError> {
        let shared = self.lock();
        if let Some(failure) = &shared.failure {
            return Err(failure.clone());
        }
        shared.frame.clone().ok_or(CameraError::NoFrame)
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        lock_shared(&self.shared)
    }

    /// Asks the worker to stop without waiting for it.
    fn detach(mut self) {
        let _ = self.commands.send(WorkerCommand::Stop);
        self.worker = None;
        tracing::debug!(session = self.id.0, "camera session detached while opening");
    }
}

fn lock_shared(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        let _ = self.commands.send(WorkerCommand::Stop);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!(session = self.id.0, "camera worker panicked");
            }
        }
        tracing::debug!(session = self.id.0, "camera session released");
    }
}

fn run_worker(
    backend: Arc<dyn CameraBackend>,
    settings: CameraSettings,
    commands: mpsc::Receiver<WorkerCommand>,
    shared: Arc<Mutex<Shared>>,
    opened: oneshot::Sender<Result<(), CameraError>>,
) {
    let mut device = match backend.open(&settings) {
        Ok(device) => {
            let _ = opened.send(Ok(()));
            device
        }
        Err(err) => {
            tracing::warn!(error = %err, "camera open failed");
            let _ = opened.send(Err(err));
            return;
        }
    };

    let mut consecutive_errors = 0;
    loop {
        match commands.try_recv() {
            Ok(WorkerCommand::Stop) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        match device.next_frame() {
            Ok(frame) => {
                consecutive_errors = 0;
                lock_shared(&shared).frame = Some(frame);
            }
            Err(err) => {
                consecutive_errors += 1;
                tracing::debug!(error = %err, consecutive_errors, "camera frame error");
                if consecutive_errors >= MAX_CONSECUTIVE_FRAME_ERRORS {
                    tracing::warn!(error = %err, "camera stream lost");
                    lock_shared(&shared).failure = Some(err);
                    break;
                }
            }
        }
    }

    device.stop();
}

/// The two-state camera lifecycle, plus the wait for the device to open.
#[derive(Debug, Default)]
pub enum CameraState {
    #[default]
    Inactive,
    /// Worker spawned, device not yet confirmed.
    Starting(CaptureSession),
    /// Device streaming; preview and capture available.
    Active(CaptureSession),
}

impl CameraState {
    pub fn is_inactive(&self) -> bool {
        matches!(self, CameraState::Inactive)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, CameraState::Active(_))
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        match self {
            CameraState::Inactive => None,
            CameraState::Starting(session) | CameraState::Active(session) => Some(session),
        }
    }

    /// Starts a session unless one already exists.
    ///
    /// Returns `Ok(None)` when a session is already starting or active.
    pub fn start(
        &mut self,
        backend: Arc<dyn CameraBackend>,
        settings: CameraSettings,
    ) -> Result<Option<(SessionId, OpenReceiver)>, CameraError> {
        if !self.is_inactive() {
            return Ok(None);
        }
        let (session, opened) = CaptureSession::start(backend, settings)?;
        let id = session.id();
        *self = CameraState::Starting(session);
        Ok(Some((id, opened)))
    }

    /// Applies the open result of session `id`.
    ///
    /// Results for sessions that are no longer current are ignored. A failed
    /// open releases the session and returns the error.
    pub fn opened(&mut self, id: SessionId, result: Result<(), CameraError>) -> Result<(), CameraError> {
        let is_current = matches!(self, CameraState::Starting(s) if s.id() == id);
        if !is_current {
            return Ok(());
        }
        match (std::mem::take(self), result) {
            (CameraState::Starting(session), Ok(())) => {
                *self = CameraState::Active(session);
                Ok(())
            }
            (_, Err(err)) => Err(err),
            (other, Ok(())) => {
                *self = other;
                Ok(())
            }
        }
    }

    /// Takes a still frame and ends the session.
    ///
    /// When no frame has arrived yet the session stays active and
    /// [`CameraError::NoFrame`] is returned.
    pub fn capture(&mut self) -> Result<Frame, CameraError> {
        let CameraState::Active(session) = self else {
            return Err(CameraError::NoFrame);
        };
        match session.snapshot() {
            Ok(frame) => {
                self.stop();
                Ok(frame)
            }
            Err(CameraError::NoFrame) => Err(CameraError::NoFrame),
            Err(err) => {
                self.stop();
                Err(err)
            }
        }
    }

    /// Ends the session if the stream died, returning the cause.
    pub fn take_failure(&mut self) -> Option<CameraError> {
        let failure = self.session().and_then(CaptureSession::failure)?;
        self.stop();
        Some(failure)
    }

    /// Releases any session without blocking on a device that is still
    /// opening.
    pub fn stop(&mut self) {
        match std::mem::take(self) {
            CameraState::Starting(session) => session.detach(),
            CameraState::Active(session) => drop(session),
            CameraState::Inactive => {}
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process camera doubles.

    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Produces solid gray frames and counts open devices.
    #[derive(Debug, Default)]
    pub struct FakeBackend {
        pub open_devices: Arc<AtomicUsize>,
        pub opens: AtomicUsize,
        pub fail_with: Option<CameraError>,
        pub frame_error: Option<CameraError>,
        /// Time `open` blocks, like a permission prompt.
        pub open_delay: Option<Duration>,
    }

    impl FakeBackend {
        pub fn failing(err: CameraError) -> Self {
            Self {
                fail_with: Some(err),
                ..Self::default()
            }
        }

        pub fn slow_to_open(delay: Duration) -> Self {
            Self {
                open_delay: Some(delay),
                ..Self::default()
            }
        }

        pub fn broken_stream(err: CameraError) -> Self {
            Self {
                frame_error: Some(err),
                ..Self::default()
            }
        }

        pub fn open_devices(&self) -> usize {
            self.open_devices.load(Ordering::SeqCst)
        }
    }

    impl CameraBackend for FakeBackend {
        fn open(&self, settings: &CameraSettings) -> Result<Box<dyn CameraDevice>, CameraError> {
            if let Some(delay) = self.open_delay {
                std::thread::sleep(delay);
            }
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            self.open_devices.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeDevice {
                width: settings.width,
                height: settings.height,
                open_devices: Arc::clone(&self.open_devices),
                frame_error: self.frame_error.clone(),
                stopped: false,
            }))
        }
    }

    struct FakeDevice {
        width: u32,
        height: u32,
        open_devices: Arc<AtomicUsize>,
        frame_error: Option<CameraError>,
        stopped: bool,
    }

    impl CameraDevice for FakeDevice {
        fn next_frame(&mut self) -> Result<Frame, CameraError> {
            std::thread::sleep(Duration::from_millis(2));
            if let Some(err) = &self.frame_error {
                return Err(err.clone());
            }
            Ok(Frame {
                width: self.width,
                height: self.height,
                rgb: vec![100; (self.width * self.height * 3) as usize],
            })
        }

        fn stop(&mut self) {
            if !self.stopped {
                self.stopped = true;
                self.open_devices.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    /// Small frames keep the tests fast.
    pub fn small_settings() -> CameraSettings {
        CameraSettings {
            device_index: 0,
            width: 16,
            height: 12,
            fps: 30,
            jpeg_quality: 80,
        }
    }

    /// Polls until the worker has published a frame.
    pub fn wait_for_frame(state: &CameraState) {
        for _ in 0..500 {
            if state.session().and_then(CaptureSession::latest_frame).is_some() {
                return;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("camera never produced a frame");
    }

    /// Starts a camera on `state` and waits for it to become active.
    pub fn start_active(state: &mut CameraState, backend: Arc<dyn CameraBackend>) {
        let (id, opened) = state
            .start(backend, small_settings())
            .expect("spawn worker")
            .expect("camera was inactive");
        let result = opened.blocking_recv().expect("worker reported");
        state.opened(id, result).expect("camera opened");
        assert!(state.is_active());
    }
}
