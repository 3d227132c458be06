//! Editing session lifecycle.
//!
//! One session tracks a single image from upload through download:
//!
//! ```text
//! Idle → Uploading → AwaitingResult → Scanning → Ready
//!                                                  ↕ (edits)
//!                                               Editing → Composing → Downloaded
//! ```
//!
//! `Failed` is reachable from `Uploading`, `AwaitingResult`, `Scanning`,
//! and `Composing`; a failed session can start over with a new upload.
//!
//! Edits are last-write-wins on plain fields — there is no concurrent
//! mutation to coordinate, and composites run synchronously from a ready
//! state, so a second composite cannot start while one is in flight.

use crate::imaging::{
    CanvasSize, ColorAdjustments, CroppedAsset, DisplayDimensions, ViewportTransform,
    calculations::{center_transform, fit_to_display},
    compose::{ComposeError, compose_to_png, solid_background},
};
use image::{Rgba, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("cannot {action} while session is {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
    #[error("compose failed: {0}")]
    Compose(#[from] ComposeError),
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Uploading,
    AwaitingResult { task_id: u64 },
    Scanning,
    Ready,
    Editing,
    Composing,
    Downloaded,
    Failed { message: String },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Uploading => "uploading",
            Self::AwaitingResult { .. } => "awaiting result",
            Self::Scanning => "scanning",
            Self::Ready => "ready",
            Self::Editing => "editing",
            Self::Composing => "composing",
            Self::Downloaded => "downloaded",
            Self::Failed { .. } => "failed",
        }
    }
}

/// A single image-editing session.
pub struct EditSession {
    state: SessionState,
    canvas: CanvasSize,
    max_display: u32,
    foreground: Option<RgbaImage>,
    display: Option<DisplayDimensions>,
    /// Display fit at the moment the cutout arrived — what reset restores.
    original_display: Option<DisplayDimensions>,
    transform: ViewportTransform,
    /// Centered placement for the current foreground — what reset restores.
    center: ViewportTransform,
    adjustments: ColorAdjustments,
    /// `None` composes over the stock white background.
    background: Option<RgbaImage>,
}

impl EditSession {
    pub fn new(canvas: CanvasSize, max_display: u32) -> Self {
        let initial = center_transform(
            DisplayDimensions {
                width: max_display,
                height: max_display,
            },
            canvas,
        );
        Self {
            state: SessionState::Idle,
            canvas,
            max_display,
            foreground: None,
            display: None,
            original_display: None,
            transform: initial,
            center: initial,
            adjustments: ColorAdjustments::neutral(),
            background: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn adjustments(&self) -> ColorAdjustments {
        self.adjustments
    }

    pub fn display(&self) -> Option<DisplayDimensions> {
        self.display
    }

    /// Start a new upload. Computes the display fit and centered placement
    /// for the raw image so the view has geometry before the service
    /// responds. Valid from any state except mid-composite.
    pub fn begin_upload(&mut self, width: u32, height: u32) -> Result<(), SessionError> {
        if matches!(self.state, SessionState::Composing) {
            return Err(self.invalid("begin an upload"));
        }
        let display = fit_to_display(width, height, self.max_display);
        self.display = Some(display);
        self.original_display = Some(display);
        self.center = center_transform(display, self.canvas);
        self.transform = self.center;
        self.foreground = None;
        self.adjustments = ColorAdjustments::neutral();
        self.state = SessionState::Uploading;
        Ok(())
    }

    /// The service accepted the job.
    pub fn task_created(&mut self, task_id: u64) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Uploading) {
            return Err(self.invalid("record task creation"));
        }
        self.state = SessionState::AwaitingResult { task_id };
        Ok(())
    }

    /// The task reached `success`; the result image is being analyzed.
    pub fn begin_scan(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::AwaitingResult { .. }) {
            return Err(self.invalid("begin scanning"));
        }
        self.state = SessionState::Scanning;
        Ok(())
    }

    /// The cropped cutout arrived; the session becomes editable.
    pub fn cutout_ready(&mut self, asset: CroppedAsset) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Scanning) {
            return Err(self.invalid("accept a cutout"));
        }
        self.display = Some(asset.display);
        self.original_display = Some(asset.display);
        self.center = asset.placement;
        self.transform = asset.placement;
        self.foreground = Some(asset.image);
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Record a stage failure. The session keeps its canvas/config and can
    /// start over with a new upload.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        match self.state {
            SessionState::Uploading
            | SessionState::AwaitingResult { .. }
            | SessionState::Scanning
            | SessionState::Composing => {
                self.state = SessionState::Failed {
                    message: message.into(),
                };
                Ok(())
            }
            _ => Err(self.invalid("fail")),
        }
    }

    /// Drag the foreground to a new position.
    pub fn move_to(&mut self, x: f64, y: f64) -> Result<(), SessionError> {
        self.edit("move the foreground")?;
        self.transform = self.transform.moved(x, y);
        Ok(())
    }

    /// Resize the foreground (clamped to the interactive floor).
    pub fn resize_to(&mut self, width: f64, height: f64) -> Result<(), SessionError> {
        self.edit("resize the foreground")?;
        self.transform = self.transform.resized(width, height);
        Ok(())
    }

    /// Replace the color adjustments (values clamp on construction).
    pub fn set_adjustments(&mut self, adjustments: ColorAdjustments) -> Result<(), SessionError> {
        self.edit("adjust colors")?;
        self.adjustments = adjustments;
        Ok(())
    }

    /// Choose a background image; `None` selects the stock white one.
    pub fn select_background(&mut self, background: Option<RgbaImage>) -> Result<(), SessionError> {
        self.edit("select a background")?;
        self.background = background;
        Ok(())
    }

    /// Undo all edits: neutral colors, stock background, centered
    /// placement at the pre-edit display size.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.edit("reset")?;
        self.adjustments = ColorAdjustments::neutral();
        self.background = None;
        if let Some(original) = self.original_display {
            self.display = Some(original);
            self.center = center_transform(original, self.canvas);
        }
        self.transform = self.center;
        Ok(())
    }

    /// Render and encode the composite. On success the session is
    /// `Downloaded`; an encode failure moves it to `Failed`.
    pub fn compose(&mut self) -> Result<Vec<u8>, SessionError> {
        let ready = matches!(
            self.state,
            SessionState::Ready | SessionState::Editing | SessionState::Downloaded
        );
        if !ready || self.foreground.is_none() {
            return Err(self.invalid("compose"));
        }
        self.state = SessionState::Composing;

        let Some(foreground) = &self.foreground else {
            return Err(SessionError::InvalidState {
                action: "compose",
                state: "composing without a cutout",
            });
        };
        let white;
        let background = match &self.background {
            Some(bg) => bg,
            None => {
                white = solid_background(Rgba([255, 255, 255, 255]), self.canvas);
                &white
            }
        };

        match compose_to_png(
            background,
            foreground,
            &self.transform,
            &self.adjustments,
            self.canvas,
        ) {
            Ok(bytes) => {
                self.state = SessionState::Downloaded;
                Ok(bytes)
            }
            Err(err) => {
                self.state = SessionState::Failed {
                    message: err.to_string(),
                };
                Err(err.into())
            }
        }
    }

    fn edit(&mut self, action: &'static str) -> Result<(), SessionError> {
        match self.state {
            SessionState::Ready | SessionState::Editing => {
                self.state = SessionState::Editing;
                Ok(())
            }
            _ => Err(SessionError::InvalidState {
                action,
                state: self.state.name(),
            }),
        }
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidState {
            action,
            state: self.state.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{BoundingBox, crop_for_editing};

    fn canvas() -> CanvasSize {
        CanvasSize {
            width: 100,
            height: 80,
        }
    }

    fn ready_session() -> EditSession {
        let mut session = EditSession::new(canvas(), 50);
        session.begin_upload(200, 100).unwrap();
        session.task_created(7).unwrap();
        session.begin_scan().unwrap();

        let cutout = RgbaImage::from_pixel(40, 20, Rgba([10, 20, 30, 255]));
        let bounds = BoundingBox {
            x: 0,
            y: 0,
            width: 40,
            height: 20,
        };
        let asset = crop_for_editing(&cutout, &bounds, 50, canvas()).unwrap();
        session.cutout_ready(asset).unwrap();
        session
    }

    #[test]
    fn happy_path_reaches_downloaded() {
        let mut session = ready_session();
        assert_eq!(*session.state(), SessionState::Ready);

        session.move_to(5.0, 5.0).unwrap();
        assert_eq!(*session.state(), SessionState::Editing);

        let png = session.compose().unwrap();
        assert!(!png.is_empty());
        assert_eq!(*session.state(), SessionState::Downloaded);

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 80));
    }

    #[test]
    fn upload_computes_fit_and_center() {
        let mut session = EditSession::new(canvas(), 50);
        session.begin_upload(200, 100).unwrap();

        let display = session.display().unwrap();
        assert_eq!((display.width, display.height), (50, 25));
        let t = session.transform();
        assert_eq!((t.x, t.y), (25.0, 27.5));
    }

    #[test]
    fn edits_require_a_cutout() {
        let mut session = EditSession::new(canvas(), 50);
        assert!(matches!(
            session.move_to(0.0, 0.0),
            Err(SessionError::InvalidState { .. })
        ));

        session.begin_upload(10, 10).unwrap();
        assert!(matches!(
            session.set_adjustments(ColorAdjustments::neutral()),
            Err(SessionError::InvalidState { .. })
        ));
    }

    #[test]
    fn compose_before_ready_is_rejected() {
        let mut session = EditSession::new(canvas(), 50);
        assert!(matches!(
            session.compose(),
            Err(SessionError::InvalidState { .. })
        ));
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut session = EditSession::new(canvas(), 50);
        assert!(session.task_created(1).is_err());
        assert!(session.begin_scan().is_err());

        session.begin_upload(10, 10).unwrap();
        assert!(session.begin_scan().is_err());
    }

    #[test]
    fn failure_is_recoverable_via_new_upload() {
        let mut session = EditSession::new(canvas(), 50);
        session.begin_upload(10, 10).unwrap();
        session.fail("upload refused").unwrap();
        assert!(matches!(session.state(), SessionState::Failed { .. }));

        session.begin_upload(20, 20).unwrap();
        assert_eq!(*session.state(), SessionState::Uploading);
    }

    #[test]
    fn fail_only_from_active_stages() {
        let mut session = ready_session();
        // Ready is not an active stage; nothing is in flight to fail.
        assert!(session.fail("nope").is_err());
    }

    #[test]
    fn reset_restores_neutral_editing_state() {
        let mut session = ready_session();
        let center = session.transform();

        session.move_to(90.0, 70.0).unwrap();
        session
            .set_adjustments(ColorAdjustments::new(150, 80, 120))
            .unwrap();
        session.resize_to(60.0, 60.0).unwrap();

        session.reset().unwrap();
        assert!(session.adjustments().is_neutral());
        assert_eq!(session.transform(), center);
    }

    #[test]
    fn resize_respects_floor() {
        let mut session = ready_session();
        session.resize_to(1.0, 1.0).unwrap();
        let t = session.transform();
        assert_eq!((t.width, t.height), (50.0, 50.0));
    }

    #[test]
    fn downloaded_session_can_compose_again() {
        let mut session = ready_session();
        session.compose().unwrap();
        // Tweak-and-redownload without re-running the task
        let png = session.compose().unwrap();
        assert!(!png.is_empty());
    }
}
