//! # Application Shell
//!
//! [`DioramaApp`] owns the application state the scene is derived from:
//! the piece list, the selected piece id and the view mode. Every state
//! change is followed by a compose so the scene never lags behind.
//!
//! Pointer handling follows the usual viewer conventions:
//! - clicking a piece selects it, clicking it again deselects it
//! - a click that hits no piece ("pointer missed") clears the selection
//! - pressing on a piece and moving drags it across the table, height locked
//!
//! ## Key bindings
//!
//! | Key | Action |
//! |---|---|
//! | `V` | Toggle orbit / first-person view |
//! | `N` | Add a random piece |
//! | `Backspace` | Remove the last piece |
//! | `G` | Toggle the eyes feature of the selected piece |
//! | `H` | Toggle the selection highlight |
//!
//! Other keys go to the active camera rig. The headless methods are what the
//! window loop in [`DioramaApp::run`] calls, so a test can drive the whole
//! shell without a window.

use cgmath::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    error::EventLoopError,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::ViewerConfig;
use crate::error::{DioramaError, Result};
use crate::gfx::assets::AssetCache;
use crate::gfx::scene::{ComposeSummary, SceneComposer, ViewMode};
use crate::pieces::{generate_piece, initial_pieces, Piece};

/// Cursor travel in pixels before a press on a piece becomes a drag
pub const DRAG_THRESHOLD: f32 = 4.0;

#[derive(Debug, Clone)]
struct Press {
    origin: (f32, f32),
    piece: Option<String>,
    dragging: bool,
    /// Last point under the cursor on the dragged piece's height plane
    anchor: Option<Vector3<f32>>,
}

pub struct DioramaApp {
    pieces: Vec<Piece>,
    selected_id: Option<String>,
    view: ViewMode,
    composer: SceneComposer,
    rng: StdRng,
    cursor: (f32, f32),
    press: Option<Press>,
    screen_size: (f32, f32),
    window: Option<Arc<Window>>,
    started: Instant,
}

impl DioramaApp {
    /// App showing the initial pieces
    pub fn new(config: ViewerConfig, cache: AssetCache) -> Result<Self> {
        Self::with_pieces(config, cache, initial_pieces())
    }

    pub fn with_pieces(config: ViewerConfig, cache: AssetCache, pieces: Vec<Piece>) -> Result<Self> {
        let mut app = Self {
            pieces,
            selected_id: None,
            view: ViewMode::Orbit,
            composer: SceneComposer::new(config, cache)?,
            rng: StdRng::from_os_rng(),
            cursor: (0.0, 0.0),
            press: None,
            screen_size: (1280.0, 720.0),
            window: None,
            started: Instant::now(),
        };
        app.composer.resize(1280, 720);
        app.recompose()?;
        Ok(app)
    }

    /// Makes generated pieces reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: &str) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn composer(&self) -> &SceneComposer {
        &self.composer
    }

    pub fn is_dragging(&self) -> bool {
        self.press.as_ref().is_some_and(|press| press.dragging)
    }

    /// Re-derives the scene from the current state
    pub fn recompose(&mut self) -> Result<ComposeSummary> {
        self.composer
            .compose(&self.pieces, self.selected_id.as_deref(), self.view)
    }

    /// Selects `id`, or deselects it when it is already selected
    pub fn toggle_selection(&mut self, id: &str) -> Result<()> {
        if self.piece(id).is_none() {
            return Err(DioramaError::UnknownPiece(id.to_string()));
        }
        if self.selected_id.as_deref() == Some(id) {
            log::info!("deselected '{}'", id);
            self.selected_id = None;
        } else {
            log::info!("selected '{}'", id);
            self.selected_id = Some(id.to_string());
        }
        self.recompose()?;
        Ok(())
    }

    /// A click that hit no piece
    pub fn pointer_missed(&mut self) -> Result<()> {
        if self.selected_id.take().is_some() {
            log::info!("pointer missed, selection cleared");
            self.recompose()?;
        }
        Ok(())
    }

    /// Handles a click at `screen_pos`; returns the piece that was hit
    pub fn click(&mut self, screen_pos: (f32, f32)) -> Result<Option<String>> {
        let hit = self.composer.pick(screen_pos, self.screen_size);
        self.apply_click(hit.as_deref())?;
        Ok(hit)
    }

    fn apply_click(&mut self, hit: Option<&str>) -> Result<()> {
        match hit {
            Some(id) => self.toggle_selection(id),
            None => self.pointer_missed(),
        }
    }

    pub fn set_view(&mut self, view: ViewMode) -> Result<()> {
        if self.view != view {
            self.view = view;
            self.recompose()?;
        }
        Ok(())
    }

    pub fn toggle_view(&mut self) -> Result<()> {
        self.set_view(self.view.toggled())
    }

    pub fn set_highlight_enabled(&mut self, enabled: bool) {
        self.composer.set_highlight_enabled(enabled);
    }

    pub fn toggle_eyes(&mut self, id: &str) -> Result<bool> {
        let piece = self
            .pieces
            .iter_mut()
            .find(|piece| piece.id == id)
            .ok_or_else(|| DioramaError::UnknownPiece(id.to_string()))?;
        piece.eyes = !piece.eyes;
        let eyes = piece.eyes;
        self.recompose()?;
        Ok(eyes)
    }

    /// Appends a randomly generated piece and returns its id
    pub fn add_piece(&mut self) -> Result<String> {
        let piece = generate_piece(&mut self.rng);
        let id = piece.id.clone();
        log::info!("adding piece '{}' ({})", id, piece.model);
        self.pieces.push(piece);
        self.recompose()?;
        Ok(id)
    }

    /// Drops the last piece; the selection goes with it
    pub fn remove_last_piece(&mut self) -> Result<Option<Piece>> {
        let Some(removed) = self.pieces.pop() else {
            return Ok(None);
        };
        if self.selected_id.as_deref() == Some(removed.id.as_str()) {
            self.selected_id = None;
        }
        log::info!("removed piece '{}'", removed.id);
        self.recompose()?;
        Ok(Some(removed))
    }

    /// Moves a piece across the table; the vertical part of `delta` is dropped
    pub fn drag_piece(&mut self, id: &str, delta: Vector3<f32>) -> Result<()> {
        let piece = self
            .pieces
            .iter_mut()
            .find(|piece| piece.id == id)
            .ok_or_else(|| DioramaError::UnknownPiece(id.to_string()))?;
        piece.drag_by(delta);
        self.recompose()?;
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.screen_size = (width as f32, height as f32);
            self.composer.resize(width, height);
        }
    }

    /// Tracks the cursor; drags the pressed piece once it moved far enough
    ///
    /// Returns true when a piece was moved.
    pub fn cursor_moved(&mut self, position: (f32, f32)) -> Result<bool> {
        self.cursor = position;
        let Some(press) = self.press.as_mut() else {
            return Ok(false);
        };
        let Some(id) = press.piece.clone() else {
            return Ok(false);
        };
        if !press.dragging {
            let (dx, dy) = (position.0 - press.origin.0, position.1 - press.origin.1);
            if (dx * dx + dy * dy).sqrt() < DRAG_THRESHOLD {
                return Ok(false);
            }
            press.dragging = true;
            log::debug!("dragging '{}'", id);
        }

        let Some(height) = self.pieces.iter().find(|p| p.id == id).map(|p| p.position.y) else {
            return Ok(false);
        };
        let Some(point) = self
            .composer
            .screen_ray(position, self.screen_size)
            .intersect_horizontal_plane(height)
        else {
            return Ok(false);
        };
        let Some(previous) = press.anchor.replace(point) else {
            return Ok(false);
        };
        self.drag_piece(&id, point - previous)?;
        Ok(true)
    }

    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) -> Result<()> {
        if button != MouseButton::Left {
            return Ok(());
        }
        match state {
            ElementState::Pressed => {
                let piece = self.composer.pick(self.cursor, self.screen_size);
                let anchor = piece
                    .as_deref()
                    .and_then(|id| self.piece(id))
                    .and_then(|p| {
                        self.composer
                            .screen_ray(self.cursor, self.screen_size)
                            .intersect_horizontal_plane(p.position.y)
                    });
                self.press = Some(Press {
                    origin: self.cursor,
                    piece,
                    dragging: false,
                    anchor,
                });
            }
            ElementState::Released => {
                if let Some(press) = self.press.take() {
                    if press.dragging {
                        log::debug!("drag of {:?} ended", press.piece);
                    } else {
                        self.apply_click(press.piece.as_deref())?;
                    }
                }
            }
        }
        Ok(())
    }

    /// App shortcuts first, then the active camera rig
    ///
    /// Returns true when the key was consumed.
    pub fn handle_key(&mut self, key: KeyCode, state: ElementState) -> Result<bool> {
        if state == ElementState::Pressed {
            match key {
                KeyCode::KeyV => {
                    self.toggle_view()?;
                    return Ok(true);
                }
                KeyCode::KeyN => {
                    self.add_piece()?;
                    return Ok(true);
                }
                KeyCode::Backspace => {
                    self.remove_last_piece()?;
                    return Ok(true);
                }
                KeyCode::KeyG => {
                    if let Some(id) = self.selected_id.clone() {
                        self.toggle_eyes(&id)?;
                    }
                    return Ok(true);
                }
                KeyCode::KeyH => {
                    let enabled = !self.composer.registry().enabled();
                    self.set_highlight_enabled(enabled);
                    return Ok(true);
                }
                _ => {}
            }
        }
        Ok(self.composer.process_key(key, state))
    }

    /// Raw device input for the camera rig; ignored while a piece is pressed
    pub fn handle_device_event(&mut self, event: &DeviceEvent) -> bool {
        if self.press.as_ref().is_some_and(|press| press.piece.is_some()) {
            return false;
        }
        self.composer.process_device_event(event)
    }

    /// Advances the camera by one frame at `now` seconds
    pub fn frame(&mut self, now: f32) -> Option<Vector3<f32>> {
        self.composer.frame(now)
    }

    /// Opens a window and runs the input loop until it is closed
    pub fn run(mut self) -> std::result::Result<(), EventLoopError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        self.started = Instant::now();
        event_loop.run_app(&mut self)
    }
}

impl ApplicationHandler for DioramaApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match event_loop.create_window(
            WindowAttributes::default()
                .with_title("diorama")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            Ok(window) => {
                let window = Arc::new(window);
                let PhysicalSize { width, height } = window.inner_size();
                self.resize(width, height);
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("failed to create window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let result = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                Ok(())
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if key_code == KeyCode::Escape {
                    event_loop.exit();
                    Ok(())
                } else {
                    self.handle_key(key_code, state).map(|_| ())
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved((position.x as f32, position.y as f32)).map(|_| ())
            }
            WindowEvent::MouseInput { state, button, .. } => self.mouse_input(state, button),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.resize(width, height);
                Ok(())
            }
            WindowEvent::RedrawRequested => {
                let now = self.started.elapsed().as_secs_f32();
                if let Some(position) = self.frame(now) {
                    log::debug!("camera resting at {:?}", position);
                }
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            log::error!("{}", e);
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if self.window.is_some() {
            self.handle_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
