//! # Scene Composer
//!
//! Owns everything the renderer needs and re-derives it from three inputs:
//! the piece list, the selected piece id and the view mode.
//!
//! ## Compose order
//!
//! 1. Validate the inputs (unique ids, known selection)
//! 2. Unmount pieces that left the list
//! 3. Mount new pieces and update the props of kept ones
//! 4. Switch the camera rig, or retarget the first-person rig
//! 5. Settle selection: re-run unsettled adapters until none is left
//! 6. Refresh the outline effect
//!
//! [`SceneComposer::frame`] advances the active rig once per rendered frame
//! and remembers the resting positions it reports, so the orbit rig can
//! resume from wherever the camera last stopped.

use cgmath::Vector3;
use std::collections::HashSet;
use winit::{
    event::{DeviceEvent, ElementState},
    keyboard::KeyCode,
};

use super::graph::{NodeDesc, NodeHandle, NodeTransform, SceneGraph};
use super::piece_view::{PieceProps, PieceView};
use crate::config::ViewerConfig;
use crate::error::{DioramaError, Result};
use crate::gfx::assets::AssetCache;
use crate::gfx::camera::animation::FlyPose;
use crate::gfx::camera::first_person::{framing_pose, overview_pose};
use crate::gfx::camera::{AnimatedOrbitController, FirstPersonController, SceneCamera};
use crate::gfx::picking::{ObjectPicker, Ray, AABB};
use crate::gfx::rendering::OutlineEffect;
use crate::gfx::resources::material::{palette, Material};
use crate::gfx::selection::SelectionRegistry;
use crate::pieces::Piece;

pub const TABLE_NAME: &str = "table";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Orbit,
    FirstPerson,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Orbit => ViewMode::FirstPerson,
            ViewMode::FirstPerson => ViewMode::Orbit,
        }
    }
}

/// The rig currently driving the camera
pub enum CameraRig {
    Orbit(AnimatedOrbitController),
    FirstPerson(FirstPersonController),
}

impl CameraRig {
    pub fn mode(&self) -> ViewMode {
        match self {
            CameraRig::Orbit(_) => ViewMode::Orbit,
            CameraRig::FirstPerson(_) => ViewMode::FirstPerson,
        }
    }
}

/// What a compose call changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeSummary {
    pub mounted: Vec<String>,
    pub unmounted: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: usize,
    pub rig_switched: bool,
    pub rig_retargeted: bool,
    pub reconcile_passes: usize,
    pub outline_refreshed: bool,
}

pub struct SceneComposer {
    config: ViewerConfig,
    graph: SceneGraph,
    cache: AssetCache,
    registry: SelectionRegistry,
    outline: OutlineEffect,
    picker: ObjectPicker,
    views: Vec<PieceView>,
    camera: SceneCamera,
    rig: CameraRig,
    last_orbit_position: Option<Vector3<f32>>,
    table: NodeHandle,
}

impl SceneComposer {
    /// Empty scene with the table, the camera at its initial position and
    /// the orbit rig mounted
    pub fn new(config: ViewerConfig, cache: AssetCache) -> Result<Self> {
        config.validate()?;

        let mut graph = SceneGraph::new();
        let root = graph.root();
        let table = graph.add_node(
            Some(root),
            NodeDesc::mesh(TABLE_NAME, Material::new(TABLE_NAME, palette::TABLE))
                .with_transform(NodeTransform::from_pose(
                    Vector3::new(0.0, 0.0, 0.0),
                    Vector3::new(-std::f32::consts::FRAC_PI_2, 0.0, 0.0),
                    1.0,
                ))
                .with_bounds(AABB::from_center(
                    Vector3::new(0.0, 0.0, 0.0),
                    Vector3::new(10.0, 10.0, 0.1),
                )),
        )?;

        let camera = SceneCamera::new(config.initial_camera_position);
        let rig = CameraRig::Orbit(AnimatedOrbitController::mount(&camera, None, &config.orbit));

        Ok(Self {
            outline: OutlineEffect::new(config.outline),
            config,
            graph,
            cache,
            registry: SelectionRegistry::new(),
            picker: ObjectPicker::new(),
            views: Vec::new(),
            camera,
            rig,
            last_orbit_position: None,
            table,
        })
    }

    pub fn compose(
        &mut self,
        pieces: &[Piece],
        selected_id: Option<&str>,
        view: ViewMode,
    ) -> Result<ComposeSummary> {
        let mut ids = HashSet::new();
        for piece in pieces {
            if !ids.insert(piece.id.as_str()) {
                return Err(DioramaError::DuplicatePiece(piece.id.clone()));
            }
        }
        if let Some(id) = selected_id {
            if !ids.contains(id) {
                return Err(DioramaError::UnknownPiece(id.to_string()));
            }
        }

        let mut summary = ComposeSummary::default();

        // Unmount first so released handles never linger in the registry
        let (kept, removed): (Vec<PieceView>, Vec<PieceView>) = std::mem::take(&mut self.views)
            .into_iter()
            .partition(|view| ids.contains(view.id()));
        for view in removed {
            summary.unmounted.push(view.id().to_string());
            view.unmount(&mut self.graph, Some(&mut self.registry))?;
        }

        let mut kept = kept;
        let root = self.graph.root();
        for piece in pieces {
            let props = PieceProps::from_piece(piece, selected_id == Some(piece.id.as_str()));
            match kept.iter().position(|view| view.id() == piece.id) {
                Some(index) => {
                    let mut view = kept.swap_remove(index);
                    let change = view.update(
                        props,
                        &mut self.graph,
                        &mut self.cache,
                        Some(&mut self.registry),
                    )?;
                    if change.is_skipped() {
                        summary.skipped += 1;
                    } else {
                        summary.updated.push(piece.id.clone());
                    }
                    self.views.push(view);
                }
                None => {
                    let view =
                        PieceView::mount(&piece.id, props, &mut self.graph, &mut self.cache, root)?;
                    summary.mounted.push(piece.id.clone());
                    self.views.push(view);
                }
            }
        }

        if !summary.mounted.is_empty() || !summary.unmounted.is_empty() || !summary.updated.is_empty() {
            self.picker.invalidate_cache();
        }

        self.sync_rig(selected_id, view, &mut summary);
        summary.reconcile_passes = self.settle_selection()?;
        summary.outline_refreshed = self.outline.sync(&self.registry, &self.graph);

        log::debug!("compose: {:?}", summary);
        Ok(summary)
    }

    fn sync_rig(&mut self, selected_id: Option<&str>, view: ViewMode, summary: &mut ComposeSummary) {
        match (view, self.rig.mode()) {
            (ViewMode::Orbit, ViewMode::Orbit) => {}
            (ViewMode::Orbit, ViewMode::FirstPerson) => {
                log::info!("switching to orbit view");
                self.rig = CameraRig::Orbit(AnimatedOrbitController::mount(
                    &self.camera,
                    self.last_orbit_position,
                    &self.config.orbit,
                ));
                summary.rig_switched = true;
            }
            (ViewMode::FirstPerson, ViewMode::FirstPerson) => {
                if let CameraRig::FirstPerson(rig) = &mut self.rig {
                    if rig.target_id() != selected_id {
                        let goal =
                            framing_goal(&self.graph, &self.views, &self.config, selected_id);
                        summary.rig_retargeted =
                            rig.retarget(&self.camera, selected_id.map(str::to_string), goal);
                    }
                }
            }
            (ViewMode::FirstPerson, ViewMode::Orbit) => {
                log::info!("switching to first-person view, target {:?}", selected_id);
                let goal = framing_goal(&self.graph, &self.views, &self.config, selected_id);
                self.rig = CameraRig::FirstPerson(FirstPersonController::mount(
                    &self.camera,
                    selected_id.map(str::to_string),
                    goal,
                    &self.config.first_person,
                ));
                summary.rig_switched = true;
            }
        }

        if let CameraRig::Orbit(rig) = &mut self.rig {
            rig.set_input_locked(self.config.lock_orbit_while_selected && selected_id.is_some());
        }
    }

    /// Runs adapter passes until every adapter is settled
    ///
    /// Returns the number of passes that did work.
    fn settle_selection(&mut self) -> Result<usize> {
        let mut passes = 0;
        while self.views.iter().any(|view| view.adapter().needs_reconcile()) {
            if passes == self.config.max_reconcile_passes {
                log::error!(
                    "selection still unsettled after {} passes, giving up",
                    passes
                );
                return Err(DioramaError::SelectionDiverged { passes });
            }
            passes += 1;
            for view in &mut self.views {
                view.adapter_mut()
                    .reconcile(&self.graph, Some(&mut self.registry));
            }
        }
        Ok(passes)
    }

    /// Advances the camera rig; returns a position it reported this frame
    pub fn frame(&mut self, now: f32) -> Option<Vector3<f32>> {
        let report = match &mut self.rig {
            CameraRig::Orbit(rig) => rig.update(&mut self.camera, now),
            CameraRig::FirstPerson(rig) => rig.update(&mut self.camera, now),
        };
        if report.is_some() {
            self.last_orbit_position = report;
        }
        report
    }

    /// Routes raw device input to the active rig
    pub fn process_device_event(&mut self, event: &DeviceEvent) -> bool {
        match &mut self.rig {
            CameraRig::Orbit(rig) => match rig.process_events(event, &mut self.camera) {
                Some(position) => {
                    self.last_orbit_position = Some(position);
                    true
                }
                None => false,
            },
            CameraRig::FirstPerson(rig) => rig.process_events(event),
        }
    }

    pub fn process_key(&mut self, key: KeyCode, state: ElementState) -> bool {
        match &mut self.rig {
            CameraRig::Orbit(rig) => match rig.process_key(key, state, &mut self.camera) {
                Some(position) => {
                    self.last_orbit_position = Some(position);
                    true
                }
                None => false,
            },
            CameraRig::FirstPerson(rig) => rig.process_key(key, state),
        }
    }

    /// World-space ray through a cursor position
    pub fn screen_ray(&self, screen_pos: (f32, f32), screen_size: (f32, f32)) -> Ray {
        self.picker.screen_to_ray(screen_pos, screen_size, &self.camera)
    }

    /// Id of the piece under the cursor, `None` when the click missed
    pub fn pick(&mut self, screen_pos: (f32, f32), screen_size: (f32, f32)) -> Option<String> {
        let ray = self.screen_ray(screen_pos, screen_size);
        let roots: Vec<NodeHandle> = self.views.iter().map(PieceView::root).collect();
        let hit = self.picker.pick(&ray, &self.graph, &roots)?;
        self.views
            .iter()
            .find(|view| view.root() == hit.root)
            .map(|view| view.id().to_string())
    }

    /// Flips the highlight gate without touching the selection itself
    pub fn set_highlight_enabled(&mut self, enabled: bool) {
        self.registry.set_enabled(enabled);
        self.outline.sync(&self.registry, &self.graph);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize_projection(width, height);
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn registry(&self) -> &SelectionRegistry {
        &self.registry
    }

    pub fn outline(&self) -> &OutlineEffect {
        &self.outline
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    pub fn camera(&self) -> &SceneCamera {
        &self.camera
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn view_mode(&self) -> ViewMode {
        self.rig.mode()
    }

    pub fn last_orbit_position(&self) -> Option<Vector3<f32>> {
        self.last_orbit_position
    }

    pub fn table(&self) -> NodeHandle {
        self.table
    }

    pub fn views(&self) -> &[PieceView] {
        &self.views
    }

    pub fn view(&self, id: &str) -> Option<&PieceView> {
        self.views.iter().find(|view| view.id() == id)
    }

    /// Wrapper group of a mounted piece
    pub fn piece_root(&self, id: &str) -> Option<NodeHandle> {
        self.view(id).map(PieceView::root)
    }
}

fn framing_goal(
    graph: &SceneGraph,
    views: &[PieceView],
    config: &ViewerConfig,
    selected_id: Option<&str>,
) -> FlyPose {
    let target = selected_id.and_then(|id| views.iter().find(|view| view.id() == id));
    match target {
        Some(view) => framing_pose(
            graph,
            view.root(),
            view.props().position,
            view.props().rotation,
            &config.first_person,
        ),
        None => overview_pose(&config.first_person),
    }
}
