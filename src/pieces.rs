//! Piece data model
//!
//! A [`Piece`] is plain application data: where a model stands on the
//! table, how it is turned and scaled, and whether its eyes feature is on.
//! The scene side only ever reads pieces; the app owns the list.

use cgmath::Vector3;
use rand::distr::Alphanumeric;
use rand::Rng;
use std::f32::consts::PI;

use crate::gfx::assets::AssetRef;

/// Model references the viewer ships with
pub const MODELS: [&str; 5] = [
    "models/cat/concrete_cat_statue_1k",
    "models/bullhead/bull_head_1k",
    "models/horsehead/horse_head_1k",
    "models/lionhead/lion_head_1k",
    "models/person",
];

/// Length of generated piece ids
pub const GENERATED_ID_LEN: usize = 11;

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub id: String,
    pub position: Vector3<f32>,
    /// XYZ euler angles in radians
    pub rotation: Vector3<f32>,
    pub scale: f32,
    pub model: AssetRef,
    pub eyes: bool,
}

impl Piece {
    pub fn new(id: impl Into<String>, model: AssetRef) -> Self {
        Self {
            id: id.into(),
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: 1.0,
            model,
            eyes: false,
        }
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vector3::new(x, y, z);
        self
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.rotation = Vector3::new(0.0, yaw, 0.0);
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_eyes(mut self, eyes: bool) -> Self {
        self.eyes = eyes;
        self
    }

    /// Moves the piece by a drag delta, ignoring its vertical part
    pub fn drag_by(&mut self, delta: Vector3<f32>) {
        self.position.x += delta.x;
        self.position.z += delta.z;
    }
}

/// The four statues in the table corners and a person in the middle
pub fn initial_pieces() -> Vec<Piece> {
    let pieces = vec![
        Piece::new("cat statue", AssetRef::new(MODELS[0]))
            .with_position(-4.5, 0.05, -4.5)
            .with_yaw(PI / 3.0)
            .with_scale(4.0),
        Piece::new("bullhead", AssetRef::new(MODELS[1]))
            .with_position(-4.5, 0.05, 4.5)
            .with_yaw(PI / 1.5)
            .with_scale(4.0),
        Piece::new("horsehead", AssetRef::new(MODELS[2]))
            .with_position(4.5, 0.05, -4.5)
            .with_yaw(-PI / 3.0)
            .with_scale(4.0),
        Piece::new("lionhead", AssetRef::new(MODELS[3]))
            .with_position(4.5, 0.05, 4.5)
            .with_yaw(-PI / 1.5)
            .with_scale(4.0),
        Piece::new("person", AssetRef::new(MODELS[4])),
    ];
    pieces.into_iter().map(|piece| piece.with_eyes(true)).collect()
}

/// Random piece somewhere in the [-5, 5]³ cube with eyes on
pub fn generate_piece<R: Rng + ?Sized>(rng: &mut R) -> Piece {
    let id: String = (0..GENERATED_ID_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();
    let model = MODELS[rng.random_range(0..MODELS.len())];
    Piece::new(id, AssetRef::new(model))
        .with_position(
            rng.random_range(-5.0..=5.0),
            rng.random_range(-5.0..=5.0),
            rng.random_range(-5.0..=5.0),
        )
        .with_eyes(true)
}
