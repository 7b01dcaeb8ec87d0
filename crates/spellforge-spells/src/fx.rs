//! Presentation collaborators
//!
//! The simulation asks for visual effects and sounds through `FxSink` and never
//! waits on them. What a handle resolves to, and how long it plays, is up to the
//! implementation.

use glam::{Quat, Vec3};
use tracing::debug;

use crate::spell::{EffectHandle, SoundHandle};

/// Fire-and-forget spawner for one-shot effects and sounds
pub trait FxSink {
    /// Spawn a one-shot visual effect
    fn spawn_effect(&mut self, handle: &EffectHandle, position: Vec3, rotation: Quat);

    /// Play a one-shot sound at a world position
    fn play_sound(&mut self, handle: &SoundHandle, position: Vec3);
}

/// Discards every request
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFx;

impl FxSink for NullFx {
    fn spawn_effect(&mut self, _handle: &EffectHandle, _position: Vec3, _rotation: Quat) {}

    fn play_sound(&mut self, _handle: &SoundHandle, _position: Vec3) {}
}

/// Logs every request at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFx;

impl FxSink for TracingFx {
    fn spawn_effect(&mut self, handle: &EffectHandle, position: Vec3, _rotation: Quat) {
        debug!("fx: effect '{}' at {:?}", handle.0, position);
    }

    fn play_sound(&mut self, handle: &SoundHandle, position: Vec3) {
        debug!("fx: sound '{}' at {:?}", handle.0, position);
    }
}

/// A single recorded presentation request
#[derive(Debug, Clone, PartialEq)]
pub enum FxRequest {
    Effect {
        handle: EffectHandle,
        position: Vec3,
        rotation: Quat,
    },
    Sound {
        handle: SoundHandle,
        position: Vec3,
    },
}

/// Records every request in order
#[derive(Debug, Clone, Default)]
pub struct FxRecorder {
    pub requests: Vec<FxRequest>,
}

impl FxRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles of every effect spawned so far
    pub fn effects(&self) -> Vec<&str> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                FxRequest::Effect { handle, .. } => Some(handle.0.as_str()),
                FxRequest::Sound { .. } => None,
            })
            .collect()
    }

    /// Handles of every sound played so far
    pub fn sounds(&self) -> Vec<&str> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                FxRequest::Sound { handle, .. } => Some(handle.0.as_str()),
                FxRequest::Effect { .. } => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl FxSink for FxRecorder {
    fn spawn_effect(&mut self, handle: &EffectHandle, position: Vec3, rotation: Quat) {
        self.requests.push(FxRequest::Effect {
            handle: handle.clone(),
            position,
            rotation,
        });
    }

    fn play_sound(&mut self, handle: &SoundHandle, position: Vec3) {
        self.requests.push(FxRequest::Sound {
            handle: handle.clone(),
            position,
        });
    }
}
