use glam::Vec2;
use glowgrid_common::CubeMaterial;
use glowgrid_input::{Command, ReconfigureRequest};

use crate::animate;
use crate::config::SceneConfig;
use crate::state::{InteractionState, Phase};
use crate::store::{EntityStore, GraphicsResources, RebuildReport};

/// Owns the scene: configuration, interaction state and cubes.
///
/// All state changes go through `apply` (discrete commands) or `tick`
/// (per-frame animation). One instance exists per view.
#[derive(Debug)]
pub struct Controller {
    config: SceneConfig,
    state: InteractionState,
    store: EntityStore,
    frame: u64,
}

impl Controller {
    /// Controller with an empty grid. Call `rebuild` once resources exist.
    pub fn new(config: SceneConfig) -> Self {
        let config = config.sanitized();
        Self {
            state: InteractionState::new(config.motion.base_rotation),
            config,
            store: EntityStore::new(),
            frame: 0,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Number of ticks run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Rebuild the grid from the current configuration.
    ///
    /// New cubes take the currently applied color. If a press is in progress
    /// they start out targeting their expanded positions.
    pub fn rebuild<R: GraphicsResources + ?Sized>(&mut self, resources: &mut R) -> RebuildReport {
        let material = CubeMaterial::glowing(self.state.color());
        let report = self.store.rebuild(
            &self.config.grid,
            self.config.motion.depth,
            material,
            resources,
        );
        if self.state.is_pressed() {
            self.store.retarget(self.config.motion.expansion_factor);
        }
        report
    }

    /// Apply one command.
    pub fn apply<R: GraphicsResources + ?Sized>(&mut self, command: Command, resources: &mut R) {
        tracing::trace!(?command, "apply");
        match command {
            Command::PointerMove(p) => self.move_pointer(p),
            Command::Press => self.press(),
            Command::Release => self.release(),
            Command::Click => self.click(resources),
            Command::Reconfigure(request) => {
                self.reconfigure(&request, resources);
            }
        }
    }

    /// Run one animation tick over every cube.
    pub fn tick(&mut self) {
        animate::advance(&mut self.store, &self.state, &self.config.motion);
        self.frame += 1;
    }

    /// Release every cube's resources. The controller is left with an empty grid.
    pub fn shutdown<R: GraphicsResources + ?Sized>(&mut self, resources: &mut R) {
        let released = self.store.release_all(resources);
        tracing::debug!(released, "controller shut down");
    }

    fn move_pointer(&mut self, pointer: Vec2) {
        if pointer.is_finite() {
            self.state.pointer = pointer;
        }
    }

    fn press(&mut self) {
        if self.state.phase == Phase::Pressed {
            return;
        }
        let motion = &self.config.motion;
        self.state.phase = Phase::Pressed;
        self.state.rotation_speed = motion.base_rotation * motion.press_multiplier;
        self.store.retarget(motion.expansion_factor);
        tracing::debug!(speed = self.state.rotation_speed, "pressed");
    }

    fn release(&mut self) {
        if self.state.phase == Phase::Idle {
            return;
        }
        self.state.phase = Phase::Idle;
        self.state.rotation_speed = self.config.motion.base_rotation;
        self.store.retarget(1.0);
        tracing::debug!(speed = self.state.rotation_speed, "released");
    }

    fn click<R: GraphicsResources + ?Sized>(&mut self, resources: &mut R) {
        let color = self.state.cycle_color();
        self.store
            .apply_material(CubeMaterial::glowing(color), resources);
        tracing::debug!(index = self.state.color_index, %color, "color cycled");
    }

    /// Apply new parameters and rebuild the grid.
    pub fn reconfigure<R: GraphicsResources + ?Sized>(
        &mut self,
        request: &ReconfigureRequest,
        resources: &mut R,
    ) -> RebuildReport {
        self.config = self.config.merged(request);
        let motion = &self.config.motion;
        self.state.rotation_speed = match self.state.phase {
            Phase::Idle => motion.base_rotation,
            Phase::Pressed => motion.base_rotation * motion.press_multiplier,
        };
        tracing::info!(
            count = self.config.grid.count,
            spacing = self.config.grid.spacing,
            rotation = motion.base_rotation,
            expansion = motion.expansion_factor,
            "reconfigure"
        );
        self.rebuild(resources)
    }
}
