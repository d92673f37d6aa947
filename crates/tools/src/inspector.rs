use glam::Vec2;
use glowgrid_common::{EntityId, Rgb};
use glowgrid_kernel::{Controller, Phase};

/// Scene inspector for developer tooling.
///
/// Read-only queries against a controller, for the CLI, the desktop overlay
/// and debugging.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(controller: &Controller) -> SceneSummary {
        let state = controller.state();
        let grid = &controller.config().grid;
        SceneSummary {
            frame: controller.frame(),
            cube_count: controller.store().len(),
            requested_count: grid.count,
            spacing: grid.spacing,
            phase: state.phase(),
            rotation_speed: state.rotation_speed(),
            color_index: state.color_index(),
            color: state.color(),
            pointer: state.pointer(),
        }
    }

    /// Details of the cube at `index` in grid order.
    pub fn inspect_cube(controller: &Controller, index: usize) -> Option<CubeInfo> {
        controller.store().get(index).map(|cube| {
            let t = cube.transform();
            CubeInfo {
                index,
                id: cube.id,
                rest: cube.rest(),
                target: cube.target(),
                position: t.position.to_array(),
                rotation: t.rotation.to_array(),
            }
        })
    }

    /// IDs of every cube, in grid order.
    pub fn list_cubes(controller: &Controller) -> Vec<EntityId> {
        controller.store().cubes().iter().map(|c| c.id).collect()
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub frame: u64,
    pub cube_count: usize,
    pub requested_count: usize,
    pub spacing: f32,
    pub phase: Phase,
    pub rotation_speed: f32,
    pub color_index: usize,
    pub color: Rgb,
    pub pointer: Vec2,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: frame={} cubes={}/{} spacing={:.2} phase={} speed={:.3} color={} (#{}) pointer=({:.2}, {:.2})",
            self.frame,
            self.cube_count,
            self.requested_count,
            self.spacing,
            self.phase,
            self.rotation_speed,
            self.color,
            self.color_index,
            self.pointer.x,
            self.pointer.y,
        )
    }
}

/// Detailed info about a single cube.
#[derive(Debug, Clone)]
pub struct CubeInfo {
    pub index: usize,
    pub id: EntityId,
    pub rest: Vec2,
    pub target: Vec2,
    pub position: [f32; 3],
    pub rotation: [f32; 2],
}

impl std::fmt::Display for CubeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cube #{} [{}] pos=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}) rot=({:.2}, {:.2})",
            self.index,
            self.id.short(),
            self.position[0],
            self.position[1],
            self.position[2],
            self.target.x,
            self.target.y,
            self.rotation[0],
            self.rotation[1],
        )
    }
}
