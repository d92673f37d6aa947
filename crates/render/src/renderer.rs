use std::collections::BTreeMap;

use glowgrid_common::{CubeMaterial, CubeTransform, MeshHandle};
use glowgrid_kernel::{EntityStore, GraphicsResources, ResourceError};

use crate::view::RenderView;

/// Backend that draws cubes. Extends the resource interface the entity
/// store needs with per-frame transform updates and viewport changes.
///
/// Presenting a frame is backend-specific (a GPU backend needs a surface
/// texture, the headless one does not) and lives on each implementation.
pub trait RenderBackend: GraphicsResources {
    /// Set where a cube is drawn this frame.
    fn set_transform(&mut self, handle: MeshHandle, transform: &CubeTransform);

    /// Viewport changed size.
    fn resize(&mut self, width: u32, height: u32);
}

/// Copy every cube's current transform to the backend.
///
/// Called once per tick after the animation step, right before presenting.
pub fn submit_frame<B: RenderBackend + ?Sized>(backend: &mut B, store: &EntityStore) {
    for cube in store.cubes() {
        backend.set_transform(cube.handle, cube.transform());
    }
}

#[derive(Debug, Clone, Copy)]
struct HeadlessCube {
    material: CubeMaterial,
    transform: CubeTransform,
}

/// Backend without a GPU.
///
/// Keeps a ledger of live cubes and produces a human-readable description of
/// each presented frame. Used by the CLI and by tests.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    cubes: BTreeMap<MeshHandle, HeadlessCube>,
    next_handle: u64,
    capacity: Option<usize>,
    size: (u32, u32),
    frames: u64,
    released_total: u64,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that refuses to hold more than `capacity` cubes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn released_total(&self) -> u64 {
        self.released_total
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn material(&self, handle: MeshHandle) -> Option<CubeMaterial> {
        self.cubes.get(&handle).map(|c| c.material)
    }

    pub fn transform(&self, handle: MeshHandle) -> Option<CubeTransform> {
        self.cubes.get(&handle).map(|c| c.transform)
    }

    /// Present one frame as text.
    pub fn present(&mut self, view: &RenderView) -> String {
        self.frames += 1;
        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame {} ({} cubes) ===\n",
            self.frames,
            self.cubes.len()
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x, view.eye.y, view.eye.z, view.fov_degrees
        ));
        for (handle, cube) in &self.cubes {
            let p = cube.transform.position;
            out.push_str(&format!(
                "  [{:>4}] pos=({:.2}, {:.2}, {:.2}) rot={:.2} color={}\n",
                handle.0, p.x, p.y, p.z, cube.transform.rotation.x, cube.material.color
            ));
        }
        out
    }
}

impl GraphicsResources for HeadlessBackend {
    fn acquire_cube(&mut self, material: CubeMaterial) -> Result<MeshHandle, ResourceError> {
        if let Some(capacity) = self.capacity {
            if self.cubes.len() >= capacity {
                return Err(ResourceError::CapacityExhausted { capacity });
            }
        }
        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.cubes.insert(
            handle,
            HeadlessCube {
                material,
                transform: CubeTransform::default(),
            },
        );
        Ok(handle)
    }

    fn release_cube(&mut self, handle: MeshHandle) {
        if self.cubes.remove(&handle).is_some() {
            self.released_total += 1;
        } else {
            tracing::warn!(?handle, "release of unknown cube handle");
        }
    }

    fn set_material(&mut self, handle: MeshHandle, material: CubeMaterial) {
        if let Some(cube) = self.cubes.get_mut(&handle) {
            cube.material = material;
        }
    }

    fn live_cubes(&self) -> usize {
        self.cubes.len()
    }
}

impl RenderBackend for HeadlessBackend {
    fn set_transform(&mut self, handle: MeshHandle, transform: &CubeTransform) {
        if let Some(cube) = self.cubes.get_mut(&handle) {
            cube.transform = *transform;
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glowgrid_input::{Command, ReconfigureRequest};
    use glowgrid_kernel::{Controller, SceneConfig};

    fn scene(backend: &mut HeadlessBackend) -> Controller {
        let mut c = Controller::new(SceneConfig::default());
        c.rebuild(backend);
        c
    }

    #[test]
    fn empty_frame() {
        let mut backend = HeadlessBackend::new();
        let out = backend.present(&RenderView::default());
        assert!(out.contains("Frame 1 (0 cubes)"));
        assert_eq!(backend.frames_presented(), 1);
    }

    #[test]
    fn submitted_transforms_reach_backend() {
        let mut backend = HeadlessBackend::new();
        let mut c = scene(&mut backend);
        c.tick();
        submit_frame(&mut backend, c.store());
        for cube in c.store().cubes() {
            assert_eq!(backend.transform(cube.handle), Some(*cube.transform()));
        }
        let out = backend.present(&RenderView::default());
        assert!(out.contains("(9 cubes)"));
        assert!(out.contains("color=#00ff00"));
    }

    #[test]
    fn repeated_reconfigure_does_not_leak() {
        let mut backend = HeadlessBackend::new();
        let mut c = scene(&mut backend);
        let mut expected_released = 9;
        for count in [100, 3, 10_000, 25] {
            c.apply(
                Command::Reconfigure(ReconfigureRequest::with_count(count)),
                &mut backend,
            );
            assert_eq!(backend.live_cubes(), count as usize);
            assert_eq!(backend.released_total(), expected_released);
            expected_released += count as u64;
        }
    }

    #[test]
    fn click_recolors_backend_materials() {
        let mut backend = HeadlessBackend::new();
        let mut c = scene(&mut backend);
        c.apply(Command::Click, &mut backend);
        let out = backend.present(&RenderView::default());
        assert!(out.contains("color=#00ff00"));
        c.apply(Command::Click, &mut backend);
        let out = backend.present(&RenderView::default());
        assert!(out.contains("color=#7513cc"));
    }

    #[test]
    fn limited_backend_degrades() {
        let mut backend = HeadlessBackend::with_capacity(4);
        let c = scene(&mut backend);
        assert_eq!(c.store().len(), 4);
        assert_eq!(backend.live_cubes(), 4);
    }
}
