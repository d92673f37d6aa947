use glam::Vec2;
use glowgrid_common::{CubeMaterial, CubeTransform, EntityId, MeshHandle};
use glowgrid_layout::GridConfig;

/// Errors from acquiring graphics resources.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("cube capacity exhausted ({capacity} live)")]
    CapacityExhausted { capacity: usize },
    #[error("graphics backend unavailable: {0}")]
    Backend(String),
}

/// Graphics resources backing each cube.
///
/// Every handle returned by `acquire_cube` is released exactly once by the
/// entity store, so a backend's live count always equals the store's length.
pub trait GraphicsResources {
    /// Create the geometry + material for one cube.
    fn acquire_cube(&mut self, material: CubeMaterial) -> Result<MeshHandle, ResourceError>;

    /// Free a cube's geometry + material.
    fn release_cube(&mut self, handle: MeshHandle);

    /// Replace a cube's surface and emissive color.
    fn set_material(&mut self, handle: MeshHandle, material: CubeMaterial);

    /// Number of handles acquired and not yet released.
    fn live_cubes(&self) -> usize;
}

/// One cube of the grid.
#[derive(Debug, Clone)]
pub struct CubeEntity {
    pub id: EntityId,
    pub handle: MeshHandle,
    rest: Vec2,
    pub(crate) target: Vec2,
    pub(crate) transform: CubeTransform,
}

impl CubeEntity {
    /// Un-expanded grid coordinate. Fixed for the entity's lifetime.
    pub fn rest(&self) -> Vec2 {
        self.rest
    }

    /// Coordinate the position currently eases toward.
    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn transform(&self) -> &CubeTransform {
        &self.transform
    }
}

/// Counts from one rebuild, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
    pub created: usize,
    pub released: usize,
    pub skipped: usize,
}

/// All cubes, in layout order.
///
/// Index order is the layout order; the `EntityId` is an additional stable
/// key for diagnostics.
#[derive(Debug, Default)]
pub struct EntityStore {
    cubes: Vec<CubeEntity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    pub fn cubes(&self) -> &[CubeEntity] {
        &self.cubes
    }

    pub fn get(&self, index: usize) -> Option<&CubeEntity> {
        self.cubes.get(index)
    }

    pub(crate) fn cubes_mut(&mut self) -> &mut [CubeEntity] {
        &mut self.cubes
    }

    /// Replace every cube with a fresh grid.
    ///
    /// Old resources are released before new ones are acquired, so a backend
    /// with a fixed capacity can always hold the new grid. The new collection
    /// is assembled completely before it is published.
    pub fn rebuild<R: GraphicsResources + ?Sized>(
        &mut self,
        grid: &GridConfig,
        depth: f32,
        material: CubeMaterial,
        resources: &mut R,
    ) -> RebuildReport {
        let _span = tracing::info_span!("rebuild", count = grid.count).entered();
        let released = self.release_all(resources);

        let positions = grid.positions();
        let total = positions.len();
        let mut next = Vec::with_capacity(total);
        let mut skipped = 0;
        for (i, rest) in positions.into_iter().enumerate() {
            match resources.acquire_cube(material) {
                Ok(handle) => next.push(CubeEntity {
                    id: EntityId::new(),
                    handle,
                    rest,
                    target: rest,
                    transform: CubeTransform::at(rest, depth),
                }),
                Err(e @ ResourceError::CapacityExhausted { .. }) => {
                    // Every later acquire would fail the same way.
                    skipped += total - i;
                    tracing::warn!(skipped = total - i, "skipping remaining cubes: {e}");
                    break;
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(?rest, "skipping cube: {e}");
                }
            }
        }
        self.cubes = next;

        let report = RebuildReport {
            created: self.cubes.len(),
            released,
            skipped,
        };
        tracing::info!(
            created = report.created,
            released = report.released,
            skipped = report.skipped,
            "grid rebuilt"
        );
        report
    }

    /// Release every cube's resources and empty the store.
    pub fn release_all<R: GraphicsResources + ?Sized>(&mut self, resources: &mut R) -> usize {
        let old = std::mem::take(&mut self.cubes);
        for cube in &old {
            resources.release_cube(cube.handle);
        }
        old.len()
    }

    /// Point every target at `rest * factor`.
    pub(crate) fn retarget(&mut self, factor: f32) {
        for cube in &mut self.cubes {
            cube.target = cube.rest * factor;
        }
    }

    pub(crate) fn apply_material<R: GraphicsResources + ?Sized>(
        &self,
        material: CubeMaterial,
        resources: &mut R,
    ) {
        for cube in &self.cubes {
            resources.set_material(cube.handle, material);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingResources;

    fn grid(count: usize) -> GridConfig {
        GridConfig {
            count,
            spacing: 3.0,
        }
    }

    #[test]
    fn rebuild_creates_one_cube_per_position() {
        let mut res = CountingResources::default();
        let mut store = EntityStore::new();
        let report = store.rebuild(&grid(9), -10.0, CubeMaterial::default(), &mut res);

        assert_eq!(report.created, 9);
        assert_eq!(store.len(), 9);
        assert_eq!(res.live_cubes(), 9);
        for cube in store.cubes() {
            assert_eq!(cube.rest(), cube.target());
            assert_eq!(cube.transform().position, cube.rest().extend(-10.0));
            assert_eq!(cube.transform().rotation, Vec2::ZERO);
        }
    }

    #[test]
    fn rebuild_releases_previous_resources() {
        let mut res = CountingResources::default();
        let mut store = EntityStore::new();
        store.rebuild(&grid(16), -10.0, CubeMaterial::default(), &mut res);
        let old_handles: Vec<MeshHandle> = store.cubes().iter().map(|c| c.handle).collect();

        let report = store.rebuild(&grid(4), -10.0, CubeMaterial::default(), &mut res);
        assert_eq!(report.released, 16);
        assert_eq!(store.len(), 4);
        assert_eq!(res.live_cubes(), 4);
        for h in old_handles {
            assert!(!res.is_live(h));
        }
    }

    #[test]
    fn capacity_exhaustion_skips_cubes() {
        let mut res = CountingResources::with_capacity(5);
        let mut store = EntityStore::new();
        let report = store.rebuild(&grid(9), -10.0, CubeMaterial::default(), &mut res);
        assert_eq!(report.created, 5);
        assert_eq!(report.skipped, 4);
        assert_eq!(res.live_cubes(), 5);
    }

    #[test]
    fn backend_error_skips_only_that_cube() {
        let mut res = CountingResources::failing_at(2);
        let mut store = EntityStore::new();
        let report = store.rebuild(&grid(9), -10.0, CubeMaterial::default(), &mut res);
        assert_eq!(report.created, 8);
        assert_eq!(report.skipped, 1);
        assert_eq!(res.live_cubes(), 8);
        let third = grid(9).positions()[2];
        assert!(store.cubes().iter().all(|c| c.rest() != third));
        for cube in store.cubes() {
            assert!(res.is_live(cube.handle));
        }
    }

    #[test]
    fn release_all_empties_store() {
        let mut res = CountingResources::default();
        let mut store = EntityStore::new();
        store.rebuild(&grid(9), -10.0, CubeMaterial::default(), &mut res);
        assert_eq!(store.release_all(&mut res), 9);
        assert!(store.is_empty());
        assert_eq!(res.live_cubes(), 0);
    }

    #[test]
    fn retarget_scales_rest() {
        let mut res = CountingResources::default();
        let mut store = EntityStore::new();
        store.rebuild(&grid(9), -10.0, CubeMaterial::default(), &mut res);
        store.retarget(5.0);
        for cube in store.cubes() {
            assert_eq!(cube.target(), cube.rest() * 5.0);
        }
        store.retarget(1.0);
        for cube in store.cubes() {
            assert_eq!(cube.target(), cube.rest());
        }
    }
}
