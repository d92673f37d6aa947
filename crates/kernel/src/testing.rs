use std::collections::BTreeMap;

use glowgrid_common::{CubeMaterial, MeshHandle};

use crate::store::{GraphicsResources, ResourceError};

/// In-memory resource ledger for kernel tests.
#[derive(Debug, Default)]
pub struct CountingResources {
    next: u64,
    live: BTreeMap<MeshHandle, CubeMaterial>,
    capacity: Option<usize>,
    acquires: usize,
    fail_at: Option<usize>,
}

impl CountingResources {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Ledger whose `n`th acquire (counting from zero) fails with a backend error.
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            ..Self::default()
        }
    }

    pub fn is_live(&self, handle: MeshHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn material(&self, handle: MeshHandle) -> Option<CubeMaterial> {
        self.live.get(&handle).copied()
    }
}

impl GraphicsResources for CountingResources {
    fn acquire_cube(&mut self, material: CubeMaterial) -> Result<MeshHandle, ResourceError> {
        let attempt = self.acquires;
        self.acquires += 1;
        if self.fail_at == Some(attempt) {
            return Err(ResourceError::Backend(format!("acquire {attempt} rejected")));
        }
        if let Some(capacity) = self.capacity {
            if self.live.len() >= capacity {
                return Err(ResourceError::CapacityExhausted { capacity });
            }
        }
        let handle = MeshHandle(self.next);
        self.next += 1;
        self.live.insert(handle, material);
        Ok(handle)
    }

    fn release_cube(&mut self, handle: MeshHandle) {
        assert!(self.live.remove(&handle).is_some(), "double release of {handle:?}");
    }

    fn set_material(&mut self, handle: MeshHandle, material: CubeMaterial) {
        if let Some(m) = self.live.get_mut(&handle) {
            *m = material;
        }
    }

    fn live_cubes(&self) -> usize {
        self.live.len()
    }
}
