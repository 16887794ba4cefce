//! Thread-safe handle around a [`Registry`].
//!
//! Mutations (create/connect/remove) take the write lock, so they are
//! serialized against each other and against readers. Layout never needs the
//! lock for long: take a [`SharedRegistry::snapshot`] and lay that out.

use std::sync::{Arc, RwLock};

use super::{Registry, RegistryError};
use crate::equipment::Equipment;

/// Cloneable, lock-protected registry handle
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Registry>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Run `f` with shared read access
    pub fn read<R>(&self, f: impl FnOnce(&Registry) -> R) -> Result<R, RegistryError> {
        let guard = self.inner.read().map_err(|_| RegistryError::LockPoisoned)?;
        Ok(f(&*guard))
    }

    /// Run `f` with exclusive write access
    pub fn write<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> Result<R, RegistryError> {
        let mut guard = self.inner.write().map_err(|_| RegistryError::LockPoisoned)?;
        Ok(f(&mut *guard))
    }

    /// Owned copy of the current equipment list
    pub fn snapshot(&self) -> Result<Vec<Equipment>, RegistryError> {
        self.read(Registry::snapshot)
    }
}

impl From<Registry> for SharedRegistry {
    fn from(registry: Registry) -> Self {
        Self::new(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::EquipmentKind;
    use std::thread;

    #[test]
    fn test_concurrent_writers_are_serialized() {
        let shared = SharedRegistry::new(Registry::new());
        shared
            .write(|r| r.create("BUS", "Main Bus", EquipmentKind::Bus).map(|_| ()))
            .unwrap()
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let id = format!("L{}", i);
                    shared
                        .write(|r| {
                            r.create(id.clone(), "Load", EquipmentKind::Load)?;
                            r.add_load("BUS", &id)
                        })
                        .unwrap()
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let loads = shared.read(|r| r.get("BUS").unwrap().load_ids().len()).unwrap();
        assert_eq!(loads, 8);
        assert_eq!(shared.snapshot().unwrap().len(), 9);
    }

    #[test]
    fn test_duplicate_create_through_handle() {
        let shared = SharedRegistry::default();
        shared
            .write(|r| r.create("G1", "Gen", EquipmentKind::Generator).map(|_| ()))
            .unwrap()
            .unwrap();

        let result = shared
            .write(|r| r.create("G1", "Gen", EquipmentKind::Generator).map(|_| ()))
            .unwrap();

        assert_eq!(result, Err(RegistryError::DuplicateId("G1".to_string())));
    }
}
