//! Enum-indexed GPU resource managers
//!
//! Every manager follows one pattern: a fixed table with one slot per key,
//! filled exactly once by [`ResourceManager::initialize`] from compiled-in
//! asset paths, then read by key for the rest of the program.
//!
//! ```text
//! Uninitialized --initialize--> Initializing --all slots created--> Ready
//!       ^                            |                                |
//!       +------- any failure --------+                                |
//!       +---------------------------- release ------------------------+
//! ```
//!
//! Initialization is all-or-nothing. If any factory call fails the objects
//! created so far are destroyed through the device and the manager goes back
//! to `Uninitialized`, so a half-filled table is never observable.
//!
//! Managers are deliberately not `Clone`: a copy would duplicate GPU handles
//! without duplicating the GPU objects behind them.

pub mod mesh_manager;
pub mod shader_manager;

pub use mesh_manager::{MeshManager, MeshType, COUNT_MESH_TYPES};
pub use shader_manager::{ShaderManager, ShaderType, COUNT_SHADER_TYPES};

use std::fmt;
use std::marker::PhantomData;

use thiserror::Error;

use crate::assets::AssetError;
use crate::config::ResourceConfig;
use crate::foundation::memory::LinearAllocator;
use crate::render::device::{DeviceError, GraphicsDevice};

/// Resource manager contract violations and initialization failures
#[derive(Debug, Error)]
pub enum ResourceError {
    /// `get`/`use_program` called before initialization completed
    #[error("{manager} used before initialization")]
    NotInitialized {
        /// Manager name
        manager: &'static str,
    },

    /// A factory failed while filling the table
    #[error("{manager} failed to initialize {key}: {source}")]
    Initialization {
        /// Manager name
        manager: &'static str,
        /// Key whose resource failed
        key: &'static str,
        /// Factory error
        source: AssetError,
    },

    /// Ordinal outside `0..COUNT`
    #[error("Ordinal {ordinal} is not a valid key (count is {count})")]
    InvalidOrdinal {
        /// Requested ordinal
        ordinal: usize,
        /// Number of valid keys
        count: usize,
    },

    /// A device call on a live resource failed
    #[error("Device call failed: {0}")]
    Device(#[from] DeviceError),

    /// A slot was filled twice
    #[error("Resource slot {key} is already initialized")]
    SlotOccupied {
        /// Key of the occupied slot
        key: &'static str,
    },
}

/// Enumerated key selecting one slot of a resource table
///
/// There is no sentinel variant: [`COUNT`](Self::COUNT) is a constant, so
/// the table size can never be passed where a key is expected.
pub trait ResourceKey: Copy + Eq + fmt::Debug + 'static {
    /// Number of keys, and therefore table slots
    const COUNT: usize;

    /// Every key in ordinal order
    const ALL: &'static [Self];

    /// Slot index of this key
    fn ordinal(self) -> usize;

    /// Name used in logs and errors
    fn name(self) -> &'static str;

    /// Compiled-in asset paths, relative to the configured asset root
    fn asset_paths(self) -> &'static [&'static str];

    /// Key at `ordinal`
    ///
    /// # Errors
    /// [`ResourceError::InvalidOrdinal`] for `ordinal >= COUNT`.
    fn from_ordinal(ordinal: usize) -> Result<Self, ResourceError> {
        Self::ALL.get(ordinal).copied().ok_or(ResourceError::InvalidOrdinal {
            ordinal,
            count: Self::COUNT,
        })
    }
}

/// Fixed table with one write-once slot per key
#[derive(Debug)]
pub struct ResourceTable<K: ResourceKey, R, const N: usize> {
    slots: [Option<R>; N],
    _key: PhantomData<K>,
}

impl<K: ResourceKey, R, const N: usize> ResourceTable<K, R, N> {
    const SIZE_MATCHES_KEYS: () = assert!(N == K::COUNT, "resource table size must equal the key count");

    /// Table with every slot empty
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::SIZE_MATCHES_KEYS;
        Self {
            slots: std::array::from_fn(|_| None),
            _key: PhantomData,
        }
    }

    /// Resource in `key`'s slot
    pub fn get(&self, key: K) -> Option<&R> {
        self.slots.get(key.ordinal()).and_then(Option::as_ref)
    }

    /// Fill an empty slot
    ///
    /// # Errors
    /// Hands `resource` back if the slot is already filled.
    pub fn insert(&mut self, key: K, resource: R) -> Result<(), R> {
        match self.slots.get_mut(key.ordinal()) {
            Some(slot @ None) => {
                *slot = Some(resource);
                Ok(())
            }
            _ => Err(resource),
        }
    }

    /// Number of filled slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when no slot is filled
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// True when every slot is filled
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Filled slots in ordinal order
    pub fn iter(&self) -> impl Iterator<Item = (K, &R)> + '_ {
        K::ALL.iter().filter_map(move |&key| self.get(key).map(|resource| (key, resource)))
    }

    /// Empty every slot, yielding the resources in ordinal order
    ///
    /// The table is empty as soon as this returns, whether or not the
    /// iterator is consumed.
    pub fn drain(&mut self) -> impl Iterator<Item = R> {
        std::mem::replace(&mut self.slots, std::array::from_fn(|_| None))
            .into_iter()
            .flatten()
    }
}

impl<K: ResourceKey, R, const N: usize> Default for ResourceTable<K, R, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of a manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerState {
    /// Table empty, lookups fail
    Uninitialized,
    /// Factories running
    Initializing,
    /// Every slot filled
    Ready,
}

/// A resource a [`ResourceManager`] can build from asset files
pub trait GpuResource: Sized {
    /// Key type selecting a slot
    type Key: ResourceKey;

    /// Manager name used in logs and errors
    const MANAGER: &'static str;

    /// Arena size for an initialization pass that owns its own arena
    fn arena_bytes(config: &ResourceConfig) -> usize;

    /// Build the resource for `key`
    ///
    /// # Errors
    /// Any [`AssetError`] from reading, parsing or uploading.
    fn create(
        key: Self::Key,
        config: &ResourceConfig,
        allocator: &mut LinearAllocator,
        device: &mut dyn GraphicsDevice,
    ) -> Result<Self, AssetError>;

    /// Free the GPU objects behind this resource
    fn destroy(self, device: &mut dyn GraphicsDevice);
}

/// Generic enum-indexed manager; see the module docs for the lifecycle
#[derive(Debug)]
pub struct ResourceManager<R: GpuResource, const N: usize> {
    config: ResourceConfig,
    table: ResourceTable<R::Key, R, N>,
    state: ManagerState,
}

impl<R: GpuResource, const N: usize> ResourceManager<R, N> {
    /// Uninitialized manager resolving assets through `config`
    pub fn new(config: ResourceConfig) -> Self {
        Self {
            config,
            table: ResourceTable::new(),
            state: ManagerState::Uninitialized,
        }
    }

    /// Configuration this manager resolves assets with
    pub const fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Current lifecycle state
    pub const fn state(&self) -> ManagerState {
        self.state
    }

    /// True once every slot is filled
    pub fn is_initialized(&self) -> bool {
        self.state == ManagerState::Ready
    }

    /// Initialize with an arena owned by this call
    ///
    /// The arena is sized from the config and dropped before returning.
    ///
    /// # Errors
    /// See [`initialize_with`](Self::initialize_with).
    pub fn initialize(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), ResourceError> {
        if self.is_initialized() {
            log::warn!("{} already initialized, ignoring", R::MANAGER);
            return Ok(());
        }
        let mut allocator = LinearAllocator::new(R::arena_bytes(&self.config));
        self.initialize_with(&mut allocator, device)
    }

    /// Initialize from a caller-provided arena
    ///
    /// The allocator is only borrowed for the duration of the call. Calling
    /// this on a `Ready` manager logs a warning and leaves the table as is.
    ///
    /// # Errors
    /// [`ResourceError::Initialization`] naming the first key that failed.
    /// The manager is `Uninitialized` afterwards and holds no GPU objects.
    pub fn initialize_with(
        &mut self,
        allocator: &mut LinearAllocator,
        device: &mut dyn GraphicsDevice,
    ) -> Result<(), ResourceError> {
        if self.is_initialized() {
            log::warn!("{} already initialized, ignoring", R::MANAGER);
            return Ok(());
        }

        log::info!("Initializing {} ({} resources)", R::MANAGER, N);
        self.state = ManagerState::Initializing;
        let arena_start = allocator.used();

        for &key in <R::Key as ResourceKey>::ALL {
            if let Err(err) = self.create_slot(key, allocator, device) {
                log::error!("{err}");
                self.clear(device);
                return Err(err);
            }
        }

        self.state = ManagerState::Ready;
        log::debug!(
            "{} ready, used {} arena bytes ({} of {} in use)",
            R::MANAGER,
            allocator.used() - arena_start,
            allocator.used(),
            allocator.capacity()
        );
        Ok(())
    }

    fn create_slot(
        &mut self,
        key: R::Key,
        allocator: &mut LinearAllocator,
        device: &mut dyn GraphicsDevice,
    ) -> Result<(), ResourceError> {
        let resource = R::create(key, &self.config, allocator, device).map_err(|source| {
            ResourceError::Initialization {
                manager: R::MANAGER,
                key: key.name(),
                source,
            }
        })?;

        if let Err(resource) = self.table.insert(key, resource) {
            resource.destroy(device);
            return Err(ResourceError::SlotOccupied { key: key.name() });
        }

        log::debug!("{}: created {} from {:?}", R::MANAGER, key.name(), key.asset_paths());
        Ok(())
    }

    fn clear(&mut self, device: &mut dyn GraphicsDevice) {
        for resource in self.table.drain() {
            resource.destroy(device);
        }
        self.state = ManagerState::Uninitialized;
    }

    /// Resource for `key`
    ///
    /// # Errors
    /// [`ResourceError::NotInitialized`] unless the manager is `Ready`.
    pub fn get(&self, key: R::Key) -> Result<&R, ResourceError> {
        let not_initialized = ResourceError::NotInitialized { manager: R::MANAGER };
        if !self.is_initialized() {
            return Err(not_initialized);
        }
        self.table.get(key).ok_or(not_initialized)
    }

    /// Every resource in key order; empty unless `Ready`
    pub fn iter(&self) -> impl Iterator<Item = (R::Key, &R)> + '_ {
        self.table.iter().filter(|_| self.is_initialized())
    }

    /// Destroy every GPU object and return to `Uninitialized`
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if self.table.is_empty() {
            return;
        }
        log::info!("Releasing {}", R::MANAGER);
        self.clear(device);
    }
}

impl<R: GpuResource, const N: usize> Default for ResourceManager<R, N> {
    fn default() -> Self {
        Self::new(ResourceConfig::default())
    }
}

impl<R: GpuResource, const N: usize> Drop for ResourceManager<R, N> {
    fn drop(&mut self) {
        if !self.table.is_empty() {
            log::warn!(
                "{} dropped with {} live resources; call release() while the device is alive",
                R::MANAGER,
                self.table.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::memory::MemoryError;
    use crate::render::device::{MeshHandle, MeshUpload};
    use crate::render::headless::HeadlessDevice;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Slot {
        First,
        Second,
    }

    impl ResourceKey for Slot {
        const COUNT: usize = 2;
        const ALL: &'static [Self] = &[Self::First, Self::Second];

        fn ordinal(self) -> usize {
            self as usize
        }

        fn name(self) -> &'static str {
            match self {
                Self::First => "First",
                Self::Second => "Second",
            }
        }

        fn asset_paths(self) -> &'static [&'static str] {
            &[]
        }
    }

    const BLOB_BYTES: usize = 16;

    #[derive(Debug)]
    struct Blob {
        handle: MeshHandle,
    }

    impl GpuResource for Blob {
        type Key = Slot;
        const MANAGER: &'static str = "BlobManager";

        fn arena_bytes(config: &ResourceConfig) -> usize {
            config.mesh_arena_bytes
        }

        fn create(
            _key: Slot,
            _config: &ResourceConfig,
            allocator: &mut LinearAllocator,
            device: &mut dyn GraphicsDevice,
        ) -> Result<Self, AssetError> {
            let block = allocator.allocate_copy(&[0; BLOB_BYTES], 4)?;
            let handle = device.upload_mesh(MeshUpload {
                vertices: allocator.bytes(block)?,
                vertex_count: 1,
                vertex_stride: BLOB_BYTES as u32,
                indices: &[],
                index_count: 0,
            })?;
            Ok(Self { handle })
        }

        fn destroy(self, device: &mut dyn GraphicsDevice) {
            device.destroy_mesh(self.handle);
        }
    }

    type BlobManager = ResourceManager<Blob, 2>;

    #[test]
    fn test_from_ordinal() {
        assert_eq!(Slot::from_ordinal(1).unwrap(), Slot::Second);
        assert!(matches!(
            Slot::from_ordinal(Slot::COUNT),
            Err(ResourceError::InvalidOrdinal { ordinal: 2, count: 2 })
        ));
        for (ordinal, key) in Slot::ALL.iter().enumerate() {
            assert_eq!(key.ordinal(), ordinal);
        }
    }

    #[test]
    fn test_table_slots_are_write_once() {
        let mut table: ResourceTable<Slot, &str, 2> = ResourceTable::new();
        assert!(table.is_empty());
        table.insert(Slot::Second, "second").unwrap();
        assert_eq!(table.insert(Slot::Second, "again"), Err("again"));
        assert_eq!(table.get(Slot::Second), Some(&"second"));
        assert_eq!(table.get(Slot::First), None);
        assert!(!table.is_full());

        table.insert(Slot::First, "first").unwrap();
        assert!(table.is_full());
        let keys: Vec<_> = table.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, [Slot::First, Slot::Second]);

        let drained: Vec<_> = table.drain().collect();
        assert_eq!(drained, ["first", "second"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_drain_empties_table_without_consuming() {
        let mut table: ResourceTable<Slot, &str, 2> = ResourceTable::new();
        table.insert(Slot::First, "first").unwrap();
        table.insert(Slot::Second, "second").unwrap();

        let mut drained = table.drain();
        assert_eq!(drained.next(), Some("first"));
        drop(drained);

        assert!(table.is_empty());
        assert_eq!(table.get(Slot::Second), None);
        table.insert(Slot::Second, "refilled").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_lifecycle() {
        let mut device = HeadlessDevice::new();
        let mut manager = BlobManager::default();
        assert_eq!(manager.state(), ManagerState::Uninitialized);
        assert!(matches!(
            manager.get(Slot::First),
            Err(ResourceError::NotInitialized { manager: "BlobManager" })
        ));
        assert_eq!(manager.iter().count(), 0);

        manager.initialize(&mut device).unwrap();
        assert_eq!(manager.state(), ManagerState::Ready);
        assert_eq!(device.mesh_count(), 2);
        let first = manager.get(Slot::First).unwrap().handle;
        assert_ne!(first, manager.get(Slot::Second).unwrap().handle);

        // A second pass must not create anything or replace handles.
        manager.initialize(&mut device).unwrap();
        assert_eq!(device.mesh_count(), 2);
        assert_eq!(manager.get(Slot::First).unwrap().handle, first);

        manager.release(&mut device);
        assert_eq!(device.mesh_count(), 0);
        assert_eq!(manager.state(), ManagerState::Uninitialized);
        assert!(manager.get(Slot::First).is_err());
    }

    #[test]
    fn test_exhaustion_rolls_back() {
        let mut device = HeadlessDevice::new();
        let mut manager = BlobManager::default();
        let mut arena = LinearAllocator::new(BLOB_BYTES + BLOB_BYTES / 2);

        let err = manager.initialize_with(&mut arena, &mut device).unwrap_err();
        match err {
            ResourceError::Initialization {
                manager: "BlobManager",
                key: "Second",
                source: AssetError::Memory(MemoryError::ArenaExhausted { .. }),
            } => {}
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(manager.state(), ManagerState::Uninitialized);
        assert_eq!(device.mesh_count(), 0);

        // Recovers once given enough memory.
        arena = LinearAllocator::new(2 * BLOB_BYTES);
        manager.initialize_with(&mut arena, &mut device).unwrap();
        assert!(manager.is_initialized());
        manager.release(&mut device);
    }

    #[test]
    fn test_shared_arena_is_only_borrowed() {
        let mut device = HeadlessDevice::new();
        let mut manager = BlobManager::default();
        let mut arena = LinearAllocator::new(4 * BLOB_BYTES);

        manager.initialize_with(&mut arena, &mut device).unwrap();
        assert_eq!(arena.used(), 2 * BLOB_BYTES);
        arena.reset();
        drop(arena);

        assert!(manager.get(Slot::Second).is_ok());
        manager.release(&mut device);
    }
}
