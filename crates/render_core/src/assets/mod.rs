//! Asset loading
//!
//! Asset files are read straight into [`LinearAllocator`] blocks so that the
//! text a factory parses lives in the initialization arena, not on the heap.

pub mod obj_loader;

pub use obj_loader::{ObjError, ObjLoader};

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::foundation::memory::{ArenaBlock, LinearAllocator, MemoryError};
use crate::render::device::DeviceError;

/// Failures while turning an asset file into a GPU resource
#[derive(Debug, Error)]
pub enum AssetError {
    /// The file could not be opened or read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid UTF-8 text
    #[error("{} is not valid UTF-8", .path.display())]
    InvalidUtf8 {
        /// File being read
        path: PathBuf,
    },

    /// The model file is malformed
    #[error("Failed to parse {}: {source}", .path.display())]
    Obj {
        /// File being parsed
        path: PathBuf,
        /// Parser error
        source: ObjError,
    },

    /// The initialization arena ran out
    #[error("Arena allocation failed: {0}")]
    Memory(#[from] MemoryError),

    /// Upload or compilation failed on the device
    #[error("Graphics device error: {0}")]
    Device(#[from] DeviceError),
}

/// Read a whole file into a fresh arena block
///
/// # Errors
/// [`AssetError::Io`] on read failure, [`AssetError::Memory`] when the file
/// does not fit in the arena.
pub fn read_into_arena(allocator: &mut LinearAllocator, path: &Path) -> Result<ArenaBlock, AssetError> {
    let io_error = |source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_error)?;
    let len = file.metadata().map_err(io_error)?.len();
    let len = usize::try_from(len).map_err(|_| MemoryError::ArenaExhausted {
        requested: usize::MAX,
        available: allocator.remaining(),
        capacity: allocator.capacity(),
    })?;

    let block = allocator.allocate(len, 1)?;
    file.read_exact(allocator.bytes_mut(block)?).map_err(io_error)?;
    Ok(block)
}

/// Borrow an arena block as UTF-8 text
///
/// # Errors
/// [`AssetError::InvalidUtf8`] naming `path`, or a stale block.
pub fn arena_text<'a>(
    allocator: &'a LinearAllocator,
    block: ArenaBlock,
    path: &Path,
) -> Result<&'a str, AssetError> {
    std::str::from_utf8(allocator.bytes(block)?).map_err(|_| AssetError::InvalidUtf8 {
        path: path.to_path_buf(),
    })
}
