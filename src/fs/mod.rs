//! File system identification.
//!
//! [`FileSystems`] resolves a path to the mounted file system that owns it. The mount list
//! comes from a [`FileSystemFunctions`] backend: the kernel mount table on Linux, sysinfo's
//! disk list elsewhere.

pub mod classify;
pub mod disks;
pub mod functions;
pub mod info;
pub mod mounts;
pub mod service;

use std::sync::Arc;

use crate::config::FileSystemConfig;

pub use disks::DiskList;
pub use functions::FileSystemFunctions;
pub use info::{CaseSensitivity, FileSystemInfo, FileSystemList, UNKNOWN_TYPE};
pub use mounts::MountTable;
pub use service::FileSystems;

/// The backend for the current platform.
pub fn system_functions(config: &FileSystemConfig) -> Arc<dyn FileSystemFunctions> {
    if cfg!(target_os = "linux") {
        Arc::new(MountTable::new(&config.mount_table, config.remote_types.clone()))
    } else {
        Arc::new(DiskList::new(config.remote_types.clone()))
    }
}
