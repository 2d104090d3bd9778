//! Disk list backend built on sysinfo, used where there is no mount table to read.

use sysinfo::Disks;
use tracing::debug;

use crate::error::ErrorKind;
use crate::result::FunctionResult;

use super::classify;
use super::functions::FileSystemFunctions;
use super::info::{FileSystemInfo, FileSystemList};

#[derive(Default)]
pub struct DiskList {
    remote_types: Vec<String>,
}

impl DiskList {
    pub fn new(remote_types: Vec<String>) -> Self {
        Self { remote_types }
    }
}

impl FileSystemFunctions for DiskList {
    fn list_file_systems(&self, list: &mut FileSystemList, result: &mut FunctionResult) {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            result.mark_failed(
                ErrorKind::UnsupportedCapability,
                "listing file systems is not supported on this platform",
            );
            return;
        }

        let disks = Disks::new_with_refreshed_list();
        for disk in disks.list() {
            let mount_point = disk.mount_point().to_path_buf();
            let fs_type = disk.file_system().to_string_lossy().into_owned();
            let mut device = disk.name().to_string_lossy().into_owned();
            if device.is_empty() {
                // Unlabelled volumes have no name; the mount point identifies them.
                device = mount_point.display().to_string();
            }
            let remote = classify::is_remote(&fs_type, &device, &self.remote_types);
            let case_sensitivity = classify::case_sensitivity(&fs_type);
            list.add(FileSystemInfo::new(mount_point, fs_type, remote, device, Some(case_sensitivity)));
        }
        debug!("sysinfo reported {} disks", list.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listed_disks_are_well_formed() {
        let backend = DiskList::default();
        let mut list = FileSystemList::new();
        let mut result = FunctionResult::new();
        backend.list_file_systems(&mut list, &mut result);

        // Containers may report no disks at all; whatever is reported must be complete.
        if result.check().is_ok() {
            for info in list.entries() {
                assert!(!info.mount_point().as_os_str().is_empty());
                assert!(!info.device_name().is_empty());
                assert!(!info.file_system_type().is_empty());
            }
        }
    }
}
