//! File system snapshots.

use std::path::{Path, PathBuf};

/// Name reported when the type of a file system could not be determined.
pub const UNKNOWN_TYPE: &str = "unknown";

/// Whether a file system distinguishes file names by case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseSensitivity {
    CaseSensitive,
    /// Case insensitive but case preserving.
    CaseInsensitive,
    Unknown,
}

/// Point-in-time information about a mounted file system.
///
/// Snapshots never change; query again for fresh information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemInfo {
    mount_point: PathBuf,
    file_system_type: String,
    remote: bool,
    device_name: String,
    case_sensitivity: Option<CaseSensitivity>,
}

impl FileSystemInfo {
    pub fn new(
        mount_point: impl Into<PathBuf>,
        file_system_type: impl Into<String>,
        remote: bool,
        device_name: impl Into<String>,
        case_sensitivity: Option<CaseSensitivity>,
    ) -> Self {
        let mut file_system_type = file_system_type.into();
        if file_system_type.trim().is_empty() {
            file_system_type = UNKNOWN_TYPE.to_string();
        }
        Self {
            mount_point: mount_point.into(),
            file_system_type,
            remote,
            device_name: device_name.into(),
            case_sensitivity,
        }
    }

    /// Root directory of the file system.
    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    /// OS specific type name, or `"unknown"`.
    pub fn file_system_type(&self) -> &str {
        &self.file_system_type
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    /// OS specific name of the device backing the file system.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Case sensitivity if known, `None` otherwise.
    pub fn case_sensitivity(&self) -> Option<CaseSensitivity> {
        self.case_sensitivity
    }

    #[deprecated(note = "use `case_sensitivity()` instead")]
    pub fn is_case_sensitive(&self) -> bool {
        matches!(self.case_sensitivity, Some(CaseSensitivity::CaseSensitive))
    }

    #[deprecated(note = "use `case_sensitivity()` instead")]
    pub fn is_case_preserving(&self) -> bool {
        matches!(
            self.case_sensitivity,
            Some(CaseSensitivity::CaseSensitive) | Some(CaseSensitivity::CaseInsensitive)
        )
    }
}

/// Output structure a backend fills with the mounted file systems, in mount order.
#[derive(Debug, Default)]
pub struct FileSystemList {
    entries: Vec<FileSystemInfo>,
}

impl FileSystemList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, info: FileSystemInfo) {
        self.entries.push(info);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileSystemInfo] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<FileSystemInfo> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_type_is_unknown() {
        let info = FileSystemInfo::new("/mnt", "", false, "/dev/sdb1", None);
        assert_eq!(info.file_system_type(), UNKNOWN_TYPE);
        assert_eq!(info.case_sensitivity(), None);
    }

    #[test]
    #[allow(deprecated)]
    fn test_derived_case_flags() {
        let sensitive = FileSystemInfo::new("/", "ext4", false, "/dev/sda1", Some(CaseSensitivity::CaseSensitive));
        assert!(sensitive.is_case_sensitive());
        assert!(sensitive.is_case_preserving());

        let insensitive = FileSystemInfo::new("C:\\", "NTFS", false, "C:", Some(CaseSensitivity::CaseInsensitive));
        assert!(!insensitive.is_case_sensitive());
        assert!(insensitive.is_case_preserving());

        for unknown in [None, Some(CaseSensitivity::Unknown)] {
            let info = FileSystemInfo::new("/x", "fuse", false, "fuse", unknown);
            assert!(!info.is_case_sensitive());
            assert!(!info.is_case_preserving());
        }
    }

    #[test]
    fn test_snapshots_are_independent() {
        let first = FileSystemInfo::new("/", "ext4", false, "/dev/sda1", Some(CaseSensitivity::CaseSensitive));
        let second = FileSystemInfo::new(first.mount_point(), "xfs", true, "server:/export", None);
        assert_eq!(first.file_system_type(), "ext4");
        assert!(!first.is_remote());
        assert_eq!(second.file_system_type(), "xfs");
    }
}
