//! File system query service.

use std::path::{Component, Path, PathBuf, Prefix};
use std::sync::Arc;

use tracing::debug;

use crate::error::{ErrorKind, NativeError, Result};
use crate::result::FunctionResult;

use super::functions::FileSystemFunctions;
use super::info::{FileSystemInfo, FileSystemList};

#[derive(Clone)]
pub struct FileSystems {
    functions: Arc<dyn FileSystemFunctions>,
}

impl FileSystems {
    pub fn new(functions: Arc<dyn FileSystemFunctions>) -> Self {
        Self { functions }
    }

    /// Snapshots of every mounted file system, in mount order.
    pub fn file_systems(&self) -> Result<Vec<FileSystemInfo>> {
        let mut list = FileSystemList::new();
        let mut result = FunctionResult::new();
        self.functions.list_file_systems(&mut list, &mut result);
        result.into_result(list.into_vec())
    }

    /// The file system that owns `path`.
    ///
    /// Fails with resolution-failure when the path does not exist or no mounted file system
    /// contains it.
    pub fn file_system_info(&self, path: impl AsRef<Path>) -> Result<FileSystemInfo> {
        let path = path.as_ref();
        let resolved = std::fs::canonicalize(path).map_err(|e| {
            NativeError::with_code(
                ErrorKind::ResolutionFailure,
                format!("could not resolve {}: {}", path.display(), e),
                e.raw_os_error(),
            )
        })?;
        let resolved = strip_verbatim(&resolved);

        let mounts = self.file_systems()?;
        let info = find_owner(&mounts, &resolved).cloned().ok_or_else(|| {
            NativeError::new(
                ErrorKind::ResolutionFailure,
                format!("no mounted file system contains {}", resolved.display()),
            )
        })?;
        debug!(
            "{} is on {} ({}, {})",
            path.display(),
            info.mount_point().display(),
            info.file_system_type(),
            info.device_name()
        );
        Ok(info)
    }
}

/// Picks the deepest mount point containing `path`. Later mounts shadow earlier ones.
fn find_owner<'a>(mounts: &'a [FileSystemInfo], path: &Path) -> Option<&'a FileSystemInfo> {
    let mut best: Option<(&FileSystemInfo, usize)> = None;
    for info in mounts {
        if !path.starts_with(info.mount_point()) {
            continue;
        }
        let depth = info.mount_point().components().count();
        if best.map_or(true, |(_, best_depth)| depth >= best_depth) {
            best = Some((info, depth));
        }
    }
    best.map(|(info, _)| info)
}

/// Turns `\\?\C:\dir` from `canonicalize` into `C:\dir` so it matches drive mount points.
fn strip_verbatim(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Prefix(prefix)) => match prefix.kind() {
            Prefix::VerbatimDisk(letter) => {
                let mut stripped = PathBuf::from(format!("{}:\\", letter as char));
                stripped.extend(components.filter(|c| !matches!(c, Component::RootDir)));
                stripped
            }
            _ => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::info::CaseSensitivity;

    struct FixedMounts(Vec<FileSystemInfo>);

    impl FileSystemFunctions for FixedMounts {
        fn list_file_systems(&self, list: &mut FileSystemList, _result: &mut FunctionResult) {
            for info in &self.0 {
                list.add(info.clone());
            }
        }
    }

    struct BrokenMounts;

    impl FileSystemFunctions for BrokenMounts {
        fn list_file_systems(&self, _list: &mut FileSystemList, result: &mut FunctionResult) {
            result.mark_failed_with_code(ErrorKind::Os, "could not read mount table", 13);
        }
    }

    fn mount(point: &str, fs_type: &str) -> FileSystemInfo {
        FileSystemInfo::new(point, fs_type, false, format!("dev-{}", fs_type), Some(CaseSensitivity::CaseSensitive))
    }

    #[test]
    fn test_deepest_mount_wins() {
        let mounts = vec![mount("/", "ext4"), mount("/home", "btrfs"), mount("/home/user/nfs", "nfs")];
        assert_eq!(find_owner(&mounts, Path::new("/home/user/docs")).unwrap().file_system_type(), "btrfs");
        assert_eq!(find_owner(&mounts, Path::new("/home/user/nfs/a")).unwrap().file_system_type(), "nfs");
        assert_eq!(find_owner(&mounts, Path::new("/etc")).unwrap().file_system_type(), "ext4");
    }

    #[test]
    fn test_prefix_match_is_by_component() {
        let mounts = vec![mount("/", "ext4"), mount("/home", "btrfs")];
        assert_eq!(find_owner(&mounts, Path::new("/homework")).unwrap().file_system_type(), "ext4");
    }

    #[test]
    fn test_later_mount_shadows_earlier() {
        let mounts = vec![mount("/", "ext4"), mount("/mnt", "vfat"), mount("/mnt", "exfat")];
        assert_eq!(find_owner(&mounts, Path::new("/mnt/x")).unwrap().file_system_type(), "exfat");
    }

    #[test]
    fn test_no_owner() {
        let mounts = vec![mount("/data", "xfs")];
        assert!(find_owner(&mounts, Path::new("/etc")).is_none());
    }

    #[test]
    fn test_missing_path_is_resolution_failure() {
        let service = FileSystems::new(Arc::new(FixedMounts(vec![mount("/", "ext4")])));
        let dir = tempfile::tempdir().unwrap();
        let err = service.file_system_info(dir.path().join("does-not-exist")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionFailure);
    }

    #[test]
    fn test_unmounted_path_is_resolution_failure() {
        let service = FileSystems::new(Arc::new(FixedMounts(Vec::new())));
        let dir = tempfile::tempdir().unwrap();
        let err = service.file_system_info(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionFailure);
    }

    #[test]
    fn test_backend_failure_propagates() {
        let service = FileSystems::new(Arc::new(BrokenMounts));
        let dir = tempfile::tempdir().unwrap();
        let err = service.file_system_info(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Os);
        assert_eq!(err.os_code(), Some(13));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolves_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let service = FileSystems::new(Arc::new(FixedMounts(vec![mount("/", "ext4")])));
        let info = service.file_system_info(dir.path()).unwrap();
        assert_eq!(info.mount_point(), Path::new("/"));
        assert_eq!(info.device_name(), "dev-ext4");
    }

    #[cfg(windows)]
    #[test]
    fn test_strip_verbatim_disk() {
        assert_eq!(strip_verbatim(Path::new(r"\\?\C:\Users\me")), PathBuf::from(r"C:\Users\me"));
        assert_eq!(strip_verbatim(Path::new(r"\\?\UNC\server\share")), PathBuf::from(r"\\?\UNC\server\share"));
    }

    #[test]
    fn test_strip_verbatim_keeps_plain_paths() {
        assert_eq!(strip_verbatim(Path::new("/usr/lib")), PathBuf::from("/usr/lib"));
    }
}
