//! Classification of file systems by type name.

use super::info::CaseSensitivity;

/// Network file system types.
const REMOTE_TYPES: &[&str] = &[
    "nfs", "nfs4", "cifs", "smb", "smb2", "smb3", "smbfs", "ncpfs", "afs", "coda", "ceph",
    "glusterfs", "fuse.glusterfs", "lustre", "gfs2", "ocfs2", "davfs", "fuse.sshfs", "sshfs",
    "fuse.rclone", "webdav", "afpfs", "9p",
];

const CASE_SENSITIVE_TYPES: &[&str] = &[
    "ext2", "ext3", "ext4", "xfs", "btrfs", "zfs", "f2fs", "jfs", "reiserfs", "nilfs2",
    "bcachefs", "tmpfs", "ramfs", "overlay", "squashfs", "erofs", "ufs", "ffs", "proc", "sysfs",
    "devtmpfs", "nfs", "nfs4",
];

const CASE_INSENSITIVE_TYPES: &[&str] = &[
    "vfat", "msdos", "fat", "fat12", "fat16", "fat32", "exfat", "ntfs", "ntfs3", "refs",
];

/// Whether `fs_type` names a network file system, or the device looks like one.
pub fn is_remote(fs_type: &str, device: &str, extra_types: &[String]) -> bool {
    let fs_type = fs_type.to_ascii_lowercase();
    if REMOTE_TYPES.contains(&fs_type.as_str())
        || extra_types.iter().any(|t| t.eq_ignore_ascii_case(&fs_type))
    {
        return true;
    }
    // SMB shares (//server/share) and NFS exports (server:/path)
    device.starts_with("//") || device.contains(":/")
}

pub fn case_sensitivity(fs_type: &str) -> CaseSensitivity {
    let fs_type = fs_type.to_ascii_lowercase();
    if CASE_SENSITIVE_TYPES.contains(&fs_type.as_str()) {
        CaseSensitivity::CaseSensitive
    } else if CASE_INSENSITIVE_TYPES.contains(&fs_type.as_str()) {
        CaseSensitivity::CaseInsensitive
    } else {
        CaseSensitivity::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_types() {
        assert!(is_remote("nfs4", "server:/export", &[]));
        assert!(is_remote("CIFS", "//nas/share", &[]));
        assert!(!is_remote("ext4", "/dev/sda1", &[]));
        assert!(is_remote("fuse.s3fs", "s3fs", &["fuse.s3fs".to_string()]));
    }

    #[test]
    fn test_remote_device_shapes() {
        assert!(is_remote("fuse", "//nas/share", &[]));
        assert!(is_remote("fuse", "host:/srv", &[]));
        assert!(!is_remote("tmpfs", "tmpfs", &[]));
    }

    #[test]
    fn test_case_sensitivity() {
        assert_eq!(case_sensitivity("ext4"), CaseSensitivity::CaseSensitive);
        assert_eq!(case_sensitivity("NTFS"), CaseSensitivity::CaseInsensitive);
        assert_eq!(case_sensitivity("vfat"), CaseSensitivity::CaseInsensitive);
        assert_eq!(case_sensitivity("apfs"), CaseSensitivity::Unknown);
        assert_eq!(case_sensitivity(""), CaseSensitivity::Unknown);
    }
}
