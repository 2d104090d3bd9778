//! Mount table backend for Linux.
//!
//! Reads `/proc/self/mounts` (or any file in the same format):
//!
//! ```text
//! /dev/sda1 / ext4 rw,relatime 0 0
//! //nas/media /mnt/media cifs rw 0 0
//! ```
//!
//! Spaces, tabs, newlines and backslashes inside fields are written as octal escapes
//! (`\040`, `\011`, `\012`, `\134`).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::result::FunctionResult;

use super::classify;
use super::functions::FileSystemFunctions;
use super::info::{FileSystemInfo, FileSystemList};

pub const DEFAULT_MOUNT_TABLE: &str = "/proc/self/mounts";

pub struct MountTable {
    path: PathBuf,
    remote_types: Vec<String>,
}

impl MountTable {
    pub fn new(path: impl Into<PathBuf>, remote_types: Vec<String>) -> Self {
        Self {
            path: path.into(),
            remote_types,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses one mount table line; `None` for blank, comment or short lines.
    pub fn parse_line(&self, line: &str) -> Option<FileSystemInfo> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let mut fields = line.split_whitespace();
        let device = unescape(fields.next()?);
        let mount_point = unescape(fields.next()?);
        let fs_type = unescape(fields.next()?);

        let remote = classify::is_remote(&fs_type, &device, &self.remote_types);
        let case_sensitivity = classify::case_sensitivity(&fs_type);
        Some(FileSystemInfo::new(mount_point, fs_type, remote, device, Some(case_sensitivity)))
    }
}

impl Default for MountTable {
    fn default() -> Self {
        Self::new(DEFAULT_MOUNT_TABLE, Vec::new())
    }
}

impl FileSystemFunctions for MountTable {
    fn list_file_systems(&self, list: &mut FileSystemList, result: &mut FunctionResult) {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                let message = format!("could not read mount table {}", self.path.display());
                result.mark_failed_with_io(&message, &e);
                return;
            }
        };
        for line in content.lines() {
            match self.parse_line(line) {
                Some(info) => list.add(info),
                None if !line.trim().is_empty() => warn!("Skipping malformed mount entry: {}", line),
                None => {}
            }
        }
        debug!("Read {} mounts from {}", list.len(), self.path.display());
    }
}

/// Decodes the `\ooo` octal escapes used by the kernel.
fn unescape(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal(&bytes[i + 1..i + 4]) {
            let value = (bytes[i + 1] - b'0') * 64 + (bytes[i + 2] - b'0') * 8 + (bytes[i + 3] - b'0');
            out.push(value);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal(digits: &[u8]) -> bool {
    digits.len() == 3 && digits[0] <= b'3' && digits.iter().all(|d| (b'0'..=b'7').contains(d))
}
