//! Physical memory statistics.

use std::sync::Arc;

use sysinfo::System;
use tracing::debug;

use crate::error::{ErrorKind, NativeError, Result};
use crate::result::FunctionResult;

/// Snapshot of system memory. `free` never exceeds `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryInfo {
    total: u64,
    free: u64,
}

impl MemoryInfo {
    /// Returns `None` when `free > total`.
    pub fn new(total: u64, free: u64) -> Option<Self> {
        (free <= total).then_some(Self { total, free })
    }

    /// Total physical memory in bytes.
    pub fn total_physical_memory(&self) -> u64 {
        self.total
    }

    /// Physical memory available for new allocations, in bytes.
    pub fn free_physical_memory(&self) -> u64 {
        self.free
    }
}

/// Output structure backends fill in.
#[derive(Debug, Default)]
pub struct MutableMemoryInfo {
    pub total: u64,
    pub free: u64,
}

pub trait MemoryFunctions: Send + Sync {
    fn get_memory_info(&self, info: &mut MutableMemoryInfo, result: &mut FunctionResult);
}

/// Backend reading memory statistics through sysinfo.
#[derive(Debug, Default)]
pub struct SystemMemory;

impl MemoryFunctions for SystemMemory {
    fn get_memory_info(&self, info: &mut MutableMemoryInfo, result: &mut FunctionResult) {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            result.mark_failed(
                ErrorKind::UnsupportedCapability,
                "memory statistics are not available on this platform",
            );
            return;
        }
        let mut sys = System::new();
        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            result.mark_failed(ErrorKind::UnsupportedCapability, "the system did not report its memory size");
            return;
        }
        info.total = total;
        // sysinfo can report more available than total inside cgroups.
        info.free = sys.available_memory().min(total);
    }
}

#[derive(Clone)]
pub struct Memory {
    functions: Arc<dyn MemoryFunctions>,
}

impl Memory {
    pub fn new(functions: Arc<dyn MemoryFunctions>) -> Self {
        Self { functions }
    }

    pub fn memory_info(&self) -> Result<MemoryInfo> {
        let mut info = MutableMemoryInfo::default();
        let mut result = FunctionResult::new();
        self.functions.get_memory_info(&mut info, &mut result);
        result.check()?;

        let snapshot = MemoryInfo::new(info.total, info.free).ok_or_else(|| {
            NativeError::new(
                ErrorKind::Os,
                format!("inconsistent memory statistics: {} free of {} total", info.free, info.total),
            )
        })?;
        debug!("Memory: {} free of {} bytes", snapshot.free, snapshot.total);
        Ok(snapshot)
    }
}
