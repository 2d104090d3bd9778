//! Function table file system backends implement.

use crate::result::FunctionResult;

use super::info::FileSystemList;

pub trait FileSystemFunctions: Send + Sync {
    /// Adds every mounted file system to `list`, in mount order.
    fn list_file_systems(&self, list: &mut FileSystemList, result: &mut FunctionResult);
}
