//! Function table every console backend implements.
//!
//! Each function reports failure through the [`FunctionResult`] it is handed and writes
//! its output structure only on success. Functions without a descriptor act on the
//! console most recently passed to [`ConsoleFunctions::init_console`] (attributes and
//! cursor) or on the process's controlling input (raw mode and reads).

use crate::result::FunctionResult;

use super::buffer::CharInputBuffer;
use super::types::{Descriptor, MutableTerminalSize};

pub trait ConsoleFunctions: Send + Sync {
    /// Returns the console type code: 0 none, 1 native, 2 emulated.
    fn is_console(&self, fd: Descriptor, result: &mut FunctionResult) -> i32;

    fn get_console_size(&self, fd: Descriptor, size: &mut MutableTerminalSize, result: &mut FunctionResult);

    fn init_console(&self, fd: Descriptor, result: &mut FunctionResult);

    fn raw_input_mode(&self, result: &mut FunctionResult);

    /// Restores cooked input; succeeds without doing anything when raw mode was never entered.
    fn reset_input_mode(&self, result: &mut FunctionResult);

    fn read_input(&self, buffer: &mut CharInputBuffer, result: &mut FunctionResult);

    fn bold_on(&self, result: &mut FunctionResult);

    fn bold_off(&self, result: &mut FunctionResult);

    /// Restores the original attributes and cursor visibility.
    fn reset(&self, result: &mut FunctionResult);

    fn show_cursor(&self, result: &mut FunctionResult);

    fn hide_cursor(&self, result: &mut FunctionResult);

    /// Sets the foreground to palette entry `color` (0-15).
    fn foreground(&self, color: u8, result: &mut FunctionResult);

    fn default_foreground(&self, result: &mut FunctionResult);

    fn left(&self, count: u16, result: &mut FunctionResult);

    fn right(&self, count: u16, result: &mut FunctionResult);

    fn up(&self, count: u16, result: &mut FunctionResult);

    fn down(&self, count: u16, result: &mut FunctionResult);

    fn start_line(&self, result: &mut FunctionResult);

    fn clear_to_end_of_line(&self, result: &mut FunctionResult);
}
