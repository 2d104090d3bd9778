//! Console control service.
//!
//! Thin, stateless front over a [`ConsoleFunctions`] table. Every call gets its own
//! [`FunctionResult`] and comes back as a [`Result`]; nothing about the console is
//! remembered here. Raw/cooked mode is global to the process's terminal, so callers that
//! switch modes from several threads must serialize those calls themselves.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ErrorKind, NativeError, Result};
use crate::result::FunctionResult;

use super::buffer::{CharInputBuffer, DEFAULT_CAPACITY};
use super::functions::ConsoleFunctions;
use super::types::{AnsiColor, ConsoleType, Descriptor, MutableTerminalSize, TerminalSize};

#[derive(Clone)]
pub struct Console {
    functions: Arc<dyn ConsoleFunctions>,
    input_capacity: usize,
}

impl Console {
    pub fn new(functions: Arc<dyn ConsoleFunctions>) -> Self {
        Self::with_input_capacity(functions, DEFAULT_CAPACITY)
    }

    pub fn with_input_capacity(functions: Arc<dyn ConsoleFunctions>, input_capacity: usize) -> Self {
        Self {
            functions,
            input_capacity: input_capacity.max(1),
        }
    }

    /// Runs a backend function with a fresh result channel.
    fn call(&self, f: impl FnOnce(&dyn ConsoleFunctions, &mut FunctionResult)) -> Result<()> {
        let mut result = FunctionResult::new();
        f(self.functions.as_ref(), &mut result);
        result.check()
    }

    /// Classifies a descriptor. Fails only when the descriptor itself is invalid.
    pub fn detect_console_type(&self, fd: Descriptor) -> Result<ConsoleType> {
        fd.validate()?;
        let mut result = FunctionResult::new();
        let code = self.functions.is_console(fd, &mut result);
        result.check()?;
        let console_type = ConsoleType::from_code(code).ok_or_else(|| {
            NativeError::new(ErrorKind::Os, format!("backend returned unknown console type {}", code))
        })?;
        debug!("{} is console type {:?}", fd, console_type);
        Ok(console_type)
    }

    pub fn query_size(&self, fd: Descriptor) -> Result<TerminalSize> {
        fd.validate()?;
        let mut size = MutableTerminalSize::default();
        let mut result = FunctionResult::new();
        self.functions.get_console_size(fd, &mut size, &mut result);
        result.into_result(size.freeze())
    }

    /// Prepares `fd` for attribute and cursor operations. Calling it again is harmless.
    pub fn initialize(&self, fd: Descriptor) -> Result<()> {
        fd.validate()?;
        self.call(|f, r| f.init_console(fd, r))
    }

    pub fn enter_raw_mode(&self) -> Result<()> {
        self.call(|f, r| f.raw_input_mode(r))
    }

    /// Returns to cooked mode. Succeeds as a no-op when raw mode was never entered.
    pub fn exit_raw_mode(&self) -> Result<()> {
        self.call(|f, r| f.reset_input_mode(r))
    }

    /// Enters raw mode and leaves it again when the guard is dropped.
    pub fn raw_mode(&self) -> Result<RawModeGuard> {
        self.enter_raw_mode()?;
        Ok(RawModeGuard {
            console: self.clone(),
            active: true,
        })
    }

    /// Blocks until input is available and returns what was read.
    ///
    /// An empty vector means the input ended (closed descriptor, Ctrl-D or Ctrl-C).
    /// Reading while the console is in cooked mode fails with invalid-handle.
    pub fn read_input(&self) -> Result<Vec<char>> {
        let mut buffer = CharInputBuffer::with_capacity(self.input_capacity);
        let mut result = FunctionResult::new();
        self.functions.read_input(&mut buffer, &mut result);
        result.into_result(buffer.into_chars())
    }

    pub fn set_bold(&self) -> Result<()> {
        self.call(|f, r| f.bold_on(r))
    }

    pub fn clear_bold(&self) -> Result<()> {
        self.call(|f, r| f.bold_off(r))
    }

    pub fn reset_attributes(&self) -> Result<()> {
        self.call(|f, r| f.reset(r))
    }

    pub fn set_foreground(&self, color: AnsiColor) -> Result<()> {
        self.call(|f, r| f.foreground(color.index(), r))
    }

    /// Sets the foreground from a raw palette index.
    pub fn set_foreground_index(&self, index: u8) -> Result<()> {
        let color = AnsiColor::from_index(index).ok_or_else(|| {
            NativeError::new(
                ErrorKind::UnsupportedCapability,
                format!("color index {} is outside the ANSI palette", index),
            )
        })?;
        self.set_foreground(color)
    }

    pub fn clear_foreground(&self) -> Result<()> {
        self.call(|f, r| f.default_foreground(r))
    }

    pub fn move_left(&self, count: u16) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        self.call(|f, r| f.left(count, r))
    }

    pub fn move_right(&self, count: u16) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        self.call(|f, r| f.right(count, r))
    }

    pub fn move_up(&self, count: u16) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        self.call(|f, r| f.up(count, r))
    }

    pub fn move_down(&self, count: u16) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        self.call(|f, r| f.down(count, r))
    }

    pub fn move_to_line_start(&self) -> Result<()> {
        self.call(|f, r| f.start_line(r))
    }

    pub fn show_cursor(&self) -> Result<()> {
        self.call(|f, r| f.show_cursor(r))
    }

    pub fn hide_cursor(&self) -> Result<()> {
        self.call(|f, r| f.hide_cursor(r))
    }

    pub fn clear_to_end_of_line(&self) -> Result<()> {
        self.call(|f, r| f.clear_to_end_of_line(r))
    }
}

/// Keeps the console in raw mode until dropped.
pub struct RawModeGuard {
    console: Console,
    active: bool,
}

impl RawModeGuard {
    /// Leaves raw mode now and reports the outcome instead of logging it on drop.
    pub fn restore(mut self) -> Result<()> {
        self.active = false;
        self.console.exit_raw_mode()
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.console.exit_raw_mode() {
                warn!("Failed to leave raw mode: {}", e);
            }
        }
    }
}
