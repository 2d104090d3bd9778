//! In-memory console backend.
//!
//! Behaves like a terminal of a fixed size attached to a configurable set of descriptors.
//! Input is scripted with [`SimulatedConsole::push_input`] and every effect of the
//! attribute and cursor functions is recorded so it can be inspected with
//! [`SimulatedConsole::snapshot`]. Useful for headless runs and for testing code that
//! drives a [`crate::console::Console`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::error::ErrorKind;
use crate::result::FunctionResult;

use super::buffer::CharInputBuffer;
use super::functions::ConsoleFunctions;
use super::types::{ConsoleType, Descriptor, MutableTerminalSize, TerminalSize};

const CTRL_C: char = '\u{3}';
const CTRL_D: char = '\u{4}';

/// Observable state of a simulated console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedState {
    pub initialized: Option<Descriptor>,
    pub raw_mode: bool,
    /// Column and row, both zero based.
    pub cursor: (u16, u16),
    pub cursor_visible: bool,
    pub bold: bool,
    pub foreground: Option<u8>,
}

impl Default for SimulatedState {
    fn default() -> Self {
        Self {
            initialized: None,
            raw_mode: false,
            cursor: (0, 0),
            cursor_visible: true,
            bold: false,
            foreground: None,
        }
    }
}

#[derive(Default)]
struct Inner {
    state: SimulatedState,
    input: VecDeque<char>,
    /// A terminator was read behind other input and is reported by the next read.
    end_pending: bool,
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, ErrorKind>,
}

pub struct SimulatedConsole {
    size: TerminalSize,
    consoles: HashMap<Descriptor, ConsoleType>,
    inner: Mutex<Inner>,
}

impl SimulatedConsole {
    /// A console of the given size with no descriptor attached to it yet.
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            size: TerminalSize::new(cols.max(1), rows.max(1)),
            consoles: HashMap::new(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Attaches `fd` to the console as the given type.
    pub fn with_console(mut self, fd: Descriptor, console_type: ConsoleType) -> Self {
        self.consoles.insert(fd, console_type);
        self
    }

    /// Makes every later call of the named function fail with `kind`.
    pub fn fail_on(&self, function: &'static str, kind: ErrorKind) {
        self.lock().failures.insert(function, kind);
    }

    /// Queues characters as if they had been typed.
    pub fn push_input(&self, text: &str) {
        self.lock().input.extend(text.chars());
    }

    pub fn snapshot(&self) -> SimulatedState {
        self.lock().state.clone()
    }

    /// Number of times the named backend function was invoked.
    pub fn call_count(&self, function: &str) -> usize {
        self.lock().calls.get(function).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn console_type(&self, fd: Descriptor) -> ConsoleType {
        self.consoles.get(&fd).copied().unwrap_or(ConsoleType::None)
    }

    /// Records the call and returns the state, or `None` if the call must fail.
    fn enter(&self, function: &'static str, result: &mut FunctionResult) -> Option<MutexGuard<'_, Inner>> {
        let mut inner = self.lock();
        *inner.calls.entry(function).or_insert(0) += 1;
        if let Some(kind) = inner.failures.get(function).copied() {
            result.mark_failed(kind, format!("simulated failure in {}", function));
            return None;
        }
        Some(inner)
    }

    /// Like [`Self::enter`], but also requires an initialized console.
    fn enter_console(&self, function: &'static str, result: &mut FunctionResult) -> Option<MutexGuard<'_, Inner>> {
        let inner = self.enter(function, result)?;
        if inner.state.initialized.is_none() {
            result.mark_failed(ErrorKind::InvalidHandle, "console has not been initialized");
            return None;
        }
        Some(inner)
    }

    fn move_cursor(&self, function: &'static str, dx: i32, dy: i32, result: &mut FunctionResult) {
        if let Some(mut inner) = self.enter_console(function, result) {
            let (col, row) = inner.state.cursor;
            let col = (col as i32 + dx).clamp(0, self.size.cols as i32 - 1);
            let row = (row as i32 + dy).clamp(0, self.size.rows as i32 - 1);
            inner.state.cursor = (col as u16, row as u16);
        }
    }
}

impl ConsoleFunctions for SimulatedConsole {
    fn is_console(&self, fd: Descriptor, result: &mut FunctionResult) -> i32 {
        if self.enter("is_console", result).is_none() {
            return ConsoleType::None.code();
        }
        self.console_type(fd).code()
    }

    fn get_console_size(&self, fd: Descriptor, size: &mut MutableTerminalSize, result: &mut FunctionResult) {
        if self.enter("get_console_size", result).is_none() {
            return;
        }
        if !self.console_type(fd).is_console() {
            result.mark_failed(ErrorKind::InvalidHandle, format!("{} is not a console", fd));
            return;
        }
        size.set(self.size.cols, self.size.rows);
    }

    fn init_console(&self, fd: Descriptor, result: &mut FunctionResult) {
        let Some(mut inner) = self.enter("init_console", result) else {
            return;
        };
        if !self.console_type(fd).is_console() {
            result.mark_failed(ErrorKind::InvalidHandle, format!("{} is not a console", fd));
            return;
        }
        inner.state.initialized = Some(fd);
    }

    fn raw_input_mode(&self, result: &mut FunctionResult) {
        let Some(mut inner) = self.enter("raw_input_mode", result) else {
            return;
        };
        if !self.console_type(Descriptor::STDIN).is_console() {
            result.mark_failed(ErrorKind::InvalidHandle, "stdin is not a console");
            return;
        }
        inner.state.raw_mode = true;
    }

    fn reset_input_mode(&self, result: &mut FunctionResult) {
        if let Some(mut inner) = self.enter("reset_input_mode", result) {
            inner.state.raw_mode = false;
        }
    }

    fn read_input(&self, buffer: &mut CharInputBuffer, result: &mut FunctionResult) {
        let Some(mut inner) = self.enter("read_input", result) else {
            return;
        };
        if !inner.state.raw_mode {
            result.mark_failed(ErrorKind::InvalidHandle, "console is not in raw input mode");
            return;
        }
        if inner.end_pending {
            inner.end_pending = false;
            return;
        }
        while !buffer.is_full() {
            match inner.input.pop_front() {
                Some(CTRL_C) | Some(CTRL_D) => {
                    inner.end_pending = !buffer.is_empty();
                    break;
                }
                Some(ch) => {
                    buffer.push(ch);
                }
                None => break,
            }
        }
    }

    fn bold_on(&self, result: &mut FunctionResult) {
        if let Some(mut inner) = self.enter_console("bold_on", result) {
            inner.state.bold = true;
        }
    }

    fn bold_off(&self, result: &mut FunctionResult) {
        if let Some(mut inner) = self.enter_console("bold_off", result) {
            inner.state.bold = false;
        }
    }

    fn reset(&self, result: &mut FunctionResult) {
        if let Some(mut inner) = self.enter_console("reset", result) {
            inner.state.bold = false;
            inner.state.foreground = None;
            inner.state.cursor_visible = true;
        }
    }

    fn show_cursor(&self, result: &mut FunctionResult) {
        if let Some(mut inner) = self.enter_console("show_cursor", result) {
            inner.state.cursor_visible = true;
        }
    }

    fn hide_cursor(&self, result: &mut FunctionResult) {
        if let Some(mut inner) = self.enter_console("hide_cursor", result) {
            inner.state.cursor_visible = false;
        }
    }

    fn foreground(&self, color: u8, result: &mut FunctionResult) {
        if let Some(mut inner) = self.enter_console("foreground", result) {
            if color > 15 {
                result.mark_failed(
                    ErrorKind::UnsupportedCapability,
                    format!("color index {} is outside the ANSI palette", color),
                );
                return;
            }
            inner.state.foreground = Some(color);
        }
    }

    fn default_foreground(&self, result: &mut FunctionResult) {
        if let Some(mut inner) = self.enter_console("default_foreground", result) {
            inner.state.foreground = None;
        }
    }

    fn left(&self, count: u16, result: &mut FunctionResult) {
        self.move_cursor("left", -(count as i32), 0, result);
    }

    fn right(&self, count: u16, result: &mut FunctionResult) {
        self.move_cursor("right", count as i32, 0, result);
    }

    fn up(&self, count: u16, result: &mut FunctionResult) {
        self.move_cursor("up", 0, -(count as i32), result);
    }

    fn down(&self, count: u16, result: &mut FunctionResult) {
        self.move_cursor("down", 0, count as i32, result);
    }

    fn start_line(&self, result: &mut FunctionResult) {
        if let Some(mut inner) = self.enter_console("start_line", result) {
            inner.state.cursor.0 = 0;
        }
    }

    fn clear_to_end_of_line(&self, result: &mut FunctionResult) {
        let _ = self.enter_console("clear_to_end_of_line", result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> SimulatedConsole {
        let sim = SimulatedConsole::new(10, 5)
            .with_console(Descriptor::STDIN, ConsoleType::Native)
            .with_console(Descriptor::STDOUT, ConsoleType::Native);
        let mut result = FunctionResult::new();
        sim.init_console(Descriptor::STDOUT, &mut result);
        result.check().unwrap();
        sim
    }

    #[test]
    fn test_cursor_is_clamped_to_viewport() {
        let sim = ready();
        let mut result = FunctionResult::new();
        sim.left(3, &mut result);
        sim.right(50, &mut result);
        sim.down(50, &mut result);
        result.check().unwrap();
        assert_eq!(sim.snapshot().cursor, (9, 4));
    }

    #[test]
    fn test_ctrl_d_ends_input() {
        let sim = ready();
        sim.push_input("ab\u{4}cd");
        let mut result = FunctionResult::new();
        sim.raw_input_mode(&mut result);

        let mut buffer = CharInputBuffer::with_capacity(8);
        sim.read_input(&mut buffer, &mut result);
        assert_eq!(buffer.as_slice(), &['a', 'b']);

        let mut buffer = CharInputBuffer::with_capacity(8);
        sim.read_input(&mut buffer, &mut result);
        assert!(buffer.is_empty());

        let mut buffer = CharInputBuffer::with_capacity(8);
        sim.read_input(&mut buffer, &mut result);
        assert_eq!(buffer.as_slice(), &['c', 'd']);
        result.check().unwrap();
    }

    #[test]
    fn test_leading_ctrl_c_ends_input_at_once() {
        let sim = ready();
        sim.push_input("\u{3}x");
        let mut result = FunctionResult::new();
        sim.raw_input_mode(&mut result);

        let mut buffer = CharInputBuffer::with_capacity(8);
        sim.read_input(&mut buffer, &mut result);
        assert!(buffer.is_empty());

        let mut buffer = CharInputBuffer::with_capacity(8);
        sim.read_input(&mut buffer, &mut result);
        assert_eq!(buffer.as_slice(), &['x']);
        result.check().unwrap();
    }

    #[test]
    fn test_injected_raw_mode_failure_without_console_stdin() {
        let sim = SimulatedConsole::new(10, 5);
        sim.fail_on("raw_input_mode", ErrorKind::UnsupportedCapability);
        let mut result = FunctionResult::new();
        sim.raw_input_mode(&mut result);
        assert_eq!(result.check().unwrap_err().kind(), ErrorKind::UnsupportedCapability);
        assert_eq!(sim.call_count("raw_input_mode"), 1);
        assert!(!sim.snapshot().raw_mode);
    }

    #[test]
    fn test_injected_failure() {
        let sim = ready();
        sim.fail_on("hide_cursor", ErrorKind::Os);
        let mut result = FunctionResult::new();
        sim.hide_cursor(&mut result);
        let err = result.check().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Os);
        assert_eq!(err.message(), "simulated failure in hide_cursor");
        assert!(sim.snapshot().cursor_visible);
        assert_eq!(sim.call_count("hide_cursor"), 1);
    }

    #[test]
    fn test_raw_mode_requires_console_stdin() {
        let sim = SimulatedConsole::new(10, 5).with_console(Descriptor::STDOUT, ConsoleType::Native);
        let mut result = FunctionResult::new();
        sim.raw_input_mode(&mut result);
        assert_eq!(result.check().unwrap_err().kind(), ErrorKind::InvalidHandle);
        assert!(!sim.snapshot().raw_mode);
    }
}
