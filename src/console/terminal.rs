//! Console backend for real terminals, built on crossterm.
//!
//! Covers native Windows consoles, POSIX ttys and Cygwin/MSYS ptys. Detection lives in
//! [`super::detect`]; everything that writes goes through crossterm commands to the stream
//! passed to `init_console`.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveDown, MoveLeft, MoveRight, MoveToColumn, MoveUp, Show};
use crossterm::event::{self, Event};
use crossterm::queue;
use crossterm::style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use tracing::{debug, info};

use crate::error::ErrorKind;
use crate::result::FunctionResult;

use super::buffer::CharInputBuffer;
use super::detect;
use super::functions::ConsoleFunctions;
use super::keys::{KeyInput, KeyTranslator};
use super::types::{ConsoleType, Descriptor, MutableTerminalSize};

/// crossterm colors for palette entries 0-15.
const PALETTE: [Color; 16] = [
    Color::Black,
    Color::DarkRed,
    Color::DarkGreen,
    Color::DarkYellow,
    Color::DarkBlue,
    Color::DarkMagenta,
    Color::DarkCyan,
    Color::Grey,
    Color::DarkGrey,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::White,
];

pub fn palette_color(index: u8) -> Option<Color> {
    PALETTE.get(index as usize).copied()
}

#[derive(Default)]
struct TerminalState {
    /// Stream attribute and cursor commands are written to.
    output: Option<Descriptor>,
    /// Characters read from a key event that did not fit the caller's buffer.
    pending: VecDeque<char>,
    /// Ctrl-C or Ctrl-D arrived behind other input; the next read reports end of input.
    end_pending: bool,
}

#[derive(Default)]
pub struct TerminalConsole {
    state: Mutex<TerminalState>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TerminalState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Classifies `fd`, failing the call when it is not a console.
    fn require_console(fd: Descriptor, result: &mut FunctionResult) -> Option<ConsoleType> {
        match detect::detect(fd) {
            Ok(ConsoleType::None) => {
                result.mark_failed(ErrorKind::InvalidHandle, format!("{} is not a console", fd));
                None
            }
            Ok(console_type) => Some(console_type),
            Err(e) => {
                result.mark_failed(e.kind(), e.message());
                None
            }
        }
    }

    /// Queues commands on the initialized console and flushes them.
    fn write_commands(
        &self,
        what: &str,
        result: &mut FunctionResult,
        commands: impl FnOnce(&mut ConsoleWriter) -> io::Result<()>,
    ) {
        let Some(fd) = self.lock().output else {
            result.mark_failed(ErrorKind::InvalidHandle, "console has not been initialized");
            return;
        };
        if let Err(e) = with_writer(fd, commands) {
            result.mark_failed_with_io(&format!("could not {}", what), &e);
        }
    }

    /// Moves characters left over from earlier reads into `buffer`.
    ///
    /// Returns `true` when the read is complete without waiting for new events.
    fn take_pending(&self, buffer: &mut CharInputBuffer) -> bool {
        let mut state = self.lock();
        while !buffer.is_full() {
            match state.pending.pop_front() {
                Some(ch) => {
                    buffer.push(ch);
                }
                None => break,
            }
        }
        if buffer.is_full() {
            return true;
        }
        if state.end_pending {
            if buffer.is_empty() {
                state.end_pending = false;
            }
            return true;
        }
        false
    }

    /// Fills `buffer` from key events. `next_event(true)` blocks for an event,
    /// `next_event(false)` returns only an event that is already queued.
    fn collect_events(
        &self,
        buffer: &mut CharInputBuffer,
        mut next_event: impl FnMut(bool) -> io::Result<Option<Event>>,
    ) -> io::Result<()> {
        let mut overflow = Vec::new();
        let mut ended = false;
        loop {
            let Some(event) = next_event(buffer.is_empty() && overflow.is_empty())? else {
                break;
            };
            let chars: Vec<char> = match event {
                Event::Key(key) => match KeyTranslator::translate(&key) {
                    KeyInput::Chars(chars) => chars,
                    KeyInput::End => {
                        ended = !buffer.is_empty();
                        break;
                    }
                    KeyInput::Ignored => continue,
                },
                Event::Paste(text) => text.chars().collect(),
                _ => continue,
            };
            for ch in chars {
                if !buffer.push(ch) {
                    overflow.push(ch);
                }
            }
            if buffer.is_full() {
                break;
            }
        }
        if !overflow.is_empty() || ended {
            debug!("Keeping {} characters for the next read (end: {})", overflow.len(), ended);
            let mut state = self.lock();
            state.pending.extend(overflow);
            state.end_pending |= ended;
        }
        Ok(())
    }
}

fn next_terminal_event(wait: bool) -> io::Result<Option<Event>> {
    if wait || event::poll(Duration::ZERO)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Stream a console's commands are written to.
enum ConsoleWriter {
    Stdout(io::StdoutLock<'static>),
    Stderr(io::StderrLock<'static>),
    #[cfg(unix)]
    Raw(std::mem::ManuallyDrop<std::fs::File>),
}

impl ConsoleWriter {
    fn open(fd: Descriptor) -> io::Result<Self> {
        match fd {
            Descriptor::STDOUT => Ok(ConsoleWriter::Stdout(io::stdout().lock())),
            Descriptor::STDERR => Ok(ConsoleWriter::Stderr(io::stderr().lock())),
            _ => Self::open_raw(fd),
        }
    }

    #[cfg(unix)]
    fn open_raw(fd: Descriptor) -> io::Result<Self> {
        use std::os::fd::FromRawFd;

        // SAFETY: the descriptor belongs to the caller; ManuallyDrop keeps it open.
        let file = unsafe { std::fs::File::from_raw_fd(fd.raw()) };
        Ok(ConsoleWriter::Raw(std::mem::ManuallyDrop::new(file)))
    }

    #[cfg(not(unix))]
    fn open_raw(fd: Descriptor) -> io::Result<Self> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("writing to {} is not supported on this platform", fd),
        ))
    }
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            ConsoleWriter::Stdout(out) => out.write(buf),
            ConsoleWriter::Stderr(err) => err.write(buf),
            #[cfg(unix)]
            ConsoleWriter::Raw(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            ConsoleWriter::Stdout(out) => out.flush(),
            ConsoleWriter::Stderr(err) => err.flush(),
            #[cfg(unix)]
            ConsoleWriter::Raw(file) => file.flush(),
        }
    }
}

fn with_writer(fd: Descriptor, commands: impl FnOnce(&mut ConsoleWriter) -> io::Result<()>) -> io::Result<()> {
    let mut writer = ConsoleWriter::open(fd)?;
    commands(&mut writer)?;
    writer.flush()
}

/// Size of an emulated console that crossterm cannot query, from `COLUMNS`/`LINES`.
fn size_from_env() -> Option<(u16, u16)> {
    let cols = std::env::var("COLUMNS").ok()?.trim().parse().ok()?;
    let rows = std::env::var("LINES").ok()?.trim().parse().ok()?;
    Some((cols, rows))
}

impl ConsoleFunctions for TerminalConsole {
    fn is_console(&self, fd: Descriptor, result: &mut FunctionResult) -> i32 {
        match detect::detect(fd) {
            Ok(console_type) => console_type.code(),
            Err(e) => {
                result.mark_failed(e.kind(), e.message());
                ConsoleType::None.code()
            }
        }
    }

    /// crossterm measures the controlling terminal, so every console descriptor of the
    /// process reports that terminal's size.
    fn get_console_size(&self, fd: Descriptor, size: &mut MutableTerminalSize, result: &mut FunctionResult) {
        let Some(console_type) = Self::require_console(fd, result) else {
            return;
        };
        match terminal::size() {
            Ok((cols, rows)) => size.set(cols, rows),
            Err(e) => match size_from_env() {
                Some((cols, rows)) if console_type == ConsoleType::Emulated => size.set(cols, rows),
                _ => result.mark_failed_with_io("could not get console size", &e),
            },
        }
    }

    fn init_console(&self, fd: Descriptor, result: &mut FunctionResult) {
        let Some(console_type) = Self::require_console(fd, result) else {
            return;
        };
        let mut state = self.lock();
        if state.output != Some(fd) {
            info!("Initialized {:?} console on {}", console_type, fd);
            state.output = Some(fd);
        }
    }

    fn raw_input_mode(&self, result: &mut FunctionResult) {
        if Self::require_console(Descriptor::STDIN, result).is_none() {
            return;
        }
        match terminal::enable_raw_mode() {
            Ok(()) => debug!("Entered raw input mode"),
            Err(e) => result.mark_failed_with_io("could not set console input mode", &e),
        }
    }

    /// Raw mode belongs to the process, so this leaves it whichever backend entered it.
    fn reset_input_mode(&self, result: &mut FunctionResult) {
        match terminal::is_raw_mode_enabled() {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                result.mark_failed_with_io("could not query console input mode", &e);
                return;
            }
        }
        match terminal::disable_raw_mode() {
            Ok(()) => debug!("Restored cooked input mode"),
            Err(e) => result.mark_failed_with_io("could not restore console input mode", &e),
        }
    }

    fn read_input(&self, buffer: &mut CharInputBuffer, result: &mut FunctionResult) {
        match terminal::is_raw_mode_enabled() {
            Ok(true) => {}
            Ok(false) => {
                result.mark_failed(ErrorKind::InvalidHandle, "console is not in raw input mode");
                return;
            }
            Err(e) => {
                result.mark_failed_with_io("could not query console input mode", &e);
                return;
            }
        }

        if self.take_pending(buffer) {
            return;
        }
        if let Err(e) = self.collect_events(buffer, next_terminal_event) {
            result.mark_failed_with_io("could not read from console", &e);
        }
    }

    fn bold_on(&self, result: &mut FunctionResult) {
        self.write_commands("set text attributes", result, |w| {
            queue!(w, SetAttribute(Attribute::Bold))?;
            Ok(())
        });
    }

    fn bold_off(&self, result: &mut FunctionResult) {
        self.write_commands("set text attributes", result, |w| {
            queue!(w, SetAttribute(Attribute::NormalIntensity))?;
            Ok(())
        });
    }

    fn reset(&self, result: &mut FunctionResult) {
        self.write_commands("reset console", result, |w| {
            queue!(w, SetAttribute(Attribute::Reset), ResetColor, Show)?;
            Ok(())
        });
    }

    fn show_cursor(&self, result: &mut FunctionResult) {
        self.write_commands("show cursor", result, |w| {
            queue!(w, Show)?;
            Ok(())
        });
    }

    fn hide_cursor(&self, result: &mut FunctionResult) {
        self.write_commands("hide cursor", result, |w| {
            queue!(w, Hide)?;
            Ok(())
        });
    }

    fn foreground(&self, color: u8, result: &mut FunctionResult) {
        let Some(color) = palette_color(color) else {
            result.mark_failed(
                ErrorKind::UnsupportedCapability,
                format!("color index {} is outside the ANSI palette", color),
            );
            return;
        };
        self.write_commands("set text attributes", result, |w| {
            queue!(w, SetForegroundColor(color))?;
            Ok(())
        });
    }

    fn default_foreground(&self, result: &mut FunctionResult) {
        self.write_commands("set text attributes", result, |w| {
            queue!(w, SetForegroundColor(Color::Reset))?;
            Ok(())
        });
    }

    fn left(&self, count: u16, result: &mut FunctionResult) {
        self.write_commands("set cursor position", result, |w| {
            queue!(w, MoveLeft(count))?;
            Ok(())
        });
    }

    fn right(&self, count: u16, result: &mut FunctionResult) {
        self.write_commands("set cursor position", result, |w| {
            queue!(w, MoveRight(count))?;
            Ok(())
        });
    }

    fn up(&self, count: u16, result: &mut FunctionResult) {
        self.write_commands("set cursor position", result, |w| {
            queue!(w, MoveUp(count))?;
            Ok(())
        });
    }

    fn down(&self, count: u16, result: &mut FunctionResult) {
        self.write_commands("set cursor position", result, |w| {
            queue!(w, MoveDown(count))?;
            Ok(())
        });
    }

    fn start_line(&self, result: &mut FunctionResult) {
        self.write_commands("set cursor position", result, |w| {
            queue!(w, MoveToColumn(0))?;
            Ok(())
        });
    }

    fn clear_to_end_of_line(&self, result: &mut FunctionResult) {
        self.write_commands("clear to end of line", result, |w| {
            queue!(w, Clear(ClearType::UntilNewLine))?;
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_palette() {
        assert_eq!(palette_color(0), Some(Color::Black));
        assert_eq!(palette_color(1), Some(Color::DarkRed));
        assert_eq!(palette_color(9), Some(Color::Red));
        assert_eq!(palette_color(15), Some(Color::White));
        assert_eq!(palette_color(16), None);
    }

    #[test]
    fn test_commands_need_initialized_console() {
        let backend = TerminalConsole::new();
        let mut result = FunctionResult::new();
        backend.bold_on(&mut result);
        assert_eq!(result.check().unwrap_err().kind(), ErrorKind::InvalidHandle);

        let mut result = FunctionResult::new();
        backend.left(2, &mut result);
        assert_eq!(result.check().unwrap_err().kind(), ErrorKind::InvalidHandle);
    }

    #[test]
    fn test_reset_without_raw_mode_is_noop() {
        let backend = TerminalConsole::new();
        let mut result = FunctionResult::new();
        backend.reset_input_mode(&mut result);
        backend.reset_input_mode(&mut result);
        assert!(result.check().is_ok());
    }

    #[test]
    fn test_raw_mode_is_left_through_any_backend() {
        let first = TerminalConsole::new();
        let second = TerminalConsole::new();

        let mut result = FunctionResult::new();
        first.raw_input_mode(&mut result);
        if result.check().is_err() {
            // stdin is not a terminal here; nothing to leave.
            return;
        }
        let mut result = FunctionResult::new();
        second.reset_input_mode(&mut result);
        result.check().unwrap();
        assert!(!terminal::is_raw_mode_enabled().unwrap());
    }

    fn key(ch: char, mods: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(ch), mods))
    }

    fn script(events: Vec<Event>) -> impl FnMut(bool) -> io::Result<Option<Event>> {
        let mut events = VecDeque::from(events);
        move |_wait| Ok(events.pop_front())
    }

    fn read(backend: &TerminalConsole, capacity: usize, events: Vec<Event>) -> Vec<char> {
        let mut buffer = CharInputBuffer::with_capacity(capacity);
        if !backend.take_pending(&mut buffer) {
            backend.collect_events(&mut buffer, script(events)).unwrap();
        }
        buffer.into_chars()
    }

    #[test]
    fn test_end_after_input_is_its_own_read() {
        let backend = TerminalConsole::new();
        let events = vec![
            key('a', KeyModifiers::NONE),
            key('b', KeyModifiers::NONE),
            key('d', KeyModifiers::CONTROL),
            key('c', KeyModifiers::NONE),
        ];
        assert_eq!(read(&backend, 8, events), vec!['a', 'b']);
        assert!(read(&backend, 8, vec![key('c', KeyModifiers::NONE)]).is_empty());
        assert_eq!(read(&backend, 8, vec![key('c', KeyModifiers::NONE)]), vec!['c']);
    }

    #[test]
    fn test_end_on_empty_read() {
        let backend = TerminalConsole::new();
        assert!(read(&backend, 8, vec![key('c', KeyModifiers::CONTROL)]).is_empty());
        assert_eq!(read(&backend, 8, vec![key('x', KeyModifiers::NONE)]), vec!['x']);
    }

    #[test]
    fn test_overflow_is_kept_for_next_read() {
        let backend = TerminalConsole::new();
        let events = vec![Event::Key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE))];
        assert_eq!(read(&backend, 2, events), vec!['\u{1b}', '[']);
        assert_eq!(read(&backend, 2, Vec::new()), vec!['A']);
    }

    #[test]
    fn test_out_of_palette_foreground() {
        let backend = TerminalConsole::new();
        let mut result = FunctionResult::new();
        backend.foreground(200, &mut result);
        assert_eq!(result.check().unwrap_err().kind(), ErrorKind::UnsupportedCapability);
    }

    #[cfg(unix)]
    #[test]
    fn test_regular_file_descriptor() {
        use std::os::fd::AsRawFd;

        let file = tempfile::tempfile().unwrap();
        let fd = Descriptor::new(file.as_raw_fd());
        let backend = TerminalConsole::new();

        let mut result = FunctionResult::new();
        assert_eq!(backend.is_console(fd, &mut result), ConsoleType::None.code());
        assert!(result.check().is_ok());

        let mut size = MutableTerminalSize::default();
        let mut result = FunctionResult::new();
        backend.get_console_size(fd, &mut size, &mut result);
        assert_eq!(result.check().unwrap_err().kind(), ErrorKind::InvalidHandle);

        let mut result = FunctionResult::new();
        backend.init_console(fd, &mut result);
        assert_eq!(result.check().unwrap_err().kind(), ErrorKind::InvalidHandle);
    }
}
