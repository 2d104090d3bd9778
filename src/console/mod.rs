//! Console control.
//!
//! - **service**: [`Console`], the caller-facing operations returning [`crate::Result`]
//! - **functions**: the [`ConsoleFunctions`] table backends implement
//! - **terminal**: crossterm backend for real terminals
//! - **simulated**: in-memory backend with scripted input
//!
//! # Architecture
//!
//! ```text
//! Console (stateless, Clone)
//! └── Arc<dyn ConsoleFunctions>
//!     ├── TerminalConsole (crossterm, IsTerminal, Win32 pipe names)
//!     └── SimulatedConsole (in-memory)
//! ```

pub mod buffer;
pub mod detect;
pub mod functions;
pub mod keys;
pub mod service;
pub mod simulated;
pub mod terminal;
pub mod types;

pub use buffer::CharInputBuffer;
pub use functions::ConsoleFunctions;
pub use service::{Console, RawModeGuard};
pub use simulated::{SimulatedConsole, SimulatedState};
pub use terminal::TerminalConsole;
pub use types::{AnsiColor, ConsoleType, Descriptor, MutableTerminalSize, TerminalSize};
