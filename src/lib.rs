//! hostkit - uniform access to host operating-system primitives.
//!
//! One API for terminal control, file system identification and physical memory
//! statistics, with no branching on the host operating system in calling code.
//!
//! Every service sits on top of a function table trait. The table implementation talks
//! to the system and reports failures through a [`FunctionResult`]; the service turns
//! that into a [`Result`] carrying a [`NativeError`] with an [`ErrorKind`].
//!
//! ```no_run
//! use hostkit::{Config, Platform};
//!
//! # fn main() -> hostkit::Result<()> {
//! let platform = Platform::system(&Config::load());
//! let fs = platform.file_systems().file_system_info("/")?;
//! println!("/ is {} on {}", fs.file_system_type(), fs.device_name());
//!
//! let memory = platform.memory().memory_info()?;
//! println!("{} of {} bytes free", memory.free_physical_memory(), memory.total_physical_memory());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod fs;
pub mod logging;
pub mod memory;
pub mod platform;
pub mod result;

pub use config::{Config, ConfigError};
pub use error::{ErrorKind, NativeError, Result};
pub use platform::Platform;
pub use result::FunctionResult;
