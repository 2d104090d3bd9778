//! Console type detection for the three terminal models.
//!
//! - POSIX: a descriptor is a native console when it is a tty.
//! - Windows console: the standard handle is attached to a console buffer.
//! - Cygwin/MSYS: the standard handle is a named pipe created by the pty layer,
//!   `\cygwin-xxxx-from-master` for stdin and `\cygwin-xxxx-to-master` for outputs
//!   (`\msys-` for MSYS).

use std::io::{self, IsTerminal};

use crate::error::Result;

use super::types::{ConsoleType, Descriptor};

pub fn detect(fd: Descriptor) -> Result<ConsoleType> {
    fd.validate()?;
    platform::detect(fd)
}

/// Checks a pipe name against the names the Cygwin and MSYS pty layers use.
pub fn is_emulated_pipe_name(name: &str, is_input: bool) -> bool {
    if !(name.starts_with("\\cygwin-") || name.starts_with("\\msys-")) {
        return false;
    }
    if is_input {
        name.contains("-from-master")
    } else {
        name.contains("-to-master")
    }
}

fn std_is_terminal(fd: Descriptor) -> Option<bool> {
    match fd {
        Descriptor::STDIN => Some(io::stdin().is_terminal()),
        Descriptor::STDOUT => Some(io::stdout().is_terminal()),
        Descriptor::STDERR => Some(io::stderr().is_terminal()),
        _ => None,
    }
}

#[cfg(unix)]
mod platform {
    use std::io::IsTerminal;
    use std::os::fd::BorrowedFd;

    use super::*;

    pub fn detect(fd: Descriptor) -> Result<ConsoleType> {
        let is_tty = match std_is_terminal(fd) {
            Some(is_tty) => is_tty,
            None => {
                // SAFETY: the borrow ends with this statement and isatty reports a closed
                // descriptor as "not a tty" instead of touching it.
                let borrowed = unsafe { BorrowedFd::borrow_raw(fd.raw()) };
                borrowed.is_terminal()
            }
        };
        Ok(if is_tty { ConsoleType::Native } else { ConsoleType::None })
    }
}

#[cfg(windows)]
mod platform {
    use std::ffi::c_void;

    use windows::Win32::Foundation::MAX_PATH;
    use windows::Win32::Storage::FileSystem::{
        FileNameInfo, GetFileInformationByHandleEx, GetFileType, FILE_NAME_INFO, FILE_TYPE_PIPE,
    };
    use windows::Win32::System::Console::{
        GetStdHandle, STD_ERROR_HANDLE, STD_HANDLE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
    };

    use super::*;
    use crate::error::{ErrorKind, NativeError};

    fn std_handle(fd: Descriptor) -> Option<STD_HANDLE> {
        match fd {
            Descriptor::STDIN => Some(STD_INPUT_HANDLE),
            Descriptor::STDOUT => Some(STD_OUTPUT_HANDLE),
            Descriptor::STDERR => Some(STD_ERROR_HANDLE),
            _ => None,
        }
    }

    pub fn detect(fd: Descriptor) -> Result<ConsoleType> {
        let Some(which) = std_handle(fd) else {
            return Err(NativeError::new(
                ErrorKind::UnsupportedCapability,
                format!("console detection is only available for standard handles, not {}", fd),
            ));
        };
        let handle = unsafe { GetStdHandle(which) }.map_err(|e| {
            NativeError::with_code(ErrorKind::InvalidHandle, "could not get console handle", Some(e.code().0))
        })?;
        if handle.is_invalid() {
            return Err(NativeError::new(ErrorKind::InvalidHandle, "could not get console handle"));
        }

        if unsafe { GetFileType(handle) } == FILE_TYPE_PIPE {
            // FILE_NAME_INFO is a length followed by the UTF-16 name; u32 keeps it aligned.
            let mut buffer = vec![0u32; (std::mem::size_of::<FILE_NAME_INFO>() / 4) + MAX_PATH as usize];
            unsafe {
                GetFileInformationByHandleEx(
                    handle,
                    FileNameInfo,
                    buffer.as_mut_ptr() as *mut c_void,
                    (buffer.len() * 4) as u32,
                )
            }
            .map_err(|e| {
                NativeError::with_code(ErrorKind::Os, "could not get handle file information", Some(e.code().0))
            })?;
            let info = unsafe { &*(buffer.as_ptr() as *const FILE_NAME_INFO) };
            let len = info.FileNameLength as usize / 2;
            let name = unsafe { std::slice::from_raw_parts(info.FileName.as_ptr(), len) };
            let name = String::from_utf16_lossy(name);
            let emulated = is_emulated_pipe_name(&name, fd == Descriptor::STDIN);
            return Ok(if emulated { ConsoleType::Emulated } else { ConsoleType::None });
        }

        let is_console = std_is_terminal(fd).unwrap_or(false);
        Ok(if is_console { ConsoleType::Native } else { ConsoleType::None })
    }
}

#[cfg(not(any(unix, windows)))]
mod platform {
    use super::*;
    use crate::error::{ErrorKind, NativeError};

    pub fn detect(fd: Descriptor) -> Result<ConsoleType> {
        match std_is_terminal(fd) {
            Some(true) => Ok(ConsoleType::Native),
            Some(false) => Ok(ConsoleType::None),
            None => Err(NativeError::new(
                ErrorKind::UnsupportedCapability,
                format!("console detection is not available for {}", fd),
            )),
        }
    }
}
