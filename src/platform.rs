//! Wiring of the three services to their backends.

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::console::{Console, ConsoleFunctions, Descriptor, TerminalConsole};
use crate::fs::{self, FileSystemFunctions, FileSystems};
use crate::memory::{Memory, MemoryFunctions, SystemMemory};

#[derive(Clone)]
pub struct Platform {
    console: Console,
    file_systems: FileSystems,
    memory: Memory,
    output: Descriptor,
}

impl Platform {
    /// Services backed by the running system.
    pub fn system(config: &Config) -> Self {
        debug!(
            "Wiring system backends (output {}, mount table {})",
            config.console.output.descriptor(),
            config.file_system.mount_table.display()
        );
        Self::with_functions(
            Arc::new(TerminalConsole::new()),
            fs::system_functions(&config.file_system),
            Arc::new(SystemMemory),
            config,
        )
    }

    pub fn with_functions(
        console: Arc<dyn ConsoleFunctions>,
        file_systems: Arc<dyn FileSystemFunctions>,
        memory: Arc<dyn MemoryFunctions>,
        config: &Config,
    ) -> Self {
        Self {
            console: Console::with_input_capacity(console, config.console.input_buffer_capacity),
            file_systems: FileSystems::new(file_systems),
            memory: Memory::new(memory),
            output: config.console.output.descriptor(),
        }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn file_systems(&self) -> &FileSystems {
        &self.file_systems
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Descriptor `Console::initialize` should be given.
    pub fn output(&self) -> Descriptor {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleOutput;
    use crate::console::{ConsoleType, SimulatedConsole};
    use crate::error::ErrorKind;
    use crate::fs::FileSystemList;
    use crate::memory::MutableMemoryInfo;
    use crate::result::FunctionResult;

    struct NoMounts;

    impl FileSystemFunctions for NoMounts {
        fn list_file_systems(&self, _list: &mut FileSystemList, _result: &mut FunctionResult) {}
    }

    struct NoMemory;

    impl MemoryFunctions for NoMemory {
        fn get_memory_info(&self, _info: &mut MutableMemoryInfo, result: &mut FunctionResult) {
            result.mark_failed(ErrorKind::UnsupportedCapability, "no memory statistics");
        }
    }

    #[test]
    fn test_with_functions_applies_config() {
        let mut config = Config::default();
        config.console.input_buffer_capacity = 2;
        config.console.output = ConsoleOutput::Stderr;

        let simulated = Arc::new(
            SimulatedConsole::new(80, 24)
                .with_console(Descriptor::STDIN, ConsoleType::Native)
                .with_console(Descriptor::STDERR, ConsoleType::Native),
        );
        simulated.push_input("abcd");
        let platform = Platform::with_functions(simulated, Arc::new(NoMounts), Arc::new(NoMemory), &config);

        assert_eq!(platform.output(), Descriptor::STDERR);
        platform.console().initialize(platform.output()).unwrap();
        let guard = platform.console().raw_mode().unwrap();
        assert_eq!(platform.console().read_input().unwrap(), vec!['a', 'b']);
        guard.restore().unwrap();

        assert!(platform.file_systems().file_systems().unwrap().is_empty());
        let err = platform.memory().memory_info().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedCapability);
    }

    #[test]
    fn test_system_root_file_system() {
        let platform = Platform::system(&Config::default());
        let root = if cfg!(windows) { "C:\\" } else { "/" };
        match platform.file_systems().file_system_info(root) {
            Ok(info) => {
                assert!(!info.mount_point().as_os_str().is_empty());
                assert!(!info.device_name().is_empty());
                assert!(!info.file_system_type().is_empty());
            }
            Err(e) => assert!(matches!(
                e.kind(),
                ErrorKind::UnsupportedCapability | ErrorKind::ResolutionFailure | ErrorKind::Os
            )),
        }
    }

    #[test]
    fn test_system_memory() {
        let platform = Platform::system(&Config::default());
        if let Ok(info) = platform.memory().memory_info() {
            assert!(info.free_physical_memory() <= info.total_physical_memory());
        }
    }
}
