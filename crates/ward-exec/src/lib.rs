mod error;
pub use error::ExecError;

mod limits;
pub use limits::{RlimitConfig, attach_rlimits};

mod command;
pub use command::{ExecutorSpec, executor_command};

mod process;
pub use process::ExecutorProcess;

mod probe;
pub use probe::{is_pid_alive, is_port_open, wait_port_closed, wait_port_open};
