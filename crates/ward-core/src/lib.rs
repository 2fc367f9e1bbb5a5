mod error;
pub use error::{CallerError, SupervisorError};

pub mod system;

mod registry;
pub use registry::{StartSlot, TaskRecord, TaskRegistry};

mod port;
pub use port::{PortAllocator, PortError};

mod supervisor;
pub use supervisor::{SupervisorConfig, TaskSupervisor};

mod proxy;
pub use proxy::SupervisorProxy;

mod caller;
pub use caller::{JobCaller, JobEventHandler, NoopJobEventHandler, PollConfig};
