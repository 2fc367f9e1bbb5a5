mod domain;
pub use domain::{JobContext, JobId, ProcessConfig, env_keys};

mod endpoint;
pub use endpoint::{ExecutorEndpoint, SupervisorEndpoint};

mod protocol;
pub use protocol::{CommandKind, PROTOCOL_VERSION, ProtocolError, TaskCallerResult, TaskCommand};
