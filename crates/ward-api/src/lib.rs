mod error;
pub use error::ApiError;

mod handler;
pub use handler::CommandHandler;

mod adapter;
pub use adapter::SupervisorAdapter;

mod http;
pub use http::HttpApi;

mod server;
pub use server::SupervisorApplication;
