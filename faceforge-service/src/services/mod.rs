pub mod credentials;
pub mod dispatcher;
pub mod metrics;
pub mod processor;
pub mod providers;
pub mod validator;

pub use credentials::ApiKeyVerifier;
pub use dispatcher::{Dispatcher, PollSettings};
pub use processor::Processor;
