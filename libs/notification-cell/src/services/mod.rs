pub mod dispatcher;
pub mod notifier;
pub mod twilio;

pub use dispatcher::*;
pub use notifier::*;
pub use twilio::*;
