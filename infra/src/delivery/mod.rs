//! OTP delivery channels
//!
//! - `LogDispatcher` writes deliveries to the structured log (development, tests)
//! - `ChannelRouter` picks the dispatcher for a contact's kind (email or phone)

mod log_dispatcher;
mod router;

pub use log_dispatcher::LogDispatcher;
pub use router::ChannelRouter;
