//! Registration wizard - the session state machine and its HTTP surface.
//!
//! - `session` - steps, transitions and the dispatch hooks
//! - `handlers` - actix handlers and route registration
//! - `multipart_parser` - reads uploaded files

pub mod handlers;
pub mod multipart_parser;
pub mod session;


pub use handlers::{config, EmailConfigRequest, SessionView, SetupRequest};
pub use session::{
    DispatchJob, DispatchStatus, RegistrationSession, Step, WizardError, DEFAULT_RECIPIENTS,
};
