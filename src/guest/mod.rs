//! Guest records collected by the wizard.

pub mod model;

pub use model::{stay_duration, GuestRecord, GuestUpdate, GuestView, StayDuration};
