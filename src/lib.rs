//! Client library of the job-placement marketplace: REST wrappers, session
//! state, form validation and the real-time chat layer.

pub mod client;
pub mod common;
pub mod utils;
