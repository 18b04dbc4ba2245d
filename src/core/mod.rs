//! Core building blocks: service parameters, request construction, the
//! long-running operation wire types and the blocking poll loop. These are
//! consumed by the high-level `api` module.
pub mod operation;
pub mod params;
pub mod poller;
pub mod request;
