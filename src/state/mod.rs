//! State module for admission control
//!
//! # Components
//!
//! - `HostState`: one host's seen set, blacklist flag and failure backoff
//! - `Admission` / `DropReason`: the outcome of an admission decision

mod host_state;

pub use host_state::{Admission, DropReason, HostState};
