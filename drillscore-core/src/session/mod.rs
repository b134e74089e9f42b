//! Live session management
//!
//! - [`SessionRegistry`] owns every live evaluator, keyed by [`SessionKey`]
//! - [`SessionSweeper`] reclaims sessions that never receive an `end`
//! - [`Finalizer`] turns a live session into a persisted summary

mod config;
mod finalizer;
mod registry;
mod requests;
mod sweeper;

pub use config::{
    DEFAULT_IDLE_TIMEOUT, DEFAULT_SWEEP_INTERVAL, DuplicateStartPolicy, RegistryConfig,
};
pub use finalizer::{FinalizedSession, Finalizer};
pub use registry::{LiveSession, SessionHandle, SessionKey, SessionRegistry};
pub use requests::{
    EndRequest, MIN_SESSION_ID_LEN, StartRequest, from_json, parse_timestamp,
};
pub use sweeper::SessionSweeper;
