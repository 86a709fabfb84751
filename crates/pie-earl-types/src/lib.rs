//! Shared data model for EARL: Item Config, Element Map, Session Container,
//! Env, the Controller contract, Registered Tag Records, a client-side
//! mirror of the LMP Readiness Snapshot, and the EARL error taxonomy.

mod controller;
mod env;
mod error;
mod item_config;
mod readiness;
mod registry;
mod session;

pub use controller::Controller;
pub use env::{Env, Mode, Role};
pub use error::{PlayerError, PlayerErrorEvent};
pub use item_config::{ElementMap, ItemConfig, ItemConfigError, ModelEntry};
pub use readiness::ReadinessSnapshot;
pub use registry::{LoadState, RegisteredTagRecord, Strategy};
pub use session::{SessionContainer, SessionEntry};
