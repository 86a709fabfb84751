//! EARL facade: the `pie-item-player` custom element, wiring the Element
//! Loader, Item Player Runtime, and Tool Coordinator behind a single DOM
//! surface.

mod controller_handle;
mod tool_handle;

#[cfg(target_arch = "wasm32")]
mod element;

#[cfg(target_arch = "wasm32")]
pub use controller_handle::JsControllerHandle;
#[cfg(target_arch = "wasm32")]
pub use tool_handle::ToolCoordinatorHandle;
#[cfg(target_arch = "wasm32")]
pub use element::PieItemPlayerElement;

pub use pie_earl_loader::{DomEnvironment, ElementLoader, LoaderOptions, PackageReference};
pub use pie_earl_player::{ElementLifecycleEvent, HostEvent, ItemPlayerRuntime, MicrotaskQueue};
pub use pie_earl_tools::ToolCoordinator;
pub use pie_earl_types::{Env, ItemConfig, Mode, PlayerError, Role, SessionContainer, Strategy};
