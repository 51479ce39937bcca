//! Flux: view-state engine for the Inovoid client.
//!
//! Rust owns the state and the logic; a platform shell only renders.
//! Views bind to typed states stored at fixed paths (`notif/badge`,
//! `auth/nav`, `theme/state`, ...) and send user input back as typed
//! requests (`notif/toggle`, `auth/sign-in`, ...).
//!
//! Paths use `/` as separator. Subscriptions and request handlers accept
//! MQTT-style wildcards: `+` for one level, `#` for the rest.

pub mod app;
pub mod router;
pub mod store;
pub mod topic;
pub mod value;

pub use app::Flux;
pub use router::{BoxFuture, Router};
pub use store::{ChangeHandler, StateStore};
pub use value::{Request, State, StateValue, SubscriptionId};
