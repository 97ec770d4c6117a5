//! batedor_agent: metric sampling, derivation and distribution for the batedor dashboard.

pub mod display;
pub mod distributor;
pub mod history;
pub mod hub;
pub mod probe;
pub mod proto;
pub mod provider;
pub mod rate;
pub mod sampler;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod types;
pub mod ws;

pub use distributor::Distributor;
pub use hub::{BroadcastHub, HubHandle};
pub use sampler::Sampler;
pub use scheduler::{Cadence, PeriodicScheduler};
pub use types::Snapshot;
