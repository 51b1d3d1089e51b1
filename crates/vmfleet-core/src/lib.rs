pub mod error;
pub mod provider;
pub mod state;
pub mod version;

pub use error::{BatchError, ProviderError, ProviderResult};
pub use provider::{
    ConnectInfo, ConnectorConfig, InstanceGroup, Protocol, ProviderInfo, Settings, UpdateFn,
};
pub use state::State;
pub use version::VersionInfo;
