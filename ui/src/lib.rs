// The client-side state for the proxy admin views.

mod configuration_store;

pub use configuration_store::ConfigurationStore;
pub use configuration_store::StoreSnapshot;
pub use configuration_store::StoreState;
pub use configuration_store::UpdateOutcome;
