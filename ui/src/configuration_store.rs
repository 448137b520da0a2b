//! Defines the observable mapping state shared by the admin views.

use std::ops::Deref;
use std::sync::Arc;

use api::ApiError;
use api::ConfigurationProvider;
use api::Mapping;
use api::MappingId;
use api::MappingTable;
use tokio::sync::watch;
use tracing::debug;

/// Whether the store has received any data yet.
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::EnumIs)]
pub enum StoreState {
    /// Nothing loaded since the store was created.
    Empty,
    /// At least one server response has been applied.
    Loaded,
}

/// What `ConfigurationStore::update_mapping` did.
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::EnumIs)]
pub enum UpdateOutcome {
    /// A write was sent and the table was rebuilt from its response.
    Updated,
    /// No mapping needed the change, so no request was sent.
    Unchanged,
}

/// An immutable view of the store at one point in time.
///
/// `generation` counts table replacements; `0` means nothing was loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreSnapshot {
    table: Arc<MappingTable>,
    generation: u64,
}

impl StoreSnapshot {
    pub fn table(&self) -> &Arc<MappingTable> {
        &self.table
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> StoreState {
        if self.generation == 0 {
            StoreState::Empty
        } else {
            StoreState::Loaded
        }
    }
}

impl Deref for StoreSnapshot {
    type Target = MappingTable;

    fn deref(&self) -> &Self::Target {
        &self.table
    }
}

/// Holds the origin-grouped mapping table and keeps it in sync with the
/// admin server.
///
/// The table is only ever replaced whole, from a successful server response.
/// A failed request leaves it untouched and hands the error back to the
/// caller. Readers take cheap snapshots or subscribe to be woken after each
/// replacement.
///
/// Concurrent `fetch` and `update_mapping` calls are not ordered against each
/// other: whichever response is applied last wins.
pub struct ConfigurationStore<P> {
    provider: P,
    snapshot: watch::Sender<StoreSnapshot>,
}

impl<P: ConfigurationProvider> ConfigurationStore<P> {
    /// Creates an empty store that talks to `provider`.
    pub fn new(provider: P) -> Self {
        let (snapshot, _) = watch::channel(StoreSnapshot::default());
        Self { provider, snapshot }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Returns the current table.
    pub fn mappings(&self) -> Arc<MappingTable> {
        self.snapshot.borrow().table.clone()
    }

    pub fn state(&self) -> StoreState {
        self.snapshot.borrow().state()
    }

    /// Returns a receiver that is notified after every table replacement.
    ///
    /// The receiver starts out having seen the current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshot.subscribe()
    }

    /// Reloads the whole table from the server.
    pub async fn fetch(&self) -> Result<(), ApiError> {
        let data = self.provider.fetch_mappings().await?;
        self.set_mappings_from_data(data);
        Ok(())
    }

    /// Sets the `active` flag of the mapping with `id` to `status`.
    ///
    /// Only the first mapping with this id whose flag differs from `status`
    /// is considered, scanning origins in table order. If there is none, no
    /// request is sent. Otherwise one write is sent and the table is rebuilt
    /// from the server's answer.
    pub async fn update_mapping(
        &self,
        id: &MappingId,
        status: bool,
    ) -> Result<UpdateOutcome, ApiError> {
        let target = match self.mappings().find_mismatched(id, status) {
            Some(mapping) => mapping.mapping_id.clone(),
            None => return Ok(UpdateOutcome::Unchanged),
        };

        let data = self.provider.set_mapping_active(&target, status).await?;
        self.set_mappings_from_data(data);
        Ok(UpdateOutcome::Updated)
    }

    /// Groups `data` by origin and swaps it in as the new table.
    ///
    /// Subscribers are notified before this returns.
    pub fn set_mappings_from_data(&self, data: Vec<Mapping>) {
        let table = Arc::new(MappingTable::from_mappings(data));
        let (count, origins) = (table.len(), table.group_count());

        self.snapshot.send_modify(|snapshot| {
            snapshot.table = table;
            snapshot.generation += 1;
        });

        debug!(
            mappings = count,
            origins,
            generation = self.snapshot.borrow().generation,
            "mapping table replaced"
        );
    }
}
