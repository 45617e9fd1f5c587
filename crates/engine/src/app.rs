//! Application state and composition.

use std::sync::Arc;

use castline_domain::{Catalog, SeasonCalendar};

use crate::infrastructure::{
    clock::{RuntimeClock, SeededRandom, SystemRandom},
    config::EngineConfig,
    environment::WeatherEnvironment,
    ledger::InMemoryLedger,
    ports::{ClockPort, RandomPort, SnapshotStorePort},
    presenter::BroadcastPresenter,
};
use crate::stores::{DiscoveryStore, SessionRegistry};
use crate::use_cases;
use crate::use_cases::fishing::{
    FishingPorts, FishingQueries, ResourceSettlement, StageController,
};

/// Main application state.
///
/// Passed to HTTP/WebSocket handlers via Axum state.
pub struct App {
    pub adapters: Adapters,
    pub stores: Stores,
    pub use_cases: UseCases,
}

/// Concrete adapters the API talks to directly.
pub struct Adapters {
    pub ledger: Arc<InMemoryLedger>,
    pub environment: Arc<WeatherEnvironment>,
    pub presenter: Arc<BroadcastPresenter>,
    pub clock: Arc<dyn ClockPort>,
    pub random: Arc<dyn RandomPort>,
}

pub struct Stores {
    pub sessions: Arc<SessionRegistry>,
    pub discoveries: Arc<DiscoveryStore>,
}

/// Container for all use cases.
pub struct UseCases {
    pub fishing: use_cases::FishingUseCases,
    pub snapshots: Arc<use_cases::SnapshotService>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        config: &EngineConfig,
        catalog: Catalog,
        snapshot_store: Arc<dyn SnapshotStorePort>,
    ) -> Self {
        let rules = catalog.rules.clone().unwrap_or_default();
        let capacity = rules.inventory_capacity;
        let catalog = Arc::new(catalog);

        // Create infrastructure services
        let clock: Arc<dyn ClockPort> = Arc::new(RuntimeClock::new());
        let random: Arc<dyn RandomPort> = match config.rng_seed {
            Some(seed) => {
                tracing::info!(seed, "Using seeded random source");
                Arc::new(SeededRandom::new(seed))
            }
            None => Arc::new(SystemRandom::new()),
        };
        let ledger = Arc::new(InMemoryLedger::new(rules.bait_id.clone()));
        let environment = Arc::new(WeatherEnvironment::new(
            SeasonCalendar::weekly(config.season_start),
            clock.clone(),
        ));
        let presenter = Arc::new(BroadcastPresenter::new());

        let sessions = Arc::new(SessionRegistry::new());
        let discoveries = Arc::new(DiscoveryStore::new());

        let ports = FishingPorts {
            ledger: ledger.clone(),
            presenter: presenter.clone(),
            environment: environment.clone(),
            clock: clock.clone(),
            random: random.clone(),
        };
        let settlement = ResourceSettlement::new(
            ports.ledger.clone(),
            discoveries.clone(),
            clock.clone(),
            random.clone(),
            rules.bait_id.clone(),
        );
        let controller = Arc::new(StageController::new(
            sessions.clone(),
            ports,
            catalog.clone(),
            rules,
            settlement,
        ));
        let queries = Arc::new(FishingQueries::new(
            ledger.clone(),
            environment.clone(),
            discoveries.clone(),
            catalog,
            capacity,
        ));
        let snapshots = Arc::new(use_cases::SnapshotService::new(
            ledger.clone(),
            discoveries.clone(),
            snapshot_store,
        ));

        Self {
            adapters: Adapters {
                ledger,
                environment,
                presenter,
                clock,
                random,
            },
            stores: Stores {
                sessions,
                discoveries,
            },
            use_cases: UseCases {
                fishing: use_cases::FishingUseCases::new(controller, queries),
                snapshots,
            },
        }
    }
}
