//! Domain entities - catalog data, tools, catches and discovery logs.

mod catch;
mod discovery;
mod inventory;
mod species;
mod tool;

pub use catch::{CatchCandidate, CatchRecord, Mutation};
pub use discovery::{fish_index, DiscoveryEntry, FishIndexEntry, RealmDiscoveryLog};
pub use inventory::PlayerInventory;
pub use species::{Catalog, SeasonWeights, Species, TrashItem};
pub use tool::ToolSnapshot;
