// CarStore - Vehicle inventory with key-value persistence and CSV interchange

pub mod config;
pub mod csv_codec;
pub mod error;
pub mod image;
pub mod inventory;
pub mod kv;
pub mod record;
pub mod settings;
pub mod view;

// Re-export main types for convenience
pub use config::Config;
pub use error::{InventoryError, Result};
pub use inventory::{INVENTORY_KEY, Inventory};
pub use kv::{KeyValueStore, MemoryKv, SqliteKv};
pub use record::{NewVehicle, VehiclePatch, VehicleRecord, Year, now_ms};
pub use settings::{Settings, Theme};
pub use view::{FilterCriteria, SortKey, filter, sort, sort_by_name};
