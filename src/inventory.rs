// Record store for the vehicle inventory

use crate::csv_codec;
use crate::error::{InventoryError, Result};
use crate::kv::KeyValueStore;
use crate::record::{NewVehicle, VehiclePatch, VehicleRecord, now_ms, seed_collection};
use tracing::{debug, info, warn};

/// Key the serialized collection is stored under
pub const INVENTORY_KEY: &str = "carInventory";

/// Authoritative collection of vehicle records
///
/// Records keep insertion order. Every mutation writes the whole collection
/// back to the key-value store. When the store cannot be written the
/// mutation still succeeds in memory and the inventory reports itself as
/// degraded until a later write goes through.
pub struct Inventory {
    cars: Vec<VehicleRecord>,
    kv: Box<dyn KeyValueStore>,
    degraded: bool,
}

impl Inventory {
    /// Create an inventory holding the seed collection, without reading the store
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self {
            cars: seed_collection(),
            kv,
            degraded: false,
        }
    }

    /// Create an inventory and load whatever the store holds
    pub fn open(kv: Box<dyn KeyValueStore>) -> Result<Self> {
        let mut inventory = Self::new(kv);
        inventory.load()?;
        Ok(inventory)
    }

    /// The key-value store this inventory persists into
    pub fn kv(&self) -> &dyn KeyValueStore {
        self.kv.as_ref()
    }

    /// True when the last attempt to reach the store failed
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Replace the in-memory collection with the persisted one
    ///
    /// If nothing has been persisted the current collection is kept. If the
    /// store cannot be read the inventory degrades to memory-only. Stored
    /// data that fails to parse is an error and leaves the collection as is.
    pub fn load(&mut self) -> Result<()> {
        let stored = match self.kv.get(INVENTORY_KEY) {
            Ok(stored) => stored,
            Err(e) if e.is_persistence() => {
                warn!(error = %e, "Persistent store unavailable, keeping in-memory inventory");
                self.degraded = true;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        self.degraded = false;

        match stored {
            Some(json) => {
                let cars: Vec<VehicleRecord> = serde_json::from_str(&json)?;
                info!(count = cars.len(), "Loaded inventory");
                self.cars = cars;
            }
            None => debug!(count = self.cars.len(), "No stored inventory, keeping current collection"),
        }

        Ok(())
    }

    /// Write the entire collection, overwriting the stored value
    pub fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.cars)?;
        match self.kv.set(INVENTORY_KEY, &json) {
            Ok(()) => {
                self.degraded = false;
                debug!(count = self.cars.len(), "Persisted inventory");
                Ok(())
            }
            Err(e) => {
                self.degraded = true;
                Err(e)
            }
        }
    }

    fn persist_or_degrade(&mut self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist inventory, continuing in memory");
        }
    }

    /// Add a new record with a freshly generated id
    pub fn add(&mut self, fields: NewVehicle) -> VehicleRecord {
        let id = self.fresh_id();
        let car = fields.into_record(id);
        info!(id = %car.id, "Adding car");

        self.cars.push(car.clone());
        self.persist_or_degrade();
        car
    }

    /// Overwrite the fields present in `patch`; the id never changes
    pub fn update(&mut self, id: &str, patch: VehiclePatch) -> Result<&VehicleRecord> {
        let index = self.position(id)?;
        patch.apply(&mut self.cars[index]);
        info!(id, "Updated car");

        self.persist_or_degrade();
        Ok(&self.cars[index])
    }

    /// Remove a record, returning it
    pub fn remove(&mut self, id: &str) -> Result<VehicleRecord> {
        let index = self.position(id)?;
        let car = self.cars.remove(index);
        info!(id, "Deleted car");

        self.persist_or_degrade();
        Ok(car)
    }

    pub fn get(&self, id: &str) -> Option<&VehicleRecord> {
        self.cars.iter().find(|c| c.id == id)
    }

    /// All records in insertion order
    pub fn all(&self) -> &[VehicleRecord] {
        &self.cars
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    /// Append every row of a CSV document
    ///
    /// Import is additive: ids from the file are kept even if they already
    /// exist. A malformed row rejects the whole document and nothing is added.
    /// Returns the number of records added.
    pub fn import_csv(&mut self, text: &str) -> Result<usize> {
        let imported = csv_codec::decode(text)?;
        let count = imported.len();

        self.cars.extend(imported);
        info!(count, total = self.cars.len(), "Imported cars from CSV");

        self.persist_or_degrade();
        Ok(count)
    }

    /// Serialize the whole collection as CSV
    pub fn export_csv(&self) -> Result<String> {
        csv_codec::encode(&self.cars)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.cars
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))
    }

    /// `car<millis>`, bumped forward until it is not taken
    fn fresh_id(&self) -> String {
        let mut stamp = now_ms();
        loop {
            let id = format!("car{}", stamp);
            if self.get(&id).is_none() {
                return id;
            }
            stamp += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{MemoryKv, SqliteKv};
    use crate::record::Year;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn memory_inventory() -> (Rc<MemoryKv>, Inventory) {
        let kv = Rc::new(MemoryKv::new());
        let inventory = Inventory::open(Box::new(kv.clone())).unwrap();
        (kv, inventory)
    }

    fn stored(kv: &MemoryKv) -> Vec<VehicleRecord> {
        let json = kv.get(INVENTORY_KEY).unwrap().unwrap();
        serde_json::from_str(&json).unwrap()
    }

    fn dan() -> NewVehicle {
        NewVehicle {
            owner: "Dan".to_string(),
            make: "VW".to_string(),
            model: "Golf".to_string(),
            year: Year::new(2018),
            color: Some("Black".to_string()),
            mileage: Some(10000),
            image: None,
        }
    }

    #[test]
    fn test_open_empty_store_keeps_seed() {
        let (kv, inventory) = memory_inventory();

        assert_eq!(inventory.len(), 3);
        assert!(!inventory.is_degraded());
        // Loading alone does not write anything
        assert_eq!(kv.get(INVENTORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_load_replaces_wholesale() {
        let kv = Rc::new(MemoryKv::new());
        kv.set(
            INVENTORY_KEY,
            r#"[{"id":"car1","owner":"Eve","make":"Kia","model":"Rio","year":2015,"color":null,"mileage":null,"image":null}]"#,
        )
        .unwrap();

        let inventory = Inventory::open(Box::new(kv)).unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.all()[0].owner, "Eve");
    }

    #[test]
    fn test_load_corrupt_data_is_error() {
        let kv = Rc::new(MemoryKv::new());
        kv.set(INVENTORY_KEY, "{not json").unwrap();

        let mut inventory = Inventory::new(Box::new(kv));
        assert!(inventory.load().is_err());
        assert_eq!(inventory.len(), 3);
    }

    #[test]
    fn test_add_then_get() {
        let (kv, mut inventory) = memory_inventory();

        let car = inventory.add(dan());
        assert!(car.id.starts_with("car"));

        let fetched = inventory.get(&car.id).unwrap();
        assert_eq!(fetched, &dan().into_record(car.id.clone()));
        assert_eq!(inventory.all().last().unwrap().id, car.id);

        // Whole collection persisted
        assert_eq!(stored(&kv).len(), 4);
    }

    #[test]
    fn test_add_generates_unique_ids() {
        let (_kv, mut inventory) = memory_inventory();

        let a = inventory.add(dan());
        let b = inventory.add(dan());
        let c = inventory.add(dan());

        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_update_partial() {
        let (kv, mut inventory) = memory_inventory();

        let patch = VehiclePatch {
            owner: Some("Robert".to_string()),
            year: Some(Year::new(2018)),
            ..Default::default()
        };
        let car = inventory.update("car3242", patch).unwrap().clone();

        assert_eq!(car.id, "car3242");
        assert_eq!(car.owner, "Robert");
        assert_eq!(car.year, Year::new(2018));
        assert_eq!(car.make, "Honda");
        assert_eq!(car.color.as_deref(), Some("Blue"));
        assert_eq!(car.mileage, Some(45000));

        assert_eq!(stored(&kv)[0].owner, "Robert");
    }

    #[test]
    fn test_update_keeps_image_unless_replaced() {
        let (_kv, mut inventory) = memory_inventory();
        let car = inventory.add(dan().with_image("data:image/png;base64,AAAA"));

        inventory
            .update(&car.id, VehiclePatch {
                model: Some("Polo".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(inventory.get(&car.id).unwrap().image.as_deref(), Some("data:image/png;base64,AAAA"));

        inventory
            .update(&car.id, VehiclePatch {
                image: Some("data:image/png;base64,BBBB".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(inventory.get(&car.id).unwrap().image.as_deref(), Some("data:image/png;base64,BBBB"));
    }

    #[test]
    fn test_update_unknown_is_not_found() {
        let (kv, mut inventory) = memory_inventory();
        let before = inventory.all().to_vec();

        let err = inventory.update("nope", VehiclePatch::default()).unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(id) if id == "nope"));
        assert_eq!(inventory.all(), before.as_slice());
        assert_eq!(kv.get(INVENTORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_remove() {
        let (kv, mut inventory) = memory_inventory();

        let removed = inventory.remove("car4567").unwrap();
        assert_eq!(removed.owner, "Alice");
        assert!(inventory.get("car4567").is_none());
        assert_eq!(inventory.len(), 2);
        assert_eq!(stored(&kv).len(), 2);
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let (_kv, mut inventory) = memory_inventory();

        assert!(matches!(inventory.remove("nope"), Err(InventoryError::NotFound(_))));
        assert_eq!(inventory.len(), 3);
    }

    #[test]
    fn test_import_appends_without_dedup() {
        let kv = Rc::new(MemoryKv::new());
        kv.set(INVENTORY_KEY, "[]").unwrap();
        let mut inventory = Inventory::open(Box::new(kv.clone())).unwrap();
        assert!(inventory.is_empty());

        let text = "ID,Owner,Make,Model,Year,Color,Mileage\ncar9,Dan,VW,Golf,2018,Black,10000\n";
        assert_eq!(inventory.import_csv(text).unwrap(), 1);
        assert_eq!(inventory.import_csv(text).unwrap(), 1);

        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.all()[0], inventory.all()[1]);
        assert_eq!(inventory.all()[0].mileage, Some(10000));
        assert_eq!(stored(&kv).len(), 2);
    }

    #[test]
    fn test_import_failure_adds_nothing() {
        let (kv, mut inventory) = memory_inventory();

        let text = "ID,Owner,Make,Model,Year\ncar1,Ann,Kia,Rio,2015\nbroken\n";
        let err = inventory.import_csv(text).unwrap_err();

        assert!(matches!(err, InventoryError::Import { line: 3, .. }));
        assert_eq!(inventory.len(), 3);
        assert_eq!(kv.get(INVENTORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_export_round_trip() {
        let (_kv, inventory) = memory_inventory();
        let csv = inventory.export_csv().unwrap();

        let mut other = Inventory::new(Box::new(MemoryKv::new()));
        other.import_csv(&csv).unwrap();

        assert_eq!(&other.all()[3..], inventory.all());
    }

    #[test]
    fn test_unavailable_store_degrades() {
        let kv = Rc::new(MemoryKv::new());
        kv.set_unavailable(true);

        let mut inventory = Inventory::open(Box::new(kv.clone())).unwrap();
        assert!(inventory.is_degraded());
        assert_eq!(inventory.len(), 3);

        // Mutations still work in memory
        let car = inventory.add(dan());
        assert!(inventory.get(&car.id).is_some());
        assert!(inventory.is_degraded());

        // Store comes back; the next mutation writes everything
        kv.set_unavailable(false);
        inventory.remove("car3242").unwrap();
        assert!(!inventory.is_degraded());
        assert_eq!(stored(&kv).len(), 3);
    }

    #[test]
    fn test_sqlite_backed_inventory_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("carstore.db");

        let id = {
            let mut inventory = Inventory::open(Box::new(SqliteKv::open(&db_path).unwrap())).unwrap();
            inventory.remove("car8901").unwrap();
            inventory.add(dan()).id
        };

        let inventory = Inventory::open(Box::new(SqliteKv::open(&db_path).unwrap())).unwrap();
        assert_eq!(inventory.len(), 3);
        assert!(inventory.get("car8901").is_none());
        assert_eq!(inventory.get(&id).unwrap().model, "Golf");
    }
}
