//! Example 01: Basic CRUD Operations
//!
//! Adds, reads, updates and removes vehicles in an inventory backed by a
//! SQLite file, then reopens the file to show the changes were persisted.
//!
//! Run with: cargo run --example 01_basic_crud

use carstore::{Inventory, NewVehicle, SqliteKv, VehiclePatch, Year};
use eyre::Result;

fn main() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let db_path = temp_dir.path().join("carstore.db");

    println!("CarStore Basic CRUD Example");
    println!("===========================\n");
    println!("Store path: {}\n", db_path.display());

    // A fresh store starts with the seed collection
    let mut inventory = Inventory::open(Box::new(SqliteKv::open(&db_path)?))?;
    println!("Opened inventory with {} seed cars.\n", inventory.len());

    // CREATE
    println!("1. CREATE - Adding a new car...");
    let car = inventory.add(NewVehicle::from_input("Dana", "Volkswagen", "Golf", "2018", "Black", "61000"));
    println!("   Added: {} ({})\n", car.title(), car.id);

    // READ
    println!("2. READ - Looking the car up by id...");
    if let Some(found) = inventory.get(&car.id) {
        println!("   Owner: {}", found.owner);
        println!("   Color: {}", found.color.as_deref().unwrap_or("-"));
        println!("   Mileage: {:?}\n", found.mileage);
    }

    // UPDATE
    println!("3. UPDATE - Changing owner and year...");
    let patch = VehiclePatch {
        owner: Some("Dana Smith".to_string()),
        year: Some(Year::new(2019)),
        ..Default::default()
    };
    let updated = inventory.update(&car.id, patch)?;
    println!("   Now: {} owned by {}\n", updated.title(), updated.owner);

    // DELETE
    println!("4. DELETE - Removing the first seed car...");
    let removed = inventory.remove("car3242")?;
    println!("   Removed: {}\n", removed.title());

    // Unknown ids are reported, not ignored
    match inventory.remove("car0") {
        Ok(_) => println!("   Unexpectedly removed car0\n"),
        Err(e) => println!("   Removing car0 failed as expected: {}\n", e),
    }

    // REOPEN
    println!("5. REOPEN - Loading the inventory again from disk...");
    drop(inventory);
    let reopened = Inventory::open(Box::new(SqliteKv::open(&db_path)?))?;
    for car in reopened.all() {
        println!("   {} - {} ({})", car.id, car.title(), car.owner);
    }

    println!("\nExample completed successfully!");
    Ok(())
}
