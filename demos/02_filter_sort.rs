//! Example 02: Filtering and Sorting
//!
//! Builds an in-memory inventory, then narrows and orders it with
//! `FilterCriteria` and `SortKey`.
//!
//! Run with: cargo run --example 02_filter_sort

use carstore::{FilterCriteria, Inventory, MemoryKv, NewVehicle, SortKey, VehicleRecord, filter, sort};
use eyre::Result;

fn show(label: &str, view: &[&VehicleRecord]) {
    println!("{} ({} cars):", label, view.len());
    for car in view {
        println!("   {:<10} {:<8} {}", car.id, car.owner, car.title());
    }
    println!();
}

fn main() -> Result<()> {
    println!("CarStore Filtering and Sorting Example");
    println!("======================================\n");

    let mut inventory = Inventory::new(Box::new(MemoryKv::new()));
    for (owner, make, model, year) in [
        ("Erin", "Škoda", "Octavia", "2017"),
        ("Frank", "audi", "A4", "2021"),
        ("Gina", "Toyota", "Corolla", "2015"),
        ("Hal", "Citroën", "C3", "2019"),
    ] {
        inventory.add(NewVehicle::from_input(owner, make, model, year, "", ""));
    }

    show("Everything, insertion order", &filter(inventory.all(), &FilterCriteria::default()));

    // Text search covers every field, case-insensitively
    let criteria = FilterCriteria::default().text("toyota");
    show("Text \"toyota\"", &filter(inventory.all(), &criteria));

    // Make and year match exactly, model by substring; all of them must hold
    let criteria = FilterCriteria::default().make("Citroën").year("2019");
    show("Make \"Citroën\", year 2019", &filter(inventory.all(), &criteria));

    let criteria = FilterCriteria::default().model("o");
    show("Model contains \"o\"", &filter(inventory.all(), &criteria));

    // Sorting reorders the view, never the inventory itself
    let mut view = filter(inventory.all(), &FilterCriteria::default());
    for key in SortKey::ALL {
        sort(&mut view, key);
        show(&format!("Sorted by {}", key), &view);
    }

    println!("Inventory order is unchanged: first car is still {}", inventory.all()[0].title());
    println!("\nExample completed successfully!");
    Ok(())
}
