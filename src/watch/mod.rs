// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Deciding which paths are catalog files worth reacting to (`filter`).
//! - Tracking the live set of catalog files (`inventory`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) and turning its
//!   events into `Added` / `Changed` / `Removed` file events (`watcher`).
//!
//! It does **not** know about generated pages; it only reports which catalog
//! files exist and when they change.

pub mod filter;
pub mod inventory;
pub mod watcher;

pub use filter::{is_relevant, CatalogFilter};
pub use inventory::{Inventory, InventorySnapshot, SharedInventory};
pub use watcher::{
    apply_observation, classify_change, find_catalog_files, observe, scan_dir, spawn_watcher,
    Observed, WatcherHandle,
};
