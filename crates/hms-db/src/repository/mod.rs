//! # Repository Module
//!
//! Database repository implementations for medicines and sales.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.medicines().get_by_id(id)                                  │
//! │       ▼                                                                 │
//! │  MedicineRepository                 SaleRepository (read-only)         │
//! │  ├── get_by_id / list / count       ├── get_by_id / get_detail         │
//! │  ├── insert                         ├── list / list_for_medicine       │
//! │  ├── update                         ├── count                          │
//! │  └── delete (cascades sales)        └── total_revenue                  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale writes live in [`crate::ledger`], not here.

pub mod medicine;
pub mod sale;
