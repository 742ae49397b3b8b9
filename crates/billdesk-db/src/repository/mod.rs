//! # Repository Module
//!
//! Database repository implementations for Billdesk.
//!
//! ## Tables and Repositories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  BillingService / seed / CLI                                           │
//! │       │                                                                 │
//! │       │  db.items().search("towel")                                    │
//! │       ▼                                                                 │
//! │  ItemRepository ─────────────► items                                   │
//! │  DocumentRepository(Invoice) ► invoices    ┐                           │
//! │  DocumentRepository(Quotation) quotations  ├─ same column layout       │
//! │  CustomerRepository ─────────► both, read-only by customer_mobile_key  │
//! │                                                                         │
//! │  Multi-step writes (convert, restore) use the connection-level         │
//! │  helpers inside one transaction instead of the pool-level methods.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`item::ItemRepository`] - Catalog CRUD and search
//! - [`document::DocumentRepository`] - Invoices and quotations
//! - [`customer::CustomerRepository`] - Mobile-key lookups across both tables

pub mod customer;
pub mod document;
pub mod item;
