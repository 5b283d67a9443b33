//! SQLite backend for the cattle marketplace.
//!
//! [`SqliteDatabase`] implements every storage trait in [`crate::traits`] on top of the low-level functions in [`db`].
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
