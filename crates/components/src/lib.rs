//! Component metadata: per-type manifest requirements and their resolved form.
//!
//! A [`ComponentDatabase`] maps a component type (for example `LocationSensor`)
//! to its [`ComponentDescriptor`]: unconditional permissions plus manifest
//! fragments that only apply when the project uses one of their trigger
//! blocks. The build pipeline resolves a project's usage against the database
//! into a [`ComponentInfo`].

pub mod database;
pub mod descriptor;
pub mod error;
pub mod info;

pub use database::ComponentDatabase;
pub use descriptor::{ComponentDescriptor, ConditionalFragment};
pub use error::DatabaseError;
pub use info::ComponentInfo;
