//! Uploaded binary assets: the object store seam, storage key handling,
//! post-commit cleanup and detail-image reconciliation.

pub mod cleanup;
pub mod keys;
pub mod reconcile;
pub mod store;

pub use cleanup::{CompensatingDeletes, delete_objects};
pub use keys::{key_from_url, storage_key_for};
pub use reconcile::{
    DetailImageChanges, ReconcileError, Reconciliation, RemovalRequest, reconcile_detail_images,
};
pub use store::{MediaRef, ObjectStore, S3ObjectStore};

#[cfg(test)]
pub mod testing;
