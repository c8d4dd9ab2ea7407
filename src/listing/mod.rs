//! Listing module.
//!
//! This module turns configurations into marketplace payloads and compares
//! configurations against published listings:
//! - Attribute names and wrapper helpers for the Listings Items format
//! - Normalization shared by both sides of a comparison
//! - The change detector
//! - The payload builder

pub mod attributes;
mod diff;
pub mod normalize;
mod payload;
mod snapshot;

pub use diff::{ChangeDetector, ChangeType, FieldChange};
pub use payload::{
    LISTING_REQUIREMENTS, ListingDraft, ListingPayloadBuilder, ListingsItemPutRequest, PatchOp,
    PatchOperation,
};
pub use snapshot::ListingSnapshot;
