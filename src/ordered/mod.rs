//! Ordered, media-backed resources: the shared record shape, per-partition
//! display ordering and the create/update/delete flow that keeps stored
//! objects in step with the rows referencing them.

pub mod kind;
pub mod ordering;
pub mod record;
pub mod repository;
pub mod service;

#[cfg(test)]
pub mod memory;

pub use kind::{
    BULLET_POINTS, CARD_TESTIMONIALS, CAROUSELS, GALLERY_ITEMS, GLOBAL_PARTNERS, HERO_SECTIONS,
    LEADERSHIP_MEMBERS, MediaLayout, MediaSlot, PAGE_SECTIONS, PARTNER_INSTITUTIONS, ResourceKind,
    VIDEO_CARDS, VIDEO_TESTIMONIALS,
};
pub use ordering::ReorderItem;
pub use record::ResourceRecord;
pub use repository::{ListFilter, Page, PgResourceRepository, ResourceRepository};
pub use service::{Draft, OrderedResources, Patch, ResourceError, ResourceResult, UploadedMedia};
