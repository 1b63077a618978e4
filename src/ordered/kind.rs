/// Largest accepted size for a single uploaded image.
pub const MAX_IMAGE_BYTES: usize = 2_000_000;

/// Allowance for text fields and multipart framing on top of the files.
const FORM_OVERHEAD_BYTES: usize = 1_000_000;

/// Request body cap for multipart forms. Sized for the resource accepting
/// the most files, each at [`MAX_IMAGE_BYTES`].
pub const MAX_FORM_BYTES: usize = PARTNER_MEDIA.max_files() * MAX_IMAGE_BYTES + FORM_OVERHEAD_BYTES;

/// Upload field feeding one media slot of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaSlot {
    pub field: &'static str,
    pub folder: &'static str,
    pub max_files: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaLayout {
    None,
    /// One primary image.
    Single { slot: MediaSlot, required: bool },
    /// A featured image plus a non-empty ordered set of detail images.
    Featured {
        featured: MediaSlot,
        details: MediaSlot,
    },
    /// An ordered set of images with no primary, replaced as a whole when
    /// new files arrive.
    Set { slot: MediaSlot, required: bool },
}

impl MediaLayout {
    pub fn slots(&self) -> Vec<MediaSlot> {
        match *self {
            MediaLayout::None => Vec::new(),
            MediaLayout::Single { slot, .. } => vec![slot],
            MediaLayout::Featured { featured, details } => vec![featured, details],
            MediaLayout::Set { slot, .. } => vec![slot],
        }
    }

    /// Most files a single form may carry for this layout.
    pub const fn max_files(&self) -> usize {
        match *self {
            MediaLayout::None => 0,
            MediaLayout::Single { slot, .. } | MediaLayout::Set { slot, .. } => slot.max_files,
            MediaLayout::Featured { featured, details } => featured.max_files + details.max_files,
        }
    }

    pub fn primary_field(&self) -> Option<&'static str> {
        match self {
            MediaLayout::None => None,
            MediaLayout::Single { slot, .. } => Some(slot.field),
            MediaLayout::Featured { featured, .. } => Some(featured.field),
            MediaLayout::Set { .. } => None,
        }
    }

    pub fn detail_field(&self) -> Option<&'static str> {
        match self {
            MediaLayout::Featured { details, .. } => Some(details.field),
            MediaLayout::Set { slot, .. } => Some(slot.field),
            _ => None,
        }
    }
}

/// Static description of one ordered, media-backed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKind {
    /// Human readable singular name used in messages.
    pub label: &'static str,
    pub table: &'static str,
    /// Allowed partition values. Empty when ordering is global.
    pub categories: &'static [&'static str],
    /// Smallest display order a reorder request may assign.
    pub min_display_order: i32,
    pub media: MediaLayout,
}

impl ResourceKind {
    pub fn is_partitioned(&self) -> bool {
        !self.categories.is_empty()
    }

    pub fn accepts_category(&self, category: &str) -> bool {
        self.categories.contains(&category)
    }
}

pub const GALLERY_CATEGORIES: &[&str] = &["events", "leadership", "partnerships", "workshops", "digital"];
pub const LEADERSHIP_CATEGORIES: &[&str] = &["directors", "advisors", "staff"];

pub static GALLERY_ITEMS: ResourceKind = ResourceKind {
    label: "Gallery item",
    table: "gallery_items",
    categories: GALLERY_CATEGORIES,
    min_display_order: 0,
    media: MediaLayout::Single {
        slot: MediaSlot {
            field: "image",
            folder: "gallery",
            max_files: 1,
        },
        required: true,
    },
};

pub static LEADERSHIP_MEMBERS: ResourceKind = ResourceKind {
    label: "Leadership member",
    table: "leadership_members",
    categories: LEADERSHIP_CATEGORIES,
    min_display_order: 1,
    media: MediaLayout::Single {
        slot: MediaSlot {
            field: "image",
            folder: "leadership",
            max_files: 1,
        },
        required: false,
    },
};

pub static CARD_TESTIMONIALS: ResourceKind = ResourceKind {
    label: "Card testimonial",
    table: "card_testimonials",
    categories: &[],
    min_display_order: 1,
    media: MediaLayout::Single {
        slot: MediaSlot {
            field: "image",
            folder: "testimonials",
            max_files: 1,
        },
        required: false,
    },
};

pub static VIDEO_TESTIMONIALS: ResourceKind = ResourceKind {
    label: "Video testimonial",
    table: "video_testimonials",
    categories: &[],
    min_display_order: 1,
    media: MediaLayout::None,
};

const PARTNER_MEDIA: MediaLayout = MediaLayout::Featured {
    featured: MediaSlot {
        field: "featuredImage",
        folder: "partner-institutions",
        max_files: 1,
    },
    details: MediaSlot {
        field: "detailImages",
        folder: "partner-institutions/details",
        max_files: 10,
    },
};

pub static PARTNER_INSTITUTIONS: ResourceKind = ResourceKind {
    label: "Partner institution",
    table: "partner_institutions",
    categories: &[],
    min_display_order: 1,
    media: PARTNER_MEDIA,
};

pub static GLOBAL_PARTNERS: ResourceKind = ResourceKind {
    label: "Global partner",
    table: "global_partners",
    categories: &[],
    min_display_order: 1,
    media: PARTNER_MEDIA,
};

pub static CAROUSELS: ResourceKind = ResourceKind {
    label: "Carousel",
    table: "carousels",
    categories: &[],
    min_display_order: 1,
    media: MediaLayout::Set {
        slot: MediaSlot {
            field: "images",
            folder: "carousel",
            max_files: 3,
        },
        required: true,
    },
};

pub static VIDEO_CARDS: ResourceKind = ResourceKind {
    label: "Video card",
    table: "video_cards",
    categories: &[],
    min_display_order: 1,
    media: MediaLayout::Single {
        slot: MediaSlot {
            field: "thumbnail",
            folder: "videoThumbnail",
            max_files: 1,
        },
        required: false,
    },
};

pub static PAGE_SECTIONS: ResourceKind = ResourceKind {
    label: "Section",
    table: "page_sections",
    categories: &[],
    min_display_order: 1,
    media: MediaLayout::Single {
        slot: MediaSlot {
            field: "image",
            folder: "sections",
            max_files: 1,
        },
        required: false,
    },
};

pub static HERO_SECTIONS: ResourceKind = ResourceKind {
    label: "Hero section",
    table: "hero_sections",
    categories: &[],
    min_display_order: 1,
    media: MediaLayout::None,
};

pub static BULLET_POINTS: ResourceKind = ResourceKind {
    label: "Bullet point",
    table: "bullet_points",
    categories: &[],
    min_display_order: 1,
    media: MediaLayout::None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitioned_kinds_list_their_categories() {
        assert!(GALLERY_ITEMS.is_partitioned());
        assert!(LEADERSHIP_MEMBERS.accepts_category("advisors"));
        assert!(!LEADERSHIP_MEMBERS.accepts_category("events"));
        assert!(!PARTNER_INSTITUTIONS.is_partitioned());
    }

    #[test]
    fn featured_layout_exposes_both_fields() {
        assert_eq!(GLOBAL_PARTNERS.media.primary_field(), Some("featuredImage"));
        assert_eq!(GLOBAL_PARTNERS.media.detail_field(), Some("detailImages"));
        assert_eq!(VIDEO_TESTIMONIALS.media.slots(), Vec::new());
    }

    #[test]
    fn image_sets_have_no_primary() {
        assert_eq!(CAROUSELS.media.primary_field(), None);
        assert_eq!(CAROUSELS.media.detail_field(), Some("images"));
        assert_eq!(CAROUSELS.media.max_files(), 3);
    }

    #[test]
    fn form_limit_covers_every_kind() {
        let kinds = [
            &GALLERY_ITEMS,
            &LEADERSHIP_MEMBERS,
            &CARD_TESTIMONIALS,
            &VIDEO_TESTIMONIALS,
            &PARTNER_INSTITUTIONS,
            &GLOBAL_PARTNERS,
            &CAROUSELS,
            &VIDEO_CARDS,
            &PAGE_SECTIONS,
            &HERO_SECTIONS,
            &BULLET_POINTS,
        ];
        for kind in kinds {
            assert!(
                kind.media.max_files() * MAX_IMAGE_BYTES < MAX_FORM_BYTES,
                "{} does not fit",
                kind.label
            );
        }
        assert_eq!(PARTNER_INSTITUTIONS.media.max_files(), 11);
    }
}
