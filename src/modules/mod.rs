pub mod career;
pub mod common;
pub mod gallery;
pub mod intake;
pub mod leadership;
pub mod pages;
pub mod partners;
pub mod testimonials;
