// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Read-only views served to site visitors. Everything here is backed by the
// profile and detail services or plain repository listings.
pub mod blogs;
pub mod profile;
pub mod projects;
pub mod testimonials;
pub mod uploads;
