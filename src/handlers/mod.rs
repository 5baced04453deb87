// handlers/mod.rs - Two handler tiers
//
// Public (no auth) → read-only profile, projects, blogs, testimonials, uploads
// Protected (JWT)  → content management under /api/*
pub mod protected;
pub mod public;
