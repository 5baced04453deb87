// handlers/protected/mod.rs - Content management (JWT authentication required)
//
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware, applied as a route layer in app::router
pub mod blogs;
pub mod crud;
pub mod images;
pub mod projects;
