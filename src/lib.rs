// Users, games, sessions and the broadcast rooms
pub mod core;

// Session cookies and password hashing
pub mod auth;

// Environment configuration
pub mod config;

// Error taxonomy and its HTTP rendering
pub mod error;

// Middleware
pub mod middleware;

// Account operations (business logic)
pub mod services;

// API models (requests/responses)
pub mod models;

// HTTP routes
pub mod routes;

// Application state
pub mod state;
