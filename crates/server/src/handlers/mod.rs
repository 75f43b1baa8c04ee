/// Authentication-related routes.
pub(crate) mod auth;

/// Agent management routes.
pub(crate) mod agents;

/// Category browsing and management routes.
pub(crate) mod categories;

/// Lead management routes.
pub(crate) mod leads;
