//! Ownership-scoped persistence operations.
//!
//! Every read and write here takes the authenticated user id as a mandatory
//! scoping parameter (user lookups excepted); a record that exists but
//! belongs to someone else is indistinguishable from one that does not
//! exist. Handlers never run SQL of their own.

pub mod subtasks;
pub mod tasks;
pub mod users;
