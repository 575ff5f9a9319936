//! Integration tests for recipe digests

mod determinism;
mod recipe_forms;
mod remote_policy;
