// src/git/mod.rs

//! Git submodule discovery, sync, and restore.

pub mod submodules;
