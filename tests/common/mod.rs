// tests/common/mod.rs

pub use moodup_test_utils::init_tracing;
