//! Test helpers module
//!
//! Mock EventHub backend, test context setup and fixture builders shared by
//! the integration tests.

#![allow(dead_code)]

pub mod eventhub_mock;
pub mod test_context;
pub mod test_data;

pub use eventhub_mock::*;
pub use test_context::*;
pub use test_data::*;
