//! State Module - Observable values
//!
//! - **Observable** - Value container, change listeners, scoped subscriptions

mod observable;

pub use observable::*;
