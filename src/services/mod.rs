//! Flow services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the flow logic and its state transitions so route
//! handlers can stay focused on protocol translation. External systems are
//! reached only through the capability traits injected at construction.

pub mod assistant;
pub mod banks;
pub mod questionnaire;
pub mod session;
