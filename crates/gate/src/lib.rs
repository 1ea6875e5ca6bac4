//! # PostGate Gate
//!
//! Sits between the user's submit gesture and the host page. Captured
//! attempts are evaluated; sendable drafts are replayed, the rest wait in a
//! dialog for the user to revise or send anyway.

pub mod gate;
pub mod host;
pub mod interceptor;
pub mod memory_page;
pub mod normalizer;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use gate::{Gate, GateSnapshot};
pub use host::{Disposition, Element, ElementId, HostPage, KeyPress, PageEvent};
pub use interceptor::ActionInterceptor;
pub use memory_page::InMemoryPage;
pub use normalizer::PageNormalizer;
pub use session::PageSession;
