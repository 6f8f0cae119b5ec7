//! Business logic of the line provider and the bet maker.
//!
//! Services own their repositories through injected handles and never reach
//! for global state, so each one can be built against fakes in tests.

pub mod bet;
pub mod line;
pub mod source;

pub use bet::{BetError, BetService, SettleError, Settlement};
pub use line::{LineError, LineService};
pub use source::{EventSource, SourceError};
