//! Single-turn chat execution: the backoff schedule and the retrying
//! executor the prompt loop hands each input to.

pub mod backoff;
pub mod executor;
