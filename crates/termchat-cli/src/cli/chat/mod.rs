//! Interactive CLI chat experience.
//!
//! Welcome banner, line input (readline on terminals, buffered stdin
//! otherwise) and the prompt loop that drives the retrying executor.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod input;
pub mod loop_runner;
