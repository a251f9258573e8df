//! Library side of the `pacer` command: logging setup and the pipeline
//! stages the subcommands are built from.

pub mod logging;
pub mod pipeline;
