//! Integration tests for the scope & sequence builder

mod cli_commands;
mod pipeline;
