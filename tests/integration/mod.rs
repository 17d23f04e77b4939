//! Integration tests for repository mirroring against a local contents API

mod cli_run;
mod file_fetch;
