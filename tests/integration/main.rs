//! Integration tests for ythook

mod helpers;

mod cli_test;
mod simulate_test;
