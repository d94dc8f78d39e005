//! Integration tests for Gearlog server

mod api_tests;
mod common;
mod engine_tests;
