//! Library half of the `raider` binary: the embedded demo graph and the
//! ambient config loader. Split out from `main.rs` so both pieces are
//! exercised by integration tests without spawning the binary itself.

pub mod config;
pub mod demo_graph;
