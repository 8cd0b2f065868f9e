//! Request materialisation, output binding, operations, and the
//! authentication/function runners that drive a Raider graph.

pub mod flow;
pub mod operation;
pub mod request;
pub mod response;
pub mod runner;

pub use flow::Flow;
pub use operation::{Operation, PrintItem, SaveSource, Verdict};
pub use request::{Body, Field, Request};
pub use response::bind_outputs;
pub use runner::{AuthOutcome, AuthRunner, FunctionRunner, DEFAULT_LOOP_GUARD};
