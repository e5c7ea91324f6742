//! Derive macro for register and port types.
//!
//! `#[derive(Signal)]` expects `Signal` and `PortDecls` in scope (e.g. via `use cdcflow::*`).
//!
//! On a struct with named fields, every field must implement `Signal`. The fields become trace
//! members named after the field, renamed with `#[member(name = "...")]`, or inlined into the
//! parent with an empty name:
//!
//! ```ignore
//! #[derive(Debug, Clone, Signal)]
//! pub struct OutputState {
//!     #[member(name = "sync")]
//!     pipeline: SyncPipeline<3>,
//!     output: bool,
//! }
//! // port_decls() == Struct([(Some("sync"), Bits(3)), (Some("output"), Bits(1))])
//! ```
//!
//! On an enum of unit variants, the states are encoded in `clog2(#states)` bits (at least one),
//! overridable with `#[width(N)]`. Each state takes its index unless tagged `#[encode(N)]`.
//!
//! Misuse is reported as a compile error on the offending item.

mod signal;
mod utils;

use proc_macro::TokenStream;

#[proc_macro_derive(Signal, attributes(member, width, encode))]
pub fn signal(input: TokenStream) -> TokenStream { signal::derive(input) }
