//! CdcFlow: cycle-accurate models of clock-domain-crossing hardware.
//!
//! Registers are plain values implementing [`Signal`], every clocked process is a next-state
//! function ([`Fsm`]) evaluated once per rising edge of its clock, and a [`Simulator`] produces the
//! rising edges of any number of unrelated clocks.

// # Tries to deny all lints (`rustc -W help`).
#![deny(absolute_paths_not_starting_with_crate)]
#![deny(anonymous_parameters)]
#![deny(deprecated_in_future)]
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(rust_2018_idioms)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
//
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::bare_urls)]
//
#![allow(clippy::needless_lifetimes)]
#![allow(elided_lifetimes_in_paths)]

pub mod clock;
pub mod fsm;
pub mod pipeline;
pub mod signal;
pub mod sim;
pub mod trace;
pub mod utils;

pub use cdcflow_macro::Signal;
pub use clock::*;
pub use fsm::*;
pub use pipeline::*;
pub use signal::*;
pub use sim::*;
pub use trace::*;
pub use utils::*;
