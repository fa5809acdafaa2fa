// SPDX-License-Identifier: Apache-2.0
//! Emission model for CarbonTrace.
//!
//! `carbon-core` holds the fixed emission-factor catalog, the reduction-tip
//! catalog, and the pure calculator that converts an activity quantity into a
//! kg-CO2e estimate. There is no I/O here: the catalog is built once, never
//! mutated, and safe to share by reference across concurrent handlers. The
//! HTTP surface lives in `carbon-edge`.
//!
//! # Numeric Contract
//!
//! `carbon_kg = factor * amount`, exactly, with no server-side rounding.
//! Presentation rounding is a caller concern. Amounts are accepted as given,
//! including zero and negative values — submitting a negative delta as a
//! correction is a valid caller pattern, so the calculator does not reject it.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod calc;
mod catalog;
mod tips;

pub use calc::{calculate, CalcError, Calculation};
pub use catalog::{EmissionFactor, FactorCatalog};
pub use tips::{sample_tips, TipRecord, REDUCTION_TIPS};
