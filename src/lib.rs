// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Keyset Reconcile
//!
//! Order-insensitive planning for list attributes whose elements are
//! identified by a key.
//!
//! ## Overview
//!
//! A declarative plan compares a list attribute position by position. When
//! the author reorders, inserts or removes an element, every later position
//! shows a spurious change. This crate keeps those plans honest:
//!
//! - A pure reorder yields the prior list verbatim, so no diff is shown
//! - Any real change yields the desired list sorted by key, so a by-key
//!   comparison downstream reports only the records that actually changed
//! - Anything uncertain (unknown keys, duplicates, no prior) passes the
//!   desired list through untouched
//!
//! ## Modules
//!
//! - [`value`]: Typed attribute values and the JSON codec
//! - [`config`]: Attribute profiles and `keyset.yaml` parsing
//! - [`planner`]: Key extraction, comparison, sorting and plan synthesis
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```
//! use keyset_reconcile::config::AttributeProfile;
//! use keyset_reconcile::planner::{PlanDecision, PlanSynthesizer};
//! use keyset_reconcile::value::{Collection, ListValue, Record};
//!
//! let ng = |name: &str| Record::new().with("name", name).with("instance_type", "t3.large");
//! let prior = ListValue::Known(Collection::from_records(vec![ng("a"), ng("b")]));
//! let desired = ListValue::Known(Collection::from_records(vec![ng("b"), ng("a")]));
//!
//! let profile = AttributeProfile::nodegroups();
//! let reconciled = PlanSynthesizer::new(&profile).reconcile(&desired, &prior);
//!
//! assert_eq!(reconciled.decision, PlanDecision::Suppressed);
//! assert_eq!(reconciled.plan_value, prior);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod planner;
pub mod value;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{AttributeProfile, ConfigParser, ConfigValidator, KeysetConfig};
pub use error::{KeysetError, Result};
pub use planner::{DiffEngine, KeyedListSortModifier, ListPlanModifier, PlanSynthesizer};
pub use value::{Collection, ListValue, Record, Value};
