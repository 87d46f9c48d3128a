//! Pluggable operator registry.
//!
//! Each leaf clause names an operator (`eq`, `contains`, `between`, ...). The
//! [`OperatorRegistry`] maps those names, case-insensitively, to an
//! [`Operator`] that turns the leaf into one fragment of the target document.
//! New operators are added by implementing [`Operator`] (or passing a
//! closure) and registering aliases; the compiler never changes.
//!
//! ## Core Components
//!
//! - [`Operator`] - the single `apply(leaf) -> fragment` capability
//! - [`OperatorRegistry`] - alias table with a default fallback
//! - [`BuiltinOperator`] - the built-in operator set
//! - [`coerce`] - date, boolean and pattern coercions used by the built-ins

pub mod coerce;
pub mod defaults;
pub mod registry;
pub mod types;

pub use defaults::{register_defaults, BuiltinOperator};
pub use registry::{default_registry, OperatorRegistry};
pub use types::{Operator, OperatorRef};
