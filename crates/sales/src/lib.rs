//! Orders, order lines and the merge-vs-insert rule for the add-good command.

pub mod order;

pub use order::{AddGood, LinePlan, Order, OrderedGood};
