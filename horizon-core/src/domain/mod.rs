//! Domain types for the horizon engine

pub mod ids;
pub mod order;
pub mod position;
pub mod side;
pub mod window;

pub use ids::ConfigHash;
pub use order::{OrderIntent, OrderSide};
pub use position::{risk, ExitReason, ExitRules, Position, StepInput, Transition};
pub use side::Side;
pub use window::{mean_std, PriceWindow};
