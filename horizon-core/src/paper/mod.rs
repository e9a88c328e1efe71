//! In-memory collaborators for replay, simulation, and tests.

pub mod exchange;
pub mod history;
pub mod oracle;
pub mod walk;

pub use exchange::{PaperExchange, PaperFill};
pub use history::VecHistoryStore;
pub use oracle::{MomentumOracle, RecordedOracle};
pub use walk::{sub_seed, RandomWalk};
