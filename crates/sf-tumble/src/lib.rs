//! # sf-tumble — Cascading Pays-Anywhere Slot Engine
//!
//! Core game logic for a 6×5 "pays anywhere" slot with tumbling reels,
//! additive bomb multipliers and a free spins feature.
//!
//! ## Features
//!
//! - **Symbol Catalog**: Pay tables and draw weights per spin mode
//! - **Weighted Generator**: Board fills and gravity refills with special symbol rolls
//! - **Win Evaluator**: Count-based wins, tier breakpoints, scatter triggers
//! - **Cascade Engine**: Evaluate → remove → refill until a pass has no win
//! - **Session State**: Balance, bet table, free spins and multiplier pool
//!
//! ## Architecture
//!
//! ```text
//! TumbleEngine
//!     │
//!     ├── SlotConfig (grid, catalog, rules, limits)
//!     ├── SymbolGenerator (weighted draws, refill)
//!     ├── WinEvaluator (pays anywhere, scatters)
//!     ├── MultiplierTable (bomb values)
//!     └── SessionState (balance, free spins)
//!           │
//!           v
//!     CascadePass* → RoundOutcome
//! ```

pub mod config;
pub mod credits;
pub mod engine;
pub mod error;
pub mod generator;
pub mod grid;
pub mod multiplier;
pub mod paytable;
pub mod session;
pub mod spin;
pub mod symbols;

pub use config::*;
pub use credits::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use grid::*;
pub use multiplier::*;
pub use paytable::*;
pub use session::*;
pub use spin::*;
pub use symbols::*;
