//! # calc_core - Expression Evaluation Engine
//!
//! `calc_core` turns the text typed into a calculator into a displayable
//! result. It has no I/O of its own apart from the optional history file
//! helpers, and every evaluation entry point is a pure function that is
//! safe to call from any number of threads.
//!
//! ## Design Philosophy
//!
//! - **Single pass**: expressions are evaluated by recursive descent with no AST
//! - **Fail fast**: every stage returns a [`CalcResult`]; nothing panics on bad input
//! - **Fixed output vocabulary**: users only ever see a number, `Error`,
//!   `Error: Undefined` or `Error: Infinity`
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::{Engine, Radix};
//!
//! let engine = Engine::default();
//!
//! assert_eq!(engine.calculate_scientific("2+3*4").as_str(), "14");
//! assert_eq!(engine.calculate_scientific("sin(180)").as_str(), "0");
//! assert_eq!(engine.calculate_scientific("sqrt(-1)").as_str(), "Error: Undefined");
//! assert_eq!(engine.calculate_programmer("FF+1", Radix::Hex).as_str(), "100");
//! ```
//!
//! ## Modules
//!
//! - [`evaluator`] - Recursive-descent parser/evaluator
//! - [`scientific`] - `sin/cos/tan/log/ln/sqrt` preprocessor (degrees)
//! - [`radix`] - Base 2/8/10/16 conversion around the evaluator
//! - [`format`] - Result rendering and error strings
//! - [`engine`] - Configured entry points and calculator modes
//! - [`session`] - Key-entry state for the scientific and programmer calculators
//! - [`history`] - History records and JSON persistence
//! - [`settings`] - Engine configuration
//! - [`errors`] - Structured error types

pub mod engine;
pub mod errors;
pub mod evaluator;
pub mod format;
pub mod history;
pub mod radix;
pub mod scientific;
pub mod session;
pub mod settings;

// Re-export commonly used types at crate root for convenience
pub use engine::{CalculatorMode, Engine, OutputMode};
pub use errors::{CalcError, CalcResult};
pub use evaluator::{evaluate, Grammar};
pub use format::{DisplayString, Formattable, NumericResult};
pub use history::{load_history, save_history, History, HistoryEntry};
pub use radix::Radix;
pub use session::{ProgrammerSession, ScientificSession};
pub use settings::{load_settings, EngineSettings};
