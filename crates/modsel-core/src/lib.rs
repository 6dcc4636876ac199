//! Module selection pipeline.
//!
//! Given a pool of candidate modules, this crate derives the ordered subset to
//! activate: duplicates are collapsed, exclusions are validated and removed,
//! the rest is sorted by order hint and precedence, filters veto what remains,
//! and listeners are told the outcome.
//!
//! The entry point is [`ModuleSelector`].

pub mod config;
pub mod dedupe;
pub mod error;
pub mod exclusion;
pub mod filter;
pub mod listener;
pub mod order;
pub mod selector;

pub use config::SelectorSettings;
pub use dedupe::dedupe;
pub use error::{BoxError, Error, Result};
pub use exclusion::{ModuleLocator, apply_exclusions, resolve_exclusions, validate_exclusions};
pub use filter::{FilterChain, FilterOutcome, ImportFilter, Verdicts};
pub use listener::{ImportEvent, ImportListener, LoggingListener};
pub use order::PriorityOrderer;
pub use selector::{
    CandidateSource, ExclusionRequest, ModuleSelector, ModuleSelectorBuilder, Selection, Stage,
};
