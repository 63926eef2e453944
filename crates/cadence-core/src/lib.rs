//! # Cadence Core Library
//!
//! Recurrence expansion, per-occurrence state tracking and attention
//! classification for tasks stored as markdown files with YAML frontmatter.
//!
//! All dates are local calendar dates ([`chrono::NaiveDate`]); there is no
//! time of day and no timezone handling anywhere in the engine.
//!
//! ## Core Modules
//!
//! - [`models`]: Recurrence rules, task status, attention groups
//! - [`rrule`]: RRULE-subset encoding and decoding
//! - [`generator`]: Occurrence predicate and bounded date-window expansion
//! - [`record`]: The typed task record and its frontmatter boundary
//! - [`tracker`]: Daily materialization and per-occurrence state changes
//! - [`reschedule`]: Moving a series or a single occurrence
//! - [`classifier`]: Now / Past / Upcoming / Wrapped grouping
//! - [`store`]: Persistence seam for whatever owns the records
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cadence_core::{
//!     classifier, generator,
//!     models::{AttentionGroup, RecurrenceRule},
//!     record::TaskRecord,
//!     tracker::MaterializationManager,
//! };
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
//! let today = NaiveDate::from_ymd_opt(2026, 2, 4).unwrap();
//!
//! let rule = RecurrenceRule::daily(start).with_interval(3);
//! assert!(generator::is_occurrence(&rule, today));
//!
//! let mut task = TaskRecord::default();
//! task.set_rule(&rule);
//! let mut records = vec![task];
//!
//! let summary = MaterializationManager::with_defaults().apply_today(&mut records, today);
//! assert_eq!(summary.instances_created, 1);
//! assert_eq!(classifier::classify(today, &records[0], Some(today)), AttentionGroup::Now);
//! ```

pub mod classifier;
pub mod error;
pub mod generator;
pub mod models;
pub mod record;
pub mod reschedule;
pub mod rrule;
pub mod store;
pub mod tracker;

pub use error::CoreError;
