//! # mailrandom-core
//!
//! Core logic for `mailrandom`, which picks one option at random, weighted,
//! and announces it.
//!
//! This crate provides:
//! - **Selection** - the weighted option model and the draw
//! - **Input** - comma lists and two-column option files
//! - **Mail** - configuration, credentials, message composition and SMTP delivery
//! - **Notify** - console or mail announcement of the selection
//!
//! ## Example
//!
//! ```
//! use mailrandom_core::selection::{OptionSet, ScriptedSource};
//!
//! let options = OptionSet::from_labels(&["swim", "run", "bike"], &["1", "1", "2"]).unwrap();
//! let mut source = ScriptedSource::new([0.9]);
//! assert_eq!(options.draw(&mut source).unwrap(), "bike");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod input;
pub mod mail;
pub mod notify;
pub mod selection;

pub use error::{Error, Result};
pub use input::{FileError, read_option_file, split_list};
pub use mail::{MailConfig, MailError, Password, Security};
pub use notify::{DEFAULT_CATEGORY, Delivery, announcement};
pub use selection::{
    OptionSet, RandomSource, RngSource, ScriptedSource, SelectionError, WeightedOption,
};
