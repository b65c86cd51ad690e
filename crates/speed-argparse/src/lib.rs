//! Declarative command-line argument parsing.
//!
//! Arguments are declared on an [`ArgParser`], configured through the
//! builder each `add_*` call returns, and matched against a command line with
//! [`ArgParser::parse_args`]. Values may be bound to typed storage through
//! [`Castable`] targets, including nested containers and filesystem paths
//! that are checked while parsing.
//!
//! ```
//! use speed_argparse::{ArgParser, ParseStatus};
//!
//! let mut parser = ArgParser::new();
//! parser.configure().output(Box::new(std::io::sink()));
//! parser
//!     .add_key_value_arg(["-s", "--seconds"])?
//!     .description("Seconds to wait.")
//!     .values_names(["INTEGER"])
//!     .store::<u64>()?;
//!
//! let status = parser.parse_args(["speed", "-s", "10"]);
//! assert_eq!(status, ParseStatus::Completed);
//! assert_eq!(parser.stored::<u64>("--seconds"), Some(&10));
//! # Ok::<(), speed_argparse::ConfigError>(())
//! ```

pub mod flags;

pub mod arg;
pub mod builder;
pub mod cast;
pub mod config;
pub mod constraint;
pub mod error;
pub mod help;
pub mod parser;
pub mod path;
mod style;
pub mod value;

pub use arg::{Arg, ArgErrorFlags, ArgFlags, ArgKind};
pub use builder::{ArgBuilder, HelpArg, KeyArg, KeyValueArg, KeylessArg, VersionArg};
pub use cast::{CastError, Castable, TypeCaster, try_type_cast};
pub use config::{Configurator, ParserConfig, PrefixKind};
pub use constraint::ConstraintKind;
pub use error::{ConfigError, ConfigResult};
pub use help::{HelpMenuBuilder, HelpMenuFlags};
pub use parser::{ArgParser, ParseStatus, ParserErrorFlags};
pub use path::{ExecutableFile, ExistingPath, ReadableDirectory, ReadableFile, WritableDirectory, WritableFile};
pub use value::{ArgValue, ValueErrorFlags};
