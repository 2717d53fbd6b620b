//! Command templates: declarative mount and unmount commands.
//!
//! A template is a shell-like command line with two extra constructs:
//! - `{name}`: substituted from a variable mapping
//! - `[...]`: an optional group, emitted once per combination of its values
//!
//! The result is always an argv list, never a shell string, so it can be handed
//! to a process spawner without any re-quoting.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use easyfuse_command_template::CommandTemplate;
//!
//! let template = CommandTemplate::parse("mount -t {driver} [-o {opts}] {device} {target}").unwrap();
//!
//! let vars = HashMap::from([
//!     ("driver", "fuse"),
//!     ("opts", ""),
//!     ("device", "/dev/x"),
//!     ("target", "/mnt/v"),
//! ]);
//! assert_eq!(
//!     template.expand(&vars),
//!     vec!["mount", "-t", "fuse", "/dev/x", "/mnt/v"],
//! );
//! ```

mod error;
mod lexer;
mod template;
mod variables;

pub use error::ParseError;
pub use template::{expand, CommandTemplate};
pub use variables::Variables;
