mod dispatch;
mod parse;

pub use crate::cli::dispatch::dispatch;
pub use crate::cli::parse::parse_from_safe;

use crate::cloud::CallContext;
use std::time::Duration;

/// Instance name meaning every instance in the region.
pub const ALL_INSTANCES: &str = "all";

/// Everything one invocation needs, built once from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub region: Option<String>,
    pub timeout: Option<Duration>,
    pub log_level: String,
    pub command: Command,
}

impl Config {
    pub fn call_context(&self) -> CallContext {
        CallContext::new(self.timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open {
        instances: InstanceSelector,
        ports: Vec<String>,
    },
    Status {
        instances: InstanceSelector,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceSelector {
    All,
    Named(Vec<String>),
}

impl InstanceSelector {
    /// Only a lone `all` selects every instance; otherwise names are taken literally.
    pub fn from_names<I, S>(names: I) -> InstanceSelector
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() == 1 && names[0] == ALL_INSTANCES {
            InstanceSelector::All
        } else {
            InstanceSelector::Named(names)
        }
    }
}
