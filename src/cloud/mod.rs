pub mod aws;
#[cfg(test)]
pub mod mem;

use crate::ports::PortRule;
use failure::Error;
use std::fmt;
use std::time::Duration;

/// The Lightsail operations this tool needs from a region.
pub trait Cloud {
    fn list_instances(&self, ctx: &CallContext) -> Result<Vec<String>, Error>;
    fn open_instance_public_ports(
        &self,
        ctx: &CallContext,
        req: &PortOpenRequest,
    ) -> Result<(), Error>;
    fn get_instance_port_states(
        &self,
        ctx: &CallContext,
        instance_name: &str,
    ) -> Result<Vec<PortState>, Error>;
}

/// Per-invocation settings applied to every call made against the cloud.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CallContext {
    timeout: Option<Duration>,
}

impl CallContext {
    pub fn new(timeout: Option<Duration>) -> CallContext {
        CallContext { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[derive(Clone, Hash, PartialEq, Eq)]
pub struct PortOpenRequest {
    pub instance_name: String,
    pub rule: PortRule,
}

impl PortOpenRequest {
    pub fn new<S: Into<String>>(instance_name: S, rule: PortRule) -> PortOpenRequest {
        PortOpenRequest {
            instance_name: instance_name.into(),
            rule,
        }
    }
}

impl fmt::Debug for PortOpenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.rule, self.instance_name)
    }
}

#[derive(Copy, Clone, Hash, PartialEq, Eq)]
pub struct PortState {
    pub rule: PortRule,
    pub open: bool,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.open { "open" } else { "closed" };
        write!(f, "{} {}", self.rule, state)
    }
}

impl fmt::Debug for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
