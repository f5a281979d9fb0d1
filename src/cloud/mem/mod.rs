use crate::cloud::CallContext;
use crate::cloud::Cloud;
use crate::cloud::PortOpenRequest;
use crate::cloud::PortState;
use crate::ports::PortRule;
use failure::bail;
use failure::format_err;
use failure::Error;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// A call received by a `MemCloud`, in the order it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListInstances,
    OpenInstancePublicPorts(PortOpenRequest),
    GetInstancePortStates(String),
}

pub struct MemCloud {
    state: Rc<RefCell<MemCloudState>>,
}

struct MemCloudState {
    // insertion order doubles as listing order
    instances: Vec<MemInstance>,
    calls: Vec<Call>,
    open_attempts: usize,
    fail_list_instances: bool,
    fail_open_attempt: Option<usize>,
}

struct MemInstance {
    name: String,
    open_rules: BTreeSet<PortRule>,
}

impl MemCloud {
    pub fn new() -> Result<MemCloud, Error> {
        Ok(MemCloud {
            state: Rc::new(RefCell::new(MemCloudState {
                instances: Vec::new(),
                calls: Vec::new(),
                open_attempts: 0,
                fail_list_instances: false,
                fail_open_attempt: None,
            })),
        })
    }

    pub fn create_instance(&self, name: &str) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        if state.find_instance(name).is_some() {
            bail!("instance already exists: {}", name);
        }
        state.instances.push(MemInstance {
            name: name.to_owned(),
            open_rules: BTreeSet::new(),
        });
        Ok(())
    }

    pub fn fail_list_instances(&self) {
        self.state.borrow_mut().fail_list_instances = true;
    }

    /// Makes the `n`th open call (counting from 1) fail.
    pub fn fail_open_attempt(&self, n: usize) {
        self.state.borrow_mut().fail_open_attempt = Some(n);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn open_calls(&self) -> Vec<PortOpenRequest> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match *call {
                Call::OpenInstancePublicPorts(ref req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }
}

impl MemCloudState {
    fn find_instance(&mut self, name: &str) -> Option<&mut MemInstance> {
        self.instances.iter_mut().find(|x| x.name == name)
    }
}

impl Cloud for MemCloud {
    fn list_instances(&self, _ctx: &CallContext) -> Result<Vec<String>, Error> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::ListInstances);
        if state.fail_list_instances {
            bail!("AccessDeniedException: not authorized to get instances");
        }
        Ok(state.instances.iter().map(|x| x.name.clone()).collect())
    }

    fn open_instance_public_ports(
        &self,
        _ctx: &CallContext,
        req: &PortOpenRequest,
    ) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::OpenInstancePublicPorts(req.clone()));
        state.open_attempts += 1;
        if state.fail_open_attempt == Some(state.open_attempts) {
            bail!("ThrottlingException: rate exceeded");
        }
        let instance = state.find_instance(&req.instance_name).ok_or_else(|| {
            format_err!("NotFoundException: no such instance: {}", req.instance_name)
        })?;
        // already-open rules are left as they are
        instance.open_rules.insert(req.rule);
        Ok(())
    }

    fn get_instance_port_states(
        &self,
        _ctx: &CallContext,
        instance_name: &str,
    ) -> Result<Vec<PortState>, Error> {
        let mut state = self.state.borrow_mut();
        state
            .calls
            .push(Call::GetInstancePortStates(instance_name.to_owned()));
        let instance = state
            .find_instance(instance_name)
            .ok_or_else(|| format_err!("NotFoundException: no such instance: {}", instance_name))?;
        Ok(instance
            .open_rules
            .iter()
            .map(|&rule| PortState { rule, open: true })
            .collect())
    }
}
