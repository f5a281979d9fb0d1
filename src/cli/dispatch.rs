use crate::cli::Command;
use crate::cli::InstanceSelector;
use crate::cloud::CallContext;
use crate::cloud::Cloud;
use crate::cloud::PortOpenRequest;
use crate::cloud::PortState;
use crate::ports::PortRule;
use crate::ports::PortSpec;
use crate::ports::ALL_PORTS;
use failure::Error;
use failure::ResultExt;
use log::info;
use log::warn;

pub fn dispatch<C>(cmd: Command, cloud: &C, ctx: &CallContext) -> Result<(), Error>
where
    C: Cloud,
{
    info!("Running command: {:?}", cmd);

    match cmd {
        Command::Open {
            ref instances,
            ref ports,
        } => {
            let opened = open_ports(cloud, ctx, instances, ports)?;
            info!("Opened {} port rule(s)", opened.len());
            println!("Ports opened successfully.");
        }
        Command::Status { ref instances } => {
            for (name, states) in port_states(cloud, ctx, instances)? {
                println!("{}:", name);
                if states.is_empty() {
                    println!("  no public ports");
                }
                for state in states {
                    println!("  {}", state);
                }
            }
        }
    }

    Ok(())
}

fn resolve_instances<C>(
    cloud: &C,
    ctx: &CallContext,
    instances: &InstanceSelector,
) -> Result<Vec<String>, Error>
where
    C: Cloud,
{
    match *instances {
        InstanceSelector::All => {
            let names = cloud
                .list_instances(ctx)
                .context("failed to list instances")?;
            info!("Found instances: {:?}", names);
            Ok(names)
        }
        InstanceSelector::Named(ref names) => Ok(names.clone()),
    }
}

/// Expands the port tokens for one instance into requests, each paired with
/// the token it came from.
fn plan_requests<'a>(
    instance_name: &str,
    ports: &'a [String],
) -> Result<Vec<(&'a str, PortOpenRequest)>, Error> {
    let mut plan = Vec::new();
    let mut all_ports = false;
    for port in ports {
        let spec = port
            .parse::<PortSpec>()
            .with_context(|_e| format!("invalid port {} for instance {}", port, instance_name))?;
        match spec {
            PortSpec::All => all_ports = true,
            PortSpec::Ranges(_) => {
                for rule in spec.rules() {
                    plan.push((port.as_str(), PortOpenRequest::new(instance_name, rule)));
                }
            }
        }
    }

    // every port over every protocol subsumes the rest
    if all_ports {
        if ports.len() > 1 {
            info!(
                "Opening all ports on {}, ignoring other ports: {:?}",
                instance_name, ports
            );
        }
        plan = vec![(ALL_PORTS, PortOpenRequest::new(instance_name, PortRule::all()))];
    }

    Ok(plan)
}

/// Opens every port token on every selected instance, one call at a time,
/// stopping at the first failure. Returns the requests that went through.
pub fn open_ports<C>(
    cloud: &C,
    ctx: &CallContext,
    instances: &InstanceSelector,
    ports: &[String],
) -> Result<Vec<PortOpenRequest>, Error>
where
    C: Cloud,
{
    let names = resolve_instances(cloud, ctx, instances)?;

    let mut opened = Vec::new();
    for name in &names {
        info!("Processing instance: {}", name);

        for (port, req) in plan_requests(name, ports)? {
            if let Err(err) = cloud.open_instance_public_ports(ctx, &req) {
                if !opened.is_empty() {
                    warn!(
                        "{} port rule(s) were opened before the failure: {:?}",
                        opened.len(),
                        opened
                    );
                }
                let msg = if port == ALL_PORTS {
                    format!("failed to open all ports for instance {}", name)
                } else {
                    format!("failed to open port {} for instance {}", port, name)
                };
                return Err(err.context(msg).into());
            }
            info!("Opened: {:?}", req);
            opened.push(req);
        }
    }

    Ok(opened)
}

pub fn port_states<C>(
    cloud: &C,
    ctx: &CallContext,
    instances: &InstanceSelector,
) -> Result<Vec<(String, Vec<PortState>)>, Error>
where
    C: Cloud,
{
    let names = resolve_instances(cloud, ctx, instances)?;

    let mut states = Vec::new();
    for name in names {
        let instance_states = cloud
            .get_instance_port_states(ctx, &name)
            .with_context(|_e| format!("failed to get port states for instance {}", name))?;
        states.push((name, instance_states));
    }
    Ok(states)
}
