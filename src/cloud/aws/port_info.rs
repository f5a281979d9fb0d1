use crate::cloud::PortState;
use crate::ports::PortRange;
use crate::ports::PortRule;
use crate::ports::Protocol;
use failure::bail;
use failure::format_err;
use failure::Error;
use failure::ResultExt;
use rusoto_lightsail::InstancePortState;
use rusoto_lightsail::PortInfo;
use std::convert::TryFrom;

pub(super) fn to_port_info(rule: &PortRule) -> PortInfo {
    let &PortRule {
        protocol,
        range: PortRange(from, to),
    } = rule;
    PortInfo {
        from_port: Some(from.into()),
        to_port: Some(to.into()),
        protocol: Some(protocol.to_string()),
        ..Default::default()
    }
}

pub(super) fn from_instance_port_state(state: InstancePortState) -> Result<PortState, Error> {
    let protocol_str = state
        .protocol
        .ok_or_else(|| format_err!("expected port state to have a protocol"))?;
    let protocol: Protocol = protocol_str.parse()?;
    let from = to_port(state.from_port)?;
    let to = to_port(state.to_port)?;
    let open = match state.state.as_ref().map(String::as_str) {
        Some("open") => true,
        Some("closed") => false,
        x => bail!("unknown port state: {:?}", x),
    };
    Ok(PortState {
        rule: PortRule {
            protocol,
            range: PortRange(from, to),
        },
        open,
    })
}

fn to_port(port: Option<i64>) -> Result<u16, Error> {
    let port = port.ok_or_else(|| format_err!("expected port state to have a port"))?;
    let port = u16::try_from(port).with_context(|_e| format!("not a port number: {}", port))?;
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_port_info() {
        let info = to_port_info(&PortRule::tcp(PortRange(80, 100)));
        assert_eq!(Some(80), info.from_port);
        assert_eq!(Some(100), info.to_port);
        assert_eq!(Some("tcp".to_owned()), info.protocol);

        let info = to_port_info(&PortRule::all());
        assert_eq!(Some(0), info.from_port);
        assert_eq!(Some(65_535), info.to_port);
        assert_eq!(Some("all".to_owned()), info.protocol);
    }

    #[test]
    fn test_from_instance_port_state() {
        let state = from_instance_port_state(InstancePortState {
            from_port: Some(443),
            to_port: Some(443),
            protocol: Some("tcp".to_owned()),
            state: Some("open".to_owned()),
            ..Default::default()
        }).unwrap();
        assert_eq!("443/tcp open", state.to_string());

        let state = from_instance_port_state(InstancePortState {
            from_port: Some(0),
            to_port: Some(65_535),
            protocol: Some("all".to_owned()),
            state: Some("closed".to_owned()),
            ..Default::default()
        }).unwrap();
        assert_eq!("0-65535/all closed", state.to_string());
    }

    #[test]
    fn test_from_bad_instance_port_state() {
        let err = from_instance_port_state(InstancePortState {
            from_port: Some(70_000),
            to_port: Some(70_000),
            protocol: Some("tcp".to_owned()),
            state: Some("open".to_owned()),
            ..Default::default()
        }).unwrap_err();
        assert_eq!("not a port number: 70000", err.to_string());

        let err = from_instance_port_state(InstancePortState {
            from_port: Some(22),
            to_port: Some(22),
            protocol: Some("sctp".to_owned()),
            state: Some("open".to_owned()),
            ..Default::default()
        }).unwrap_err();
        assert_eq!("unknown protocol: sctp", err.to_string());

        let err = from_instance_port_state(InstancePortState {
            from_port: Some(22),
            to_port: Some(22),
            protocol: None,
            state: Some("open".to_owned()),
            ..Default::default()
        }).unwrap_err();
        assert_eq!("expected port state to have a protocol", err.to_string());

        let err = from_instance_port_state(InstancePortState {
            from_port: Some(22),
            to_port: Some(22),
            protocol: Some("tcp".to_owned()),
            state: Some("pending".to_owned()),
            ..Default::default()
        }).unwrap_err();
        assert_eq!("unknown port state: Some(\"pending\")", err.to_string());

        let err = from_instance_port_state(InstancePortState {
            from_port: None,
            to_port: Some(22),
            protocol: Some("tcp".to_owned()),
            state: Some("open".to_owned()),
            ..Default::default()
        }).unwrap_err();
        assert_eq!("expected port state to have a port", err.to_string());
    }
}
