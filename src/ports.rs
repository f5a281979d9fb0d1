use failure::Fail;
use std::fmt;
use std::result;
use std::str;

/// Port token meaning every port over every protocol.
pub const ALL_PORTS: &str = "all";

#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PortRange(pub u16, pub u16);

impl PortRange {
    pub const FULL: PortRange = PortRange(0, 65_535);

    pub fn single(port: u16) -> PortRange {
        PortRange(port, port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let &PortRange(ref from, ref to) = self;
        if from == to {
            write!(f, "{}", from)
        } else {
            write!(f, "{}-{}", from, to)
        }
    }
}

impl fmt::Debug for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Fail, Debug, Clone, PartialEq, Eq)]
pub enum ParsePortSpecError {
    #[fail(display = "not a port number: {:?}", _0)]
    NotAPort(String),
    #[fail(display = "port range runs backwards: {}", _0)]
    Reversed(String),
}

fn parse_port(s: &str) -> result::Result<u16, ParsePortSpecError> {
    s.trim()
        .parse::<u16>()
        .map_err(|_| ParsePortSpecError::NotAPort(s.to_owned()))
}

impl str::FromStr for PortRange {
    type Err = ParsePortSpecError;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        let parts = s
            .split('-')
            .map(|x| {
                if s.contains('-') && x.trim().is_empty() {
                    Err(ParsePortSpecError::NotAPort(s.to_owned()))
                } else {
                    parse_port(x)
                }
            })
            .collect::<result::Result<Vec<_>, Self::Err>>()?;
        match parts.len() {
            1 => Ok(PortRange::single(parts[0])),
            2 if parts[0] <= parts[1] => Ok(PortRange(parts[0], parts[1])),
            2 => Err(ParsePortSpecError::Reversed(s.to_owned())),
            _ => Err(ParsePortSpecError::NotAPort(s.to_owned())),
        }
    }
}

/// Parses `"80-100"`, `"80,443"` or `"80"` into port ranges.
///
/// A dash takes precedence over commas, so `"80-90,100"` is read as a range
/// whose upper bound is `"90,100"` and rejected.
pub fn parse_port_ranges(s: &str) -> result::Result<Vec<PortRange>, ParsePortSpecError> {
    if s.contains('-') {
        Ok(vec![s.parse()?])
    } else if s.contains(',') {
        s.split(',')
            .map(|x| parse_port(x).map(PortRange::single))
            .collect()
    } else {
        Ok(vec![PortRange::single(parse_port(s)?)])
    }
}

#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    All,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmp => "icmp",
            Protocol::All => "all",
        };
        f.write_str(s)
    }
}

impl fmt::Debug for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Fail, Debug, Clone, PartialEq, Eq)]
#[fail(display = "unknown protocol: {}", _0)]
pub struct ParseProtocolError(String);

impl str::FromStr for Protocol {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            "icmp" => Ok(Protocol::Icmp),
            "all" => Ok(Protocol::All),
            x => Err(ParseProtocolError(x.to_owned())),
        }
    }
}

/// A protocol together with the ports it applies to.
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PortRule {
    pub protocol: Protocol,
    pub range: PortRange,
}

impl PortRule {
    pub fn all() -> PortRule {
        PortRule {
            protocol: Protocol::All,
            range: PortRange::FULL,
        }
    }

    pub fn tcp(range: PortRange) -> PortRule {
        PortRule {
            protocol: Protocol::Tcp,
            range,
        }
    }
}

impl fmt::Display for PortRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.range, self.protocol)
    }
}

impl fmt::Debug for PortRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSpec {
    All,
    Ranges(Vec<PortRange>),
}

impl PortSpec {
    pub fn rules(&self) -> Vec<PortRule> {
        match *self {
            PortSpec::All => vec![PortRule::all()],
            PortSpec::Ranges(ref ranges) => ranges.iter().cloned().map(PortRule::tcp).collect(),
        }
    }
}

impl str::FromStr for PortSpec {
    type Err = ParsePortSpecError;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        if s == ALL_PORTS {
            Ok(PortSpec::All)
        } else {
            parse_port_ranges(s).map(PortSpec::Ranges)
        }
    }
}
