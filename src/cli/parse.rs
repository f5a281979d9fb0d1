use crate::cli::Command;
use crate::cli::Config;
use crate::cli::InstanceSelector;
use crate::cli::ALL_INSTANCES;
use crate::ports::ALL_PORTS;
use clap::App;
use clap::AppSettings;
use clap::Arg;
use clap::ArgMatches;
use clap::SubCommand;
use failure::Error;
use failure::ResultExt;
use std::ffi::OsString;
use std::time::Duration;

fn region_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("region")
        .help(
            "Lightsail region to work in. Defaults to $AWS_DEFAULT_REGION. Examples:\n\
             * us-east-1\n\
             * ap-northeast-2\n\
             ",
        )
        .next_line_help(true)
        .short("r")
        .long("region")
        .takes_value(true)
}

fn instance_names_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("instanceNames")
        .help(
            "Names of the instances to work on, or \"all\" for every instance in the region.\n\
             Examples:\n\
             * all\n\
             * web-1\n\
             * web-1,web-2\n\
             ",
        )
        .next_line_help(true)
        .long("instanceNames")
        .takes_value(true)
        .multiple(true)
        .use_delimiter(true)
        .default_value(ALL_INSTANCES)
}

fn timeout_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("timeout")
        .help("Give up on any single Lightsail call after this many seconds")
        .long("timeout")
        .value_name("SECONDS")
        .takes_value(true)
}

fn define_app<'a, 'b>() -> App<'a, 'b> {
    let open_command = SubCommand::with_name("open")
        .about("Opens public ports on Lightsail instances")
        .setting(AppSettings::DeriveDisplayOrder)
        .arg(region_arg())
        .arg(instance_names_arg())
        .arg(
            Arg::with_name("ports")
                .help(
                    "Ports to open. \"all\" opens every port for every protocol; anything else \
                     is opened for TCP. Examples:\n\
                     * all\n\
                     * 22\n\
                     * 80,443\n\
                     * 60000-61000\n\
                     ",
                )
                .next_line_help(true)
                .short("p")
                .long("ports")
                .takes_value(true)
                .multiple(true)
                .default_value(ALL_PORTS),
        )
        .arg(timeout_arg());

    let status_command = SubCommand::with_name("status")
        .about("Shows the public port states of Lightsail instances")
        .setting(AppSettings::DeriveDisplayOrder)
        .arg(region_arg())
        .arg(instance_names_arg())
        .arg(timeout_arg());

    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .setting(AppSettings::GlobalVersion)
        .setting(AppSettings::VersionlessSubcommands)
        .setting(AppSettings::DeriveDisplayOrder)
        .arg(
            Arg::with_name("log-level")
                .help("Log level (error, warn, info, debug or trace); overridden by $RUST_LOG")
                .long("log-level")
                .takes_value(true)
                .default_value("info"),
        )
        .subcommand(open_command)
        .subcommand(status_command)
}

pub fn parse_from_safe<I, T>(args: I) -> Result<Config, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let app = define_app();
    let matches = app.get_matches_from_safe(args)?;

    let log_level = matches.value_of("log-level").expect("defaulted").to_owned();

    let (command, sub_matches) = match matches.subcommand() {
        ("open", Some(matches)) => {
            let ports = matches
                .values_of("ports")
                .expect("defaulted")
                .map(str::to_owned)
                .collect();
            let cmd = Command::Open {
                instances: parse_instances(matches),
                ports,
            };
            (cmd, matches)
        }
        ("status", Some(matches)) => {
            let cmd = Command::Status {
                instances: parse_instances(matches),
            };
            (cmd, matches)
        }
        _ => unreachable!(),
    };

    let region = sub_matches.value_of("region").map(str::to_owned);

    let timeout = match sub_matches.value_of("timeout") {
        Some(x) => {
            let secs = x
                .parse::<u64>()
                .with_context(|_e| format!("not a number of seconds: {}", x))?;
            Some(Duration::from_secs(secs))
        }
        None => None,
    };

    Ok(Config {
        region,
        timeout,
        log_level,
        command,
    })
}

fn parse_instances(matches: &ArgMatches<'_>) -> InstanceSelector {
    InstanceSelector::from_names(matches.values_of("instanceNames").expect("defaulted"))
}
