mod cli;
mod cloud;
mod ports;

use crate::cli::Config;
use crate::cloud::aws::AwsCloud;
use failure::Error;
use std::env;
use std::process;

fn main() {
    let config = cli::parse_from_safe(env::args_os()).unwrap_or_else(|err| {
        match err.downcast::<clap::Error>() {
            // usage errors, --help and --version
            Ok(clap_err) => clap_err.exit(),
            Err(err) => exit_with(&err),
        }
    });

    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, &config.log_level),
    );
    openssl_probe::init_ssl_cert_env_vars();

    if let Err(err) = run(config) {
        exit_with(&err);
    }
}

fn run(config: Config) -> Result<(), Error> {
    let cloud = AwsCloud::new(config.region.as_ref().map(String::as_str))?;
    let ctx = config.call_context();
    cli::dispatch(config.command, &cloud, &ctx)
}

fn exit_with(err: &Error) -> ! {
    eprintln!("error: {}", err);
    for cause in err.iter_chain().skip(1) {
        eprintln!("caused by: {}", cause);
    }
    process::exit(1);
}
