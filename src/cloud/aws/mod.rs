use crate::cloud::aws::port_info::from_instance_port_state;
use crate::cloud::aws::port_info::to_port_info;
use crate::cloud::CallContext;
use crate::cloud::Cloud;
use crate::cloud::PortOpenRequest;
use crate::cloud::PortState;
use failure::format_err;
use failure::Error;
use failure::ResultExt;
use log::debug;
use rusoto_core::credential::DefaultCredentialsProvider;
use rusoto_core::HttpClient;
use rusoto_core::Region;
use rusoto_core::RusotoError;
use rusoto_core::RusotoFuture;
use rusoto_lightsail::GetInstancePortStatesRequest;
use rusoto_lightsail::GetInstancesRequest;
use rusoto_lightsail::Lightsail;
use rusoto_lightsail::LightsailClient;
use rusoto_lightsail::OpenInstancePublicPortsRequest;
use std::env;
use std::str::FromStr;

mod port_info;

pub struct AwsCloud {
    client: Box<dyn Lightsail>,
    region: Region,
}

impl AwsCloud {
    pub fn new(region: Option<&str>) -> Result<AwsCloud, Error> {
        let region = match region {
            Some(region_str) => Region::from_str(region_str)
                .with_context(|_e| format!("not an AWS region: {}", region_str))?,
            None => AwsCloud::default_region()?,
        };
        let provider =
            DefaultCredentialsProvider::new().context("could not create credentials provider")?;
        let http_client = HttpClient::new().context("could not create TLS client")?;
        let lightsail = LightsailClient::new_with(http_client, provider, region.clone());
        debug!("Created Lightsail client for region: {}", region.name());
        Ok(AwsCloud {
            client: Box::new(lightsail),
            region,
        })
    }

    fn default_region() -> Result<Region, Error> {
        let region_str = env::var("AWS_DEFAULT_REGION")
            .context("no region given: pass --region or set AWS_DEFAULT_REGION")?;
        let region = Region::from_str(&region_str)
            .with_context(|_e| format!("env var AWS_DEFAULT_REGION is invalid: {}", region_str))?;
        Ok(region)
    }
}

fn sync<T, E>(ctx: &CallContext, fut: RusotoFuture<T, E>) -> Result<T, RusotoError<E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    match ctx.timeout() {
        Some(timeout) => fut.with_timeout(timeout).sync(),
        None => fut.sync(),
    }
}

impl Cloud for AwsCloud {
    fn list_instances(&self, ctx: &CallContext) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();
        let mut page_token = None;
        loop {
            let req = GetInstancesRequest {
                page_token: page_token.take(),
                ..Default::default()
            };
            let resp = sync(ctx, self.client.get_instances(req)).with_context(|_e| {
                format!("failed to get instances in region: {}", self.region.name())
            })?;
            for instance in resp.instances.unwrap_or_default() {
                let name = instance
                    .name
                    .ok_or_else(|| format_err!("expected instance to have a name"))?;
                names.push(name);
            }
            match resp.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(names)
    }

    fn open_instance_public_ports(
        &self,
        ctx: &CallContext,
        req: &PortOpenRequest,
    ) -> Result<(), Error> {
        let input = OpenInstancePublicPortsRequest {
            instance_name: req.instance_name.clone(),
            port_info: to_port_info(&req.rule),
            ..Default::default()
        };
        debug!("Sending request: {:?}", input);
        sync(ctx, self.client.open_instance_public_ports(input))
            .with_context(|_e| format!("Lightsail rejected request: {:?}", req))?;
        Ok(())
    }

    fn get_instance_port_states(
        &self,
        ctx: &CallContext,
        instance_name: &str,
    ) -> Result<Vec<PortState>, Error> {
        let input = GetInstancePortStatesRequest {
            instance_name: instance_name.to_owned(),
            ..Default::default()
        };
        let resp = sync(ctx, self.client.get_instance_port_states(input))
            .with_context(|_e| format!("failed to get port states: {}", instance_name))?;
        resp.port_states
            .unwrap_or_default()
            .into_iter()
            .map(from_instance_port_state)
            .collect()
    }
}
