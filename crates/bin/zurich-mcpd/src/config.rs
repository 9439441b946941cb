use clap::{Parser, ValueEnum};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;

use reqwest::Url;
use zurich_core::Endpoints;

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";

/// Transport the MCP server is exposed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    Stdio,
    Http,
}

#[derive(Parser, Debug)]
#[command(
    name = "zurich-mcpd",
    version,
    about = "MCP server for the open data of the City of Zurich."
)]
struct CliArgs {
    #[arg(long, value_enum, env = "ZURICH_MCP_TRANSPORT", default_value = "stdio")]
    transport: Transport,

    #[arg(long, env = "ZURICH_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    http_addr: SocketAddr,

    #[arg(long, env = "ZURICH_CATALOG_URL")]
    catalog_url: Option<String>,

    #[arg(long, env = "ZURICH_CATALOG_SITE")]
    catalog_site: Option<String>,

    #[arg(long, env = "ZURICH_GEODATA_URL")]
    geodata_url: Option<String>,

    #[arg(long, env = "ZURICH_RECORDS_URL")]
    records_url: Option<String>,

    #[arg(long, env = "ZURICH_TOURISM_URL")]
    tourism_url: Option<String>,

    #[arg(long, env = "ZURICH_SPARQL_URL")]
    sparql_url: Option<String>,

    #[arg(long, env = "ZURICH_PARKING_URL")]
    parking_url: Option<String>,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct ZurichConfig {
    pub transport: Transport,
    pub http_addr: SocketAddr,
    pub endpoints: Endpoints,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl ZurichConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

/// Trimmed override, rejected unless it is an absolute http(s) URL.
fn endpoint(name: &'static str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    let Some(value) = value.map(|value| value.trim().to_string()) else {
        return Ok(None);
    };
    if value.is_empty() {
        return Ok(None);
    }
    let valid = Url::parse(&value).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https")
            && url.host_str().is_some_and(|host| !host.is_empty())
    });
    if !valid {
        return Err(ConfigError::InvalidSetting { name, value });
    }
    Ok(Some(value.trim_end_matches('/').to_string()))
}

impl TryFrom<CliArgs> for ZurichConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let mut endpoints = Endpoints::zurich();
        if let Some(url) = endpoint("ZURICH_CATALOG_SITE", args.catalog_site)? {
            endpoints = endpoints.with_catalog_site(url);
        }
        if let Some(url) = endpoint("ZURICH_CATALOG_URL", args.catalog_url)? {
            endpoints = endpoints.with_catalog(url);
        }
        if let Some(url) = endpoint("ZURICH_GEODATA_URL", args.geodata_url)? {
            endpoints = endpoints.with_geodata(url);
        }
        if let Some(url) = endpoint("ZURICH_RECORDS_URL", args.records_url)? {
            endpoints = endpoints.with_records(url);
        }
        if let Some(url) = endpoint("ZURICH_TOURISM_URL", args.tourism_url)? {
            endpoints = endpoints.with_tourism(url);
        }
        if let Some(url) = endpoint("ZURICH_SPARQL_URL", args.sparql_url)? {
            endpoints = endpoints.with_sparql(url);
        }
        if let Some(url) = endpoint("ZURICH_PARKING_URL", args.parking_url)? {
            endpoints = endpoints.with_parking(url);
        }

        Ok(Self {
            transport: args.transport,
            http_addr: args.http_addr,
            endpoints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            transport: Transport::Stdio,
            http_addr: DEFAULT_MCP_HTTP_ADDR.parse().expect("valid MCP addr"),
            catalog_url: None,
            catalog_site: None,
            geodata_url: None,
            records_url: None,
            tourism_url: None,
            sparql_url: None,
            parking_url: None,
        }
    }

    #[test]
    fn defaults_to_production_endpoints() {
        let config = ZurichConfig::try_from(base_args()).expect("config should parse");

        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.endpoints, Endpoints::zurich());
    }

    #[test]
    fn overrides_replace_single_endpoints() {
        let mut args = base_args();
        args.sparql_url = Some(" http://localhost:3030/query/ ".to_string());
        args.parking_url = Some("   ".to_string());

        let config = ZurichConfig::try_from(args).expect("config should parse");

        assert_eq!(config.endpoints.sparql, "http://localhost:3030/query");
        assert_eq!(config.endpoints.parking, Endpoints::zurich().parking);
    }

    #[test]
    fn rejects_relative_urls() {
        let mut args = base_args();
        args.records_url = Some("gemeinderat/api".to_string());

        let err = ZurichConfig::try_from(args).expect_err("relative URL");

        assert_eq!(
            err,
            ConfigError::InvalidSetting {
                name: "ZURICH_RECORDS_URL",
                value: "gemeinderat/api".to_string(),
            }
        );
    }

    #[test]
    fn rejects_other_schemes_and_missing_hosts() {
        for value in ["ftp://data.stadt-zuerich.ch", "https://", "file:///tmp/query", "http//host"] {
            let mut args = base_args();
            args.sparql_url = Some(value.to_string());
            assert_eq!(
                ZurichConfig::try_from(args).expect_err(value),
                ConfigError::InvalidSetting {
                    name: "ZURICH_SPARQL_URL",
                    value: value.to_string(),
                }
            );
        }
    }

    #[test]
    fn transport_parses_from_cli() {
        let args = CliArgs::try_parse_from(["zurich-mcpd", "--transport", "http"])
            .expect("args should parse");
        assert_eq!(args.transport, Transport::Http);
    }
}
