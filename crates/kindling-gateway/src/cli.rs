use clap::Parser;
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "KINDLING_GATEWAY_LISTEN_ADDR";
pub const UPSTREAM_BASE_URL_ENV: &str = "KINDLING_UPSTREAM_BASE_URL";
pub const UPSTREAM_TIMEOUT_SECS_ENV: &str = "KINDLING_UPSTREAM_TIMEOUT_SECS";
pub const IDS_TTL_SECS_ENV: &str = "KINDLING_IDS_TTL_SECS";
pub const STORY_TTL_SECS_ENV: &str = "KINDLING_STORY_TTL_SECS";
pub const MAX_CONCURRENT_FETCHES_ENV: &str = "KINDLING_MAX_CONCURRENT_FETCHES";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "kindling-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(long, env = UPSTREAM_BASE_URL_ENV, default_value = kindling_client::DEFAULT_BASE_URL)]
    pub upstream_base_url: String,

    #[arg(long, env = UPSTREAM_TIMEOUT_SECS_ENV, default_value_t = 30)]
    pub upstream_timeout_secs: u64,

    #[arg(long, env = IDS_TTL_SECS_ENV, default_value_t = 300)]
    pub ids_ttl_secs: u64,

    #[arg(long, env = STORY_TTL_SECS_ENV, default_value_t = 300)]
    pub story_ttl_secs: u64,

    #[arg(
        long,
        env = MAX_CONCURRENT_FETCHES_ENV,
        default_value_t = kindling_aggregator::DEFAULT_MAX_CONCURRENT_FETCHES
    )]
    pub max_concurrent_fetches: usize,
}
