use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "PINHOLE_LISTEN_ADDR";
pub const ALGORITHM_ENV: &str = "PINHOLE_ALGORITHM";
pub const CACHE_TTL_SECS_ENV: &str = "PINHOLE_CACHE_TTL_SECS";
pub const MAX_GENERATION_ATTEMPTS_ENV: &str = "PINHOLE_MAX_GENERATION_ATTEMPTS";
pub const SWEEP_INTERVAL_SECS_ENV: &str = "PINHOLE_SWEEP_INTERVAL_SECS";
pub const SHUTDOWN_GRACE_SECS_ENV: &str = "PINHOLE_SHUTDOWN_GRACE_SECS";
pub const PUBLIC_BASE_URL_ENV: &str = "PINHOLE_PUBLIC_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "PINHOLE_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "PINHOLE_MYSQL_DSN";
pub const CACHE_BACKEND_ENV: &str = "PINHOLE_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "PINHOLE_REDIS_URL";
pub const CACHE_CAPACITY_ENV: &str = "PINHOLE_CACHE_CAPACITY";
pub const LOG_FORMAT_ENV: &str = "PINHOLE_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_ALGORITHM: &str = "base62";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_MAX_GENERATION_ATTEMPTS: u32 = 5;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60 * 60;
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "none")]
    Disabled,
    #[value(name = "memory")]
    Memory,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::Disabled => write!(f, "none"),
            CacheBackendArg::Memory => write!(f, "memory"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "pinhole-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Code generation strategy: base62, base64, md5 or random.
    #[arg(long, env = ALGORITHM_ENV, default_value = DEFAULT_ALGORITHM)]
    pub algorithm: String,

    #[arg(long, env = CACHE_TTL_SECS_ENV, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    /// Codes tried per create before giving up, for strategies that can collide.
    #[arg(
        long,
        env = MAX_GENERATION_ATTEMPTS_ENV,
        default_value_t = DEFAULT_MAX_GENERATION_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_generation_attempts: u32,

    #[arg(
        long,
        env = SWEEP_INTERVAL_SECS_ENV,
        default_value_t = DEFAULT_SWEEP_INTERVAL_SECS
    )]
    pub sweep_interval_secs: u64,

    #[arg(
        long,
        env = SHUTDOWN_GRACE_SECS_ENV,
        default_value_t = DEFAULT_SHUTDOWN_GRACE_SECS
    )]
    pub shutdown_grace_secs: u64,

    /// Base URL prepended to short codes in create responses.
    #[arg(long, env = PUBLIC_BASE_URL_ENV)]
    pub public_base_url: Option<String>,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Memory
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("cache", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = CACHE_CAPACITY_ENV, default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_generation_attempts_defaults_and_overrides() {
        let cli = CLI::try_parse_from(["pinhole-gateway"]).unwrap();
        assert_eq!(cli.max_generation_attempts, DEFAULT_MAX_GENERATION_ATTEMPTS);

        let cli =
            CLI::try_parse_from(["pinhole-gateway", "--max-generation-attempts", "9"]).unwrap();
        assert_eq!(cli.max_generation_attempts, 9);
    }

    #[test]
    fn zero_generation_attempts_is_rejected() {
        assert!(CLI::try_parse_from(["pinhole-gateway", "--max-generation-attempts", "0"]).is_err());
    }
}
