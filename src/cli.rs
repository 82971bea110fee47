//! Command-line argument parsing for BlueQuery.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Natural-language query backend for ARGO ocean float data.
#[derive(Parser, Debug)]
#[command(name = "bluequery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(
        long,
        value_name = "ADDR",
        env = "BLUEQUERY_BIND",
        default_value = "127.0.0.1:8000"
    )]
    pub bind: SocketAddr,

    /// SQLite database file (overrides ARGO_DB_PATH)
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_default_bind_address() {
        let cli = parse_args(&["bluequery"]);
        assert_eq!(cli.bind, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(cli.db, None);
    }

    #[test]
    fn test_parse_bind_address() {
        let cli = parse_args(&["bluequery", "--bind", "0.0.0.0:9000"]);
        assert_eq!(cli.bind, "0.0.0.0:9000".parse().unwrap());
    }

    #[test]
    fn test_parse_db_override() {
        let cli = parse_args(&["bluequery", "--db", "/data/argo.db"]);
        assert_eq!(cli.db, Some(PathBuf::from("/data/argo.db")));
    }
}
