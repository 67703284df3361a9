//! Command-line arguments of the server binary.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerArgs {
    /// Path to a TOML/JSON/YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,
}

impl ServerArgs {
    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let args = ServerArgs::parse_from(["floor-server", "--port", "7000", "-c", "floor.toml"]);
        assert_eq!(args.port(), Some(7000));
        assert_eq!(args.config_path(), Some(&PathBuf::from("floor.toml")));
        assert_eq!(args.host(), None);
    }
}
