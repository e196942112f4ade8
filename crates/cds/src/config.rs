use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Environment prefix; nested keys use `__`, e.g. `CDS_WEBSERVER__PORT`.
pub const ENV_PREFIX: &str = "CDS_";

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub content: ContentConfig,
    pub webserver: WebserverConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    /// Package root. Must be an existing directory.
    pub path: PathBuf,
    /// Optional static asset directory served under `/static`.
    pub static_path: Option<PathBuf>,
    /// Optional upper bound on the bytes extracted from one archive.
    pub max_extracted_bytes: Option<u64>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("content"),
            static_path: None,
            max_extracted_bytes: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WebserverConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub base_path: String,
    pub max_upload_bytes: usize,
}

impl Default for WebserverConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            base_path: String::new(),
            max_upload_bytes: cds_server::state::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file (if present), then `CDS_*` variables.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(path: &Path) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(Path::new("missing.toml"))?;
            assert_eq!(config, Config::default());
            assert_eq!(config.webserver.port, 8080);
            Ok(())
        });
    }

    #[test]
    fn file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "cds.toml",
                r#"
                [content]
                path = "/srv/content"
                static_path = "/srv/static"

                [webserver]
                port = 9090
                base_path = "/cds"
                "#,
            )?;
            let config = Config::load(Path::new("cds.toml"))?;
            assert_eq!(config.content.path, PathBuf::from("/srv/content"));
            assert_eq!(config.content.static_path, Some(PathBuf::from("/srv/static")));
            assert_eq!(config.webserver.port, 9090);
            assert_eq!(config.webserver.base_path, "/cds");
            assert_eq!(config.content.max_extracted_bytes, None);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("cds.toml", "[webserver]\nport = 9090\n")?;
            jail.set_env("CDS_WEBSERVER__PORT", "7070");
            jail.set_env("CDS_CONTENT__MAX_EXTRACTED_BYTES", "1024");
            let config = Config::load(Path::new("cds.toml"))?;
            assert_eq!(config.webserver.port, 7070);
            assert_eq!(config.content.max_extracted_bytes, Some(1024));
            Ok(())
        });
    }

    #[test]
    fn invalid_port_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("cds.toml", "[webserver]\nport = \"eighty\"\n")?;
            assert!(Config::load(Path::new("cds.toml")).is_err());
            Ok(())
        });
    }
}
