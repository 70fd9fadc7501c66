use std::io::Read;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use gma3osc_frame::{Dispatcher, Protocol};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurfaceError};
use crate::registry::Naming;

/// Largest configuration file accepted by [`SurfaceConfig::from_path`].
pub const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Which input level means "pressed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    /// Pull-up wiring: the input reads low while the button is held.
    #[default]
    ActiveLow,
    /// The input reads high while the button is held.
    ActiveHigh,
}

impl Polarity {
    pub fn is_pressed(self, level: bool) -> bool {
        match self {
            Polarity::ActiveLow => !level,
            Polarity::ActiveHigh => level,
        }
    }

}

/// Encoder counting direction, depending on how the encoder is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// Fader sampling and mapping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaderConfig {
    /// Minimum time between two samples.
    pub update_interval_ms: u64,
    /// A sample is ignored unless it moves more than this from the last accepted one.
    pub threshold: i32,
    /// Raw reading mapped to 0.
    pub input_min: i32,
    /// Raw reading mapped to 100.
    pub input_max: i32,
    /// Distance from the fetch target that releases the lock.
    pub fetch_delta: i32,
}

impl Default for FaderConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 1,
            threshold: 4,
            input_min: 8,
            input_max: 1015,
            fetch_delta: 2,
        }
    }
}

impl FaderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.input_max <= self.input_min {
            return Err(SurfaceError::Config(format!(
                "fader input range {}..{} is empty",
                self.input_min, self.input_max
            )));
        }
        if self.threshold < 0 || self.fetch_delta < 0 {
            return Err(SurfaceError::Config(
                "fader threshold and fetch delta must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// What a navigator does with a new pool/page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigatorMode {
    /// Only update the registry's common number.
    Local,
    /// Only tell the console.
    Console,
    /// Update the registry and tell the console.
    #[default]
    Global,
}

impl NavigatorMode {
    pub fn updates_registry(self) -> bool {
        matches!(self, NavigatorMode::Local | NavigatorMode::Global)
    }

    pub fn sends_to_console(self) -> bool {
        matches!(self, NavigatorMode::Console | NavigatorMode::Global)
    }
}

/// Bounds and delivery mode of a pool or page navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigatorConfig {
    pub start: u16,
    pub end: u16,
    pub mode: NavigatorMode,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            start: 1,
            end: 4,
            mode: NavigatorMode::Global,
        }
    }
}

impl NavigatorConfig {
    pub fn new(start: u16, end: u16, mode: NavigatorMode) -> Self {
        Self { start, end, mode }
    }

    pub fn validate(&self) -> Result<()> {
        if self.start == 0 || self.start > self.end {
            return Err(SurfaceError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// A remote OSC receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Endpoint {
    pub transport: Protocol,
    pub host: String,
    /// Defaults to the console port for `transport`.
    pub port: Option<u16>,
    /// Bound on one stream connect attempt. Ignored for UDP.
    pub connect_timeout_ms: u64,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            transport: Protocol::Udp,
            host: "127.0.0.1".to_string(),
            port: None,
            connect_timeout_ms: 500,
        }
    }
}

impl Endpoint {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.transport.default_port())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(SurfaceError::Config("endpoint host is empty".to_string()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(SurfaceError::Config(format!(
                "connect timeout for {} must be at least 1 ms",
                self.host
            )));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(gma3osc_transport::resolve(&self.host, self.port())?)
    }

    /// Open a dispatcher for this endpoint.
    pub fn open(&self) -> Result<Dispatcher> {
        Ok(Dispatcher::open_with_timeout(
            self.transport,
            self.socket_addr()?,
            self.connect_timeout(),
        )?)
    }
}

/// Complete surface configuration, as loaded from a JSON file.
///
/// ```json
/// {
///   "naming": { "prefix": "gma3", "pool": "DataPool", "page": "Page" },
///   "console": { "transport": "udp", "host": "192.168.1.10", "port": 8000 },
///   "external": { "transport": "udp", "host": "192.168.1.20", "port": 53000 },
///   "fader": { "threshold": 4, "fetch_delta": 2 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurfaceConfig {
    pub naming: Naming,
    pub console: Endpoint,
    pub external: Option<Endpoint>,
    pub fader: FaderConfig,
}

impl SurfaceConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: SurfaceConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|err| SurfaceError::Config(format!("{}: {err}", path.display())))?;
        let size = file.metadata()?.len();
        if size > MAX_CONFIG_FILE_SIZE {
            return Err(SurfaceError::Config(format!(
                "{} is {size} bytes (max {MAX_CONFIG_FILE_SIZE})",
                path.display()
            )));
        }

        let mut text = String::new();
        file.take(MAX_CONFIG_FILE_SIZE).read_to_string(&mut text)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.naming.validate()?;
        self.fader.validate()?;
        self.console.validate()?;
        if let Some(external) = &self.external {
            external.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_console_conventions() {
        let config = SurfaceConfig::default();
        assert_eq!(config.naming.prefix, "gma3");
        assert_eq!(config.console.transport, Protocol::Udp);
        assert_eq!(config.console.port(), 8000);
        assert!(config.external.is_none());
        assert_eq!(config.fader.threshold, 4);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SurfaceConfig::from_json(
            r#"{
                "naming": { "prefix": "", "page": "Pg" },
                "console": { "transport": "tcp-slip", "host": "10.0.0.5" },
                "external": { "host": "10.0.0.6", "port": 53000 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.naming.prefix, "");
        assert_eq!(config.naming.page, "Pg");
        assert_eq!(config.naming.key, "Key");
        assert_eq!(config.console.transport, Protocol::TcpSlip);
        assert_eq!(config.console.port(), 9000);
        let external = config.external.unwrap();
        assert_eq!(external.transport, Protocol::Udp);
        assert_eq!(external.port(), 53000);
    }

    #[test]
    fn connect_timeout_reaches_endpoint() {
        let config = SurfaceConfig::from_json(
            r#"{ "console": { "transport": "tcp", "host": "10.0.0.5", "connect_timeout_ms": 250 } }"#,
        )
        .unwrap();
        assert_eq!(config.console.connect_timeout(), Duration::from_millis(250));
        assert_eq!(
            SurfaceConfig::default().console.connect_timeout(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn zero_connect_timeout_is_rejected() {
        let err = SurfaceConfig::from_json(
            r#"{ "external": { "host": "10.0.0.6", "connect_timeout_ms": 0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SurfaceError::Config(_)));
    }

    #[test]
    fn tcp_endpoint_opens_lazily() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = Endpoint {
            transport: Protocol::Tcp,
            host: "127.0.0.1".to_string(),
            port: Some(listener.local_addr().unwrap().port()),
            connect_timeout_ms: 200,
        };
        let dispatcher = endpoint.open().unwrap();
        assert_eq!(dispatcher.protocol(), Protocol::Tcp);
        assert!(!dispatcher.is_connected());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = SurfaceConfig::from_json(r#"{ "consle": {} }"#).unwrap_err();
        assert!(matches!(err, SurfaceError::Json(_)));
    }

    #[test]
    fn invalid_fader_range_is_rejected() {
        let err =
            SurfaceConfig::from_json(r#"{ "fader": { "input_min": 10, "input_max": 10 } }"#)
                .unwrap_err();
        assert!(matches!(err, SurfaceError::Config(_)));
    }

    #[test]
    fn overlong_label_in_file_is_rejected() {
        let label = "x".repeat(40);
        let err = SurfaceConfig::from_json(&format!(r#"{{ "naming": {{ "key": "{label}" }} }}"#))
            .unwrap_err();
        assert!(matches!(err, SurfaceError::NameTooLong { len: 40, .. }));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "console": {{ "host": "127.0.0.1", "port": 8001 }} }}"#).unwrap();
        let config = SurfaceConfig::from_path(file.path()).unwrap();
        assert_eq!(config.console.socket_addr().unwrap().port(), 8001);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = SurfaceConfig::from_path(Path::new("/nonexistent/gma3osc.json")).unwrap_err();
        assert!(matches!(err, SurfaceError::Config(_)));
    }

    #[test]
    fn navigator_range_validation() {
        assert!(NavigatorConfig::new(1, 4, NavigatorMode::Local).validate().is_ok());
        assert!(NavigatorConfig::new(3, 3, NavigatorMode::Local).validate().is_ok());
        assert!(matches!(
            NavigatorConfig::new(0, 4, NavigatorMode::Local).validate(),
            Err(SurfaceError::InvalidRange { start: 0, end: 4 })
        ));
        assert!(NavigatorConfig::new(5, 4, NavigatorMode::Global).validate().is_err());
    }

    #[test]
    fn polarity_maps_levels() {
        assert!(Polarity::ActiveLow.is_pressed(false));
        assert!(!Polarity::ActiveLow.is_pressed(true));
        assert!(Polarity::ActiveHigh.is_pressed(true));
        assert!(!Polarity::ActiveHigh.is_pressed(false));
    }
}
