use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

/// Host platform a configuration is compiled for.
///
/// The platform decides which catalog entries are legal and which metrics
/// backend is generated: collectd on Linux, the OpenTelemetry collector on
/// Windows. Logs always go through Fluent Bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Platform {
    /// Linux distributions
    Linux,
    /// Microsoft Windows
    Windows,
}

impl Platform {
    /// The platform this binary was built for, falling back to Linux.
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Separator used when joining the opaque directory parameters.
    pub fn path_separator(self) -> char {
        match self {
            Platform::Linux => '/',
            Platform::Windows => '\\',
        }
    }

    pub fn metrics_backend(self) -> Backend {
        match self {
            Platform::Linux => Backend::Collectd,
            Platform::Windows => Backend::Otel,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Linux => write!(f, "linux"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            other => Err(format!("unsupported platform \"{}\"", other)),
        }
    }
}

/// Downstream agent dialects the compiler emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    FluentBit,
    Collectd,
    Otel,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::FluentBit => write!(f, "fluent-bit"),
            Backend::Collectd => write!(f, "collectd"),
            Backend::Otel => write!(f, "otel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_str() {
        assert_eq!("linux".parse::<Platform>(), Ok(Platform::Linux));
        assert_eq!("Windows".parse::<Platform>(), Ok(Platform::Windows));
        assert_eq!(
            "macos".parse::<Platform>(),
            Err("unsupported platform \"macos\"".to_string())
        );
    }

    #[test]
    fn test_platform_display_round_trips() {
        for platform in [Platform::Linux, Platform::Windows] {
            assert_eq!(platform.to_string().parse::<Platform>(), Ok(platform));
        }
    }

    #[test]
    fn test_metrics_backend_per_platform() {
        assert_eq!(Platform::Linux.metrics_backend(), Backend::Collectd);
        assert_eq!(Platform::Windows.metrics_backend(), Backend::Otel);
    }

    #[test]
    fn test_path_separator() {
        assert_eq!(Platform::Linux.path_separator(), '/');
        assert_eq!(Platform::Windows.path_separator(), '\\');
    }
}
