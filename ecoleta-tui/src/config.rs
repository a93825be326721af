use std::path::PathBuf;

use clap::Parser;
use ecoleta_core::model::Coordinate;
use ecoleta_provider_api::DEFAULT_BASE_URL;

/// Find waste collection points near you.
#[derive(Debug, Parser)]
#[command(name = "ecoleta", version, about)]
pub(crate) struct Config {
    /// Base URL of the collection point API.
    #[arg(long, env = "ECOLETA_API_URL", default_value = DEFAULT_BASE_URL)]
    pub(crate) api_url: String,

    /// Device latitude. Without a position the location permission is refused.
    #[arg(
        long,
        env = "ECOLETA_LATITUDE",
        requires = "longitude",
        allow_negative_numbers = true
    )]
    pub(crate) latitude: Option<f64>,

    /// Device longitude.
    #[arg(
        long,
        env = "ECOLETA_LONGITUDE",
        requires = "latitude",
        allow_negative_numbers = true
    )]
    pub(crate) longitude: Option<f64>,

    /// File the log is written to.
    #[arg(long, env = "ECOLETA_LOG_FILE", default_value = "ecoleta.log")]
    pub(crate) log_file: PathBuf,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, env = "ECOLETA_LOG_LEVEL", default_value = "info")]
    pub(crate) log_level: String,

    /// State (UF) to prefill on the home screen.
    #[arg(long, default_value = "")]
    pub(crate) uf: String,

    /// City to prefill on the home screen.
    #[arg(long, default_value = "")]
    pub(crate) city: String,
}

impl Config {
    /// Configured device position, if both coordinates were given.
    pub(crate) fn position(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_api_without_position() {
        let config = Config::try_parse_from(["ecoleta"]).unwrap();
        assert_eq!(config.api_url, DEFAULT_BASE_URL);
        assert_eq!(config.log_file, PathBuf::from("ecoleta.log"));
        assert!(config.position().is_none());
    }

    #[test]
    fn negative_coordinates_are_accepted() {
        let config = Config::try_parse_from([
            "ecoleta",
            "--latitude",
            "-23.5",
            "--longitude",
            "-46.6",
            "--uf",
            "SP",
        ])
        .unwrap();
        assert_eq!(config.position(), Some(Coordinate::new(-23.5, -46.6)));
        assert_eq!(config.uf, "SP");
    }

    #[test]
    fn latitude_requires_longitude() {
        assert!(Config::try_parse_from(["ecoleta", "--latitude", "-23.5"]).is_err());
    }
}
