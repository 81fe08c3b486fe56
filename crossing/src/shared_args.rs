use crate::config::{
    HeaderKeys, RunConfig, SelectionRule, SolverConfig, DEFAULT_GRID_POINTS, MAX_DELTA_TIME_HOURS,
};
use chrono::Duration;
use clap::Parser;
use ephemeris::ObserverSite;
use std::path::PathBuf;

/// Default window half-width as given on the command line, minutes
const DEFAULT_DELTA_TIME_ARG: &str = "10";

/// Parse a positive number of minutes (fractions allowed, at most
/// [`MAX_DELTA_TIME_HOURS`] hours) into a duration
fn parse_minutes(s: &str) -> Result<Duration, String> {
    let minutes: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number of minutes: {s}"))?;
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err("Delta time must be a positive number of minutes".to_string());
    }
    if minutes > (MAX_DELTA_TIME_HOURS * 60) as f64 {
        return Err(format!(
            "Delta time must not exceed {} minutes",
            MAX_DELTA_TIME_HOURS * 60
        ));
    }
    Ok(Duration::milliseconds((minutes * 60_000.0).round() as i64))
}

fn parse_grid_points(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid grid point count: {s}"))?;
    if n < 2 {
        return Err("Need at least 2 grid points".to_string());
    }
    Ok(n)
}

/// Arguments shared by the single-run and date-range binaries
#[derive(Parser, Debug, Clone)]
pub struct SharedCrossingArgs {
    /// Header card holding the observation timestamp
    #[arg(short = 'D', long = "header_date", default_value = "DATE-OBS")]
    pub header_date: String,

    /// Save an altitude/azimuth plot per file
    #[arg(short = 'p', long, default_value_t = false)]
    pub plot: bool,

    /// Directory the plots are written to
    #[arg(long, default_value = "plots")]
    pub plot_dir: PathBuf,

    /// Half-width of the searched window in minutes
    #[arg(
        short = 'T',
        long = "delta_time",
        default_value = DEFAULT_DELTA_TIME_ARG,
        value_parser = parse_minutes
    )]
    pub delta_time: Duration,

    /// Altitude samples per searched window
    #[arg(
        short = 'n',
        long = "n_grid_points",
        default_value_t = DEFAULT_GRID_POINTS,
        value_parser = parse_grid_points
    )]
    pub n_grid_points: usize,

    /// How the crossing is chosen among the candidates of the three windows
    #[arg(long, value_enum, default_value_t = SelectionRule::default())]
    pub selection: SelectionRule,

    /// HDU holding the observation header (0 = primary)
    #[arg(long, default_value_t = 1)]
    pub hdu: usize,

    /// Observer latitude in degrees, used when the header has no site cards
    #[arg(long, allow_hyphen_values = true)]
    pub site_lat: Option<f64>,

    /// Observer longitude in degrees east, used when the header has no site cards
    #[arg(long, allow_hyphen_values = true)]
    pub site_lon: Option<f64>,

    /// Observer elevation in meters, used when the header has no site cards
    #[arg(long, allow_hyphen_values = true)]
    pub site_elevation: Option<f64>,

    /// Skip precession of the J2000 coordinates to the date of observation
    #[arg(long, default_value_t = false)]
    pub no_precession: bool,

    /// File name suffix picked up in directory mode (repeatable)
    #[arg(long = "suffix", default_value = ".fits.fz")]
    pub suffixes: Vec<String>,

    /// Write a row with None values for files that cannot be solved
    #[arg(long, default_value_t = false)]
    pub emit_failures: bool,
}

impl SharedCrossingArgs {
    /// Fallback observer site: T80S with any supplied overrides applied
    pub fn site(&self) -> Result<ObserverSite, String> {
        if self.site_lat.is_none() && self.site_lon.is_none() && self.site_elevation.is_none() {
            return Ok(ObserverSite::t80s());
        }

        let base = ObserverSite::t80s();
        ObserverSite::new(
            "command line",
            self.site_lat.unwrap_or(base.latitude_deg),
            self.site_lon.unwrap_or(base.longitude_deg),
            self.site_elevation.unwrap_or(base.elevation_m),
        )
        .map_err(|e| format!("Invalid site: {e}"))
    }

    pub fn to_run_config(&self) -> Result<RunConfig, String> {
        let solver = SolverConfig {
            delta_time: self.delta_time,
            n_grid_points: self.n_grid_points,
            selection: self.selection,
        };
        solver.validate().map_err(|e| e.to_string())?;

        let keys = HeaderKeys {
            hdu: self.hdu,
            date_card: self.header_date.clone(),
            ..Default::default()
        };

        Ok(RunConfig {
            solver,
            keys,
            site: self.site()?,
            precession: !self.no_precession,
            plot_dir: self.plot.then(|| self.plot_dir.clone()),
            emit_failures: self.emit_failures,
            suffixes: self.suffixes.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DELTA_TIME_MINUTES;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        shared: SharedCrossingArgs,
    }

    fn parse(args: &[&str]) -> SharedCrossingArgs {
        TestCli::parse_from(std::iter::once("test").chain(args.iter().copied())).shared
    }

    #[test]
    fn test_defaults_match_run_config() {
        let config = parse(&[]).to_run_config().unwrap();
        let default = RunConfig::default();
        assert_eq!(config.solver, default.solver);
        assert_eq!(config.keys, default.keys);
        assert_eq!(config.site, default.site);
        assert_eq!(config.suffixes, default.suffixes);
        assert!(config.precession);
        assert!(config.plot_dir.is_none());
        assert!(!config.emit_failures);
    }

    #[test]
    fn test_default_delta_time_matches_solver_default() {
        assert_eq!(
            parse_minutes(DEFAULT_DELTA_TIME_ARG).unwrap(),
            Duration::minutes(DEFAULT_DELTA_TIME_MINUTES)
        );
    }

    #[test]
    fn test_short_flags() {
        let args = parse(&["-T", "2.5", "-n", "100", "-D", "DATE-END", "-p"]);
        assert_eq!(args.delta_time, Duration::seconds(150));
        assert_eq!(args.n_grid_points, 100);
        let config = args.to_run_config().unwrap();
        assert_eq!(config.keys.date_card, "DATE-END");
        assert_eq!(config.plot_dir, Some(PathBuf::from("plots")));
    }

    #[test]
    fn test_long_flags() {
        let args = parse(&[
            "--delta_time",
            "5",
            "--n_grid_points",
            "301",
            "--selection",
            "nearest-time",
            "--no-precession",
            "--suffix",
            ".fits",
            "--suffix",
            ".fits.fz",
            "--emit-failures",
            "--hdu",
            "0",
        ]);
        let config = args.to_run_config().unwrap();
        assert_eq!(config.solver.delta_time, Duration::minutes(5));
        assert_eq!(config.solver.selection, SelectionRule::NearestTime);
        assert!(!config.precession);
        assert_eq!(config.suffixes, vec![".fits", ".fits.fz"]);
        assert!(config.emit_failures);
        assert_eq!(config.keys.hdu, 0);
    }

    #[test]
    fn test_oversized_window_rejected_at_parse_time() {
        let result = TestCli::try_parse_from(["test", "-T", "1e12"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_site_overrides() {
        let args = parse(&["--site-lat", "-24.6", "--site-lon", "-70.4"]);
        let site = args.site().unwrap();
        assert_eq!(site.latitude_deg, -24.6);
        assert_eq!(site.longitude_deg, -70.4);
        assert_eq!(site.elevation_m, ObserverSite::t80s().elevation_m);

        assert!(parse(&["--site-lat", "95"]).site().is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse_minutes("0").is_err());
        assert!(parse_minutes("-3").is_err());
        assert!(parse_minutes("ten").is_err());
        assert!(parse_minutes("1e12").is_err());
        assert!(parse_minutes("inf").is_err());
        assert_eq!(parse_minutes("720"), Ok(Duration::hours(12)));
        assert!(parse_grid_points("1").is_err());
        assert_eq!(parse_grid_points("2"), Ok(2));
    }
}
