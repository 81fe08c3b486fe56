//! End-to-end runs over FITS files written to a temporary directory

use approx::assert_abs_diff_eq;
use chrono::{NaiveDate, TimeZone, Utc};
use crossing::batch::{expand_nights, run_nights};
use crossing::header::FitsHeader;
use crossing::pipeline::{analyze_file, process_directory, process_file};
use crossing::{FileOutcome, HeaderKeys, Observation, ReportWriter, RunConfig};
use ephemeris::sidereal::{julian_date, local_sidereal_degrees};
use ephemeris::ObserverSite;
use fitsio::images::{ImageDescription, ImageType};
use fitsio::FitsFile;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Cards of an observation rising through 30 degrees at 00:10 UTC, seen from (0, 0)
struct Header<'a> {
    object: &'a str,
    date_obs: &'a str,
    altitude: Option<f64>,
    site: Option<(f64, f64, f64)>,
}

fn rising_ra() -> f64 {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 10, 0).unwrap();
    (local_sidereal_degrees(julian_date(&at), 0.0) + 60.0).rem_euclid(360.0)
}

fn write_observation(dir: &Path, name: &str, header: &Header) -> PathBuf {
    let path = dir.join(name);
    let mut fits = FitsFile::create(&path).open().unwrap();
    let description = ImageDescription {
        data_type: ImageType::Float,
        dimensions: &[4, 4],
    };
    let hdu = fits.create_image("SCI".to_string(), &description).unwrap();

    hdu.write_key(&mut fits, "DATE-OBS", header.date_obs).unwrap();
    hdu.write_key(&mut fits, "OBJECT", header.object).unwrap();
    hdu.write_key(&mut fits, "FILTER", "R").unwrap();
    hdu.write_key(&mut fits, "CRVAL1", rising_ra()).unwrap();
    hdu.write_key(&mut fits, "CRVAL2", 0.0f64).unwrap();
    if let Some(alt) = header.altitude {
        hdu.write_key(&mut fits, "ALT", alt).unwrap();
    }
    if let Some((lat, lon, elev)) = header.site {
        hdu.write_key(&mut fits, "HIERARCH T80S TEL GEOLAT", lat).unwrap();
        hdu.write_key(&mut fits, "HIERARCH T80S TEL GEOLON", lon).unwrap();
        hdu.write_key(&mut fits, "HIERARCH T80S TEL GEOELEV", elev).unwrap();
    }
    path
}

fn good_header(object: &str) -> Header<'_> {
    Header {
        object,
        date_obs: "2024-01-01T00:09:00",
        altitude: Some(30.0),
        site: None,
    }
}

fn equator_config() -> RunConfig {
    RunConfig {
        site: ObserverSite::new("equator", 0.0, 0.0, 0.0).unwrap(),
        precession: false,
        ..Default::default()
    }
}

fn output_lines(writer: ReportWriter<Vec<u8>>) -> Vec<String> {
    String::from_utf8(writer.into_inner().unwrap())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_header_read_from_fits() {
    let dir = tempdir().unwrap();
    let path = write_observation(
        dir.path(),
        "M42_R.fits.fz",
        &Header {
            site: Some((-30.1678638889, -70.8056888889, 2187.0)),
            ..good_header("M42")
        },
    );

    let mut header = FitsHeader::open(&path, 1).unwrap();
    let observation =
        Observation::from_cards("M42_R.fits.fz", &mut header, &HeaderKeys::default()).unwrap();

    assert_eq!(observation.object_name.as_deref(), Some("M42"));
    assert_eq!(observation.filter_name.as_deref(), Some("R"));
    assert_eq!(
        observation.header_time,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 9, 0).unwrap()
    );
    assert_abs_diff_eq!(observation.target_altitude_deg, 30.0);
    let site = observation.site.unwrap();
    assert_abs_diff_eq!(site.latitude_deg, -30.1678638889, epsilon = 1e-6);
    assert_abs_diff_eq!(site.elevation_m, 2187.0, epsilon = 1e-6);
}

#[test]
fn test_single_file_row() {
    let dir = tempdir().unwrap();
    let path = write_observation(dir.path(), "M42_R.fits.fz", &good_header("M42"));

    let (_, crossing) = analyze_file(&path, &equator_config()).unwrap();
    assert_abs_diff_eq!(crossing.diff_seconds(), 60.0, epsilon = 0.5);

    let mut writer = ReportWriter::new(Vec::new());
    let outcome = process_file(&path, &equator_config(), &mut writer).unwrap();
    assert_eq!(outcome, FileOutcome::Solved);

    let lines = output_lines(writer);
    assert_eq!(lines.len(), 1);
    let fields: Vec<&str> = lines[0].split(',').collect();
    assert_eq!(fields[0], path.display().to_string());
    assert_eq!(fields[1], "M42");
    assert_eq!(fields[2], "R");
    assert!(
        fields[3].starts_with("2024-01-01T00:10:00")
            || fields[3].starts_with("2024-01-01T00:09:59")
    );
    assert!(fields[3].ends_with('Z'));
    let diff: f64 = fields[4].parse().unwrap();
    assert_abs_diff_eq!(diff, 60.0, epsilon = 0.5);
}

#[test]
fn test_missing_altitude_row_with_emit_failures() {
    let dir = tempdir().unwrap();
    let path = write_observation(
        dir.path(),
        "M42_R.fits.fz",
        &Header {
            altitude: None,
            ..good_header("M42")
        },
    );

    let mut writer = ReportWriter::new(Vec::new());
    assert!(process_file(&path, &equator_config(), &mut writer).is_err());

    let config = RunConfig {
        emit_failures: true,
        ..equator_config()
    };
    let mut writer = ReportWriter::new(Vec::new());
    let outcome = process_file(&path, &config, &mut writer).unwrap();
    assert_eq!(outcome, FileOutcome::FailureRecorded);
    assert_eq!(
        output_lines(writer),
        vec![format!("{},M42,R,None,None", path.display())]
    );
}

#[test]
fn test_directory_run() {
    let dir = tempdir().unwrap();
    write_observation(dir.path(), "b_M42.fits.fz", &good_header("M42"));
    write_observation(dir.path(), "a_NGC1365.fits.fz", &good_header("NGC1365"));
    write_observation(dir.path(), "bias_001.fits.fz", &good_header("BIAS"));
    write_observation(
        dir.path(),
        "c_bad.fits.fz",
        &Header {
            date_obs: "not a date",
            ..good_header("BAD")
        },
    );

    let mut writer = ReportWriter::new(Vec::new());
    writer.write_header().unwrap();
    let summary = process_directory(dir.path(), &equator_config(), &mut writer).unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 1);

    let lines = output_lines(writer);
    assert_eq!(lines[0], "FILENAME,OBJNAME,FILTER,DATETIME,DIFFTIME");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("a_NGC1365.fits.fz,NGC1365,R,"));
    assert!(lines[2].contains("b_M42.fits.fz,M42,R,"));
}

#[test]
fn test_plot_written_when_requested() {
    let dir = tempdir().unwrap();
    let path = write_observation(dir.path(), "M42_R_001.fits.fz", &good_header("M42"));
    let plot_dir = dir.path().join("plots");

    let config = RunConfig {
        plot_dir: Some(plot_dir.clone()),
        ..equator_config()
    };
    let mut writer = ReportWriter::new(Vec::new());
    assert_eq!(
        process_file(&path, &config, &mut writer).unwrap(),
        FileOutcome::Solved
    );
    assert_eq!(output_lines(writer).len(), 1);
    assert!(plot_dir.is_dir());
}

#[test]
fn test_night_reports_created_then_appended() {
    let root = tempdir().unwrap();
    for night in ["20240101", "20240102"] {
        let dir = root.path().join(night);
        std::fs::create_dir(&dir).unwrap();
        write_observation(&dir, "M42_R.fits.fz", &good_header("M42"));
    }
    let template = format!("{}/{{date}}", root.path().display());
    let nights = expand_nights(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        &template,
        "%Y%m%d",
    )
    .unwrap();
    let out = root.path().join("reports");

    let summary = run_nights(&nights, &equator_config(), &out).unwrap();
    assert_eq!(summary.nights, 2);
    assert_eq!(summary.missing_nights, 0);
    assert_eq!(summary.files.processed, 2);

    let report = out.join("20240101.csv");
    let text = std::fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "FILENAME,OBJNAME,FILTER,DATETIME,DIFFTIME");
    assert!(lines[1].contains("M42_R.fits.fz,M42,R,"));
    assert!(out.join("20240102.csv").is_file());

    run_nights(&nights, &equator_config(), &out).unwrap();
    let text = std::fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines.iter().filter(|l| l.starts_with("FILENAME,")).count(), 1);
    assert_eq!(lines[1], lines[2]);
}
