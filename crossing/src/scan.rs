//! Discovery of observation files in a night directory

use std::path::{Path, PathBuf};

/// File name fragments marking calibration frames, which have no target to track
pub const CALIBRATION_MARKERS: [&str; 2] = ["bias", "skyflat"];

/// Whether the file name marks a bias or sky-flat frame
pub fn is_calibration_frame(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| CALIBRATION_MARKERS.iter().any(|m| name.contains(m)))
        .unwrap_or(false)
}

/// Observation files directly inside `dir`, sorted by path.
///
/// A file is picked up when its name ends with one of `suffixes` and it is
/// not a calibration frame. Subdirectories are not descended into.
pub fn scan_directory(dir: &Path, suffixes: &[String]) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if suffixes.iter().any(|s| name.ends_with(s.as_str())) && !is_calibration_frame(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_calibration_markers() {
        assert!(is_calibration_frame(Path::new("/data/20240101/bias-001.fits.fz")));
        assert!(is_calibration_frame(Path::new("skyflat_R_003.fits.fz")));
        assert!(!is_calibration_frame(Path::new("/bias/NGC1365_R_001.fits.fz")));
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = tempdir().unwrap();
        for name in [
            "obs_b.fits.fz",
            "obs_a.fits.fz",
            "bias_001.fits.fz",
            "skyflat_R.fits.fz",
            "notes.txt",
            "obs_c.fits",
        ] {
            File::create(dir.path().join(name)).unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.fits.fz")).unwrap();

        let files = scan_directory(dir.path(), &[".fits.fz".to_string()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["obs_a.fits.fz", "obs_b.fits.fz"]);
    }

    #[test]
    fn test_scan_multiple_suffixes() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("x.fits")).unwrap();
        File::create(dir.path().join("y.fits.fz")).unwrap();
        let suffixes = vec![".fits".to_string(), ".fits.fz".to_string()];
        assert_eq!(scan_directory(dir.path(), &suffixes).unwrap().len(), 2);
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = tempdir().unwrap();
        assert!(scan_directory(&dir.path().join("nope"), &[".fits.fz".to_string()]).is_err());
    }
}
