//! Reading soil measurements from files and arguments

use agri_core::{Error, Result};
use agri_fertility::{FieldInput, SoilSample, parse_batch};
use std::path::Path;
use tracing::debug;

/// Load a JSON array of named fields
pub fn read_batch_file(path: &Path) -> Result<Vec<FieldInput>> {
    let json = std::fs::read_to_string(path)?;
    let fields = parse_batch(&json).map_err(|e| {
        Error::InvalidInput(format!("{} is not a valid batch file: {}", path.display(), e))
    })?;
    if fields.is_empty() {
        return Err(Error::InvalidInput(format!("{} contains no fields", path.display())));
    }
    debug!(path = %path.display(), fields = fields.len(), "Read batch file");
    Ok(fields)
}

/// Validated sample from command line values
pub fn sample_from_args(n: f64, p: f64, k: f64, ph: f64, ec: f64, oc: f64) -> Result<SoilSample> {
    SoilSample::new(n, p, k, ph, ec, oc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_batch_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"field": "North plot", "N": 300, "P": 12, "K": 150, "pH": 6.5, "EC": 1.0, "OC": 0.9}}]"#
        )
        .unwrap();

        let fields = read_batch_file(file.path()).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "North plot");
    }

    #[test]
    fn test_empty_or_malformed_batch() {
        let mut empty = NamedTempFile::new().unwrap();
        write!(empty, "[]").unwrap();
        assert!(matches!(read_batch_file(empty.path()), Err(Error::InvalidInput(_))));

        let mut broken = NamedTempFile::new().unwrap();
        write!(broken, "{{not json").unwrap();
        assert!(matches!(read_batch_file(broken.path()), Err(Error::InvalidInput(_))));

        assert!(matches!(read_batch_file(Path::new("/nonexistent/fields.json")), Err(Error::Io(_))));
    }

    #[test]
    fn test_sample_from_args_validates() {
        assert!(sample_from_args(300.0, 12.0, 150.0, 6.5, 1.0, 0.9).is_ok());
        assert!(sample_from_args(300.0, 12.0, 150.0, 15.0, 1.0, 0.9).is_err());
    }
}
