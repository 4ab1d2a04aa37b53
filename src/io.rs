use std::fs;
use std::path::PathBuf;

use blogspace::application::error::AppError;
use blogspace::domain::articles::Category;
use blogspace::infra::error::InfraError;

/// Inline value or file contents; the file wins when both are given.
pub fn read_value(val: Option<String>, file: Option<PathBuf>) -> Result<String, AppError> {
    if let Some(path) = file {
        let data = fs::read_to_string(&path).map_err(|source| {
            AppError::Infra(InfraError::Io(std::io::Error::new(
                source.kind(),
                format!("failed to read `{}`: {source}", path.display()),
            )))
        })?;
        Ok(data)
    } else if let Some(v) = val {
        Ok(v)
    } else {
        Err(AppError::validation("--content or --content-file is required"))
    }
}

/// Resolve `--category` values against the fixed enumeration.
pub fn parse_categories(values: &[String]) -> Result<Vec<Category>, AppError> {
    values
        .iter()
        .map(|value| {
            Category::parse_known(value).ok_or_else(|| {
                AppError::validation(format!(
                    "unknown category `{value}`; expected one of {}",
                    Category::KNOWN
                        .iter()
                        .map(Category::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn file_contents_win_over_inline_value() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "From file.\n\nSecond paragraph.").expect("write");

        let value = read_value(Some("inline".into()), Some(file.path().to_path_buf()))
            .expect("read");
        assert_eq!(value, "From file.\n\nSecond paragraph.");
    }

    #[test]
    fn missing_value_is_rejected() {
        assert!(matches!(
            read_value(None, None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let err = read_value(None, Some(PathBuf::from("/nonexistent/body.txt")))
            .expect_err("missing file");
        assert!(matches!(err, AppError::Infra(InfraError::Io(_))));
    }

    #[test]
    fn categories_parse_case_insensitively() {
        let parsed = parse_categories(&["finance".into(), "TECH".into()]).expect("known");
        assert_eq!(parsed, vec![Category::Finance, Category::Tech]);
        assert!(parse_categories(&["crypto".into()]).is_err());
    }
}
