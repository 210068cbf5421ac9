use crate::error::{Error, Result};
use crate::unit;

use chrono::NaiveDateTime;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix layout appended to the slug, e.g. `_Jan2_06_3:04`
const TIMESTAMP_LAYOUT: &str = "_%b%-d_%y_%-I:%M";

/// Turns a search phrase into something usable as a file name prefix
pub fn slugify(phrase: &str) -> String {
    phrase
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect()
}

pub fn dir_name(slug: &str, when: NaiveDateTime) -> String {
    format!("{}{}", slug, when.format(TIMESTAMP_LAYOUT))
}

/// Creates a fresh output directory under `root`.
///
/// Fails if the directory already exists; a run never writes into an old one.
pub fn create_output_dir(root: &Path, slug: &str, when: NaiveDateTime) -> Result<PathBuf> {
    if !root.as_os_str().is_empty() {
        fs::create_dir_all(root).map_err(|source| Error::Filesystem {
            path: root.to_path_buf(),
            source,
        })?;
    }

    let dir = root.join(dir_name(slug, when));

    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder.create(&dir).map_err(|source| Error::Filesystem {
        path: dir.clone(),
        source,
    })?;

    Ok(dir)
}

/// Pairs every url with the output file it gets written to, keeping input order
pub fn build_jobs(slug: &str, urls: Vec<String>) -> VecDeque<unit::DownloadJob> {
    urls.into_iter()
        .enumerate()
        .map(|(index, url)| unit::DownloadJob {
            index,
            file_name: format!("{}{}.jpg", slug, index),
            url,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn reference_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2006, 1, 2)
            .and_then(|d| d.and_hms_opt(15, 4, 5))
            .unwrap()
    }

    #[test]
    fn test_slugify_replaces_spaces() {
        assert_eq!(slugify("grumpy cat"), "grumpy_cat");
        assert_eq!(slugify("cat"), "cat");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_replaces_path_separators() {
        assert_eq!(slugify("ac/dc live"), "ac_dc_live");
        assert_eq!(slugify("a\\b"), "a_b");
    }

    #[test]
    fn test_dir_name_layout() {
        assert_eq!(dir_name("cat", reference_time()), "cat_Jan2_06_3:04");

        let morning = NaiveDate::from_ymd_opt(2019, 11, 23)
            .and_then(|d| d.and_hms_opt(9, 7, 0))
            .unwrap();
        assert_eq!(dir_name("grumpy_cat", morning), "grumpy_cat_Nov23_19_9:07");
    }

    #[test]
    fn test_create_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = create_output_dir(temp_dir.path(), "cat", reference_time()).unwrap();

        assert_eq!(dir, temp_dir.path().join("cat_Jan2_06_3:04"));
        assert!(dir.is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dir).unwrap().permissions().mode();
            // umask can only clear bits
            assert_eq!(mode & 0o777 & !0o755, 0);
            assert_eq!(mode & 0o700, 0o700);
        }
    }

    #[test]
    fn test_create_output_dir_creates_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested").join("root");

        let dir = create_output_dir(&root, "cat", reference_time()).unwrap();
        assert!(dir.starts_with(&root));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_create_output_dir_refuses_existing() {
        let temp_dir = TempDir::new().unwrap();
        create_output_dir(temp_dir.path(), "cat", reference_time()).unwrap();

        let err = create_output_dir(temp_dir.path(), "cat", reference_time()).unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }

    #[test]
    fn test_build_jobs_names_by_position() {
        let urls = vec![
            String::from("http://a/0"),
            String::from("http://a/1"),
            String::from("http://a/2"),
        ];
        let jobs: Vec<_> = build_jobs("cat", urls).into_iter().collect();

        assert_eq!(jobs.len(), 3);
        for (i, job) in jobs.iter().enumerate() {
            assert_eq!(job.index, i);
            assert_eq!(job.file_name, format!("cat{}.jpg", i));
            assert_eq!(job.url, format!("http://a/{}", i));
        }
    }
}
