use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::scan_types::ScanError;

/// Strip comments and blank lines from an exclusion list.
///
/// Lines starting with `#` are dropped. Anything after `" #"` is a trailing
/// comment. What is left is trimmed and kept when non-empty.
pub fn remove_comments<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let line = line.as_ref().trim();
            if line.starts_with('#') {
                return None;
            }
            let kept = line.split(" #").next().unwrap_or_default().trim();
            (!kept.is_empty()).then(|| kept.to_string())
        })
        .collect()
}

/// Read site ids to ignore from an exclusion file
pub fn load_exclusions(path: &Path) -> Result<BTreeSet<String>, ScanError> {
    let contents = fs::read_to_string(path)?;
    let excluded: BTreeSet<String> = remove_comments(contents.lines()).into_iter().collect();
    info!(
        "Loaded {} excluded site id(s) from {}",
        excluded.len(),
        path.display()
    );
    Ok(excluded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_comments() {
        let lines = [
            "# sites next to the toilets",
            "18621",
            "   ",
            "18622 # loud neighbours",
            "  # indented comment",
            "A12#not-a-comment",
            "",
        ];
        assert_eq!(
            remove_comments(lines),
            vec!["18621", "18622", "A12#not-a-comment"]
        );
    }

    #[test]
    fn test_load_exclusions_from_file() {
        let path = std::env::temp_dir().join(format!("campquest-exclusions-{}.txt", std::process::id()));
        fs::write(&path, "# header\n18621\n18622 # comment\n18621\n").unwrap();

        let excluded = load_exclusions(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(
            excluded.into_iter().collect::<Vec<_>>(),
            vec!["18621".to_string(), "18622".to_string()]
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_exclusions(Path::new("/definitely/not/here/exclusions.txt"));
        assert!(matches!(result, Err(ScanError::Io(_))));
    }
}
