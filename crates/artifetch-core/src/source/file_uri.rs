//! `file://` path normalization.

use super::PathStyle;
use std::path::PathBuf;

/// Turns the part of a `file://` URI after the scheme, already
/// percent-decoded, into a local path.
///
/// Separators become the platform's own. On Windows `file:///C:/foo` leaves
/// `/C:/foo` behind; the leading separator is dropped so the result is the
/// drive-qualified `C:\foo`.
pub fn normalize_file_path(rest: &str, style: PathStyle) -> PathBuf {
    match style {
        PathStyle::Posix => PathBuf::from(rest),
        PathStyle::Windows => {
            let trimmed = strip_slash_before_drive(rest);
            PathBuf::from(trimmed.replace('/', "\\"))
        }
    }
}

fn strip_slash_before_drive(path: &str) -> &str {
    let Some(stripped) = path.strip_prefix(&['/', '\\'][..]) else {
        return path;
    };
    if has_drive_prefix(stripped) {
        stripped
    } else {
        path
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let b = path.as_bytes();
    b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posix_keeps_path_verbatim() {
        assert_eq!(normalize_file_path("/a/b", PathStyle::Posix), PathBuf::from("/a/b"));
        assert_eq!(normalize_file_path("./a/b", PathStyle::Posix), PathBuf::from("./a/b"));
    }

    #[test]
    fn windows_converts_separators() {
        assert_eq!(
            normalize_file_path("./a/b", PathStyle::Windows),
            PathBuf::from(r".\a\b")
        );
        assert_eq!(
            normalize_file_path("/a/b", PathStyle::Windows),
            PathBuf::from(r"\a\b")
        );
    }

    #[test]
    fn windows_drops_separator_before_drive() {
        assert_eq!(
            normalize_file_path("/C:/foo", PathStyle::Windows),
            PathBuf::from(r"C:\foo")
        );
        assert_eq!(
            normalize_file_path("/d:/x/y.iso", PathStyle::Windows),
            PathBuf::from(r"d:\x\y.iso")
        );
        assert_eq!(
            normalize_file_path("C:/foo", PathStyle::Windows),
            PathBuf::from(r"C:\foo")
        );
    }

    #[test]
    fn drive_lookalike_is_not_stripped() {
        assert_eq!(
            normalize_file_path("/CC:/foo", PathStyle::Windows),
            PathBuf::from(r"\CC:\foo")
        );
    }
}
