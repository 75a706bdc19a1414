/// Folder inside the bucket that receives feedback uploads.
pub const UPLOAD_PREFIX: &str = "uploads";

const FALLBACK_FILE_NAME: &str = "image";

/// Reduce a client-supplied file name to characters safe in an object path.
///
/// ASCII alphanumerics, `.`, `-` and `_` are kept; everything else becomes `_`.
#[must_use]
pub fn sanitize_file_name(file_name: &str) -> String {
    let trimmed = file_name.trim();
    if trimmed.is_empty() {
        return FALLBACK_FILE_NAME.to_string();
    }

    trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Object path for a new upload: `uploads/<millis>_<sanitized name>`.
#[must_use]
pub fn upload_object_path(timestamp_millis: i64, file_name: &str) -> String {
    format!(
        "{UPLOAD_PREFIX}/{timestamp_millis}_{}",
        sanitize_file_name(file_name)
    )
}
