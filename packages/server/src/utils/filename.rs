/// Archive extension recognised by ingestion.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Whether `name` ends with `.{extension}`, ignoring ASCII case.
///
/// `extension` may be given with or without its leading dot.
pub fn has_extension(name: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.eq_ignore_ascii_case(extension),
        None => false,
    }
}

pub fn is_archive(name: &str) -> bool {
    has_extension(name, ARCHIVE_EXTENSION)
}
