//! Media type detection from file name extensions.

pub const OCTET_STREAM: &str = "application/octet-stream";
const FALLBACK_EXTENSION: &str = "bin";

/// Lowercased extension without the dot, if the name has one.
pub fn extension_of(file_name: &str) -> Option<String> {
    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    match base.rfind('.') {
        Some(0) | None => None,
        Some(i) if i + 1 < base.len() => Some(base[i + 1..].to_ascii_lowercase()),
        Some(_) => None,
    }
}

fn lookup(ext: &str) -> Option<&'static str> {
    let t = match ext {
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "3gp" => "video/3gpp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "opus" => "audio/opus",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "rar" => "application/vnd.rar",
        "7z" => "application/x-7z-compressed",
        "apk" => "application/vnd.android.package-archive",
        "json" => "application/json",
        "xml" => "application/xml",
        "js" | "mjs" => "text/javascript",
        "css" => "text/css",
        "html" | "htm" => "text/html",
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "yaml" | "yml" => "application/yaml",
        "toml" => "application/toml",
        "rs" => "text/x-rust",
        "py" => "text/x-python",
        "sh" => "application/x-sh",
        "wasm" => "application/wasm",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => return None,
    };
    Some(t)
}

/// Media type for a file name, `application/octet-stream` when unknown.
pub fn media_type_for(file_name: &str) -> &'static str {
    extension_of(file_name).as_deref().and_then(lookup).unwrap_or(OCTET_STREAM)
}

/// Extension used for the stored object: the (lowercased) original one when it
/// maps to a known media type, `bin` otherwise.
pub fn storage_extension(file_name: &str) -> String {
    match extension_of(file_name) {
        Some(ext) if lookup(&ext).is_some() => ext,
        _ => FALLBACK_EXTENSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_types() {
        assert_eq!(media_type_for("photo.PNG"), "image/png");
        assert_eq!(media_type_for("clip.mp4"), "video/mp4");
        assert_eq!(media_type_for("archive.tar.gz"), "application/gzip");
        assert_eq!(media_type_for("noext"), OCTET_STREAM);
        assert_eq!(media_type_for(".hidden"), OCTET_STREAM);
        assert_eq!(media_type_for("weird.xyzzy"), OCTET_STREAM);
    }

    #[test]
    fn storage_extension_falls_back_to_bin() {
        assert_eq!(storage_extension("a.JPG"), "jpg");
        assert_eq!(storage_extension("a.xyzzy"), "bin");
        assert_eq!(storage_extension("trailingdot."), "bin");
        assert_eq!(storage_extension("README"), "bin");
    }
}
