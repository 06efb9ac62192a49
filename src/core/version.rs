//! Build metadata accessors shared across the library and the binary.
//! This includes the generated version.rs from the build script into a core module,
//! providing a single source of truth.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Fallback when the build script could not read the package metadata
const DEFAULT_ADCORE_VERSION: (u32, u32, u32) = (1, 9, 1);

/// The ADCore release the plugin classes were written against, as `(major, minor, patch)`.
pub fn adcore_version() -> (u32, u32, u32) {
    parse_version(ADCORE_VERSION).unwrap_or(DEFAULT_ADCORE_VERSION)
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

fn parse_version(raw: &str) -> Option<(u32, u32, u32)> {
    let mut parts = raw.trim().split('.').map(|p| p.parse::<u32>());
    let major = parts.next()?.ok()?;
    let minor = parts.next()?.ok()?;
    let patch = parts.next().unwrap_or(Ok(0)).ok()?;
    Some((major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("1.9.1"), Some((1, 9, 1)));
        assert_eq!(parse_version("3.2"), Some((3, 2, 0)));
        assert_eq!(parse_version("unknown"), None);
    }

    #[test]
    fn test_adcore_version_from_metadata() {
        assert_eq!(adcore_version(), (1, 9, 1));
    }
}
