//! Version information (§C13), grounded on `pkg/version/version.go`.

const MAJOR: u32 = 2;
const MINOR: u32 = 0;
const PATCH: u32 = 1;
const NAME: &str = "reposcript";

/// Returns the formatted `NAME: MAJOR.MINOR.PATCH` version string.
pub fn get() -> String {
    format!("{}: {}.{}.{}", NAME, MAJOR, MINOR, PATCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_name_and_semver() {
        assert_eq!(get(), "reposcript: 2.0.1");
    }
}
