//! Canned scripts (§C11), data only, grounded on `pkg/script/scripts.go`.

/// Diffs the two latest release versions (`MAJOR.MINOR.PATCH`).
pub const DIFF_LATEST_SEMVER: &str = r#"
set repopath ".";
print("Using repo path: " + whichRepo());
let repo = initRepo();
let version = "$.$.$";

extractTags(repo, version);

let to = getLatestTag(repo, 0);
let from = getLatestTag(repo, 1);

diff(repo, from, to);
"#;

/// Diffs the two latest `-build.N` versions.
pub const DIFF_LATEST_SEMVER_WITH_LATEST_BUILDS: &str = r#"
set repopath ".";
print("Using repo path: " + whichRepo());
let repo = initRepo();
let version = "$.$.$-build.$";

extractTags(repo, version);

let to = getLatestTag(repo, 0);
let from = getLatestTag(repo, 1);

diff(repo, from, to);
"#;

/// Diffs the two latest `-rc.N` versions.
pub const DIFF_LATEST_SEMVER_WITH_LATEST_RCS: &str = r#"
set repopath ".";
print("Using repo path: " + whichRepo());
let repo = initRepo();
let version = "$.$.$-rc.$";

extractTags(repo, version);

let to = getLatestTag(repo, 0);
let from = getLatestTag(repo, 1);

diff(repo, from, to);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_scripts_parse_cleanly() {
        for script in [
            DIFF_LATEST_SEMVER,
            DIFF_LATEST_SEMVER_WITH_LATEST_BUILDS,
            DIFF_LATEST_SEMVER_WITH_LATEST_RCS,
        ] {
            let (_program, errors) = crate::parser::parse(script);
            assert!(errors.is_empty(), "parser errors: {:?}", errors);
        }
    }
}
