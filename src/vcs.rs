//! The external VCS collaborator (§4.6, §C9): everything the evaluator's
//! domain builtins need from a source-controlled repository, backed by
//! `git2`.

use std::collections::HashMap;

use regex_lite::Regex;
use thiserror::Error;

/// Failures surfaced by the VCS collaborator. These never panic the
/// interpreter — builtins convert them into `Value::Error` at the boundary.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("unable to open repository at '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: git2::Error,
    },
    #[error("invalid tag pattern: {0}")]
    BadPattern(#[from] regex_lite::Error),
    #[error("failed to walk commit history: {0}")]
    Walk(#[source] git2::Error),
}

/// One annotated tag resolved while populating a [`Repo`]'s tag set.
struct TagRecord {
    name: String,
    target_commit: git2::Oid,
    tagger_time: i64,
}

/// A handle to an opened repository plus whatever tag set `extractTags`
/// has populated on it so far (§5's "callers are responsible for ordering").
pub struct Repo {
    pub path: String,
    repo: git2::Repository,
    by_name: HashMap<String, usize>,
    latest_to_earliest: Vec<TagRecord>,
}

/// A resolved tag: its name and the commit it points to.
pub struct Tag {
    pub name: String,
    pub target_commit: git2::Oid,
}

impl Repo {
    pub fn open(path: &str) -> Result<Repo, VcsError> {
        let repo = git2::Repository::open(path).map_err(|source| VcsError::Open {
            path: path.to_string(),
            source,
        })?;
        Ok(Repo {
            path: path.to_string(),
            repo,
            by_name: HashMap::new(),
            latest_to_earliest: Vec::new(),
        })
    }

    /// Compiles `pattern` per §6.3, matches it (unanchored at the start,
    /// anchored at the end) against every annotated tag's short name, and
    /// populates the ordered tag set (latest tagger timestamp first).
    pub fn extract_tags(&mut self, pattern: &str) -> Result<(), VcsError> {
        let regex = compile_tag_pattern(pattern)?;

        let mut records = Vec::new();
        let refs = self
            .repo
            .references_glob("refs/tags/*")
            .map_err(VcsError::Walk)?;

        for reference in refs.flatten() {
            let Some(full_name) = reference.name().ok() else {
                continue;
            };
            let short_name = full_name.trim_start_matches("refs/tags/");

            // Lightweight tags have no tag object and so no tagger
            // timestamp to order by; they are silently skipped, matching
            // the upstream tool's behavior of only ever populating from
            // `TagObject`.
            let Ok(tag_obj) = reference.peel_to_tag() else {
                continue;
            };

            if !regex.is_match(short_name) {
                continue;
            }

            let tagger_time = tag_obj
                .tagger()
                .map(|sig| sig.when().seconds())
                .unwrap_or(0);

            records.push(TagRecord {
                name: short_name.to_string(),
                target_commit: tag_obj.target_id(),
                tagger_time,
            });
        }

        records.sort_by_key(|r| std::cmp::Reverse(r.tagger_time));

        self.by_name = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.clone(), i))
            .collect();
        self.latest_to_earliest = records;

        Ok(())
    }

    /// Looks up a tag by exact name within the populated set.
    pub fn get_tag(&self, name: &str) -> Option<Tag> {
        self.by_name.get(name).map(|&i| {
            let record = &self.latest_to_earliest[i];
            Tag {
                name: record.name.clone(),
                target_commit: record.target_commit,
            }
        })
    }

    /// Returns the Nth most recent populated tag (0 = latest).
    pub fn get_latest_tag(&self, offset: usize) -> Option<Tag> {
        self.latest_to_earliest.get(offset).map(|record| Tag {
            name: record.name.clone(),
            target_commit: record.target_commit,
        })
    }

    fn commits_from(&self, start: git2::Oid) -> Result<Vec<(git2::Oid, String)>, VcsError> {
        let mut walk = self.repo.revwalk().map_err(VcsError::Walk)?;
        walk.push(start).map_err(VcsError::Walk)?;

        let mut commits = Vec::new();
        for oid in walk {
            let oid = oid.map_err(VcsError::Walk)?;
            let commit = self.repo.find_commit(oid).map_err(VcsError::Walk)?;
            let message = commit.message().unwrap_or("").to_string();
            commits.push((oid, message));
        }
        Ok(commits)
    }

    /// Computes the symmetric set difference of the commit histories
    /// reachable from `from` and `to` (§8's "diff of commit histories").
    pub fn diff_commits(&self, from: &Tag, to: &Tag) -> Result<Vec<String>, VcsError> {
        let from_commits = self.commits_from(from.target_commit)?;
        let to_commits = self.commits_from(to.target_commit)?;

        let from_hashes: std::collections::HashSet<_> =
            from_commits.iter().map(|(oid, _)| *oid).collect();
        let to_hashes: std::collections::HashSet<_> =
            to_commits.iter().map(|(oid, _)| *oid).collect();

        let mut messages: Vec<String> = to_commits
            .iter()
            .filter(|(oid, _)| !from_hashes.contains(oid))
            .map(|(_, msg)| msg.clone())
            .collect();
        messages.extend(
            from_commits
                .iter()
                .filter(|(oid, _)| !to_hashes.contains(oid))
                .map(|(_, msg)| msg.clone()),
        );

        Ok(messages)
    }
}

/// Compiles the §6.3 mini-syntax into a regex: `$` → `([0-9]+)`, `.` → `\.`,
/// `*` → `.*`, `+` → `.+`, everything else is copied literally, and the
/// whole thing is anchored with a trailing `$`.
fn compile_tag_pattern(pattern: &str) -> Result<Regex, VcsError> {
    let mut buf = String::new();
    for c in pattern.chars() {
        match c {
            '$' => buf.push_str("([0-9]+)"),
            '.' => buf.push_str("\\."),
            '*' => buf.push_str(".*"),
            '+' => buf.push_str(".+"),
            other => buf.push(other),
        }
    }
    buf.push('$');
    Ok(Regex::new(&buf)?)
}

/// Builds the §6.4 ticket-extraction regex from a comma-separated spec (or
/// the literal `*` for "any project key").
pub fn compile_ticket_regex(spec: &str) -> Result<Regex, VcsError> {
    let alternation = if spec == "*" {
        "[a-zA-Z0-9]+".to_string()
    } else {
        spec.split(',').collect::<Vec<_>>().join("|")
    };
    let pattern = format!("((?:{})-[0-9]+)", alternation);
    Ok(Regex::new(&pattern)?)
}

/// Finds every ticket id in `text`, in the order they occur.
pub fn find_tickets(regex: &Regex, text: &str) -> Vec<String> {
    regex
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_pattern_semver_rc() {
        let regex = compile_tag_pattern("$.$.$-rc.$").unwrap();
        assert!(regex.is_match("1.2.3-rc.4"));
        assert!(!regex.is_match("1.2.3-build.4"));
    }

    #[test]
    fn tag_pattern_wildcard() {
        let regex = compile_tag_pattern("v*").unwrap();
        assert!(regex.is_match("v1.2.3"));
        assert!(regex.is_match("v"));
    }

    #[test]
    fn ticket_regex_wildcard_matches_any_key() {
        let regex = compile_ticket_regex("*").unwrap();
        let found = find_tickets(&regex, "fix ABC-123 and xyz-9 together");
        assert_eq!(found, vec!["ABC-123", "xyz-9"]);
    }

    #[test]
    fn ticket_regex_restricted_to_keys() {
        let regex = compile_ticket_regex("ABC,DEF").unwrap();
        let found = find_tickets(&regex, "touches ABC-1, GHI-2, DEF-3");
        assert_eq!(found, vec!["ABC-1", "DEF-3"]);
    }

    #[test]
    fn opening_missing_repo_is_an_error_not_a_panic() {
        let result = Repo::open("/nonexistent/path/does-not-exist");
        assert!(result.is_err());
    }
}
