use crate::range::DateRange;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// One main-branch commit as fetched, before author bucketing.
#[derive(Debug, Clone)]
pub struct CommitEntry {
    pub sha: String,
    /// Platform login of the author, when the commit is linked to one.
    pub login: Option<String>,
    /// Free-text author name from the commit metadata.
    pub author_name: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Commit {
    pub repo: String,
    pub sha: String,
    pub date: DateTime<Utc>,
}

/// All commits attributed to one author key, across repositories.
#[derive(Debug, Clone)]
pub struct Contributor {
    /// Display name, taken from the first commit seen for this key.
    pub name: String,
    pub commits: Vec<Commit>,
}

/// Author key (login, or raw author name when no login is linked) to
/// that author's commit history.
pub type ContributionMap = HashMap<String, Contributor>;

/// Bucket one repository's commits by author key. The same human can end
/// up under two keys when some of their commits lack a linked login;
/// that duplication is deliberate and left unresolved.
pub fn collect(repo: &str, entries: Vec<CommitEntry>) -> ContributionMap {
    let mut map = ContributionMap::new();

    for entry in entries {
        let key = match &entry.login {
            Some(login) => login.clone(),
            None => entry.author_name.clone(),
        };
        map.entry(key)
            .or_insert_with(|| Contributor {
                name: entry.author_name,
                commits: Vec::new(),
            })
            .commits
            .push(Commit {
                repo: repo.to_string(),
                sha: entry.sha,
                date: entry.date,
            });
    }

    map
}

/// Fold any number of per-repo maps into one. For a key present on both
/// sides the commit lists are concatenated; the display name comes from
/// whichever side was folded in first. Associative and commutative up to
/// commit order, which nothing downstream depends on.
pub fn merge_all(maps: impl IntoIterator<Item = ContributionMap>) -> ContributionMap {
    maps.into_iter().fold(ContributionMap::new(), merge_two)
}

fn merge_two(mut acc: ContributionMap, other: ContributionMap) -> ContributionMap {
    for (key, contributor) in other {
        match acc.entry(key) {
            Entry::Occupied(mut e) => e.get_mut().commits.extend(contributor.commits),
            Entry::Vacant(e) => {
                e.insert(contributor);
            }
        }
    }
    acc
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activity {
    /// Has a commit within [range_start, range_end).
    pub active: bool,
    /// Active, with no commit within [year_start, range_start).
    pub new: bool,
}

/// Classify one author's merged history against the analysis range.
pub fn classify(contributor: &Contributor, range: &DateRange) -> Activity {
    let mut active = false;
    let mut seen_earlier = false;

    for commit in &contributor.commits {
        if range.range_start <= commit.date && commit.date < range.range_end {
            active = true;
        }
        if range.year_start <= commit.date && commit.date < range.range_start {
            seen_earlier = true;
        }
    }

    Activity {
        active,
        new: active && !seen_earlier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn entry(login: Option<&str>, name: &str, sha: &str, date: DateTime<Utc>) -> CommitEntry {
        CommitEntry {
            sha: sha.to_string(),
            login: login.map(str::to_string),
            author_name: name.to_string(),
            date,
        }
    }

    fn shas(map: &ContributionMap, key: &str) -> Vec<String> {
        let mut shas: Vec<String> = map[key].commits.iter().map(|c| c.sha.clone()).collect();
        shas.sort();
        shas
    }

    #[test]
    fn commits_keyed_by_login_with_name_fallback() {
        let map = collect(
            "racket",
            vec![
                entry(Some("alice"), "Alice A", "a1", utc(2020, 3, 12)),
                entry(None, "Drive-by Dan", "d1", utc(2020, 3, 13)),
                entry(Some("alice"), "Alice A", "a2", utc(2020, 3, 14)),
            ],
        );

        assert_eq!(map.len(), 2);
        assert_eq!(shas(&map, "alice"), vec!["a1", "a2"]);
        assert_eq!(map["alice"].name, "Alice A");
        assert_eq!(shas(&map, "Drive-by Dan"), vec!["d1"]);
    }

    #[test]
    fn merge_is_associative_and_commutative() {
        let a = collect("racket", vec![entry(Some("alice"), "Alice", "a1", utc(2020, 1, 5))]);
        let b = collect("redex", vec![
            entry(Some("alice"), "Alice", "a2", utc(2020, 2, 5)),
            entry(Some("bob"), "Bob", "b1", utc(2020, 3, 5)),
        ]);
        let c = collect("plot", vec![entry(Some("carol"), "Carol", "c1", utc(2020, 3, 6))]);

        let left = merge_all([merge_all([a.clone(), b.clone()]), c.clone()]);
        let right = merge_all([a.clone(), merge_all([b.clone(), c.clone()])]);
        let swapped = merge_all([c, b, a]);

        for merged in [&right, &swapped] {
            let mut keys: Vec<_> = merged.keys().collect();
            keys.sort();
            let mut left_keys: Vec<_> = left.keys().collect();
            left_keys.sort();
            assert_eq!(left_keys, keys);
            for key in keys {
                assert_eq!(shas(&left, key), shas(merged, key));
            }
        }
    }

    #[test]
    fn merging_an_empty_map_changes_nothing() {
        let a = collect("racket", vec![entry(Some("alice"), "Alice", "a1", utc(2020, 1, 5))]);
        let merged = merge_all([a.clone(), ContributionMap::new()]);
        assert_eq!(merged.len(), 1);
        assert_eq!(shas(&merged, "alice"), shas(&a, "alice"));

        assert!(merge_all(Vec::<ContributionMap>::new()).is_empty());
    }

    #[test]
    fn commit_before_range_start_prevents_new() {
        let range = range::resolve(3, 2020).unwrap();
        let alice = Contributor {
            name: "Alice".to_string(),
            commits: vec![
                Commit { repo: "racket".into(), sha: "a1".into(), date: utc(2020, 1, 10) },
                Commit { repo: "racket".into(), sha: "a2".into(), date: utc(2020, 3, 12) },
            ],
        };

        assert_eq!(classify(&alice, &range), Activity { active: true, new: false });
    }

    #[test]
    fn author_with_only_in_range_commits_is_new() {
        let range = range::resolve(3, 2020).unwrap();
        let newcomer = Contributor {
            name: "Newcomer".to_string(),
            commits: vec![Commit {
                repo: "racket".into(),
                sha: "n1".into(),
                date: utc(2020, 3, 20),
            }],
        };

        assert_eq!(classify(&newcomer, &range), Activity { active: true, new: true });
    }

    #[test]
    fn inactive_author_is_never_new() {
        let range = range::resolve(3, 2020).unwrap();
        let early = Contributor {
            name: "Early Bird".to_string(),
            commits: vec![Commit {
                repo: "racket".into(),
                sha: "e1".into(),
                date: utc(2020, 1, 2),
            }],
        };

        assert_eq!(classify(&early, &range), Activity { active: false, new: false });
    }
}
