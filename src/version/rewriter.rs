//! Rewriting of every declaration of a dependency onto one resolved target
//!
//! A dependency declared inconsistently (one declaration on a tag, another on a
//! branch) is normalised to the single resolved reference. Declarations pinned
//! by commit SHA keep that style and receive the target's commit.

use crate::version::pin::Pin;
use crate::version::resolver::{Resolution, ResolvedTarget};
use crate::version::types::Requirement;

/// Updated requirements for the `(name, url)` group of `url`
///
/// Requirements of other URLs are returned unchanged. Inputs are never
/// mutated.
pub fn rewrite(requirements: &[Requirement], url: &str, resolution: &Resolution) -> Vec<Requirement> {
    let target = match resolution {
        Resolution::Upgrade(target) | Resolution::TagMoved(target) => target,
        Resolution::BranchTip(target) => {
            let all_on_branch = requirements
                .iter()
                .filter(|r| r.source.url == url)
                .all(|r| r.source.reference == target.reference());
            if all_on_branch {
                return requirements.to_vec();
            }
            target
        }
        Resolution::UpToDate | Resolution::AllIgnored | Resolution::Unresolvable => {
            return requirements.to_vec();
        }
    };

    requirements
        .iter()
        .map(|r| {
            if r.source.url == url {
                r.repinned(new_reference(&r.source.reference, target))
            } else {
                r.clone()
            }
        })
        .collect()
}

fn new_reference<'a>(current: &str, target: &'a ResolvedTarget) -> &'a str {
    match Pin::classify_offline(current) {
        Pin::Commit(_) => target.commit(),
        Pin::Version(_) | Pin::Branch(_) | Pin::Alias(_) => target.reference(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::classifier::classify;

    const URL: &str = "https://github.com/actions/checkout";
    const SHA: &str = "8e5e7e5ab8b370d6c329ec480221332ada57f0ab";

    fn req(reference: &str, file: &str) -> Requirement {
        Requirement::git(URL, reference, file)
            .with_declaration(format!("actions/checkout@{reference}"))
    }

    fn tag_upgrade(name: &str, commit: &str) -> Resolution {
        Resolution::Upgrade(ResolvedTarget::Tag {
            name: name.to_string(),
            commit: commit.to_string(),
            version: classify(name).unwrap(),
        })
    }

    fn refs(requirements: &[Requirement]) -> Vec<&str> {
        requirements
            .iter()
            .map(|r| r.source.reference.as_str())
            .collect()
    }

    #[test]
    fn mixed_tag_and_branch_pins_are_normalised() {
        let requirements = vec![req("v2.1.0", "a.yml"), req("master", "b.yml")];

        let updated = rewrite(&requirements, URL, &tag_upgrade("v2.2.0", SHA));

        assert_eq!(refs(&updated), vec!["v2.2.0", "v2.2.0"]);
        assert_eq!(updated[1].metadata.declaration_string, "actions/checkout@master");
        assert_eq!(updated[1].file, requirements[1].file);
        assert_eq!(refs(&requirements), vec!["v2.1.0", "master"]);
    }

    #[test]
    fn commit_pins_receive_the_target_commit() {
        let requirements = vec![req("v2.1.0", "a.yml"), req("abc1234", "b.yml")];

        let updated = rewrite(&requirements, URL, &tag_upgrade("v2.2.0", SHA));

        assert_eq!(refs(&updated), vec!["v2.2.0", SHA]);
    }

    #[test]
    fn pure_branch_pin_is_left_unchanged() {
        let requirements = vec![req("master", "a.yml"), req("master", "b.yml")];
        let resolution = Resolution::BranchTip(ResolvedTarget::Branch {
            name: "master".to_string(),
            commit: SHA.to_string(),
        });

        assert_eq!(rewrite(&requirements, URL, &resolution), requirements);
    }

    #[test]
    fn branch_tip_normalises_declarations_off_the_branch() {
        let requirements = vec![req("master", "a.yml"), req("latest", "b.yml")];
        let resolution = Resolution::BranchTip(ResolvedTarget::Branch {
            name: "master".to_string(),
            commit: SHA.to_string(),
        });

        let updated = rewrite(&requirements, URL, &resolution);

        assert_eq!(refs(&updated), vec!["master", "master"]);
        assert_eq!(updated[1].metadata.declaration_string, "actions/checkout@latest");
        assert_eq!(refs(&requirements), vec!["master", "latest"]);
    }

    #[test]
    fn no_target_leaves_requirements_unchanged() {
        let requirements = vec![req("v2.1.0", "a.yml")];

        for resolution in [Resolution::UpToDate, Resolution::AllIgnored, Resolution::Unresolvable] {
            assert_eq!(rewrite(&requirements, URL, &resolution), requirements);
        }
    }

    #[test]
    fn other_urls_are_untouched() {
        let fork = Requirement::git("https://github.com/fork/checkout", "v1", "c.yml");
        let requirements = vec![req("v2.1.0", "a.yml"), fork.clone()];

        let updated = rewrite(&requirements, URL, &tag_upgrade("v2.2.0", SHA));

        assert_eq!(updated[0].source.reference, "v2.2.0");
        assert_eq!(updated[1], fork);
    }

    #[test]
    fn raw_commit_target_rewrites_commit_pins() {
        let requirements = vec![req(SHA, "a.yml")];
        let resolution = Resolution::Upgrade(ResolvedTarget::RawCommit {
            commit: "ccccccccccccccccccccccccccccccccccccccca".to_string(),
        });

        let updated = rewrite(&requirements, URL, &resolution);

        assert_eq!(refs(&updated), vec!["ccccccccccccccccccccccccccccccccccccccca"]);
    }
}
