//! Retroactive deletion
//!
//! DELETE (and CANCEL, DISCARD, REMOVE) removes earlier commitments that
//! share at least one tag with it. A single left-to-right pass keeps an
//! accumulator of surviving commitments; each DELETE can only shrink what is
//! already in it, so it never reaches commitments written after it. DELETEs
//! themselves never survive, and one without tags does nothing.

use crate::parser::ParsedCommitment;
use tracing::debug;

/// Resolve every DELETE-family commitment, preserving ordinals of survivors
pub fn filter_deletions(commitments: &[ParsedCommitment]) -> Vec<ParsedCommitment> {
    let mut kept: Vec<ParsedCommitment> = Vec::with_capacity(commitments.len());

    for commitment in commitments {
        if !commitment.kind.is_deletion() {
            kept.push(commitment.clone());
            continue;
        }

        let targets = commitment.tags();
        if targets.is_empty() {
            debug!(
                "{} at line {} has no tags, ignoring",
                commitment.keyword, commitment.line
            );
            continue;
        }

        let before = kept.len();
        kept.retain(|candidate| candidate.tags().is_disjoint(targets));
        debug!(
            "{} at line {} removed {} commitment(s)",
            commitment.keyword,
            commitment.line,
            before - kept.len()
        );
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitments::CommitmentType;
    use crate::parser::parse_agent_source;

    fn filtered(source: &str) -> Vec<ParsedCommitment> {
        filter_deletions(&parse_agent_source(source).commitments)
    }

    #[test]
    fn test_delete_removes_tagged() {
        let kept = filtered("Agent\nKNOWLEDGE @X old\nRULE keep me\nDELETE {X}");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].kind, CommitmentType::Rule);
        assert_eq!(kept[0].ordinal, 1);
    }

    #[test]
    fn test_delete_is_retroactive_only() {
        let kept = filtered("Agent\nDELETE @X\nKNOWLEDGE @X new");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].content, "@X new");
        assert_eq!(kept[0].ordinal, 1);
    }

    #[test]
    fn test_untagged_delete_is_noop() {
        let kept = filtered("Agent\nRULE one\nRULE two\nDELETE everything");
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_any_shared_tag_removes() {
        let kept = filtered("Agent\nRULE @a @b first\nRULE @c second\nREMOVE @B @z");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].content, "@c second");
    }

    #[test]
    fn test_tags_compare_case_insensitively() {
        let kept = filtered("Agent\nNOTE { Pricing } draft\nCANCEL @pricing");
        assert!(kept.is_empty());
    }

    #[test]
    fn test_sequential_deletes() {
        let kept = filtered("Agent\nRULE @x one\nDISCARD @x\nRULE @x two\nDELETE @x\nRULE @x three");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].content, "@x three");
        assert_eq!(kept[0].ordinal, 5);
    }

    #[test]
    fn test_valued_parameter_is_not_a_target() {
        let kept = filtered("Agent\nKNOWLEDGE {X: value}\nDELETE {X}");
        assert_eq!(kept.len(), 1);
    }
}
