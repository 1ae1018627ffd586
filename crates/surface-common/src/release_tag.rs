//! Release Tags
//!
//! A release tag classifies a declaration's visibility tier. Tags are
//! written in documentation comments (`@internal`, `@alpha`, `@beta`,
//! `@public`) and control which rollup outputs include the declaration.

use memchr::memmem;

/// Visibility tier of a declaration.
///
/// Tiers nest: an internal rollup includes everything an alpha rollup
/// includes, and so on down to public. `None` means no tag was written;
/// untagged declarations are treated as public.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ReleaseTag {
    #[default]
    None,
    Internal,
    Alpha,
    Beta,
    Public,
}

/// Tag keywords in scan order. Leftmost occurrence in the comment wins.
const TAG_MARKERS: [(&str, ReleaseTag); 4] = [
    ("@internal", ReleaseTag::Internal),
    ("@alpha", ReleaseTag::Alpha),
    ("@beta", ReleaseTag::Beta),
    ("@public", ReleaseTag::Public),
];

impl ReleaseTag {
    /// The tier used for inclusion decisions: untagged defaults to public.
    pub fn effective(self) -> ReleaseTag {
        match self {
            ReleaseTag::None => ReleaseTag::Public,
            other => other,
        }
    }

    /// Whether a declaration with this tag is included in a rollup whose
    /// cutoff is `cutoff`. An `Internal` cutoff includes everything; a
    /// `Public` cutoff includes only public (and untagged) declarations.
    pub fn includes(self, cutoff: ReleaseTag) -> bool {
        self.effective() >= cutoff.effective()
    }

    /// Scan a documentation comment for a release tag keyword.
    ///
    /// Returns the tag whose marker occurs earliest in the text, so a
    /// comment containing several tags behaves deterministically.
    pub fn scan_doc_comment(text: &str) -> Option<ReleaseTag> {
        let mut best: Option<(usize, ReleaseTag)> = None;
        for (marker, tag) in TAG_MARKERS {
            if let Some(at) = memmem::find(text.as_bytes(), marker.as_bytes()) {
                // Reject e.g. "@internally" by requiring a non-word boundary.
                let after = text.as_bytes().get(at + marker.len());
                let bounded = match after {
                    None => true,
                    Some(b) => !b.is_ascii_alphanumeric(),
                };
                if bounded && best.is_none_or(|(prev, _)| at < prev) {
                    best = Some((at, tag));
                }
            }
        }
        best.map(|(_, tag)| tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_finds_tags() {
        assert_eq!(
            ReleaseTag::scan_doc_comment("/** @internal */"),
            Some(ReleaseTag::Internal)
        );
        assert_eq!(
            ReleaseTag::scan_doc_comment("/** A widget. @beta */"),
            Some(ReleaseTag::Beta)
        );
        assert_eq!(ReleaseTag::scan_doc_comment("/** plain */"), None);
    }

    #[test]
    fn test_scan_leftmost_wins() {
        assert_eq!(
            ReleaseTag::scan_doc_comment("/** @beta then @internal */"),
            Some(ReleaseTag::Beta)
        );
    }

    #[test]
    fn test_scan_requires_word_boundary() {
        assert_eq!(ReleaseTag::scan_doc_comment("/** @internally */"), None);
        assert_eq!(
            ReleaseTag::scan_doc_comment("/** @internal. */"),
            Some(ReleaseTag::Internal)
        );
    }

    #[test]
    fn test_tier_nesting() {
        // Internal cutoff includes every tag.
        for tag in [
            ReleaseTag::None,
            ReleaseTag::Internal,
            ReleaseTag::Alpha,
            ReleaseTag::Beta,
            ReleaseTag::Public,
        ] {
            assert!(tag.includes(ReleaseTag::Internal));
        }
        // Public cutoff includes only public/untagged.
        assert!(ReleaseTag::Public.includes(ReleaseTag::Public));
        assert!(ReleaseTag::None.includes(ReleaseTag::Public));
        assert!(!ReleaseTag::Beta.includes(ReleaseTag::Public));
        assert!(!ReleaseTag::Internal.includes(ReleaseTag::Public));
        // Beta cutoff sits between.
        assert!(ReleaseTag::Beta.includes(ReleaseTag::Beta));
        assert!(!ReleaseTag::Alpha.includes(ReleaseTag::Beta));
    }

    #[test]
    fn test_monotonicity() {
        // Anything included at a stricter cutoff is included at a looser one.
        let cutoffs = [
            ReleaseTag::Public,
            ReleaseTag::Beta,
            ReleaseTag::Alpha,
            ReleaseTag::Internal,
        ];
        for tag in [ReleaseTag::None, ReleaseTag::Beta, ReleaseTag::Public] {
            for pair in cutoffs.windows(2) {
                if tag.includes(pair[0]) {
                    assert!(tag.includes(pair[1]));
                }
            }
        }
    }
}
