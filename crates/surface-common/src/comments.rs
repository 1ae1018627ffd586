//! Comment Ranges
//!
//! Comments are not part of the syntax tree handed over by the semantic
//! analysis provider, so they are tracked separately per source file and
//! associated with declarations by position.

/// A range representing a comment in the source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentRange {
    /// Start position (byte offset)
    pub pos: u32,
    /// End position (byte offset)
    pub end: u32,
    /// Whether this is a multi-line comment
    pub is_multi_line: bool,
    /// Whether this comment has a trailing newline
    pub has_trailing_new_line: bool,
}

impl CommentRange {
    /// Create a new comment range.
    pub fn new(pos: u32, end: u32, is_multi_line: bool, has_trailing_new_line: bool) -> Self {
        CommentRange {
            pos,
            end,
            is_multi_line,
            has_trailing_new_line,
        }
    }

    /// Get the comment text from source.
    pub fn get_text<'a>(&self, source: &'a str) -> &'a str {
        let start = self.pos as usize;
        let end = self.end as usize;
        if end <= source.len() && start < end {
            &source[start..end]
        } else {
            ""
        }
    }
}

/// Check if a comment is a documentation comment (`/** ... */`).
pub fn is_doc_comment(comment: &CommentRange, source: &str) -> bool {
    let text = comment.get_text(source);
    text.starts_with("/**") && !text.starts_with("/***")
}

/// Find the documentation comment immediately preceding a position.
///
/// `comments` must be sorted by start position. A comment counts as
/// "immediately preceding" when at most one blank line separates it from
/// `pos` (the usual `/** ... */` followed by the declaration on the next
/// line). Non-doc comments between the doc comment and `pos` break the
/// association.
pub fn nearest_doc_comment<'a>(
    comments: &'a [CommentRange],
    pos: u32,
    source: &str,
) -> Option<&'a CommentRange> {
    if comments.is_empty() {
        return None;
    }

    // Binary search for the last comment that ends at or before `pos`.
    let idx = comments.partition_point(|c| c.end <= pos);
    if idx == 0 {
        return None;
    }

    let comment = &comments[idx - 1];
    if !is_doc_comment(comment, source) {
        return None;
    }

    // Count newlines between the comment and the declaration; allow up to
    // two (comment line break + one blank line).
    let between = &source[comment.end as usize..pos as usize];
    if !between.trim().is_empty() {
        return None;
    }
    let mut newline_count = 0usize;
    for byte in between.as_bytes() {
        if *byte == b'\n' {
            newline_count += 1;
            if newline_count > 2 {
                return None;
            }
        }
    }

    Some(comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment_at(source: &str, text: &str) -> CommentRange {
        let pos = source.find(text).unwrap() as u32;
        CommentRange::new(pos, pos + text.len() as u32, true, true)
    }

    #[test]
    fn test_doc_comment_detection() {
        let source = "/** doc */ /*** not doc */ /* plain */";
        assert!(is_doc_comment(&comment_at(source, "/** doc */"), source));
        assert!(!is_doc_comment(
            &comment_at(source, "/*** not doc */"),
            source
        ));
        assert!(!is_doc_comment(&comment_at(source, "/* plain */"), source));
    }

    #[test]
    fn test_nearest_doc_comment_adjacent() {
        let source = "/** tag */\nexport interface Foo {}\n";
        let comments = vec![comment_at(source, "/** tag */")];
        let decl_pos = source.find("export").unwrap() as u32;
        let found = nearest_doc_comment(&comments, decl_pos, source);
        assert_eq!(found, Some(&comments[0]));
    }

    #[test]
    fn test_nearest_doc_comment_too_far() {
        let source = "/** tag */\n\n\n\nexport interface Foo {}\n";
        let comments = vec![comment_at(source, "/** tag */")];
        let decl_pos = source.find("export").unwrap() as u32;
        assert_eq!(nearest_doc_comment(&comments, decl_pos, source), None);
    }

    #[test]
    fn test_nearest_doc_comment_skips_following_comments() {
        let source = "/** a */\nclass A {}\n/** b */\nclass B {}\n";
        let comments = vec![comment_at(source, "/** a */"), comment_at(source, "/** b */")];
        let b_pos = source.find("class B").unwrap() as u32;
        let found = nearest_doc_comment(&comments, b_pos, source);
        assert_eq!(found.map(|c| c.get_text(source)), Some("/** b */"));
    }
}
