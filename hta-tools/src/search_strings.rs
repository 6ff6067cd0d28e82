//! PubMed query discovery in a project's search-strings file.

/// Lines following a PubMed header that may hold its query.
const HEADER_LOOKAHEAD: usize = 4;
/// A header-less line must be longer than this to count as a query.
const MIN_QUERY_CHARS: usize = 10;

fn is_skipped(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with('-')
}

/// Find the PubMed query in a search-strings document.
///
/// Blank lines and lines starting with `#` or `-` are ignored. A line
/// mentioning PubMed supplies the query after its first `:`, or else via the
/// next usable line within the following four. Without such a header, the
/// first usable line of more than ten characters is taken.
pub fn extract_pubmed_query(content: &str) -> Option<String> {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();

    for (i, line) in lines.iter().enumerate() {
        if is_skipped(line) {
            continue;
        }

        if line.to_lowercase().contains("pubmed") {
            if let Some((_, rest)) = line.split_once(':')
                && !rest.trim().is_empty()
            {
                return Some(rest.trim().to_string());
            }
            let following = lines.iter().skip(i + 1).take(HEADER_LOOKAHEAD);
            if let Some(next) = following.copied().find(|l| !is_skipped(l)) {
                return Some(next.to_string());
            }
        } else if line.chars().count() > MIN_QUERY_CHARS {
            return Some((*line).to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_on_header_line() {
        let content = "# Search strategy\n\nPubMed: (HPV vaccine) AND India\nEmbase: hpv\n";
        assert_eq!(
            extract_pubmed_query(content).as_deref(),
            Some("(HPV vaccine) AND India")
        );
    }

    #[test]
    fn test_query_after_header() {
        let content = "PubMed search strategy\n\n# comment\n- bullet\n(\"dialysis\"[MeSH]) AND India\n";
        assert_eq!(
            extract_pubmed_query(content).as_deref(),
            Some("(\"dialysis\"[MeSH]) AND India")
        );
    }

    #[test]
    fn test_header_with_empty_colon_uses_next_line() {
        let content = "PubMed:\n  tuberculosis AND bedaquiline  \n";
        assert_eq!(
            extract_pubmed_query(content).as_deref(),
            Some("tuberculosis AND bedaquiline")
        );
    }

    #[test]
    fn test_header_lookahead_is_bounded() {
        // The fifth line after the header is outside the window.
        assert_eq!(extract_pubmed_query("PubMed\n\n\n\n\nhpv\n"), None);

        // Past the window, substantial lines still qualify on their own.
        assert_eq!(
            extract_pubmed_query("PubMed\n\n\n\n\nlong enough query line\n").as_deref(),
            Some("long enough query line")
        );
    }

    #[test]
    fn test_first_substantial_line_without_header() {
        let content = "short\ncervical cancer screening India\n";
        assert_eq!(
            extract_pubmed_query(content).as_deref(),
            Some("cervical cancer screening India")
        );
    }

    #[test]
    fn test_no_query() {
        assert_eq!(extract_pubmed_query(""), None);
        assert_eq!(extract_pubmed_query("# only\n- comments\nshort\n"), None);
    }
}
