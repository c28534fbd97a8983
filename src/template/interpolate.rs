//! Template interpolation against a request hostname.
//!
//! Interpolation is a pure function of (hostname, template): the hostname
//! is split into dot-separated labels once, then the template's segments
//! are emitted into a growable output with a checked byte limit.

use thiserror::Error;

use super::{Index, Segment, Template, MAX_PATH_LEN};

/// Dot-boundary slots recorded per hostname, including the start sentinel.
/// Labels past the cap are unreachable; the final label swallows the rest.
const MAX_DOTS: usize = 19;

/// The interpolated path would exceed [`MAX_PATH_LEN`](super::MAX_PATH_LEN).
///
/// This is a per-template failure: the resolution engine skips to the next
/// configured template instead of emitting a truncated path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("interpolation of '{template}' exceeds the {limit}-byte path limit")]
pub struct PathOverflow {
    pub template: String,
    pub limit: usize,
}

impl Template {
    /// Expand this template for the given hostname.
    ///
    /// Literal characters are copied with their original case; specifier
    /// output is ASCII-lowercased. An index no hostname label (or label
    /// character) can satisfy emits a `_` placeholder. One trailing `/` is
    /// trimmed from the final result.
    pub fn interpolate(&self, hostname: &str) -> Result<String, PathOverflow> {
        let dots = dot_offsets(hostname);
        let ndots = dots.len() - 1;

        let mut out = String::new();
        for segment in self.segments() {
            match segment {
                Segment::Literal(lit) => {
                    if out.len() + lit.len() > MAX_PATH_LEN {
                        return Err(self.overflow());
                    }
                    out.push_str(lit);
                }
                Segment::Specifier { primary, secondary } => {
                    let mut unit = select_labels(hostname, &dots, ndots, *primary);
                    if let Some(sub) = secondary {
                        unit = select_chars(unit, *sub);
                    }
                    for ch in unit.chars() {
                        let ch = ch.to_ascii_lowercase();
                        if out.len() + ch.len_utf8() > MAX_PATH_LEN {
                            return Err(self.overflow());
                        }
                        out.push(ch);
                    }
                }
            }
        }

        if out.ends_with('/') {
            out.pop();
        }
        Ok(out)
    }

    fn overflow(&self) -> PathOverflow {
        PathOverflow {
            template: self.as_str().to_string(),
            limit: MAX_PATH_LEN,
        }
    }
}

/// Byte offsets of the recorded label boundaries: a `-1` start sentinel,
/// then each recorded `.`, then the end of the hostname. Label `i`
/// (1-based) spans `dots[i-1]+1 .. dots[i]`.
fn dot_offsets(hostname: &str) -> Vec<i64> {
    let mut dots = Vec::with_capacity(MAX_DOTS + 1);
    dots.push(-1i64);
    for (i, b) in hostname.bytes().enumerate() {
        if b == b'.' && dots.len() < MAX_DOTS {
            dots.push(i as i64);
        }
    }
    dots.push(hostname.len() as i64);
    dots
}

fn select_labels<'h>(hostname: &'h str, dots: &[i64], ndots: usize, idx: Index) -> &'h str {
    if idx.value == 0 {
        return hostname;
    }
    let n = idx.value as usize;
    if n > ndots {
        return "_";
    }
    let (start, end) = if !idx.from_end {
        let start = (dots[n - 1] + 1) as usize;
        let end = if idx.open {
            hostname.len()
        } else {
            dots[n] as usize
        };
        (start, end)
    } else {
        let start = (dots[ndots - n] + 1) as usize;
        let end = if idx.open {
            hostname.len()
        } else {
            dots[ndots - n + 1] as usize
        };
        (start, end)
    };
    &hostname[start..end]
}

/// The secondary index reuses the four-way rule, but over character
/// positions within the already-selected unit.
fn select_chars(unit: &str, idx: Index) -> &str {
    if idx.value == 0 {
        return unit;
    }
    let m = idx.value as usize;
    let offsets: Vec<usize> = unit.char_indices().map(|(i, _)| i).collect();
    let len = offsets.len();
    if m > len {
        return "_";
    }
    let (first, last) = if !idx.from_end {
        if idx.open {
            (m - 1, len)
        } else {
            (m - 1, m)
        }
    } else if idx.open {
        (len - m, len)
    } else {
        (len - m, len - m + 1)
    };
    let start = offsets[first];
    let end = if last == len { unit.len() } else { offsets[last] };
    &unit[start..end]
}

#[cfg(test)]
mod tests {
    use super::super::Template;
    use super::*;

    fn expand(template: &str, hostname: &str) -> String {
        Template::parse(template)
            .expect("template must validate")
            .interpolate(hostname)
            .expect("interpolation must fit the path limit")
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let t = Template::parse("/var/www/%0/htdocs").unwrap();
        let a = t.interpolate("www.example.com").unwrap();
        let b = t.interpolate("www.example.com").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "/var/www/www.example.com/htdocs");
    }

    #[test]
    fn open_range_selects_from_label_to_end() {
        assert_eq!(expand("/var/www/%2+", "www.example.com"), "/var/www/example.com");
    }

    #[test]
    fn from_end_selects_last_label_and_trims_trailing_slash() {
        assert_eq!(expand("/srv/%-1/", "www.example.com"), "/srv/com");
    }

    #[test]
    fn from_end_open_range_selects_through_the_end() {
        assert_eq!(expand("%-2+", "www.example.com"), "example.com");
    }

    #[test]
    fn out_of_range_label_becomes_placeholder() {
        assert_eq!(expand("/x/%9", "www.example.com"), "/x/_");
        assert_eq!(expand("/x/%4/y", "www.example.com"), "/x/_/y");
    }

    #[test]
    fn zero_selects_whole_hostname_lowercased() {
        assert_eq!(expand("%0", "WWW.Example.COM"), "www.example.com");
    }

    #[test]
    fn literal_case_is_preserved() {
        assert_eq!(expand("/Var/WWW/%1", "WWW.example.com"), "/Var/WWW/www");
    }

    #[test]
    fn secondary_index_selects_characters_within_label() {
        assert_eq!(expand("%1.1", "www.example.com"), "w");
        assert_eq!(expand("%2.2+", "www.example.com"), "xample");
        assert_eq!(expand("%2.-1", "www.example.com"), "e");
        assert_eq!(expand("%2.-3+", "www.example.com"), "ple");
    }

    #[test]
    fn secondary_out_of_range_becomes_placeholder() {
        assert_eq!(expand("/x/%1.9", "www.example.com"), "/x/_");
    }

    #[test]
    fn secondary_zero_keeps_whole_unit() {
        assert_eq!(expand("%2.0", "www.example.com"), "example");
    }

    #[test]
    fn labels_past_the_dot_cap_are_unreachable() {
        let labels: Vec<String> = (0..25).map(|i| format!("x{i}")).collect();
        let hostname = labels.join(".");
        // Only 18 dots are recorded, so the 19th label runs to the end.
        assert_eq!(expand("%-1", &hostname), labels[18..].join("."));
        assert_eq!(expand("%9", &hostname), "x8");
    }

    #[test]
    fn empty_hostname_yields_empty_label() {
        // The empty expansion leaves a literal trailing slash, which is
        // then trimmed like any other.
        assert_eq!(expand("/x/%1", ""), "/x");
        assert_eq!(expand("/x/%2", ""), "/x/_");
    }

    #[test]
    fn oversized_expansion_is_an_error() {
        let long = format!("/{}", "a".repeat(600));
        let t = Template::parse(&long).unwrap();
        let err = t.interpolate("www.example.com").unwrap_err();
        assert_eq!(err.limit, MAX_PATH_LEN);

        // Just under the limit still succeeds.
        let ok = format!("/{}", "a".repeat(MAX_PATH_LEN - 1));
        assert!(Template::parse(&ok).unwrap().interpolate("h").is_ok());
    }
}
