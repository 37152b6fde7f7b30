use crate::shared::Result;
use std::path::{Component, Path};

/// Maximum number of exclude patterns to prevent DoS attacks
const MAX_EXCLUDE_PATTERNS: usize = 64;

/// Maximum length of a single exclude pattern to prevent DoS attacks
const MAX_PATTERN_LENGTH: usize = 255;

/// Maximum number of alternatives a single `{a,b,...}` group may expand to
const MAX_ALTERNATIVES: usize = 32;

/// Exclusion patterns used by the default configuration
pub const DEFAULT_EXCLUDE_PATTERNS: [&str; 3] = ["**/.idea/**", "**/test/**", "**/node_modules/**"];

/// ExcludeFilter - decides which workspace directories the package finder skips
///
/// Patterns are path globs:
/// - `**` matches zero or more directories
/// - `*` matches zero or more characters inside one path segment
/// - `{a,b}` expands to one pattern per alternative
///
/// Patterns without a leading `/` match at any depth.
#[derive(Debug, Clone)]
pub struct ExcludeFilter {
    patterns: Vec<ExcludePattern>,
}

impl ExcludeFilter {
    /// Creates a new ExcludeFilter from raw pattern strings
    ///
    /// # Errors
    /// - Too many patterns (> MAX_EXCLUDE_PATTERNS)
    /// - Invalid pattern format (empty, too long, control characters)
    pub fn new(patterns: Vec<String>) -> Result<Self> {
        if patterns.len() > MAX_EXCLUDE_PATTERNS {
            anyhow::bail!(
                "Too many exclusion patterns: {} (maximum: {})",
                patterns.len(),
                MAX_EXCLUDE_PATTERNS
            );
        }

        let mut compiled = Vec::new();
        for pattern in patterns {
            validate_pattern(&pattern)?;
            for expanded in expand_braces(&pattern)? {
                compiled.push(ExcludePattern::new(pattern.clone(), &expanded));
            }
        }

        Ok(Self { patterns: compiled })
    }

    pub fn with_defaults() -> Self {
        Self {
            patterns: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|p| ExcludePattern::new(p.to_string(), p))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Checks if a path matches any exclusion pattern
    pub fn is_excluded(&self, path: &Path) -> bool {
        let segments: Vec<String> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        self.patterns.iter().any(|p| p.matches(&segments))
    }

    /// Original pattern strings, brace groups unexpanded
    pub fn patterns(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.patterns.iter().map(|p| p.original.as_str()).collect();
        out.dedup();
        out
    }
}

/// Represents a single exclusion pattern with its compiled segments
#[derive(Debug, Clone)]
struct ExcludePattern {
    original: String,
    segments: Vec<Segment>,
}

impl ExcludePattern {
    fn new(original: String, expanded: &str) -> Self {
        let anchored = expanded.starts_with('/');
        let mut segments: Vec<Segment> = expanded
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "**" {
                    Segment::AnyDepth
                } else {
                    Segment::Name(compile_segment(s))
                }
            })
            .collect();
        if !anchored && segments.first() != Some(&Segment::AnyDepth) {
            segments.insert(0, Segment::AnyDepth);
        }
        Self { original, segments }
    }

    fn matches(&self, path: &[&str]) -> bool {
        match_segments(&self.segments, path)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// `**`
    AnyDepth,
    Name(PatternMatcher),
}

/// Pattern matcher types for efficient matching of one path segment
#[derive(Debug, Clone, PartialEq)]
enum PatternMatcher {
    /// Exact match: "node_modules"
    Exact(String),
    /// Prefix wildcard: "*.iml"
    Prefix(String),
    /// Suffix wildcard: "build-*"
    Suffix(String),
    /// Contains wildcard: "*test*"
    Contains(String),
    /// Anything: "*"
    Any,
    /// Multiple wildcards: "pre*fix*suf", anchored at both ends unless the
    /// pattern starts or ends with '*'
    Multiple {
        parts: Vec<String>,
        open_start: bool,
        open_end: bool,
    },
}

impl PatternMatcher {
    fn matches(&self, segment: &str) -> bool {
        match self {
            PatternMatcher::Exact(s) => segment == s,
            PatternMatcher::Prefix(suffix) => segment.ends_with(suffix.as_str()),
            PatternMatcher::Suffix(prefix) => segment.starts_with(prefix.as_str()),
            PatternMatcher::Contains(middle) => segment.contains(middle.as_str()),
            PatternMatcher::Any => true,
            PatternMatcher::Multiple {
                parts,
                open_start,
                open_end,
            } => {
                let mut rest = segment;
                for (i, part) in parts.iter().enumerate() {
                    if i == 0 && !open_start {
                        match rest.strip_prefix(part.as_str()) {
                            Some(r) => rest = r,
                            None => return false,
                        }
                    } else if i == parts.len() - 1 && !open_end {
                        return rest.len() >= part.len() && rest.ends_with(part.as_str());
                    } else {
                        match rest.find(part.as_str()) {
                            Some(pos) => rest = &rest[pos + part.len()..],
                            None => return false,
                        }
                    }
                }
                *open_end || rest.is_empty()
            }
        }
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((Segment::Name(matcher), rest)) => match path.split_first() {
            Some((first, tail)) => matcher.matches(first) && match_segments(rest, tail),
            None => false,
        },
    }
}

/// Validates a pattern string
fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.trim().is_empty() {
        anyhow::bail!("Exclusion pattern cannot be empty");
    }

    if pattern.len() > MAX_PATTERN_LENGTH {
        anyhow::bail!(
            "Exclusion pattern is too long: '{}' ({} chars). Maximum: {} chars",
            pattern,
            pattern.len(),
            MAX_PATTERN_LENGTH
        );
    }

    if let Some(ch) = pattern.chars().find(|c| c.is_control()) {
        anyhow::bail!(
            "Exclusion pattern contains invalid character {:?} in pattern '{}'",
            ch,
            pattern
        );
    }

    if pattern.chars().all(|c| c == '*' || c == '/') {
        anyhow::bail!(
            "Exclusion pattern cannot contain only wildcards: '{}'",
            pattern
        );
    }

    Ok(())
}

/// Expands `{a,b}` groups; nested groups are rejected
fn expand_braces(pattern: &str) -> Result<Vec<String>> {
    let Some(open) = pattern.find('{') else {
        if pattern.contains('}') {
            anyhow::bail!("Unbalanced '}}' in exclusion pattern '{}'", pattern);
        }
        return Ok(vec![pattern.to_string()]);
    };
    let Some(close_rel) = pattern[open..].find('}') else {
        anyhow::bail!("Unbalanced '{{' in exclusion pattern '{}'", pattern);
    };
    let close = open + close_rel;
    let body = &pattern[open + 1..close];
    if body.contains('{') {
        anyhow::bail!("Nested '{{' groups are not supported: '{}'", pattern);
    }

    let alternatives: Vec<&str> = body.split(',').collect();
    if alternatives.len() > MAX_ALTERNATIVES {
        anyhow::bail!(
            "Too many alternatives in exclusion pattern '{}' (maximum: {})",
            pattern,
            MAX_ALTERNATIVES
        );
    }

    let mut out = Vec::new();
    for alternative in alternatives {
        let candidate = format!("{}{}{}", &pattern[..open], alternative, &pattern[close + 1..]);
        out.extend(expand_braces(&candidate)?);
    }
    Ok(out)
}

/// Compiles a segment pattern into an optimized matcher
fn compile_segment(segment: &str) -> PatternMatcher {
    let wildcard_count = segment.matches('*').count();

    match wildcard_count {
        0 => PatternMatcher::Exact(segment.to_string()),
        _ if segment.chars().all(|c| c == '*') => PatternMatcher::Any,
        1 => {
            if let Some(stripped) = segment.strip_prefix('*') {
                PatternMatcher::Prefix(stripped.to_string())
            } else if let Some(stripped) = segment.strip_suffix('*') {
                PatternMatcher::Suffix(stripped.to_string())
            } else {
                multiple(segment)
            }
        }
        2 if segment.starts_with('*') && segment.ends_with('*') && segment.len() > 2 => {
            PatternMatcher::Contains(segment[1..segment.len() - 1].to_string())
        }
        _ => multiple(segment),
    }
}

fn multiple(segment: &str) -> PatternMatcher {
    PatternMatcher::Multiple {
        parts: segment
            .split('*')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect(),
        open_start: segment.starts_with('*'),
        open_end: segment.ends_with('*'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn filter(patterns: &[&str]) -> ExcludeFilter {
        ExcludeFilter::new(patterns.iter().map(|p| p.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_defaults_exclude_common_directories() {
        let filter = ExcludeFilter::with_defaults();
        assert!(filter.is_excluded(&PathBuf::from("/ws/web/node_modules/lodash")));
        assert!(filter.is_excluded(&PathBuf::from("/ws/web/node_modules")));
        assert!(filter.is_excluded(&PathBuf::from("/ws/.idea")));
        assert!(filter.is_excluded(&PathBuf::from("/ws/api/test/fixtures")));
        assert!(!filter.is_excluded(&PathBuf::from("/ws/api/src")));
        assert!(!filter.is_excluded(&PathBuf::from("/ws/testing")));
    }

    #[test]
    fn test_brace_expansion() {
        let filter = filter(&["**/*{.idea,test,node_modules}*"]);
        assert!(filter.is_excluded(&PathBuf::from("/ws/my-test-utils")));
        assert!(filter.is_excluded(&PathBuf::from("/ws/web/node_modules")));
        assert!(filter.is_excluded(&PathBuf::from("/ws/.idea")));
        assert!(!filter.is_excluded(&PathBuf::from("/ws/src")));
        assert_eq!(filter.patterns(), vec!["**/*{.idea,test,node_modules}*"]);
    }

    #[test]
    fn test_unanchored_pattern_matches_any_depth() {
        let filter = filter(&["build"]);
        assert!(filter.is_excluded(&PathBuf::from("/ws/a/b/build")));
        assert!(!filter.is_excluded(&PathBuf::from("/ws/a/b/build/classes")));
    }

    #[test]
    fn test_anchored_pattern() {
        let filter = filter(&["/ws/vendor/**"]);
        assert!(filter.is_excluded(&PathBuf::from("/ws/vendor/github.com/x")));
        assert!(!filter.is_excluded(&PathBuf::from("/other/ws/vendor/x")));
    }

    #[test]
    fn test_segment_wildcards() {
        let filter = filter(&["**/build-*", "**/*.bak", "**/pre*mid*suf"]);
        assert!(filter.is_excluded(&PathBuf::from("/ws/build-cache")));
        assert!(filter.is_excluded(&PathBuf::from("/ws/old.bak")));
        assert!(filter.is_excluded(&PathBuf::from("/ws/pre-x-mid-y-suf")));
        assert!(!filter.is_excluded(&PathBuf::from("/ws/xpre-mid-suf")));
        assert!(!filter.is_excluded(&PathBuf::from("/ws/pre-mid-sufx")));
        assert!(!filter.is_excluded(&PathBuf::from("/ws/cache-build")));
    }

    #[test]
    fn test_open_ended_multi_wildcard_segment() {
        let filter = filter(&["**/gen*tmp*"]);
        assert!(filter.is_excluded(&PathBuf::from("/ws/gen-x-tmp-y")));
        assert!(filter.is_excluded(&PathBuf::from("/ws/gentmp")));
        assert!(!filter.is_excluded(&PathBuf::from("/ws/x-gen-tmp")));
        assert!(!filter.is_excluded(&PathBuf::from("/ws/gen-only")));
    }

    #[test]
    fn test_pattern_validation_empty() {
        assert!(ExcludeFilter::new(vec!["".to_string()]).is_err());
        assert!(ExcludeFilter::new(vec!["   ".to_string()]).is_err());
    }

    #[test]
    fn test_pattern_validation_only_wildcards() {
        let result = ExcludeFilter::new(vec!["**/**".to_string()]);
        assert!(result.unwrap_err().to_string().contains("only wildcards"));
    }

    #[test]
    fn test_pattern_validation_too_long() {
        let long = format!("**/{}", "a".repeat(MAX_PATTERN_LENGTH));
        assert!(ExcludeFilter::new(vec![long]).is_err());
    }

    #[test]
    fn test_pattern_validation_control_chars() {
        assert!(ExcludeFilter::new(vec!["**/a\tb".to_string()]).is_err());
    }

    #[test]
    fn test_pattern_validation_too_many_patterns() {
        let patterns = (0..=MAX_EXCLUDE_PATTERNS)
            .map(|i| format!("dir{}", i))
            .collect();
        let result = ExcludeFilter::new(patterns);
        assert!(result.unwrap_err().to_string().contains("Too many"));
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(ExcludeFilter::new(vec!["**/{a,b".to_string()]).is_err());
        assert!(ExcludeFilter::new(vec!["**/a,b}".to_string()]).is_err());
        assert!(ExcludeFilter::new(vec!["**/{a,{b}}".to_string()]).is_err());
    }

    #[test]
    fn test_empty_filter_excludes_nothing() {
        assert!(!ExcludeFilter::empty().is_excluded(&PathBuf::from("/ws/node_modules")));
    }
}
