//! Mixin types for attaching source locations to values.
//!
//! - `SourceLineMixin` is a generic wrapper that attaches the timing group index and the line number to a value.
//! - `SourceLineMixinExt` is a trait that provides extension methods to create `SourceLineMixin` instances.

/// A generic wrapper that attaches a source line location to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLineMixin<T> {
    /// Wrapped content value
    content: T,
    /// Index of the timing group the line belongs to.
    group: usize,
    /// Line number in the chart source (1-based).
    line: usize,
}

impl<T> SourceLineMixin<T> {
    /// Instances a new `SourceLineMixin`
    pub const fn new(content: T, group: usize, line: usize) -> Self {
        Self {
            content,
            group,
            line,
        }
    }

    /// Returns the wrapped content.
    pub const fn content(&self) -> &T {
        &self.content
    }

    /// Leans the content out of the wrapper.
    pub fn into_content(self) -> T {
        self.content
    }

    /// Returns the timing group index.
    pub const fn group(&self) -> usize {
        self.group
    }

    /// Returns the 1-based line number.
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Maps the content of the wrapper.
    pub fn map<U, F>(self, f: F) -> SourceLineMixin<U>
    where
        F: FnOnce(T) -> U,
    {
        SourceLineMixin::new(f(self.content), self.group, self.line)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for SourceLineMixin<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {} (timing group {})",
            self.content, self.line, self.group
        )
    }
}

impl<T: std::error::Error + 'static> std::error::Error for SourceLineMixin<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.content)
    }
}

/// Extension methods for `SourceLineMixin`.
pub trait SourceLineMixinExt {
    /// Instances a new `SourceLineMixin` at the same location as a wrapper.
    fn into_wrapper<W>(self, wrapper: &SourceLineMixin<W>) -> SourceLineMixin<Self>
    where
        Self: Sized,
    {
        SourceLineMixin::new(self, wrapper.group, wrapper.line)
    }

    /// Instances a new `SourceLineMixin` with a given group index and line number.
    fn at_line(self, group: usize, line: usize) -> SourceLineMixin<Self>
    where
        Self: Sized,
    {
        SourceLineMixin::new(self, group, line)
    }
}

impl<T> SourceLineMixinExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapper_keeps_location_through_map() {
        let wrapped = "hold".at_line(2, 17);
        let mapped = wrapped.map(str::len);
        assert_eq!(mapped.content(), &4);
        assert_eq!(mapped.group(), 2);
        assert_eq!(mapped.line(), 17);
        assert_eq!(
            ().into_wrapper(&mapped),
            SourceLineMixin::new((), 2, 17)
        );
    }

    #[test]
    fn display_names_line_and_group() {
        assert_eq!(
            "bad".at_line(1, 4).to_string(),
            "bad at line 4 (timing group 1)"
        );
    }
}
