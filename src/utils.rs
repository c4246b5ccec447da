//! # Utility Functions Module
//!
//! Small helpers for building codec argument lists.

/// Builds an argument vector from items of mixed types.
///
/// # Example
/// ```rust
/// use dist_compress::args;
///
/// let level = 19;
/// let args = args!["-q", format!("-{}", level)];
/// assert_eq!(args, vec!["-q".to_string(), "-19".to_string()]);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        vec![$(::std::string::ToString::to_string(&$item)),*]
    };
}
