//! Per-compile settings.

/// Options for one compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Record source lines for every statement and the names of globals.
    pub debug_info: bool,
    /// Stop parsing once this many diagnostics have been reported.
    pub max_errors: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            debug_info: false,
            max_errors: 32,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug_info(mut self, debug_info: bool) -> Self {
        self.debug_info = debug_info;
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_builders() {
        let options = CompileOptions::default();
        assert!(!options.debug_info);
        assert_eq!(options.max_errors, 32);

        let options = CompileOptions::new().with_debug_info(true).with_max_errors(0);
        assert!(options.debug_info);
        assert_eq!(options.max_errors, 1);
    }
}
