//! Engine configuration for backend selection and JIT compilation.

/// Expressions with more tokens than this use the flat interpreter
pub const DEFAULT_FLAT_THRESHOLD: usize = 20;

/// Deepest call tree evaluated recursively before falling back to flat
pub const MAX_TREE_DEPTH: usize = 256;

/// Which evaluation backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendChoice {
    /// Pick by expression size
    #[default]
    Auto,
    /// Always use the flat stack interpreter
    Interpreter,
    /// Always use the call tree (flat when too deep)
    CallTree,
    /// Compile to native code
    Jit,
}

impl BackendChoice {
    /// Parse a backend name as accepted on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "auto" => Some(BackendChoice::Auto),
            "interpreter" | "flat" => Some(BackendChoice::Interpreter),
            "tree" | "calltree" => Some(BackendChoice::CallTree),
            "jit" => Some(BackendChoice::Jit),
            _ => None,
        }
    }
}

/// Cranelift optimization level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JitOptLevel {
    None,
    #[default]
    Speed,
    SpeedAndSize,
}

impl JitOptLevel {
    /// Value of the Cranelift `opt_level` setting
    pub fn as_str(self) -> &'static str {
        match self {
            JitOptLevel::None => "none",
            JitOptLevel::Speed => "speed",
            JitOptLevel::SpeedAndSize => "speed_and_size",
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Backend selection policy
    pub backend: BackendChoice,
    /// Token count above which `Auto` picks the flat interpreter
    pub flat_threshold: usize,
    /// Cranelift optimization level
    pub jit_opt_level: JitOptLevel,
    /// Maximum generated code size in bytes; `None` uses the host page size
    pub jit_code_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendChoice::Auto,
            flat_threshold: DEFAULT_FLAT_THRESHOLD,
            jit_opt_level: JitOptLevel::Speed,
            jit_code_limit: None,
        }
    }
}

impl EngineConfig {
    /// Create a configuration that always uses the flat interpreter
    pub fn interpreter_only() -> Self {
        Self {
            backend: BackendChoice::Interpreter,
            ..Default::default()
        }
    }

    /// Create a configuration that compiles to native code
    pub fn jit() -> Self {
        Self {
            backend: BackendChoice::Jit,
            ..Default::default()
        }
    }

    pub fn with_backend(mut self, backend: BackendChoice) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_flat_threshold(mut self, threshold: usize) -> Self {
        self.flat_threshold = threshold;
        self
    }

    pub fn with_opt_level(mut self, level: JitOptLevel) -> Self {
        self.jit_opt_level = level;
        self
    }

    pub fn with_code_limit(mut self, limit: usize) -> Self {
        self.jit_code_limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.backend, BackendChoice::Auto);
        assert_eq!(config.flat_threshold, 20);
        assert_eq!(config.jit_code_limit, None);
        assert_eq!(config.jit_opt_level.as_str(), "speed");
    }

    #[test]
    fn test_constructors() {
        assert_eq!(EngineConfig::interpreter_only().backend, BackendChoice::Interpreter);
        let config = EngineConfig::jit()
            .with_code_limit(128)
            .with_opt_level(JitOptLevel::None);
        assert_eq!(config.backend, BackendChoice::Jit);
        assert_eq!(config.jit_code_limit, Some(128));
        assert_eq!(config.jit_opt_level.as_str(), "none");
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(BackendChoice::from_name("tree"), Some(BackendChoice::CallTree));
        assert_eq!(BackendChoice::from_name("interpreter"), Some(BackendChoice::Interpreter));
        assert_eq!(BackendChoice::from_name("jit"), Some(BackendChoice::Jit));
        assert_eq!(BackendChoice::from_name("fast"), None);
    }
}
