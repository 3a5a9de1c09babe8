//! Generator configuration

/// Options for a code generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// First line of the generated script
    pub shebang: String,
    /// One level of indentation
    pub indent: String,
    /// Source name of the function invoked at the end of the script
    pub entry_point: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            shebang: "#!/bin/sh".to_string(),
            indent: "    ".to_string(),
            entry_point: "main".to_string(),
        }
    }
}

impl GeneratorOptions {
    /// Indent by `width` spaces instead of the default four.
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent = " ".repeat(width);
        self
    }
}

/// Variable through which every function hands back its value
pub const RESULT_VAR: &str = "__ret";

/// Prefix of the temporaries that hold hoisted call results
pub const TEMP_PREFIX: &str = "__t";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = GeneratorOptions::default();
        assert_eq!(options.shebang, "#!/bin/sh");
        assert_eq!(options.indent, "    ");
        assert_eq!(options.entry_point, "main");
    }

    #[test]
    fn test_indent_width() {
        assert_eq!(GeneratorOptions::default().with_indent_width(2).indent, "  ");
    }
}
