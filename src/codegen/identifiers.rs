//! Identifier sanitization
//!
//! Source names are mapped to shell names on first use and memoized, so every
//! later use of the same source name gets the same shell name. The mapping is
//! one-to-one: no two source names share a shell name.

use std::collections::HashSet;

use indexmap::IndexMap;
use regex_lite::Regex;

lazy_static::lazy_static! {
    static ref SHELL_IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();

    /// Names a generated identifier must never take: reserved words,
    /// builtins, common utilities and variables the shell gives meaning to.
    static ref RESERVED: HashSet<&'static str> = {
        let mut s = HashSet::new();
        // reserved words
        for w in [
            "if", "then", "else", "elif", "fi", "case", "esac", "for", "while", "until", "do",
            "done", "in", "function", "select", "time",
        ] {
            s.insert(w);
        }
        // builtins
        for w in [
            "alias", "bg", "break", "cd", "command", "continue", "declare", "echo", "eval",
            "exec", "exit", "export", "false", "fc", "fg", "getopts", "hash", "jobs", "kill",
            "let", "local", "printf", "pwd", "read", "readonly", "return", "set", "shift",
            "source", "test", "times", "trap", "true", "type", "typeset", "ulimit", "umask",
            "unalias", "unset", "wait",
        ] {
            s.insert(w);
        }
        // utilities raw text may call by name
        for w in [
            "awk", "basename", "cat", "chmod", "chown", "cmp", "cp", "cut", "date", "dd", "df",
            "diff", "dirname", "du", "env", "expr", "file", "find", "grep", "head", "id", "join",
            "ln", "ls", "mkdir", "mkfifo", "mktemp", "mv", "nohup", "od", "paste", "ps", "rm",
            "rmdir", "sed", "sh", "sleep", "sort", "split", "stat", "tail", "tar", "tee",
            "touch", "tr", "tty", "uname", "uniq", "wc", "which", "xargs",
        ] {
            s.insert(w);
        }
        // special and environment variables
        for w in [
            "CDPATH", "ENV", "HOME", "IFS", "LANG", "LINENO", "MAIL", "OLDPWD", "OPTARG",
            "OPTIND", "PATH", "PPID", "PS1", "PS2", "PS4", "PWD", "RANDOM", "SECONDS", "SHELL",
        ] {
            s.insert(w);
        }
        s
    };
}

/// Namespace kept for names the generator introduces itself
const INTERNAL_PREFIX: &str = "__";

/// Prefix applied to source names that cannot be used as they are
const RENAME_PREFIX: &str = "p_";

/// Memoized source-name to shell-name mapping, in first-use order
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: IndexMap<String, String>,
    taken: HashSet<String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shell name for `name`, allocating one on first use.
    pub fn translate(&mut self, name: &str) -> String {
        if let Some(target) = self.names.get(name) {
            return target.clone();
        }

        let target = self.allocate(name);
        self.taken.insert(target.clone());
        self.names.insert(name.to_string(), target.clone());
        target
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Source names whose shell name differs, in first-use order.
    pub fn renamed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names
            .iter()
            .filter(|(source, target)| source != target)
            .map(|(source, target)| (source.as_str(), target.as_str()))
    }

    fn allocate(&self, name: &str) -> String {
        if self.usable(name) {
            return name.to_string();
        }

        let base = format!("{}{}", RENAME_PREFIX, sanitize(name));
        if self.usable(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if self.usable(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn usable(&self, candidate: &str) -> bool {
        is_shell_identifier(candidate)
            && !is_reserved(candidate)
            && !candidate.starts_with(INTERNAL_PREFIX)
            && !self.taken.contains(candidate)
    }
}

pub fn is_shell_identifier(name: &str) -> bool {
    SHELL_IDENTIFIER.is_match(name)
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(name)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_are_kept() {
        let mut table = NameTable::new();
        assert_eq!(table.translate("count"), "count");
        assert_eq!(table.translate("main"), "main");
        assert_eq!(table.renamed().count(), 0);
    }

    #[test]
    fn test_reserved_names_are_prefixed() {
        let mut table = NameTable::new();
        assert_eq!(table.translate("echo"), "p_echo");
        assert_eq!(table.translate("if"), "p_if");
        assert_eq!(table.translate("PATH"), "p_PATH");
    }

    #[test]
    fn test_utility_names_are_prefixed() {
        let mut table = NameTable::new();
        assert_eq!(table.translate("cat"), "p_cat");
        assert_eq!(table.translate("wc"), "p_wc");
        assert_eq!(table.translate("catalog"), "catalog");
    }

    #[test]
    fn test_internal_namespace_is_avoided() {
        let mut table = NameTable::new();
        assert_eq!(table.translate("__ret"), "p___ret");
        assert_eq!(table.translate("__t1"), "p___t1");
    }

    #[test]
    fn test_translation_is_memoized() {
        let mut table = NameTable::new();
        let first = table.translate("test");
        assert_eq!(table.translate("test"), first);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("test"), Some("p_test"));
    }

    #[test]
    fn test_collisions_get_numbered() {
        let mut table = NameTable::new();
        assert_eq!(table.translate("p_read"), "p_read");
        assert_eq!(table.translate("read"), "p_read_2");
        assert_eq!(table.translate("p_read_2"), "p_p_read_2");
    }

    #[test]
    fn test_renamed_in_first_use_order() {
        let mut table = NameTable::new();
        table.translate("set");
        table.translate("x");
        table.translate("exit");
        let renamed: Vec<_> = table.renamed().collect();
        assert_eq!(renamed, vec![("set", "p_set"), ("exit", "p_exit")]);
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_shell_identifier("_a1"));
        assert!(!is_shell_identifier("1a"));
        assert!(!is_shell_identifier("a-b"));
        assert!(is_reserved("while"));
        assert!(!is_reserved("total"));
    }
}
