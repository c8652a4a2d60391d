use crate::security::SecurityPolicy;

/// Validates and sanitizes raw command strings before anything touches the
/// filesystem or a subprocess.
///
/// The checks here are textual: tokens are compared against a deny-list and
/// an allow-list, and sanitization strips shell metacharacters. This is a
/// policy filter, not a parser — it does not understand argument positions,
/// and `sanitize_path` does not canonicalize or confine paths (see module
/// docs for the known limitations).
#[derive(Debug, Clone)]
pub struct CommandValidator {
    policy: SecurityPolicy,
}

impl CommandValidator {
    pub fn new() -> Self {
        Self::with_policy(SecurityPolicy::default())
    }

    pub fn with_policy(policy: SecurityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SecurityPolicy {
        &self.policy
    }

    /// Strip shell metacharacters (`;`, `&`, `|`), one layer of surrounding
    /// quotes, and control characters from a string. Total: never fails.
    pub fn sanitize(&self, text: &str) -> String {
        let stripped: String = text
            .chars()
            .filter(|c| *c != ';' && *c != '&' && *c != '|')
            .collect();

        trim_surrounding_quotes(&stripped)
            .chars()
            .filter(|c| *c as u32 >= 32)
            .collect()
    }

    /// Strip shell metacharacters and every `../` sequence from a path.
    ///
    /// Textual filter only: the result is not guaranteed to stay under any
    /// root (absolute paths and symlinks pass through untouched).
    pub fn sanitize_path(&self, path: &str) -> String {
        let mut sanitized: String = path
            .chars()
            .filter(|c| *c != ';' && *c != '&' && *c != '|')
            .collect();

        while sanitized.contains("../") {
            sanitized = sanitized.replace("../", "");
        }

        sanitized.trim().to_string()
    }

    /// Classify a command as allowed or blocked.
    ///
    /// Default-deny: a command passes only if its first token is on the
    /// allow-list (with an extension check for `touch`) or it is an `echo`
    /// redirection targeting an allowed suffix. The deny-list is checked
    /// first across all tokens, so a blocked word anywhere rejects the
    /// command even when the base command would be allowed.
    pub fn is_safe(&self, command: &str) -> bool {
        let lowered = command.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();
        let base = tokens.first().copied().unwrap_or("");

        if tokens
            .iter()
            .any(|t| self.policy.blocked_tokens.contains(*t))
        {
            return false;
        }

        if self.policy.allowed_base_commands.contains(base) {
            if base == "touch" {
                let target = if tokens.len() > 1 {
                    tokens[tokens.len() - 1]
                } else {
                    ""
                };
                return self.is_allowed_extension(target);
            }
            return true;
        }

        // echo with redirection: the target after the last '>' must carry
        // an allowed suffix. Only reachable when `echo` itself is not on
        // the allow-list; with the default policy the branch above already
        // accepted the command.
        if command.starts_with("echo") && command.contains('>') {
            let target = command.rsplit('>').next().unwrap_or("").trim();
            return self.is_allowed_extension(target);
        }

        false
    }

    /// Check whether a path's suffix is on the extension allow-list.
    pub fn is_allowed_extension(&self, path: &str) -> bool {
        self.policy.allowed_extensions.contains(file_suffix(path))
    }
}

impl Default for CommandValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_surrounding_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}

/// Suffix of the final path component, dot included (`"a/b.txt"` → `".txt"`).
/// Dotfiles have no suffix: `".txt"` as a bare name yields `""`.
fn file_suffix(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(i) if i > 0 => &name[i..],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_metacharacters() {
        let validator = CommandValidator::new();
        assert_eq!(validator.sanitize("echo hi; rm -rf /"), "echo hi rm -rf /");
        assert_eq!(validator.sanitize("a & b | c"), "a  b  c");
    }

    #[test]
    fn test_sanitize_trims_one_quote_layer() {
        let validator = CommandValidator::new();
        assert_eq!(validator.sanitize("\"hello\""), "hello");
        assert_eq!(validator.sanitize("'hello'"), "hello");
        assert_eq!(validator.sanitize("''hello''"), "'hello'");
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        let validator = CommandValidator::new();
        assert_eq!(validator.sanitize("a\x07b\x1bc"), "abc");
        assert_eq!(validator.sanitize("line1\nline2"), "line1line2");
    }

    #[test]
    fn test_sanitize_is_total() {
        let validator = CommandValidator::new();
        assert_eq!(validator.sanitize(""), "");
    }

    #[test]
    fn test_sanitize_path_removes_traversal() {
        let validator = CommandValidator::new();
        assert_eq!(validator.sanitize_path("../../etc/passwd"), "etc/passwd");
        assert_eq!(validator.sanitize_path("a/../../b"), "a/b");
    }

    #[test]
    fn test_sanitize_path_handles_nested_traversal() {
        let validator = CommandValidator::new();
        // "..././" collapses to nothing only after repeated passes
        assert_eq!(validator.sanitize_path("....//etc"), "etc");
    }

    #[test]
    fn test_sanitize_path_idempotent() {
        let validator = CommandValidator::new();
        let inputs = ["../../etc/passwd", "/tmp/file.txt", "  spaced  ", "a;b&c|d"];
        for input in inputs {
            let once = validator.sanitize_path(input);
            let twice = validator.sanitize_path(&once);
            assert_eq!(once, twice, "sanitize_path not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_is_safe_blocks_deny_list_base() {
        let validator = CommandValidator::new();
        assert!(!validator.is_safe("rm -rf /"));
        assert!(!validator.is_safe("dd if=/dev/zero of=/dev/sda"));
        assert!(!validator.is_safe("mkfs /dev/sda1"));
        assert!(!validator.is_safe("mv a b"));
        assert!(!validator.is_safe("chmod 777 /"));
    }

    #[test]
    fn test_is_safe_blocks_deny_list_in_arguments() {
        let validator = CommandValidator::new();
        // blocked token in a non-command position still rejects
        assert!(!validator.is_safe("echo rm"));
        assert!(!validator.is_safe("touch rm"));
    }

    #[test]
    fn test_is_safe_case_insensitive() {
        let validator = CommandValidator::new();
        assert!(!validator.is_safe("RM -rf /"));
        assert!(validator.is_safe("MKDIR /tmp/dir"));
    }

    #[test]
    fn test_is_safe_allows_base_commands() {
        let validator = CommandValidator::new();
        assert!(validator.is_safe("mkdir /tmp/newdir"));
        assert!(validator.is_safe("echo hello"));
    }

    #[test]
    fn test_is_safe_touch_requires_allowed_extension() {
        let validator = CommandValidator::new();
        assert!(validator.is_safe("touch /tmp/notes.txt"));
        assert!(validator.is_safe("touch /tmp/notes.md"));
        assert!(validator.is_safe("touch /tmp/data.csv"));
        assert!(!validator.is_safe("touch /tmp/script.sh"));
        assert!(!validator.is_safe("touch /tmp/noext"));
        assert!(!validator.is_safe("touch"));
    }

    #[test]
    fn test_is_safe_echo_redirect_with_allowed_base() {
        let validator = CommandValidator::new();
        // echo is on the default allow-list, so redirections pass on the
        // base-command check alone, whatever the target suffix
        assert!(validator.is_safe("echo hi > /tmp/out.txt"));
        assert!(validator.is_safe("echo hi > /tmp/out.sh"));
    }

    #[test]
    fn test_is_safe_echo_redirect_extension_gate_without_base_allowance() {
        // the redirect branch only gates policies that drop echo from the
        // allow-list
        let mut policy = SecurityPolicy::default();
        policy.allowed_base_commands.remove("echo");
        let validator = CommandValidator::with_policy(policy);

        assert!(validator.is_safe("echo hi > /tmp/out.txt"));
        assert!(!validator.is_safe("echo hi > /tmp/out.sh"));
        // without redirection there is nothing left to allow it
        assert!(!validator.is_safe("echo hi"));
    }

    #[test]
    fn test_is_safe_default_deny() {
        let validator = CommandValidator::new();
        assert!(!validator.is_safe("ls -la"));
        assert!(!validator.is_safe("cat /etc/passwd"));
        assert!(!validator.is_safe(""));
    }

    #[test]
    fn test_custom_policy() {
        let mut policy = SecurityPolicy::default();
        policy.allowed_base_commands.insert("sleep".to_string());
        let validator = CommandValidator::with_policy(policy);
        assert!(validator.is_safe("sleep 5"));
        // deny-list still applies
        assert!(!validator.is_safe("sleep 5 rm"));
    }

    #[test]
    fn test_file_suffix() {
        assert_eq!(file_suffix("notes.txt"), ".txt");
        assert_eq!(file_suffix("/tmp/a.b.csv"), ".csv");
        assert_eq!(file_suffix("noext"), "");
        assert_eq!(file_suffix(".txt"), "");
        assert_eq!(file_suffix("/tmp/.hidden"), "");
    }
}
