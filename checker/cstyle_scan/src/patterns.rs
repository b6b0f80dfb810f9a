//! Pattern set for classification.
//!
//! These are deliberately loose, line-oriented patterns: the checker has
//! no grammar. They answer "does this text look like a directive / a
//! function signature / a case label", nothing more.

#![allow(
    clippy::expect_used,
    reason = "pattern literals are fixed at compile time and covered by tests"
)]

use std::sync::LazyLock;

use regex::Regex;

/// Preprocessor directive after optional indentation.
static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *#(define|include|undef|ifdef|ifndef|if|else|elif|endif|error|pragma)")
        .expect("directive pattern compiles")
});

/// Function signature: type, optional pointer stars, name, parameter list.
static FUNC_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *[a-zA-Z_][a-zA-Z0-9_]* *\** *[a-zA-Z_][a-zA-Z0-9_]* *\(.*\)")
        .expect("function signature pattern compiles")
});

/// Bare function declaration: a signature immediately closed by `;`.
static FUNC_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *[a-zA-Z_][a-zA-Z0-9_]* *\** *[a-zA-Z_][a-zA-Z0-9_]* *\(.*\) *; *$")
        .expect("function declaration pattern compiles")
});

/// Switch-case label: `case <value>:` or `default:`.
static CASE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *(case .+ *:|default *:)").expect("case label pattern compiles"));

/// Returns `true` if the line is a preprocessor directive.
pub fn is_directive(text: &str) -> bool {
    DIRECTIVE.is_match(text)
}

/// Returns `true` if the text looks like a function signature.
pub fn is_function_signature(text: &str) -> bool {
    FUNC_SIGNATURE.is_match(text)
}

/// Returns `true` if the text is a bare function declaration (header
/// followed by `;`), which must not classify as a definition.
pub fn is_function_declaration(text: &str) -> bool {
    FUNC_DECLARATION.is_match(text)
}

/// Returns `true` if the line starts with a `case`/`default` label.
pub fn is_case_label(text: &str) -> bool {
    CASE_LABEL.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives() {
        assert!(is_directive("#include <stdio.h>"));
        assert!(is_directive("  #define MAX 8"));
        assert!(is_directive("#ifndef GUARD_H"));
        assert!(!is_directive("x = 1; /* #define */"));
        assert!(!is_directive("int x;"));
    }

    #[test]
    fn function_signatures() {
        assert!(is_function_signature("int main(int argc, char **argv)"));
        assert!(is_function_signature("static char *dup(const char *s)"));
        assert!(is_function_signature("void f()"));
        assert!(!is_function_signature("x = f(1);"));
        assert!(!is_function_signature("return;"));
    }

    #[test]
    fn function_declarations() {
        assert!(is_function_declaration("int f(void);"));
        assert!(is_function_declaration("  char *dup(const char *s); "));
        assert!(!is_function_declaration("int f(void) {"));
        assert!(!is_function_declaration("int f(void)"));
    }

    #[test]
    fn case_labels() {
        assert!(is_case_label("case 1:"));
        assert!(is_case_label("  case FOO :"));
        assert!(is_case_label("default:"));
        assert!(is_case_label("  default :"));
        assert!(!is_case_label("mycase:"));
        assert!(!is_case_label("case:"));
    }
}
