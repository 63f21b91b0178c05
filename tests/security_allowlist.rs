// Checks that the validator and the shared command tables agree

use shelltalk::security::{
    SafetyValidator, ValidationError, DANGEROUS_COMMANDS, SAFE_COMMANDS, SAFE_TEST_FLAGS,
};

#[test]
fn test_allowlist_is_not_empty() {
    assert!(!SAFE_COMMANDS.is_empty());
    assert!(SAFE_COMMANDS.len() >= 200);
}

#[test]
fn test_allowlist_contains_common_commands() {
    let critical_commands = ["ls", "pwd", "cat", "grep", "find", "mkdir", "echo", "git", "test"];

    for cmd in &critical_commands {
        assert!(
            SAFE_COMMANDS.contains(cmd),
            "Allowlist missing common command: {}",
            cmd
        );
    }
}

#[test]
fn test_allowlist_has_no_duplicates() {
    let mut sorted: Vec<&str> = SAFE_COMMANDS.to_vec();
    sorted.sort_unstable();
    let before = sorted.len();
    sorted.dedup();
    assert_eq!(before, sorted.len(), "SAFE_COMMANDS contains duplicates");
}

#[test]
fn test_validator_accepts_every_allowlisted_base() {
    let validator = SafetyValidator::new();

    for command in SAFE_COMMANDS {
        let verdict = validator.check(command);
        if DANGEROUS_COMMANDS.contains(command) {
            assert!(!verdict.permitted, "'{}' is also on the denylist", command);
            continue;
        }
        assert!(
            verdict.permitted,
            "Validator rejected allowlisted command '{}': {}",
            command,
            verdict.reason
        );
    }
}

#[test]
fn test_validator_rejects_every_denylisted_command() {
    let validator = SafetyValidator::new();

    for command in DANGEROUS_COMMANDS {
        assert!(
            matches!(
                validator.validate(command),
                Err(ValidationError::DangerousCommand(_))
            ),
            "Validator did not flag dangerous command '{}'",
            command
        );
    }
}

#[test]
fn test_denylist_is_exact_match() {
    let validator = SafetyValidator::new();

    // Only the exact string is denylisted; other forms fall through to the allowlist
    let verdict = validator.check("rm -rf /tmp/scratch");
    assert_eq!(verdict.permitted, SAFE_COMMANDS.contains(&"rm"));
}

#[test]
fn test_every_test_flag_is_accepted() {
    let validator = SafetyValidator::new();

    for flag in SAFE_TEST_FLAGS {
        let command = format!("test {} notes.txt", flag);
        assert!(
            validator.is_safe(&command),
            "Validator rejected safe test flag '{}'",
            flag
        );
    }
}

#[test]
fn test_unknown_test_flag_is_rejected() {
    let validator = SafetyValidator::new();

    assert!(matches!(
        validator.validate("test --exec-something /bin"),
        Err(ValidationError::UnsafeTestFlag(flag)) if flag == "--exec-something"
    ));
    // Non-flag arguments are not checked
    assert!(validator.is_safe("test notes.txt = notes.txt"));
}

#[test]
fn test_verdicts_are_stable() {
    let validator = SafetyValidator::new();
    let inputs = [
        "ls -la",
        "rm -rf /",
        "",
        "   ",
        "reboot",
        "grep -r 'TODO' .",
        "echo \"unterminated",
        "test -Z x",
    ];

    for input in inputs {
        let first = validator.check(input);
        let second = validator.check(input);
        assert_eq!(first, second, "verdict changed for '{}'", input);
    }
}

#[test]
fn test_rejection_reasons() {
    let validator = SafetyValidator::new();

    assert_eq!(validator.check("").reason, "empty command");
    assert_eq!(
        validator.check("reboot now").reason,
        "command 'reboot' is not in the safe commands list"
    );
    assert!(validator.check("echo \"open").reason.starts_with("malformed command"));
    assert_eq!(validator.check("ls -la").reason, "command is safe");
}
