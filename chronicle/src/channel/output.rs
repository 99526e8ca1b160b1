//! Output sanitizing and failure detection.
//!
//! Devices report command failures as free-form text on the primary stream,
//! so every line after the command's `skip_head` window is checked against an
//! ordered list of error patterns. Informational `%` banners that are not
//! errors are dropped from the result.

use log::debug;
use regex::Regex;

use crate::error::{Error, Result};

/// Patterns every vendor shares. Matched case-insensitively.
const COMMON_ERROR_PATTERNS: &[&str] = &[
    // Severity 3 syslog messages, e.g. %SYS-3-CPUHOG:
    r"^%\w+-3-\w+:",
    r"Invalid input detected",
    r"Incomplete command",
    r"Ambiguous command",
    r"Unrecognized command",
    r"Unknown command",
    r"Command rejected",
    r"^%?Error",
];

/// One command of a script and how to interpret its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Command text, sent followed by a newline.
    pub command: String,

    /// Leading lines to discard before error scanning (command echo, banners).
    pub skip_head: usize,

    /// Trailing lines to discard from the result (usually the prompt).
    pub skip_tail: usize,

    /// Message reported when the command fails.
    pub failure_message: String,
}

impl CommandDescriptor {
    /// Create a new descriptor.
    pub fn new(
        command: impl Into<String>,
        skip_head: usize,
        skip_tail: usize,
        failure_message: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            skip_head,
            skip_tail,
            failure_message: failure_message.into(),
        }
    }
}

/// Ordered, compiled error heuristics.
#[derive(Debug, Clone)]
pub struct ErrorPatterns {
    patterns: Vec<Regex>,
}

impl ErrorPatterns {
    /// The vendor-agnostic heuristics.
    pub fn common() -> Self {
        Self {
            patterns: COMMON_ERROR_PATTERNS
                .iter()
                .map(|p| compile_pattern(p).expect("built-in error pattern must compile"))
                .collect(),
        }
    }

    /// No heuristics at all.
    pub fn empty() -> Self {
        Self { patterns: vec![] }
    }

    /// Append a pattern; matched case-insensitively after the existing ones.
    pub fn with_pattern(mut self, pattern: &str) -> std::result::Result<Self, regex::Error> {
        self.patterns.push(compile_pattern(pattern)?);
        Ok(self)
    }

    /// First pattern matching `line`.
    pub fn find(&self, line: &str) -> Option<&Regex> {
        self.patterns.iter().find(|re| re.is_match(line))
    }

    /// Check if any pattern matches `line`.
    pub fn is_match(&self, line: &str) -> bool {
        self.find(line).is_some()
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if there are no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for ErrorPatterns {
    fn default() -> Self {
        Self::common()
    }
}

fn compile_pattern(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!("(?i){pattern}"))
}

/// An ordered command script with the heuristics that judge its output.
#[derive(Debug, Clone)]
pub struct CommandScript {
    commands: Vec<CommandDescriptor>,
    patterns: ErrorPatterns,
}

impl CommandScript {
    /// Script using the common heuristics.
    pub fn new(commands: Vec<CommandDescriptor>) -> Self {
        Self {
            commands,
            patterns: ErrorPatterns::common(),
        }
    }

    /// Replace the heuristics.
    pub fn with_patterns(mut self, patterns: ErrorPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Append a command.
    pub fn push(
        &mut self,
        command: impl Into<String>,
        skip_head: usize,
        skip_tail: usize,
        failure_message: impl Into<String>,
    ) {
        self.commands
            .push(CommandDescriptor::new(command, skip_head, skip_tail, failure_message));
    }

    /// Commands in execution order.
    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    /// Error heuristics for this script.
    pub fn patterns(&self) -> &ErrorPatterns {
        &self.patterns
    }

    /// Check if the script has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Turns raw captured text into clean lines, or a failure.
#[derive(Debug, Clone, Copy)]
pub struct OutputProcessor<'a> {
    patterns: &'a ErrorPatterns,
}

impl<'a> OutputProcessor<'a> {
    /// Processor using the given heuristics.
    pub fn new(patterns: &'a ErrorPatterns) -> Self {
        Self { patterns }
    }

    /// Process the primary stream output of `descriptor`.
    ///
    /// A `skip_tail` that is not strictly smaller than the number of result
    /// lines leaves the result untouched.
    pub fn process(&self, raw: &str, descriptor: &CommandDescriptor) -> Result<Vec<String>> {
        let mut lines = Vec::new();

        for line in split_lines(raw).skip(descriptor.skip_head) {
            if self.patterns.is_match(line) {
                debug!("error pattern matched for {:?}: {:?}", descriptor.command, line);
                return Err(Error::command(
                    "process_output",
                    format!("{} ({})", descriptor.failure_message, line),
                ));
            }

            if line.starts_with('%') {
                continue;
            }

            lines.push(line.to_string());
        }

        if descriptor.skip_tail > 0 && descriptor.skip_tail < lines.len() {
            lines.truncate(lines.len() - descriptor.skip_tail);
        }

        Ok(lines)
    }
}

/// Split on `\n`, stripping a single trailing `\r` from each line.
pub(crate) fn split_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.split_terminator('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn run(raw: &str, skip_head: usize, skip_tail: usize) -> Result<Vec<String>> {
        let patterns = ErrorPatterns::common();
        let descriptor = CommandDescriptor::new("cmd", skip_head, skip_tail, "Failed");
        OutputProcessor::new(&patterns).process(raw, &descriptor)
    }

    #[test]
    fn test_show_running_scenario() {
        let raw = "show running all\r\nBuilding configuration...\r\n\r\n\
                   Current configuration : 1234 bytes\r\n!\r\ninterface Gi0/1\r\n!\r\nend\r\nhost#";
        let patterns = ErrorPatterns::common();
        let descriptor =
            CommandDescriptor::new("show running all", 4, 1, "Failed to get configuration");

        let lines = OutputProcessor::new(&patterns).process(raw, &descriptor).unwrap();
        assert_eq!(lines, vec!["!", "interface Gi0/1", "!", "end"]);
    }

    #[test]
    fn test_skip_head_lines_not_scanned() {
        let lines = run("% Invalid input detected\nok\nhost#", 1, 0).unwrap();
        assert_eq!(lines, vec!["ok", "host#"]);
    }

    #[test]
    fn test_skip_head_beyond_input() {
        assert!(run("a\nb", 10, 0).unwrap().is_empty());
    }

    #[test]
    fn test_skip_tail_noop_when_not_smaller() {
        assert_eq!(run("a\nb", 0, 2).unwrap(), vec!["a", "b"]);
        assert_eq!(run("a\nb", 0, 5).unwrap(), vec!["a", "b"]);
        assert_eq!(run("a\nb\nc", 0, 2).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_error_line_fails_command() {
        let err = run("show foo\n% Invalid input detected at '^' marker.\nhost#", 1, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandFailed);
        assert_eq!(err.detail(), "Failed (% Invalid input detected at '^' marker.)");
    }

    #[test]
    fn test_first_error_stops_evaluation() {
        let err = run("Unknown command: foo\nError: second", 0, 0).unwrap_err();
        assert!(err.detail().contains("Unknown command: foo"));
        assert!(!err.detail().contains("second"));
    }

    #[test]
    fn test_informational_banner_dropped() {
        let lines = run("%SYS-5-CONFIG_I: Configured from console\nhostname r1", 0, 0).unwrap();
        assert_eq!(lines, vec!["hostname r1"]);
    }

    #[test]
    fn test_severity_tagged_error() {
        assert!(run("%SYS-3-CPUHOG: Task ran for 2000 msec", 0, 0).is_err());
        assert!(run("%LINK-3-UPDOWN: Interface Gi0/1, changed state to down", 0, 0).is_err());
        assert!(run("%LINEPROTO-5-UPDOWN: Line protocol up", 0, 0).is_ok());
    }

    #[test]
    fn test_other_severities_dropped_as_informational() {
        let raw = "%SYS-2-MALLOCFAIL: Memory allocation of 65536 bytes failed
                   %SYS-0-EMERG: x
hostname r1";
        assert_eq!(run(raw, 0, 0).unwrap(), vec!["hostname r1"]);
    }

    #[test]
    fn test_common_patterns_all_compile() {
        assert_eq!(ErrorPatterns::common().len(), COMMON_ERROR_PATTERNS.len());
    }

    #[test]
    fn test_error_prefix_variants() {
        assert!(run("%Error opening tftp://x", 0, 0).is_err());
        assert!(run("error: syntax error, expecting <command>", 0, 0).is_err());
        assert!(run("  description no error here", 0, 0).is_ok());
        assert!(run("Command REJECTED: bad", 0, 0).is_err());
    }

    #[test]
    fn test_split_lines_strips_single_cr() {
        let lines: Vec<_> = split_lines("a\r\nb\r\r\n\nc").collect();
        assert_eq!(lines, vec!["a", "b\r", "", "c"]);
    }

    #[test]
    fn test_custom_patterns() {
        let patterns = ErrorPatterns::empty().with_pattern("command not found").unwrap();
        let descriptor = CommandDescriptor::new("cat x", 0, 0, "Failed");
        let processor = OutputProcessor::new(&patterns);

        assert!(processor.process("bash: foo: Command not found", &descriptor).is_err());
        assert!(processor.process("% Invalid input detected", &descriptor).unwrap().is_empty());
    }

    #[test]
    fn test_script_push_keeps_order() {
        let mut script = CommandScript::new(vec![]);
        script.push("terminal length 0", 1, 1, "a");
        script.push("show running all", 4, 1, "b");
        assert_eq!(script.commands()[0].command, "terminal length 0");
        assert_eq!(script.commands()[1].skip_head, 4);
        assert_eq!(script.patterns().len(), 8);
    }
}
