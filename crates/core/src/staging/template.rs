//! Scheduler script templates.
//!
//! The template is parsed into its parts instead of being treated as opaque
//! text, so the job name can be placed in the `#SBATCH` header and the
//! per-ticket commands appended after the body.

const DIRECTIVE_PREFIX: &str = "#SBATCH";
const DEFAULT_SHEBANG: &str = "#!/bin/bash";

/// A parsed scheduler script template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobTemplate {
    /// Interpreter line, including `#!`.
    pub shebang: Option<String>,
    /// Directive options in order, without the `#SBATCH` prefix.
    pub directives: Vec<String>,
    /// Everything after the header, verbatim.
    pub body: Vec<String>,
}

impl JobTemplate {
    /// Parse template text.
    ///
    /// Directives are only recognised in the header (before the first line
    /// that is neither blank nor a comment), as the scheduler does. Later
    /// `#SBATCH` lines stay in the body.
    pub fn parse(text: &str) -> Self {
        let mut template = JobTemplate::default();
        let mut in_header = true;

        for (index, line) in text.lines().enumerate() {
            if index == 0 && line.starts_with("#!") {
                template.shebang = Some(line.trim_end().to_string());
                continue;
            }

            if in_header {
                let trimmed = line.trim();
                if let Some(option) = trimmed.strip_prefix(DIRECTIVE_PREFIX) {
                    template.directives.push(option.trim().to_string());
                    continue;
                }
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    in_header = false;
                }
            }

            template.body.push(line.to_string());
        }

        template
    }

    /// Copy of the template with `token` replaced by `job_name`.
    ///
    /// A `--job-name` directive is appended when no directive carried the
    /// token; the scheduler takes the last one.
    pub fn with_job_name(&self, token: &str, job_name: &str) -> Self {
        let mut directives: Vec<String> = self
            .directives
            .iter()
            .map(|d| d.replace(token, job_name))
            .collect();

        if !self.directives.iter().any(|d| d.contains(token)) {
            directives.push(format!("--job-name={}", job_name));
        }

        Self {
            shebang: self.shebang.clone(),
            directives,
            body: self.body.iter().map(|l| l.replace(token, job_name)).collect(),
        }
    }

    /// Value of the last `--job-name`/`-J` directive, if any.
    pub fn job_name(&self) -> Option<&str> {
        self.directives.iter().rev().find_map(|d| {
            d.strip_prefix("--job-name=")
                .or_else(|| d.strip_prefix("--job-name "))
                .or_else(|| d.strip_prefix("-J "))
                .map(str::trim)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.shebang.is_none() && self.directives.is_empty() && self.body.is_empty()
    }
}

/// A template with the per-ticket commands appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionScript {
    pub template: JobTemplate,
    pub commands: Vec<String>,
}

impl SubmissionScript {
    pub fn new(template: JobTemplate) -> Self {
        Self {
            template,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: impl Into<String>) {
        self.commands.push(command.into());
    }

    /// Script text as written to disk.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(self.template.shebang.as_deref().unwrap_or(DEFAULT_SHEBANG));
        out.push('\n');

        for directive in &self.template.directives {
            out.push_str(DIRECTIVE_PREFIX);
            out.push(' ');
            out.push_str(directive);
            out.push('\n');
        }

        for line in &self.template.body {
            out.push_str(line);
            out.push('\n');
        }

        for command in &self.commands {
            out.push_str(command);
            out.push('\n');
        }

        out
    }
}
