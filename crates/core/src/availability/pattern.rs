//! Shell-style file name patterns.

use regex_lite::Regex;

/// A file name pattern made of a literal prefix and a glob suffix.
///
/// Only `*` is special in the suffix; it matches any run of characters.
/// The prefix is matched literally, so identifiers containing glob or
/// regex metacharacters are safe.
#[derive(Debug, Clone)]
pub struct FilePattern {
    display: String,
    regex: Regex,
}

impl FilePattern {
    /// Build a pattern matching names that start with `prefix` and then
    /// match `glob`.
    pub fn new(prefix: &str, glob: &str) -> Result<Self, regex_lite::Error> {
        let mut source = String::from("^");
        source.push_str(&regex_lite::escape(prefix));
        for (i, part) in glob.split('*').enumerate() {
            if i > 0 {
                source.push_str(".*");
            }
            source.push_str(&regex_lite::escape(part));
        }
        source.push('$');

        Ok(Self {
            display: format!("{}{}", prefix, glob),
            regex: Regex::new(&source)?,
        })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    /// Whether any of the names match.
    pub fn matches_any<'a>(&self, mut names: impl Iterator<Item = &'a str>) -> bool {
        names.any(|name| self.matches(name))
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_read_pattern() {
        let pattern = FilePattern::new("SEQ001", "*R1*fastq*").unwrap();
        assert!(pattern.matches("SEQ001_S1_L001_R1_001.fastq.gz"));
        assert!(pattern.matches("SEQ001R1fastq"));
        assert!(!pattern.matches("SEQ001_S1_L001_R2_001.fastq.gz"));
        assert!(!pattern.matches("XSEQ001_R1.fastq"));
        assert_eq!(pattern.as_str(), "SEQ001*R1*fastq*");
    }

    #[test]
    fn test_fasta_pattern_is_anchored() {
        let pattern = FilePattern::new("SEQ001", "*.fasta").unwrap();
        assert!(pattern.matches("SEQ001.fasta"));
        assert!(pattern.matches("SEQ001_contigs.fasta"));
        assert!(!pattern.matches("SEQ001.fasta.gz"));
        assert!(!pattern.matches("SEQ001xfasta"));
    }

    #[test]
    fn test_prefix_is_literal() {
        let pattern = FilePattern::new("SEQ.1+", "*.fasta").unwrap();
        assert!(pattern.matches("SEQ.1+.fasta"));
        assert!(!pattern.matches("SEQX1.fasta"));
        assert!(!pattern.matches("SEQ.11.fasta"));
    }

    #[test]
    fn test_matches_any() {
        let pattern = FilePattern::new("A", "*R2*fastq*").unwrap();
        let names = ["A_R1.fastq", "B_R2.fastq", "A_R2.fastq.gz"];
        assert!(pattern.matches_any(names.iter().copied()));
        assert!(!pattern.matches_any(names[..2].iter().copied()));
    }
}
