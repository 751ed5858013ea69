//! Ticket description parser.

use super::types::{RequestKind, WorkRequest};

/// Parse a ticket description into a work request.
///
/// Every line is trimmed and uppercased. A line equal to the sentinel
/// (compared case-insensitively) marks the request as assembled sequences
/// and is not an identifier. Blank lines are skipped; duplicates are kept.
pub fn parse_request(description: &str, sentinel: &str) -> WorkRequest {
    let sentinel = sentinel.trim().to_uppercase();
    let mut request = WorkRequest::default();

    for line in description.lines() {
        let item = line.trim().to_uppercase();
        if item.is_empty() {
            continue;
        }
        if item == sentinel {
            request.kind = RequestKind::AssembledSequences;
            continue;
        }
        request.identifiers.push(item);
    }

    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_reads_by_default() {
        let request = parse_request("SEQID001\nSEQID002", "FASTA");
        assert_eq!(request.kind, RequestKind::RawReads);
        assert_eq!(request.identifiers, vec!["SEQID001", "SEQID002"]);
    }

    #[test]
    fn test_sentinel_switches_kind_and_is_dropped() {
        let request = parse_request("seqid007\nFASTA", "FASTA");
        assert_eq!(request.kind, RequestKind::AssembledSequences);
        assert_eq!(request.identifiers, vec!["SEQID007"]);
    }

    #[test]
    fn test_sentinel_is_case_insensitive() {
        let request = parse_request("fasta\n2017-SEQ-0001", "FASTA");
        assert_eq!(request.kind, RequestKind::AssembledSequences);
        assert_eq!(request.identifiers, vec!["2017-SEQ-0001"]);

        let request = parse_request("  Fasta  \n2017-SEQ-0001", "fasta");
        assert_eq!(request.kind, RequestKind::AssembledSequences);
    }

    #[test]
    fn test_sentinel_must_be_whole_line() {
        let request = parse_request("FASTA please\nSEQ1", "FASTA");
        assert_eq!(request.kind, RequestKind::RawReads);
        assert_eq!(request.identifiers, vec!["FASTA PLEASE", "SEQ1"]);
    }

    #[test]
    fn test_trims_and_uppercases() {
        let request = parse_request("  seqid001 \r\n\tseqid002\t", "FASTA");
        assert_eq!(request.identifiers, vec!["SEQID001", "SEQID002"]);
    }

    #[test]
    fn test_keeps_duplicates_and_order() {
        let request = parse_request("b\na\nb", "FASTA");
        assert_eq!(request.identifiers, vec!["B", "A", "B"]);
    }

    #[test]
    fn test_skips_blank_lines() {
        let request = parse_request("\n\nSEQ1\n   \n\nSEQ2\n", "FASTA");
        assert_eq!(request.identifiers, vec!["SEQ1", "SEQ2"]);
    }

    #[test]
    fn test_empty_description() {
        let request = parse_request("", "FASTA");
        assert!(request.is_empty());
        assert_eq!(request.kind, RequestKind::RawReads);

        let request = parse_request("FASTA", "FASTA");
        assert!(request.is_empty());
        assert_eq!(request.kind, RequestKind::AssembledSequences);
    }

    #[test]
    fn test_every_non_sentinel_line_is_an_identifier() {
        let description = "one\ntwo\n\nthree\nfour";
        let request = parse_request(description, "FASTA");
        let expected: Vec<String> = description
            .lines()
            .map(|l| l.trim().to_uppercase())
            .filter(|l| !l.is_empty())
            .collect();
        assert_eq!(request.identifiers, expected);
        assert_eq!(request.kind, RequestKind::RawReads);
    }
}
