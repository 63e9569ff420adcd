//! End-to-end scenarios pinned to exact output bytes.
//!
//! Each case feeds an input through both strategies (and, for round-robin,
//! both splitter flavors) and the output writer, then compares against the
//! full expected byte stream: the count line first, then one
//! `line column match` record per finding.

use std::cell::RefCell;
use std::io::BufReader;

use mtfind::sink::FindingWriter;
use mtfind::{
    divide_and_conquer, round_robin, BoyerMooreSearcher, MaskedBoyerMooreSearcher, Pattern,
    RegionSplitter, StreamSplitter, Tokenizer,
};

fn outputs(input: &[u8], pattern: &[u8], workers: usize) -> Vec<Vec<u8>> {
    let pattern = Pattern::parse(pattern).unwrap();
    let mut results = Vec::new();

    macro_rules! with_searcher {
        ($searcher:expr) => {{
            let tokenizer = Tokenizer::new($searcher);

            // Divide-and-conquer over the input as a region.
            results.push({
                let mut buf = Vec::new();
                let writer = RefCell::new(FindingWriter::new(&mut buf));
                divide_and_conquer(
                    input,
                    &tokenizer,
                    b'\n',
                    workers,
                    |total| writer.borrow_mut().write_total(total),
                    |f| writer.borrow_mut().write_finding(f.line, f.column, f.text),
                )
                .unwrap();
                writer.into_inner().finish().unwrap();
                buf
            });

            // Round-robin over the zero-copy region splitter.
            results.push({
                let mut buf = Vec::new();
                let writer = RefCell::new(FindingWriter::new(&mut buf));
                round_robin(
                    RegionSplitter::new(input, b'\n'),
                    &tokenizer,
                    workers,
                    |total| writer.borrow_mut().write_total(total),
                    |f| writer.borrow_mut().write_finding(f.line, f.column, f.text),
                )
                .unwrap();
                writer.into_inner().finish().unwrap();
                buf
            });

            // Round-robin over an owning stream splitter.
            results.push({
                let mut buf = Vec::new();
                let writer = RefCell::new(FindingWriter::new(&mut buf));
                round_robin(
                    StreamSplitter::new(BufReader::new(input), b'\n'),
                    &tokenizer,
                    workers,
                    |total| writer.borrow_mut().write_total(total),
                    |f| writer.borrow_mut().write_finding(f.line, f.column, &f.text),
                )
                .unwrap();
                writer.into_inner().finish().unwrap();
                buf
            });
        }};
    }

    if pattern.is_masked() {
        with_searcher!(MaskedBoyerMooreSearcher::new(&pattern));
    } else {
        with_searcher!(BoyerMooreSearcher::new(&pattern));
    }
    results
}

fn assert_all_paths(input: &[u8], pattern: &[u8], expected: &[u8]) {
    for workers in [1, 2, 4] {
        for (i, out) in outputs(input, pattern, workers).into_iter().enumerate() {
            assert_eq!(
                out,
                expected,
                "path #{i} w={workers} diverged for pattern {:?}\n got: {:?}\nwant: {:?}",
                String::from_utf8_lossy(pattern),
                String::from_utf8_lossy(&out),
                String::from_utf8_lossy(expected),
            );
        }
    }
}

#[test]
fn single_match_mid_line() {
    assert_all_paths(
        b"Look up a pattern in this text\n",
        b"pattern",
        b"1\n1 11 pattern\n",
    );
}

#[test]
fn wildcard_prefix_across_lines() {
    assert_all_paths(b"bad\nmad\nsad\n", b"?ad", b"3\n1 1 bad\n2 1 mad\n3 1 sad\n");
}

#[test]
fn contiguous_matches_in_one_line() {
    assert_all_paths(b"abcabcabc\n", b"abc", b"3\n1 1 abc\n1 4 abc\n1 7 abc\n");
}

#[test]
fn non_overlapping_skip_by_length() {
    assert_all_paths(b"aaaaa\n", b"aa", b"2\n1 1 aa\n1 3 aa\n");
}

#[test]
fn wildcard_matches_after_non_ascii_bytes() {
    assert_all_paths(b"\xFF\xFE\x80\x81good\n", b"?ood", b"1\n1 5 good\n");
}

#[test]
fn no_matches_prints_zero() {
    assert_all_paths(b"nothing to see\nhere\n", b"zzz", b"0\n");
}

#[test]
fn empty_lines_shift_line_numbers() {
    assert_all_paths(b"\nhit\n\nhit\n", b"hit", b"2\n2 1 hit\n4 1 hit\n");
}

#[test]
fn unterminated_last_line_is_searched() {
    assert_all_paths(b"miss\nhit", b"hit", b"1\n2 1 hit\n");
}
