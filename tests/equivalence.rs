//! Strategy equivalence and worker-count invariance.
//!
//! Both strategies must emit identical ordered finding sequences for any
//! (input, pattern, worker count), and the result must not depend on the
//! worker count at all.

use std::io::BufReader;

use mtfind::{
    divide_and_conquer, round_robin, Finding, MemmemSearcher, Pattern, RegionSplitter,
    StreamSplitter, Tokenizer,
};

type Collected = (u64, Vec<(u64, u64, Vec<u8>)>);

fn dnc(input: &[u8], pattern: &Pattern, workers: usize) -> Collected {
    let tokenizer = Tokenizer::new(MemmemSearcher::new(pattern));
    let mut total = None;
    let mut items = Vec::new();
    divide_and_conquer(input, &tokenizer, b'\n', workers, |n| total = Some(n), |f| {
        items.push((f.line, f.column, f.text.to_vec()))
    })
    .unwrap();
    (total.unwrap(), items)
}

fn rr_region(input: &[u8], pattern: &Pattern, workers: usize) -> Collected {
    let tokenizer = Tokenizer::new(MemmemSearcher::new(pattern));
    let mut total = None;
    let mut items = Vec::new();
    round_robin(
        RegionSplitter::new(input, b'\n'),
        &tokenizer,
        workers,
        |n| total = Some(n),
        |f: Finding<&[u8]>| items.push((f.line, f.column, f.text.to_vec())),
    )
    .unwrap();
    (total.unwrap(), items)
}

fn rr_stream(input: &[u8], pattern: &Pattern, workers: usize) -> Collected {
    let tokenizer = Tokenizer::new(MemmemSearcher::new(pattern));
    let mut total = None;
    let mut items = Vec::new();
    round_robin(
        StreamSplitter::new(BufReader::new(input), b'\n'),
        &tokenizer,
        workers,
        |n| total = Some(n),
        |f: Finding<Vec<u8>>| items.push((f.line, f.column, f.text)),
    )
    .unwrap();
    (total.unwrap(), items)
}

/// 40 lorem-ipsum-flavored lines, 30 of which contain "vitae" once, at a
/// column that varies from line to line.
fn vitae_corpus() -> Vec<u8> {
    let fillers: [&str; 4] = [
        "lorem ipsum dolor sit amet consectetur adipiscing elit",
        "sed do eiusmod tempor incididunt ut labore et dolore",
        "duis aute irure dolor in reprehenderit in voluptate",
        "excepteur sint occaecat cupidatat non proident sunt",
    ];
    let mut corpus = Vec::new();
    let mut with_vitae = 0;
    for i in 0..40 {
        let filler = fillers[i % 4];
        if with_vitae < 30 && i % 4 != 3 {
            // Splice "vitae" at a drifting offset inside the filler.
            let at = (i * 3) % 40;
            corpus.extend_from_slice(filler[..at].as_bytes());
            corpus.extend_from_slice(b"vitae");
            corpus.extend_from_slice(filler[at..].as_bytes());
            with_vitae += 1;
        } else {
            corpus.extend_from_slice(filler.as_bytes());
        }
        corpus.push(b'\n');
    }
    assert_eq!(with_vitae, 30);
    corpus
}

#[test]
fn vitae_corpus_is_strategy_and_worker_invariant() {
    let corpus = vitae_corpus();
    let pattern = Pattern::parse(b"vitae").unwrap();

    let reference = dnc(&corpus, &pattern, 1);
    assert_eq!(reference.0, 30);
    assert_eq!(reference.1.len(), 30);

    // Ordering law: strictly ascending (line, column).
    for pair in reference.1.windows(2) {
        assert!(
            (pair[0].0, pair[0].1) < (pair[1].0, pair[1].1),
            "ordering violated: {pair:?}"
        );
    }

    for workers in [1, 4, 16] {
        assert_eq!(dnc(&corpus, &pattern, workers), reference, "dnc w={workers}");
        assert_eq!(
            rr_region(&corpus, &pattern, workers),
            reference,
            "rr/region w={workers}"
        );
        assert_eq!(
            rr_stream(&corpus, &pattern, workers),
            reference,
            "rr/stream w={workers}"
        );
    }
}

#[test]
fn uneven_partitions_do_not_shift_line_numbers() {
    // Worker counts far above the line count force empty and tiny
    // subregions; line numbers must still come out exact.
    let input = b"x\n\nx\n\n\nx\n";
    let pattern = Pattern::parse(b"x").unwrap();
    let reference = dnc(input, &pattern, 1);
    assert_eq!(
        reference.1.iter().map(|f| f.0).collect::<Vec<_>>(),
        vec![1, 3, 6]
    );
    for workers in 2..=12 {
        assert_eq!(dnc(input, &pattern, workers), reference, "w={workers}");
        assert_eq!(rr_region(input, &pattern, workers), reference, "w={workers}");
    }
}

#[test]
fn delimiter_heavy_input_is_invariant() {
    // Long runs of delimiters at partition boundaries exercise the greedy
    // delimiter-consumption rule.
    let mut input = Vec::new();
    for i in 0..50 {
        for _ in 0..(i % 5) {
            input.push(b'\n');
        }
        input.extend_from_slice(b"needle\n");
    }
    let pattern = Pattern::parse(b"needle").unwrap();
    let reference = dnc(&input, &pattern, 1);
    assert_eq!(reference.0, 50);
    for workers in [2, 3, 5, 8, 13, 32] {
        assert_eq!(dnc(&input, &pattern, workers), reference, "dnc w={workers}");
        assert_eq!(
            rr_region(&input, &pattern, workers),
            reference,
            "rr w={workers}"
        );
    }
}
