//! Determinism guarantees: identical inputs and configuration produce
//! byte-identical artifacts, regardless of Stage 1 token order.

mod common;

use common::{doc, page, token};
use pagegroup::artifact::io::to_canonical_json;
use pagegroup::{group_document, run_to_path, GroupingConfig};
use tempfile::tempdir;

fn sample_doc() -> pagegroup::OcrArtifact {
    doc(vec![page(
        1,
        vec![
            token("p001_t000001", 1, "A", (10, 10, 20, 30), Some(0.9)),
            token("p001_t000002", 1, "B", (30, 10, 40, 30), Some(0.9)),
            token("p001_t000003", 1, "C", (10, 50, 20, 70), Some(0.9)),
            token("p001_t000004", 1, "D", (30, 50, 40, 70), Some(0.9)),
            token("p001_t000005", 1, "   ", (1, 1, 2, 2), Some(0.9)),
        ],
    )])
}

#[test]
fn grouping_is_deterministic_and_ids_stable() {
    let ocr = sample_doc();
    let config = GroupingConfig::default();

    let first = group_document(&ocr, &config).unwrap();
    let second = group_document(&ocr, &config).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        to_canonical_json(&first).unwrap(),
        to_canonical_json(&second).unwrap()
    );

    let p = &first.pages[0];
    assert_eq!(p.lines[0].line_id, "p001_l000000");
    assert_eq!(p.lines[1].line_id, "p001_l000001");
    assert_eq!(p.blocks[0].block_id, "p001_b000000");

    // Reading order within each line is x0-ascending.
    assert_eq!(p.lines[0].token_ids, ["p001_t000001", "p001_t000002"]);
    assert_eq!(p.lines[1].token_ids, ["p001_t000003", "p001_t000004"]);

    // The whitespace token appears only in the dropped ledger.
    let used: Vec<&String> = p.lines.iter().flat_map(|l| l.token_ids.iter()).collect();
    assert!(!used.iter().any(|id| *id == "p001_t000005"));
    assert!(first
        .meta
        .dropped_tokens
        .iter()
        .any(|d| d.token_id == "p001_t000005"));
}

#[test]
fn token_order_permutation_does_not_change_output() {
    let config = GroupingConfig::default();
    let forward = group_document(&sample_doc(), &config).unwrap();

    let mut shuffled = sample_doc();
    shuffled.pages[0].tokens.reverse();
    let backward = group_document(&shuffled, &config).unwrap();

    assert_eq!(
        to_canonical_json(&forward).unwrap(),
        to_canonical_json(&backward).unwrap()
    );

    // A different interleaving, same multiset.
    let mut rotated = sample_doc();
    rotated.pages[0].tokens.rotate_left(2);
    let rotated_out = group_document(&rotated, &config).unwrap();
    assert_eq!(forward, rotated_out);
}

#[test]
fn page_order_permutation_does_not_change_output() {
    let config = GroupingConfig::default();
    let make = |swap: bool| {
        let p1 = page(
            1,
            vec![token("p001_t000001", 1, "A", (10, 10, 30, 20), Some(0.9))],
        );
        let p2 = page(
            2,
            vec![token("p002_t000001", 2, "B", (10, 10, 30, 20), Some(0.9))],
        );
        if swap {
            doc(vec![p2, p1])
        } else {
            doc(vec![p1, p2])
        }
    };

    let a = group_document(&make(false), &config).unwrap();
    let b = group_document(&make(true), &config).unwrap();
    assert_eq!(to_canonical_json(&a).unwrap(), to_canonical_json(&b).unwrap());
    assert_eq!(a.pages[0].page_num, 1);
    assert_eq!(a.pages[1].page_num, 2);
}

#[test]
fn end_to_end_runs_write_identical_bytes() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("doc.ocr.json");
    let out_a = dir.path().join("a.group.json");
    let out_b = dir.path().join("b.group.json");

    let payload = serde_json::to_string(&sample_doc()).unwrap();
    std::fs::write(&input, payload).unwrap();

    let config = GroupingConfig::default();
    run_to_path(&input, &out_a, &config).unwrap();
    run_to_path(&input, &out_b, &config).unwrap();

    let bytes_a = std::fs::read(&out_a).unwrap();
    let bytes_b = std::fs::read(&out_b).unwrap();
    assert!(!bytes_a.is_empty());
    assert_eq!(bytes_a, bytes_b);
    assert_eq!(bytes_a.last(), Some(&b'\n'));
}

#[test]
fn failed_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("doc.ocr.json");
    let output = dir.path().join("doc.group.json");

    // Duplicate token_id makes the input malformed.
    let mut ocr = sample_doc();
    let dup = ocr.pages[0].tokens[0].clone();
    ocr.pages[0].tokens.push(dup);
    std::fs::write(&input, serde_json::to_string(&ocr).unwrap()).unwrap();

    let err = run_to_path(&input, &output, &GroupingConfig::default()).unwrap_err();
    assert_eq!(err.kind(), "InputMalformed");
    assert!(!output.exists());
}
