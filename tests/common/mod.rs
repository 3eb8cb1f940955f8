#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use fstregions::Window;

const UPDATE_ENV: &str = "FSTREGIONS_UPDATE_SNAPSHOTS";

fn snapshot_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/snapshots")
        .join(name)
}

/// Compare a rendered report with `tests/snapshots/<name>`, or rewrite the
/// golden file when `FSTREGIONS_UPDATE_SNAPSHOTS` is set.
pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_path(name);
    if std::env::var_os(UPDATE_ENV).is_some() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected = fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("missing golden {}; run with {UPDATE_ENV}=1", path.display()));
    let expected = expected.replace("\r\n", "\n");
    let actual = actual.replace("\r\n", "\n");
    if expected == actual {
        return;
    }

    // report the first diverging line; reports are line oriented
    let mut expected_lines = expected.split('\n');
    let mut actual_lines = actual.split('\n');
    let mut line = 1;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (Some(want), Some(got)) if want == got => line += 1,
            (want, got) => panic!(
                "{} differs at line {line}\n  expected: {:?}\n  actual:   {:?}\nSet {UPDATE_ENV}=1 to regenerate.",
                path.display(),
                want.unwrap_or("<end of file>"),
                got.unwrap_or("<end of file>"),
            ),
        }
    }
}

pub fn window(chrom: &str, start: u64, end: u64, fst: f64) -> Window {
    Window::new(chrom, start, end, fst)
}

pub fn gene_line(chrom: &str, start: u64, end: u64, id: &str) -> String {
    format!("{chrom}\tGnomon\tgene\t{start}\t{end}\t.\t+\t.\tID={id}\n")
}

/// Small VCFtools-style table used by the file-based tests.
pub const FST_TABLE: &str = "\
CHROM\tBIN_START\tBIN_END\tN_VARIANTS\tWEIGHTED_FST\tMEAN_FST
1\t1\t10000\t12\t0.125\t0.0625
1\t10001\t20000\t8\t0.25\t0.125
1\t20001\t30000\t5\t0.375\t0.25
1\t500001\t510000\t3\t0.5\t0.25
2\t1\t10000\t9\t0.03125\t0.015625
2\t40001\t50000\t4\t0.0625\t0.03125
3\t1\t10000\t7\t0.25\t0.125
3\t80001\t90000\t2\t0.125\t0.0625
";

/// Annotation matching [`FST_TABLE`] under the `chr_` convention.
pub const ANNOTATION: &str = "\
##gff-version 3
#!processed by hand
chr_1\tGnomon\tgene\t500\t1500\t.\t+\t.\tID=gene-alpha
chr_1\tGnomon\tmRNA\t500\t1500\t.\t+\t.\tID=rna-alpha
chr_1\tGnomon\tgene\t15000\t25000\t.\t-\t.\tID=gene-beta
chr_1\tGnomon\tgene\t505000\t506000\t.\t+\t.\tID=gene-gamma
chr_1\tGnomon\tgene\t900000\t901000\t.\t+\t.\tID=gene-far
chr_2\tGnomon\tgene\t45000\t46000\t.\t+\t.\tID=gene-delta
chr_3\tGnomon\tgene\t5000\t6000\t.\t+\t.\tID=gene-epsilon
chr_3\tGnomon\tgene\t85000\t86000\t.\t+\t.\tID=gene-zeta
";
