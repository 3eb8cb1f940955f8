#[path = "common/mod.rs"]
mod common;

use std::collections::HashSet;
use std::fs;

use blake3::hash;
use common::{ANNOTATION, FST_TABLE};
use fstregions::{OutputFiles, Pipeline, PipelineConfig};

#[test]
fn repeated_runs_write_identical_reports() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let fst = dir.path().join("windows.fst");
    let gff = dir.path().join("annotation.gff");
    fs::write(&fst, FST_TABLE).expect("write fst table");
    fs::write(&gff, ANNOTATION).expect("write annotation");

    let pipeline = Pipeline::new(PipelineConfig::default()).expect("default config is valid");
    let mut fingerprints = HashSet::new();
    for _ in 0..5 {
        let outdir = dir.path().join("out");
        let files = pipeline
            .run(&fst, &gff)
            .expect("pipeline succeeds")
            .write(&outdir)
            .expect("reports written");
        assert_eq!(files, OutputFiles::in_dir(&outdir));

        let mut hasher = blake3::Hasher::new();
        for path in [
            &files.high_fst_regions,
            &files.multi_locus_clusters,
            &files.cooccurring_genes,
            &files.gene_groups,
        ] {
            hasher.update(&fs::read(path).expect("read report"));
        }
        fingerprints.insert(hasher.finalize());
    }

    assert_eq!(fingerprints.len(), 1, "outputs diverged across runs");
}

#[test]
fn comma_and_tab_tables_give_the_same_clusters() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let tsv = dir.path().join("windows.tsv");
    let csv = dir.path().join("windows.csv");
    let gff = dir.path().join("annotation.gff");
    fs::write(&tsv, FST_TABLE).expect("write tsv");
    fs::write(&csv, FST_TABLE.replace('\t', ",")).expect("write csv");
    fs::write(&gff, ANNOTATION).expect("write annotation");

    let pipeline = Pipeline::new(PipelineConfig::default()).expect("default config is valid");
    let from_tsv = pipeline.run(&tsv, &gff).expect("tsv run");
    let from_csv = pipeline.run(&csv, &gff).expect("csv run");

    assert_eq!(from_tsv.cluster_records, from_csv.cluster_records);
    let gff_hash = |output: &fstregions::PipelineOutput| {
        hash(
            fstregions::report::render_cooccurring_genes(&output.cooccurrence)
                .expect("render")
                .as_bytes(),
        )
    };
    assert_eq!(gff_hash(&from_tsv), gff_hash(&from_csv));
}
