//! End-to-end mining runs over QASM corpora written to temporary directories.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use qmotif_graph::{CircuitGraph, EdgeRole, GraphMode};
use qmotif_mine::{
    CanonicalHash, DotRenderer, MineError, MinerConfig, Miner, MiningObserver, MiningReport,
    MiningStage, RunPhase,
};
use qmotif_qasm::QasmSource;
use tempfile::TempDir;

const HH: &str = "OPENQASM 2.0;\nqreg q[1];\nh q[0];\nh q[0];\n";

const TELEPORT: &str = r#"
OPENQASM 2.0;
include "qelib1.inc";
qreg q[3];
creg c[3];
h q[1];
cx q[1],q[2];
cx q[0],q[1];
h q[0];
measure q[0] -> c[0];
measure q[1] -> c[1];
if (c==1) z q[2];
if (c==2) x q[2];
"#;

const GROVER2: &str = r#"
OPENQASM 2.0;
qreg q[3];
h q;
x q[2];
ccx q[0],q[1],q[2];
swap q[0],q[1];
cz q[1],q[2];
h q;
"#;

fn corpus(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, text) in files {
        std::fs::write(dir.path().join(name), text).unwrap();
    }
    dir
}

fn run(config: MinerConfig, inputs: &[PathBuf]) -> MiningReport {
    Miner::new(config, Arc::new(QasmSource::new()))
        .unwrap()
        .run(inputs)
        .unwrap()
}

fn exact(k: usize) -> MinerConfig {
    MinerConfig {
        k_min: k,
        k_max: k,
        exact: true,
        workers: Some(2),
        ..MinerConfig::default()
    }
}

fn counts(report: &MiningReport) -> Vec<BTreeMap<(CanonicalHash, usize), u64>> {
    report
        .levels
        .iter()
        .map(|level| {
            level
                .top
                .iter()
                .map(|p| ((p.hash, p.variant), p.count))
                .collect()
        })
        .collect()
}

#[test]
fn identical_corpus_gives_one_pattern() {
    let dir = corpus(&[("a.qasm", HH), ("b.qasm", HH), ("c.qasm", HH)]);
    let report = run(exact(2), &[dir.path().to_path_buf()]);

    assert_eq!(report.files_found, 3);
    assert_eq!(report.graphs_built, 3);
    let level = &report.levels[0];
    assert_eq!(level.k, 2);
    assert_eq!(level.total_examined, 3);
    assert_eq!(level.unique_patterns, 1);
    assert_eq!(level.top[0].count, 3);
    assert!((level.top[0].frequency - 1.0).abs() < f64::EPSILON);
    assert_eq!(level.top[0].node_labels(), vec!["h", "h"]);
}

#[test]
fn counts_sum_to_total_examined() {
    let dir = corpus(&[("teleport.qasm", TELEPORT), ("grover.qasm", GROVER2)]);
    for mode in [GraphMode::Dataflow, GraphMode::Comm] {
        let config = MinerConfig {
            k_min: 2,
            k_max: 4,
            mode,
            top_n: usize::MAX,
            ..exact(2)
        };
        let report = run(config, &[dir.path().to_path_buf()]);
        assert_eq!(report.levels.len(), 3);
        for level in &report.levels {
            let sum: u64 = level.top.iter().map(|p| p.count).sum();
            assert_eq!(sum, level.total_examined, "{mode} k={}", level.k);
            assert_eq!(level.top.len(), level.unique_patterns);
            let ranks: Vec<_> = level.top.iter().map(|p| p.rank).collect();
            assert_eq!(ranks, (1..=level.top.len()).collect::<Vec<_>>());
            assert!(level.top.windows(2).all(|w| w[0].count >= w[1].count));
        }
    }
}

#[test]
fn graphs_smaller_than_k_contribute_nothing() {
    let dir = corpus(&[("tiny.qasm", "OPENQASM 2.0;\nqreg q[1];\nx q[0];\n")]);
    let report = run(exact(2), &[dir.path().join("tiny.qasm")]);
    assert_eq!(report.benchmark, "tiny");
    assert_eq!(report.levels[0].total_examined, 0);
    assert!(report.levels[0].top.is_empty());

    let sampled = MinerConfig {
        exact: false,
        samples: 100,
        seed: Some(1),
        ..exact(2)
    };
    let report = run(sampled, &[dir.path().join("tiny.qasm")]);
    assert_eq!(report.levels[0].total_examined, 0);
}

#[test]
fn broken_inputs_are_excluded() {
    let dir = corpus(&[
        ("good.qasm", HH),
        ("broken.qasm", "OPENQASM 2.0;\nqreg q[1];\nh q[3];\n"),
    ]);
    let report = run(exact(2), &[dir.path().to_path_buf()]);
    assert_eq!(report.files_found, 2);
    assert_eq!(report.graphs_built, 1);
    assert_eq!(report.failed_files.len(), 1);
    assert!(report.failed_files[0].0.ends_with("broken.qasm"));
    assert_eq!(report.levels[0].total_examined, 1);
}

#[test]
fn all_inputs_broken_gives_empty_levels() {
    let dir = corpus(&[("broken.qasm", "qreg q[1];\nfoo q[0]\n")]);
    let report = run(exact(2), &[dir.path().to_path_buf()]);
    assert_eq!(report.graphs_built, 0);
    assert!(report.levels.iter().all(|l| l.total_examined == 0 && l.top.is_empty()));
}

#[test]
fn no_matching_files_is_an_error() {
    let dir = corpus(&[("readme.txt", "nothing here")]);
    let err = Miner::new(exact(2), Arc::new(QasmSource::new()))
        .unwrap()
        .run(&[dir.path().to_path_buf()])
        .unwrap_err();
    assert!(matches!(err, MineError::NoInputs(_)));
}

#[test]
fn seeded_sampling_is_reproducible_across_worker_counts() {
    let dir = corpus(&[("teleport.qasm", TELEPORT), ("grover.qasm", GROVER2)]);
    let config = |workers| MinerConfig {
        k_min: 2,
        k_max: 3,
        samples: 1100,
        chunk_size: 300,
        seed: Some(2024),
        workers: Some(workers),
        top_n: usize::MAX,
        ..MinerConfig::default()
    };

    let one = run(config(1), &[dir.path().to_path_buf()]);
    let four = run(config(4), &[dir.path().to_path_buf()]);
    assert_eq!(one.seed, 2024);
    assert_eq!(counts(&one), counts(&four));
}

#[test]
fn interaction_sampling_hits_exact_edge_count() {
    let dir = corpus(&[("grover.qasm", GROVER2), ("teleport.qasm", TELEPORT)]);
    let config = MinerConfig {
        k_min: 1,
        k_max: 3,
        mode: GraphMode::Comm,
        samples: 400,
        seed: Some(9),
        top_n: usize::MAX,
        ..MinerConfig::default()
    };
    let report = run(config, &[dir.path().to_path_buf()]);

    for level in &report.levels {
        for pattern in &level.top {
            let CircuitGraph::Interaction(g) = &pattern.exemplar else {
                panic!("comm mode produced a dataflow exemplar");
            };
            let interactions = g.edges().filter(|(_, _, e)| e.is_interaction()).count();
            assert_eq!(interactions, level.k);
        }
    }
}

#[test]
fn top_patterns_are_rendered_under_benchmark_layout() {
    let dir = corpus(&[("a.qasm", HH), ("b.qasm", HH)]);
    let out = tempfile::tempdir().unwrap();
    let bench = dir.path().join("hh_bench");
    std::fs::create_dir(&bench).unwrap();
    for name in ["a.qasm", "b.qasm"] {
        std::fs::rename(dir.path().join(name), bench.join(name)).unwrap();
    }

    let config = MinerConfig {
        output_dir: out.path().to_path_buf(),
        ..exact(2)
    };
    let report = Miner::new(config, Arc::new(QasmSource::new()))
        .unwrap()
        .with_renderer(DotRenderer)
        .run(std::slice::from_ref(&bench))
        .unwrap();

    let expected = out.path().join("hh_bench/dataflow/k2/rank1_freq100.0pct.dot");
    assert_eq!(report.benchmark, "hh_bench");
    assert_eq!(report.levels[0].top[0].rendered.as_deref(), Some(expected.as_path()));
    let dot = std::fs::read_to_string(&expected).unwrap();
    assert!(dot.contains("Pattern k=2 Rank 1 | Freq: 100.0% (2/2)"));
}

#[derive(Default, Clone)]
struct Recorder {
    phases: Arc<Mutex<Vec<RunPhase>>>,
}

impl MiningObserver for Recorder {
    fn phase(&self, phase: RunPhase) {
        self.phases.lock().unwrap().push(phase);
    }
}

#[test]
fn observer_sees_phases_in_order() {
    let dir = corpus(&[("a.qasm", HH)]);
    let recorder = Recorder::default();
    let config = MinerConfig {
        k_min: 2,
        k_max: 3,
        ..exact(2)
    };
    Miner::new(config, Arc::new(QasmSource::new()))
        .unwrap()
        .with_observer(recorder.clone())
        .run(&[dir.path().to_path_buf()])
        .unwrap();

    let mining = |k, stage| RunPhase::Mining { k, stage };
    let phases = recorder.phases.lock().unwrap().clone();
    assert_eq!(
        phases,
        vec![
            RunPhase::Idle,
            RunPhase::Discovering,
            RunPhase::BuildingGraphs,
            mining(2, MiningStage::Dispatching),
            mining(2, MiningStage::Aggregating),
            mining(2, MiningStage::Ranking),
            mining(3, MiningStage::Dispatching),
            mining(3, MiningStage::Aggregating),
            mining(3, MiningStage::Ranking),
            RunPhase::Reporting,
            RunPhase::Done,
        ]
    );
}

#[test]
fn mixed_selection_is_named_mixed() {
    let dir = corpus(&[("a.qasm", HH), ("b.qasm", HH)]);
    let inputs: Vec<PathBuf> = ["a.qasm", "b.qasm"]
        .iter()
        .map(|n| Path::new(dir.path()).join(n))
        .collect();
    let report = run(exact(2), &inputs);
    assert_eq!(report.benchmark, "mixed");
    assert_eq!(report.levels[0].total_examined, 2);
}
