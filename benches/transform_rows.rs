use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use csv_rulemap::cli::{QuoteMode, TransformArgs};
use csv_rulemap::{Record, RuleBook, RuleDefinition, RuleSet, Transformer, VecSink, transform_cmd};
use tempfile::TempDir;

fn generate_cases(rows: usize) -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let csv_path = temp_dir.path().join("cases.csv");
    let mut file = File::create(&csv_path).expect("create csv");
    writeln!(file, "entity,case_id,step,instrument,trade_date").expect("header");
    for i in 0..rows {
        let entity = if i % 10 == 0 { "SG" } else { "" };
        let case_id = i / 5;
        writeln!(file, "{entity},TC-{case_id},step {i},FX Spot,2024-01-{:02}", (i % 28) + 1)
            .expect("row");
    }
    let rules_path = temp_dir.path().join("rules.json");
    std::fs::write(
        &rules_path,
        r#"{
  "entity": {"input_columns": ["entity"], "strategy": "OVERWRITE", "carry_last_seen": true},
  "data": {"input_columns": ["instrument", "trade_date"], "strategy": "SEMICOLON_JOIN"},
  "summary": {"input_columns": ["step", "instrument"], "strategy": "SUMMARY_CONCAT_COLON", "group_key": "case_id"}
}"#,
    )
    .expect("write rules");
    (temp_dir, csv_path, rules_path)
}

fn transform_args(input: &Path, rules: &Path, output: &Path) -> TransformArgs {
    TransformArgs {
        input: input.to_path_buf(),
        rules: rules.to_path_buf(),
        output: Some(output.to_path_buf()),
        delimiter: None,
        output_delimiter: None,
        input_encoding: None,
        quote: QuoteMode::Necessary,
        limit: None,
        table: false,
    }
}

fn in_memory_records(rows: usize) -> Vec<Record> {
    (0..rows)
        .map(|i| {
            [
                ("case_id", format!("TC-{}", i / 5)),
                ("step", format!("step {i}")),
                ("instrument", "FX Spot".to_string()),
            ]
            .into_iter()
            .collect()
        })
        .collect()
}

fn bench_transform(c: &mut Criterion) {
    let (temp_dir, csv_path, rules_path) = generate_cases(50_000);
    let output = temp_dir.path().join("out.csv");
    let args = transform_args(&csv_path, &rules_path, &output);

    let book = RuleBook::new(vec![
        RuleDefinition::new("summary", &["step", "instrument"], "SUMMARY_CONCAT_COLON")
            .with_group_key("case_id"),
        RuleDefinition::new("joined", &["step", "instrument"], "CONCAT_COLON"),
    ]);
    let records = in_memory_records(50_000);

    let mut group = c.benchmark_group("transform");

    group.bench_function("csv_file", |b| {
        b.iter(|| transform_cmd::execute(&args).expect("transform csv"));
    });

    group.bench_function("in_memory", |b| {
        b.iter_batched(
            || Transformer::new(RuleSet::build(&book).expect("build rules")),
            |mut transformer| {
                let mut sink = VecSink::default();
                transformer
                    .run(records.iter().cloned().map(Ok), &mut sink)
                    .expect("transform records");
                sink
            },
            BatchSize::SmallInput,
        );
    });

    drop(temp_dir);
    group.finish();
}

criterion_group!(benches, bench_transform);
criterion_main!(benches);
