use json_transformer::{
    BatchReport, EvalError, Executor, ExecutorConfig, Input, Output, Pipeline, PipelineConfig,
    Program, TransformError, TreeError,
};
use serde_json::{Value as Json, json};

fn pipeline(statements: &[&str]) -> Pipeline {
    pipeline_with(statements, ExecutorConfig::default(), PipelineConfig::default())
}

fn pipeline_with(statements: &[&str], executor: ExecutorConfig, config: PipelineConfig) -> Pipeline {
    let program = Program::compile(statements.iter().copied()).unwrap();
    Pipeline::new(Executor::new(program, &executor).unwrap(), config)
}

fn conversation(text: &str) -> Json {
    json!({"observations": [{"input": [text]}]})
}

#[test]
fn test_greeting_example() {
    let output = pipeline(&["dst.greeting = src.observations[0].input[0]"])
        .transform(conversation("hello"))
        .unwrap();
    assert_eq!(output, json!({"messages": ["hello"], "greeting": "hello"}));

    let keys: Vec<&String> = output.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["messages", "greeting"]);
}

#[test]
fn test_statements_see_previous_effects() {
    let output = pipeline(&["dst.a = 1", "dst.a = dst.a + 1"])
        .transform(conversation("hi"))
        .unwrap();
    assert_eq!(output, json!({"messages": ["hi"], "a": 2}));
}

#[test]
fn test_reseed_runs_before_every_statement() {
    let output = pipeline(&["dst.messages[0] = 'overwritten'", "dst.seen = dst.messages[0]"])
        .transform(conversation("seed"))
        .unwrap();
    assert_eq!(output, json!({"messages": ["seed"], "seen": "seed"}));
}

#[test]
fn test_deleted_messages_come_back() {
    let output = pipeline(&["del dst.messages", "dst.x = 1"])
        .transform(conversation("seed"))
        .unwrap();
    assert_eq!(output, json!({"messages": ["seed"], "x": 1}));
}

#[test]
fn test_reseed_disabled() {
    let output = pipeline_with(
        &["dst.name = src.name.upper()"],
        ExecutorConfig { reseed: None },
        PipelineConfig::default(),
    )
    .transform(json!({"name": "ada"}))
    .unwrap();
    assert_eq!(output, json!({"name": "ADA"}));
}

#[test]
fn test_custom_reseed() {
    let output = pipeline_with(
        &["dst.b = 2"],
        ExecutorConfig {
            reseed: Some("dst.id = src.id".to_string()),
        },
        PipelineConfig::default(),
    )
    .transform(json!({"id": 7}))
    .unwrap();
    assert_eq!(output, json!({"id": 7, "b": 2}));
}

#[test]
fn test_empty_program() {
    let output = pipeline(&[]).transform(json!({"anything": true})).unwrap();
    assert_eq!(output, json!({}));
}

#[test]
fn test_statement_failure_carries_position_and_text() {
    let err = pipeline(&["dst.a = 1", "dst.b = src.missing['x']", "dst.c = 3"])
        .transform(conversation("hi"))
        .unwrap_err();
    assert_eq!(
        err,
        TransformError::Statement {
            index: Some(1),
            statement: "dst.b = src.missing['x']".to_string(),
            source: EvalError::Tree(TreeError::KeyNotFound("x".into())),
        }
    );
}

#[test]
fn test_scalar_document_is_rejected() {
    let err = pipeline(&["dst.a = 1"]).transform(json!(42)).unwrap_err();
    assert_eq!(err, TransformError::Source(TreeError::UnsupportedType("number")));
}

#[test]
fn test_malformed_list_output() {
    let err = pipeline_with(
        &["dst.l[0] = 1", "dst.l.name = 'x'"],
        ExecutorConfig { reseed: None },
        PipelineConfig::default(),
    )
    .transform(json!({}))
    .unwrap_err();
    assert!(matches!(
        err,
        TransformError::Materialize(TreeError::MalformedIndex(_))
    ));
}

#[test]
fn test_batch_drops_failing_document() {
    let docs = vec![conversation("one"), json!({"no": "observations"}), conversation("three")];
    let (results, report) = pipeline(&["dst.text = src.observations[0].input[0]"])
        .transform_all_with_report(docs)
        .unwrap();

    assert_eq!(
        results,
        vec![
            json!({"messages": ["one"], "text": "one"}),
            json!({"messages": ["three"], "text": "three"}),
        ]
    );
    assert_eq!(
        report,
        BatchReport {
            read: 3,
            written: 2,
            skipped: 1
        }
    );
}

#[test]
fn test_batch_survives_oversized_repetition() {
    let docs = vec![json!({"n": 1}), json!({"n": i64::MAX}), json!({"n": 3})];
    let (results, report) = pipeline_with(
        &["dst.s = 'ab' * src.n", "dst.l = [1, 2] * src.n"],
        ExecutorConfig { reseed: None },
        PipelineConfig::default(),
    )
    .transform_all_with_report(docs)
    .unwrap();

    assert_eq!(
        results,
        vec![
            json!({"s": "ab", "l": [1, 2]}),
            json!({"s": "ababab", "l": [1, 2, 1, 2, 1, 2]}),
        ]
    );
    assert_eq!(report.skipped, 1);
}

#[test]
fn test_batch_fail_fast() {
    let docs = vec![conversation("one"), json!({}), conversation("three")];
    let result = pipeline_with(
        &["dst.x = 1"],
        ExecutorConfig::default(),
        PipelineConfig {
            continue_on_error: false,
        },
    )
    .transform_all(docs);
    assert!(matches!(
        result,
        Err(TransformError::Statement { index: None, .. })
    ));
}

#[test]
fn test_documents_do_not_share_state() {
    let docs = vec![conversation("a"), conversation("b")];
    let results = pipeline(&["dst.count = 1"]).transform_all(docs).unwrap();
    assert_eq!(results[0], json!({"messages": ["a"], "count": 1}));
    assert_eq!(results[1], json!({"messages": ["b"], "count": 1}));
}

#[test]
fn test_run_dispatches_on_input_shape() {
    let pipeline = pipeline(&["dst.n = 1"]);
    assert_eq!(
        pipeline.run(Input::Single(conversation("x"))).unwrap(),
        Output::Single(json!({"messages": ["x"], "n": 1}))
    );
    assert_eq!(
        pipeline.run(Input::Batch(vec![])).unwrap(),
        Output::Batch(vec![])
    );
}
