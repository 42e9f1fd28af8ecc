use crate::utils::RecordingLogger;
use flageval::{
    ErrorKind, EvalError, Evaluator, FileDataProvider, PrerequisitePolicy, Target, Value,
};

mod utils;

fn evaluator(logger: &RecordingLogger, policy: PrerequisitePolicy) -> Evaluator {
    Evaluator::builder()
        .provider(Box::new(
            FileDataProvider::new("tests/data/prerequisites.json").unwrap(),
        ))
        .logger(Box::new(logger.clone()))
        .prerequisite_policy(policy)
        .build()
        .unwrap()
}

#[test]
fn transitive_chain_not_satisfied() {
    let logger = RecordingLogger::default();
    let evaluator = evaluator(&logger, PrerequisitePolicy::FailOpen);

    let evaluation = evaluator.evaluate("a", &Target::new());
    assert_eq!(
        evaluation.error(),
        Some(&EvalError::PrerequisiteNotSatisfied {
            flag: "b".to_owned(),
            prerequisite: "c".to_owned(),
            expected: "on".to_owned(),
            actual: "off".to_owned(),
        })
    );
    assert_eq!(evaluation.string("default"), "default");
    assert!(logger.take().contains("ERROR [2200]"));

    // b alone only depends on c
    assert!(evaluator.evaluate("b", &Target::new()).error().is_some());
    assert_eq!(evaluator.evaluate("c", &Target::new()).string(""), "off");
}

#[test]
fn prerequisite_depends_on_target() {
    let logger = RecordingLogger::default();
    let evaluator = evaluator(&logger, PrerequisitePolicy::FailOpen);

    let beta = evaluator.evaluate("new-ui", &Target::new().attr("beta", true));
    assert_eq!(beta.value, Some(Value::from("modern")));

    let regular = evaluator.evaluate("new-ui", &Target::new().attr("beta", false));
    assert_eq!(
        regular.error().map(|e| e.kind()),
        Some(ErrorKind::PrerequisiteNotSatisfied)
    );
    assert!(regular.is_none());
}

#[test]
fn circular_dependencies() {
    let logger = RecordingLogger::default();
    let evaluator = evaluator(&logger, PrerequisitePolicy::FailOpen);

    let tests = vec![
        ("key1", "'key1' -> 'key1'"),
        ("key2", "'key2' -> 'key3' -> 'key2'"),
        ("key4", "'key4' -> 'key3' -> 'key2' -> 'key3'"),
    ];

    for (key, path) in tests {
        let evaluation = evaluator.evaluate(key, &Target::new());
        assert_eq!(
            evaluation.error(),
            Some(&EvalError::PrerequisiteCycle(path.to_owned())),
            "{key}"
        );
        let logs = logger.take();
        assert!(logs.contains("ERROR [2201]"), "{key}");
        assert!(logs.contains(path), "{key}");
    }
}

#[test]
fn missing_prerequisite_fails_open() {
    let logger = RecordingLogger::default();
    let evaluator = evaluator(&logger, PrerequisitePolicy::FailOpen);

    let evaluation = evaluator.evaluate("orphan", &Target::new());
    assert!(evaluation.error().is_none());
    assert_eq!(evaluation.string(""), "served");
    assert!(logger.take().contains(
        "WARNING [3002] Prerequisite flag 'deleted-flag' of 'orphan' was not found, treating it as satisfied."
    ));
}

#[test]
fn missing_prerequisite_fails_closed() {
    let logger = RecordingLogger::default();
    let evaluator = evaluator(&logger, PrerequisitePolicy::FailClosed);

    let evaluation = evaluator.evaluate("orphan", &Target::new());
    assert_eq!(
        evaluation.error(),
        Some(&EvalError::ConfigurationNotFound("deleted-flag".to_owned()))
    );
    let logs = logger.take();
    assert!(!logs.contains("WARNING [3002]"));
    assert!(logs.contains("ERROR [1001]"));
}
