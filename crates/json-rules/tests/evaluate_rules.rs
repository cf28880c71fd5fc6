//! Integration tests for cascading rule evaluation.

use json_rules::{evaluate_rules, parse_rules, EvalValue, EvaluateOptions, RuleError, RuleEvaluator};
use serde_json::{json, Value};

fn run_with(rules: Value, docs: Value, options: EvaluateOptions) -> Result<EvalValue, RuleError> {
    let rules = parse_rules(&rules)?;
    let docs = docs.as_array().cloned().unwrap_or_default();
    evaluate_rules(&rules, &docs, options)
}

fn check(rules: Value, docs: Value, expected: Value) {
    let result = run_with(rules.clone(), docs, EvaluateOptions::default())
        .unwrap_or_else(|e| panic!("evaluate({rules}) failed: {e}"));
    assert_eq!(result, EvalValue::Json(expected), "rules: {rules}");
}

fn check_err(rules: Value, docs: Value) -> RuleError {
    run_with(rules.clone(), docs, EvaluateOptions::default())
        .err()
        .unwrap_or_else(|| panic!("expected error for {rules}"))
}

/// Runs the rules and returns the evaluator's copy of document `id`.
fn document_after(rules: Value, docs: Value, id: &str) -> Value {
    let rules = parse_rules(&rules).unwrap();
    let docs = docs.as_array().cloned().unwrap();
    let mut evaluator = RuleEvaluator::new(&rules, &docs, EvaluateOptions::default()).unwrap();
    evaluator.evaluate().unwrap();
    evaluator.document(id).cloned().unwrap()
}

// ----------------------------------------------------------------- Paths

#[test]
fn test_path_resolution() {
    let docs = json!([{"$id": "D", "a": {"b": [10, 20]}}]);
    check(json!([{"path": "/a/b/1"}]), docs.clone(), json!(20));
    check(json!([{"path": "/a"}]), docs.clone(), json!({"b": [10, 20]}));
    let missing = run_with(json!([{"path": "/a/x"}]), docs, EvaluateOptions::default()).unwrap();
    assert_eq!(missing, EvalValue::Undefined);
}

#[test]
fn test_paths_continue_from_previous_rule() {
    let docs = json!([{"$id": "D", "order": {"items": [{"price": 4}]}, "items": "top"}]);
    check(json!([{"path": "/order"}, {"path": "/items/0/price"}]), docs.clone(), json!(4));
    check(json!([{"path": "/order/items"}, {"path": "../../items"}]), docs, json!("top"));
}

#[test]
fn test_empty_path_continues_the_cascade() {
    let docs = json!([{"$id": "D", "a": 1}]);
    check(json!([{"path": "/a"}, {"path": "", "operator": "+", "value": 1}]), docs.clone(), json!(2));
    let err = check_err(json!([{"path": ""}]), docs);
    assert!(matches!(err, RuleError::Structural(msg) if msg.contains("No action defined")));
}

#[test]
fn test_parent_navigation_in_one_path() {
    let docs = json!([{"$id": "D", "a": {"b": 1, "c": 2}}]);
    check(json!([{"path": "/a/b/../c"}]), docs, json!(2));
}

#[test]
fn test_cross_document_paths() {
    let docs = json!([{"$id": "A", "x": 1}, {"$id": "B", "x": 2}]);
    check(json!([{"path": "B/x"}]), docs.clone(), json!(2));
    check(json!([{"path": "/x"}]), docs.clone(), json!(1));
    // after switching documents, later rules stay in the new one
    check(json!([{"path": "B/x"}, {"path": "A/x"}, {"operator": "+", "value": 10}]), docs, json!(11));
}

#[test]
fn test_primary_document() {
    let docs = json!([{"$id": "A", "x": 1}, {"$id": "B", "x": 2}]);
    let result = run_with(
        json!([{"path": "/x"}]),
        docs,
        EvaluateOptions::new().with_primary_document("B"),
    )
    .unwrap();
    assert_eq!(result, json!(2));
}

#[test]
fn test_invalid_paths() {
    let docs = json!([{"$id": "D", "a": 1}]);
    assert!(matches!(check_err(json!([{"path": "../a"}]), docs.clone()), RuleError::InvalidPath { .. }));
    assert!(matches!(check_err(json!([{"path": "/a~2"}]), docs), RuleError::InvalidPath { .. }));
}

#[test]
fn test_no_path_and_no_reference_point() {
    let err = check_err(json!([{"operator": "abs"}]), json!([{"$id": "D"}]));
    assert!(matches!(err, RuleError::Structural(msg) if msg.contains("Unable to traverse")));
}

// ----------------------------------------------------------------- Cascade

#[test]
fn test_cascade_arithmetic() {
    let docs = json!([{"$id": "D", "a": 5}]);
    check(
        json!([{"path": "/a"}, {"operator": "*", "value": 2}, {"operator": "-", "value": 1}]),
        docs.clone(),
        json!(9),
    );
    check(json!([{"path": "/a", "operator": "/", "value": 2}]), docs.clone(), json!(2.5));
    check(json!([{"path": "/a", "operator": "^", "value": 2}]), docs.clone(), json!(25));
    check(json!([{"path": "/a", "operator": "%", "value": 3}]), docs.clone(), json!(2));
    check(json!([{"path": "/a", "operator": "+", "value": "x"}]), docs, json!("5x"));
}

#[test]
fn test_get_value() {
    let docs = json!([{"$id": "D", "a": 1, "b": 2}]);
    check(
        json!([{"path": "/a", "operator": "+", "getValue": [{"path": "../b"}]}]),
        docs.clone(),
        json!(3),
    );
    // getValue rules start from the path value
    check(
        json!([{"path": "/a", "operator": "<", "getValue": [{"operator": "+", "value": 1}]}]),
        docs,
        json!(true),
    );
}

#[test]
fn test_comparisons() {
    let docs = json!([{"$id": "D", "a": 3, "s": "3"}]);
    check(json!([{"path": "/a", "operator": "=", "value": 3}]), docs.clone(), json!(true));
    check(json!([{"path": "/s", "operator": "=", "value": 3}]), docs.clone(), json!(false));
    check(json!([{"path": "/s", "operator": "!=", "value": 3}]), docs.clone(), json!(true));
    check(json!([{"path": "/s", "operator": "not", "value": "3"}]), docs.clone(), json!(false));
    check(json!([{"path": "/a", "operator": ">=", "value": 3}]), docs.clone(), json!(true));
    check(json!([{"path": "/a", "operator": "!>", "value": 2}]), docs.clone(), json!(false));
    check(json!([{"path": "/a", "operator": "!<=", "value": 2}]), docs.clone(), json!(true));
    check(json!([{"path": "/missing", "operator": "!<", "value": 2}]), docs, json!(true));
}

#[test]
fn test_end_operators() {
    let docs = json!([{"$id": "D", "n": null, "v": -4}]);
    check(json!([{"path": "/missing", "operator": "is undefined"}]), docs.clone(), json!(true));
    check(json!([{"path": "/n", "operator": "is undefined"}]), docs.clone(), json!(false));
    check(json!([{"path": "/n", "operator": "is null"}]), docs.clone(), json!(true));
    check(json!([{"path": "/v", "operator": "is not null"}]), docs.clone(), json!(true));
    check(json!([{"path": "/v", "operator": "abs"}]), docs.clone(), json!(4));
    check(json!([{"path": "/v", "operator": "abs"}, {"operator": "sqrt"}]), docs, json!(2));
}

#[test]
fn test_cast() {
    let docs = json!([{"$id": "D", "n": "12", "o": {"a": 1}, "j": "[1,2]"}]);
    check(json!([{"path": "/n", "operator": "cast", "castTo": "number"}]), docs.clone(), json!(12));
    check(json!([{"path": "/o", "operator": "cast", "castTo": "string"}]), docs.clone(), json!(r#"{"a":1}"#));
    check(json!([{"path": "/n", "operator": "cast", "castTo": "boolean"}]), docs.clone(), json!(true));
    check(json!([{"path": "/j", "operator": "cast", "castTo": "JSON"}, {"operator": "sum"}]), docs.clone(), json!(3));
    let err = check_err(json!([{"path": "/n", "operator": "cast", "castTo": "date"}]), docs);
    assert!(matches!(err, RuleError::Domain(_)));
}

// ----------------------------------------------------------------- Logical groups

#[test]
fn test_logical_grouping() {
    let docs = json!([{"$id": "D", "a": 5, "b": null}]);
    check(
        json!([{"path": "/a"}, {"operator": "or", "rules": [
            {"operator": "=", "value": 1},
            {"operator": "=", "value": 5}
        ]}]),
        docs.clone(),
        json!(true),
    );
    check(
        json!([{"path": "/a"}, {"operator": "or", "rules": [{"operator": "=", "value": 1}]}]),
        docs.clone(),
        json!(false),
    );
    check(
        json!([{"operator": "and", "rules": [
            {"path": "/a", "operator": ">", "value": 1},
            {"path": "/b", "operator": "is null"}
        ]}]),
        docs.clone(),
        json!(true),
    );
    check(json!([{"path": "/a"}, {"operator": "and", "rules": []}]), docs.clone(), json!(true));
    check(json!([{"path": "/a"}, {"operator": "or", "rules": []}]), docs, json!(false));
}

#[test]
fn test_logical_grouping_short_circuits() {
    // the second rule would fail on a non-number
    let docs = json!([{"$id": "D", "a": 5, "s": "x"}]);
    check(
        json!([{"operator": "or", "rules": [
            {"path": "/a", "operator": "=", "value": 5},
            {"path": "/s", "operator": "abs"}
        ]}]),
        docs.clone(),
        json!(true),
    );
    check(
        json!([{"operator": "and", "rules": [
            {"path": "/a", "operator": "=", "value": 0},
            {"path": "/s", "operator": "abs"}
        ]}]),
        docs,
        json!(false),
    );
}

// ----------------------------------------------------------------- Arrays

#[test]
fn test_map_then_sum() {
    check(
        json!([{"path": "/items", "operator": "map", "rules": [{"path": "/price"}]}, {"operator": "sum"}]),
        json!([{"$id": "D", "items": [{"price": 2}, {"price": 3}, {"price": 5}]}]),
        json!(10),
    );
}

#[test]
fn test_map_result_is_addressable() {
    check(
        json!([{"path": "/items", "operator": "map", "rules": [{"path": "/price"}]}, {"path": "/1"}]),
        json!([{"$id": "D", "items": [{"price": 2}, {"price": 3}]}]),
        json!(3),
    );
}

#[test]
fn test_map_undefined_becomes_null() {
    check(
        json!([{"path": "/items", "operator": "map", "rules": [{"path": "/missing"}]}]),
        json!([{"$id": "D", "items": [{}, {}]}]),
        json!([null, null]),
    );
}

#[test]
fn test_filter() {
    let docs = json!([{"$id": "D", "xs": [1, 3, 5, 2], "people": [{"age": 20}, {"age": 15}]}]);
    check(
        json!([{"path": "/xs", "operator": "filter", "rules": [{"operator": ">", "value": 2}]}]),
        docs.clone(),
        json!([3, 5]),
    );
    check(
        json!([{"path": "/people", "operator": "filter", "rules": [{"path": "/age", "operator": ">=", "value": 18}]}, {"operator": "len"}]),
        docs.clone(),
        json!(1),
    );
    let err = check_err(json!([{"path": "/xs", "operator": "filter"}]), docs);
    assert!(matches!(err, RuleError::Domain(msg) if msg.contains("No rules")));
}

#[test]
fn test_sort() {
    let docs = json!([{"$id": "D",
        "xs": [3, 1, 2],
        "people": [{"n": "a", "age": 30}, {"n": "b", "age": 20}, {"n": "c", "age": 40}],
        "ties": [{"k": 1, "n": "a"}, {"k": 0, "n": "b"}, {"k": 1, "n": "c"}]
    }]);
    check(json!([{"path": "/xs", "operator": "sort"}]), docs.clone(), json!([1, 2, 3]));
    check(
        json!([{"path": "/xs", "operator": "sort", "comparisonOperator": "<"}]),
        docs.clone(),
        json!([3, 2, 1]),
    );
    check(
        json!([{"path": "/xs", "operator": "sort", "comparisonOperator": "-"}]),
        docs.clone(),
        json!([1, 2, 3]),
    );
    check(
        json!([
            {"path": "/people", "operator": "sort", "getComparisonValue": [{"path": "/age"}], "comparisonOperator": "<"},
            {"operator": "map", "rules": [{"path": "/n"}]}
        ]),
        docs.clone(),
        json!(["c", "a", "b"]),
    );
    check(
        json!([
            {"path": "/ties", "operator": "sort", "getComparisonValue": [{"path": "/k"}], "comparisonOperator": ">="},
            {"operator": "map", "rules": [{"path": "/n"}]}
        ]),
        docs.clone(),
        json!(["b", "c", "a"]),
    );
    assert!(matches!(
        check_err(json!([{"path": "/people/0", "operator": "sort"}]), docs),
        RuleError::Domain(_)
    ));
}

#[test]
fn test_contains() {
    let docs = json!([{"$id": "D", "xs": [1, 2, 3], "target": 2, "objs": [{"id": 1}]}]);
    check(json!([{"path": "/xs", "operator": "contains", "value": 3}]), docs.clone(), json!(true));
    check(json!([{"path": "/xs", "operator": "contains", "value": "3"}]), docs.clone(), json!(false));
    check(json!([{"path": "/objs", "operator": "contains", "value": {"id": 1}}]), docs.clone(), json!(true));
    check(
        json!([{"path": "/xs", "operator": "contains", "getValue": [{"path": "../../target"}]}]),
        docs.clone(),
        json!(true),
    );
    assert!(matches!(
        check_err(json!([{"path": "/target", "operator": "contains", "value": 2}]), docs),
        RuleError::Domain(_)
    ));
}

#[test]
fn test_slice_splice_len() {
    let docs = json!([{"$id": "D", "xs": [0, 1, 2, 3, 4]}]);
    check(
        json!([{"path": "/xs", "operator": "slice", "startIndex": 1, "endIndex": 3}]),
        docs.clone(),
        json!([1, 2]),
    );
    check(
        json!([{"path": "/xs", "operator": "slice", "startIndex": -2}]),
        docs.clone(),
        json!([3, 4]),
    );
    check(
        json!([{"path": "/xs", "operator": "splice", "startIndex": 1, "deleteCount": 3, "itemsToAdd": ["x"]}]),
        docs.clone(),
        json!([0, "x", 4]),
    );
    check(
        json!([{"path": "/xs", "operator": "splice", "startIndex": 1}, {"operator": "len"}]),
        docs.clone(),
        json!(1),
    );
    // splice never touches the document
    check(
        json!([{"path": "/xs", "operator": "splice", "startIndex": 0}, {"path": "../xs", "operator": "len"}]),
        docs,
        json!(5),
    );
}

#[test]
fn test_aggregates() {
    let docs = json!([{"$id": "D", "xs": [4, 1, 3, 2], "empty": [], "tags": ["a", "b", "b"]}]);
    check(json!([{"path": "/xs", "operator": "min"}]), docs.clone(), json!(1));
    check(json!([{"path": "/xs", "operator": "max"}]), docs.clone(), json!(4));
    check(json!([{"path": "/xs", "operator": "mean"}]), docs.clone(), json!(2.5));
    check(json!([{"path": "/xs", "operator": "median"}]), docs.clone(), json!(2.5));
    check(json!([{"path": "/tags", "operator": "mode"}]), docs.clone(), json!("b"));
    // median leaves the array in place
    check(json!([{"path": "/xs", "operator": "median"}, {"path": "../xs/0"}]), docs.clone(), json!(4));
    let err = check_err(json!([{"path": "/empty", "operator": "sum"}]), docs);
    assert!(matches!(err, RuleError::Domain(msg) if msg.contains("empty array")));
}

// ----------------------------------------------------------------- Set

#[test]
fn test_set_across_documents() {
    let rules = json!([{"path": "D2/x"}, {"operator": "+", "value": 1}, {"operator": "set", "setPath": "D1/y"}]);
    let docs = json!([{"$id": "D1", "y": 0}, {"$id": "D2", "x": 41}]);
    let result = run_with(rules.clone(), docs.clone(), EvaluateOptions::new().with_primary_document("D1")).unwrap();
    assert_eq!(result, json!(42));
    assert_eq!(document_after(rules, docs, "D1"), json!({"$id": "D1", "y": 42}));
}

#[test]
fn test_set_relative_and_returns_path_value() {
    let docs = json!([{"$id": "D", "order": {"total": 7}}]);
    let rules = json!([{"path": "/order/total", "operator": "set", "setPath": "../copy", "value": 9}]);
    check(rules.clone(), docs.clone(), json!(7));
    assert_eq!(
        document_after(rules, docs, "D"),
        json!({"$id": "D", "order": {"total": 7, "copy": 9}})
    );
}

#[test]
fn test_set_is_visible_to_later_rules() {
    let docs = json!([{"$id": "D", "a": 1}]);
    check(
        json!([{"path": "/a", "operator": "set", "setPath": "$vars/tmp", "getValue": [{"operator": "*", "value": 10}]}, {"path": "$vars/tmp"}]),
        docs.clone(),
        json!(10),
    );
    check(
        json!([{"path": "/a", "operator": "set", "setPath": "D/b", "value": 9}, {"path": "D/b"}]),
        docs,
        json!(9),
    );
}

#[test]
fn test_set_is_visible_through_relative_paths() {
    let docs = json!([{"$id": "D", "a": 1}]);
    check(
        json!([{"path": "/a", "operator": "set", "setPath": "../b", "value": 9}, {"path": "../b"}]),
        docs,
        json!(9),
    );
    check(
        json!([{"path": "/o"}, {"operator": "set", "setPath": "/k", "value": 5}, {"path": "/k"}]),
        json!([{"$id": "D", "o": {}}]),
        json!(5),
    );
}

#[test]
fn test_set_overwrites_value_read_later() {
    // the second read goes through the point resolved before the write
    check(
        json!([
            {"path": "/o/n", "operator": "set", "setPath": "../n", "value": 2},
            {"operator": "+", "value": 0},
            {"path": "../n"}
        ]),
        json!([{"$id": "D", "o": {"n": 1}}]),
        json!(2),
    );
}

#[test]
fn test_set_inside_map_is_visible_to_the_element() {
    let rules = json!([{"path": "/items", "operator": "map", "rules": [
        {"path": "/price", "operator": "set", "setPath": "../seen", "value": true},
        {"path": "/seen"}
    ]}]);
    let docs = json!([{"$id": "D", "items": [{"price": 1}, {"price": 2}]}]);
    check(rules.clone(), docs.clone(), json!([true, true]));
    assert_eq!(
        document_after(rules, docs, "D")["items"],
        json!([{"price": 1, "seen": true}, {"price": 2, "seen": true}])
    );
}

#[test]
fn test_group_keeps_the_incoming_document() {
    let docs = json!([{"$id": "A", "o": {"x": 1}}, {"$id": "B", "o": {"x": 2}}]);
    check(
        json!([{"path": "/o"}, {"operator": "and", "rules": [{"path": "B/o/x"}]}, {"path": "/x"}]),
        docs.clone(),
        json!(1),
    );
    check(
        json!([{"path": "/o/x", "operator": "=", "getValue": [{"path": "B/o/x"}]}, {"path": "../x"}]),
        docs,
        json!(1),
    );
}

#[test]
fn test_set_failures_are_domain_errors() {
    let docs = json!([{"$id": "D", "a": 1}]);
    let err = check_err(json!([{"path": "/a", "operator": "set", "setPath": "/x/y", "value": 1}]), docs.clone());
    assert!(matches!(err, RuleError::Domain(msg) if msg.contains("Unable to set")));
    let err = check_err(json!([{"path": "/a", "operator": "set", "setPath": "../../x", "value": 1}]), docs);
    assert!(matches!(err, RuleError::Domain(_)));
}

// ----------------------------------------------------------------- Errors

#[test]
fn test_structural_input_errors() {
    let rules = parse_rules(&json!([{"path": "/a"}])).unwrap();
    let opts = EvaluateOptions::default;
    assert!(matches!(evaluate_rules(&[], &[json!({"$id": "D"})], opts()), Err(RuleError::Structural(_))));
    assert!(matches!(evaluate_rules(&rules, &[], opts()), Err(RuleError::Structural(_))));
    assert!(matches!(evaluate_rules(&rules, &[json!({"a": 1})], opts()), Err(RuleError::Structural(_))));
    assert!(matches!(
        evaluate_rules(&rules, &[json!({"$id": "D"})], EvaluateOptions::new().with_primary_document("X")),
        Err(RuleError::Structural(_))
    ));
}

#[test]
fn test_structural_rule_errors() {
    let docs = json!([{"$id": "D", "a": 1}]);
    let err = check_err(json!([{"path": "/a", "value": 1}]), docs.clone());
    assert!(err.to_string().contains("No action defined"));
    let err = check_err(json!([{"path": "/a", "operator": "?"}]), docs.clone());
    assert_eq!(err.to_string(), "Operator '?' not implemented");
    let err = check_err(json!([{"path": "/a", "operator": "="}]), docs);
    assert!(matches!(err, RuleError::Structural(_)));
}

#[test]
fn test_domain_errors() {
    let docs = json!([{"$id": "D", "s": "x", "z": 0}]);
    for rules in [
        json!([{"path": "/s", "operator": "abs"}]),
        json!([{"path": "/s", "operator": "len"}]),
        json!([{"path": "/s", "operator": "-", "value": 1}]),
        json!([{"path": "/z", "operator": "sqrt"}, {"operator": "/", "value": 0}]),
        json!([{"path": "/s", "operator": "cast", "castTo": "number"}]),
        json!([{"path": "/s", "operator": "mean"}]),
    ] {
        assert!(matches!(check_err(rules.clone(), docs.clone()), RuleError::Domain(_)), "rules: {rules}");
    }
}

#[test]
fn test_caller_documents_are_untouched() {
    let rules = parse_rules(&json!([{"path": "/a", "operator": "set", "setPath": "../a", "value": 2}])).unwrap();
    let docs = vec![json!({"$id": "D", "a": 1})];
    evaluate_rules(&rules, &docs, EvaluateOptions::default()).unwrap();
    assert_eq!(docs[0], json!({"$id": "D", "a": 1}));
}
