use rulekit::{CompileError, Context, ErrorKind, Frontend, MongoQuery, RuleError};
use serde_json::json;

fn eval(input: &str, ctx: &Context) -> bool {
    MongoQuery::new().parse(input).unwrap().evaluate(ctx).unwrap()
}

#[test]
fn implicit_and_with_operators() {
    let query = r#"{"age": {"$gte": 18, "$lte": 65}, "status": {"$in": ["active", "trial"]}}"#;
    assert!(eval(query, &Context::new().set("age", 30).set("status", "trial")));
    assert!(!eval(query, &Context::new().set("age", 70).set("status", "trial")));
    assert!(!eval(query, &Context::new().set("age", 30).set("status", "closed")));
}

#[test]
fn exists_treats_null_as_absent() {
    let query = r#"{"email": {"$exists": true}}"#;
    assert!(eval(query, &Context::new().set("email", "a@b.c")));
    assert!(!eval(query, &Context::new()));
    assert!(!eval(query, &Context::new().set("email", serde_json::Value::Null)));
}

#[test]
fn nested_paths_and_logical_operators() {
    let query = r#"{"$or": [{"user.role": "admin"}, {"user.age": {"$gt": 21}}]}"#;
    assert!(eval(query, &Context::new().set("user.role", "admin")));
    assert!(eval(query, &Context::new().set("user.age", 30)));
    assert!(!eval(query, &Context::new().set("user.age", 20)));
    assert!(eval(r#"{"$nor": [{"a": 1}, {"b": 2}]}"#, &Context::new().set("a", 3)));
}

#[test]
fn document_and_text_inputs_agree() {
    let mongo = MongoQuery::new();
    let doc = json!({"n": {"$regex": "^a", "$options": "i"}});
    let from_doc = mongo.parse_document(&doc).unwrap();
    let from_text = mongo.parse(&doc.to_string()).unwrap();
    assert_eq!(from_doc.root(), from_text.root());
    assert!(from_doc.evaluate(&Context::new().set("n", "Alpha")).unwrap());
}

#[test]
fn serialize_canonical_document() {
    let mongo = MongoQuery::new();
    let rule = mongo.parse(r#"{"a": 1, "b": {"$ne": "x"}}"#).unwrap();
    assert_eq!(
        mongo.serialize(&rule).unwrap(),
        json!({"$and": [{"a": {"$eq": 1}}, {"b": {"$ne": "x"}}]})
    );
}

#[test]
fn errors() {
    let mongo = MongoQuery::new();
    let err = mongo.parse(r#"{"a": {"$elemMatch": {}}}"#).unwrap_err();
    assert!(matches!(
        err,
        RuleError::Compile(CompileError::UnsupportedOperator { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Semantic);

    let err = mongo.parse("{\"a\": 1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.to_string().starts_with("Invalid JSON: "));

    let err = mongo.parse("42").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Query document must decode to an object or a non-empty array of objects"
    );
}

#[test]
fn array_root_and_typed_number() {
    let mongo = MongoQuery::new();
    let query = r#"[{"qty": {"$type": "number"}}, {"qty": {"$gt": 1}}]"#;
    assert!(eval(query, &Context::new().set("qty", 5)));
    assert!(eval(query, &Context::new().set("qty", 2.5)));
    assert!(!eval(query, &Context::new().set("qty", "12")));

    let rule = mongo.parse(r#"{"qty": {"$type": "number"}}"#).unwrap();
    assert_eq!(
        mongo.serialize(&rule).unwrap(),
        json!({"qty": {"$type": "number"}})
    );
}

#[test]
fn invalid_patterns_and_deep_paths_fail_validation() {
    let mongo = MongoQuery::new();
    let result = mongo.validate_with_errors(r#"{"name": {"$regex": "("}}"#);
    assert_eq!(result.first_error().unwrap().kind, ErrorKind::Semantic);

    let deep = vec!["a"; 20_000].join(".");
    let result = mongo.validate_with_errors(&format!(r#"{{"{deep}": 1}}"#));
    let first = result.first_error().unwrap();
    assert_eq!(first.kind, ErrorKind::Structural);
    assert_eq!(first.message, "Maximum nesting depth of 256 exceeded");
}
