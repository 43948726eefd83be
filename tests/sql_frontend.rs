use rulekit::{Context, Frontend, Rule, SqlNode, SqlWhere, Value};

fn rule(input: &str) -> Rule {
    SqlWhere::new().parse(input).unwrap()
}

fn eval(input: &str, ctx: &Context) -> bool {
    rule(input).evaluate(ctx).unwrap()
}

#[test]
fn precedence_groups_and_first() {
    let input = "a = 1 OR b = 2 AND c = 3";
    assert!(eval(input, &Context::new().set("a", 1).set("b", 2).set("c", 9)));
    assert!(!eval(input, &Context::new().set("a", 9).set("b", 2).set("c", 9)));
    assert!(eval(
        "(a = 1 OR b = 2) AND c = 9",
        &Context::new().set("a", 9).set("b", 2).set("c", 9)
    ));
}

#[test]
fn between_matches_explicit_range() {
    let between = "age BETWEEN 18 AND 65";
    let explicit = "age >= 18 AND age <= 65";
    assert!(eval(between, &Context::new().set("age", 30)));
    assert!(!eval(between, &Context::new().set("age", 70)));
    for age in [17, 18, 40, 65, 66] {
        let ctx = Context::new().set("age", age);
        assert_eq!(eval(between, &ctx), eval(explicit, &ctx), "age={age}");
    }
    assert_eq!(rule(between).root(), rule(explicit).root());
}

#[test]
fn not_in_and_not_between() {
    let input = "status NOT IN ('banned', 'deleted')";
    assert!(eval(input, &Context::new().set("status", "active")));
    assert!(!eval(input, &Context::new().set("status", "banned")));
    assert!(eval("age NOT BETWEEN 1 AND 5", &Context::new().set("age", 9)));
}

#[test]
fn equality_is_typed() {
    assert!(eval("code = '123'", &Context::new().set("code", "123")));
    assert!(!eval("code = '123'", &Context::new().set("code", 123)));
    assert!(eval("code <> '123'", &Context::new().set("code", 123)));
}

#[test]
fn like_and_null_checks() {
    let ctx = Context::new().set("name", "Jane.Doe").set("email", Value::Null);
    assert!(eval("name LIKE 'J%'", &ctx));
    assert!(eval("name LIKE 'Jane.D_e'", &ctx));
    assert!(!eval("name LIKE 'Jane'", &ctx));
    assert!(eval("name NOT LIKE 'x%'", &ctx));
    assert!(eval("email IS NULL AND phone IS NULL", &ctx));
    assert!(eval("name IS NOT NULL", &ctx));
}

#[test]
fn arithmetic_in_predicates() {
    let ctx = Context::new().set("price", 10).set("tax", 2);
    assert!(eval("price + tax * 5 = 20", &ctx));
    assert!(eval("-price < 0", &ctx));
}

#[test]
fn parse_tree_is_exposed() {
    let tree = SqlWhere::new().parse_tree("x IS NULL").unwrap();
    assert!(matches!(tree, SqlNode::IsNull { negated: false, .. }));
}

#[test]
fn syntax_errors() {
    let sql = SqlWhere::new();
    assert!(sql.parse("age BETWEEN 1").is_err());
    assert!(sql.parse("name LIKE 5").is_err());
    assert!(sql.parse("x IN (a, b)").is_err());
    let err = sql.parse("x = 'open").unwrap_err();
    assert_eq!(err.position(), Some(4));
}
