use rulekit::{Context, Expression, Frontend, MongoQuery, SqlWhere};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulekit=info".into()),
        )
        .init();

    let expr = Expression::new();
    let sql = SqlWhere::new();
    let mongo = MongoQuery::new();

    let ctx = Context::new()
        .set("age", 34_i64)
        .set("status", "active")
        .set("name", "Jane");

    let rules = [
        ("sql", sql.parse("age BETWEEN 18 AND 65 AND name LIKE 'J%'")),
        (
            "mongo",
            mongo.parse(r#"{"age": {"$gte": 18}, "status": {"$in": ["active", "trial"]}}"#),
        ),
        ("expression", expr.parse(r#"age % 2 == 0 and name != "Bob""#)),
    ];

    for (source, rule) in rules {
        let rule = rule.expect("failed to parse rule");
        println!("[{source}] matched: {:?}", rule.evaluate(&ctx));
        match expr.serialize(&rule) {
            Ok(text) => println!("  expression: {text}"),
            Err(err) => println!("  expression: {err}"),
        }
        match sql.serialize(&rule) {
            Ok(text) => println!("  sql:        {text}"),
            Err(err) => println!("  sql:        {err}"),
        }
        match mongo.serialize(&rule) {
            Ok(doc) => println!("  mongo:      {doc}"),
            Err(err) => println!("  mongo:      {err}"),
        }
    }
}
