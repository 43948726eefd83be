use rulekit::{Expression, Frontend, MongoQuery, SqlWhere};

fn report(front_end: &str, input: &str, result: &rulekit::ValidationResult) {
    if result.is_valid() {
        println!("[{front_end}] {input:?} is valid");
        return;
    }
    for error in result.errors() {
        println!("[{front_end}] {input:?}: {error}");
        if let Some(context) = &error.context {
            println!("    near: {context}");
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulekit=debug".into()),
        )
        .init();

    let expr = Expression::new();
    for input in ["age >= 18", "age >= (18", "shout(name) == 1", ""] {
        report("expression", input, &expr.validate_with_errors(input));
    }

    let sql = SqlWhere::new();
    for input in ["x IS NOT NULL", "name LIKE 5"] {
        report("sql", input, &sql.validate_with_errors(input));
    }

    let mongo = MongoQuery::new();
    for input in [r#"{"a": {"$gt": 1}}"#, r#"{"a": 1,"#, r#"{"$where": "x", "b": 1}"#] {
        report("mongo", input, &mongo.validate_with_errors(input));
    }

    let result = expr.validate_with_errors("a >");
    println!(
        "{}",
        serde_json::to_string_pretty(&result).expect("validation results serialize")
    );
}
