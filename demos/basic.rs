use rulekit::{Context, Expression, Frontend};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulekit=debug".into()),
        )
        .init();

    let expr = Expression::new();
    let rule = expr
        .parse_with_action(
            r#"user.age >= 18 and user.status == "active" and not user.banned"#,
            |ctx| println!("Welcome, {}!", ctx.get("user")),
        )
        .expect("failed to parse rule");

    println!("Canonical: {}", expr.serialize(&rule).expect("failed to serialize"));

    let ctx = Context::new()
        .set("user.age", 25_i64)
        .set("user.status", "active")
        .set("user.banned", false);

    match rule.execute(&ctx) {
        Ok(matched) => println!("Matched: {matched}"),
        Err(err) => println!("Evaluation failed: {err}"),
    }
}
