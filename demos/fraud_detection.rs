//! Fraud detection example
//!
//! This example demonstrates:
//! - Scoring transactions without a model service (heuristic fallback)
//! - Velocity and location-change rules over a subject's history
//! - Alert escalation into a fraud case and the analyst workflow

use riskguard_core::RuleId;
use riskguard_sdk::{
    CaseStatus, FraudEngineBuilder, FraudPattern, PatternCondition, TransactionRequest,
};
use rust_decimal::Decimal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "riskguard_sdk=info,riskguard_runtime=info".into()),
        )
        .init();

    println!("=== Fraud Detection Example ===\n");

    let engine = FraudEngineBuilder::new()
        .with_high_risk_countries(vec!["NG".to_string()])
        .add_pattern(FraudPattern::new(
            "card_testing",
            "Card testing",
            vec![
                PatternCondition::AmountRange {
                    min: None,
                    max: Some(Decimal::from(5)),
                },
                PatternCondition::MerchantCategories {
                    categories: vec!["online".to_string()],
                },
            ],
        ))
        .enable_metrics(true)
        .build()
        .await?;

    println!("Fraud engine initialized\n");

    // Test Case 1: Normal transaction
    println!("--- Test Case 1: Normal Transaction ---");
    let response = engine
        .score(TransactionRequest::new("user456", Decimal::from(50)).with_country("US"))
        .await?;
    println!("Score: {:.2} ({:?})", response.fraud_score, response.risk_level);
    println!("Recommendation: {:?}", response.recommendation);
    println!("Processing Time: {:.2}ms\n", response.processing_time_ms);

    // Test Case 2: High-value transaction
    println!("--- Test Case 2: High-Value Transaction ---");
    let detailed = engine
        .score_detailed(TransactionRequest::new("user456", Decimal::from(60_000)))
        .await?;
    println!(
        "Score: {:.2} ({:?}) via {:?}",
        detailed.score.fraud_score, detailed.score.risk_level, detailed.score.source
    );
    for feature in &detailed.explanation.top_features {
        println!("  {} -> {:.2}", feature.feature, feature.importance);
    }
    for rule in &detailed.triggered_rules {
        println!("  Rule: {}", rule.message);
    }
    println!();

    // Test Case 3: Card testing burst
    println!("--- Test Case 3: Card Testing Burst ---");
    for _ in 0..11 {
        let processed = engine
            .process_transaction(
                TransactionRequest::new("user789", Decimal::from(2))
                    .with_merchant("merchant-42", "online"),
            )
            .await?;
        if processed
            .triggered_rules
            .iter()
            .any(|r| r.rule == RuleId::HighVelocity)
        {
            println!("Velocity triggered on {}", processed.reference);
            println!("Triggered Rules: {:?}", processed.triggered_rules);
            println!("Alert: {:?}", processed.alert_id);
        }
    }
    println!();

    // Test Case 4: Large cross-border transaction escalates to a case
    println!("--- Test Case 4: Cross-Border + High Value ---");
    engine
        .process_transaction(TransactionRequest::new("user321", Decimal::from(40)).with_country("US"))
        .await?;
    let processed = engine
        .process_transaction(
            TransactionRequest::new("user321", Decimal::from(75_000)).with_country("NG"),
        )
        .await?;
    println!("Status: {:?}", processed.status);
    println!("Triggered Rules: {}", processed.triggered_rules.len());

    if let Some(case_number) = &processed.case_number {
        println!("Case opened: {}", case_number);
        engine.assign_case(case_number, "analyst-1").await?;
        engine
            .add_case_note(case_number, "analyst-1", "Cardholder reached, travel not confirmed", true)
            .await?;
        let case = engine
            .update_case_status(
                case_number,
                CaseStatus::Confirmed,
                Some("Card blocked".to_string()),
                Some(Decimal::from(75_000)),
            )
            .await?;
        println!("Case status: {:?}", case.status);

        let view = engine.get_case(case_number).await?;
        println!("{}", serde_json::to_string_pretty(&view)?);
    }
    println!();

    // Print metrics
    if let Some(metrics) = engine.metrics() {
        println!("=== Metrics ===");
        for name in [
            "transactions_processed",
            "scorer_fallbacks",
            "alerts_created",
            "cases_opened",
        ] {
            println!("{}: {}", name, metrics.counter_value(name));
        }
    }

    Ok(())
}
