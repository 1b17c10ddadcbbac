mod common;

use chrono::Duration;

use edge_cipher::ai::{
    analyze_performance, get_recommendations, PerformanceInsightsInput,
    TradePlanningRecommendationsInput,
};
use edge_cipher::journal::{self, pnl, Journal, PerformanceStats, TradeStatus};
use edge_cipher::models::{Direction, Exit, StrategyStatus, Trade};
use edge_cipher::planning::{load_template, save_template, PlanWarning, TradePlan};
use edge_cipher::risk::{BehaviourSnapshot, GuardrailBreach, Guardrails};
use edge_cipher::strategies::{StatusFilter, StrategyBook};

use common::{fresh_store, utc, MockGenerator};

const INSIGHTS_JSON: &str = r#"{
    "summary": "Two winners and one loser on majors.",
    "strengths": "Lets winners run to target.",
    "weaknesses": "Stops are loose on shorts.",
    "riskTendencies": "Uses moderate leverage.",
    "habits": "Trades mornings only.",
    "recommendations": "Keep risk at 1% and journal every exit."
}"#;

#[tokio::test]
async fn journal_to_insights_pipeline() {
    let store = fresh_store("pipeline");
    let entered = utc("2024-03-04T09:30:00Z");

    // 1. Record trades and exits
    let mut journal = Journal::open(store.clone());
    let btc = journal
        .add(
            Trade::new("BTC/USDT", Direction::Long, 60000.0, 0.5)
                .with_entry_date(entered)
                .with_leverage(5.0)
                .with_commission(10.0),
        )
        .unwrap()
        .id
        .clone()
        .unwrap();
    journal
        .add_exit(&btc, Exit::new(entered + Duration::hours(2), 61000.0, 0.25))
        .unwrap();
    let t = journal
        .add_exit(&btc, Exit::new(entered + Duration::hours(3), 62000.0, 0.25))
        .unwrap();

    let p = pnl::compute(t);
    assert_eq!(p.status, TradeStatus::Closed);
    // 0.25 * 1000 + 0.25 * 2000 - 10
    assert!((p.realized_pnl - 740.0).abs() < 1e-9);
    assert!((p.avg_exit_price.unwrap() - 61500.0).abs() < 1e-9);

    let eth = journal
        .add(
            Trade::new("ETH/USDT", Direction::Short, 3500.0, 2.0)
                .with_entry_date(entered + Duration::days(1)),
        )
        .unwrap()
        .id
        .clone()
        .unwrap();
    journal
        .add_exit(
            &eth,
            Exit::new(entered + Duration::days(1) + Duration::hours(1), 3550.0, 2.0),
        )
        .unwrap();

    // Too much exit size is rejected and nothing changes
    assert!(journal
        .add_exit(&eth, Exit::new(entered + Duration::days(2), 3400.0, 0.1))
        .is_err());

    // 2. Survives a reopen
    let journal = Journal::open(store.clone());
    assert_eq!(journal.len(), 2);
    assert_eq!(journal.trades()[0].symbol, "ETH/USDT");

    let stats = PerformanceStats::from_trades(journal.trades());
    assert_eq!(stats.closed_trades, 2);
    assert_eq!(stats.wins, 1);
    assert_eq!(stats.total_pnl, 640.0);

    // 3. History feeds the insights flow
    let history = journal::history_summary(journal.trades());
    assert!(history.lines().next().unwrap().contains("BTC/USDT"));

    let generator = MockGenerator::new(vec![Ok(INSIGHTS_JSON.to_string())]);
    let outcome = analyze_performance(
        &generator,
        &PerformanceInsightsInput {
            trading_history: history.clone(),
            risk_tolerance: "moderate".to_string(),
            investment_goals: "Grow the account 20% this year".to_string(),
        },
    )
    .await;

    assert_eq!(outcome.message, "Successfully generated insights.");
    assert_eq!(outcome.result.unwrap().habits, "Trades mornings only.");
    let prompts = generator.prompts.lock().unwrap();
    assert!(prompts[0].contains(&history));
}

#[tokio::test]
async fn recommendations_report_failures_and_bad_forms() {
    let generator = MockGenerator::new(vec![
        Err(500),
        Ok("I cannot answer that.".to_string()),
        Ok(r#"{"recommendations": "Breakout entries on the 4h chart."}"#.to_string()),
    ]);
    let input = TradePlanningRecommendationsInput {
        user_profile: "Part-time swing trader".to_string(),
        historical_data: "Closed 12 trades, win rate 58%".to_string(),
    };

    let failed = get_recommendations(&generator, &input).await;
    assert_eq!(failed.message, "An error occurred: API error 500: mock failure");

    let garbled = get_recommendations(&generator, &input).await;
    assert!(garbled.message.starts_with("An error occurred: "));
    assert!(garbled.result.is_none());

    let ok = get_recommendations(&generator, &input).await;
    assert_eq!(ok.message, "Successfully generated recommendations.");

    let short = TradePlanningRecommendationsInput {
        user_profile: "short".to_string(),
        historical_data: "".to_string(),
    };
    let invalid = get_recommendations(&generator, &short).await;
    assert_eq!(invalid.message, "Please check the form for errors.");
    assert_eq!(invalid.errors.unwrap().fields().len(), 2);
    assert_eq!(generator.prompt_count(), 3);
}

#[test]
fn plan_template_and_guardrails() {
    let store = fresh_store("plan");

    let plan = TradePlan::new(25000.0, 1.0, 3500.0, 3450.0, 3650.0);
    let calc = plan.calculate().unwrap();
    assert_eq!(calc.risk_amount, 250.0);
    assert_eq!(calc.position_size, 5.0);
    assert_eq!(calc.risk_reward_ratio, 3.0);
    assert!(plan.warnings().is_empty());

    let risky = TradePlan::new(25000.0, 3.0, 3500.0, 3495.0, 3650.0).with_symbol("BTC/USDT");
    assert!(risky.warnings().contains(&PlanWarning::TightStop));
    save_template(&store, &risky).unwrap();
    assert_eq!(load_template(&store), risky);

    let guardrails = Guardrails::default();
    assert_eq!(
        guardrails.check_plan(&risky),
        Some(GuardrailBreach::RiskPerTrade {
            planned: 3.0,
            limit: 2.0
        })
    );

    // Five open positions on one day trips the concurrency limit only
    let now = utc("2024-03-04T18:00:00Z");
    let trades: Vec<Trade> = (0..5)
        .map(|i| {
            Trade::new("SOL/USDT", Direction::Long, 150.0, 1.0)
                .with_entry_date(now - Duration::hours(i + 1))
        })
        .collect();
    let snapshot = BehaviourSnapshot::compute(&trades, 25000.0, chrono_tz::Tz::UTC, now);
    assert_eq!(snapshot.trades_today, 5);
    assert_eq!(
        guardrails.check(&snapshot),
        vec![GuardrailBreach::ConcurrentPositions { count: 5, limit: 4 }]
    );
}

#[test]
fn strategy_book_round_trip() {
    let store = fresh_store("strategies");

    let mut book = StrategyBook::open(store.clone());
    assert_eq!(book.all().len(), 4);
    let running = book.filter(StatusFilter::Only(StrategyStatus::Running)).len();

    assert_eq!(book.toggle_status("strat-1").unwrap(), StrategyStatus::Paused);
    book.save_notes("strat-1", "paused for FOMC").unwrap();

    let book = StrategyBook::open(store);
    assert_eq!(
        book.filter(StatusFilter::Only(StrategyStatus::Running)).len(),
        running - 1
    );
    assert_eq!(book.get("strat-1").unwrap().notes, "paused for FOMC");
}
