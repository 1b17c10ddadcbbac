use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use edge_cipher::ai::{
    analyze_performance, get_recommendations, FlowOutcome, HttpTextGenerator,
    PerformanceInsights, PerformanceInsightsInput, TradePlanningRecommendations,
    TradePlanningRecommendationsInput,
};
use edge_cipher::config::Config;
use edge_cipher::journal::{self, pnl, Journal, PerformanceStats};
use edge_cipher::models::{Direction, Exit, Trade};
use edge_cipher::planning::calculator::{ASSUMED_LEVERAGE, MAX_RISK_FRACTION, MIN_STOP_DISTANCE};
use edge_cipher::planning::{format_usd, load_template, pre_trade_checklist, save_template, TradePlan};
use edge_cipher::risk::{BehaviourSnapshot, Guardrails, RiskProfile};
use edge_cipher::settings::Settings;
use edge_cipher::store::LocalStore;
use edge_cipher::strategies::{StatusFilter, StrategyBook};

const USAGE: &str = "usage: edge-cipher <command>

  plan [balance risk% entry stop target]
  template save <balance> <risk%> <entry> <stop> <target> [symbol]
  checklist <risk%>
  journal add <symbol> <long|short> <entry> <qty> [leverage] [commission]
  journal exit <id> <price> <qty>
  journal list | journal stats
  risk [profile <conservative|moderate|aggressive>]
  risk guardrails <maxRiskPerTrade|maxDailyLoss|maxTradesPerDay|maxConcurrentPositions> <value>
  strategies [all|running|paused|draft] | strategies toggle <id>
  settings [help <on|off>] [onboarded]
  insights <risk_tolerance> <investment goals...>
  recommend <user profile...>";

const RULE: &str = "  ───────────────────────────────────";

fn num(args: &[String], i: usize, name: &str) -> Result<f64> {
    let raw = args.get(i).ok_or_else(|| anyhow!("missing <{}>", name))?;
    raw.parse()
        .with_context(|| format!("<{}> must be a number, got '{}'", name, raw))
}

fn rest(args: &[String], from: usize) -> String {
    args.get(from..).map(|a| a.join(" ")).unwrap_or_default()
}

pub struct Cli {
    cfg: Config,
    store: LocalStore,
}

impl Cli {
    pub fn new(cfg: Config) -> Self {
        let store = LocalStore::new(cfg.data_path());
        Self { cfg, store }
    }

    pub async fn run(&self, args: &[String]) -> Result<()> {
        let cmd = args.first().map(String::as_str).unwrap_or("plan");
        let args = args.get(1..).unwrap_or(&[]);

        match cmd {
            "plan" => self.plan(args),
            "template" => self.template(args),
            "checklist" => self.checklist(args),
            "journal" => self.journal(args),
            "risk" => self.risk(args),
            "strategies" => self.strategies(args),
            "settings" => self.settings(args),
            "insights" => self.insights(args).await,
            "recommend" => self.recommend(args).await,
            "help" | "-h" | "--help" => {
                println!("{}", USAGE);
                Ok(())
            }
            other => bail!("unknown command '{}'\n\n{}", other, USAGE),
        }
    }

    fn plan_from_args(&self, args: &[String]) -> Result<TradePlan> {
        Ok(TradePlan::new(
            num(args, 0, "balance")?,
            num(args, 1, "risk%")?,
            num(args, 2, "entry")?,
            num(args, 3, "stop")?,
            num(args, 4, "target")?,
        ))
    }

    fn plan(&self, args: &[String]) -> Result<()> {
        let plan = if args.is_empty() {
            load_template(&self.store)
        } else {
            self.plan_from_args(args)?
        };
        let settings = Settings::load(&self.store);

        println!("\n{}", "=".repeat(50));
        println!("  TRADE PLAN  {}", plan.symbol);
        println!("{}", "=".repeat(50));
        println!("  Balance:     {}", format_usd(plan.account_balance));
        println!("  Risk:        {}%", plan.risk_percent);
        println!(
            "  Entry:       {:.2}   Stop: {:.2}   Target: {:.2}",
            plan.entry, plan.stop_loss, plan.take_profit
        );
        println!();

        let Some(calc) = plan.calculate() else {
            println!("  Fill in balance, risk, entry, stop and target to see the plan.");
            return Ok(());
        };

        println!("  SUMMARY ({})", calc.direction);
        println!("{}", RULE);
        println!("  Risk Amount:   {}", format_usd(calc.risk_amount));
        println!("  Risk / Unit:   {}", format_usd(calc.risk_per_unit));
        println!(
            "  Position Size: {:.4} {}",
            calc.position_size,
            plan.base_asset()
        );
        println!("  Trade Value:   {}", format_usd(calc.total_trade_value));
        println!(
            "  Margin (x{}):  {}",
            ASSUMED_LEVERAGE,
            format_usd(calc.margin_requirement)
        );
        println!("  Profit:        {}", format_usd(calc.potential_profit));
        println!("  R:R:           1:{:.2}", calc.risk_reward_ratio);

        if settings.proactive_help {
            println!();
            println!(
                "  Warnings fire above {:.0}% of balance at risk or a stop within {:.1}% of entry.",
                MAX_RISK_FRACTION * 100.0,
                MIN_STOP_DISTANCE * 100.0
            );
        }

        let warnings = plan.warnings();
        if !warnings.is_empty() {
            println!();
            println!("  WARNINGS");
            println!("{}", RULE);
            for w in &warnings {
                println!("  ! {}", w);
            }
        }

        if let Some(breach) = Guardrails::load(&self.store).check_plan(&plan) {
            println!();
            println!("  ! {}", breach);
        }
        Ok(())
    }

    fn template(&self, args: &[String]) -> Result<()> {
        if args.first().map(String::as_str) != Some("save") {
            bail!("usage: template save <balance> <risk%> <entry> <stop> <target> [symbol]");
        }
        let args = &args[1..];
        let mut plan = self.plan_from_args(args)?;
        if let Some(symbol) = args.get(5) {
            plan = plan.with_symbol(symbol);
        }
        plan.validate()?;
        save_template(&self.store, &plan)?;
        println!("Template saved: your plan has been saved as a template.");
        Ok(())
    }

    fn checklist(&self, args: &[String]) -> Result<()> {
        let risk = match args.first() {
            Some(_) => num(args, 0, "risk%")?,
            None => load_template(&self.store).risk_percent,
        };
        println!("\n  PRE-TRADE CHECKLIST ({}% risk)", risk);
        println!("{}", RULE);
        for item in pre_trade_checklist(risk) {
            println!("  - {}", item);
        }
        Ok(())
    }

    fn journal(&self, args: &[String]) -> Result<()> {
        let mut journal = Journal::open(self.store.clone());
        let sub = args.first().map(String::as_str).unwrap_or("list");
        let args = args.get(1..).unwrap_or(&[]);

        match sub {
            "add" => {
                let symbol = args.first().ok_or_else(|| anyhow!("missing <symbol>"))?;
                let dir = args.get(1).ok_or_else(|| anyhow!("missing <long|short>"))?;
                let direction = Direction::from_str_loose(dir)
                    .ok_or_else(|| anyhow!("direction must be long or short, got '{}'", dir))?;
                let mut trade = Trade::new(
                    symbol,
                    direction,
                    num(args, 2, "entry")?,
                    num(args, 3, "qty")?,
                );
                if args.len() > 4 {
                    trade = trade.with_leverage(num(args, 4, "leverage")?);
                }
                if args.len() > 5 {
                    trade = trade.with_commission(num(args, 5, "commission")?);
                }
                let added = journal.add(trade)?;
                println!("Trade saved: {}", added.id_str());
            }
            "exit" => {
                let id = args.first().ok_or_else(|| anyhow!("missing <id>"))?;
                let exit = Exit::new(Utc::now(), num(args, 1, "price")?, num(args, 2, "qty")?);
                let trade = journal.add_exit(id, exit)?;
                let p = pnl::compute(trade);
                println!(
                    "{} is {} with realised PnL {}",
                    trade.id_str(),
                    p.status.as_str(),
                    format_usd(p.realized_pnl)
                );
            }
            "list" => {
                if journal.is_empty() {
                    println!("No trades recorded yet.");
                }
                for t in journal.recent(20) {
                    let p = pnl::compute(t);
                    println!(
                        "  {:<22} {} {:<5} {:>10} @ {:>10.2} x{:<4} {:<8} {}",
                        t.id_str(),
                        t.entry_date.format("%Y-%m-%d"),
                        t.direction,
                        t.quantity,
                        t.entry_price,
                        t.leverage,
                        p.status.as_str(),
                        format_usd(p.realized_pnl)
                    );
                }
            }
            "stats" => print_stats(&PerformanceStats::from_trades(journal.trades())),
            other => bail!("unknown journal command '{}'", other),
        }
        Ok(())
    }

    fn risk(&self, args: &[String]) -> Result<()> {
        if args.first().map(String::as_str) == Some("profile") {
            let name = args.get(1).ok_or_else(|| anyhow!("missing <profile>"))?;
            let profile = RiskProfile::from_str_loose(name)
                .ok_or_else(|| anyhow!("unknown risk profile '{}'", name))?;
            profile.save(&self.store)?;
            println!("Your risk profile has been set to {}.", profile);
            return Ok(());
        }
        if args.first().map(String::as_str) == Some("guardrails") {
            let field = args.get(1).ok_or_else(|| anyhow!("missing <field>"))?;
            let value = args.get(2).ok_or_else(|| anyhow!("missing <value>"))?;
            let mut guardrails = Guardrails::load(&self.store);
            guardrails.set(field, value)?;
            guardrails.save(&self.store)?;
            println!("Guardrails updated.");
            for hint in guardrails.advisories() {
                println!("  ! {}", hint);
            }
            return Ok(());
        }

        let profile = RiskProfile::load(&self.store);
        let guardrails = Guardrails::load(&self.store);
        let journal = Journal::open(self.store.clone());
        let snapshot = BehaviourSnapshot::compute(
            journal.trades(),
            self.cfg.account_balance,
            self.cfg.tz(),
            Utc::now(),
        );

        println!("\n  RISK PROFILE: {}", profile);
        println!("{}", RULE);
        println!("  Drawdown:      {}", profile.drawdown());
        println!("  Risk / Trade:  {}", profile.risk_per_trade());
        println!("  Leverage:      {}", profile.leverage());
        println!();
        println!("  GUARDRAILS");
        println!("{}", RULE);
        println!("  Max Risk / Trade:  {}%", guardrails.max_risk_per_trade);
        println!("  Max Daily Loss:    {}%", guardrails.max_daily_loss);
        println!("  Max Trades / Day:  {}", guardrails.max_trades_per_day);
        println!("  Max Open:          {}", guardrails.max_concurrent_positions);
        for hint in guardrails.advisories() {
            println!("  ! {}", hint);
        }
        println!();
        println!("  TODAY ({}, {})", snapshot.date, self.cfg.tz());
        println!("{}", RULE);
        println!("  Trades:        {}", snapshot.trades_today);
        println!(
            "  Realised PnL:  {} ({:+.2}%)",
            format_usd(snapshot.realized_pnl_today),
            snapshot.daily_pnl_percent
        );
        println!("  Open:          {}", snapshot.open_positions);

        let mut breaches = guardrails.check(&snapshot);
        breaches.extend(guardrails.check_plan(&load_template(&self.store)));
        if !breaches.is_empty() {
            println!();
            for b in &breaches {
                println!("  ! {}", b);
            }
        }
        Ok(())
    }

    fn strategies(&self, args: &[String]) -> Result<()> {
        let mut book = StrategyBook::open(self.store.clone());

        if args.first().map(String::as_str) == Some("toggle") {
            let id = args.get(1).ok_or_else(|| anyhow!("missing <id>"))?;
            let status = book.toggle_status(id)?;
            println!("{} is now {}", id, status);
            return Ok(());
        }

        let filter = match args.first() {
            Some(raw) => StatusFilter::from_str_loose(raw)
                .ok_or_else(|| anyhow!("unknown status filter '{}'", raw))?,
            None => StatusFilter::All,
        };
        let shown = book.filter(filter);
        println!("\n  STRATEGIES ({}: {})", filter, shown.len());
        println!("{}", RULE);
        for s in shown {
            println!(
                "  {:<8} {:<24} {:<8} {:<15} {:>4} {:>4} trades  {:>5.1}% win  {:>12}  [{}]",
                s.id.as_deref().unwrap_or("-"),
                s.name,
                s.market,
                s.strategy_type,
                s.timeframe,
                s.trades_30d,
                s.win_rate,
                format_usd(s.net_pnl),
                s.status
            );
        }
        Ok(())
    }

    fn settings(&self, args: &[String]) -> Result<()> {
        let mut settings = Settings::load(&self.store);
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "help" => {
                    let value = match args.get(i + 1).map(String::as_str) {
                        Some("on") => true,
                        Some("off") => false,
                        _ => bail!("usage: settings help <on|off>"),
                    };
                    settings.set_proactive_help(&self.store, value)?;
                    i += 2;
                }
                "onboarded" => {
                    settings.set_onboarding_complete(&self.store, true)?;
                    i += 1;
                }
                other => bail!("unknown setting '{}'", other),
            }
        }
        println!("  Proactive help:       {}", settings.proactive_help);
        println!("  Onboarding complete:  {}", settings.onboarding_complete);
        Ok(())
    }

    async fn insights(&self, args: &[String]) -> Result<()> {
        let journal = Journal::open(self.store.clone());
        let input = PerformanceInsightsInput {
            trading_history: journal::history_summary(journal.trades()),
            risk_tolerance: args.first().cloned().unwrap_or_default(),
            investment_goals: rest(args, 1),
        };
        if let Err(errors) = input.validate() {
            print_outcome(&FlowOutcome::<PerformanceInsights>::invalid(errors));
            return Ok(());
        }
        let generator = HttpTextGenerator::new(&self.cfg)?;
        info!("Requesting performance insights from {}", generator.model());

        let outcome = analyze_performance(&generator, &input).await;
        print_outcome(&outcome);
        if let Some(r) = outcome.result {
            for (title, body) in [
                ("SUMMARY", &r.summary),
                ("STRENGTHS", &r.strengths),
                ("WEAKNESSES", &r.weaknesses),
                ("RISK TENDENCIES", &r.risk_tendencies),
                ("HABITS", &r.habits),
                ("RECOMMENDATIONS", &r.recommendations),
            ] {
                println!("\n  {}", title);
                println!("{}", RULE);
                println!("  {}", body);
            }
        }
        Ok(())
    }

    async fn recommend(&self, args: &[String]) -> Result<()> {
        let journal = Journal::open(self.store.clone());
        let history = journal::history_summary(journal.trades());
        if history.is_empty() {
            warn!("Journal is empty; recommendations will have no history to work from");
        }
        let input = TradePlanningRecommendationsInput {
            user_profile: rest(args, 0),
            historical_data: history,
        };
        if let Err(errors) = input.validate() {
            print_outcome(&FlowOutcome::<TradePlanningRecommendations>::invalid(errors));
            return Ok(());
        }
        let generator = HttpTextGenerator::new(&self.cfg)?;
        info!("Requesting trade planning recommendations from {}", generator.model());

        let outcome = get_recommendations(&generator, &input).await;
        print_outcome(&outcome);
        if let Some(r) = outcome.result {
            println!("\n{}", r.recommendations);
        }
        Ok(())
    }
}

fn print_outcome<T>(outcome: &FlowOutcome<T>) {
    println!("{}", outcome.message);
    if let Some(errors) = &outcome.errors {
        for (field, msgs) in errors.fields() {
            println!("  {}: {}", field, msgs.join(", "));
        }
    }
}

fn print_stats(s: &PerformanceStats) {
    println!("\n{}", "=".repeat(50));
    println!("  JOURNAL PERFORMANCE");
    println!("{}", "=".repeat(50));
    println!("  Closed:        {}  (open: {})", s.closed_trades, s.open_trades);
    println!("  Wins/Losses:   {}/{}", s.wins, s.losses);
    println!("  Win Rate:      {:.1}%", s.win_rate);
    println!("  Total PnL:     {}", format_usd(s.total_pnl));
    println!("  Avg Win:       {}", format_usd(s.avg_win));
    println!("  Avg Loss:      {}", format_usd(s.avg_loss));
    println!("  Best:          {}", format_usd(s.best_trade));
    println!("  Worst:         {}", format_usd(s.worst_trade));
    match s.profit_factor {
        Some(pf) => println!("  Profit Factor: {:.2}", pf),
        None => println!("  Profit Factor: -"),
    }
    println!("  Expectancy:    {}", format_usd(s.expectancy));

    for (title, buckets) in [("BY SYMBOL", &s.by_symbol), ("BY DIRECTION", &s.by_direction)] {
        if buckets.is_empty() {
            continue;
        }
        println!();
        println!("  {}", title);
        println!("{}", RULE);
        for b in buckets.values() {
            println!(
                "  {:<12} {:>3} trades  {:>5.1}% win  {:>12}",
                b.value,
                b.total,
                b.win_rate * 100.0,
                format_usd(b.total_pnl)
            );
        }
    }
}
