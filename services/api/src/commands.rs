use crate::infra::parse_strategy;
use clap::Args;
use praxis::assistant::{Assistant, AssistantReply};
use praxis::config::{AppConfig, ModelConfig};
use praxis::data::{write_scored_csv, CsvDataSource};
use praxis::error::AppError;
use praxis::evaluation::MANUAL_BASELINE_SECS;
use praxis::model::ChatCompletionsClient;
use praxis::planner::{JobPlan, JobPlanner};
use praxis::scoring::Strategy;
use praxis::telemetry;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// BI dataset export to score
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Destination for the scored CSV
    #[arg(long, default_value = "data/output.csv")]
    pub(crate) output: PathBuf,
    /// Weighting strategy (defaults to PRAXIS_STRATEGY or balanced)
    #[arg(long, value_parser = parse_strategy)]
    pub(crate) strategy: Option<Strategy>,
}

#[derive(Args, Debug)]
pub(crate) struct AskArgs {
    /// BI dataset export the assistant reads from
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Weighting strategy (defaults to PRAXIS_STRATEGY or balanced)
    #[arg(long, value_parser = parse_strategy)]
    pub(crate) strategy: Option<Strategy>,
    /// Questions answered in order within a single conversation
    #[arg(required = true)]
    pub(crate) queries: Vec<String>,
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let strategy = args.strategy.unwrap_or(config.strategy);
    info!(%strategy, csv = %args.csv.display(), "starting job planning");

    let source = CsvDataSource::new(&args.csv);
    let mut planner = JobPlanner::new(strategy);
    let plan = planner.plan(&source)?;

    log_plan(&plan);

    if let Some(parent) = args.output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(&args.output)?);
    let written = write_scored_csv(writer, &plan.scored)?;
    info!(records = written, output = %args.output.display(), "exported scored operations");

    log_timing_comparison(&plan);
    if let Some(summary) = planner.tracker().performance_summary() {
        info!(
            phases = summary.total_queries,
            avg_secs = summary.avg_response_secs,
            min_secs = summary.min_response_secs,
            max_secs = summary.max_response_secs,
            "session performance"
        );
    }

    println!(
        "Scored {} vessels ({} rejected) with the {} strategy; wrote {}",
        plan.scored.len(),
        plan.rejected.len(),
        plan.strategy,
        args.output.display()
    );
    println!("Top priorities:");
    for (position, entry) in plan.priorities.iter().enumerate() {
        println!(
            "  {:>2}. {:<6} {:<24} DIS {:>6.2}",
            position + 1,
            entry.row.operator,
            entry.row.vessel,
            entry.composite
        );
    }

    Ok(())
}

fn log_plan(plan: &JobPlan) {
    let count = plan.scored.len().max(1) as f64;
    let avg_time = plan.scored.iter().map(|e| e.scores.time_efficiency).sum::<f64>() / count;
    let avg_cost = plan.scored.iter().map(|e| e.scores.cost_efficiency).sum::<f64>() / count;

    info!(
        avg_dis = ?plan.summary.avg_composite,
        avg_time_efficiency = avg_time,
        avg_cost_efficiency = avg_cost,
        "scoring summary"
    );
    for (position, recommendation) in plan.recommendations.iter().enumerate() {
        info!(number = position + 1, "{recommendation}");
    }
}

fn log_timing_comparison(plan: &JobPlan) {
    let timings = plan.timings;
    info!(
        fetch_secs = timings.fetch.as_secs_f64(),
        analysis_secs = timings.analysis.as_secs_f64(),
        recommendation_secs = timings.recommendations.as_secs_f64(),
        total_secs = timings.total().as_secs_f64(),
        manual_secs = MANUAL_BASELINE_SECS,
        "processing time vs manual estimate"
    );
    match timings.speedup_vs_manual() {
        Some(speedup) => info!(
            speedup,
            seconds_saved = timings.seconds_saved(),
            "faster than manual dashboard review"
        ),
        None => info!("run completed too quickly to measure a speedup"),
    }
}

pub(crate) async fn run_ask(args: AskArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    if !config.model.is_configured() {
        warn!("MODEL_ENDPOINT is not set; answers will use the fallback text");
    }

    let strategy = args.strategy.unwrap_or(config.strategy);
    let source = CsvDataSource::new(&args.csv);
    let model_config = config.model;
    let queries = args.queries;

    // The blocking model client must be built, used and dropped off the async runtime.
    tokio::task::spawn_blocking(move || ask_session(source, model_config, strategy, &queries))
        .await
        .map_err(|err| AppError::Task(err.to_string()))?
}

fn ask_session(
    source: CsvDataSource,
    model_config: ModelConfig,
    strategy: Strategy,
    queries: &[String],
) -> Result<(), AppError> {
    let model = ChatCompletionsClient::new(model_config)?;
    let mut assistant = Assistant::new(source, model, strategy);

    for query in queries {
        println!("> {query}");
        let reply = assistant.respond(query)?;
        print_reply(&reply);
    }

    let metrics = assistant.tracker().real_time_metrics();
    println!(
        "Session: {} queries | last-10 avg {:.2}s | ~{:.1} minutes saved",
        metrics.queries_this_session,
        metrics.last_10_avg_response_secs,
        metrics.estimated_minutes_saved
    );

    Ok(())
}

fn print_reply(reply: &AssistantReply) {
    println!("{}", reply.response.trim_end());
    let speedup = reply
        .speedup_vs_manual
        .map(|value| format!("{value:.0}x"))
        .unwrap_or_else(|| "n/a".to_string());
    println!(
        "[{} | {:.2}s | quality {} | speedup {}]\n",
        reply.intent.kind,
        reply.latency.as_secs_f64(),
        reply.quality.quality_score,
        speedup
    );
}
