use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn, Level};

use os_sched_sim::contention::{simulate_contention, summarize, ContentionMode};
use os_sched_sim::io::{self, LineDiagnostic, Loaded};
use os_sched_sim::models::{Process, SyncBlock};
use os_sched_sim::scheduler::{compare, Algorithm, NonPreemptivePolicy, ScheduleKpi, Scheduler};
use os_sched_sim::workload::WorkloadGenerator;

/// os-sched-sim: CPU scheduling and resource contention simulator
///
/// Runs FIFO, SJF, Priority, Round Robin and SRT over a process file,
/// compares them by average waiting time, and replays resource access
/// logs under mutex or semaphore semantics.
#[derive(Debug, Parser)]
#[command(name = "os-sched-sim", version)]
struct Opts {
    /// Enable verbose output. Specify multiple times to increase verbosity.
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one scheduling algorithm and print per-process statistics
    Schedule {
        /// Process file (PID,BurstTime,ArrivalTime,Priority)
        #[arg(short = 'p', long)]
        processes: PathBuf,

        /// Algorithm to run
        #[arg(short = 'a', long, value_enum)]
        algorithm: AlgorithmArg,

        /// Round Robin quantum in cycles
        #[arg(short = 'q', long, default_value_t = 2)]
        quantum: i64,

        /// How SJF and Priority pick among pending processes
        #[arg(long, value_enum, default_value_t = PolicyArg::Upfront)]
        policy: PolicyArg,

        /// Write the statistics report (CSV) here
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Run every algorithm and rank them by average waiting time
    Compare {
        /// Process file (PID,BurstTime,ArrivalTime,Priority)
        #[arg(short = 'p', long)]
        processes: PathBuf,

        /// Round Robin quantum in cycles
        #[arg(short = 'q', long, default_value_t = 2)]
        quantum: i64,
    },

    /// Replay an action log against shared resources
    Contention {
        /// Process file (PID,BurstTime,ArrivalTime,Priority)
        #[arg(short = 'p', long)]
        processes: PathBuf,

        /// Resource file (Name,Capacity)
        #[arg(short = 'r', long)]
        resources: PathBuf,

        /// Action file (PID,ACTION,Resource,Cycle)
        #[arg(short = 'A', long)]
        actions: PathBuf,

        /// Treat every resource as a mutex regardless of capacity
        #[arg(long)]
        mutex: bool,

        /// Write the WAIT/ACCESS timeline (CSV) here
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Generate a random process file
    Generate {
        /// Number of processes
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Largest burst time
        #[arg(long, default_value_t = 10)]
        max_burst: i64,

        /// Latest arrival time
        #[arg(long, default_value_t = 10)]
        max_arrival: i64,

        /// Largest priority number
        #[arg(long, default_value_t = 5)]
        max_priority: i32,

        /// Write the process file here instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlgorithmArg {
    Fifo,
    Sjf,
    Priority,
    Rr,
    Srt,
}

impl AlgorithmArg {
    fn with_quantum(self, quantum: i64) -> Algorithm {
        match self {
            AlgorithmArg::Fifo => Algorithm::Fifo,
            AlgorithmArg::Sjf => Algorithm::ShortestJobFirst,
            AlgorithmArg::Priority => Algorithm::Priority,
            AlgorithmArg::Rr => Algorithm::RoundRobin { quantum },
            AlgorithmArg::Srt => Algorithm::ShortestRemainingTime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Upfront,
    ArrivalGated,
}

impl From<PolicyArg> for NonPreemptivePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Upfront => NonPreemptivePolicy::UpfrontSort,
            PolicyArg::ArrivalGated => NonPreemptivePolicy::ArrivalGated,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    if let Err(e) = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("failed to init logger: {}", e);
    }
}

fn report_diagnostics(path: &Path, diagnostics: &[LineDiagnostic]) {
    for d in diagnostics {
        warn!("{}:{}: {}", path.display(), d.line, d.error);
    }
}

fn load_processes(path: &Path) -> Result<Vec<Process>> {
    let Loaded {
        records,
        diagnostics,
    } = io::load_processes(path)?;
    report_diagnostics(path, &diagnostics);
    if records.is_empty() {
        bail!("{}: no valid processes", path.display());
    }
    info!(count = records.len(), "loaded processes from {}", path.display());
    Ok(records)
}

fn print_processes(processes: &[Process]) {
    println!(
        "{:<8} {:>6} {:>8} {:>8} {:>6} {:>10} {:>7} {:>10}",
        "PID", "Burst", "Arrival", "Priority", "Start", "Completion", "Waiting", "Turnaround"
    );
    let cell = |v: Option<i64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
    for p in processes {
        println!(
            "{:<8} {:>6} {:>8} {:>8} {:>6} {:>10} {:>7} {:>10}",
            p.pid,
            p.burst_time,
            p.arrival_time,
            p.priority,
            cell(p.start_time),
            cell(p.completion_time),
            cell(p.waiting_time),
            cell(p.turnaround_time)
        );
    }
}

fn print_kpi(kpi: &ScheduleKpi) {
    println!();
    println!("Average waiting time:    {:.2}", kpi.avg_waiting_time);
    println!("Average turnaround time: {:.2}", kpi.avg_turnaround_time);
    println!("Average response time:   {:.2}", kpi.avg_response_time);
    println!("Makespan:                {}", kpi.makespan);
    println!("CPU utilization:         {:.1}%", kpi.cpu_utilization * 100.0);
    println!("Throughput:              {:.3} proc/cycle", kpi.throughput);
}

fn print_timeline(timeline: &[SyncBlock]) {
    println!(
        "{:<8} {:<10} {:<6} {:>6} {:>8} {:<6}",
        "PID", "Resource", "Action", "Start", "Duration", "State"
    );
    for b in timeline {
        println!(
            "{:<8} {:<10} {:<6} {:>6} {:>8} {:<6}",
            b.pid,
            b.resource,
            b.kind.as_str(),
            b.start,
            b.duration,
            b.state_label()
        );
    }
}

fn run_schedule(
    processes: &Path,
    algorithm: Algorithm,
    policy: NonPreemptivePolicy,
    output: Option<&Path>,
) -> Result<()> {
    let processes = load_processes(processes)?;
    let run = Scheduler::new(algorithm)
        .with_policy(policy)
        .run(&processes)
        .with_context(|| format!("{} failed", algorithm))?;

    println!("{}", algorithm);
    print_processes(&run.processes);
    print_kpi(&ScheduleKpi::calculate(&run));

    if let Some(path) = output {
        io::save(path, |out| io::write_report(out, &run.processes))?;
        info!("report written to {}", path.display());
    }
    Ok(())
}

fn run_compare(processes: &Path, quantum: i64) -> Result<()> {
    let processes = load_processes(processes)?;
    let comparison = compare(&processes, &Algorithm::all(quantum));

    println!(
        "{:<24} {:>12} {:>12} {:>10} {:>8}",
        "Algorithm", "Avg waiting", "Avg turnar.", "Makespan", "CPU %"
    );
    for r in &comparison.results {
        println!(
            "{:<24} {:>12.2} {:>12.2} {:>10} {:>8.1}",
            r.algorithm.to_string(),
            r.average_waiting_time,
            r.kpi.avg_turnaround_time,
            r.kpi.makespan,
            r.kpi.cpu_utilization * 100.0
        );
    }
    for (algorithm, reason) in &comparison.failures {
        println!("{:<24} failed: {}", algorithm.to_string(), reason);
    }

    match comparison.best() {
        Some(best) => println!(
            "\nBest: {} (average waiting time {:.2})",
            best.algorithm, best.average_waiting_time
        ),
        None => bail!("no algorithm could schedule the input"),
    }
    Ok(())
}

fn run_contention(
    processes: &Path,
    resources: &Path,
    actions: &Path,
    mode: ContentionMode,
    output: Option<&Path>,
) -> Result<()> {
    let processes = load_processes(processes)?;

    let loaded = io::load_resources(resources)?;
    report_diagnostics(resources, &loaded.diagnostics);
    let resources_table = loaded.records;

    let loaded = io::load_actions(actions, Some(&resources_table))?;
    report_diagnostics(actions, &loaded.diagnostics);
    let actions = loaded.records;

    let timeline = match simulate_contention(&actions, &resources_table, &processes, mode) {
        Ok(timeline) => timeline,
        Err(errors) => {
            for e in &errors {
                eprintln!("  {}", e);
            }
            bail!("action log rejected with {} violation(s)", errors.len());
        }
    };

    print_timeline(&timeline);
    println!();
    for (name, stats) in summarize(&timeline) {
        let primitive = match resources_table.iter().find(|r| r.name == name) {
            Some(r) if mode == ContentionMode::Mutex || r.is_mutex() => "mutex".to_string(),
            Some(r) => format!("semaphore({})", r.capacity),
            None => "unknown".to_string(),
        };
        println!(
            "{} [{}]: {} access(es), {} wait(s), {} cycle(s) waiting",
            name, primitive, stats.accesses, stats.waits, stats.wait_cycles
        );
    }

    if let Some(path) = output {
        io::save(path, |out| io::write_sync_timeline(out, &timeline))?;
        info!("timeline written to {}", path.display());
    }
    Ok(())
}

fn run_generate(generator: WorkloadGenerator, seed: Option<u64>, output: Option<&Path>) -> Result<()> {
    let processes = match seed {
        Some(seed) => generator.generate_seeded(seed),
        None => generator.generate(&mut rand::rng()),
    };

    match output {
        Some(path) => {
            io::save(path, |out| io::write_processes(out, &processes))?;
            info!(count = processes.len(), "processes written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            io::write_processes(&mut out, &processes)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    init_logging(opts.verbose);

    match opts.command {
        Command::Schedule {
            processes,
            algorithm,
            quantum,
            policy,
            output,
        } => run_schedule(
            &processes,
            algorithm.with_quantum(quantum),
            policy.into(),
            output.as_deref(),
        ),
        Command::Compare { processes, quantum } => run_compare(&processes, quantum),
        Command::Contention {
            processes,
            resources,
            actions,
            mutex,
            output,
        } => run_contention(
            &processes,
            &resources,
            &actions,
            ContentionMode::from_mutex_flag(mutex),
            output.as_deref(),
        ),
        Command::Generate {
            count,
            seed,
            max_burst,
            max_arrival,
            max_priority,
            output,
        } => run_generate(
            WorkloadGenerator::new(count)
                .with_max_burst(max_burst)
                .with_max_arrival(max_arrival)
                .with_max_priority(max_priority),
            seed,
            output.as_deref(),
        ),
    }
}
