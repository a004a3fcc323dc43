//! Command execution for stridectl
//!
//! Each subcommand loads what it needs from disk, calls into stride_common,
//! and prints a short human summary or, with --json, the raw structure.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use stride_common::buckets::bucket_by_day;
use stride_common::calendar::{local_day_start, parse_day_key, today_local, DayRange};
use stride_common::curriculum::Curriculum;
use stride_common::export::export_solved_csv;
use stride_common::metrics::{metrics_for, Metrics};
use stride_common::navigator::locate;
use stride_common::progress::{ProgressProblem, RevisionStatus};
use stride_common::store::{ProgressDocument, ProgressStore};
use stride_common::streaks::{gym_streak, work_streak_with};
use stride_common::tasks::{
    next_order, swap_tasks, tasks_by_day, validate_schedule_window, weekly_task_stats, Priority, Task,
};
use stride_common::workouts::{
    completed_in_month, monthly_gym_stats, upsert_log, LogUpdate, PerformedExercise, WorkoutLog,
    WorkoutTemplate,
};
use stride_common::{StrideConfig, StrideError};

use crate::cli::{Address, CalendarCommands, Cli, Commands, ConfigCommands, Owner, StreakCommands};
use crate::errors::NotInitialized;

/// Parse-once state shared by every subcommand
pub struct Session {
    pub config: StrideConfig,
    pub store: ProgressStore,
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
    pub json: bool,
}

/// A problem after a mutation, with its parents' names
#[derive(Debug, Serialize)]
pub struct ProblemView {
    pub step_index: usize,
    pub step_name: String,
    pub topic_index: usize,
    pub topic_name: String,
    pub problem: ProgressProblem,
}

#[derive(Debug, Serialize)]
struct InitReport<'a> {
    created: bool,
    user_id: &'a str,
    curriculum_id: &'a str,
    total_problems: usize,
}

#[derive(Debug, Serialize)]
struct StreakReport {
    kind: &'static str,
    today: NaiveDate,
    streak: u32,
}

/// Parse-and-run entry point used by main and the integration tests
pub fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let session = Session::from_cli(&cli)?;
    session.execute(cli.command, out)
}

impl Session {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = StrideConfig::load(cli.config.as_deref())?;
        let data_dir = cli
            .data_dir
            .clone()
            .unwrap_or_else(|| config.storage.data_dir.clone());

        // A pinned day also pins the clock to that day's local midnight
        let (today, now) = match cli.today.as_deref() {
            Some(raw) => {
                let day = parse_day_key(raw)?;
                let start = local_day_start(day.year(), day.month(), day.day())?;
                (day, start.with_timezone(&Utc))
            }
            None => (today_local(), Utc::now()),
        };
        debug!("Session: data_dir={} today={}", data_dir.display(), today);

        Ok(Self {
            config,
            store: ProgressStore::new(data_dir),
            today,
            now,
            json: cli.json,
        })
    }

    pub fn execute<W: Write>(&self, command: Commands, out: &mut W) -> Result<()> {
        match command {
            Commands::Import { structure, out: dest } => self.import(&structure, &dest, out),
            Commands::Init { owner } => self.init(&owner, out),
            Commands::Metrics { owner } => self.metrics(&owner, out),
            Commands::Complete { owner, at, undo } => {
                let now = self.now;
                let view = self.update_problem(&owner, at, |p| p.set_completed(!undo, now))?;
                self.emit(out, &view, |w| {
                    let state = if view.problem.completed { "completed" } else { "not completed" };
                    writeln!(w, "{} marked {}", view.problem.name, state)
                })
            }
            Commands::Code { owner, at, code_file, lang, notes } => {
                let code = code_file
                    .map(|path| {
                        fs::read_to_string(&path)
                            .with_context(|| format!("Failed to read {}", path.display()))
                    })
                    .transpose()?;
                let view = self.update_problem(&owner, at, |p| {
                    p.save_code(code.as_deref(), lang.as_deref(), notes.as_deref())
                })?;
                self.emit(out, &view, |w| {
                    writeln!(w, "Saved {} ({})", view.problem.name, view.problem.code_language)
                })
            }
            Commands::Revise { owner, at, status, note, revised_at } => {
                self.revise(&owner, at, &status, &note, revised_at.as_deref(), out)
            }
            Commands::Revisions { owner, at, limit } => self.revisions(&owner, at, limit, out),
            Commands::Export { owner, out: dest } => self.export(&owner, dest.as_deref(), out),
            Commands::Streak { kind } => self.streak(kind, out),
            Commands::Calendar { kind } => self.calendar(kind, out),
            Commands::Weekly { user, tasks } => {
                let tasks = read_tasks(&tasks, &user)?;
                let week = weekly_task_stats(&tasks, self.today);
                self.emit(out, &week, |w| {
                    for day in &week {
                        writeln!(w, "{} {}  {}/{}", day.day, day.date, day.completed, day.assigned)?;
                    }
                    Ok(())
                })
            }
            Commands::MonthlyGym { user, logs, templates } => {
                let logs = read_logs(&logs, &user)?;
                let templates: Vec<WorkoutTemplate> = match templates {
                    Some(path) => read_json(&path)?,
                    None => Vec::new(),
                };
                let days = monthly_gym_stats(&logs, &templates, self.today);
                self.emit(out, &days, |w| {
                    for day in &days {
                        let mark = match (day.assigned, day.completed) {
                            (_, true) => "done",
                            (true, false) => "logged",
                            _ => "-",
                        };
                        let name = day.workout_name.as_deref().unwrap_or("");
                        writeln!(w, "{:>7}  {:<6} {}", day.day, mark, name)?;
                    }
                    Ok(())
                })
            }
            Commands::AddTask { tasks, user, title, date, priority } => {
                self.add_task(&tasks, &user, &title, &date, &priority, out)
            }
            Commands::SwapTasks { tasks, first, second } => {
                let mut list: Vec<Task> = read_json(&tasks)?;
                swap_tasks(&mut list, &first, &second)?;
                write_json(&tasks, &list)?;
                info!("Swapped order of tasks {} and {}", first, second);
                writeln!(out, "Swapped {} and {}", first, second)?;
                Ok(())
            }
            Commands::LogWorkout { logs, user, date, template, exercises, completed } => {
                self.log_workout(&logs, &user, &date, template, exercises, completed, out)
            }
            Commands::Config { action: ConfigCommands::Show } => {
                if self.json {
                    serde_json::to_writer_pretty(&mut *out, &self.config)?;
                    writeln!(out)?;
                } else {
                    let rendered =
                        toml::to_string_pretty(&self.config).context("Failed to render configuration")?;
                    write!(out, "{}", rendered)?;
                }
                Ok(())
            }
        }
    }

    fn emit<W, T, F>(&self, out: &mut W, value: &T, human: F) -> Result<()>
    where
        W: Write,
        T: Serialize + ?Sized,
        F: FnOnce(&mut W) -> std::io::Result<()>,
    {
        if self.json {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        } else {
            human(out)?;
        }
        Ok(())
    }

    fn import<W: Write>(&self, structure: &Path, dest: &Path, out: &mut W) -> Result<()> {
        let raw = fs::read_to_string(structure)
            .with_context(|| format!("Failed to read {}", structure.display()))?;
        let curriculum = Curriculum::from_structure_json(&raw)?;
        write_json(dest, &curriculum)?;

        let overview = curriculum.overview();
        info!("Imported curriculum {} with {} problems", overview.id, overview.total_problems);
        self.emit(out, &overview, |w| {
            writeln!(
                w,
                "Imported {} ({}): {} steps, {} problems -> {}",
                overview.name,
                overview.id,
                overview.total_steps,
                overview.total_problems,
                dest.display()
            )
        })
    }

    fn init<W: Write>(&self, owner: &Owner, out: &mut W) -> Result<()> {
        let curriculum = load_curriculum(&owner.curriculum)?;
        let (doc, created) = self.store.ensure(
            &owner.user,
            Some(&curriculum),
            &self.config.progress.default_code_language,
            self.now,
        )?;

        let report = InitReport {
            created,
            user_id: &doc.user_id,
            curriculum_id: &doc.curriculum_id,
            total_problems: doc.progress.problem_count(),
        };
        self.emit(out, &report, |w| {
            if created {
                writeln!(w, "Initialized {} for {} ({} problems)", report.curriculum_id, report.user_id, report.total_problems)
            } else {
                writeln!(w, "Progress already exists for {} on {}", report.user_id, report.curriculum_id)
            }
        })
    }

    fn metrics<W: Write>(&self, owner: &Owner, out: &mut W) -> Result<()> {
        let curriculum = load_curriculum(&owner.curriculum)?;
        let doc = self.store.load(&owner.user, &curriculum.id)?;
        let metrics = metrics_for(doc.as_ref().map(|d| &d.progress), Some(&curriculum), self.now)
            .ok_or_else(|| NotInitialized { user: owner.user.clone() })?;
        self.emit(out, &metrics, |w| print_metrics(w, &metrics))
    }

    fn revise<W: Write>(
        &self,
        owner: &Owner,
        at: Address,
        status: &str,
        note: &str,
        revised_at: Option<&str>,
        out: &mut W,
    ) -> Result<()> {
        let status = RevisionStatus::parse_lenient(status);
        let revised_at = match revised_at {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map_err(|_| StrideError::InvalidDate(raw.to_string()))?
                .with_timezone(&Utc),
            None => self.now,
        };
        let cap = self.config.progress.revision_cap;

        let view = self.update_problem(owner, at, |p| {
            p.add_revision(status, note, revised_at, cap);
        })?;
        self.emit(out, &view, |w| {
            writeln!(
                w,
                "Revised {} as {} ({} on record)",
                view.problem.name,
                status,
                view.problem.revisions.len()
            )
        })
    }

    fn revisions<W: Write>(&self, owner: &Owner, at: Address, limit: Option<usize>, out: &mut W) -> Result<()> {
        let (_, mut doc) = self.require(owner)?;
        let found = locate(&mut doc.progress, at.step, at.topic, at.problem)?;
        let recent = found
            .problem
            .recent_revisions(limit, self.config.progress.revision_list_default);

        self.emit(out, &recent, |w| {
            if recent.is_empty() {
                return writeln!(w, "No revisions for {}", found.problem.name);
            }
            for revision in &recent {
                writeln!(w, "{}  {:<12} {}", revision.revised_at.to_rfc3339(), revision.status, revision.note)?;
            }
            Ok(())
        })
    }

    fn export<W: Write>(&self, owner: &Owner, dest: Option<&Path>, out: &mut W) -> Result<()> {
        let (_, doc) = self.require(owner)?;
        let csv = export_solved_csv(&doc.progress);
        match dest {
            Some(path) => {
                fs::write(path, &csv).with_context(|| format!("Failed to write {}", path.display()))?;
                let rows = csv.lines().count().saturating_sub(1);
                info!("Exported {} solved problems for {}", rows, owner.user);
                writeln!(out, "Exported {} solved problems to {}", rows, path.display())?;
            }
            None => out.write_all(csv.as_bytes())?,
        }
        Ok(())
    }

    fn streak<W: Write>(&self, kind: StreakCommands, out: &mut W) -> Result<()> {
        let report = match kind {
            StreakCommands::Gym { user, logs } => {
                let logs = read_logs(&logs, &user)?;
                StreakReport { kind: "gym", today: self.today, streak: gym_streak(&logs, self.today) }
            }
            StreakCommands::Work { user, tasks } => {
                let tasks = read_tasks(&tasks, &user)?;
                let streak = work_streak_with(&tasks, self.today, &self.config.streaks);
                StreakReport { kind: "work", today: self.today, streak }
            }
        };
        self.emit(out, &report, |w| {
            let unit = if report.streak == 1 { "day" } else { "days" };
            writeln!(w, "{} streak: {} {}", report.kind, report.streak, unit)
        })
    }

    fn calendar<W: Write>(&self, kind: CalendarCommands, out: &mut W) -> Result<()> {
        match kind {
            CalendarCommands::Gym { user, logs, year, month } => {
                let logs = read_logs(&logs, &user)?;
                let range = DayRange::month(year, month)?;
                let days = bucket_by_day(&logs, &range);
                self.emit(out, &days, |w| {
                    for (key, log) in &days {
                        match log {
                            Some(log) if log.completed => writeln!(w, "{}  done    {}", key, log.workout_template_ref)?,
                            Some(log) => writeln!(w, "{}  logged  {}", key, log.workout_template_ref)?,
                            None => writeln!(w, "{}  -", key)?,
                        }
                    }
                    writeln!(w, "Completed sessions: {}", completed_in_month(&logs, year, month))
                })
            }
            CalendarCommands::Tasks { user, tasks, year, month } => {
                let tasks = read_tasks(&tasks, &user)?;
                let range = DayRange::month(year, month)?;
                let days = tasks_by_day(&tasks, &range);
                self.emit(out, &days, |w| {
                    for (key, on_day) in &days {
                        let done = on_day.iter().filter(|t| t.completed).count();
                        writeln!(w, "{}  {}/{}", key, done, on_day.len())?;
                    }
                    Ok(())
                })
            }
        }
    }

    fn add_task<W: Write>(
        &self,
        path: &Path,
        user: &str,
        title: &str,
        date: &str,
        priority: &str,
        out: &mut W,
    ) -> Result<()> {
        let day = parse_day_key(date)?;
        validate_schedule_window(day, self.today, self.config.schedule.window_months)?;
        let priority: Priority = priority.parse()?;

        let mut tasks: Vec<Task> = read_json_or_default(path)?;
        let order = next_order(&tasks, user, day);
        let task = Task {
            id: Uuid::new_v4().to_string(),
            user_id: user.to_string(),
            title: title.trim().to_string(),
            description: String::new(),
            date: day,
            completed: false,
            priority,
            order,
        };
        tasks.push(task.clone());
        write_json(path, &tasks)?;

        info!("Added task {} for {} on {}", task.id, user, day);
        self.emit(out, &task, |w| writeln!(w, "Added {} ({}, order {})", task.id, task.priority, task.order))
    }

    #[allow(clippy::too_many_arguments)]
    fn log_workout<W: Write>(
        &self,
        path: &Path,
        user: &str,
        date: &str,
        template: String,
        exercises: Option<PathBuf>,
        completed: Option<bool>,
        out: &mut W,
    ) -> Result<()> {
        let day = parse_day_key(date)?;
        let mut logs: Vec<WorkoutLog> = read_json_or_default(path)?;

        let performed_exercises: Vec<PerformedExercise> = match exercises {
            Some(file) => read_json(&file)?,
            None => logs
                .iter()
                .find(|l| l.user_id == user && l.date == day)
                .map(|l| l.performed_exercises.clone())
                .unwrap_or_default(),
        };
        let update = LogUpdate {
            workout_template_ref: template,
            performed_exercises,
            completed,
        };

        let (log, created) = upsert_log(&mut logs, user, day, update, || Uuid::new_v4().to_string());
        let log = log.clone();
        write_json(path, &logs)?;

        self.emit(out, &log, |w| {
            let verb = if created { "Logged" } else { "Updated" };
            writeln!(w, "{} {} on {} (completed: {})", verb, log.workout_template_ref, log.date, log.completed)
        })
    }

    /// Curriculum plus its existing progress document
    fn require(&self, owner: &Owner) -> Result<(Curriculum, ProgressDocument)> {
        let curriculum = load_curriculum(&owner.curriculum)?;
        let doc = self
            .store
            .load(&owner.user, &curriculum.id)?
            .ok_or_else(|| NotInitialized { user: owner.user.clone() })?;
        Ok((curriculum, doc))
    }

    /// Locate one problem, apply `change`, and persist the whole document
    fn update_problem(
        &self,
        owner: &Owner,
        at: Address,
        change: impl FnOnce(&mut ProgressProblem),
    ) -> Result<ProblemView> {
        let (_, mut doc) = self.require(owner)?;
        let view = {
            let found = locate(&mut doc.progress, at.step, at.topic, at.problem)?;
            let problem = found.problem;
            change(&mut *problem);
            ProblemView {
                step_index: found.step_index,
                step_name: found.step_name.to_string(),
                topic_index: found.topic_index,
                topic_name: found.topic_name.to_string(),
                problem: problem.clone(),
            }
        };
        self.store.save(&mut doc, self.now)?;
        Ok(view)
    }
}

fn print_metrics<W: Write>(w: &mut W, m: &Metrics) -> std::io::Result<()> {
    writeln!(
        w,
        "Progress: {}/{} ({:.1}%), {} remaining",
        m.completed_problems, m.total_problems, m.completion_percentage, m.remaining_problems
    )?;
    for step in &m.steps {
        writeln!(
            w,
            "  Step {:>2} {:<32} {}/{} ({:.1}%)",
            step.step_index, step.step_name, step.completed, step.total, step.completion_percentage
        )?;
    }
    for d in &m.difficulty {
        writeln!(w, "  {:<6} {}/{} ({:.1}%)", d.difficulty, d.completed, d.total, d.percentage)?;
    }
    if let Some(last) = &m.last_completed {
        writeln!(
            w,
            "Last completed: {} [{}] in {} / {} at {}",
            last.problem_name,
            last.difficulty,
            last.step_name,
            last.topic_name,
            last.completed_at.to_rfc3339()
        )?;
    }
    writeln!(
        w,
        "Revisions: {} total, {} in the last 7 days, {} need review",
        m.revisions.total, m.revisions.recent_7_days, m.revisions.needs_review
    )
}

fn load_curriculum(path: &Path) -> Result<Curriculum> {
    read_json(path)
}

/// Tasks owned by `user`; the file may hold several users
fn read_tasks(path: &Path, user: &str) -> Result<Vec<Task>> {
    let mut tasks: Vec<Task> = read_json(path)?;
    tasks.retain(|t| t.user_id == user);
    Ok(tasks)
}

/// Workout logs owned by `user`
fn read_logs(path: &Path, user: &str) -> Result<Vec<WorkoutLog>> {
    let mut logs: Vec<WorkoutLog> = read_json(path)?;
    logs.retain(|l| l.user_id == user);
    Ok(logs)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Missing file reads as empty
fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        debug!("{} does not exist yet", path.display());
        return Ok(T::default());
    }
    read_json(path)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
