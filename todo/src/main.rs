//! Demo for the to-do list.
//!
//! Runs the same walk-through against both variants with logging middleware
//! attached, prints the resulting lists and checks that they agree.
//!
//! Set `RUST_LOG` to change the log level (defaults to debug for this crate
//! and the runtime).

use reflux_core::environment::RandomIdGenerator;
use reflux_runtime::{LoggingMiddleware, metrics::register_metrics};
use todo::{AppState, combined, sliced};
use tracing_subscriber::EnvFilter;

/// Description and completion flag of every task, in order
fn summary(state: &AppState) -> Vec<(String, bool)> {
    state
        .tasks
        .iter()
        .map(|task| (task.description.clone(), task.is_complete))
        .collect()
}

fn print_state(title: &str, state: &AppState) {
    println!("\n{title} ({} mutations)", state.mutation_count);
    for task in &state.tasks {
        let status = if task.is_complete { "✓" } else { " " };
        let marker = if state.selected_task_id == Some(task.id) { ">" } else { " " };
        println!("{marker} [{status}] {} ({})", task.description, task.id);
    }
}

async fn run_combined(seed: AppState, ids: &RandomIdGenerator) -> anyhow::Result<AppState> {
    use combined::actions::{create_task, delete_task, edit_task, select_task, toggle_task};

    let store = combined::store(seed).with_middleware(LoggingMiddleware);
    let [first, _, third] = ids_of(&store.snapshot().await)?;

    let state = store.dispatch(create_task(ids, "Learn Rust")).await;
    let created = state
        .tasks
        .last()
        .map(|task| task.id)
        .ok_or_else(|| anyhow::anyhow!("create left the list empty"))?;

    store.dispatch(toggle_task(third, true)).await;
    store.dispatch(delete_task(first)).await;
    store.dispatch(edit_task(created, "Learn Rust properly")).await;
    store.dispatch(select_task(created)).await;

    store.settle().await?;
    Ok(store.snapshot().await)
}

async fn run_sliced(seed: AppState, ids: &RandomIdGenerator) -> anyhow::Result<AppState> {
    use sliced::actions::{create_task, delete_task, edit_task, select_task, toggle_task};

    let store = sliced::store(seed).with_middleware(LoggingMiddleware);
    let [first, _, third] = ids_of(&store.snapshot().await)?;

    let state = store.dispatch(create_task(ids, "Learn Rust")).await;
    let created = state
        .tasks
        .last()
        .map(|task| task.id)
        .ok_or_else(|| anyhow::anyhow!("create left the list empty"))?;

    store.dispatch(toggle_task(third, true)).await;
    store.dispatch(delete_task(first)).await;
    store.dispatch(edit_task(created, "Learn Rust properly")).await;
    store.dispatch(select_task(created)).await;

    store.settle().await?;
    Ok(store.snapshot().await)
}

/// Ids of the three seed tasks
fn ids_of(state: &AppState) -> anyhow::Result<[todo::TaskId; 3]> {
    match state.tasks.as_slice() {
        [a, b, c] => Ok([a.id, b.id, c.id]),
        other => anyhow::bail!("expected 3 seed tasks, found {}", other.len()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo=debug,reflux_runtime=debug")),
        )
        .init();
    register_metrics();

    println!("=== To-do Example ===");

    let ids = RandomIdGenerator;
    let seed = AppState::seeded(&ids);
    print_state("Seed", &seed);

    let combined_state = run_combined(seed, &ids).await?;
    print_state("Combined reducers", &combined_state);

    let sliced_state = run_sliced(sliced::initial_state(), &ids).await?;
    print_state("Generated slices", &sliced_state);

    anyhow::ensure!(
        summary(&combined_state) == summary(&sliced_state)
            && combined_state.mutation_count == sliced_state.mutation_count,
        "variants disagree"
    );
    tracing::info!(
        tasks = combined_state.tasks.len(),
        mutations = combined_state.mutation_count,
        "both variants agree"
    );

    println!("\n=== Demo Complete ===");
    Ok(())
}
