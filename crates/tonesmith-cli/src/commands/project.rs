//! Project command handlers

use anyhow::{bail, Context, Result};

use tonesmith_core::Store;

use crate::editor::confirm;
use crate::output::Output;

/// List all projects
pub fn list(store: &Store, output: &Output) -> Result<()> {
    let state = store.get_state();
    let projects: Vec<String> = state.projects.keys().cloned().collect();
    output.print_projects(&projects, state.active_project.as_deref());
    Ok(())
}

/// Trim surrounding whitespace from a project name given on the command line
fn project_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Project name cannot be empty");
    }
    Ok(name)
}

/// Create a project (or reselect an existing one) and make it active
pub fn create(store: &Store, name: String, output: &Output) -> Result<()> {
    let name = project_name(&name)?;

    let existed = store.list_projects().iter().any(|p| p == name);
    store
        .create_project(name)
        .context("Failed to create project")?;

    if existed {
        output.success(&format!("Switched to existing project: {}", name));
    } else {
        output.success(&format!("Created project: {}", name));
    }
    Ok(())
}

/// Delete a project and its history
pub fn delete(store: &Store, name: String, yes: bool, output: &Output) -> Result<()> {
    let name = project_name(&name)?.to_string();
    if !store.list_projects().contains(&name) {
        bail!("Project not found: {}", name);
    }

    if !yes && output.should_prompt() {
        println!(
            "Delete project '{}' with {} session(s) and {} like(s)?",
            name,
            store.list_sessions(&name).len(),
            store.list_likes(&name).len()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .delete_project(&name)
        .context("Failed to delete project")?;

    output.success(&format!("Deleted project: {}", name));
    match store.get_active_project() {
        Some(active) => output.message(&format!("Active project is now: {}", active)),
        None => output.message("No projects left."),
    }
    Ok(())
}

/// Switch the active project
pub fn use_project(store: &Store, name: String, output: &Output) -> Result<()> {
    let name = project_name(&name)?.to_string();
    // The store accepts any name; only switch to projects that exist
    if !store.list_projects().contains(&name) {
        bail!(
            "Project not found: {}\nCreate it with: tonesmith project create {}",
            name,
            name
        );
    }

    store
        .set_active_project(Some(&name))
        .context("Failed to set active project")?;
    output.success(&format!("Active project: {}", name));
    Ok(())
}

/// Show the active project
pub fn current(store: &Store, output: &Output) -> Result<()> {
    let active = store.get_active_project();
    if output.is_json() {
        println!("{}", serde_json::json!({ "active_project": active }));
        return Ok(());
    }
    match active {
        Some(name) => println!("{}", name),
        None => output.message("No active project."),
    }
    Ok(())
}
