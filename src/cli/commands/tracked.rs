use anyhow::Result;
use std::collections::HashSet;

use super::{Command, Context};
use crate::cli::TrackedCommand;
use crate::git;

pub struct TrackedCommandRunner<'a> {
    ctx: &'a Context,
    command: &'a TrackedCommand,
}

impl<'a> TrackedCommandRunner<'a> {
    pub fn new(ctx: &'a Context, command: &'a TrackedCommand) -> Self {
        Self { ctx, command }
    }
}

impl Command for TrackedCommandRunner<'_> {
    fn execute(&self) -> Result<()> {
        let store = &self.ctx.store;
        match self.command {
            TrackedCommand::List => {
                let records = store.list_repositories();
                if self.ctx.json {
                    return self.ctx.print_json(&records);
                }
                if records.is_empty() {
                    println!("📋 No tracked repositories");
                    println!("   → Track a clone: gitkeeper tracked add <path>");
                }
                for record in records {
                    println!("{:<24} {}", record.name, record.local_path.display());
                }
            }
            TrackedCommand::Add { path, name } => {
                let record = git::record_for(path, name.as_deref())?;
                store.add_repository(&record);
                self.ctx.done(&format!(
                    "Tracking {} at {}",
                    record.name,
                    record.local_path.display()
                ));
            }
            TrackedCommand::Remove { names } => {
                let requested: HashSet<String> = names.iter().cloned().collect();
                let removed = store.delete_repositories(&requested);
                let mut missing: Vec<&str> = requested
                    .iter()
                    .filter(|name| !removed.contains(name))
                    .map(String::as_str)
                    .collect();
                missing.sort_unstable();

                if self.ctx.json {
                    return self.ctx.print_json(&serde_json::json!({
                        "removed": removed,
                        "not_found": missing,
                    }));
                }
                if !removed.is_empty() {
                    self.ctx.done(&format!("No longer tracking: {}", removed.join(", ")));
                }
                if !missing.is_empty() {
                    println!("⚠️  Not tracked: {}", missing.join(", "));
                }
            }
            TrackedCommand::Scan { dir } => {
                let records = git::discover(dir)?;
                for record in &records {
                    store.add_repository(record);
                }
                if self.ctx.json {
                    return self.ctx.print_json(&records);
                }
                println!("🔍 Found {} repositories under {}", records.len(), dir.display());
                for record in &records {
                    println!("   → {} ({})", record.name, record.local_path.display());
                }
            }
        }
        Ok(())
    }
}
