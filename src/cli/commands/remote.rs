use anyhow::Result;
use serde_json::json;

use super::{Command, Context};
use crate::cli::{AccessCommand, AccountCommand, AdminCommand, RepoCommand, UserCommand};

pub struct UserCommandRunner<'a> {
    ctx: &'a Context,
    command: &'a UserCommand,
}

impl<'a> UserCommandRunner<'a> {
    pub fn new(ctx: &'a Context, command: &'a UserCommand) -> Self {
        Self { ctx, command }
    }
}

impl Command for UserCommandRunner<'_> {
    fn execute(&self) -> Result<()> {
        let users = self.ctx.connect()?.user;
        match self.command {
            UserCommand::Create { login, password } => {
                users.create(login, password)?;
                self.ctx.done(&format!("User {login} created"));
            }
            UserCommand::Delete { login } => {
                users.delete(login)?;
                self.ctx.done(&format!("User {login} deleted"));
            }
            UserCommand::List => {
                let entries = users.entries()?;
                if self.ctx.json {
                    return self.ctx.print_json(&entries);
                }
                if entries.is_empty() {
                    println!("📋 No users found");
                }
                for entry in entries {
                    println!("{:<24} {}", entry.login, entry.role);
                }
            }
            UserCommand::Passwd { login, password } => {
                users.passwd(login, password)?;
                self.ctx.done(&format!("Password of {login} changed"));
            }
        }
        Ok(())
    }
}

pub struct RepoCommandRunner<'a> {
    ctx: &'a Context,
    command: &'a RepoCommand,
}

impl<'a> RepoCommandRunner<'a> {
    pub fn new(ctx: &'a Context, command: &'a RepoCommand) -> Self {
        Self { ctx, command }
    }
}

impl Command for RepoCommandRunner<'_> {
    fn execute(&self) -> Result<()> {
        let repos = self.ctx.connect()?.repo;
        match self.command {
            RepoCommand::Create { repo } => {
                repos.create(repo)?;
                self.ctx.done(&format!("Repository {repo} created"));
            }
            RepoCommand::Delete { repo } => {
                repos.delete(repo)?;
                self.ctx.done(&format!("Repository {repo} deleted"));
            }
            RepoCommand::List => self.ctx.print_list(&repos.list()?)?,
        }
        Ok(())
    }
}

pub struct AccessCommandRunner<'a> {
    ctx: &'a Context,
    command: &'a AccessCommand,
}

impl<'a> AccessCommandRunner<'a> {
    pub fn new(ctx: &'a Context, command: &'a AccessCommand) -> Self {
        Self { ctx, command }
    }
}

impl Command for AccessCommandRunner<'_> {
    fn execute(&self) -> Result<()> {
        let access = self.ctx.connect()?.access;
        match self.command {
            AccessCommand::Allow { login, repo } => {
                access.allow(login, repo)?;
                self.ctx.done(&format!("{login} can now access {repo}"));
            }
            AccessCommand::Deny { login, repo } => {
                access.deny(login, repo)?;
                self.ctx.done(&format!("{login} can no longer access {repo}"));
            }
            AccessCommand::List { login } => self.ctx.print_list(&access.list(login)?)?,
        }
        Ok(())
    }
}

pub struct AdminCommandRunner<'a> {
    ctx: &'a Context,
    command: &'a AdminCommand,
}

impl<'a> AdminCommandRunner<'a> {
    pub fn new(ctx: &'a Context, command: &'a AdminCommand) -> Self {
        Self { ctx, command }
    }
}

impl Command for AdminCommandRunner<'_> {
    fn execute(&self) -> Result<()> {
        let admin = self.ctx.connect()?.admin;
        match self.command {
            AdminCommand::Promote { login } => {
                admin.promote(login)?;
                self.ctx.done(&format!("{login} is now an admin"));
            }
            AdminCommand::Demote { login } => {
                admin.demote(login)?;
                self.ctx.done(&format!("{login} is no longer an admin"));
            }
        }
        Ok(())
    }
}

pub struct AccountCommandRunner<'a> {
    ctx: &'a Context,
    command: &'a AccountCommand,
}

impl<'a> AccountCommandRunner<'a> {
    pub fn new(ctx: &'a Context, command: &'a AccountCommand) -> Self {
        Self { ctx, command }
    }
}

impl Command for AccountCommandRunner<'_> {
    fn execute(&self) -> Result<()> {
        let session = self.ctx.connect()?;
        match self.command {
            AccountCommand::Passwd { new_password } => {
                let session = session.change_password(new_password)?;
                // Password changes never touch the store
                self.ctx.done(&format!(
                    "Password of {} changed; use the new password from now on",
                    session.credentials().login
                ));
            }
            AccountCommand::Repos => self.ctx.print_list(&session.account.repos()?)?,
            AccountCommand::Role => {
                let role = session.account.role()?;
                if self.ctx.json {
                    return self.ctx.print_json(&json!({ "role": role, "admin": role.is_admin() }));
                }
                println!("{role}");
            }
        }
        Ok(())
    }
}
