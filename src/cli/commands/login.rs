use anyhow::Result;
use serde_json::json;

use super::{Command, Context};

pub struct LoginCommand<'a> {
    ctx: &'a Context,
}

impl<'a> LoginCommand<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }
}

impl Command for LoginCommand<'_> {
    fn execute(&self) -> Result<()> {
        let session = self.ctx.connect()?;
        let role = session.login()?;
        self.ctx.store.save_credentials(session.credentials());

        let credentials = session.credentials();
        if self.ctx.json {
            return self.ctx.print_json(&json!({
                "login": credentials.login,
                "host": credentials.host,
                "port": credentials.port,
                "role": role,
                "admin": role.is_admin(),
            }));
        }

        println!(
            "✅ Logged in to {}:{} as {} ({role})",
            credentials.host, credentials.port, credentials.login
        );
        if role.is_admin() {
            println!("🔧 Admin commands available: user, repo, access, admin");
        }
        Ok(())
    }
}
