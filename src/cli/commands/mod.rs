use anyhow::{bail, Result};
use serde::Serialize;

use crate::config::Settings;
use crate::external::Credentials;
use crate::remote::Session;
use crate::store::ConfigStore;

pub mod login;
pub mod remote;
pub mod tracked;

pub trait Command {
    fn execute(&self) -> Result<()>;
}

/// Connection flags given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConnectionArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub login: Option<String>,
    pub password: Option<String>,
}

/// Everything a command needs besides its own arguments
pub struct Context {
    pub settings: Settings,
    pub store: ConfigStore,
    pub connection: ConnectionArgs,
    pub json: bool,
}

impl Context {
    pub fn new(settings: Settings, connection: ConnectionArgs, json: bool) -> Self {
        let store = ConfigStore::new(settings.store_path.clone());
        Self {
            settings,
            store,
            connection,
            json,
        }
    }

    /// Flags first, then the last saved login
    pub fn credentials(&self) -> Result<Credentials> {
        let last = self.store.get_last_credentials();
        let credentials = Credentials {
            login: self.connection.login.clone().unwrap_or(last.login),
            password: self.connection.password.clone(),
            host: self.connection.host.clone().unwrap_or(last.host),
            port: self.connection.port.unwrap_or(last.port),
        };

        if credentials.host.is_empty() {
            bail!("No host given. Use --host or log in once with 'gitkeeper login --host <host>'");
        }
        if credentials.login.is_empty() {
            bail!("No login given. Use --login or log in once with 'gitkeeper login --login <login>'");
        }
        if credentials.password.is_none() {
            bail!("No password given. Use --password or set GITKEEPER_PASSWORD");
        }
        Ok(credentials)
    }

    pub fn connect(&self) -> Result<Session> {
        Ok(Session::new(self.settings.ssh.command(), self.credentials()?))
    }

    pub fn print_list(&self, items: &[String]) -> Result<()> {
        if self.json {
            return self.print_json(&items);
        }
        if items.is_empty() {
            println!("📋 Nothing found");
        }
        for item in items {
            println!("{item}");
        }
        Ok(())
    }

    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn done(&self, message: &str) {
        if !self.json {
            println!("✅ {message}");
        }
    }
}
