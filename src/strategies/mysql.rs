//! MySQL / MariaDB strategy
//!
//! Plain-text dumps only. The password travels in `MYSQL_PWD`, so it never
//! appears on a command line.

use super::EngineStrategy;
use crate::config::{Secret, TargetConfig};
use crate::error::Result;
use crate::utils::artifacts::{artifact_path, SQL_EXT};
use crate::utils::environment::ExecContext;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const EXCLUDED_DATABASES: &[&str] = &["information_schema", "performance_schema", "mysql", "sys"];
const HEADER: &str = "Database";

pub struct MySqlStrategy {
    username: String,
    password: Secret,
    host: String,
    port: u16,
}

impl MySqlStrategy {
    pub fn from_target(target: &TargetConfig) -> Self {
        Self {
            username: target.username.clone(),
            password: target.password.clone(),
            host: target.host.clone(),
            port: target.port(),
        }
    }

    fn connection_args(&self, ctx: &ExecContext<'_>) -> Vec<String> {
        let mut args = vec![format!("-u{}", self.username)];
        if !ctx.is_container() {
            if !self.host.is_empty() {
                args.push(format!("-h{}", self.host));
            }
            args.push(format!("-P{}", self.port));
        }
        args
    }

    fn env(&self) -> Vec<(&'static str, &str)> {
        if self.password.is_empty() {
            Vec::new()
        } else {
            vec![("MYSQL_PWD", self.password.expose())]
        }
    }
}

/// Quote a MySQL identifier
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Drop the host flag so the client falls back to its default connection
fn without_host_flag(args: &[String]) -> Vec<String> {
    args.iter()
        .filter(|arg| !(arg.starts_with("-h") && arg.len() > 2))
        .cloned()
        .collect()
}

/// Parse `SHOW DATABASES` output into user database names
pub fn parse_database_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .enumerate()
        .filter(|(index, line)| !(*index == 0 && *line == HEADER))
        .map(|(_, line)| line)
        .filter(|line| !line.is_empty())
        .filter(|line| !EXCLUDED_DATABASES.contains(line))
        .map(str::to_string)
        .collect()
}

impl EngineStrategy for MySqlStrategy {
    fn list_databases(&self, ctx: &ExecContext<'_>) -> Result<Vec<String>> {
        let mut args = self.connection_args(ctx);
        args.extend(["-e".to_string(), "SHOW DATABASES;".to_string()]);
        let env = self.env();

        let output = match ctx.run("mysql", &args, &env) {
            Ok(output) => output,
            Err(e) => {
                warn!("MySQL SHOW DATABASES failed ({}). Retrying without host...", e);
                ctx.run("mysql", &without_host_flag(&args), &env)?
            }
        };

        Ok(parse_database_list(&output.stdout))
    }

    fn backup_database(
        &self,
        ctx: &ExecContext<'_>,
        database: &str,
        dir: &Path,
        timestamp: &str,
    ) -> Result<Vec<PathBuf>> {
        let local = artifact_path(dir, database, timestamp, SQL_EXT);

        let mut args = self.connection_args(ctx);
        args.push(database.to_string());
        ctx.write_stdout(&local, "mysqldump", &args, &self.env())?;

        info!("MySQL dump written: {:?}", local);
        Ok(vec![local])
    }

    fn restore_database(&self, ctx: &ExecContext<'_>, database: &str, file: &Path) -> Result<()> {
        let quoted = quote_identifier(database);
        let env = self.env();

        let mut recreate = self.connection_args(ctx);
        recreate.extend([
            "-e".to_string(),
            format!(
                "DROP DATABASE IF EXISTS {q}; CREATE DATABASE {q} CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;",
                q = quoted
            ),
        ]);
        ctx.run("mysql", &recreate, &env)?;

        let mut load = self.connection_args(ctx);
        load.push(database.to_string());
        ctx.read_stdin(file, "mysql", &load, &env)?;
        Ok(())
    }

    fn restore_extensions(&self) -> &'static [&'static str] {
        &[SQL_EXT]
    }

    fn name(&self) -> &'static str {
        "mysql"
    }
}
