//! PostgreSQL strategy
//!
//! - `psql` for enumeration and plain-text restores
//! - `pg_dump` for plain (`-F p`) and custom (`-F c`) dumps
//! - `pg_restore -C` for custom archives

use super::EngineStrategy;
use crate::config::{Secret, TargetConfig};
use crate::error::Result;
use crate::utils::artifacts::{artifact_path, ARCHIVE_EXT, SQL_EXT};
use crate::utils::environment::ExecContext;
use std::path::{Path, PathBuf};
use tracing::info;

const ADMIN_DATABASE: &str = "postgres";
const EXCLUDED_DATABASES: &[&str] = &["postgres"];
const LIST_QUERY: &str = "SELECT datname FROM pg_database WHERE datistemplate = false;";

pub struct PostgresStrategy {
    username: String,
    password: Secret,
    host: String,
    port: u16,
}

impl PostgresStrategy {
    pub fn from_target(target: &TargetConfig) -> Self {
        Self {
            username: target.username.clone(),
            password: target.password.clone(),
            host: target.host.clone(),
            port: target.port(),
        }
    }

    /// Connection flags; containers use their local defaults
    fn connection_args(&self, ctx: &ExecContext<'_>) -> Vec<String> {
        let mut args = vec!["-U".to_string(), self.username.clone()];
        if !ctx.is_container() {
            args.extend([
                "-h".to_string(),
                self.host.clone(),
                "-p".to_string(),
                self.port.to_string(),
            ]);
        }
        args
    }

    fn env<'s>(&'s self, ctx: &ExecContext<'_>) -> Vec<(&'static str, &'s str)> {
        if ctx.is_container() || self.password.is_empty() {
            Vec::new()
        } else {
            vec![("PGPASSWORD", self.password.expose())]
        }
    }

    fn dump(&self, ctx: &ExecContext<'_>, database: &str, format: &str, local: &Path) -> Result<()> {
        let conn = self.connection_args(ctx);
        ctx.write_file(local, "pg_dump", &self.env(ctx), |path| {
            let mut args = conn.clone();
            args.extend(
                ["-d", database, "-F", format, "-f", path]
                    .iter()
                    .map(|s| s.to_string()),
            );
            args
        })
    }
}

/// Quote a PostgreSQL identifier
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Parse `psql -t -A` output into user database names
pub fn parse_database_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !EXCLUDED_DATABASES.contains(line))
        .map(str::to_string)
        .collect()
}

impl EngineStrategy for PostgresStrategy {
    fn list_databases(&self, ctx: &ExecContext<'_>) -> Result<Vec<String>> {
        let mut args = self.connection_args(ctx);
        args.extend(
            ["-d", ADMIN_DATABASE, "-t", "-A", "-c", LIST_QUERY]
                .iter()
                .map(|s| s.to_string()),
        );

        let output = ctx.run("psql", &args, &self.env(ctx))?;
        Ok(parse_database_list(&output.stdout))
    }

    fn backup_database(
        &self,
        ctx: &ExecContext<'_>,
        database: &str,
        dir: &Path,
        timestamp: &str,
    ) -> Result<Vec<PathBuf>> {
        let plain = artifact_path(dir, database, timestamp, SQL_EXT);
        let custom = artifact_path(dir, database, timestamp, ARCHIVE_EXT);

        self.dump(ctx, database, "p", &plain)?;
        self.dump(ctx, database, "c", &custom)?;

        info!("Postgres dump written: {:?}, {:?}", plain, custom);
        Ok(vec![plain, custom])
    }

    fn restore_database(&self, ctx: &ExecContext<'_>, database: &str, file: &Path) -> Result<()> {
        let conn = self.connection_args(ctx);
        let env = self.env(ctx);
        let is_archive = file.to_string_lossy().ends_with(ARCHIVE_EXT);

        if is_archive {
            // -C creates the database itself; it fails if the database exists
            ctx.read_file(file, "pg_restore", &env, |path| {
                let mut args = conn.clone();
                args.extend(["-C", "-d", ADMIN_DATABASE, path].iter().map(|s| s.to_string()));
                args
            })?;
            return Ok(());
        }

        let quoted = quote_identifier(database);
        let mut recreate = conn.clone();
        recreate.extend([
            "-d".to_string(),
            ADMIN_DATABASE.to_string(),
            "-c".to_string(),
            format!("DROP DATABASE IF EXISTS {};", quoted),
            "-c".to_string(),
            format!("CREATE DATABASE {};", quoted),
        ]);
        ctx.run("psql", &recreate, &env)?;

        ctx.read_file(file, "psql", &env, |path| {
            let mut args = conn.clone();
            args.extend(
                ["-d", database, "-v", "ON_ERROR_STOP=1", "-f", path]
                    .iter()
                    .map(|s| s.to_string()),
            );
            args
        })?;
        Ok(())
    }

    fn restore_extensions(&self) -> &'static [&'static str] {
        &[ARCHIVE_EXT, SQL_EXT]
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
