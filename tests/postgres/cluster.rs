//! Embedded `PostgreSQL` cluster shared by the integration tests.
//!
//! One cluster is started per test binary. Each test clones a migrated
//! template into its own database and drops it again through
//! [`CleanupGuard`].

use super::helpers::test_runtime;
use crate::test_helpers::EnvVarGuard;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, Permissions, PermissionsExt};
use diesel::prelude::*;
use pg_embedded_setup_unpriv::worker_process_test_api::{
    WorkerOperation, WorkerRequest, WorkerRequestArgs, run as run_worker,
};
use pg_embedded_setup_unpriv::{
    ExecutionPrivileges, TestBootstrapSettings, bootstrap_for_tests, detect_execution_privileges,
};
use postgresql_embedded::{PostgreSQL, Settings, Status};
use rstest::fixture;
use std::ffi::{OsStr, OsString};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Duration;
use tokio::runtime::Runtime;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared cluster handle handed to tests.
pub type PostgresCluster = &'static ManagedCluster;

const WORKER_BINARY: &str = "pg_worker";

static SHARED_CLUSTER: OnceLock<ManagedCluster> = OnceLock::new();
static TEMPLATE_LOCK: Mutex<()> = Mutex::new(());

fn boxed(err: impl std::error::Error + Send + Sync + 'static) -> BoxError {
    Box::new(err)
}

/// Embedded cluster plus whatever keeps it alive.
///
/// Unprivileged runs own the `PostgreSQL` handle in-process. Root runs
/// delegate every lifecycle step to the `pg_worker` binary.
pub struct ManagedCluster {
    bootstrap: TestBootstrapSettings,
    env_vars: Vec<(String, Option<String>)>,
    in_process: Option<(Runtime, PostgreSQL)>,
}

impl ManagedCluster {
    fn start() -> Result<Self, BoxError> {
        let worker_env = worker_env_changes()?;
        let mut bootstrap = {
            let _env = EnvVarGuard::set_many(&worker_env);
            bootstrap_for_tests().map_err(boxed)?
        };
        read_password_file(&mut bootstrap.settings)?;
        let env_vars = bootstrap.environment.to_env();
        let mut cluster = Self {
            bootstrap,
            env_vars,
            in_process: None,
        };
        match cluster.bootstrap.privileges {
            ExecutionPrivileges::Root => cluster.start_via_worker()?,
            ExecutionPrivileges::Unprivileged => cluster.start_in_process()?,
        }
        Ok(cluster)
    }

    /// Returns the connection URL for `database`.
    #[must_use]
    pub fn database_url(&self, database: &str) -> String {
        self.bootstrap.settings.url(database)
    }

    /// Creates `template` and runs `migrate` against it unless it already
    /// exists. A failed migration drops the half-built template.
    pub fn ensure_template_exists<F>(&self, template: &str, migrate: F) -> Result<(), BoxError>
    where
        F: FnOnce(&str) -> Result<(), BoxError>,
    {
        let _serialized = TEMPLATE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        if self.database_exists(template)? {
            return Ok(());
        }
        self.admin_execute(&format!("CREATE DATABASE {}", quote_identifier(template)))?;
        migrate(&self.database_url(template)).or_else(|err| {
            self.drop_database(template)?;
            Err(err)
        })
    }

    pub fn create_database_from_template(
        &self,
        database: &str,
        template: &str,
    ) -> Result<(), BoxError> {
        self.admin_execute(&format!(
            "CREATE DATABASE {} TEMPLATE {}",
            quote_identifier(database),
            quote_identifier(template),
        ))
    }

    pub fn drop_database(&self, database: &str) -> Result<(), BoxError> {
        self.admin_execute(&format!(
            "DROP DATABASE IF EXISTS {} WITH (FORCE)",
            quote_identifier(database)
        ))
    }

    fn start_in_process(&mut self) -> Result<(), BoxError> {
        let runtime = test_runtime()?;
        let mut postgres = PostgreSQL::new(self.bootstrap.settings.clone());
        {
            let _env = EnvVarGuard::set_many(&to_os_pairs(&self.env_vars));
            runtime.block_on(async {
                postgres.setup().await.map_err(boxed)?;
                if !matches!(postgres.status(), Status::Started) {
                    postgres.start().await.map_err(boxed)?;
                }
                Ok::<_, BoxError>(())
            })?;
        }
        self.bootstrap.settings = postgres.settings().clone();
        read_port_from_pid_file(&mut self.bootstrap.settings)?;
        self.in_process = Some((runtime, postgres));
        Ok(())
    }

    fn start_via_worker(&mut self) -> Result<(), BoxError> {
        self.worker(WorkerOperation::Setup, self.bootstrap.setup_timeout)?;
        self.worker(WorkerOperation::Start, self.bootstrap.start_timeout)?;
        read_port_from_pid_file(&mut self.bootstrap.settings)
    }

    fn stop(&mut self) -> Result<(), BoxError> {
        match self.in_process.take() {
            Some((runtime, postgres)) => runtime.block_on(postgres.stop()).map_err(boxed),
            None if matches!(self.bootstrap.privileges, ExecutionPrivileges::Root) => {
                self.worker(WorkerOperation::Stop, self.bootstrap.shutdown_timeout)
            }
            None => Ok(()),
        }
    }

    fn worker(&self, operation: WorkerOperation, timeout: Duration) -> Result<(), BoxError> {
        let worker = self.bootstrap.worker_binary.as_ref().ok_or_else(|| {
            boxed(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "PG_EMBEDDED_WORKER is not set for worker operation",
            ))
        })?;
        let request = WorkerRequest::new(WorkerRequestArgs {
            worker: worker.as_path(),
            settings: &self.bootstrap.settings,
            env_vars: &self.env_vars,
            operation,
            timeout,
        });
        run_worker(&request).map_err(boxed)
    }

    fn admin_connection(&self) -> Result<PgConnection, BoxError> {
        PgConnection::establish(&self.database_url("postgres")).map_err(boxed)
    }

    fn admin_execute(&self, sql: &str) -> Result<(), BoxError> {
        let mut connection = self.admin_connection()?;
        diesel::sql_query(sql).execute(&mut connection).map_err(boxed)?;
        Ok(())
    }

    fn database_exists(&self, database: &str) -> Result<bool, BoxError> {
        #[derive(diesel::QueryableByName)]
        struct Present {
            #[diesel(sql_type = diesel::sql_types::Bool)]
            present: bool,
        }

        let mut connection = self.admin_connection()?;
        diesel::sql_query(
            "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1) AS present",
        )
        .bind::<diesel::sql_types::Text, _>(database)
        .get_result::<Present>(&mut connection)
        .map(|row| row.present)
        .map_err(boxed)
    }
}

impl Drop for ManagedCluster {
    fn drop(&mut self) {
        drop(self.stop());
    }
}

/// Drops a per-test database when the test finishes, pass or fail.
pub struct CleanupGuard<'a> {
    cluster: &'a ManagedCluster,
    database: Option<String>,
}

impl<'a> CleanupGuard<'a> {
    #[must_use]
    pub const fn new(cluster: &'a ManagedCluster, database: String) -> Self {
        Self {
            cluster,
            database: Some(database),
        }
    }

    /// Drops the database now and reports any failure.
    pub fn cleanup(mut self) -> Result<(), BoxError> {
        match self.database.take() {
            Some(database) => self.cluster.drop_database(&database),
            None => Ok(()),
        }
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Some(database) = self.database.take() {
            drop(self.cluster.drop_database(&database));
        }
    }
}

/// Provides the shared cluster, starting it on first use.
///
/// # Panics
///
/// Panics with a `SKIP-TEST-CLUSTER` prefix when `PostgreSQL` cannot start.
#[fixture]
pub fn postgres_cluster() -> PostgresCluster {
    SHARED_CLUSTER.get_or_init(|| match ManagedCluster::start() {
        Ok(cluster) => cluster,
        Err(err) => panic!("SKIP-TEST-CLUSTER: failed to start PostgreSQL: {err}"),
    })
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_os_pairs(vars: &[(String, Option<String>)]) -> Vec<(OsString, Option<OsString>)> {
    vars.iter()
        .map(|(key, value)| (OsString::from(key), value.as_ref().map(OsString::from)))
        .collect()
}

fn read_password_file(settings: &mut Settings) -> Result<(), BoxError> {
    let (dir, name) = open_parent(&settings.password_file)?;
    match dir.read_to_string(name) {
        Ok(contents) if !contents.trim_end().is_empty() => {
            contents.trim_end().clone_into(&mut settings.password);
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(boxed(err)),
    }
}

/// Picks up the port the postmaster actually bound (line 4 of its pid file).
fn read_port_from_pid_file(settings: &mut Settings) -> Result<(), BoxError> {
    let data_dir = Dir::open_ambient_dir(&settings.data_dir, ambient_authority()).map_err(boxed)?;
    let contents = match data_dir.read_to_string("postmaster.pid") {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(boxed(err)),
    };
    if let Some(port) = contents
        .lines()
        .nth(3)
        .and_then(|line| line.trim().parse::<u16>().ok())
    {
        settings.port = port;
    }
    Ok(())
}

fn open_parent(path: &Path) -> Result<(Dir, &OsStr), BoxError> {
    let name = path
        .file_name()
        .ok_or_else(|| boxed(std::io::Error::other("path must include a file name")))?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(boxed)?;
    Ok((dir, name))
}

/// Environment needed before bootstrapping: a free port unless `PG_PORT` is
/// pinned, and a runnable worker when tests execute as root.
fn worker_env_changes() -> Result<Vec<(OsString, Option<OsString>)>, BoxError> {
    let mut changes = Vec::new();
    if std::env::var_os("PG_PORT").is_none() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).map_err(boxed)?;
        let port = listener.local_addr().map_err(boxed)?.port();
        changes.push((OsString::from("PG_PORT"), Some(OsString::from(port.to_string()))));
    }

    if matches!(detect_execution_privileges(), ExecutionPrivileges::Root)
        && std::env::var_os("PG_EMBEDDED_WORKER").is_none()
    {
        let worker = locate_worker().ok_or_else(|| {
            boxed(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "PG_EMBEDDED_WORKER is not set and pg_worker binary was not found",
            ))
        })?;
        changes.push((
            OsString::from("PG_EMBEDDED_WORKER"),
            Some(stage_worker(&worker)?),
        ));
    }
    Ok(changes)
}

fn locate_worker() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CARGO_BIN_EXE_pg_worker") {
        return Some(PathBuf::from(path));
    }
    let beside_target = std::env::current_exe()
        .ok()
        .and_then(|exe| Some(exe.parent()?.parent()?.join(WORKER_BINARY)))
        .filter(|candidate| candidate.is_file());
    let on_path = || {
        std::env::split_paths(&std::env::var_os("PATH")?)
            .map(|dir| dir.join(WORKER_BINARY))
            .find(|candidate| candidate.is_file())
    };
    beside_target.or_else(on_path)
}

/// Copies the worker somewhere `nobody` can execute it.
fn stage_worker(source: &Path) -> Result<OsString, BoxError> {
    static STAGED: OnceLock<OsString> = OnceLock::new();
    if let Some(staged) = STAGED.get() {
        return Ok(staged.clone());
    }

    let destination = std::env::temp_dir().join(format!(
        "{WORKER_BINARY}_{pid}",
        pid = std::process::id()
    ));
    let (source_dir, source_name) = open_parent(source)?;
    let (destination_dir, destination_name) = open_parent(&destination)?;
    if destination_dir.exists(destination_name) {
        destination_dir.remove_file(destination_name).map_err(boxed)?;
    }
    source_dir
        .copy(source_name, &destination_dir, destination_name)
        .map_err(boxed)?;
    destination_dir
        .set_permissions(destination_name, Permissions::from_mode(0o755))
        .map_err(boxed)?;

    Ok(STAGED.get_or_init(|| destination.into_os_string()).clone())
}
