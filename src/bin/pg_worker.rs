//! Runs embedded `PostgreSQL` lifecycle steps for the integration tests when
//! they execute as root.
//!
//! ```text
//! pg_worker <setup|start|stop> <config-path>
//! ```
//!
//! `config-path` names a JSON [`WorkerPayload`] carrying the cluster
//! settings and the environment overrides to apply. When started as root the
//! worker re-executes itself as `nobody`, because `initdb` refuses to run
//! with root privileges.

#[cfg(unix)]
mod unix {
    use camino::{Utf8Path, Utf8PathBuf};
    use nix::unistd::{Uid, User, initgroups, setgid, setuid};
    use pg_embedded_setup_unpriv::ambient_dir_and_path;
    use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
    use postgresql_embedded::{PostgreSQL, Status};
    use std::env;
    use std::ffi::CString;
    use std::io::{self, Read};
    use std::process::{Command, ExitStatus};
    use std::str::FromStr;
    use thiserror::Error;

    const REEXEC_MARKER: &str = "PG_WORKER_REEXEC";
    const TRUSTED_PATH: &str = "/usr/sbin:/usr/bin:/sbin:/bin";
    const UNPRIVILEGED_USER: &str = "nobody";

    /// Failures surfaced by the worker.
    #[derive(Debug, Error)]
    pub enum WorkerError {
        #[error("invalid arguments: {0}")]
        InvalidArgs(String),
        #[error("failed to read worker config: {0}")]
        ConfigRead(#[source] io::Error),
        #[error("failed to parse worker config: {0}")]
        ConfigParse(#[source] serde_json::Error),
        #[error("invalid cluster settings: {0}")]
        Settings(String),
        #[error("failed to build runtime: {0}")]
        Runtime(#[source] io::Error),
        #[error("failed to drop privileges: {0}")]
        PrivilegeDrop(String),
        #[error("postgres {operation} failed: {message}")]
        Postgres {
            operation: &'static str,
            message: String,
        },
    }

    /// Lifecycle step requested on the command line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Operation {
        Setup,
        Start,
        Stop,
    }

    impl Operation {
        const fn name(self) -> &'static str {
            match self {
                Self::Setup => "setup",
                Self::Start => "start",
                Self::Stop => "stop",
            }
        }
    }

    impl FromStr for Operation {
        type Err = WorkerError;

        fn from_str(value: &str) -> Result<Self, Self::Err> {
            match value {
                "setup" => Ok(Self::Setup),
                "start" => Ok(Self::Start),
                "stop" => Ok(Self::Stop),
                other => Err(WorkerError::InvalidArgs(format!(
                    "unknown operation '{other}'; expected setup, start or stop"
                ))),
            }
        }
    }

    /// Entry point: re-executes as `nobody` when needed, then runs the step.
    pub fn run() -> Result<(), WorkerError> {
        let args = utf8_args()?;
        let (operation, config_path) = parse_args(&args)?;
        if Uid::effective().is_root() && env::var_os(REEXEC_MARKER).is_none() {
            let status = reexec_unprivileged(&args)?;
            std::process::exit(status.code().unwrap_or(1));
        }
        let payload = load_payload(&config_path)?;
        drop_privileges(UNPRIVILEGED_USER)?;
        execute(operation, payload)
    }

    fn utf8_args() -> Result<Vec<Utf8PathBuf>, WorkerError> {
        env::args_os()
            .map(|arg| {
                arg.into_string()
                    .map(Utf8PathBuf::from)
                    .map_err(|_| WorkerError::InvalidArgs("argument is not valid UTF-8".into()))
            })
            .collect()
    }

    /// Splits `[program, operation, config]` into its parts.
    pub fn parse_args(args: &[Utf8PathBuf]) -> Result<(Operation, Utf8PathBuf), WorkerError> {
        match args {
            [_, operation, config] => Ok((operation.as_str().parse()?, config.clone())),
            [_, _, _, extra, ..] => Err(WorkerError::InvalidArgs(format!(
                "unexpected extra argument: {extra}"
            ))),
            [_, _] => Err(WorkerError::InvalidArgs("missing config path argument".into())),
            _ => Err(WorkerError::InvalidArgs("missing operation argument".into())),
        }
    }

    fn reexec_unprivileged(args: &[Utf8PathBuf]) -> Result<ExitStatus, WorkerError> {
        let exe = env::current_exe()
            .map_err(WorkerError::Runtime)?
            .into_os_string()
            .into_string()
            .map(Utf8PathBuf::from)
            .map_err(|_| WorkerError::Runtime(io::Error::other("executable path is not UTF-8")))?;
        let forwarded = args.get(1..).unwrap_or_default();

        let runuser = Command::new("runuser")
            .args(["-u", UNPRIVILEGED_USER, "--"])
            .arg(exe.as_std_path())
            .args(forwarded.iter().map(|arg| arg.as_std_path()))
            .env(REEXEC_MARKER, "1")
            .env("PATH", TRUSTED_PATH)
            .status();
        match runuser {
            Ok(status) => Ok(status),
            Err(err) if err.kind() == io::ErrorKind::NotFound => reexec_via_su(&exe, forwarded),
            Err(err) => Err(WorkerError::PrivilegeDrop(err.to_string())),
        }
    }

    fn reexec_via_su(exe: &Utf8Path, forwarded: &[Utf8PathBuf]) -> Result<ExitStatus, WorkerError> {
        let command = std::iter::once(exe.as_str())
            .chain(forwarded.iter().map(|arg| arg.as_str()))
            .map(shell_escape)
            .collect::<Vec<_>>()
            .join(" ");
        Command::new("/bin/su")
            .args(["-s", "/bin/sh", UNPRIVILEGED_USER, "-c"])
            .arg(format!("{REEXEC_MARKER}=1 exec {command}"))
            .env("PATH", TRUSTED_PATH)
            .status()
            .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))
    }

    /// Quotes a value for a POSIX shell using `'\''` for embedded quotes.
    #[must_use]
    pub fn shell_escape(value: &str) -> String {
        format!("'{}'", value.replace('\'', "'\\''"))
    }

    fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
        let (dir, relative) = ambient_dir_and_path(path)
            .map_err(|err| WorkerError::ConfigRead(io::Error::other(err.to_string())))?;
        let mut bytes = Vec::new();
        dir.open(relative.as_std_path())
            .and_then(|mut file| file.read_to_end(&mut bytes))
            .map_err(WorkerError::ConfigRead)?;
        serde_json::from_slice(&bytes).map_err(WorkerError::ConfigParse)
    }

    fn drop_privileges(username: &str) -> Result<(), WorkerError> {
        if !Uid::effective().is_root() {
            return Ok(());
        }
        let privilege = |err: nix::Error| WorkerError::PrivilegeDrop(err.to_string());
        let user = User::from_name(username)
            .map_err(privilege)?
            .ok_or_else(|| WorkerError::PrivilegeDrop(format!("user '{username}' not found")))?;
        let name = CString::new(user.name.clone())
            .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
        initgroups(&name, user.gid).map_err(privilege)?;
        setgid(user.gid).map_err(privilege)?;
        setuid(user.uid).map_err(privilege)?;

        // SAFETY: the worker is single-threaded until the runtime is built.
        unsafe {
            env::set_var("HOME", &user.dir);
            env::set_var("USER", &user.name);
            env::set_var("LOGNAME", &user.name);
        }
        Ok(())
    }

    fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
        for (key, value) in environment {
            // SAFETY: the worker is single-threaded until the runtime is built.
            unsafe {
                match value {
                    Some(secret) => env::set_var(key, secret.expose()),
                    None => env::remove_var(key),
                }
            }
        }
    }

    fn execute(operation: Operation, payload: WorkerPayload) -> Result<(), WorkerError> {
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| WorkerError::Settings(err.to_string()))?;
        apply_environment(&payload.environment);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(WorkerError::Runtime)?;

        let mut postgres = PostgreSQL::new(settings);
        runtime.block_on(async {
            match operation {
                Operation::Setup => {
                    postgres
                        .setup()
                        .await
                        .map_err(|err| postgres_error(operation, &err))?;
                    start_if_stopped(&mut postgres, operation).await
                }
                Operation::Start => start_if_stopped(&mut postgres, operation).await,
                Operation::Stop => postgres
                    .stop()
                    .await
                    .map_err(|err| postgres_error(operation, &err)),
            }
        })?;

        if operation == Operation::Start {
            // The cluster must outlive this process.
            std::mem::forget(postgres);
        }
        Ok(())
    }

    async fn start_if_stopped(
        postgres: &mut PostgreSQL,
        operation: Operation,
    ) -> Result<(), WorkerError> {
        if matches!(postgres.status(), Status::Started) {
            return Ok(());
        }
        postgres
            .start()
            .await
            .map_err(|err| postgres_error(operation, &err))
    }

    fn postgres_error(operation: Operation, err: &impl std::fmt::Display) -> WorkerError {
        WorkerError::Postgres {
            operation: operation.name(),
            message: err.to_string(),
        }
    }

}

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    unix::run().map_err(Into::into)
}

#[cfg(not(unix))]
fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    Err("pg_worker is only supported on Unix platforms".into())
}
