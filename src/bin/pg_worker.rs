//! Runs embedded `PostgreSQL` lifecycle operations for root test runs.
//!
//! ```text
//! pg_worker <setup|start|stop> <payload.json>
//! ```
//!
//! `PostgreSQL` refuses to run as root, so a root test process hands the
//! cluster settings to this worker as a JSON [`WorkerPayload`]. The worker
//! reads the payload, drops to the `nobody` account, applies the payload's
//! environment, and performs the requested operation.

#[cfg(unix)]
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use nix::unistd::{Uid, User, initgroups, setgid, setuid};
#[cfg(unix)]
use pg_embedded_setup_unpriv::ambient_dir_and_path;
#[cfg(unix)]
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
#[cfg(unix)]
use postgresql_embedded::{PostgreSQL, Status};
#[cfg(unix)]
use std::ffi::CString;
#[cfg(unix)]
use std::io::Read;
#[cfg(unix)]
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
const UNPRIVILEGED_USER: &str = "nobody";

#[cfg(unix)]
#[derive(Debug, Error)]
enum WorkerError {
    #[error("usage: pg_worker <setup|start|stop> <payload.json>: {0}")]
    Usage(String),
    #[error("failed to read payload: {0}")]
    Payload(#[source] BoxError),
    #[error("failed to drop privileges: {0}")]
    PrivilegeDrop(String),
    #[error("invalid cluster settings: {0}")]
    Settings(String),
    #[error("postgres {operation} failed: {message}")]
    Postgres {
        operation: Operation,
        message: String,
    },
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Setup,
    Start,
    Stop,
}

#[cfg(unix)]
impl Operation {
    fn parse(value: &str) -> Result<Self, WorkerError> {
        match value {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(WorkerError::Usage(format!("unknown operation '{other}'"))),
        }
    }
}

#[cfg(unix)]
impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    let (operation, payload_path) = parse_args(std::env::args().skip(1))?;
    let payload = load_payload(&payload_path)?;
    drop_privileges(UNPRIVILEGED_USER)?;
    apply_environment(&payload.environment, |key, value| {
        // SAFETY: the worker is single-threaded until the runtime below is
        // built, so nothing else reads the environment concurrently.
        unsafe {
            match value {
                Some(new_value) => std::env::set_var(key, new_value),
                None => std::env::remove_var(key),
            }
        }
    });
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| WorkerError::Settings(err.to_string()))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(operation, PostgreSQL::new(settings)))?;
    Ok(())
}

#[cfg(unix)]
fn parse_args(
    mut args: impl Iterator<Item = String>,
) -> Result<(Operation, Utf8PathBuf), WorkerError> {
    let operation = args
        .next()
        .ok_or_else(|| WorkerError::Usage("missing operation".to_owned()))
        .and_then(|value| Operation::parse(&value))?;
    let payload_path = args
        .next()
        .map(Utf8PathBuf::from)
        .ok_or_else(|| WorkerError::Usage("missing payload path".to_owned()))?;
    if let Some(extra) = args.next() {
        return Err(WorkerError::Usage(format!("unexpected argument '{extra}'")));
    }
    Ok((operation, payload_path))
}

#[cfg(unix)]
fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
    let read = || -> Result<Vec<u8>, BoxError> {
        let (dir, relative) = ambient_dir_and_path(path)?;
        let mut bytes = Vec::new();
        dir.open(relative.as_std_path())?.read_to_end(&mut bytes)?;
        Ok(bytes)
    };
    let bytes = read().map_err(WorkerError::Payload)?;
    serde_json::from_slice(&bytes).map_err(|err| WorkerError::Payload(Box::new(err)))
}

/// Switches to `username` when running as root; a no-op otherwise.
#[cfg(unix)]
fn drop_privileges(username: &str) -> Result<(), WorkerError> {
    if !Uid::effective().is_root() {
        return Ok(());
    }
    let denied = |err: &dyn std::fmt::Display| WorkerError::PrivilegeDrop(err.to_string());

    let user = User::from_name(username)
        .map_err(|err| denied(&err))?
        .ok_or_else(|| WorkerError::PrivilegeDrop(format!("user '{username}' not found")))?;
    let name = CString::new(user.name.clone()).map_err(|err| denied(&err))?;
    initgroups(&name, user.gid).map_err(|err| denied(&err))?;
    setgid(user.gid).map_err(|err| denied(&err))?;
    setuid(user.uid).map_err(|err| denied(&err))?;
    std::env::set_current_dir(std::env::temp_dir()).map_err(|err| denied(&err))?;

    // SAFETY: still single-threaded; no runtime has been built yet.
    unsafe {
        std::env::set_var("HOME", &user.dir);
        std::env::set_var("USER", &user.name);
        std::env::set_var("LOGNAME", &user.name);
    }
    Ok(())
}

/// Feeds each payload variable to `apply`; `None` means remove.
#[cfg(unix)]
fn apply_environment<F>(environment: &[(String, Option<PlainSecret>)], mut apply: F)
where
    F: FnMut(&str, Option<&str>),
{
    for (key, value) in environment {
        apply(key, value.as_ref().map(PlainSecret::expose));
    }
}

#[cfg(unix)]
async fn run(operation: Operation, mut postgres: PostgreSQL) -> Result<(), WorkerError> {
    let failed = |err: postgresql_embedded::Error| WorkerError::Postgres {
        operation,
        message: err.to_string(),
    };
    match operation {
        Operation::Setup => postgres.setup().await.map_err(failed),
        Operation::Start => {
            if !matches!(postgres.status(), Status::Started) {
                postgres.start().await.map_err(failed)?;
            }
            // The server must outlive this process; dropping the handle
            // would stop it.
            std::mem::forget(postgres);
            Ok(())
        }
        Operation::Stop => postgres.stop().await.map_err(failed),
    }
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker requires a Unix platform".into())
}
